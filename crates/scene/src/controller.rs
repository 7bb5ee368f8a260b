//! First-person keyboard movement in the XZ plane.

use std::f32::consts::TAU;

use glam::Vec3;
use vista_platform::{InputState, KeyCode};

use crate::transform::Transform;

/// Pitch limit in radians, just short of straight up or down.
pub const PITCH_LIMIT: f32 = 1.5;

/// Wraps `yaw` into `[0, TAU)`.
///
/// `rem_euclid` rounds tiny negative angles up to exactly `TAU`, which is
/// folded back to zero.
fn wrap_yaw(yaw: f32) -> f32 {
    let wrapped = yaw.rem_euclid(TAU);
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Key bindings for [`KeyboardMovementController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyMappings {
    pub move_left: KeyCode,
    pub move_right: KeyCode,
    pub move_forward: KeyCode,
    pub move_backward: KeyCode,
    pub move_up: KeyCode,
    pub move_down: KeyCode,
    pub look_left: KeyCode,
    pub look_right: KeyCode,
    pub look_up: KeyCode,
    pub look_down: KeyCode,
}

impl Default for KeyMappings {
    fn default() -> Self {
        Self {
            move_left: KeyCode::KeyA,
            move_right: KeyCode::KeyD,
            move_forward: KeyCode::KeyW,
            move_backward: KeyCode::KeyS,
            move_up: KeyCode::KeyE,
            move_down: KeyCode::KeyQ,
            look_left: KeyCode::ArrowLeft,
            look_right: KeyCode::ArrowRight,
            look_up: KeyCode::ArrowUp,
            look_down: KeyCode::ArrowDown,
        }
    }
}

/// Moves a viewer transform from held keys.
#[derive(Clone, Copy, Debug)]
pub struct KeyboardMovementController {
    pub keys: KeyMappings,
    /// Units per second
    pub move_speed: f32,
    /// Radians per second
    pub look_speed: f32,
}

impl Default for KeyboardMovementController {
    fn default() -> Self {
        Self {
            keys: KeyMappings::default(),
            move_speed: 3.0,
            look_speed: 1.5,
        }
    }
}

impl KeyboardMovementController {
    /// Applies one frame of look and movement input to `transform`.
    ///
    /// Look input changes pitch and yaw, with pitch clamped to
    /// ±[`PITCH_LIMIT`] and yaw wrapped into `[0, 2π)`. Movement follows the
    /// new yaw in the XZ plane, with up along -Y. Diagonal input is
    /// normalized so it is not faster than a single direction.
    pub fn move_in_plane_xz(&self, input: &InputState, dt: f32, transform: &mut Transform) {
        let held = |key| input.is_key_pressed(key);

        let mut rotate = Vec3::ZERO;
        if held(self.keys.look_right) {
            rotate.y += 1.0;
        }
        if held(self.keys.look_left) {
            rotate.y -= 1.0;
        }
        if held(self.keys.look_up) {
            rotate.x += 1.0;
        }
        if held(self.keys.look_down) {
            rotate.x -= 1.0;
        }

        if rotate.length_squared() > f32::EPSILON {
            transform.rotation += self.look_speed * dt * rotate.normalize();
        }

        transform.rotation.x = transform.rotation.x.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        transform.rotation.y = wrap_yaw(transform.rotation.y);

        let yaw = transform.rotation.y;
        let forward = Vec3::new(yaw.sin(), 0.0, yaw.cos());
        let right = Vec3::new(forward.z, 0.0, -forward.x);
        let up = Vec3::NEG_Y;

        let mut move_dir = Vec3::ZERO;
        if held(self.keys.move_forward) {
            move_dir += forward;
        }
        if held(self.keys.move_backward) {
            move_dir -= forward;
        }
        if held(self.keys.move_right) {
            move_dir += right;
        }
        if held(self.keys.move_left) {
            move_dir -= right;
        }
        if held(self.keys.move_up) {
            move_dir += up;
        }
        if held(self.keys.move_down) {
            move_dir -= up;
        }

        if move_dir.length_squared() > f32::EPSILON {
            transform.translation += self.move_speed * dt * move_dir.normalize();
        }
    }
}
