//! Camera with Vulkan-convention projections.
//!
//! Clip space follows Vulkan: depth in `[0, 1]`, +Y pointing down the
//! screen. View space looks down +Z.

use glam::{Mat4, Vec3, Vec4};

/// Projection and view matrices for one viewpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    projection: Mat4,
    view: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
        }
    }
}

impl Camera {
    /// Create a camera with identity matrices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Orthographic projection of the box `[left, right] x [top, bottom] x [near, far]`.
    pub fn set_orthographic_projection(
        &mut self,
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    ) {
        self.projection = Mat4::from_cols(
            Vec4::new(2.0 / (right - left), 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 / (bottom - top), 0.0, 0.0),
            Vec4::new(0.0, 0.0, 1.0 / (far - near), 0.0),
            Vec4::new(
                -(right + left) / (right - left),
                -(bottom + top) / (bottom - top),
                -near / (far - near),
                1.0,
            ),
        );
    }

    /// Perspective projection.
    ///
    /// # Panics
    ///
    /// Panics if `aspect` is zero.
    pub fn set_perspective_projection(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) {
        assert!(aspect.abs() > f32::EPSILON, "aspect ratio must be non-zero");
        let tan_half_fov = (fov_y / 2.0).tan();
        self.projection = Mat4::from_cols(
            Vec4::new(1.0 / (aspect * tan_half_fov), 0.0, 0.0, 0.0),
            Vec4::new(0.0, 1.0 / tan_half_fov, 0.0, 0.0),
            Vec4::new(0.0, 0.0, far / (far - near), 1.0),
            Vec4::new(0.0, 0.0, -(far * near) / (far - near), 0.0),
        );
    }

    /// Looks from `position` along `direction`, with `up` fixing the roll.
    pub fn set_view_direction(&mut self, position: Vec3, direction: Vec3, up: Vec3) {
        let w = direction.normalize();
        let u = w.cross(up).normalize();
        let v = w.cross(u);
        self.view = view_from_basis(position, u, v, w);
    }

    /// Looks from `position` toward `target`.
    pub fn set_view_target(&mut self, position: Vec3, target: Vec3, up: Vec3) {
        self.set_view_direction(position, target - position, up);
    }

    /// View from a viewer placed at `position` with YXZ Euler `rotation`.
    pub fn set_view_euler(&mut self, position: Vec3, rotation: Vec3) {
        let (s3, c3) = rotation.z.sin_cos();
        let (s2, c2) = rotation.x.sin_cos();
        let (s1, c1) = rotation.y.sin_cos();
        let u = Vec3::new(c1 * c3 + s1 * s2 * s3, c2 * s3, c1 * s2 * s3 - c3 * s1);
        let v = Vec3::new(c3 * s1 * s2 - c1 * s3, c2 * c3, c1 * c3 * s2 + s1 * s3);
        let w = Vec3::new(c2 * s1, -s2, c1 * c2);
        self.view = view_from_basis(position, u, v, w);
    }

    /// Returns the projection matrix.
    #[inline]
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Returns the view matrix.
    #[inline]
    pub fn view(&self) -> &Mat4 {
        &self.view
    }
}

/// World-to-view matrix for an orthonormal camera basis `u` (right),
/// `v` (down) and `w` (forward).
fn view_from_basis(position: Vec3, u: Vec3, v: Vec3, w: Vec3) -> Mat4 {
    Mat4::from_cols(
        Vec4::new(u.x, v.x, w.x, 0.0),
        Vec4::new(u.y, v.y, w.y, 0.0),
        Vec4::new(u.z, v.z, w.z, 0.0),
        Vec4::new(-u.dot(position), -v.dot(position), -w.dot(position), 1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq_vec3(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < EPSILON
    }

    #[test]
    fn test_default_is_identity() {
        let camera = Camera::new();
        assert_eq!(*camera.projection(), Mat4::IDENTITY);
        assert_eq!(*camera.view(), Mat4::IDENTITY);
    }

    #[test]
    fn test_orthographic_maps_box_to_clip() {
        let mut camera = Camera::new();
        camera.set_orthographic_projection(-2.0, 2.0, -1.0, 1.0, 0.0, 10.0);
        let proj = camera.projection();

        assert!(approx_eq_vec3(
            proj.project_point3(Vec3::new(-2.0, -1.0, 0.0)),
            Vec3::new(-1.0, -1.0, 0.0)
        ));
        assert!(approx_eq_vec3(
            proj.project_point3(Vec3::new(2.0, 1.0, 10.0)),
            Vec3::new(1.0, 1.0, 1.0)
        ));
    }

    #[test]
    fn test_perspective_depth_range() {
        let mut camera = Camera::new();
        camera.set_perspective_projection(50f32.to_radians(), 4.0 / 3.0, 0.1, 10.0);
        let proj = camera.projection();

        let near = proj.project_point3(Vec3::new(0.0, 0.0, 0.1));
        let far = proj.project_point3(Vec3::new(0.0, 0.0, 10.0));
        assert!((near.z - 0.0).abs() < EPSILON);
        assert!((far.z - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_perspective_aspect_scales_x() {
        let mut camera = Camera::new();
        camera.set_perspective_projection(90f32.to_radians(), 2.0, 0.1, 10.0);
        let proj = camera.projection();
        assert!((proj.x_axis.x - 0.5).abs() < EPSILON);
        assert!((proj.y_axis.y - 1.0).abs() < EPSILON);
    }

    #[test]
    #[should_panic(expected = "aspect ratio must be non-zero")]
    fn test_perspective_rejects_zero_aspect() {
        Camera::new().set_perspective_projection(1.0, 0.0, 0.1, 10.0);
    }

    #[test]
    fn test_view_target_puts_target_on_forward_axis() {
        let mut camera = Camera::new();
        let position = Vec3::new(1.0, -2.0, -3.0);
        let target = Vec3::new(1.0, -2.0, 4.0);
        camera.set_view_target(position, target, Vec3::NEG_Y);

        let in_view = camera.view().transform_point3(target);
        assert!(approx_eq_vec3(in_view, Vec3::new(0.0, 0.0, 7.0)), "got {in_view:?}");
        assert!(approx_eq_vec3(
            camera.view().transform_point3(position),
            Vec3::ZERO
        ));
    }

    #[test]
    fn test_view_euler_zero_rotation_is_translation() {
        let mut camera = Camera::new();
        let position = Vec3::new(0.5, 0.0, -2.0);
        camera.set_view_euler(position, Vec3::ZERO);

        assert_eq!(*camera.view(), Mat4::from_translation(-position));
    }

    #[test]
    fn test_view_euler_matches_view_direction() {
        let yaw = 0.6_f32;
        let position = Vec3::new(0.0, -1.0, -2.5);

        let mut euler = Camera::new();
        euler.set_view_euler(position, Vec3::new(0.0, yaw, 0.0));

        let mut direction = Camera::new();
        direction.set_view_direction(position, Vec3::new(yaw.sin(), 0.0, yaw.cos()), Vec3::NEG_Y);

        let probe = Vec3::new(3.0, 1.0, 2.0);
        assert!(approx_eq_vec3(
            euler.view().transform_point3(probe),
            direction.view().transform_point3(probe)
        ));
    }
}
