//! Transform component for scene objects.
//!
//! Rotation is stored as Tait-Bryan angles applied Y (yaw), then X (pitch),
//! then Z (roll), which maps directly onto keyboard look controls.
//!
//! # Example
//!
//! ```
//! use vista_scene::Transform;
//! use glam::Vec3;
//!
//! let t = Transform {
//!     translation: Vec3::new(0.0, 0.0, 2.5),
//!     scale: Vec3::splat(3.0),
//!     ..Default::default()
//! };
//! let origin = t.matrix().transform_point3(Vec3::ZERO);
//! assert_eq!(origin, Vec3::new(0.0, 0.0, 2.5));
//! ```

use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

/// Translation, Euler rotation and scale of a scene object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub translation: Vec3,
    /// Scale factor per axis
    pub scale: Vec3,
    /// Euler angles in radians, x = pitch, y = yaw, z = roll
    pub rotation: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
        }
    }
}

impl Transform {
    /// Create a new transform at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transform with the given translation.
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    /// Create a transform with a uniform or per-axis scale.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Create a transform with the given Euler angles.
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Rotation as a quaternion, composed Ry * Rx * Rz.
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.rotation.y,
            self.rotation.x,
            self.rotation.z,
        )
    }

    /// Model matrix: translate * Ry * Rx * Rz * scale.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.orientation(), self.translation)
    }

    /// Inverse transpose of the model matrix's upper 3x3, widened to a Mat4.
    ///
    /// Rotation is orthonormal, so this reduces to R * S⁻¹.
    ///
    /// # Non-invertible transforms
    ///
    /// A zero scale component has no inverse; identity is returned instead
    /// of a matrix full of infinities.
    pub fn normal_matrix(&self) -> Mat4 {
        const EPSILON: f32 = 1e-6;
        if self.scale.abs().min_element() < EPSILON {
            return Mat4::IDENTITY;
        }

        let rotation = Mat3::from_quat(self.orientation());
        Mat4::from_mat3(rotation * Mat3::from_diagonal(self.scale.recip()))
    }
}
