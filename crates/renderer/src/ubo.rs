//! Uniform and push-constant payloads shared with the GLSL shaders.
//!
//! These structures must match the shader block layouts exactly. All use
//! `#[repr(C)]` with 16-byte aligned matrix members and implement `Pod` and
//! `Zeroable` for byte casting.

use ash::vk;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use vista_scene::{Camera, Transform};

/// Per-frame camera uniform (set 0, binding 0 of the 3D pipeline).
///
/// # Memory Layout
///
/// - Offset 0: view matrix (64 bytes)
/// - Offset 64: projection matrix (64 bytes)
/// - Total size: 128 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GlobalUbo {
    /// World to view space.
    pub view: Mat4,
    /// View to clip space.
    pub projection: Mat4,
}

impl GlobalUbo {
    /// Size of the struct in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Snapshot of `camera`'s current matrices.
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view: *camera.view(),
            projection: *camera.projection(),
        }
    }
}

/// Per-draw push constants of the 3D pipeline.
///
/// # Memory Layout
///
/// - Offset 0: model matrix (64 bytes)
/// - Offset 64: normal matrix, a 3x3 widened to 4x4 (64 bytes)
/// - Total size: 128 bytes, the minimum push-constant size Vulkan guarantees
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SimplePushConstants {
    /// Object to world space.
    pub model: Mat4,
    /// Transforms normals under non-uniform scale.
    pub normal_matrix: Mat4,
}

impl Default for SimplePushConstants {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY,
            normal_matrix: Mat4::IDENTITY,
        }
    }
}

impl SimplePushConstants {
    /// Size of the struct in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Builds the payload for one object.
    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            model: transform.matrix(),
            normal_matrix: transform.normal_matrix(),
        }
    }
}

/// Per-draw push constants of the 2D pipeline: object space only.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FlatPushConstants {
    /// Object to clip space.
    pub model: Mat4,
}

impl Default for FlatPushConstants {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY,
        }
    }
}

impl FlatPushConstants {
    /// Size of the struct in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Builds the payload for one object.
    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            model: transform.matrix(),
        }
    }
}

/// Stages that read the push-constant block of both pipelines.
pub const PUSH_CONSTANT_STAGES: vk::ShaderStageFlags = vk::ShaderStageFlags::from_raw(
    vk::ShaderStageFlags::VERTEX.as_raw() | vk::ShaderStageFlags::FRAGMENT.as_raw(),
);

/// A single push-constant range at offset 0 sized for `T`.
pub fn push_constant_range<T: Pod>() -> vk::PushConstantRange {
    vk::PushConstantRange {
        stage_flags: PUSH_CONSTANT_STAGES,
        offset: 0,
        size: std::mem::size_of::<T>() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_global_ubo_size() {
        // 2 Mat4 (2 * 64) = 128 bytes
        assert_eq!(GlobalUbo::SIZE, 128);
    }

    #[test]
    fn test_global_ubo_alignment() {
        assert_eq!(std::mem::align_of::<GlobalUbo>(), 16);
        assert_eq!(std::mem::offset_of!(GlobalUbo, projection), 64);
    }

    #[test]
    fn test_push_constant_sizes() {
        assert_eq!(SimplePushConstants::SIZE, 128);
        assert_eq!(std::mem::offset_of!(SimplePushConstants, normal_matrix), 64);
        assert_eq!(FlatPushConstants::SIZE, 64);
        assert_eq!(std::mem::align_of::<SimplePushConstants>(), 16);
    }

    #[test]
    fn test_global_ubo_from_camera() {
        let mut camera = Camera::new();
        camera.set_perspective_projection(50f32.to_radians(), 1.5, 0.1, 10.0);
        camera.set_view_euler(Vec3::new(0.0, -1.0, -2.0), Vec3::new(0.1, 0.2, 0.0));

        let ubo = GlobalUbo::from_camera(&camera);
        assert_eq!(ubo.view, *camera.view());
        assert_eq!(ubo.projection, *camera.projection());
    }

    #[test]
    fn test_translation_only_object_yields_translation_matrix() {
        let transform = Transform {
            translation: Vec3::new(0.0, 0.0, 2.5),
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
        };

        let push = SimplePushConstants::from_transform(&transform);
        assert_eq!(push.model, Mat4::from_translation(Vec3::new(0.0, 0.0, 2.5)));
        assert_eq!(push.normal_matrix, Mat4::IDENTITY);

        let flat = FlatPushConstants::from_transform(&transform);
        assert_eq!(flat.model, push.model);
    }

    #[test]
    fn test_non_uniform_scale_changes_normal_matrix() {
        let transform = Transform::new().with_scale(Vec3::new(2.0, 1.0, 1.0));
        let push = SimplePushConstants::from_transform(&transform);

        let normal = push.normal_matrix.transform_vector3(Vec3::X);
        assert!((normal - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_push_constant_range() {
        let range = push_constant_range::<SimplePushConstants>();
        assert_eq!(range.offset, 0);
        assert_eq!(range.size, 128);
        assert!(range.stage_flags.contains(vk::ShaderStageFlags::VERTEX));
        assert!(range.stage_flags.contains(vk::ShaderStageFlags::FRAGMENT));

        assert_eq!(push_constant_range::<FlatPushConstants>().size, 64);
    }

    #[test]
    fn test_payloads_cast_to_bytes() {
        let push = SimplePushConstants::default();
        assert_eq!(bytemuck::bytes_of(&push).len(), SimplePushConstants::SIZE);

        let ubo = GlobalUbo::default();
        assert_eq!(bytemuck::bytes_of(&ubo).len(), GlobalUbo::SIZE);
    }
}
