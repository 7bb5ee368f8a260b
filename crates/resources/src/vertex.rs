//! Mesh vertex format and its vertex input description.
//!
//! # Memory Layout
//!
//! `#[repr(C)]`, 44 bytes, no padding:
//! - Offset 0: position (12 bytes), location 0
//! - Offset 12: color (12 bytes), location 1
//! - Offset 24: normal (12 bytes), location 2
//! - Offset 36: uv (8 bytes), location 3

use std::mem::offset_of;

use ash::vk;
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Vertex consumed by both render systems.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: Vec3,
    /// Linear RGB color.
    pub color: Vec3,
    /// Object-space normal.
    pub normal: Vec3,
    /// Texture coordinates.
    pub uv: Vec2,
}

impl Vertex {
    /// Creates a vertex.
    #[inline]
    pub const fn new(position: Vec3, color: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            color,
            normal,
            uv,
        }
    }

    /// Binding 0, one element per vertex.
    pub fn binding_description() -> vk::VertexInputBindingDescription {
        vk::VertexInputBindingDescription {
            binding: 0,
            stride: std::mem::size_of::<Self>() as u32,
            input_rate: vk::VertexInputRate::VERTEX,
        }
    }

    /// Attributes at locations 0..=3 in field order.
    pub fn attribute_descriptions() -> [vk::VertexInputAttributeDescription; 4] {
        [
            vk::VertexInputAttributeDescription {
                binding: 0,
                location: 0,
                format: vk::Format::R32G32B32_SFLOAT,
                offset: offset_of!(Vertex, position) as u32,
            },
            vk::VertexInputAttributeDescription {
                binding: 0,
                location: 1,
                format: vk::Format::R32G32B32_SFLOAT,
                offset: offset_of!(Vertex, color) as u32,
            },
            vk::VertexInputAttributeDescription {
                binding: 0,
                location: 2,
                format: vk::Format::R32G32B32_SFLOAT,
                offset: offset_of!(Vertex, normal) as u32,
            },
            vk::VertexInputAttributeDescription {
                binding: 0,
                location: 3,
                format: vk::Format::R32G32_SFLOAT,
                offset: offset_of!(Vertex, uv) as u32,
            },
        ]
    }

    /// Bit-exact identity of all four attributes.
    ///
    /// Two vertices share a key iff every float is bitwise equal, so `0.0`
    /// and `-0.0` are distinct and NaNs with the same payload are equal.
    pub fn key(&self) -> VertexKey {
        let mut bits = [0u32; 11];
        let floats: &[f32; 11] = bytemuck::cast_ref(self);
        for (bit, float) in bits.iter_mut().zip(floats) {
            *bit = float.to_bits();
        }
        VertexKey(bits)
    }
}

/// Hashable identity of a [`Vertex`], see [`Vertex::key`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VertexKey([u32; 11]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size() {
        assert_eq!(std::mem::size_of::<Vertex>(), 44);
    }

    #[test]
    fn test_vertex_binding_description() {
        let binding = Vertex::binding_description();
        assert_eq!(binding.binding, 0);
        assert_eq!(binding.stride, 44);
        assert_eq!(binding.input_rate, vk::VertexInputRate::VERTEX);
    }

    #[test]
    fn test_vertex_attribute_descriptions() {
        let attrs = Vertex::attribute_descriptions();

        let locations: Vec<u32> = attrs.iter().map(|a| a.location).collect();
        assert_eq!(locations, vec![0, 1, 2, 3]);

        let offsets: Vec<u32> = attrs.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24, 36]);

        assert_eq!(attrs[0].format, vk::Format::R32G32B32_SFLOAT);
        assert_eq!(attrs[1].format, vk::Format::R32G32B32_SFLOAT);
        assert_eq!(attrs[2].format, vk::Format::R32G32B32_SFLOAT);
        assert_eq!(attrs[3].format, vk::Format::R32G32_SFLOAT);
    }

    #[test]
    fn test_key_equal_for_identical_vertices() {
        let a = Vertex::new(Vec3::ONE, Vec3::X, Vec3::Y, Vec2::new(0.25, 0.75));
        let b = a;
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_key_differs_per_attribute() {
        let base = Vertex::new(Vec3::ONE, Vec3::ONE, Vec3::Y, Vec2::ZERO);

        let moved = Vertex {
            position: Vec3::ZERO,
            ..base
        };
        let recolored = Vertex {
            color: Vec3::X,
            ..base
        };
        let turned = Vertex {
            normal: Vec3::Z,
            ..base
        };
        let remapped = Vertex {
            uv: Vec2::ONE,
            ..base
        };

        for other in [moved, recolored, turned, remapped] {
            assert_ne!(base.key(), other.key());
        }
    }

    #[test]
    fn test_key_distinguishes_signed_zero() {
        let positive = Vertex::default();
        let negative = Vertex {
            position: Vec3::new(-0.0, 0.0, 0.0),
            ..positive
        };
        assert_eq!(positive, negative);
        assert_ne!(positive.key(), negative.key());
    }
}
