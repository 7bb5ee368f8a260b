//! CPU-side mesh building and GPU-resident meshes.
//!
//! A [`MeshBuilder`] collects vertices and optional indices, either directly
//! or from an OBJ file. [`Mesh::new`] uploads it into device-local buffers
//! once; the mesh is immutable afterwards and is normally shared behind an
//! `Arc` by every object that draws it.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vista_rhi::device::Device;
//! use vista_resources::{Mesh, MeshBuilder};
//!
//! # fn example(device: Arc<Device>) -> Result<(), vista_resources::ResourceError> {
//! let builder = MeshBuilder::from_obj_file("models/smooth_vase.obj")?;
//! let mesh = Arc::new(Mesh::new(device, &builder)?);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use glam::{Vec2, Vec3};
use tracing::{debug, info};
use vista_rhi::buffer::{Buffer, BufferUsage};
use vista_rhi::command::CommandBuffer;
use vista_rhi::device::Device;

use crate::error::{ResourceError, ResourceResult};
use crate::vertex::{Vertex, VertexKey};

/// Fewest vertices a mesh may be built from.
pub const MIN_VERTEX_COUNT: usize = 3;

/// Vertex and index lists waiting to be uploaded.
///
/// An empty `indices` list means the vertices are drawn in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuilder {
    /// Vertex data.
    pub vertices: Vec<Vertex>,
    /// Index data, empty for non-indexed drawing.
    pub indices: Vec<u32>,
}

impl MeshBuilder {
    /// Creates a builder from explicit lists.
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Builds an indexed mesh from a raw vertex stream, merging identical
    /// vertices.
    pub fn deduplicated(stream: impl IntoIterator<Item = Vertex>) -> Self {
        let mut builder = Self::default();
        let mut seen = HashMap::new();
        for vertex in stream {
            builder.push_deduplicated(vertex, &mut seen);
        }
        builder
    }

    /// Appends one index for `vertex`, appending the vertex itself only the
    /// first time its [`VertexKey`] is seen.
    pub fn push_deduplicated(&mut self, vertex: Vertex, seen: &mut HashMap<VertexKey, u32>) {
        let next = self.vertices.len() as u32;
        let index = *seen.entry(vertex.key()).or_insert(next);
        if index == next {
            self.vertices.push(vertex);
        }
        self.indices.push(index);
    }

    /// Loads every model in an OBJ file into one builder.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ObjLoad`] if the file cannot be opened or
    /// parsed.
    pub fn from_obj_file(path: impl AsRef<Path>) -> ResourceResult<Self> {
        let path = path.as_ref();
        let obj_error = |message: String| ResourceError::ObjLoad {
            path: path.to_path_buf(),
            message,
        };

        let file = File::open(path).map_err(|e| obj_error(e.to_string()))?;
        let mut reader = BufReader::new(file);
        let builder = Self::from_obj_reader(&mut reader).map_err(|e| match e {
            ResourceError::ObjParse(e) => obj_error(e.to_string()),
            other => other,
        })?;

        info!(
            "Loaded {}: {} vertices, {} indices",
            path.display(),
            builder.vertices.len(),
            builder.indices.len()
        );
        Ok(builder)
    }

    /// Parses OBJ text. Material libraries are ignored.
    ///
    /// Faces are triangulated. Position and color follow the position index,
    /// normal and uv follow their own indices. Missing normals and uvs are
    /// zero, missing colors are white.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ObjParse`] if the data is malformed.
    pub fn from_obj_reader(reader: &mut impl BufRead) -> ResourceResult<Self> {
        let options = tobj::LoadOptions {
            triangulate: true,
            single_index: false,
            ..Default::default()
        };
        let (models, _materials) =
            tobj::load_obj_buf(reader, &options, |_| Ok(Default::default()))?;

        let mut builder = Self::default();
        let mut seen = HashMap::new();

        for model in &models {
            let mesh = &model.mesh;
            for (i, &position_index) in mesh.indices.iter().enumerate() {
                let p = position_index as usize;

                let position = vec3_at(&mesh.positions, p).unwrap_or(Vec3::ZERO);
                let color = vec3_at(&mesh.vertex_color, p).unwrap_or(Vec3::ONE);
                let normal = mesh
                    .normal_indices
                    .get(i)
                    .and_then(|&n| vec3_at(&mesh.normals, n as usize))
                    .unwrap_or(Vec3::ZERO);
                let uv = mesh
                    .texcoord_indices
                    .get(i)
                    .and_then(|&t| vec2_at(&mesh.texcoords, t as usize))
                    .unwrap_or(Vec2::ZERO);

                builder.push_deduplicated(Vertex::new(position, color, normal, uv), &mut seen);
            }
        }

        Ok(builder)
    }

    /// Returns the vertex count if it is enough to form a triangle.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TooFewVertices`] below [`MIN_VERTEX_COUNT`].
    pub fn checked_vertex_count(&self) -> ResourceResult<u32> {
        let count = self.vertices.len();
        if count < MIN_VERTEX_COUNT {
            return Err(ResourceError::TooFewVertices(count));
        }
        Ok(count as u32)
    }

    /// True if the mesh will be drawn through an index buffer.
    #[inline]
    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }
}

fn vec3_at(data: &[f32], index: usize) -> Option<Vec3> {
    data.get(3 * index..3 * index + 3).map(Vec3::from_slice)
}

fn vec2_at(data: &[f32], index: usize) -> Option<Vec2> {
    data.get(2 * index..2 * index + 2).map(Vec2::from_slice)
}

/// Device-local geometry, immutable after construction.
pub struct Mesh {
    vertex_buffer: Buffer,
    vertex_count: u32,
    index_buffer: Option<Buffer>,
    index_count: u32,
}

impl Mesh {
    /// Uploads a builder's data into device-local buffers.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TooFewVertices`] before touching the GPU if
    /// the builder has fewer than 3 vertices, or an RHI error if an upload
    /// fails.
    pub fn new(device: Arc<Device>, builder: &MeshBuilder) -> ResourceResult<Self> {
        let vertex_count = builder.checked_vertex_count()?;

        let vertex_buffer = Buffer::new_device_local(
            Arc::clone(&device),
            BufferUsage::Vertex,
            bytemuck::cast_slice(&builder.vertices),
        )?;

        let index_buffer = if builder.is_indexed() {
            Some(Buffer::new_device_local(
                device,
                BufferUsage::Index,
                bytemuck::cast_slice(&builder.indices),
            )?)
        } else {
            None
        };

        debug!(
            "Created mesh: {} vertices, {} indices",
            vertex_count,
            builder.indices.len()
        );

        Ok(Self {
            vertex_buffer,
            vertex_count,
            index_buffer,
            index_count: builder.indices.len() as u32,
        })
    }

    /// Binds the vertex buffer at binding 0 and the index buffer if present.
    pub fn bind(&self, cmd: &CommandBuffer) {
        cmd.bind_vertex_buffers(0, &[self.vertex_buffer.handle()], &[0]);
        if let Some(index_buffer) = &self.index_buffer {
            cmd.bind_index_buffer_u32(index_buffer.handle(), 0);
        }
    }

    /// Records the draw call. Must follow [`Mesh::bind`].
    pub fn draw(&self, cmd: &CommandBuffer) {
        if self.index_buffer.is_some() {
            cmd.draw_indexed(self.index_count);
        } else {
            cmd.draw(self.vertex_count);
        }
    }

    /// Returns the number of unique vertices.
    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Returns the number of indices, zero when drawn non-indexed.
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

impl std::fmt::Debug for Mesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mesh")
            .field("vertex_count", &self.vertex_count)
            .field("index_count", &self.index_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(x: f32) -> Vertex {
        Vertex::new(Vec3::new(x, 0.0, 0.0), Vec3::ONE, Vec3::Z, Vec2::ZERO)
    }

    #[test]
    fn test_push_deduplicated_first_occurrence_wins() {
        let mut builder = MeshBuilder::default();
        let mut seen = HashMap::new();

        builder.push_deduplicated(vertex(0.0), &mut seen);
        builder.push_deduplicated(vertex(1.0), &mut seen);
        builder.push_deduplicated(vertex(0.0), &mut seen);

        assert_eq!(builder.vertices, vec![vertex(0.0), vertex(1.0)]);
        assert_eq!(builder.indices, vec![0, 1, 0]);
    }

    #[test]
    fn test_deduplicated_quad() {
        let stream = [
            vertex(0.0),
            vertex(1.0),
            vertex(2.0),
            vertex(2.0),
            vertex(3.0),
            vertex(0.0),
        ];
        let builder = MeshBuilder::deduplicated(stream);

        assert_eq!(builder.vertices.len(), 4);
        assert_eq!(builder.indices, vec![0, 1, 2, 2, 3, 0]);
        assert!(builder.is_indexed());
    }

    #[test]
    fn test_checked_vertex_count_rejects_degenerate() {
        for count in 0..MIN_VERTEX_COUNT {
            let builder = MeshBuilder::new((0..count).map(|i| vertex(i as f32)).collect(), vec![]);
            assert!(matches!(
                builder.checked_vertex_count(),
                Err(ResourceError::TooFewVertices(n)) if n == count
            ));
        }
    }

    #[test]
    fn test_checked_vertex_count_accepts_triangle() {
        let builder = MeshBuilder::new(vec![vertex(0.0), vertex(1.0), vertex(2.0)], vec![]);
        assert_eq!(builder.checked_vertex_count().unwrap(), 3);
        assert!(!builder.is_indexed());
    }

    #[test]
    fn test_vec_at_out_of_range() {
        let data = [1.0, 2.0, 3.0];
        assert_eq!(vec3_at(&data, 0), Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(vec3_at(&data, 1), None);
        assert_eq!(vec2_at(&data, 1), None);
    }
}
