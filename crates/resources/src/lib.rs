//! Mesh resources.
//!
//! This crate turns vertex data into GPU geometry:
//! - [`Vertex`] layout and its vertex input description
//! - [`MeshBuilder`] for CPU-side vertex/index lists, including OBJ loading
//! - [`Mesh`] holding device-local vertex and index buffers

pub mod error;
pub mod mesh;
pub mod vertex;

pub use error::{ResourceError, ResourceResult};
pub use mesh::{MIN_VERTEX_COUNT, Mesh, MeshBuilder};
pub use vertex::{Vertex, VertexKey};
