//! Error types for resource loading.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for resource loading operations.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// Failed to load an OBJ file.
    #[error("Failed to load OBJ file '{path}': {message}")]
    ObjLoad {
        /// Path to the file that failed to load.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// OBJ data could not be parsed.
    #[error("Failed to parse OBJ data: {0}")]
    ObjParse(#[from] tobj::LoadError),

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A mesh needs at least one triangle's worth of vertices.
    #[error("Mesh needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// GPU upload failed.
    #[error(transparent)]
    Rhi(#[from] vista_rhi::RhiError),
}

/// Result type alias for resource operations.
pub type ResourceResult<T> = Result<T, ResourceError>;
