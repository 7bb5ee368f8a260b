//! Renderer error type.

use thiserror::Error;

/// Errors that abort the frame loop.
///
/// Out-of-date and suboptimal swapchains never show up here; the renderer
/// recovers from them by recreating the swapchain.
#[derive(Error, Debug)]
pub enum RendererError {
    /// Vulkan or GPU resource failure
    #[error(transparent)]
    Rhi(#[from] vista_rhi::RhiError),

    /// Mesh loading or upload failure
    #[error(transparent)]
    Resource(#[from] vista_resources::ResourceError),

    /// Window or configuration failure
    #[error(transparent)]
    Core(#[from] vista_core::Error),
}

/// Result type alias for renderer operations.
pub type RendererResult<T> = std::result::Result<T, RendererError>;
