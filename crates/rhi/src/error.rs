//! RHI-specific error types.

use ash::vk;
use thiserror::Error;

/// RHI-specific error type.
///
/// Transient presentation statuses (`SUBOPTIMAL_KHR`, `ERROR_OUT_OF_DATE_KHR`)
/// never appear here; they are reported through
/// [`SwapchainStatus`](crate::swapchain::SwapchainStatus).
#[derive(Error, Debug)]
pub enum RhiError {
    /// Vulkan API error
    #[error("Vulkan error: {0}")]
    VulkanError(#[from] vk::Result),

    /// Failed to load Vulkan
    #[error("Failed to load Vulkan: {0}")]
    LoadingError(#[from] ash::LoadingError),

    /// GPU allocator error
    #[error("Allocator error: {0}")]
    AllocatorError(#[from] gpu_allocator::AllocationError),

    /// No suitable GPU found
    #[error("No suitable GPU found")]
    NoSuitableGpu,

    /// Shader module could not be loaded
    #[error("Shader error: {0}")]
    ShaderError(String),

    /// Surface creation or query error
    #[error("Surface error: {0}")]
    SurfaceError(String),

    /// Swapchain creation error
    #[error("Swapchain error: {0}")]
    SwapchainError(String),

    /// Recreated swapchain no longer matches the formats pipelines were built for
    #[error(
        "Swapchain image or depth format has changed: color {old_color:?} -> {new_color:?}, depth {old_depth:?} -> {new_depth:?}"
    )]
    FormatMismatch {
        old_color: vk::Format,
        new_color: vk::Format,
        old_depth: vk::Format,
        new_depth: vk::Format,
    },

    /// Buffer creation or upload error
    #[error("Buffer error: {0}")]
    BufferError(String),

    /// Pipeline creation error
    #[error("Pipeline error: {0}")]
    PipelineError(String),
}

/// Result type alias for RHI operations.
pub type RhiResult<T> = std::result::Result<T, RhiError>;
