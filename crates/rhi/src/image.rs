//! Depth attachments for swapchain framebuffers.
//!
//! Each swapchain image gets its own [`DepthImage`] so that a frame recording
//! into one framebuffer never shares a depth attachment with a frame still
//! being rendered into another.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ash::vk;
//! use vista_rhi::device::Device;
//! use vista_rhi::image::{DepthImage, find_depth_format};
//!
//! # fn example(device: Arc<Device>) -> Result<(), vista_rhi::RhiError> {
//! let format = find_depth_format(&device)?;
//! let depth = DepthImage::new(device, vk::Extent2D { width: 800, height: 600 }, format)?;
//! let _view = depth.view();
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use ash::vk;
use gpu_allocator::MemoryLocation;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use tracing::{debug, error, trace};

use crate::device::Device;
use crate::error::{RhiError, RhiResult};

/// Depth formats in order of preference.
pub const DEPTH_FORMAT_CANDIDATES: [vk::Format; 3] = [
    vk::Format::D32_SFLOAT,
    vk::Format::D32_SFLOAT_S8_UINT,
    vk::Format::D24_UNORM_S8_UINT,
];

/// Picks the first candidate usable as an optimally tiled depth attachment.
///
/// # Errors
///
/// Returns [`RhiError::SwapchainError`] if the GPU supports none of them.
pub fn find_depth_format(device: &Device) -> RhiResult<vk::Format> {
    let format = device.find_supported_format(
        &DEPTH_FORMAT_CANDIDATES,
        vk::ImageTiling::OPTIMAL,
        vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT,
    )?;
    debug!("Depth format: {:?}", format);
    Ok(format)
}

/// Device-local depth image with its view. Freed on drop.
pub struct DepthImage {
    device: Arc<Device>,
    image: vk::Image,
    view: vk::ImageView,
    allocation: Option<Allocation>,
    format: vk::Format,
    extent: vk::Extent2D,
}

impl DepthImage {
    /// Creates a depth image and view sized to `extent`.
    ///
    /// # Arguments
    ///
    /// * `device` - The logical device
    /// * `extent` - Attachment size, normally the swapchain extent
    /// * `format` - Depth format from [`find_depth_format`]
    ///
    /// # Errors
    ///
    /// Returns an error if `extent` is degenerate, or image creation,
    /// allocation or view creation fails.
    pub fn new(device: Arc<Device>, extent: vk::Extent2D, format: vk::Format) -> RhiResult<Self> {
        if extent.width == 0 || extent.height == 0 {
            return Err(RhiError::SwapchainError(format!(
                "Depth image extent must be non-zero, got {}x{}",
                extent.width, extent.height
            )));
        }

        let image_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .format(format)
            .extent(vk::Extent3D {
                width: extent.width,
                height: extent.height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);

        let image = unsafe { device.handle().create_image(&image_info, None)? };
        let requirements = unsafe { device.handle().get_image_memory_requirements(image) };

        let allocation = device
            .allocator()
            .lock()
            .map_err(|_| RhiError::SwapchainError("Allocator lock poisoned".to_string()))
            .and_then(|mut allocator| {
                Ok(allocator.allocate(&AllocationCreateDesc {
                    name: "depth",
                    requirements,
                    location: MemoryLocation::GpuOnly,
                    linear: false,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })?)
            });
        let allocation = match allocation {
            Ok(allocation) => allocation,
            Err(e) => {
                unsafe { device.handle().destroy_image(image, None) };
                return Err(e);
            }
        };

        let mut depth = Self {
            device,
            image,
            view: vk::ImageView::null(),
            allocation: Some(allocation),
            format,
            extent,
        };

        if let Some(allocation) = depth.allocation.as_ref() {
            unsafe {
                depth.device.handle().bind_image_memory(
                    image,
                    allocation.memory(),
                    allocation.offset(),
                )?;
            }
        }

        let view_info = vk::ImageViewCreateInfo::default()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format)
            .subresource_range(
                vk::ImageSubresourceRange::default()
                    .aspect_mask(vk::ImageAspectFlags::DEPTH)
                    .base_mip_level(0)
                    .level_count(1)
                    .base_array_layer(0)
                    .layer_count(1),
            );
        depth.view = unsafe { depth.device.handle().create_image_view(&view_info, None)? };

        trace!(
            "Created depth image: {}x{} ({:?})",
            extent.width, extent.height, format
        );

        Ok(depth)
    }

    /// Returns the image view used as the framebuffer attachment.
    #[inline]
    pub fn view(&self) -> vk::ImageView {
        self.view
    }

    /// Returns the depth format.
    #[inline]
    pub fn format(&self) -> vk::Format {
        self.format
    }

    /// Returns the attachment extent.
    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }
}

impl Drop for DepthImage {
    fn drop(&mut self) {
        unsafe {
            if self.view != vk::ImageView::null() {
                self.device.handle().destroy_image_view(self.view, None);
            }
            self.device.handle().destroy_image(self.image, None);
        }

        if let Some(allocation) = self.allocation.take() {
            match self.device.allocator().lock() {
                Ok(mut allocator) => {
                    if let Err(e) = allocator.free(allocation) {
                        error!("Failed to free depth image allocation: {:?}", e);
                    }
                }
                Err(_) => error!("Leaking depth image allocation: allocator lock poisoned"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_candidates_prefer_pure_depth() {
        assert_eq!(DEPTH_FORMAT_CANDIDATES[0], vk::Format::D32_SFLOAT);
        assert!(DEPTH_FORMAT_CANDIDATES.contains(&vk::Format::D24_UNORM_S8_UINT));
    }
}
