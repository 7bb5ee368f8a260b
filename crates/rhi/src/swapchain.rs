//! Swapchain, its framebuffers and the acquire/submit/present protocol.
//!
//! # Overview
//!
//! A [`Swapchain`] owns everything whose lifetime is tied to one negotiated
//! surface configuration:
//! - the presentable images and their views
//! - one [`DepthImage`] per presentable image
//! - the [`RenderPass`] and one framebuffer per image
//! - per-frame-slot [`FrameSync`] objects and the [`ImageFenceTable`]
//!
//! When the surface changes, the whole object is replaced: the renderer builds
//! a new one with [`Swapchain::new`], passing the old one as `previous` so the
//! driver can hand over resources, then drops the old one.
//!
//! # Statuses
//!
//! `VK_SUBOPTIMAL_KHR` and `VK_ERROR_OUT_OF_DATE_KHR` are not errors here.
//! Acquire reports them through [`AcquiredImage`], present through
//! [`SwapchainStatus`]. Every other failure is an [`RhiError`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ash::vk;
//! use vista_rhi::command::CommandBuffer;
//! use vista_rhi::device::Device;
//! use vista_rhi::swapchain::{AcquiredImage, Swapchain};
//!
//! # fn example(
//! #     device: Arc<Device>,
//! #     loader: &ash::khr::surface::Instance,
//! #     surface: vk::SurfaceKHR,
//! #     cmd: &CommandBuffer,
//! # ) -> Result<(), vista_rhi::RhiError> {
//! let extent = vk::Extent2D { width: 800, height: 600 };
//! let mut swapchain = Swapchain::new(device, loader, surface, extent, true, None)?;
//!
//! if let AcquiredImage::Ready { image_index, .. } = swapchain.acquire_next_image(0)? {
//!     // ... record `cmd` against swapchain.framebuffer(image_index) ...
//!     let status = swapchain.submit_command_buffers(cmd, image_index, 0)?;
//!     if status.needs_recreation() {
//!         // rebuild with Swapchain::new(.., Some(&swapchain))
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use ash::vk;
use tracing::{debug, info, warn};

use crate::command::CommandBuffer;
use crate::device::Device;
use crate::error::{RhiError, RhiResult};
use crate::image::{DepthImage, find_depth_format};
use crate::render_pass::RenderPass;
use crate::sync::{FrameSync, ImageFenceTable};

/// Surface capabilities, formats and present modes for one GPU.
#[derive(Debug, Clone)]
pub struct SwapchainSupportDetails {
    /// Surface capabilities (image count and extent limits, transform)
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    /// Supported format and color space pairs
    pub formats: Vec<vk::SurfaceFormatKHR>,
    /// Supported present modes
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SwapchainSupportDetails {
    /// Queries what `surface` supports on `physical_device`.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the queries fail.
    pub fn query(
        surface_loader: &ash::khr::surface::Instance,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> RhiResult<Self> {
        let capabilities = unsafe {
            surface_loader.get_physical_device_surface_capabilities(physical_device, surface)?
        };
        let formats = unsafe {
            surface_loader.get_physical_device_surface_formats(physical_device, surface)?
        };
        let present_modes = unsafe {
            surface_loader.get_physical_device_surface_present_modes(physical_device, surface)?
        };

        debug!(
            "Swapchain support: {} formats, {} present modes, image count {}..{}",
            formats.len(),
            present_modes.len(),
            capabilities.min_image_count,
            capabilities.max_image_count
        );

        Ok(Self {
            capabilities,
            formats,
            present_modes,
        })
    }

    /// True if at least one format and one present mode are available.
    #[inline]
    pub fn is_adequate(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }
}

/// Outcome of a present that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwapchainStatus {
    /// The swapchain matches the surface
    Optimal,
    /// Presentation worked but the swapchain no longer matches the surface exactly
    Suboptimal,
    /// The swapchain can no longer present to the surface
    OutOfDate,
}

impl SwapchainStatus {
    /// Maps the result of `vkQueuePresentKHR`.
    ///
    /// # Errors
    ///
    /// Any result other than success, suboptimal or out-of-date.
    pub fn from_present_result(result: Result<bool, vk::Result>) -> RhiResult<Self> {
        match result {
            Ok(false) => Ok(Self::Optimal),
            Ok(true) => Ok(Self::Suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(Self::OutOfDate),
            Err(e) => Err(RhiError::VulkanError(e)),
        }
    }

    /// True if the swapchain should be rebuilt.
    #[inline]
    pub fn needs_recreation(self) -> bool {
        self != Self::Optimal
    }
}

/// Outcome of an image acquisition that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcquiredImage {
    /// An image is ready to be rendered into
    Ready {
        /// Index of the acquired image
        image_index: u32,
        /// The swapchain still works but should be rebuilt soon
        suboptimal: bool,
    },
    /// No image was acquired; the swapchain must be rebuilt first
    OutOfDate,
}

impl AcquiredImage {
    /// Maps the result of `vkAcquireNextImageKHR`.
    ///
    /// # Errors
    ///
    /// Any result other than success, suboptimal or out-of-date.
    pub fn from_acquire_result(result: Result<(u32, bool), vk::Result>) -> RhiResult<Self> {
        match result {
            Ok((image_index, suboptimal)) => Ok(Self::Ready {
                image_index,
                suboptimal,
            }),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(Self::OutOfDate),
            Err(e) => Err(RhiError::VulkanError(e)),
        }
    }
}

/// Color and depth formats a swapchain renders with.
///
/// Pipelines are built against a render pass with these formats, so a
/// replacement swapchain must keep them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapchainFormats {
    /// Presentable image format
    pub color: vk::Format,
    /// Depth attachment format
    pub depth: vk::Format,
}

impl SwapchainFormats {
    /// True if both formats are equal.
    #[inline]
    pub fn matches(&self, other: &SwapchainFormats) -> bool {
        self.color == other.color && self.depth == other.depth
    }

    /// Checks that `new` can replace `self`.
    ///
    /// # Errors
    ///
    /// Returns [`RhiError::FormatMismatch`] if either format changed.
    pub fn ensure_compatible(&self, new: &SwapchainFormats) -> RhiResult<()> {
        if self.matches(new) {
            Ok(())
        } else {
            Err(self.mismatch(new))
        }
    }

    /// The error reported when `new` replaces `self` with different formats.
    pub fn mismatch(&self, new: &SwapchainFormats) -> RhiError {
        RhiError::FormatMismatch {
            old_color: self.color,
            new_color: new.color,
            old_depth: self.depth,
            new_depth: new.depth,
        }
    }
}

/// Vulkan swapchain with its attachments, render pass, framebuffers and
/// frame-slot synchronization.
///
/// # Thread Safety
///
/// Not synchronized. The frame loop drives it from one thread.
pub struct Swapchain {
    device: Arc<Device>,
    swapchain_loader: ash::khr::swapchain::Device,
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,
    framebuffers: Vec<vk::Framebuffer>,
    depth_images: Vec<DepthImage>,
    render_pass: RenderPass,
    frame_sync: Vec<FrameSync>,
    images_in_flight: ImageFenceTable,
    formats: SwapchainFormats,
    extent: vk::Extent2D,
}

impl Swapchain {
    /// Creates a swapchain and everything that depends on its images.
    ///
    /// # Arguments
    ///
    /// * `device` - The logical device
    /// * `surface_loader` - Surface extension loader for `surface`
    /// * `surface` - Window surface to present to
    /// * `window_extent` - Drawable size of the window, used when the surface
    ///   leaves the extent up to the swapchain
    /// * `prefer_mailbox` - Use MAILBOX present mode when available
    /// * `previous` - Swapchain being replaced, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be queried or any object
    /// creation fails.
    pub fn new(
        device: Arc<Device>,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
        window_extent: vk::Extent2D,
        prefer_mailbox: bool,
        previous: Option<&Swapchain>,
    ) -> RhiResult<Self> {
        let swapchain_loader =
            ash::khr::swapchain::Device::new(device.instance().handle(), device.handle());

        let support =
            SwapchainSupportDetails::query(surface_loader, device.physical_device(), surface)?;
        if !support.is_adequate() {
            return Err(RhiError::SwapchainError(
                "Surface reports no formats or present modes".to_string(),
            ));
        }

        let surface_format = choose_surface_format(&support.formats);
        let present_mode = choose_present_mode(&support.present_modes, prefer_mailbox);
        let extent = choose_extent(&support.capabilities, window_extent);
        let min_image_count = determine_image_count(&support.capabilities);

        let families = device.queue_families();
        let (graphics_family, present_family) =
            match (families.graphics_family, families.present_family) {
                (Some(graphics), Some(present)) => (graphics, present),
                _ => {
                    return Err(RhiError::SwapchainError(
                        "Device has no graphics or present queue family".to_string(),
                    ));
                }
            };
        let family_indices = [graphics_family, present_family];
        let (sharing_mode, shared_families) = if graphics_family != present_family {
            (vk::SharingMode::CONCURRENT, &family_indices[..])
        } else {
            (vk::SharingMode::EXCLUSIVE, &[][..])
        };

        let formats = SwapchainFormats {
            color: surface_format.format,
            depth: find_depth_format(&device)?,
        };
        let render_pass = RenderPass::new(device.clone(), formats.color, formats.depth)?;
        let frame_sync = FrameSync::for_all_slots(&device)?;

        let old_swapchain = previous.map_or(vk::SwapchainKHR::null(), |old| old.swapchain);

        let create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(surface)
            .min_image_count(min_image_count)
            .image_format(surface_format.format)
            .image_color_space(surface_format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(sharing_mode)
            .queue_family_indices(shared_families)
            .pre_transform(support.capabilities.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(old_swapchain);

        let swapchain = unsafe { swapchain_loader.create_swapchain(&create_info, None)? };
        let images = match unsafe { swapchain_loader.get_swapchain_images(swapchain) } {
            Ok(images) => images,
            Err(e) => {
                unsafe { swapchain_loader.destroy_swapchain(swapchain, None) };
                return Err(e.into());
            }
        };

        let images_in_flight = ImageFenceTable::new(images.len());

        // From here on Drop cleans up whatever has been created.
        let mut this = Self {
            device,
            swapchain_loader,
            swapchain,
            images,
            image_views: Vec::new(),
            framebuffers: Vec::new(),
            depth_images: Vec::new(),
            render_pass,
            frame_sync,
            images_in_flight,
            formats,
            extent,
        };
        this.create_image_views()?;
        this.create_depth_images()?;
        this.create_framebuffers()?;

        info!(
            "Swapchain created: {}x{}, format {:?}, depth {:?}, {} images, present mode {:?}{}",
            extent.width,
            extent.height,
            formats.color,
            formats.depth,
            this.images.len(),
            present_mode,
            if previous.is_some() { " (recreated)" } else { "" }
        );

        Ok(this)
    }

    fn create_image_views(&mut self) -> RhiResult<()> {
        for &image in &self.images {
            let create_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(self.formats.color)
                .subresource_range(
                    vk::ImageSubresourceRange::default()
                        .aspect_mask(vk::ImageAspectFlags::COLOR)
                        .base_mip_level(0)
                        .level_count(1)
                        .base_array_layer(0)
                        .layer_count(1),
                );

            let view = unsafe { self.device.handle().create_image_view(&create_info, None)? };
            self.image_views.push(view);
        }
        Ok(())
    }

    fn create_depth_images(&mut self) -> RhiResult<()> {
        for _ in 0..self.images.len() {
            let depth = DepthImage::new(self.device.clone(), self.extent, self.formats.depth)?;
            self.depth_images.push(depth);
        }
        Ok(())
    }

    fn create_framebuffers(&mut self) -> RhiResult<()> {
        for (color_view, depth) in self.image_views.iter().zip(&self.depth_images) {
            let attachments = [*color_view, depth.view()];
            let create_info = vk::FramebufferCreateInfo::default()
                .render_pass(self.render_pass.handle())
                .attachments(&attachments)
                .width(self.extent.width)
                .height(self.extent.height)
                .layers(1);

            let framebuffer = unsafe { self.device.handle().create_framebuffer(&create_info, None)? };
            self.framebuffers.push(framebuffer);
        }
        Ok(())
    }

    /// Waits until frame slot `frame_index` has retired its previous
    /// submission, then acquires the next presentable image.
    ///
    /// Blocks on the slot's fence; the GPU normally finishes within a frame.
    ///
    /// # Errors
    ///
    /// Returns an error on device loss or any acquire failure other than
    /// out-of-date.
    ///
    /// # Panics
    ///
    /// Panics if `frame_index` is not below
    /// [`MAX_FRAMES_IN_FLIGHT`](crate::sync::MAX_FRAMES_IN_FLIGHT).
    pub fn acquire_next_image(&self, frame_index: usize) -> RhiResult<AcquiredImage> {
        let slot = &self.frame_sync[frame_index];
        slot.in_flight_fence().wait(u64::MAX)?;

        let result = unsafe {
            self.swapchain_loader.acquire_next_image(
                self.swapchain,
                u64::MAX,
                slot.image_available(),
                vk::Fence::null(),
            )
        };
        AcquiredImage::from_acquire_result(result)
    }

    /// Submits `command_buffer` for `image_index` and presents the image.
    ///
    /// If another frame slot's submission still uses the image, this waits
    /// for it first. The slot's fence is then bound to the image, reset and
    /// signaled by the submission.
    ///
    /// # Errors
    ///
    /// Returns an error if the submission fails, or presentation fails for a
    /// reason other than suboptimal or out-of-date.
    ///
    /// # Panics
    ///
    /// Panics if `image_index` or `frame_index` is out of range.
    pub fn submit_command_buffers(
        &mut self,
        command_buffer: &CommandBuffer,
        image_index: u32,
        frame_index: usize,
    ) -> RhiResult<SwapchainStatus> {
        let slot = &self.frame_sync[frame_index];
        let fence = slot.in_flight_fence().handle();

        if let Some(previous) = self.images_in_flight.claim(image_index as usize, fence) {
            self.device.wait_for_fence(previous, u64::MAX)?;
        }

        let wait_semaphores = [slot.image_available()];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = [command_buffer.handle()];
        let signal_semaphores = [slot.render_finished()];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        slot.in_flight_fence().reset()?;
        // SAFETY: the buffer was fully recorded by the caller, the semaphores
        // belong to this slot and the fence was just reset.
        unsafe { self.device.submit_graphics(&[submit_info], fence)? };

        let swapchains = [self.swapchain];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&signal_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let result = unsafe {
            self.swapchain_loader
                .queue_present(self.device.present_queue(), &present_info)
        };
        SwapchainStatus::from_present_result(result)
    }

    /// True iff `other` renders with the same color and depth formats.
    #[inline]
    pub fn compare_formats(&self, other: &Swapchain) -> bool {
        self.formats.matches(&other.formats)
    }

    /// Checks that `replacement` can take over from this swapchain without
    /// rebuilding the pipelines.
    ///
    /// # Errors
    ///
    /// Returns [`RhiError::FormatMismatch`] if [`Swapchain::compare_formats`]
    /// fails.
    pub fn ensure_replaceable_by(&self, replacement: &Swapchain) -> RhiResult<()> {
        if self.compare_formats(replacement) {
            Ok(())
        } else {
            Err(self.formats.mismatch(&replacement.formats))
        }
    }

    /// Color and depth formats.
    #[inline]
    pub fn formats(&self) -> SwapchainFormats {
        self.formats
    }

    /// Image extent.
    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    /// Width divided by height.
    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        self.extent.width as f32 / self.extent.height as f32
    }

    /// Number of presentable images.
    #[inline]
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Render pass all framebuffers were created against.
    #[inline]
    pub fn render_pass(&self) -> vk::RenderPass {
        self.render_pass.handle()
    }

    /// Framebuffer for image `image_index`.
    ///
    /// # Panics
    ///
    /// Panics if `image_index` is out of range.
    #[inline]
    pub fn framebuffer(&self, image_index: u32) -> vk::Framebuffer {
        self.framebuffers[image_index as usize]
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        unsafe {
            for &framebuffer in &self.framebuffers {
                self.device.handle().destroy_framebuffer(framebuffer, None);
            }
            for &view in &self.image_views {
                self.device.handle().destroy_image_view(view, None);
            }
            self.swapchain_loader
                .destroy_swapchain(self.swapchain, None);
        }
        // Depth images, render pass and sync objects drop with their fields.

        debug!(
            "Swapchain destroyed (was {}x{}, {} images)",
            self.extent.width,
            self.extent.height,
            self.images.len()
        );
    }
}

/// Prefers B8G8R8A8_SRGB / SRGB_NONLINEAR, else the first format reported.
///
/// `formats` must not be empty.
fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> vk::SurfaceFormatKHR {
    let preferred = formats.iter().find(|f| {
        f.format == vk::Format::B8G8R8A8_SRGB && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
    });

    match preferred {
        Some(&format) => format,
        None => {
            warn!(
                "B8G8R8A8_SRGB unavailable, using surface format {:?}",
                formats[0].format
            );
            formats[0]
        }
    }
}

/// MAILBOX if preferred and available, else FIFO (always supported).
fn choose_present_mode(
    present_modes: &[vk::PresentModeKHR],
    prefer_mailbox: bool,
) -> vk::PresentModeKHR {
    if prefer_mailbox && present_modes.contains(&vk::PresentModeKHR::MAILBOX) {
        return vk::PresentModeKHR::MAILBOX;
    }
    vk::PresentModeKHR::FIFO
}

/// The surface's current extent, or `window_extent` clamped to the surface
/// limits when the surface leaves the choice to the swapchain.
fn choose_extent(
    capabilities: &vk::SurfaceCapabilitiesKHR,
    window_extent: vk::Extent2D,
) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }

    vk::Extent2D {
        width: window_extent.width.clamp(
            capabilities.min_image_extent.width,
            capabilities.max_image_extent.width,
        ),
        height: window_extent.height.clamp(
            capabilities.min_image_extent.height,
            capabilities.max_image_extent.height,
        ),
    }
}

/// One more than the minimum, capped at the maximum (0 means no maximum).
fn determine_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let preferred = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 {
        preferred.min(capabilities.max_image_count)
    } else {
        preferred
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface_format(format: vk::Format) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR {
            format,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        }
    }

    #[test]
    fn test_choose_surface_format_prefers_srgb() {
        let formats = [
            surface_format(vk::Format::R8G8B8A8_UNORM),
            surface_format(vk::Format::B8G8R8A8_SRGB),
        ];
        let selected = choose_surface_format(&formats);
        assert_eq!(selected.format, vk::Format::B8G8R8A8_SRGB);
        assert_eq!(selected.color_space, vk::ColorSpaceKHR::SRGB_NONLINEAR);
    }

    #[test]
    fn test_choose_surface_format_fallback() {
        let formats = [surface_format(vk::Format::R8G8B8A8_UNORM)];
        assert_eq!(
            choose_surface_format(&formats).format,
            vk::Format::R8G8B8A8_UNORM
        );
    }

    #[test]
    fn test_choose_present_mode_prefers_mailbox() {
        let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX];
        assert_eq!(choose_present_mode(&modes, true), vk::PresentModeKHR::MAILBOX);
    }

    #[test]
    fn test_choose_present_mode_respects_preference() {
        let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX];
        assert_eq!(choose_present_mode(&modes, false), vk::PresentModeKHR::FIFO);
    }

    #[test]
    fn test_choose_present_mode_fallback_to_fifo() {
        let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::IMMEDIATE];
        assert_eq!(choose_present_mode(&modes, true), vk::PresentModeKHR::FIFO);
    }

    #[test]
    fn test_choose_extent_uses_current() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: 1920,
                height: 1080,
            },
            ..Default::default()
        };
        let extent = choose_extent(&capabilities, vk::Extent2D { width: 800, height: 600 });
        assert_eq!(extent, vk::Extent2D { width: 1920, height: 1080 });
    }

    #[test]
    fn test_choose_extent_clamps_to_limits() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: u32::MAX,
                height: u32::MAX,
            },
            min_image_extent: vk::Extent2D {
                width: 100,
                height: 100,
            },
            max_image_extent: vk::Extent2D {
                width: 2000,
                height: 2000,
            },
            ..Default::default()
        };

        let clamp = |width, height| choose_extent(&capabilities, vk::Extent2D { width, height });
        assert_eq!(clamp(3000, 3000), vk::Extent2D { width: 2000, height: 2000 });
        assert_eq!(clamp(50, 50), vk::Extent2D { width: 100, height: 100 });
        assert_eq!(clamp(800, 600), vk::Extent2D { width: 800, height: 600 });
    }

    #[test]
    fn test_determine_image_count() {
        let capped = vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 2,
            ..Default::default()
        };
        assert_eq!(determine_image_count(&capped), 2);

        let roomy = vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 8,
            ..Default::default()
        };
        assert_eq!(determine_image_count(&roomy), 3);

        let unlimited = vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 0,
            ..Default::default()
        };
        assert_eq!(determine_image_count(&unlimited), 3);
    }

    #[test]
    fn test_swapchain_support_details_is_adequate() {
        let adequate = SwapchainSupportDetails {
            capabilities: vk::SurfaceCapabilitiesKHR::default(),
            formats: vec![vk::SurfaceFormatKHR::default()],
            present_modes: vec![vk::PresentModeKHR::FIFO],
        };
        assert!(adequate.is_adequate());

        let no_formats = SwapchainSupportDetails {
            formats: vec![],
            ..adequate.clone()
        };
        assert!(!no_formats.is_adequate());

        let no_modes = SwapchainSupportDetails {
            present_modes: vec![],
            ..adequate
        };
        assert!(!no_modes.is_adequate());
    }

    #[test]
    fn test_present_status_classification() {
        assert_eq!(
            SwapchainStatus::from_present_result(Ok(false)).unwrap(),
            SwapchainStatus::Optimal
        );
        assert_eq!(
            SwapchainStatus::from_present_result(Ok(true)).unwrap(),
            SwapchainStatus::Suboptimal
        );
        assert_eq!(
            SwapchainStatus::from_present_result(Err(vk::Result::ERROR_OUT_OF_DATE_KHR)).unwrap(),
            SwapchainStatus::OutOfDate
        );
        assert!(matches!(
            SwapchainStatus::from_present_result(Err(vk::Result::ERROR_DEVICE_LOST)),
            Err(RhiError::VulkanError(vk::Result::ERROR_DEVICE_LOST))
        ));
    }

    #[test]
    fn test_only_optimal_skips_recreation() {
        assert!(!SwapchainStatus::Optimal.needs_recreation());
        assert!(SwapchainStatus::Suboptimal.needs_recreation());
        assert!(SwapchainStatus::OutOfDate.needs_recreation());
    }

    #[test]
    fn test_acquire_classification() {
        assert_eq!(
            AcquiredImage::from_acquire_result(Ok((2, false))).unwrap(),
            AcquiredImage::Ready {
                image_index: 2,
                suboptimal: false
            }
        );
        assert_eq!(
            AcquiredImage::from_acquire_result(Ok((0, true))).unwrap(),
            AcquiredImage::Ready {
                image_index: 0,
                suboptimal: true
            }
        );
        assert_eq!(
            AcquiredImage::from_acquire_result(Err(vk::Result::ERROR_OUT_OF_DATE_KHR)).unwrap(),
            AcquiredImage::OutOfDate
        );
        assert!(
            AcquiredImage::from_acquire_result(Err(vk::Result::ERROR_SURFACE_LOST_KHR)).is_err()
        );
    }

    #[test]
    fn test_formats_match_themselves() {
        let formats = SwapchainFormats {
            color: vk::Format::B8G8R8A8_SRGB,
            depth: vk::Format::D32_SFLOAT,
        };
        assert!(formats.matches(&formats));
        assert!(formats.ensure_compatible(&formats).is_ok());
    }

    #[test]
    fn test_formats_differ_in_color() {
        let old = SwapchainFormats {
            color: vk::Format::B8G8R8A8_SRGB,
            depth: vk::Format::D32_SFLOAT,
        };
        let new = SwapchainFormats {
            color: vk::Format::R8G8B8A8_UNORM,
            ..old
        };
        assert!(!old.matches(&new));
        assert!(matches!(
            old.ensure_compatible(&new),
            Err(RhiError::FormatMismatch {
                old_color: vk::Format::B8G8R8A8_SRGB,
                new_color: vk::Format::R8G8B8A8_UNORM,
                ..
            })
        ));
    }

    #[test]
    fn test_formats_differ_in_depth() {
        let old = SwapchainFormats {
            color: vk::Format::B8G8R8A8_SRGB,
            depth: vk::Format::D32_SFLOAT,
        };
        let new = SwapchainFormats {
            depth: vk::Format::D24_UNORM_S8_UINT,
            ..old
        };
        assert!(!old.matches(&new));
        assert!(old.ensure_compatible(&new).is_err());
    }

    #[test]
    fn test_mismatch_reports_old_and_new() {
        let old = SwapchainFormats {
            color: vk::Format::B8G8R8A8_SRGB,
            depth: vk::Format::D32_SFLOAT,
        };
        let new = SwapchainFormats {
            color: vk::Format::B8G8R8A8_UNORM,
            depth: vk::Format::D24_UNORM_S8_UINT,
        };
        match old.mismatch(&new) {
            RhiError::FormatMismatch {
                old_color,
                new_color,
                old_depth,
                new_depth,
            } => {
                assert_eq!(old_color, vk::Format::B8G8R8A8_SRGB);
                assert_eq!(new_color, vk::Format::B8G8R8A8_UNORM);
                assert_eq!(old_depth, vk::Format::D32_SFLOAT);
                assert_eq!(new_depth, vk::Format::D24_UNORM_S8_UINT);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
