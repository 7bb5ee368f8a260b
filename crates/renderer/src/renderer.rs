//! Frame orchestration on top of the swapchain.
//!
//! The [`Renderer`] owns the Vulkan device, the window surface, the
//! swapchain and one command buffer per frame slot. It does not draw
//! anything itself: render systems record into the command buffer of the
//! frame in progress.
//!
//! # Frame protocol
//!
//! ```no_run
//! # use vista_renderer::{Renderer, RendererResult};
//! # use vista_platform::Window;
//! # fn frame(renderer: &mut Renderer, window: &mut Window) -> RendererResult<()> {
//! if renderer.begin_frame(window)? {
//!     let cmd = renderer.current_command_buffer();
//!     renderer.begin_swapchain_render_pass(cmd);
//!     // ... render systems record draws into `cmd` ...
//!     renderer.end_swapchain_render_pass(cmd);
//!     renderer.end_frame(window)?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! `begin_frame` returns `false` when the swapchain was out of date; it has
//! been recreated and the caller skips this tick.

use std::sync::Arc;

use ash::vk;
use tracing::{debug, error, info};

use vista_platform::{Surface, Window};
use vista_rhi::RhiError;
use vista_rhi::command::{CommandBuffer, CommandPool};
use vista_rhi::device::Device;
use vista_rhi::instance::Instance;
use vista_rhi::physical_device::select_physical_device;
use vista_rhi::render_pass::clear_values;
use vista_rhi::swapchain::{AcquiredImage, Swapchain};
use vista_rhi::sync::MAX_FRAMES_IN_FLIGHT;

use crate::error::RendererResult;
use crate::frame_cycle::{FrameCycle, begin_recreation, wait_for_drawable_extent};

/// Device-level settings chosen at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RendererOptions {
    /// Request the Khronos validation layer.
    pub enable_validation: bool,
    /// Use MAILBOX presentation when the surface supports it.
    pub prefer_mailbox: bool,
}

/// Owns the swapchain and drives the begin/end frame protocol.
///
/// # Resource Destruction Order
///
/// Fields drop in declaration order after [`Drop`] has drained the GPU:
/// command buffers, command pool, swapchain, surface, then the device
/// (which keeps the instance alive until it goes).
pub struct Renderer {
    command_buffers: Vec<CommandBuffer>,
    command_pool: CommandPool,
    swapchain: Swapchain,
    surface: Surface,
    device: Arc<Device>,

    cycle: FrameCycle,
    current_image_index: u32,
    prefer_mailbox: bool,
}

impl Renderer {
    /// Creates the device, surface and swapchain for `window`.
    ///
    /// If the window is minimized this blocks until it has a drawable size.
    ///
    /// # Errors
    ///
    /// Returns an error if any Vulkan object cannot be created or no GPU can
    /// present to the window.
    pub fn new(window: &mut Window, options: RendererOptions) -> RendererResult<Self> {
        let extensions = window.required_extensions()?;
        let instance = Instance::new(c"vista", options.enable_validation, &extensions)?;

        let surface = window.create_surface(instance.entry(), instance.handle())?;

        let physical_device_info =
            select_physical_device(instance.handle(), surface.handle(), surface.loader())?;
        let device = Device::new(&instance, &physical_device_info)?;

        let extent = wait_for_drawable_extent(window);
        let swapchain = Swapchain::new(
            Arc::clone(&device),
            surface.loader(),
            surface.handle(),
            extent,
            options.prefer_mailbox,
            None,
        )?;

        let graphics_family = device
            .queue_families()
            .graphics_family
            .ok_or(RhiError::NoSuitableGpu)?;
        let command_pool = CommandPool::new(Arc::clone(&device), graphics_family)?;
        let command_buffers = command_pool.allocate_command_buffers(MAX_FRAMES_IN_FLIGHT as u32)?;

        info!(
            "Renderer initialized: {}x{}, {} swapchain images, {} frames in flight",
            swapchain.extent().width,
            swapchain.extent().height,
            swapchain.image_count(),
            MAX_FRAMES_IN_FLIGHT
        );

        Ok(Self {
            command_buffers,
            command_pool,
            swapchain,
            surface,
            device,
            cycle: FrameCycle::default(),
            current_image_index: 0,
            prefer_mailbox: options.prefer_mailbox,
        })
    }

    /// Acquires the next swapchain image and starts recording.
    ///
    /// Returns `Ok(false)` if the swapchain was out of date. It has been
    /// recreated and no frame is in progress; skip drawing this tick.
    ///
    /// # Errors
    ///
    /// Returns an error if acquisition fails for any other reason, or if the
    /// recreated swapchain is incompatible with the old one.
    ///
    /// # Panics
    ///
    /// Panics if a frame is already in progress.
    pub fn begin_frame(&mut self, window: &mut Window) -> RendererResult<bool> {
        assert!(
            !self.cycle.is_frame_in_progress(),
            "Cannot begin frame while frame is in progress"
        );

        let image_index = match self.swapchain.acquire_next_image(self.cycle.slot())? {
            AcquiredImage::OutOfDate => {
                debug!("Swapchain out of date on acquire, skipping frame");
                self.recreate_swapchain(window)?;
                return Ok(false);
            }
            AcquiredImage::Ready { image_index, .. } => image_index,
        };

        self.current_image_index = image_index;
        self.cycle.begin_frame();
        self.current_command_buffer().begin()?;
        Ok(true)
    }

    /// Finishes recording, submits and presents.
    ///
    /// The swapchain is recreated when presentation reports it out of date
    /// or suboptimal, or when the window was resized. The frame slot always
    /// advances.
    ///
    /// # Errors
    ///
    /// Returns an error if recording, submission or presentation fails, or
    /// if recreation fails.
    ///
    /// # Panics
    ///
    /// Panics if no frame is in progress.
    pub fn end_frame(&mut self, window: &mut Window) -> RendererResult<()> {
        let frame_index = self.cycle.frame_index();
        let result = self.submit_current(window, frame_index);
        self.cycle.end_frame();
        result
    }

    fn submit_current(&mut self, window: &mut Window, frame_index: usize) -> RendererResult<()> {
        let command_buffer = &self.command_buffers[frame_index];
        command_buffer.end()?;

        let status = self.swapchain.submit_command_buffers(
            command_buffer,
            self.current_image_index,
            frame_index,
        )?;

        if status.needs_recreation() || window.was_resized() {
            debug!(
                "Recreating swapchain after present: {:?}, resized: {}",
                status,
                window.was_resized()
            );
            self.recreate_swapchain(window)?;
        }
        Ok(())
    }

    /// Begins the swapchain render pass on `cmd` and sets viewport and
    /// scissor to the current extent.
    ///
    /// # Panics
    ///
    /// Panics if no frame is in progress or `cmd` is not the current
    /// frame's command buffer.
    pub fn begin_swapchain_render_pass(&self, cmd: &CommandBuffer) {
        self.assert_current(cmd, "begin");

        let extent = self.swapchain.extent();
        let clear_values = clear_values();
        let begin_info = vk::RenderPassBeginInfo::default()
            .render_pass(self.swapchain.render_pass())
            .framebuffer(self.swapchain.framebuffer(self.current_image_index))
            .render_area(scissor_for(extent))
            .clear_values(&clear_values);

        cmd.begin_render_pass(&begin_info);
        cmd.set_viewport(&viewport_for(extent));
        cmd.set_scissor(&scissor_for(extent));
    }

    /// Ends the swapchain render pass on `cmd`.
    ///
    /// # Panics
    ///
    /// Panics if no frame is in progress or `cmd` is not the current
    /// frame's command buffer.
    pub fn end_swapchain_render_pass(&self, cmd: &CommandBuffer) {
        self.assert_current(cmd, "end");
        cmd.end_render_pass();
    }

    fn assert_current(&self, cmd: &CommandBuffer, action: &str) {
        assert!(
            self.cycle.is_frame_in_progress(),
            "Cannot call {action} render pass if frame is not in progress"
        );
        assert!(
            *cmd == self.command_buffers[self.cycle.slot()],
            "Cannot {action} render pass on command buffer from a different frame"
        );
    }

    /// Waits for a drawable size, drains the GPU and rebuilds the swapchain
    /// from the old one. A pending resize is acknowledged first.
    fn recreate_swapchain(&mut self, window: &mut Window) -> RendererResult<()> {
        let extent = begin_recreation(window);
        self.device.wait_idle()?;

        let swapchain = Swapchain::new(
            Arc::clone(&self.device),
            self.surface.loader(),
            self.surface.handle(),
            extent,
            self.prefer_mailbox,
            Some(&self.swapchain),
        )?;
        self.swapchain.ensure_replaceable_by(&swapchain)?;

        let old_image_count = self.swapchain.image_count();
        self.swapchain = swapchain;

        if self.swapchain.image_count() != old_image_count {
            debug!(
                "Swapchain image count changed {} -> {}, reallocating command buffers",
                old_image_count,
                self.swapchain.image_count()
            );
            let old = std::mem::take(&mut self.command_buffers);
            self.command_pool.free_command_buffers(old);
            self.command_buffers = self
                .command_pool
                .allocate_command_buffers(MAX_FRAMES_IN_FLIGHT as u32)?;
        }

        info!(
            "Swapchain recreated: {}x{}",
            self.swapchain.extent().width,
            self.swapchain.extent().height
        );
        Ok(())
    }

    /// Command buffer of the frame in progress.
    ///
    /// # Panics
    ///
    /// Panics if no frame is in progress.
    pub fn current_command_buffer(&self) -> &CommandBuffer {
        &self.command_buffers[self.cycle.frame_index()]
    }

    /// Slot of the frame in progress, in `0..MAX_FRAMES_IN_FLIGHT`.
    ///
    /// # Panics
    ///
    /// Panics if no frame is in progress.
    #[inline]
    pub fn frame_index(&self) -> usize {
        self.cycle.frame_index()
    }

    /// True between a successful [`Renderer::begin_frame`] and
    /// [`Renderer::end_frame`].
    #[inline]
    pub fn is_frame_in_progress(&self) -> bool {
        self.cycle.is_frame_in_progress()
    }

    /// Width over height of the swapchain images.
    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        self.swapchain.aspect_ratio()
    }

    /// Render pass every pipeline drawing to the swapchain must target.
    ///
    /// Stays compatible across recreation.
    #[inline]
    pub fn render_pass(&self) -> vk::RenderPass {
        self.swapchain.render_pass()
    }

    /// The logical device shared with render systems and meshes.
    #[inline]
    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if let Err(e) = self.device.wait_idle() {
            error!("Failed to wait for device idle during renderer drop: {}", e);
        }
        info!("Renderer destroyed");
    }
}

/// Full-extent viewport with the standard `[0, 1]` depth range.
pub fn viewport_for(extent: vk::Extent2D) -> vk::Viewport {
    vk::Viewport {
        x: 0.0,
        y: 0.0,
        width: extent.width as f32,
        height: extent.height as f32,
        min_depth: 0.0,
        max_depth: 1.0,
    }
}

/// Scissor covering the whole extent.
pub fn scissor_for(extent: vk::Extent2D) -> vk::Rect2D {
    vk::Rect2D {
        offset: vk::Offset2D { x: 0, y: 0 },
        extent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_covers_extent() {
        let viewport = viewport_for(vk::Extent2D {
            width: 1280,
            height: 720,
        });
        assert_eq!(viewport.x, 0.0);
        assert_eq!(viewport.y, 0.0);
        assert_eq!(viewport.width, 1280.0);
        assert_eq!(viewport.height, 720.0);
        assert_eq!(viewport.min_depth, 0.0);
        assert_eq!(viewport.max_depth, 1.0);
    }

    #[test]
    fn test_scissor_covers_extent() {
        let extent = vk::Extent2D {
            width: 640,
            height: 480,
        };
        let scissor = scissor_for(extent);
        assert_eq!(scissor.offset.x, 0);
        assert_eq!(scissor.offset.y, 0);
        assert_eq!(scissor.extent, extent);
    }

    #[test]
    fn test_default_options_are_conservative() {
        let options = RendererOptions::default();
        assert!(!options.enable_validation);
        assert!(!options.prefer_mailbox);
    }
}
