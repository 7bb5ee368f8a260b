//! Window management using winit.
//!
//! This module provides window creation, resize tracking and Vulkan surface
//! creation.

use std::ffi::c_char;
use std::sync::Arc;
use std::time::Duration;

use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window as WinitWindow, WindowAttributes};

use vista_core::{Error, Result};

use crate::surface::{Surface, SurfaceExtent};

/// How long [`Window::wait_events`] parks before re-reading the window size.
pub const WAIT_EVENTS_INTERVAL: Duration = Duration::from_millis(16);

/// Drawable size plus a sticky "changed since last reset" flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FramebufferSize {
    width: u32,
    height: u32,
    resized: bool,
}

impl FramebufferSize {
    /// Creates a size with the resized flag cleared.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            resized: false,
        }
    }

    /// Records a new size and raises the resized flag.
    pub fn mark_resized(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.resized = true;
    }

    /// Records the size without touching the flag.
    pub fn refresh(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Current size as a Vulkan extent.
    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        vk::Extent2D {
            width: self.width,
            height: self.height,
        }
    }

    /// True if the size was marked resized since the last reset.
    #[inline]
    pub fn was_resized(&self) -> bool {
        self.resized
    }

    /// Clears the resized flag.
    #[inline]
    pub fn reset_resized_flag(&mut self) {
        self.resized = false;
    }
}

/// A window wrapper that tracks its drawable size and creates Vulkan surfaces.
pub struct Window {
    window: Arc<WinitWindow>,
    size: FramebufferSize,
}

impl Window {
    /// Create a new resizable window with the given dimensions and title.
    pub fn new(event_loop: &ActiveEventLoop, width: u32, height: u32, title: &str) -> Result<Self> {
        let attrs = WindowAttributes::default()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(true);

        let window = event_loop
            .create_window(attrs)
            .map_err(|e| Error::Window(e.to_string()))?;

        let actual = window.inner_size();
        tracing::info!("Window created: {}x{}", actual.width, actual.height);

        Ok(Self {
            window: Arc::new(window),
            size: FramebufferSize::new(actual.width, actual.height),
        })
    }

    /// Current drawable size.
    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.size.extent()
    }

    /// True if the window was resized since [`Window::reset_resized_flag`].
    #[inline]
    pub fn was_resized(&self) -> bool {
        self.size.was_resized()
    }

    /// Acknowledges a resize once the swapchain has been rebuilt for it.
    #[inline]
    pub fn reset_resized_flag(&mut self) {
        self.size.reset_resized_flag();
    }

    /// Records a resize reported by the event loop.
    pub fn mark_resized(&mut self, width: u32, height: u32) {
        self.size.mark_resized(width, height);
        tracing::debug!("Window resized: {}x{}", width, height);
    }

    /// True while either dimension is zero.
    #[inline]
    pub fn is_minimized(&self) -> bool {
        !crate::surface::is_drawable(self.extent())
    }

    /// Parks the thread for [`WAIT_EVENTS_INTERVAL`], then re-reads the OS size.
    pub fn wait_events(&mut self) {
        std::thread::sleep(WAIT_EVENTS_INTERVAL);
        let size = self.window.inner_size();
        self.size.refresh(size.width, size.height);
    }

    /// Request a redraw of the window.
    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    /// Instance extensions needed to create a surface for this window.
    ///
    /// The pointers reference static strings owned by the Vulkan loader.
    ///
    /// # Errors
    /// Returns an error if the display handle is unavailable or the platform
    /// is not supported.
    pub fn required_extensions(&self) -> Result<Vec<*const c_char>> {
        let display_handle = self
            .window
            .display_handle()
            .map_err(|e| Error::Window(format!("Failed to get display handle: {}", e)))?;

        let extensions = ash_window::enumerate_required_extensions(display_handle.as_raw())
            .map_err(|e| {
                Error::Window(format!("Failed to enumerate required extensions: {}", e))
            })?;

        tracing::debug!(
            "Required Vulkan extensions for surface: {:?}",
            extensions
                .iter()
                // SAFETY: ash_window returns valid, null-terminated static strings.
                .map(|&ext| unsafe { std::ffi::CStr::from_ptr(ext) })
                .collect::<Vec<_>>()
        );

        Ok(extensions.to_vec())
    }

    /// Create a Vulkan surface for this window.
    ///
    /// # Arguments
    /// * `entry` - The Vulkan entry point
    /// * `instance` - The Vulkan instance (must outlive the returned `Surface`)
    ///
    /// # Errors
    /// Returns an error if the window handles are unavailable or surface
    /// creation fails.
    pub fn create_surface(&self, entry: &ash::Entry, instance: &ash::Instance) -> Result<Surface> {
        let display_handle = self
            .window
            .display_handle()
            .map_err(|e| Error::Window(format!("Failed to get display handle: {}", e)))?;

        let window_handle = self
            .window
            .window_handle()
            .map_err(|e| Error::Window(format!("Failed to get window handle: {}", e)))?;

        // SAFETY: The display and window handles come from a live winit window,
        // and the surface is destroyed in Surface::drop.
        let handle = unsafe {
            ash_window::create_surface(
                entry,
                instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
            .map_err(|e| Error::Window(format!("Failed to create Vulkan surface: {}", e)))?
        };

        let surface_loader = ash::khr::surface::Instance::new(entry, instance);

        tracing::info!("Vulkan surface created");

        Ok(Surface {
            handle,
            surface_loader,
        })
    }
}

impl SurfaceExtent for Window {
    fn extent(&self) -> vk::Extent2D {
        Window::extent(self)
    }

    fn wait_events(&mut self) {
        Window::wait_events(self);
    }

    fn was_resized(&self) -> bool {
        Window::was_resized(self)
    }

    fn reset_resized_flag(&mut self) {
        Window::reset_resized_flag(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framebuffer_size_starts_clean() {
        let size = FramebufferSize::new(800, 600);
        assert!(!size.was_resized());
        assert_eq!(
            size.extent(),
            vk::Extent2D {
                width: 800,
                height: 600
            }
        );
    }

    #[test]
    fn test_mark_resized_is_sticky_until_reset() {
        let mut size = FramebufferSize::new(800, 600);
        size.mark_resized(1024, 768);
        size.refresh(1024, 768);
        assert!(size.was_resized());
        assert_eq!(size.extent().width, 1024);

        size.reset_resized_flag();
        assert!(!size.was_resized());
        assert_eq!(size.extent().height, 768);
    }

    #[test]
    fn test_refresh_does_not_raise_flag() {
        let mut size = FramebufferSize::new(800, 600);
        size.refresh(0, 0);
        assert!(!size.was_resized());
        assert_eq!(size.extent(), vk::Extent2D::default());
    }
}
