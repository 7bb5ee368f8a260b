//! Vulkan surface ownership and the drawable-size seam used by the renderer.

use ash::vk;

/// RAII wrapper for a Vulkan surface.
///
/// # Ownership
/// The surface is destroyed automatically when this struct is dropped.
/// The caller must ensure that the Vulkan instance outlives this surface.
pub struct Surface {
    pub(crate) handle: vk::SurfaceKHR,
    pub(crate) surface_loader: ash::khr::surface::Instance,
}

impl Surface {
    /// Get the raw Vulkan surface handle.
    ///
    /// # Note
    /// The returned handle is valid only as long as this `Surface` instance exists.
    #[inline]
    pub fn handle(&self) -> vk::SurfaceKHR {
        self.handle
    }

    /// Get a reference to the surface loader.
    ///
    /// This is useful for querying surface capabilities, formats, and present modes.
    #[inline]
    pub fn loader(&self) -> &ash::khr::surface::Instance {
        &self.surface_loader
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        // SAFETY: The surface handle was created by ash_window::create_surface
        // with the same instance the loader was built from.
        unsafe {
            self.surface_loader.destroy_surface(self.handle, None);
        }
        tracing::debug!("Vulkan surface destroyed");
    }
}

/// Something with a drawable size that can block until the OS reports a new one.
///
/// The renderer only needs these two calls to wait out a minimized window,
/// which keeps that loop testable without a real window.
pub trait SurfaceExtent {
    /// Current drawable size in pixels. Zero in either dimension while minimized.
    fn extent(&self) -> vk::Extent2D;

    /// Blocks briefly for window system activity and refreshes [`SurfaceExtent::extent`].
    fn wait_events(&mut self);

    /// True if a resize was reported since the last reset.
    fn was_resized(&self) -> bool;

    /// Acknowledges a pending resize.
    fn reset_resized_flag(&mut self);
}

/// True if `extent` can back a swapchain.
#[inline]
pub fn is_drawable(extent: vk::Extent2D) -> bool {
    extent.width > 0 && extent.height > 0
}
