//! Synchronization primitives for the frame loop.
//!
//! - [`Semaphore`] - GPU-to-GPU ordering between acquire, submit and present
//! - [`Fence`] - GPU-to-CPU completion of a frame slot's submission
//! - [`FrameSync`] - the primitives owned by one frame-in-flight slot
//! - [`ImageFenceTable`] - which slot fence last used each swapchain image
//!
//! # Frame slots vs. swapchain images
//!
//! Frame slots rotate strictly in order (`0, 1, 0, 1, ...`), but the
//! presentation engine hands out image indices in whatever order it likes.
//! Waiting on the current slot's fence only proves that *this slot's* previous
//! submission retired. The image just acquired may still be in use by the
//! other slot, so the submit path also waits on the fence recorded for that
//! image in the [`ImageFenceTable`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vista_rhi::device::Device;
//! use vista_rhi::sync::{Fence, Semaphore};
//!
//! # fn example(device: Arc<Device>) -> Result<(), vista_rhi::RhiError> {
//! let image_available = Semaphore::new(device.clone())?;
//! let in_flight = Fence::new(device, true)?;
//!
//! in_flight.wait(u64::MAX)?;
//! in_flight.reset()?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use ash::vk;
use tracing::{debug, trace};

use crate::device::Device;
use crate::error::RhiResult;

/// Number of frames the CPU may record ahead of the GPU.
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

/// Vulkan semaphore wrapper, destroyed on drop.
pub struct Semaphore {
    device: Arc<Device>,
    semaphore: vk::Semaphore,
}

impl Semaphore {
    /// Creates an unsignaled binary semaphore.
    ///
    /// # Errors
    ///
    /// Returns an error if semaphore creation fails.
    pub fn new(device: Arc<Device>) -> RhiResult<Self> {
        let create_info = vk::SemaphoreCreateInfo::default();
        let semaphore = unsafe { device.handle().create_semaphore(&create_info, None)? };

        Ok(Self { device, semaphore })
    }

    /// Returns the Vulkan semaphore handle.
    #[inline]
    pub fn handle(&self) -> vk::Semaphore {
        self.semaphore
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        unsafe {
            self.device.handle().destroy_semaphore(self.semaphore, None);
        }
    }
}

/// Vulkan fence wrapper, destroyed on drop.
pub struct Fence {
    device: Arc<Device>,
    fence: vk::Fence,
}

impl Fence {
    /// Creates a fence.
    ///
    /// # Arguments
    ///
    /// * `device` - The logical device
    /// * `signaled` - Start signaled, so the first wait on a fresh frame slot
    ///   returns immediately
    ///
    /// # Errors
    ///
    /// Returns an error if fence creation fails.
    pub fn new(device: Arc<Device>, signaled: bool) -> RhiResult<Self> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };

        let create_info = vk::FenceCreateInfo::default().flags(flags);
        let fence = unsafe { device.handle().create_fence(&create_info, None)? };

        Ok(Self { device, fence })
    }

    /// Returns the Vulkan fence handle.
    #[inline]
    pub fn handle(&self) -> vk::Fence {
        self.fence
    }

    /// Blocks until the fence is signaled or `timeout` nanoseconds pass.
    ///
    /// # Errors
    ///
    /// Returns `vk::Result::TIMEOUT` wrapped in an error if the timeout expires.
    pub fn wait(&self, timeout: u64) -> RhiResult<()> {
        self.device.wait_for_fence(self.fence, timeout)
    }

    /// Returns the fence to the unsignaled state.
    ///
    /// # Errors
    ///
    /// Returns an error if the reset fails.
    pub fn reset(&self) -> RhiResult<()> {
        unsafe { self.device.handle().reset_fences(&[self.fence])? };
        Ok(())
    }
}

impl Drop for Fence {
    fn drop(&mut self) {
        unsafe {
            self.device.handle().destroy_fence(self.fence, None);
        }
    }
}

/// Synchronization owned by one frame-in-flight slot.
///
/// ```text
/// acquire  --signals-->  image_available
/// submit   --waits---->  image_available, --signals--> render_finished, in_flight
/// present  --waits---->  render_finished
/// ```
pub struct FrameSync {
    image_available: Semaphore,
    render_finished: Semaphore,
    in_flight: Fence,
}

impl FrameSync {
    /// Creates the semaphores and a signaled in-flight fence.
    ///
    /// # Errors
    ///
    /// Returns an error if any object creation fails.
    pub fn new(device: Arc<Device>) -> RhiResult<Self> {
        let image_available = Semaphore::new(device.clone())?;
        let render_finished = Semaphore::new(device.clone())?;
        let in_flight = Fence::new(device, true)?;

        Ok(Self {
            image_available,
            render_finished,
            in_flight,
        })
    }

    /// Creates one [`FrameSync`] per frame-in-flight slot.
    ///
    /// # Errors
    ///
    /// Returns an error if any object creation fails.
    pub fn for_all_slots(device: &Arc<Device>) -> RhiResult<Vec<Self>> {
        let slots = (0..MAX_FRAMES_IN_FLIGHT)
            .map(|_| Self::new(device.clone()))
            .collect::<RhiResult<Vec<_>>>()?;
        debug!("Created sync objects for {} frame slots", slots.len());
        Ok(slots)
    }

    /// Semaphore signaled by image acquisition.
    #[inline]
    pub fn image_available(&self) -> vk::Semaphore {
        self.image_available.handle()
    }

    /// Semaphore signaled when the slot's submission finishes rendering.
    #[inline]
    pub fn render_finished(&self) -> vk::Semaphore {
        self.render_finished.handle()
    }

    /// Fence signaled when the slot's submission retires.
    #[inline]
    pub fn in_flight_fence(&self) -> &Fence {
        &self.in_flight
    }
}

/// Tracks which frame slot fence last used each swapchain image.
///
/// The table is generic over the fence handle so the hazard logic can be
/// exercised without a device; the swapchain uses `vk::Fence`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageFenceTable<F = vk::Fence> {
    entries: Vec<Option<F>>,
}

impl<F: Copy + PartialEq> ImageFenceTable<F> {
    /// Creates an empty table for `image_count` swapchain images.
    pub fn new(image_count: usize) -> Self {
        Self {
            entries: vec![None; image_count],
        }
    }

    /// Number of swapchain images tracked.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table tracks no images.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fence currently associated with `image_index`, if any.
    #[inline]
    pub fn get(&self, image_index: usize) -> Option<F> {
        self.entries.get(image_index).copied().flatten()
    }

    /// Associates `fence` with `image_index`.
    ///
    /// Returns the fence the caller must wait on before touching the image:
    /// the one previously recorded for it, unless that is `fence` itself
    /// (already waited on by the acquire path).
    ///
    /// # Panics
    ///
    /// Panics if `image_index` is out of range.
    pub fn claim(&mut self, image_index: usize, fence: F) -> Option<F> {
        let previous = self.entries[image_index].replace(fence);
        trace!(image_index, reused = previous.is_some(), "Claimed swapchain image");
        previous.filter(|prev| *prev != fence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_frames_in_flight_constant() {
        assert_eq!(MAX_FRAMES_IN_FLIGHT, 2);
    }

    #[test]
    fn test_sync_types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Semaphore>();
        assert_send_sync::<Fence>();
        assert_send_sync::<FrameSync>();
    }

    #[test]
    fn test_new_table_is_empty() {
        let table = ImageFenceTable::<u32>::new(3);
        assert_eq!(table.len(), 3);
        assert!((0..3).all(|i| table.get(i).is_none()));
        assert!(table.get(7).is_none());
    }

    #[test]
    fn test_first_claim_needs_no_wait() {
        let mut table = ImageFenceTable::new(3);
        assert_eq!(table.claim(0, 10u32), None);
        assert_eq!(table.claim(1, 11u32), None);
        assert_eq!(table.get(0), Some(10));
        assert_eq!(table.get(1), Some(11));
    }

    #[test]
    fn test_same_slot_reclaim_does_not_wait_on_itself() {
        let mut table = ImageFenceTable::new(2);
        table.claim(0, 10u32);
        assert_eq!(table.claim(0, 10u32), None);
    }

    /// Three images, two frame slots, images handed out out of order.
    ///
    /// Slot `s` uses fence `100 + s`; frame `n` runs on slot `n % 2`.
    #[test]
    fn test_out_of_order_acquisition_waits_on_previous_user() {
        let slot_fence = |frame: usize| 100 + (frame % MAX_FRAMES_IN_FLIGHT) as u32;
        let acquired = [0usize, 2, 1, 2, 0, 0, 2];
        let expected_waits = [
            None,      // frame 0, slot 0, image 0: fresh
            None,      // frame 1, slot 1, image 2: fresh
            None,      // frame 2, slot 0, image 1: fresh
            None,      // frame 3, slot 1, image 2: last used by slot 1 itself
            None,      // frame 4, slot 0, image 0: last used by slot 0 itself
            Some(100), // frame 5, slot 1, image 0: still held by slot 0
            Some(101), // frame 6, slot 0, image 2: still held by slot 1
        ];

        let mut table = ImageFenceTable::new(3);
        for (frame, (&image, &expected)) in acquired.iter().zip(&expected_waits).enumerate() {
            let fence = slot_fence(frame);
            let wait = table.claim(image, fence);
            assert_eq!(wait, expected, "frame {frame} acquiring image {image}");
            assert_eq!(table.get(image), Some(fence));
        }

        assert_eq!(table.get(0), Some(101));
        assert_eq!(table.get(1), Some(100));
        assert_eq!(table.get(2), Some(100));
    }

    #[test]
    fn test_cross_slot_hazard_is_reported() {
        let mut table = ImageFenceTable::new(3);
        table.claim(1, 100u32);
        // The other slot gets the same image before slot 0 came around again.
        assert_eq!(table.claim(1, 101u32), Some(100));
        assert_eq!(table.claim(1, 100u32), Some(101));
    }

}
