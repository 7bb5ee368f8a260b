//! Frame-slot rotation and the Idle / FrameActive state machine.
//!
//! [`FrameCycle`] holds no GPU state, so the frame protocol can be checked
//! without a device. Calling an operation in the wrong state is a
//! programming error and panics.

use ash::vk;
use vista_platform::{SurfaceExtent, is_drawable};
use vista_rhi::sync::MAX_FRAMES_IN_FLIGHT;

/// Tracks whether a frame is being recorded and which slot it uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameCycle {
    frame_index: usize,
    slot_count: usize,
    frame_started: bool,
}

impl Default for FrameCycle {
    fn default() -> Self {
        Self::new(MAX_FRAMES_IN_FLIGHT)
    }
}

impl FrameCycle {
    /// Starts idle at slot 0.
    ///
    /// # Panics
    ///
    /// Panics if `slot_count` is zero.
    pub fn new(slot_count: usize) -> Self {
        assert!(slot_count > 0, "a frame cycle needs at least one slot");
        Self {
            frame_index: 0,
            slot_count,
            frame_started: false,
        }
    }

    /// Idle -> FrameActive.
    ///
    /// # Panics
    ///
    /// Panics if a frame is already in progress.
    pub fn begin_frame(&mut self) {
        assert!(
            !self.frame_started,
            "Cannot begin frame while frame is in progress"
        );
        self.frame_started = true;
    }

    /// FrameActive -> Idle, advancing to the next slot.
    ///
    /// # Panics
    ///
    /// Panics if no frame is in progress.
    pub fn end_frame(&mut self) {
        assert!(
            self.frame_started,
            "Cannot end frame while frame is not in progress"
        );
        self.frame_started = false;
        self.frame_index = (self.frame_index + 1) % self.slot_count;
    }

    /// Slot of the frame being recorded.
    ///
    /// # Panics
    ///
    /// Panics if no frame is in progress.
    pub fn frame_index(&self) -> usize {
        assert!(
            self.frame_started,
            "Cannot get frame index when frame is not in progress"
        );
        self.frame_index
    }

    /// Slot the next (or current) frame uses, in either state.
    #[inline]
    pub fn slot(&self) -> usize {
        self.frame_index
    }

    /// True between a successful begin and the matching end.
    #[inline]
    pub fn is_frame_in_progress(&self) -> bool {
        self.frame_started
    }
}

/// Blocks until `surface` reports a size both dimensions of which are
/// non-zero, e.g. until a minimized window is restored.
pub fn wait_for_drawable_extent<S: SurfaceExtent + ?Sized>(surface: &mut S) -> vk::Extent2D {
    let mut extent = surface.extent();
    while !is_drawable(extent) {
        surface.wait_events();
        extent = surface.extent();
    }
    extent
}

/// Acknowledges any pending resize on `surface`, then waits for the drawable
/// size a replacement swapchain should be built at.
///
/// The new swapchain covers the resize, so it must not trigger a second
/// rebuild on the next present.
pub fn begin_recreation<S: SurfaceExtent + ?Sized>(surface: &mut S) -> vk::Extent2D {
    surface.reset_resized_flag();
    wait_for_drawable_extent(surface)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_rotates_mod_frames_in_flight() {
        let mut cycle = FrameCycle::default();
        for n in 1..=7 {
            cycle.begin_frame();
            cycle.end_frame();
            assert_eq!(cycle.slot(), n % MAX_FRAMES_IN_FLIGHT);
        }
        assert!(!cycle.is_frame_in_progress());
    }

    #[test]
    fn test_frame_index_during_frame() {
        let mut cycle = FrameCycle::new(3);
        cycle.begin_frame();
        assert!(cycle.is_frame_in_progress());
        assert_eq!(cycle.frame_index(), 0);
        cycle.end_frame();

        cycle.begin_frame();
        assert_eq!(cycle.frame_index(), 1);
    }

    #[test]
    fn test_skipped_frame_keeps_slot() {
        let mut cycle = FrameCycle::default();
        // An out-of-date acquire never calls begin_frame.
        assert_eq!(cycle.slot(), 0);
        cycle.begin_frame();
        cycle.end_frame();
        assert_eq!(cycle.slot(), 1);
    }

    #[test]
    #[should_panic(expected = "Cannot begin frame while frame is in progress")]
    fn test_begin_twice_panics() {
        let mut cycle = FrameCycle::default();
        cycle.begin_frame();
        cycle.begin_frame();
    }

    #[test]
    #[should_panic(expected = "Cannot end frame while frame is not in progress")]
    fn test_end_while_idle_panics() {
        FrameCycle::default().end_frame();
    }

    #[test]
    #[should_panic(expected = "Cannot get frame index when frame is not in progress")]
    fn test_frame_index_while_idle_panics() {
        FrameCycle::default().frame_index();
    }

    /// Reports a scripted sequence of sizes, one per `wait_events`.
    struct ScriptedSurface {
        sizes: Vec<vk::Extent2D>,
        waits: usize,
        resized: bool,
    }

    impl SurfaceExtent for ScriptedSurface {
        fn extent(&self) -> vk::Extent2D {
            self.sizes[self.waits.min(self.sizes.len() - 1)]
        }

        fn wait_events(&mut self) {
            self.waits += 1;
        }

        fn was_resized(&self) -> bool {
            self.resized
        }

        fn reset_resized_flag(&mut self) {
            self.resized = false;
        }
    }

    fn extent(width: u32, height: u32) -> vk::Extent2D {
        vk::Extent2D { width, height }
    }

    #[test]
    fn test_wait_returns_immediately_when_drawable() {
        let mut surface = ScriptedSurface {
            sizes: vec![extent(800, 600)],
            waits: 0,
            resized: false,
        };
        assert_eq!(wait_for_drawable_extent(&mut surface), extent(800, 600));
        assert_eq!(surface.waits, 0);
    }

    #[test]
    fn test_wait_polls_until_both_dimensions_nonzero() {
        let mut surface = ScriptedSurface {
            sizes: vec![extent(0, 0), extent(0, 0), extent(640, 0), extent(640, 480)],
            waits: 0,
            resized: false,
        };
        assert_eq!(wait_for_drawable_extent(&mut surface), extent(640, 480));
        assert_eq!(surface.waits, 3);
    }

    #[test]
    fn test_recreation_clears_pending_resize() {
        let mut surface = ScriptedSurface {
            sizes: vec![extent(1024, 768)],
            waits: 0,
            resized: true,
        };
        assert_eq!(begin_recreation(&mut surface), extent(1024, 768));
        assert!(!surface.was_resized());
    }

    #[test]
    fn test_recreation_waits_out_minimized_window() {
        let mut surface = ScriptedSurface {
            sizes: vec![extent(0, 0), extent(1024, 768)],
            waits: 0,
            resized: true,
        };
        assert_eq!(begin_recreation(&mut surface), extent(1024, 768));
        assert_eq!(surface.waits, 1);
        assert!(!surface.was_resized());
    }
}
