//! Per-frame context handed to render systems.

use vista_rhi::command::CommandBuffer;
use vista_scene::Camera;

/// Everything a render system needs to record one frame.
///
/// Built by the application after a successful
/// [`Renderer::begin_frame`](crate::Renderer::begin_frame) and dropped before
/// `end_frame`.
#[derive(Clone, Copy)]
pub struct FrameInfo<'a> {
    /// Frame slot in `0..MAX_FRAMES_IN_FLIGHT`, selects per-slot resources.
    pub frame_index: usize,
    /// Seconds since the previous frame.
    pub frame_time: f32,
    /// Command buffer of the frame in progress.
    pub command_buffer: &'a CommandBuffer,
    /// Viewpoint for camera-relative systems.
    pub camera: &'a Camera,
}
