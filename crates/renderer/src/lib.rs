//! Frame orchestration and render systems.
//!
//! This crate drives the per-frame protocol on top of `vista_rhi`:
//! - [`Renderer`]: swapchain ownership, begin/end frame, swapchain recreation
//! - [`FrameCycle`]: the frame-slot state machine the renderer delegates to
//! - [`SimpleRenderSystem`] and [`FlatRenderSystem`]: the 3D and 2D pipelines
//! - GPU payload layouts shared with the shaders

mod error;
pub mod flat_render_system;
pub mod frame_cycle;
pub mod frame_info;
pub mod renderer;
pub mod simple_render_system;
pub mod ubo;

pub use error::{RendererError, RendererResult};
pub use flat_render_system::FlatRenderSystem;
pub use frame_cycle::{FrameCycle, begin_recreation, wait_for_drawable_extent};
pub use frame_info::FrameInfo;
pub use renderer::{Renderer, RendererOptions};
pub use simple_render_system::SimpleRenderSystem;
pub use ubo::{FlatPushConstants, GlobalUbo, SimplePushConstants};
pub use vista_rhi::sync::MAX_FRAMES_IN_FLIGHT;
