//! Platform abstraction layer for the vista frame loop.
//!
//! This crate provides platform-specific functionality:
//! - Window management and resize tracking via winit
//! - Keyboard input state
//! - Vulkan surface creation and the [`SurfaceExtent`] seam

mod input;
mod surface;
mod window;

pub use input::{InputState, KeyCode};
pub use surface::{Surface, SurfaceExtent, is_drawable};
pub use window::{FramebufferSize, WAIT_EVENTS_INTERVAL, Window};

// Re-export winit types that users might need
pub use winit::event::{ElementState, KeyEvent, WindowEvent};
pub use winit::event_loop::{ActiveEventLoop, EventLoop};
