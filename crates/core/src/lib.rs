//! Core utilities for the vista frame loop.
//!
//! This crate provides foundational types and utilities used across the workspace:
//! - Error types and result aliases
//! - Logging initialization
//! - Frame timing
//! - Configuration management

mod config;
mod error;
mod logging;
mod timer;

pub use config::{AppConfig, SceneObjectConfig, WindowConfig};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use timer::FrameTimer;
