//! Frame timing for the application loop.

use std::time::{Duration, Instant};

/// Measures wall-clock time between consecutive frames.
#[derive(Debug)]
pub struct FrameTimer {
    start: Instant,
    last_tick: Instant,
}

impl FrameTimer {
    /// Create a new timer, starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
        }
    }

    /// Total time since the timer was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Seconds elapsed since the previous call to `tick()`.
    ///
    /// The first call measures from construction.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now - self.last_tick;
        self.last_tick = now;
        delta.as_secs_f32()
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}
