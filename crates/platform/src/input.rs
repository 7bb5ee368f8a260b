//! Keyboard state for the movement controller.

use std::collections::HashSet;

pub use winit::keyboard::KeyCode;

/// Tracks which keys are held, plus per-frame press and release edges.
#[derive(Debug, Default)]
pub struct InputState {
    /// Currently pressed keys
    pressed_keys: HashSet<KeyCode>,
    /// Keys that were just pressed this frame
    just_pressed_keys: HashSet<KeyCode>,
    /// Keys that were just released this frame
    just_released_keys: HashSet<KeyCode>,
}

impl InputState {
    /// Create a new input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the beginning of each frame to clear per-frame edges.
    pub fn begin_frame(&mut self) {
        self.just_pressed_keys.clear();
        self.just_released_keys.clear();
    }

    /// Routes a keyboard event. Auto-repeat presses are ignored.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            if self.pressed_keys.insert(key) {
                self.just_pressed_keys.insert(key);
            }
        } else if self.pressed_keys.remove(&key) {
            self.just_released_keys.insert(key);
        }
    }

    /// Releases every held key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.just_released_keys.extend(self.pressed_keys.drain());
    }

    /// Check if a key is currently pressed.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.pressed_keys.contains(&key)
    }

    /// Check if a key was just pressed this frame.
    pub fn is_key_just_pressed(&self, key: KeyCode) -> bool {
        self.just_pressed_keys.contains(&key)
    }

    /// Check if a key was just released this frame.
    pub fn is_key_just_released(&self, key: KeyCode) -> bool {
        self.just_released_keys.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release_edges() {
        let mut input = InputState::new();

        input.handle_key(KeyCode::KeyW, true);
        assert!(input.is_key_pressed(KeyCode::KeyW));
        assert!(input.is_key_just_pressed(KeyCode::KeyW));

        input.begin_frame();
        assert!(input.is_key_pressed(KeyCode::KeyW));
        assert!(!input.is_key_just_pressed(KeyCode::KeyW));

        input.handle_key(KeyCode::KeyW, false);
        assert!(!input.is_key_pressed(KeyCode::KeyW));
        assert!(input.is_key_just_released(KeyCode::KeyW));
    }

    #[test]
    fn test_repeat_press_is_not_a_new_edge() {
        let mut input = InputState::new();
        input.handle_key(KeyCode::KeyA, true);
        input.begin_frame();
        input.handle_key(KeyCode::KeyA, true);
        assert!(!input.is_key_just_pressed(KeyCode::KeyA));
    }

    #[test]
    fn test_release_all() {
        let mut input = InputState::new();
        input.handle_key(KeyCode::ArrowLeft, true);
        input.handle_key(KeyCode::KeyE, true);
        input.release_all();

        assert!(!input.is_key_pressed(KeyCode::ArrowLeft));
        assert!(!input.is_key_pressed(KeyCode::KeyE));
        assert!(input.is_key_just_released(KeyCode::KeyE));
    }
}
