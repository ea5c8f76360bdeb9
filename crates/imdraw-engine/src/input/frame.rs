use std::collections::HashSet;

use glam::Vec2;

use super::types::{InputEvent, Key, MouseButton};

/// Input transitions of the current frame. Cleared by the runtime after each frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    pub events: Vec<InputEvent>,
    pub keys_pressed: HashSet<Key>,
    pub keys_released: HashSet<Key>,
    pub buttons_pressed: HashSet<MouseButton>,
    pub buttons_released: HashSet<MouseButton>,
    /// Pointer movement accumulated over the frame.
    pub pointer_delta: Vec2,
    /// Wheel notches accumulated over the frame.
    pub wheel: f32,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.buttons_pressed.clear();
        self.buttons_released.clear();
        self.pointer_delta = Vec2::ZERO;
        self.wheel = 0.0;
    }

    #[inline]
    pub fn key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }
}
