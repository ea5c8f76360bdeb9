use std::collections::HashSet;

use glam::Vec2;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState, MouseButton, MouseButtonState};

/// Held keys/buttons and pointer position for the window.
#[derive(Debug, Default)]
pub struct InputState {
    pub focused: bool,
    pub pointer_pos: Option<Vec2>,
    pub keys_down: HashSet<Key>,
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Applies `ev` to the held state and records transitions into `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::Focused(focused) => {
                self.focused = *focused;
                if !*focused {
                    // Releases are not delivered while unfocused.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::PointerMoved { x, y } => {
                let pos = Vec2::new(*x, *y);
                if let Some(prev) = self.pointer_pos {
                    frame.pointer_delta += pos - prev;
                }
                self.pointer_pos = Some(pos);
            }

            InputEvent::PointerLeft => self.pointer_pos = None,

            InputEvent::Key { key, state, .. } => match state {
                KeyState::Pressed => {
                    if self.keys_down.insert(*key) {
                        frame.keys_pressed.insert(*key);
                    }
                }
                KeyState::Released => {
                    if self.keys_down.remove(key) {
                        frame.keys_released.insert(*key);
                    }
                }
            },

            InputEvent::PointerButton { button, state } => match state {
                MouseButtonState::Pressed => {
                    if self.buttons_down.insert(*button) {
                        frame.buttons_pressed.insert(*button);
                    }
                }
                MouseButtonState::Released => {
                    if self.buttons_down.remove(button) {
                        frame.buttons_released.insert(*button);
                    }
                }
            },

            InputEvent::MouseWheel(delta) => frame.wheel += delta.lines(),
        }

        frame.events.push(ev);
    }

    #[inline]
    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    #[inline]
    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseWheelDelta;

    #[test]
    fn pointer_delta_accumulates_from_first_known_position() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, InputEvent::PointerMoved { x: 10.0, y: 10.0 });
        state.apply_event(&mut frame, InputEvent::PointerMoved { x: 13.0, y: 8.0 });
        state.apply_event(&mut frame, InputEvent::PointerMoved { x: 15.0, y: 8.0 });

        assert_eq!(frame.pointer_delta, Vec2::new(5.0, -2.0));
        assert_eq!(state.pointer_pos, Some(Vec2::new(15.0, 8.0)));
    }

    #[test]
    fn repeated_press_is_one_transition() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        let press = InputEvent::Key { key: Key::Space, state: KeyState::Pressed, repeat: false };

        state.apply_event(&mut frame, press.clone());
        frame.clear();
        state.apply_event(&mut frame, press);

        assert!(state.key_down(Key::Space));
        assert!(!frame.key_pressed(Key::Space));
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(
            &mut frame,
            InputEvent::PointerButton { button: MouseButton::Right, state: MouseButtonState::Pressed },
        );
        state.apply_event(&mut frame, InputEvent::Focused(false));

        assert!(!state.button_down(MouseButton::Right));
    }

    #[test]
    fn wheel_sums_notches() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, InputEvent::MouseWheel(MouseWheelDelta::Line { x: 0.0, y: 1.0 }));
        state.apply_event(&mut frame, InputEvent::MouseWheel(MouseWheelDelta::Pixel { x: 0.0, y: 80.0 }));

        assert_eq!(frame.wheel, 3.0);
    }
}
