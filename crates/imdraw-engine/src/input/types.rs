/// Keys the engine reacts to. Everything else maps to `Unknown` with the platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Space,
    F1,
    F2,
    F3,
    F4,
    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseButtonState {
    Pressed,
    Released,
}

/// Wheel delta as reported by the platform.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseWheelDelta {
    Line { x: f32, y: f32 },
    Pixel { x: f32, y: f32 },
}

/// Pixels per wheel notch assumed for high-precision devices.
pub const PIXELS_PER_LINE: f32 = 40.0;

impl MouseWheelDelta {
    /// Vertical delta in notches, positive away from the user.
    pub fn lines(self) -> f32 {
        match self {
            MouseWheelDelta::Line { y, .. } => y,
            MouseWheelDelta::Pixel { y, .. } => y / PIXELS_PER_LINE,
        }
    }
}

/// Platform-agnostic input event. Positions are window-space physical pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key { key: Key, state: KeyState, repeat: bool },
    PointerMoved { x: f32, y: f32 },
    PointerButton { button: MouseButton, state: MouseButtonState },
    MouseWheel(MouseWheelDelta),
    PointerLeft,
    Focused(bool),
}
