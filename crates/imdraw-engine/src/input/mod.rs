//! Input subsystem.
//!
//! The public API does not expose winit types; the runtime feeds translated events
//! into `InputState`, which records per-frame transitions in `InputFrame`.

mod frame;
mod state;
mod translate;
mod types;

pub use frame::InputFrame;
pub use state::InputState;
pub(crate) use translate::translate_window_event;
pub use types::{InputEvent, Key, KeyState, MouseButton, MouseButtonState, MouseWheelDelta};
