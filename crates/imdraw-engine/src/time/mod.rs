//! Frame timing, independent of the runtime. Call `FrameClock::tick` once per frame.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
