//! Contract between the runtime loop and applications: the `App` callbacks and the
//! per-frame context they receive.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
