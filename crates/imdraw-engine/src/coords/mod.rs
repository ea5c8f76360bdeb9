//! Window-space geometry shared by the camera and renderers.
//!
//! Window space is physical pixels, origin top-left, +X right, +Y down.

mod viewport;

pub use viewport::Viewport;
