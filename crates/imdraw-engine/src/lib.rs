//! imdraw engine crate.
//!
//! Immediate-mode 3D debug drawing: a per-frame recorder produces draw lists of points,
//! lines and triangles; the primitive renderer streams them through a bounded GPU upload
//! buffer in capacity-sized batches. The platform pieces (window runtime, GPU device,
//! input, timing, logging) host it in an application.

pub mod camera;
pub mod coords;
pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod paint;
pub mod render;
pub mod scene;
pub mod time;
pub mod window;
