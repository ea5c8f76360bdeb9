//! Orbit camera and picking rays.
//!
//! Conventions: right-handed world, `perspective_rh` with depth in `[0, 1]`,
//! column-major matrices (`view_projection = projection * view`).

mod orbit;
mod state;

pub use orbit::{MouseState, OrbitCamera};
pub use state::{CameraState, Ray};
