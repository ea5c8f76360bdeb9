//! GPU device and surface management: adapter/device creation, surface configuration,
//! frame acquisition and the surface-error policy.

mod gpu;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
