//! wgpu backend for the primitive renderer.

mod backend;
mod renderer;
mod shaders;

pub use backend::{WgpuBackend, WgpuProgram};
pub use renderer::WgpuPrimitiveRenderer;
pub use shaders::{builtin_sources, specialize, validate, LINES_WGSL, POINTS_WGSL, TRIANGLES_WGSL};
