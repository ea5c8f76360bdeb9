//! GPU rendering subsystem.
//!
//! The core is API-agnostic: `PrimitiveRenderer` splits draw lists into upload batches and
//! drives any [`PrimitiveBackend`]. The `wgpu` module provides the concrete backend and its
//! primitive expansion shaders.
//!
//! Convention:
//! - vertex records carry world-space positions; shaders apply `view_proj`
//! - point sizes and line widths are in physical pixels, converted via the viewport uniform

mod backend;
mod batch;
mod config;
mod ctx;
mod error;
mod renderer;
mod shader_cache;

pub mod wgpu;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{FrameUniforms, PrimitiveBackend};
pub use batch::{Batch, BatchPlan, Batches};
pub use config::{RendererConfig, ShaderRetry, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_MIN_UPLOAD_BYTES};
pub use ctx::{RenderCtx, RenderTarget};
pub use error::{BatchError, RenderError, RenderResult, ShaderError};
pub use renderer::{DrawStats, PrimitiveRenderer};
pub use shader_cache::{ShaderCache, ShaderSources, ShaderState};
