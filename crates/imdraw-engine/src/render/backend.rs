use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::scene::{PrimitiveKind, Topology};

use super::{RenderResult, ShaderError};

/// Per-frame uniforms shared by all primitive programs.
///
/// `view_proj` is column-major (as uploaded to WGSL `mat4x4<f32>`), viewport is in pixels.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub viewport: [f32; 2],
    pub _pad: [f32; 2], // 16-byte alignment
}

impl FrameUniforms {
    pub fn new(view_proj: Mat4, width: u32, height: u32) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            viewport: [width.max(1) as f32, height.max(1) as f32],
            _pad: [0.0; 2],
        }
    }
}

/// Primitive GPU operations the renderer needs from a graphics API.
///
/// Calls arrive from a single rendering thread, in this order per frame:
/// `begin_frame`, then per draw list `bind_program` followed by one
/// `upload` + `draw_instanced` pair per batch.
pub trait PrimitiveBackend {
    /// Compiled/linked program for one primitive kind.
    type Program;

    /// Largest uniform block the backend can bind at once, in bytes.
    fn max_upload_bytes(&self) -> usize;

    /// Allocates the upload channel for batches of at most `capacity` bytes.
    fn initialize(&mut self, capacity: usize) -> RenderResult<()>;

    /// Builds the program for `kind` from opaque shader source.
    ///
    /// The program's vertex-data uniform block must be bound to slot 0.
    fn create_program(&mut self, kind: PrimitiveKind, source: &str)
        -> Result<Self::Program, ShaderError>;

    fn destroy_program(&mut self, program: Self::Program);

    /// Sets per-frame state (view-projection, viewport, blending).
    fn begin_frame(&mut self, frame: &FrameUniforms);

    fn bind_program(&mut self, kind: PrimitiveKind, program: &Self::Program);

    /// Replaces the whole upload buffer with `bytes` and binds it at slot 0.
    fn upload(&mut self, bytes: &[u8]);

    /// Draws `instance_count` instances of `base_vertex_count` base-geometry vertices.
    fn draw_instanced(&mut self, topology: Topology, base_vertex_count: u32, instance_count: u32);

    /// Releases the upload channel and any remaining backend objects.
    fn shutdown(&mut self);
}
