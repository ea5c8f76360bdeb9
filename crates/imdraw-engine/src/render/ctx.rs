use glam::Mat4;

use crate::coords::Viewport;

use super::FrameUniforms;

/// Device handles plus the size and format of the surface being drawn this frame.
#[derive(Clone, Copy)]
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    /// Physical pixels.
    pub viewport: Viewport,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        viewport: Viewport,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            viewport,
        }
    }

    /// Shader constants for drawing this surface with `view_projection`.
    #[inline]
    pub fn frame_uniforms(&self, view_projection: Mat4) -> FrameUniforms {
        FrameUniforms::new(view_projection, self.viewport.width, self.viewport.height)
    }
}

/// Encoder and color attachment a renderer appends its pass to.
///
/// The attachment is loaded, not cleared; whatever was drawn before stays underneath.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self { encoder, color_view }
    }
}
