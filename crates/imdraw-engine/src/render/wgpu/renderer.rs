use std::sync::Arc;

use glam::Mat4;

use crate::render::{
    DrawStats, PrimitiveRenderer, RenderCtx, RenderResult, RenderTarget, RendererConfig,
};
use crate::scene::{DrawList, PrimitiveKind};

use super::shaders::builtin_sources;
use super::{WgpuBackend, WgpuProgram};

/// Primitive renderer bound to a wgpu device, using the built-in shaders.
pub struct WgpuPrimitiveRenderer {
    renderer: PrimitiveRenderer<Arc<WgpuProgram>>,
    backend: WgpuBackend,
}

impl WgpuPrimitiveRenderer {
    pub fn new(ctx: &RenderCtx<'_>, config: RendererConfig) -> RenderResult<Self> {
        let mut backend = WgpuBackend::new(ctx.device, ctx.queue, ctx.surface_format);
        let mut renderer = PrimitiveRenderer::new(config, builtin_sources());
        renderer.initialize(&mut backend)?;
        Ok(Self { renderer, backend })
    }

    #[inline]
    pub fn renderer(&self) -> &PrimitiveRenderer<Arc<WgpuProgram>> {
        &self.renderer
    }

    #[inline]
    pub fn backend(&self) -> &WgpuBackend {
        &self.backend
    }

    /// Draws `lists` over the current contents of `target`.
    ///
    /// Pipelines are rebuilt first when `ctx` reports a different surface format.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        view_projection: Mat4,
        lists: &[DrawList],
    ) -> RenderResult<DrawStats> {
        if ctx.surface_format != self.backend.surface_format() {
            log::debug!("surface format changed to {:?}; rebuilding pipelines", ctx.surface_format);
            self.backend.set_surface_format(ctx.surface_format);
            self.renderer.invalidate_programs(&mut self.backend);
        }

        let frame = ctx.frame_uniforms(view_projection);
        let stats = self.renderer.draw(&mut self.backend, &frame, lists)?;
        self.backend.encode(target);
        Ok(stats)
    }

    pub fn shutdown(&mut self) {
        self.renderer.shutdown(&mut self.backend);
    }

    /// Replaces the WGSL source of one kind; the program is rebuilt on next use.
    pub fn set_source(&mut self, kind: PrimitiveKind, source: impl Into<String>) {
        self.renderer.set_source(&mut self.backend, kind, source);
    }
}

impl Drop for WgpuPrimitiveRenderer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::coords::Viewport;
    use crate::paint::Color;
    use crate::render::testing::headless_device;
    use crate::render::wgpu::TRIANGLES_WGSL;
    use crate::render::{ShaderState, DEFAULT_MIN_UPLOAD_BYTES};
    use crate::scene::VertexRecord;

    const SIZE: u32 = 64;
    const CELLS: u32 = 16;
    const CELL_PX: u32 = SIZE / CELLS;

    /// 16 KiB uploads: 170 triangles per batch.
    fn small_uploads() -> RendererConfig {
        RendererConfig {
            max_upload_bytes: DEFAULT_MIN_UPLOAD_BYTES,
            ..RendererConfig::default()
        }
    }

    fn cell_color(cx: u32, cy: u32) -> [u8; 4] {
        [(cx * 16) as u8, (cy * 16) as u8, 200, 255]
    }

    /// Two triangles per cell of a `CELLS` x `CELLS` grid spanning clip space,
    /// row 0 at the top.
    fn cell_grid() -> DrawList {
        let step = 2.0 / CELLS as f32;
        let mut vertices = Vec::new();
        for cy in 0..CELLS {
            for cx in 0..CELLS {
                let [r, g, b, a] = cell_color(cx, cy);
                let color = Color::from_u8(r, g, b, a);
                let x0 = -1.0 + cx as f32 * step;
                let y0 = 1.0 - cy as f32 * step;
                let (x1, y1) = (x0 + step, y0 - step);
                for (x, y) in [(x0, y0), (x1, y0), (x1, y1), (x0, y0), (x1, y1), (x0, y1)] {
                    vertices.push(VertexRecord::new(Vec3::new(x, y, 0.0), 1.0, color));
                }
            }
        }
        DrawList::new(PrimitiveKind::Triangles, None, vertices)
    }

    struct Offscreen {
        device: wgpu::Device,
        queue: wgpu::Queue,
    }

    impl Offscreen {
        fn ctx(&self, format: wgpu::TextureFormat) -> RenderCtx<'_> {
            RenderCtx::new(&self.device, &self.queue, format, Viewport::new(SIZE, SIZE))
        }

        /// Renders into a fresh `SIZE` x `SIZE` texture and reads it back (tightly packed).
        fn render(
            &self,
            renderer: &mut WgpuPrimitiveRenderer,
            format: wgpu::TextureFormat,
            lists: &[DrawList],
        ) -> (DrawStats, Vec<u8>) {
            let texture = self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("offscreen target"),
                size: wgpu::Extent3d {
                    width: SIZE,
                    height: SIZE,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("offscreen readback"),
                size: u64::from(SIZE * SIZE * 4),
                usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor::default());
            let stats = {
                let mut target = RenderTarget::new(&mut encoder, &view);
                renderer
                    .render(&self.ctx(format), &mut target, Mat4::IDENTITY, lists)
                    .unwrap()
            };
            encoder.copy_texture_to_buffer(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::TexelCopyBufferInfo {
                    buffer: &readback,
                    layout: wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(SIZE * 4),
                        rows_per_image: Some(SIZE),
                    },
                },
                texture.size(),
            );
            self.queue.submit([encoder.finish()]);

            readback.map_async(wgpu::MapMode::Read, .., |result| result.unwrap());
            self.device
                .poll(wgpu::PollType::wait_indefinitely())
                .unwrap();
            let pixels = readback.get_mapped_range(..).to_vec();
            (stats, pixels)
        }
    }

    fn offscreen() -> Option<Offscreen> {
        headless_device().map(|(device, queue)| Offscreen { device, queue })
    }

    fn pixel(pixels: &[u8], x: u32, y: u32) -> [u8; 4] {
        let i = ((y * SIZE + x) * 4) as usize;
        [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
    }

    fn close(a: [u8; 4], b: [u8; 4]) -> bool {
        a.iter().zip(b).all(|(x, y)| x.abs_diff(y) <= 1)
    }

    #[test]
    fn every_batch_draws_its_own_records() {
        let Some(gpu) = offscreen() else { return };
        let format = wgpu::TextureFormat::Rgba8Unorm;
        let mut renderer = WgpuPrimitiveRenderer::new(&gpu.ctx(format), small_uploads()).unwrap();

        let (stats, pixels) = gpu.render(&mut renderer, format, &[cell_grid()]);

        // 512 triangles at 170 per batch.
        assert_eq!(stats.batches, 4);
        assert_eq!(stats.instances, 512);
        assert_eq!(renderer.backend().slot_count(), 4);

        for cy in 0..CELLS {
            for cx in 0..CELLS {
                let got = pixel(&pixels, cx * CELL_PX + CELL_PX / 2, cy * CELL_PX + CELL_PX / 2);
                assert!(
                    close(got, cell_color(cx, cy)),
                    "cell ({cx}, {cy}): got {got:?}, want {:?}",
                    cell_color(cx, cy)
                );
            }
        }
    }

    #[test]
    fn surface_format_change_rebuilds_pipelines() {
        let Some(gpu) = offscreen() else { return };
        let mut renderer = WgpuPrimitiveRenderer::new(
            &gpu.ctx(wgpu::TextureFormat::Rgba8Unorm),
            small_uploads(),
        )
        .unwrap();
        gpu.render(&mut renderer, wgpu::TextureFormat::Rgba8Unorm, &[cell_grid()]);

        let format = wgpu::TextureFormat::Bgra8Unorm;
        let (stats, pixels) = gpu.render(&mut renderer, format, &[cell_grid()]);

        assert_eq!(stats.instances, 512);
        assert_eq!(renderer.backend().surface_format(), format);
        match renderer.renderer().shaders().state(PrimitiveKind::Triangles) {
            ShaderState::Ready(program) => assert_eq!(program.format(), format),
            other => panic!("triangles program not rebuilt: {other:?}"),
        }

        let [r, g, b, a] = cell_color(3, 5);
        let got = pixel(&pixels, 3 * CELL_PX + 1, 5 * CELL_PX + 1);
        assert!(close(got, [b, g, r, a]), "got {got:?}");
    }

    #[test]
    fn mismatched_source_disables_only_its_kind() {
        let Some(gpu) = offscreen() else { return };
        let format = wgpu::TextureFormat::Rgba8Unorm;
        let mut renderer = WgpuPrimitiveRenderer::new(&gpu.ctx(format), small_uploads()).unwrap();

        let broken = TRIANGLES_WGSL.replace("@location(0) corner", "@location(1) corner");
        renderer.set_source(PrimitiveKind::Triangles, broken);

        let points = DrawList::new(
            PrimitiveKind::Points,
            None,
            vec![VertexRecord::new(Vec3::ZERO, 8.0, Color::RED)],
        );
        let (stats, pixels) = gpu.render(&mut renderer, format, &[cell_grid(), points]);

        assert_eq!(stats.skipped_lists, 1);
        assert_eq!(stats.lists, 1);
        assert!(renderer.renderer().shaders().state(PrimitiveKind::Triangles).is_failed());
        assert!(close(pixel(&pixels, SIZE / 2, SIZE / 2), [255, 0, 0, 255]));
    }
}
