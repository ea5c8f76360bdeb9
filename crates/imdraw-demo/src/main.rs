use std::f32::consts::TAU;

use anyhow::Result;
use glam::{Mat4, Quat, Vec2, Vec3};

use imdraw_engine::camera::{MouseState, OrbitCamera};
use imdraw_engine::core::{App, AppControl, FrameCtx};
use imdraw_engine::device::GpuInit;
use imdraw_engine::input::Key;
use imdraw_engine::logging::{init_logging, LoggingConfig};
use imdraw_engine::paint::Color;
use imdraw_engine::render::wgpu::WgpuPrimitiveRenderer;
use imdraw_engine::render::RendererConfig;
use imdraw_engine::scene::{DrawMode, DrawRecorder, LayerId};
use imdraw_engine::window::{Runtime, RuntimeConfig};

const HIGHLIGHT: LayerId = LayerId::from_name("highlight");

/// Enough triangles to need well over a hundred upload batches at 64 KiB.
const STRESS_TRIANGLES: usize = 100_000;
const STRESS_COLUMNS: usize = 400;

const STATS_INTERVAL: u64 = 120;

const CLEAR: Color = Color::rgba(0.08, 0.09, 0.11, 1.0);

struct Demo {
    camera: OrbitCamera,
    recorder: DrawRecorder,
    renderer: Option<WgpuPrimitiveRenderer>,
    stress: bool,
}

impl Demo {
    fn new() -> Self {
        Self {
            camera: OrbitCamera::new(),
            recorder: DrawRecorder::new(),
            renderer: None,
            stress: false,
        }
    }
}

impl App for Demo {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input_frame.key_pressed(Key::Escape) {
            return AppControl::Exit;
        }
        if ctx.input_frame.key_pressed(Key::Space) {
            self.stress = !self.stress;
            log::info!("stress stream {}", if self.stress { "on" } else { "off" });
        }

        let viewport = ctx.viewport();
        self.camera.set_viewport(viewport);
        match MouseState::from_input(ctx.input, ctx.input_frame) {
            Some(mouse) => self.camera.mouse_input(&mouse),
            None => self.camera.reset_drag(),
        }

        let state = *self.camera.state();
        let pick = ctx
            .input
            .pointer_pos
            .map(|cursor| state.cursor_ray(cursor))
            .and_then(|ray| ray.intersect_plane(Vec3::Y, 0.0).map(|t| ray.at(t)));

        let time = ctx.time;
        record_scene(&mut self.recorder, time.elapsed, self.stress, pick);
        let lists = self.recorder.end_frame();

        let view_projection = state.view_projection;
        let renderer = &mut self.renderer;
        let mut fatal = false;

        let control = ctx.render(CLEAR, |rctx, target| {
            if renderer.is_none() {
                match WgpuPrimitiveRenderer::new(rctx, RendererConfig::default()) {
                    Ok(r) => *renderer = Some(r),
                    Err(err) => {
                        log::error!("primitive renderer unavailable: {err}");
                        fatal = true;
                        return;
                    }
                }
            }
            let Some(r) = renderer.as_mut() else { return };

            match r.render(rctx, target, view_projection, lists) {
                Ok(stats) if time.frame_index % STATS_INTERVAL == 0 => {
                    log::debug!("frame {}: {stats:?}", time.frame_index);
                }
                Ok(_) => {}
                Err(err) => log::error!("draw failed: {err}"),
            }
        });

        if fatal { AppControl::Exit } else { control }
    }

    fn on_exit(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.shutdown();
        }
    }
}

fn hue(t: f32) -> Color {
    let channel = |offset: f32| 0.5 + 0.5 * (TAU * (t + offset)).cos();
    Color::rgba(channel(0.0), channel(2.0 / 3.0), channel(1.0 / 3.0), 1.0)
}

fn record_scene(rec: &mut DrawRecorder, t: f32, stress: bool, pick: Option<Vec3>) {
    rec.new_frame();

    rec.grid(10.0, 20, 1.0, Color::rgba(0.5, 0.5, 0.5, 0.5));
    rec.axes(Mat4::IDENTITY, 2.0, 3.0);

    // Spinning, bobbing wire box.
    let spin = Mat4::from_scale_rotation_translation(
        Vec3::splat(1.5),
        Quat::from_rotation_y(t * 0.8),
        Vec3::new(0.0, 1.0 + 0.25 * (t * 2.0).sin(), 0.0),
    );
    rec.oriented_box(spin, 2.0, Color::YELLOW);

    // Filled triangle fan.
    let center = Vec3::new(-4.0, 0.5, 0.0);
    let segments = 16;
    rec.begin(DrawMode::Triangles);
    for i in 0..segments {
        let a0 = i as f32 / segments as f32 * TAU;
        let a1 = (i + 1) as f32 / segments as f32 * TAU;
        let color = hue(i as f32 / segments as f32 + t * 0.1).with_alpha(0.7);
        rec.vertex_with(center, 0.0, color);
        rec.vertex_with(center + Vec3::new(a0.cos(), 0.0, a0.sin()) * 1.5, 0.0, color);
        rec.vertex_with(center + Vec3::new(a1.cos(), 0.0, a1.sin()) * 1.5, 0.0, color);
    }
    rec.end();

    // Pulsing point ring.
    rec.begin(DrawMode::Points);
    for i in 0..32 {
        let a = i as f32 / 32.0 * TAU;
        let size = 6.0 + 4.0 * (t * 3.0 + a).sin();
        rec.vertex_with(Vec3::new(4.0 + 1.5 * a.cos(), 0.5, 1.5 * a.sin()), size, hue(a / TAU));
    }
    rec.end();
    rec.circle(Vec3::new(4.0, 0.5, 0.0), Vec3::Y, 1.8, 48, 2.0, Color::CYAN);

    // Overlay drawn after the base geometry.
    rec.push_layer(HIGHLIGHT);
    rec.aabb(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 2.2, 1.0), 4.0, Color::MAGENTA.with_alpha(0.8));
    if let Some(p) = pick {
        rec.point(p, 12.0, Color::WHITE);
        rec.circle(p, Vec3::Y, 0.3, 24, 2.0, Color::WHITE);
    }
    rec.pop_layer();

    if stress {
        record_stress(rec, t);
    }
}

fn record_stress(rec: &mut DrawRecorder, t: f32) {
    let cell = Vec2::new(20.0 / STRESS_COLUMNS as f32, 0.08);

    rec.begin(DrawMode::Triangles);
    for i in 0..STRESS_TRIANGLES {
        let (col, row) = (i % STRESS_COLUMNS, i / STRESS_COLUMNS);
        let x = -10.0 + col as f32 * cell.x;
        let z = -10.0 + row as f32 * cell.y;
        let y = -0.05 + 0.03 * (x * 0.7 + t).sin();
        let color = hue(row as f32 / 250.0).with_alpha(0.4);

        rec.vertex_with(Vec3::new(x, y, z), 0.0, color);
        rec.vertex_with(Vec3::new(x + cell.x, y, z), 0.0, color);
        rec.vertex_with(Vec3::new(x, y, z + cell.y), 0.0, color);
    }
    rec.end();
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    log::info!("right-drag orbits, middle-drag pans, wheel zooms; Space toggles stress, Escape exits");

    Runtime::run(
        RuntimeConfig {
            title: "imdraw demo".to_string(),
            ..RuntimeConfig::default()
        },
        GpuInit::default(),
        Demo::new(),
    )
}
