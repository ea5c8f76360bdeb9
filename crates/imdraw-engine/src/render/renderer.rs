use crate::scene::{DrawList, PrimitiveKind, VERTEX_RECORD_SIZE};

use super::{
    BatchPlan, FrameUniforms, PrimitiveBackend, RenderError, RenderResult, RendererConfig,
    ShaderCache, ShaderSources,
};

/// Counters for one `draw` call.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct DrawStats {
    /// Non-empty lists that were drawn.
    pub lists: usize,
    pub batches: usize,
    pub instances: usize,
    /// Lists skipped because their program is unavailable.
    pub skipped_lists: usize,
    /// Trailing records of malformed lists that were not drawn.
    pub dropped_vertices: usize,
    /// Kinds that had at least one malformed list (one warning each).
    pub malformed_kinds: usize,
}

/// Streams draw lists through a bounded upload buffer.
///
/// Each list is split into batches of whole primitives that fit the upload capacity;
/// every batch is uploaded (full replace) and drawn as one instanced call, strictly in
/// list order.
#[derive(Debug)]
pub struct PrimitiveRenderer<P> {
    config: RendererConfig,
    sources: ShaderSources,
    shaders: ShaderCache<P>,
    capacity: Option<usize>,
}

impl<P> PrimitiveRenderer<P> {
    pub fn new(config: RendererConfig, sources: ShaderSources) -> Self {
        let shaders = ShaderCache::new(config.shader_retry);
        Self {
            config,
            sources,
            shaders,
            capacity: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    #[inline]
    pub fn shaders(&self) -> &ShaderCache<P> {
        &self.shaders
    }

    /// Effective upload capacity in bytes, once initialized.
    #[inline]
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.capacity.is_some()
    }

    /// Queries the backend upload limit and allocates the upload channel.
    ///
    /// Calling it again on an initialized renderer is a no-op.
    pub fn initialize<B>(&mut self, backend: &mut B) -> RenderResult<()>
    where
        B: PrimitiveBackend<Program = P>,
    {
        if self.capacity.is_some() {
            return Ok(());
        }

        let limit = backend.max_upload_bytes();
        let mut capacity = self.config.max_upload_bytes.min(limit);
        capacity -= capacity % VERTEX_RECORD_SIZE;

        if capacity < self.config.min_upload_bytes {
            let err = RenderError::UploadLimitTooSmall {
                limit: capacity,
                minimum: self.config.min_upload_bytes,
            };
            log::error!("{err}");
            return Err(err);
        }

        // Largest arity must fit at least once.
        if let Err(err) = BatchPlan::new(PrimitiveKind::Triangles, 0, VERTEX_RECORD_SIZE, capacity) {
            log::error!("{err}");
            return Err(err.into());
        }

        backend.initialize(capacity)?;
        self.capacity = Some(capacity);

        log::info!(
            "primitive renderer initialized: upload capacity {capacity} bytes (backend limit {limit}), {} records per batch",
            capacity / VERTEX_RECORD_SIZE
        );
        Ok(())
    }

    /// Draws every list in order.
    ///
    /// Empty lists issue no backend calls. A frame made only of empty lists issues none
    /// at all, not even `begin_frame`.
    pub fn draw<B>(
        &mut self,
        backend: &mut B,
        frame: &FrameUniforms,
        lists: &[DrawList],
    ) -> RenderResult<DrawStats>
    where
        B: PrimitiveBackend<Program = P>,
    {
        let capacity = self.capacity.ok_or(RenderError::NotInitialized)?;

        let mut stats = DrawStats::default();
        let mut frame_started = false;
        let mut warned = [false; PrimitiveKind::ALL.len()];

        for list in lists {
            if list.is_empty() {
                continue;
            }

            let kind = list.kind();
            let plan = match BatchPlan::new(kind, list.len(), VERTEX_RECORD_SIZE, capacity) {
                Ok(plan) => plan,
                Err(err) => {
                    log::error!("{err}");
                    stats.skipped_lists += 1;
                    continue;
                }
            };

            stats.dropped_vertices += plan.dropped_vertices();
            if plan.dropped_vertices() > 0 && !warned[kind.index()] {
                warned[kind.index()] = true;
                stats.malformed_kinds += 1;
                log::warn!(
                    "{kind} list of {} records is not a multiple of {}; dropping {} trailing record(s)",
                    list.len(),
                    kind.arity(),
                    plan.dropped_vertices()
                );
            }

            if plan.primitive_count() == 0 {
                continue;
            }

            let Some(program) = self.shaders.get_or_create(kind, backend, &self.sources) else {
                stats.skipped_lists += 1;
                continue;
            };

            if !frame_started {
                backend.begin_frame(frame);
                frame_started = true;
            }

            backend.bind_program(kind, program);

            let vertices = list.vertices();
            for batch in plan.batches() {
                backend.upload(bytemuck::cast_slice(&vertices[batch.range()]));
                backend.draw_instanced(
                    kind.topology(),
                    kind.base_vertex_count(),
                    batch.primitive_count as u32,
                );
                stats.batches += 1;
                stats.instances += batch.primitive_count;
            }
            stats.lists += 1;
        }

        log::trace!(
            "drew {} lists in {} batches ({} instances)",
            stats.lists,
            stats.batches,
            stats.instances
        );
        Ok(stats)
    }

    /// Destroys cached programs; they are rebuilt on next use.
    ///
    /// Failed entries are reset as well, so new sources get a fresh attempt.
    pub fn invalidate_programs<B>(&mut self, backend: &mut B)
    where
        B: PrimitiveBackend<Program = P>,
    {
        self.shaders.clear(backend);
    }

    /// Replaces the shader source of one kind and invalidates cached programs.
    pub fn set_source<B>(&mut self, backend: &mut B, kind: PrimitiveKind, source: impl Into<String>)
    where
        B: PrimitiveBackend<Program = P>,
    {
        self.sources.set(kind, source);
        self.shaders.clear(backend);
    }

    /// Releases programs and the upload channel. Subsequent calls are no-ops.
    pub fn shutdown<B>(&mut self, backend: &mut B)
    where
        B: PrimitiveBackend<Program = P>,
    {
        if self.capacity.take().is_none() {
            return;
        }
        self.shaders.clear(backend);
        backend.shutdown();
        log::debug!("primitive renderer shut down");
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;
    use crate::paint::Color;
    use crate::render::testing::{test_sources, Op, RecordingBackend};
    use crate::render::ShaderRetry;
    use crate::scene::{LayerId, Topology, VertexRecord};

    const C: usize = 64 * 1024;

    fn list(kind: PrimitiveKind, n: usize) -> DrawList {
        let vertices = (0..n)
            .map(|i| VertexRecord::new(Vec3::new(i as f32, 0.0, 0.0), 2.0, Color::WHITE))
            .collect();
        DrawList::new(kind, None, vertices)
    }

    fn frame() -> FrameUniforms {
        FrameUniforms::new(Mat4::IDENTITY, 800, 600)
    }

    fn ready(limit: usize) -> (PrimitiveRenderer<u32>, RecordingBackend) {
        let mut backend = RecordingBackend::new(limit);
        let mut renderer = PrimitiveRenderer::new(RendererConfig::default(), test_sources());
        renderer.initialize(&mut backend).unwrap();
        (renderer, backend)
    }

    fn uploaded(backend: &RecordingBackend) -> Vec<u8> {
        backend.uploads().flatten().copied().collect()
    }

    #[test]
    fn single_triangle_batch() {
        let (mut renderer, mut backend) = ready(C);
        let lists = [list(PrimitiveKind::Triangles, 300)];

        let stats = renderer.draw(&mut backend, &frame(), &lists).unwrap();

        assert_eq!(stats.batches, 1);
        assert_eq!(stats.instances, 100);
        assert_eq!(backend.draws(), vec![(Topology::TriangleList, 3, 100)]);
        assert_eq!(uploaded(&backend).len(), 300 * VERTEX_RECORD_SIZE);
    }

    #[test]
    fn large_triangle_list_is_split_in_order() {
        let (mut renderer, mut backend) = ready(C);
        let lists = [list(PrimitiveKind::Triangles, 300_000)];

        let stats = renderer.draw(&mut backend, &frame(), &lists).unwrap();

        assert_eq!(stats.batches, 147);
        assert_eq!(stats.instances, 100_000);

        let draws = backend.draws();
        assert!(draws[..146].iter().all(|d| *d == (Topology::TriangleList, 3, 682)));
        assert_eq!(draws[146], (Topology::TriangleList, 3, 428));

        for bytes in backend.uploads() {
            assert!(bytes.len() <= C);
            assert!(bytes.len().is_multiple_of(3 * VERTEX_RECORD_SIZE));
        }

        // Concatenated uploads reproduce the list exactly.
        let expected: &[u8] = bytemuck::cast_slice(lists[0].vertices());
        assert_eq!(uploaded(&backend), expected);
    }

    #[test]
    fn every_upload_is_followed_by_its_draw() {
        let (mut renderer, mut backend) = ready(C);
        let lists = [list(PrimitiveKind::Lines, 10_000)];
        renderer.draw(&mut backend, &frame(), &lists).unwrap();

        let body = &backend.ops[2..];
        assert!(body.len().is_multiple_of(2));
        for pair in body.chunks(2) {
            assert!(matches!(pair[0], Op::Upload(_)));
            assert!(matches!(pair[1], Op::Draw { .. }));
        }
    }

    #[test]
    fn points_use_quad_strip() {
        let (mut renderer, mut backend) = ready(C);
        let stats = renderer
            .draw(&mut backend, &frame(), &[list(PrimitiveKind::Points, 5)])
            .unwrap();

        assert_eq!(stats.batches, 1);
        assert_eq!(backend.draws(), vec![(Topology::TriangleStrip, 4, 5)]);
    }

    #[test]
    fn malformed_line_list_drops_trailing_record() {
        let (mut renderer, mut backend) = ready(C);
        let lists = [list(PrimitiveKind::Lines, 7)];

        let stats = renderer.draw(&mut backend, &frame(), &lists).unwrap();

        assert_eq!(stats.instances, 3);
        assert_eq!(stats.dropped_vertices, 1);
        assert_eq!(uploaded(&backend).len(), 6 * VERTEX_RECORD_SIZE);
        let expected: &[u8] = bytemuck::cast_slice(&lists[0].vertices()[..6]);
        assert_eq!(uploaded(&backend), expected);
    }

    #[test]
    fn malformed_lists_warn_once_per_kind_per_frame() {
        let (mut renderer, mut backend) = ready(C);
        let lists = [
            list(PrimitiveKind::Lines, 5),
            list(PrimitiveKind::Lines, 3),
            list(PrimitiveKind::Triangles, 4),
            list(PrimitiveKind::Points, 3),
        ];

        let stats = renderer.draw(&mut backend, &frame(), &lists).unwrap();
        assert_eq!(stats.malformed_kinds, 2);
        assert_eq!(stats.dropped_vertices, 3);

        // Warnings are re-armed for the next frame.
        let stats = renderer.draw(&mut backend, &frame(), &lists).unwrap();
        assert_eq!(stats.malformed_kinds, 2);
    }

    #[test]
    fn lone_partial_primitive_issues_nothing() {
        let (mut renderer, mut backend) = ready(C);
        let stats = renderer
            .draw(&mut backend, &frame(), &[list(PrimitiveKind::Triangles, 2)])
            .unwrap();

        assert_eq!(stats.dropped_vertices, 2);
        assert!(backend.ops.is_empty());
        assert_eq!(backend.compilations, 0);
    }

    #[test]
    fn empty_lists_issue_no_calls() {
        let (mut renderer, mut backend) = ready(C);
        let lists = [
            list(PrimitiveKind::Points, 0),
            list(PrimitiveKind::Lines, 0),
            list(PrimitiveKind::Triangles, 0),
        ];

        let stats = renderer.draw(&mut backend, &frame(), &lists).unwrap();

        assert_eq!(stats, DrawStats::default());
        assert!(backend.ops.is_empty());
        assert_eq!(backend.compilations, 0);
    }

    #[test]
    fn lists_are_drawn_in_input_order() {
        let (mut renderer, mut backend) = ready(C);
        let overlay = LayerId::from_name("overlay");
        let lists = [
            list(PrimitiveKind::Triangles, 3),
            list(PrimitiveKind::Points, 1),
            DrawList::new(PrimitiveKind::Lines, Some(overlay), list(PrimitiveKind::Lines, 2).vertices().to_vec()),
        ];

        renderer.draw(&mut backend, &frame(), &lists).unwrap();

        let binds: Vec<PrimitiveKind> = backend
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Bind { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect();
        assert_eq!(
            binds,
            vec![PrimitiveKind::Triangles, PrimitiveKind::Points, PrimitiveKind::Lines]
        );
        assert_eq!(backend.ops[0], Op::BeginFrame(frame()));
        assert_eq!(backend.ops.iter().filter(|op| matches!(op, Op::BeginFrame(_))).count(), 1);
    }

    #[test]
    fn programs_are_built_once_per_kind() {
        let (mut renderer, mut backend) = ready(C);
        let lists = [list(PrimitiveKind::Points, 4), list(PrimitiveKind::Lines, 4)];

        renderer.draw(&mut backend, &frame(), &lists).unwrap();
        renderer.draw(&mut backend, &frame(), &lists).unwrap();

        assert_eq!(backend.compilations, 2);
    }

    #[test]
    fn failed_program_skips_only_its_kind() {
        let (mut renderer, mut backend) = ready(C);
        backend.fail_kind(PrimitiveKind::Points);
        let lists = [list(PrimitiveKind::Points, 4), list(PrimitiveKind::Lines, 4)];

        let stats = renderer.draw(&mut backend, &frame(), &lists).unwrap();
        assert_eq!(stats.skipped_lists, 1);
        assert_eq!(stats.lists, 1);
        assert_eq!(backend.draws(), vec![(Topology::TriangleStrip, 4, 2)]);

        // Terminal: no rebuild next frame.
        renderer.draw(&mut backend, &frame(), &lists).unwrap();
        assert_eq!(backend.compilations, 2);
    }

    #[test]
    fn retry_policy_rebuilds_failed_program_each_frame() {
        let mut backend = RecordingBackend::new(C);
        backend.fail_kind(PrimitiveKind::Points);
        let config = RendererConfig {
            shader_retry: ShaderRetry::EveryFrame,
            ..RendererConfig::default()
        };
        let mut renderer = PrimitiveRenderer::new(config, test_sources());
        renderer.initialize(&mut backend).unwrap();
        let lists = [list(PrimitiveKind::Points, 4)];

        renderer.draw(&mut backend, &frame(), &lists).unwrap();
        renderer.draw(&mut backend, &frame(), &lists).unwrap();
        assert_eq!(backend.compilations, 2);
        assert!(backend.ops.is_empty());

        backend.failing.clear();
        let stats = renderer.draw(&mut backend, &frame(), &lists).unwrap();
        assert_eq!(stats.instances, 4);
    }

    #[test]
    fn draw_before_initialize_fails() {
        let mut backend = RecordingBackend::new(C);
        let mut renderer: PrimitiveRenderer<u32> =
            PrimitiveRenderer::new(RendererConfig::default(), test_sources());

        let err = renderer
            .draw(&mut backend, &frame(), &[list(PrimitiveKind::Points, 1)])
            .unwrap_err();
        assert_eq!(err, RenderError::NotInitialized);
        assert!(backend.ops.is_empty());
    }

    #[test]
    fn capacity_is_clamped_and_record_aligned() {
        let (renderer, backend) = ready(1 << 20);
        assert_eq!(renderer.capacity(), Some(C));
        assert_eq!(backend.capacity, Some(C));

        let (renderer, _) = ready(20_010);
        assert_eq!(renderer.capacity(), Some(20_000));
    }

    #[test]
    fn small_backend_limit_fails_fast() {
        let mut backend = RecordingBackend::new(8 * 1024);
        let mut renderer: PrimitiveRenderer<u32> =
            PrimitiveRenderer::new(RendererConfig::default(), test_sources());

        let err = renderer.initialize(&mut backend).unwrap_err();
        assert_eq!(err, RenderError::UploadLimitTooSmall { limit: 8 * 1024, minimum: 16 * 1024 });
        assert!(backend.capacity.is_none());
        assert!(!renderer.is_initialized());
    }

    #[test]
    fn capacity_below_one_triangle_is_a_configuration_error() {
        let mut backend = RecordingBackend::new(C);
        let config = RendererConfig {
            max_upload_bytes: 64,
            min_upload_bytes: 0,
            ..RendererConfig::default()
        };
        let mut renderer: PrimitiveRenderer<u32> = PrimitiveRenderer::new(config, test_sources());

        let err = renderer.initialize(&mut backend).unwrap_err();
        assert!(matches!(err, RenderError::Batch(_)));
        assert!(backend.capacity.is_none());
    }

    #[test]
    fn shutdown_releases_everything_once() {
        let (mut renderer, mut backend) = ready(C);
        renderer
            .draw(&mut backend, &frame(), &[list(PrimitiveKind::Triangles, 3)])
            .unwrap();

        renderer.shutdown(&mut backend);
        renderer.shutdown(&mut backend);

        assert_eq!(backend.shutdowns, 1);
        assert_eq!(backend.destroyed, vec![1]);
        assert!(matches!(
            renderer.draw(&mut backend, &frame(), &[]),
            Err(RenderError::NotInitialized)
        ));
    }

    #[test]
    fn new_source_triggers_rebuild() {
        let (mut renderer, mut backend) = ready(C);
        let lists = [list(PrimitiveKind::Lines, 2)];
        renderer.draw(&mut backend, &frame(), &lists).unwrap();

        renderer.set_source(&mut backend, PrimitiveKind::Lines, "lines v2");
        renderer.draw(&mut backend, &frame(), &lists).unwrap();

        assert_eq!(backend.compilations, 2);
        assert_eq!(backend.destroyed, vec![1]);
    }
}
