use glam::Vec3;

use crate::paint::Color;

use super::{DrawList, LayerId, PrimitiveKind, VertexRecord};

/// Primitive assembly mode for [`DrawRecorder::begin`].
///
/// Strips and loops are expanded into independent line segments, so they end up in the
/// same `Lines` draw list as plain lines.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawMode {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
}

impl DrawMode {
    #[inline]
    pub const fn kind(self) -> PrimitiveKind {
        match self {
            DrawMode::Points => PrimitiveKind::Points,
            DrawMode::Lines | DrawMode::LineStrip | DrawMode::LineLoop => PrimitiveKind::Lines,
            DrawMode::Triangles => PrimitiveKind::Triangles,
        }
    }
}

pub const DEFAULT_SIZE: f32 = 2.0;

#[derive(Debug)]
struct Bucket {
    layer: Option<LayerId>,
    kind: PrimitiveKind,
    vertices: Vec<VertexRecord>,
}

#[derive(Debug, Default)]
struct StripState {
    first: Option<VertexRecord>,
    prev: Option<VertexRecord>,
    count: usize,
}

/// Per-frame immediate-mode recorder producing [`DrawList`]s.
///
/// Usage per frame:
/// 1) `new_frame()`
/// 2) any number of `begin(mode)` / `vertex(..)` / `end()` blocks (or shape helpers)
/// 3) `end_frame()` to finalize; the returned lists stay valid until the next `new_frame()`
///
/// Output ordering:
/// - layers in first-use order (the default layer counts as a layer)
/// - within a layer: triangles, then lines, then points
/// - within a list: submission order
#[derive(Debug)]
pub struct DrawRecorder {
    color: Color,
    size: f32,
    layer_stack: Vec<LayerId>,

    mode: Option<DrawMode>,
    pending: Vec<VertexRecord>,
    strip: StripState,

    layer_order: Vec<Option<LayerId>>,
    buckets: Vec<Bucket>,

    lists: Vec<DrawList>,
    finalized: bool,
}

impl Default for DrawRecorder {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            size: DEFAULT_SIZE,
            layer_stack: Vec::new(),
            mode: None,
            pending: Vec::with_capacity(3),
            strip: StripState::default(),
            layer_order: Vec::new(),
            buckets: Vec::new(),
            lists: Vec::new(),
            finalized: false,
        }
    }
}

impl DrawRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards the previous frame's draw lists and resets style state.
    pub fn new_frame(&mut self) {
        if self.mode.is_some() {
            log::debug!("DrawRecorder: primitive block left open across frames; discarded");
        }
        if !self.layer_stack.is_empty() {
            log::warn!(
                "DrawRecorder: {} layer(s) still pushed at new_frame; popping",
                self.layer_stack.len()
            );
        }

        self.color = Color::WHITE;
        self.size = DEFAULT_SIZE;
        self.layer_stack.clear();
        self.mode = None;
        self.pending.clear();
        self.strip = StripState::default();
        self.layer_order.clear();
        self.buckets.clear();
        self.lists.clear();
        self.finalized = false;
    }

    #[inline]
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Sets point size / line width in pixels for subsequent vertices.
    #[inline]
    pub fn set_size(&mut self, size: f32) {
        self.size = size;
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn push_layer(&mut self, layer: LayerId) {
        self.layer_stack.push(layer);
    }

    pub fn pop_layer(&mut self) {
        debug_assert!(!self.layer_stack.is_empty(), "pop_layer called without matching push_layer");
        self.layer_stack.pop();
    }

    /// Current layer; `None` is the default layer.
    #[inline]
    pub fn current_layer(&self) -> Option<LayerId> {
        self.layer_stack.last().copied()
    }

    /// Starts a primitive block. An open block is closed first.
    pub fn begin(&mut self, mode: DrawMode) {
        if self.mode.is_some() {
            log::debug!("DrawRecorder: begin({mode:?}) while a block is open; closing it");
            self.end();
        }
        self.mode = Some(mode);
    }

    /// Emits a vertex using the current color and size.
    #[inline]
    pub fn vertex(&mut self, position: Vec3) {
        self.vertex_with(position, self.size, self.color);
    }

    /// Emits a vertex with an explicit size and color.
    pub fn vertex_with(&mut self, position: Vec3, size: f32, color: Color) {
        let Some(mode) = self.mode else {
            log::warn!("DrawRecorder: vertex emitted outside begin/end; ignored");
            return;
        };

        let v = VertexRecord::new(position, size, color);
        match mode {
            DrawMode::Points => self.bucket_mut(PrimitiveKind::Points).push(v),
            DrawMode::Lines | DrawMode::Triangles => {
                self.pending.push(v);
                let kind = mode.kind();
                if self.pending.len() == kind.arity() {
                    let prim = std::mem::take(&mut self.pending);
                    self.bucket_mut(kind).extend_from_slice(&prim);
                    self.pending = prim;
                    self.pending.clear();
                }
            }
            DrawMode::LineStrip | DrawMode::LineLoop => {
                if let Some(prev) = self.strip.prev {
                    self.bucket_mut(PrimitiveKind::Lines).extend_from_slice(&[prev, v]);
                } else {
                    self.strip.first = Some(v);
                }
                self.strip.prev = Some(v);
                self.strip.count += 1;
            }
        }
    }

    /// Closes the current primitive block.
    pub fn end(&mut self) {
        let Some(mode) = self.mode.take() else {
            log::warn!("DrawRecorder: end() without begin()");
            return;
        };

        if mode == DrawMode::LineLoop && self.strip.count > 2 {
            if let (Some(prev), Some(first)) = (self.strip.prev, self.strip.first) {
                self.bucket_mut(PrimitiveKind::Lines).extend_from_slice(&[prev, first]);
            }
        }

        if !self.pending.is_empty() {
            log::debug!(
                "DrawRecorder: incomplete {:?} primitive dropped ({} vertices)",
                mode,
                self.pending.len()
            );
            self.pending.clear();
        }
        self.strip = StripState::default();
    }

    /// Finalizes the frame and returns its draw lists.
    ///
    /// Calling this more than once per frame returns the same lists.
    pub fn end_frame(&mut self) -> &[DrawList] {
        if self.finalized {
            return &self.lists;
        }
        if self.mode.is_some() {
            self.end();
        }

        const KIND_ORDER: [PrimitiveKind; 3] =
            [PrimitiveKind::Triangles, PrimitiveKind::Lines, PrimitiveKind::Points];

        for &layer in &self.layer_order {
            for kind in KIND_ORDER {
                let Some(bucket) = self
                    .buckets
                    .iter_mut()
                    .find(|b| b.layer == layer && b.kind == kind)
                else {
                    continue;
                };
                if bucket.vertices.is_empty() {
                    continue;
                }
                let vertices = std::mem::take(&mut bucket.vertices);
                self.lists.push(DrawList::new(kind, layer, vertices));
            }
        }

        self.finalized = true;
        &self.lists
    }

    /// Draw lists of the last finalized frame (empty before `end_frame`).
    #[inline]
    pub fn draw_lists(&self) -> &[DrawList] {
        &self.lists
    }

    fn bucket_mut(&mut self, kind: PrimitiveKind) -> &mut Vec<VertexRecord> {
        let layer = self.current_layer();

        if !self.layer_order.contains(&layer) {
            self.layer_order.push(layer);
        }

        let idx = match self
            .buckets
            .iter()
            .position(|b| b.layer == layer && b.kind == kind)
        {
            Some(i) => i,
            None => {
                self.buckets.push(Bucket { layer, kind, vertices: Vec::new() });
                self.buckets.len() - 1
            }
        };
        &mut self.buckets[idx].vertices
    }
}
