use super::{LayerId, PrimitiveKind, VertexRecord};

/// Ordered, homogeneous run of vertex records for one frame.
///
/// Produced by [`DrawRecorder::end_frame`](super::DrawRecorder::end_frame) and consumed
/// read-only by the renderer. `layer == None` is the default layer.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawList {
    kind: PrimitiveKind,
    layer: Option<LayerId>,
    vertices: Vec<VertexRecord>,
}

impl DrawList {
    #[inline]
    pub fn new(kind: PrimitiveKind, layer: Option<LayerId>, vertices: Vec<VertexRecord>) -> Self {
        Self { kind, layer, vertices }
    }

    #[inline]
    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    #[inline]
    pub fn layer(&self) -> Option<LayerId> {
        self.layer
    }

    #[inline]
    pub fn vertices(&self) -> &[VertexRecord] {
        &self.vertices
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of complete primitives; a trailing partial primitive is not counted.
    #[inline]
    pub fn primitive_count(&self) -> usize {
        self.vertices.len() / self.kind.arity()
    }
}
