//! Draw-list model and the immediate-mode recorder that produces it.
//!
//! Responsibilities:
//! - define the GPU-facing vertex record and primitive kinds
//! - record per-frame primitives into homogeneous draw lists (per layer, per kind)
//! - keep shape helpers isolated in `shapes`

mod layer;
mod list;
mod primitive;
mod recorder;
mod shapes;
mod vertex;

pub use layer::LayerId;
pub use list::DrawList;
pub use primitive::{PrimitiveKind, Topology};
pub use recorder::{DrawMode, DrawRecorder, DEFAULT_SIZE};
pub use vertex::{VertexRecord, UNIFORM_ALIGNMENT, VERTEX_RECORD_SIZE};
