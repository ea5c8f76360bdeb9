//! Splitting of draw lists into capacity-bounded upload batches.
//!
//! Invariants of a plan (for capacity `C`, record size `S`, arity `a`):
//! - batches cover the complete primitives of the list, in order, without gaps/overlaps
//! - every batch holds at most `floor(C / (S * a))` primitives, so `records * S <= C`
//! - every batch holds whole primitives (`records % a == 0`)

use crate::scene::PrimitiveKind;

use super::BatchError;

/// One contiguous upload: a sub-range of a draw list's vertex records.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Batch {
    pub first_vertex: usize,
    pub vertex_count: usize,
    pub primitive_count: usize,
}

impl Batch {
    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.first_vertex..self.first_vertex + self.vertex_count
    }
}

/// Batching plan for one draw list.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BatchPlan {
    kind: PrimitiveKind,
    max_primitives_per_batch: usize,
    primitive_count: usize,
    dropped_vertices: usize,
}

impl BatchPlan {
    /// Plans batches for `vertex_count` records of `record_size` bytes against a buffer
    /// of `capacity` bytes.
    ///
    /// A trailing partial primitive (`vertex_count % arity != 0`) is excluded from the
    /// plan and reported through [`dropped_vertices`](Self::dropped_vertices); it is
    /// never read.
    pub fn new(
        kind: PrimitiveKind,
        vertex_count: usize,
        record_size: usize,
        capacity: usize,
    ) -> Result<Self, BatchError> {
        let arity = kind.arity();
        let primitive_bytes = record_size * arity;
        let max_primitives_per_batch = capacity.checked_div(primitive_bytes).unwrap_or(0);

        if max_primitives_per_batch == 0 {
            return Err(BatchError::CapacityTooSmall {
                kind,
                capacity,
                required: primitive_bytes,
            });
        }

        Ok(Self {
            kind,
            max_primitives_per_batch,
            primitive_count: vertex_count / arity,
            dropped_vertices: vertex_count % arity,
        })
    }

    #[inline]
    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    #[inline]
    pub fn max_primitives_per_batch(&self) -> usize {
        self.max_primitives_per_batch
    }

    #[inline]
    pub fn primitive_count(&self) -> usize {
        self.primitive_count
    }

    /// Records past the last complete primitive.
    #[inline]
    pub fn dropped_vertices(&self) -> usize {
        self.dropped_vertices
    }

    #[inline]
    pub fn batch_count(&self) -> usize {
        self.primitive_count.div_ceil(self.max_primitives_per_batch)
    }

    /// Batches in draw order.
    pub fn batches(&self) -> Batches {
        Batches {
            arity: self.kind.arity(),
            max_primitives: self.max_primitives_per_batch,
            remaining: self.primitive_count,
            next_primitive: 0,
        }
    }
}

/// Iterator over the batches of a [`BatchPlan`].
#[derive(Debug, Clone)]
pub struct Batches {
    arity: usize,
    max_primitives: usize,
    remaining: usize,
    next_primitive: usize,
}

impl Iterator for Batches {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if self.remaining == 0 {
            return None;
        }

        let primitive_count = self.remaining.min(self.max_primitives);
        let batch = Batch {
            first_vertex: self.next_primitive * self.arity,
            vertex_count: primitive_count * self.arity,
            primitive_count,
        };

        self.next_primitive += primitive_count;
        self.remaining -= primitive_count;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.div_ceil(self.max_primitives);
        (n, Some(n))
    }
}

impl ExactSizeIterator for Batches {}
