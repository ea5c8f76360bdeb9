use std::fmt;

use crate::render::RenderError;

/// Primitive kind of a draw list.
///
/// Determines the shader program, the primitive arity (records per instance), and the
/// base geometry the vertex stage expands each instance from.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PrimitiveKind {
    Points,
    Lines,
    Triangles,
}

/// Base geometry topology used for instanced expansion.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topology {
    /// 4-vertex quad strip (points and lines).
    TriangleStrip,
    /// Plain triangle (the first 3 vertices of the base quad).
    TriangleList,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 3] =
        [PrimitiveKind::Points, PrimitiveKind::Lines, PrimitiveKind::Triangles];

    /// Number of vertex records composing one primitive instance.
    #[inline]
    pub const fn arity(self) -> usize {
        match self {
            PrimitiveKind::Points => 1,
            PrimitiveKind::Lines => 2,
            PrimitiveKind::Triangles => 3,
        }
    }

    #[inline]
    pub const fn topology(self) -> Topology {
        match self {
            PrimitiveKind::Points | PrimitiveKind::Lines => Topology::TriangleStrip,
            PrimitiveKind::Triangles => Topology::TriangleList,
        }
    }

    /// Vertices of base geometry drawn per instance.
    #[inline]
    pub const fn base_vertex_count(self) -> u32 {
        match self.topology() {
            Topology::TriangleStrip => 4,
            Topology::TriangleList => 3,
        }
    }

    /// Dense index, used for per-kind tables.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PrimitiveKind::Points => 0,
            PrimitiveKind::Lines => 1,
            PrimitiveKind::Triangles => 2,
        }
    }
}

impl TryFrom<u32> for PrimitiveKind {
    type Error = RenderError;

    fn try_from(tag: u32) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(PrimitiveKind::Points),
            1 => Ok(PrimitiveKind::Lines),
            2 => Ok(PrimitiveKind::Triangles),
            other => Err(RenderError::UnknownPrimitive(other)),
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrimitiveKind::Points => "points",
            PrimitiveKind::Lines => "lines",
            PrimitiveKind::Triangles => "triangles",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_and_base_geometry() {
        assert_eq!(PrimitiveKind::Points.arity(), 1);
        assert_eq!(PrimitiveKind::Lines.arity(), 2);
        assert_eq!(PrimitiveKind::Triangles.arity(), 3);

        assert_eq!(PrimitiveKind::Points.base_vertex_count(), 4);
        assert_eq!(PrimitiveKind::Lines.base_vertex_count(), 4);
        assert_eq!(PrimitiveKind::Triangles.base_vertex_count(), 3);
        assert_eq!(PrimitiveKind::Triangles.topology(), Topology::TriangleList);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert_eq!(PrimitiveKind::try_from(1).ok(), Some(PrimitiveKind::Lines));
        assert!(matches!(
            PrimitiveKind::try_from(7),
            Err(RenderError::UnknownPrimitive(7))
        ));
    }
}
