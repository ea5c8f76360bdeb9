use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::paint::Color;

/// Uniform-buffer element alignment required by every supported backend.
pub const UNIFORM_ALIGNMENT: usize = 16;

/// One abstract vertex of the immediate-mode system.
///
/// Layout matches the `VertexData` struct declared by the primitive shaders:
/// - `position_size.xyz`: world-space position
/// - `position_size.w`: point size / line width in pixels (ignored for triangles)
/// - `color`: packed `0xRRGGBBAA`, straight alpha
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct VertexRecord {
    pub position_size: [f32; 4],
    pub color: u32,
    pub _pad: [u32; 3],
}

/// Size of one record in bytes (`S` in the batching contract).
pub const VERTEX_RECORD_SIZE: usize = std::mem::size_of::<VertexRecord>();

const _: () = assert!(VERTEX_RECORD_SIZE.is_multiple_of(UNIFORM_ALIGNMENT));

impl VertexRecord {
    #[inline]
    pub fn new(position: Vec3, size: f32, color: Color) -> Self {
        Self {
            position_size: [position.x, position.y, position.z, size],
            color: color.pack(),
            _pad: [0; 3],
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.position_size[0], self.position_size[1], self.position_size[2])
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.position_size[3]
    }

    #[inline]
    pub fn color(&self) -> Color {
        Color::unpack(self.color)
    }
}
