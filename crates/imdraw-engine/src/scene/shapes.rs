//! Shape helpers built on top of [`DrawRecorder`] primitive blocks.
//!
//! Each helper records with explicit style and leaves the recorder's current color/size
//! untouched.

use glam::{Mat4, Vec3};

use crate::paint::Color;

use super::{DrawMode, DrawRecorder};

impl DrawRecorder {
    pub fn point(&mut self, position: Vec3, size: f32, color: Color) {
        self.begin(DrawMode::Points);
        self.vertex_with(position, size, color);
        self.end();
    }

    pub fn line(&mut self, a: Vec3, b: Vec3, width: f32, color: Color) {
        self.begin(DrawMode::Lines);
        self.vertex_with(a, width, color);
        self.vertex_with(b, width, color);
        self.end();
    }

    pub fn triangle(&mut self, a: Vec3, b: Vec3, c: Vec3, color: Color) {
        self.begin(DrawMode::Triangles);
        self.vertex_with(a, 0.0, color);
        self.vertex_with(b, 0.0, color);
        self.vertex_with(c, 0.0, color);
        self.end();
    }

    /// Filled quad `a-b-c-d` (counter-clockwise), as two triangles.
    pub fn quad_filled(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3, color: Color) {
        self.begin(DrawMode::Triangles);
        for p in [a, b, c, a, c, d] {
            self.vertex_with(p, 0.0, color);
        }
        self.end();
    }

    /// Wireframe axis-aligned box.
    pub fn aabb(&mut self, min: Vec3, max: Vec3, width: f32, color: Color) {
        let corners = [
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(max.x, max.y, max.z),
            Vec3::new(min.x, max.y, max.z),
        ];
        self.box_edges(&corners, width, color);
    }

    /// Wireframe unit cube (`-0.5..0.5`) transformed by `transform`.
    pub fn oriented_box(&mut self, transform: Mat4, width: f32, color: Color) {
        let corners = [
            Vec3::new(-0.5, -0.5, -0.5),
            Vec3::new(0.5, -0.5, -0.5),
            Vec3::new(0.5, 0.5, -0.5),
            Vec3::new(-0.5, 0.5, -0.5),
            Vec3::new(-0.5, -0.5, 0.5),
            Vec3::new(0.5, -0.5, 0.5),
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(-0.5, 0.5, 0.5),
        ]
        .map(|p| transform.transform_point3(p));
        self.box_edges(&corners, width, color);
    }

    /// Circle outline in the plane through `center` with normal `normal`.
    pub fn circle(
        &mut self,
        center: Vec3,
        normal: Vec3,
        radius: f32,
        segments: u32,
        width: f32,
        color: Color,
    ) {
        let segments = segments.max(3);
        let (u, v) = normal.normalize_or(Vec3::Y).any_orthonormal_pair();

        self.begin(DrawMode::LineLoop);
        for i in 0..segments {
            let t = i as f32 / segments as f32 * std::f32::consts::TAU;
            let p = center + (u * t.cos() + v * t.sin()) * radius;
            self.vertex_with(p, width, color);
        }
        self.end();
    }

    /// Square grid on the XZ plane, centered at the origin.
    pub fn grid(&mut self, half_extent: f32, cells: u32, width: f32, color: Color) {
        let cells = cells.max(1);
        let step = 2.0 * half_extent / cells as f32;

        self.begin(DrawMode::Lines);
        for i in 0..=cells {
            let t = -half_extent + step * i as f32;
            self.vertex_with(Vec3::new(t, 0.0, -half_extent), width, color);
            self.vertex_with(Vec3::new(t, 0.0, half_extent), width, color);
            self.vertex_with(Vec3::new(-half_extent, 0.0, t), width, color);
            self.vertex_with(Vec3::new(half_extent, 0.0, t), width, color);
        }
        self.end();
    }

    /// X/Y/Z axes of `transform` as red/green/blue lines.
    pub fn axes(&mut self, transform: Mat4, length: f32, width: f32) {
        let origin = transform.transform_point3(Vec3::ZERO);
        let axes = [
            (Vec3::X, Color::RED),
            (Vec3::Y, Color::GREEN),
            (Vec3::Z, Color::BLUE),
        ];

        self.begin(DrawMode::Lines);
        for (axis, color) in axes {
            let tip = transform.transform_point3(axis * length);
            self.vertex_with(origin, width, color);
            self.vertex_with(tip, width, color);
        }
        self.end();
    }

    fn box_edges(&mut self, c: &[Vec3; 8], width: f32, color: Color) {
        const EDGES: [(usize, usize); 12] = [
            (0, 1), (1, 2), (2, 3), (3, 0),
            (4, 5), (5, 6), (6, 7), (7, 4),
            (0, 4), (1, 5), (2, 6), (3, 7),
        ];

        self.begin(DrawMode::Lines);
        for (a, b) in EDGES {
            self.vertex_with(c[a], width, color);
            self.vertex_with(c[b], width, color);
        }
        self.end();
    }
}
