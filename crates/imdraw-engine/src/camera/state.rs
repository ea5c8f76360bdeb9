use glam::{Mat4, Vec2, Vec3};

use crate::coords::Viewport;

/// Matrices derived from a camera for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraState {
    pub fov_y: f32,
    pub viewport: Viewport,
    pub view: Mat4,
    pub view_inverse: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
}

/// World-space ray.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the plane `normal . p = d`, if hit in front of the origin.
    pub fn intersect_plane(&self, normal: Vec3, d: f32) -> Option<f32> {
        let denom = normal.dot(self.direction);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = (d - normal.dot(self.origin)) / denom;
        (t >= 0.0).then_some(t)
    }
}

impl CameraState {
    /// Camera position in world space.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.view_inverse.w_axis.truncate()
    }

    /// Ray through the window-space pixel `cursor` (origin top-left).
    pub fn cursor_ray(&self, cursor: Vec2) -> Ray {
        let size = self.viewport.size().max(Vec2::ONE);
        let ndc = Vec2::new(cursor.x / size.x * 2.0 - 1.0, 1.0 - cursor.y / size.y * 2.0);

        let inverse = self.view_projection.inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));

        Ray {
            origin: near,
            direction: (far - near).normalize_or(Vec3::NEG_Z),
        }
    }
}
