use glam::{Mat4, Vec2, Vec3};

use crate::coords::Viewport;
use crate::input::{InputFrame, InputState, MouseButton};

use super::CameraState;

/// Radians of orbit per pixel of right-drag.
const ORBIT_FACTOR: f32 = 1.7 / 180.0;

/// Mouse snapshot consumed by [`OrbitCamera::mouse_input`].
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct MouseState {
    pub position: Vec2,
    pub left: bool,
    pub right: bool,
    pub middle: bool,
    /// Wheel notches this frame, positive away from the user.
    pub wheel: f32,
}

impl MouseState {
    pub fn from_input(state: &InputState, frame: &InputFrame) -> Option<Self> {
        Some(Self {
            position: state.pointer_pos?,
            left: state.button_down(MouseButton::Left),
            right: state.button_down(MouseButton::Right),
            middle: state.button_down(MouseButton::Middle),
            wheel: frame.wheel,
        })
    }
}

/// Orbit camera around the origin: right-drag rotates, middle-drag pans, wheel zooms.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub yaw: f32,
    pub pitch: f32,
    /// View-space translation; `z` is the orbit distance.
    pub shift: Vec3,
    pub near: f32,
    pub far: f32,
    aspect: f32,
    prev_mouse: Option<Vec2>,
    state: CameraState,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        let mut camera = Self {
            yaw: 0.0,
            pitch: 20f32.to_radians(),
            shift: Vec3::new(0.0, 0.0, 10.0),
            near: 0.1,
            far: 1000.0,
            aspect: 1.0,
            prev_mouse: None,
            state: CameraState {
                fov_y: 30f32.to_radians(),
                viewport: Viewport::new(1, 1),
                view: Mat4::IDENTITY,
                view_inverse: Mat4::IDENTITY,
                projection: Mat4::IDENTITY,
                view_projection: Mat4::IDENTITY,
            },
        };
        camera.update_projection();
        camera.update_view();
        camera
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> &CameraState {
        &self.state
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn set_fov_y(&mut self, radians: f32) {
        self.state.fov_y = radians;
        self.update_projection();
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport == self.state.viewport {
            return;
        }
        self.state.viewport = viewport;
        self.aspect = viewport.aspect();
        self.update_projection();
    }

    pub fn mouse_input(&mut self, mouse: &MouseState) {
        if let Some(prev) = self.prev_mouse {
            let delta = mouse.position - prev;

            if mouse.right {
                self.yaw += delta.x * ORBIT_FACTOR;
                self.pitch += delta.y * ORBIT_FACTOR;
            }
            if mouse.middle {
                let height = self.state.viewport.height.max(1) as f32;
                self.shift.x -= delta.x / height * self.shift.z;
                self.shift.y += delta.y / height * self.shift.z;
            }
        }

        if mouse.wheel > 0.0 {
            self.shift.z *= 0.9;
        } else if mouse.wheel < 0.0 {
            self.shift.z *= 1.1;
        }

        self.prev_mouse = Some(mouse.position);
        self.update_view();
    }

    /// Forgets the last cursor position, e.g. after the pointer left the window.
    pub fn reset_drag(&mut self) {
        self.prev_mouse = None;
    }

    fn update_view(&mut self) {
        let rotation = Mat4::from_rotation_x(self.pitch) * Mat4::from_rotation_y(self.yaw);
        self.state.view = Mat4::from_translation(-self.shift) * rotation;
        self.state.view_inverse = rotation.transpose() * Mat4::from_translation(self.shift);
        self.update_view_projection();
    }

    fn update_projection(&mut self) {
        self.state.projection =
            Mat4::perspective_rh(self.state.fov_y, self.aspect, self.near, self.far);
        self.update_view_projection();
    }

    fn update_view_projection(&mut self) {
        self.state.view_projection = self.state.projection * self.state.view;
    }
}
