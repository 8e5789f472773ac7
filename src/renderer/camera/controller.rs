use nalgebra_glm as glm;
use std::f32::consts::PI;

use super::CameraState;

/// Keeps the camera off the poles so `look_at` never degenerates.
const POLAR_EPSILON: f32 = 1e-6;
/// Remaining angular velocity below which damping stops.
const SETTLE_EPSILON: f32 = 1e-6;

/// Orbit controls: left-drag rotates around the target, no zoom, no pan.
pub struct CameraController {
    state: CameraState,
    damping_factor: f32,
    rotate_speed: f32,
    /// Pending rotation (theta, phi) still to be applied over the next frames.
    delta_theta: f32,
    delta_phi: f32,
    left_mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
}

impl CameraController {
    pub fn new(state: CameraState, damping_factor: f32, rotate_speed: f32) -> Self {
        Self {
            state,
            damping_factor: damping_factor.clamp(0.0, 1.0),
            rotate_speed,
            delta_theta: 0.0,
            delta_phi: 0.0,
            left_mouse_pressed: false,
            last_mouse_pos: None,
        }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    /// Handle mouse button press/release
    pub fn on_mouse_button(&mut self, button: winit::event::MouseButton, pressed: bool) {
        if button == winit::event::MouseButton::Left {
            self.left_mouse_pressed = pressed;
            if !pressed {
                self.last_mouse_pos = None;
            }
        }
    }

    /// Returns whether the move rotated the camera.
    pub fn on_mouse_move(&mut self, position: (f64, f64), viewport_height: f32) -> bool {
        if !self.left_mouse_pressed {
            self.last_mouse_pos = None;
            return false;
        }
        let handled = match self.last_mouse_pos {
            Some(last) => {
                let dx = (position.0 - last.0) as f32;
                let dy = (position.1 - last.1) as f32;
                self.rotate(dx, dy, viewport_height);
                true
            }
            None => false,
        };
        self.last_mouse_pos = Some(position);
        handled
    }

    /// A full viewport height of drag is one revolution.
    fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.delta_theta -= 2.0 * PI * dx / height * self.rotate_speed;
        self.delta_phi -= 2.0 * PI * dy / height * self.rotate_speed;
    }

    /// Apply a damped share of the pending rotation. Call once per frame.
    /// Returns whether the camera moved.
    pub fn update(&mut self) -> bool {
        if self.delta_theta.abs() < SETTLE_EPSILON && self.delta_phi.abs() < SETTLE_EPSILON {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            return false;
        }

        let offset = self.state.position - self.state.target;
        let radius = glm::length(&offset);
        if radius <= f32::EPSILON {
            return false;
        }
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        theta += self.delta_theta * self.damping_factor;
        phi += self.delta_phi * self.damping_factor;
        phi = phi.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);

        let sin_phi = phi.sin();
        let offset = glm::vec3(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        self.state.position = self.state.target + offset;

        self.delta_theta *= 1.0 - self.damping_factor;
        self.delta_phi *= 1.0 - self.damping_factor;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::event::MouseButton;

    fn controller() -> CameraController {
        CameraController::new(CameraState::default(), 0.05, 1.0)
    }

    fn drag(c: &mut CameraController, from: (f64, f64), to: (f64, f64)) {
        c.on_mouse_button(MouseButton::Left, true);
        c.on_mouse_move(from, 800.0);
        c.on_mouse_move(to, 800.0);
        c.on_mouse_button(MouseButton::Left, false);
    }

    #[test]
    fn moving_without_button_does_nothing() {
        let mut c = controller();
        assert!(!c.on_mouse_move((0.0, 0.0), 800.0));
        assert!(!c.on_mouse_move((100.0, 0.0), 800.0));
        assert!(!c.update());
    }

    #[test]
    fn damping_keeps_radius_and_settles() {
        let mut c = controller();
        let start = c.state().position;
        let radius = glm::length(&start);
        drag(&mut c, (0.0, 0.0), (200.0, 0.0));

        assert!(c.update());
        let mut frames = 1;
        while c.update() {
            frames += 1;
            assert!(frames < 1000, "damping never settled");
        }
        let end = c.state().position;
        assert!((glm::length(&end) - radius).abs() < 1e-2);
        assert!((end.y - start.y).abs() < 1e-3, "horizontal drag keeps the height");
        assert!(glm::distance(&end, &start) > 1.0);
    }

    #[test]
    fn vertical_drag_never_crosses_the_pole() {
        let mut c = controller();
        drag(&mut c, (0.0, 0.0), (0.0, 100_000.0));
        while c.update() {}
        let offset = c.state().position - c.state().target;
        assert!(offset.iter().all(|v| v.is_finite()));
        assert!(offset.y > 0.0, "stays on the upper side: {offset:?}");

        drag(&mut c, (0.0, 0.0), (0.0, -100_000.0));
        while c.update() {}
        let offset = c.state().position - c.state().target;
        assert!(offset.iter().all(|v| v.is_finite()));
        assert!(offset.y < 0.0, "stays on the lower side: {offset:?}");
    }

    #[test]
    fn other_buttons_do_not_rotate() {
        let mut c = controller();
        c.on_mouse_button(MouseButton::Right, true);
        c.on_mouse_move((0.0, 0.0), 800.0);
        assert!(!c.on_mouse_move((50.0, 50.0), 800.0));
    }
}
