// Screen-space hit testing against the model's bounds

use nalgebra_glm as glm;

use crate::model::Aabb;

/// Below this much pointer travel a press/release pair counts as a click.
pub const CLICK_DRAG_THRESHOLD: f64 = 4.0;

/// Pixel rectangle, origin at the top left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub min: glm::Vec2,
    pub max: glm::Vec2,
}

impl ScreenRect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min.x && x <= self.max.x && y >= self.min.y && y <= self.max.y
    }
}

/// Project the eight corners of `bounds` and return their pixel extent.
/// Corners behind the camera are ignored; `None` when all of them are.
pub fn project_bounds(bounds: &Aabb, view_proj: &glm::Mat4, viewport: (f32, f32)) -> Option<ScreenRect> {
    let (width, height) = viewport;
    let mut rect: Option<ScreenRect> = None;
    for corner in bounds.corners() {
        let clip = view_proj * glm::vec4(corner.x, corner.y, corner.z, 1.0);
        if clip.w <= f32::EPSILON {
            continue;
        }
        let ndc = glm::vec2(clip.x / clip.w, clip.y / clip.w);
        let pixel = glm::vec2(
            (ndc.x * 0.5 + 0.5) * width,
            (0.5 - ndc.y * 0.5) * height,
        );
        rect = Some(match rect {
            Some(r) => ScreenRect {
                min: glm::min2(&r.min, &pixel),
                max: glm::max2(&r.max, &pixel),
            },
            None => ScreenRect {
                min: pixel,
                max: pixel,
            },
        });
    }
    rect
}

/// Tells a click from an orbit drag with the left button.
#[derive(Debug, Default)]
pub struct ClickGesture {
    press: Option<(f64, f64)>,
    travelled: f64,
}

impl ClickGesture {
    pub fn press(&mut self, position: (f64, f64)) {
        self.press = Some(position);
        self.travelled = 0.0;
    }

    pub fn moved(&mut self, position: (f64, f64)) {
        if let Some(start) = self.press {
            let d = ((position.0 - start.0).powi(2) + (position.1 - start.1).powi(2)).sqrt();
            self.travelled = self.travelled.max(d);
        }
    }

    /// Whether the release completes a click.
    pub fn release(&mut self) -> bool {
        let was_pressed = self.press.take().is_some();
        was_pressed && self.travelled < CLICK_DRAG_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::camera::CameraState;

    #[test]
    fn box_at_target_projects_around_screen_center() {
        let camera = CameraState::default();
        let view_proj = camera.view_proj(800.0 / 600.0);
        let bounds = Aabb {
            min: glm::vec3(-1.0, -1.0, -1.0),
            max: glm::vec3(1.0, 1.0, 1.0),
        };
        let rect = project_bounds(&bounds, &view_proj, (800.0, 600.0)).unwrap();
        assert!(rect.contains(400.0, 300.0));
        assert!(!rect.contains(5.0, 5.0));
        assert!(rect.min.x < rect.max.x && rect.min.y < rect.max.y);
    }

    #[test]
    fn box_behind_camera_is_not_visible() {
        let camera = CameraState::default();
        let view_proj = camera.view_proj(1.0);
        // far beyond the eye, opposite the look direction
        let behind = camera.position + (camera.position - camera.target) * 2.0;
        let bounds = Aabb {
            min: behind - glm::vec3(0.5, 0.5, 0.5),
            max: behind + glm::vec3(0.5, 0.5, 0.5),
        };
        assert!(project_bounds(&bounds, &view_proj, (100.0, 100.0)).is_none());
    }

    #[test]
    fn small_jitter_is_still_a_click() {
        let mut gesture = ClickGesture::default();
        gesture.press((10.0, 10.0));
        gesture.moved((12.0, 11.0));
        assert!(gesture.release());
        // release without press
        assert!(!gesture.release());
    }

    #[test]
    fn drag_is_not_a_click() {
        let mut gesture = ClickGesture::default();
        gesture.press((10.0, 10.0));
        gesture.moved((60.0, 10.0));
        gesture.moved((10.0, 10.0));
        assert!(!gesture.release());
    }
}
