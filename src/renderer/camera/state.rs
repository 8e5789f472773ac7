use nalgebra_glm as glm;

use crate::settings::CameraSettings;

/// Perspective camera looking at a target, Y up.
#[derive(Debug, Clone)]
pub struct CameraState {
    pub position: glm::Vec3,
    pub target: glm::Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl CameraState {
    pub fn from_settings(settings: &CameraSettings) -> Self {
        Self {
            position: glm::make_vec3(&settings.position),
            target: glm::make_vec3(&settings.target),
            fov_y: settings.fov_degrees.to_radians(),
            near: settings.near,
            far: settings.far,
        }
    }

    pub fn view(&self) -> glm::Mat4 {
        glm::look_at(&self.position, &self.target, &glm::vec3(0.0, 1.0, 0.0))
    }

    /// Projection with a 0..1 depth range.
    pub fn projection(&self, aspect: f32) -> glm::Mat4 {
        glm::perspective_rh_zo(aspect.max(f32::EPSILON), self.fov_y, self.near, self.far)
    }

    pub fn view_proj(&self, aspect: f32) -> glm::Mat4 {
        self.projection(aspect) * self.view()
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::from_settings(&CameraSettings::default())
    }
}
