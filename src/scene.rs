// Static surroundings of the model: ground, light, studio ambient, contact shadow

use nalgebra_glm as glm;

use crate::model::{Aabb, Vertex};
use crate::settings::SceneSettings;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPlane {
    pub size: f32,
    pub height: f32,
    pub color: [f32; 3],
    pub metalness: f32,
    pub roughness: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactShadow {
    pub opacity: f32,
    pub scale: f32,
    pub blur: f32,
    /// Height above the ground at which the shadow has faded out.
    pub far: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    /// Unit vector pointing from the scene towards the light.
    pub light_dir: glm::Vec3,
    pub light_intensity: f32,
    pub sky_color: glm::Vec3,
    pub ground_ambient: glm::Vec3,
    /// Direction of the studio key light after the environment rotation.
    pub key_dir: glm::Vec3,
    pub key_strength: f32,
    pub ground: GroundPlane,
    pub shadow: ContactShadow,
    pub background: [f32; 3],
    pub model_position: glm::Vec3,
}

impl Environment {
    pub fn from_settings(settings: &SceneSettings) -> Self {
        let light = glm::make_vec3(&settings.light_position);
        let light_dir = if glm::length(&light) > f32::EPSILON {
            glm::normalize(&light)
        } else {
            glm::vec3(0.0, 1.0, 0.0)
        };
        let key = glm::rotate_y_vec3(&glm::vec3(0.0, 0.6, 1.0), settings.environment_rotation_y);

        Self {
            light_dir,
            light_intensity: settings.light_intensity,
            sky_color: glm::vec3(0.55, 0.55, 0.6),
            ground_ambient: glm::vec3(0.12, 0.1, 0.1),
            key_dir: glm::normalize(&key),
            key_strength: 0.35,
            ground: GroundPlane {
                size: settings.ground_size,
                height: settings.ground_height,
                color: settings.ground_color,
                metalness: settings.ground_metalness,
                roughness: settings.ground_roughness,
            },
            shadow: ContactShadow {
                opacity: settings.shadow_opacity,
                scale: settings.shadow_scale,
                blur: settings.shadow_blur,
                far: settings.shadow_far,
            },
            background: settings.background_color,
            model_position: glm::make_vec3(&settings.model_position),
        }
    }

    pub fn ground_matrix(&self) -> glm::Mat4 {
        glm::translation(&glm::vec3(0.0, self.ground.height, 0.0))
            * glm::scaling(&glm::vec3(self.ground.size, 1.0, self.ground.size))
    }

    /// Placement and opacity of the contact shadow under `bounds`. `None` when
    /// there is nothing to shadow or it is too far above the ground.
    pub fn shadow_under(&self, bounds: Option<&Aabb>) -> Option<(glm::Mat4, f32)> {
        let bounds = bounds?;
        let elevation = (bounds.min.y - self.ground.height).max(0.0);
        let fade = if self.shadow.far > 0.0 {
            (1.0 - elevation / self.shadow.far).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let opacity = self.shadow.opacity * fade;
        if opacity <= 0.0 {
            return None;
        }
        let center = bounds.center();
        let footprint = (bounds.max.x - bounds.min.x)
            .max(bounds.max.z - bounds.min.z)
            .max(self.shadow.scale);
        // lifted slightly so it does not fight the ground for depth
        let matrix = glm::translation(&glm::vec3(center.x, self.ground.height + 0.005, center.z))
            * glm::scaling(&glm::vec3(footprint, 1.0, footprint));
        Some((matrix, opacity))
    }
}

/// Unit quad in the XZ plane facing +Y.
pub fn unit_quad() -> (Vec<Vertex>, Vec<u32>) {
    let normal = [0.0, 1.0, 0.0];
    let vertices = [[-0.5, 0.0, -0.5], [-0.5, 0.0, 0.5], [0.5, 0.0, 0.5], [0.5, 0.0, -0.5]]
        .into_iter()
        .map(|position| Vertex { position, normal })
        .collect();
    (vertices, vec![0, 1, 2, 0, 2, 3])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_place_light_overhead_and_rotate_studio() {
        let env = Environment::from_settings(&SceneSettings::default());
        assert_eq!(env.light_dir, glm::vec3(0.0, 1.0, 0.0));
        assert_eq!(env.model_position, glm::vec3(0.0, 5.0, 0.0));
        // -90 degrees about Y turns +Z into -X
        assert!(env.key_dir.x < -0.8, "{:?}", env.key_dir);
        assert!(env.key_dir.z.abs() < 1e-5);
    }

    #[test]
    fn ground_matrix_scales_unit_quad_to_plane() {
        let env = Environment::from_settings(&SceneSettings::default());
        let corner = env.ground_matrix() * glm::vec4(0.5, 0.0, 0.5, 1.0);
        assert_eq!((corner.x, corner.z), (50.0, 50.0));
        assert!((corner.y + 0.01).abs() < 1e-6);
    }

    #[test]
    fn shadow_fades_with_elevation() {
        let env = Environment::from_settings(&SceneSettings::default());
        let near = Aabb {
            min: glm::vec3(-1.0, 0.0, -1.0),
            max: glm::vec3(1.0, 2.0, 1.0),
        };
        let (_, opacity) = env.shadow_under(Some(&near)).unwrap();
        assert!((opacity - 0.5).abs() < 1e-3);

        let high = Aabb {
            min: glm::vec3(-1.0, 20.0, -1.0),
            max: glm::vec3(1.0, 22.0, 1.0),
        };
        assert!(env.shadow_under(Some(&high)).is_none());
        assert!(env.shadow_under(None).is_none());
    }
}
