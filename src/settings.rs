use serde::{Deserialize, Serialize};

pub const CONFY_APP_NAME: &str = "glbvis-rs";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetSettings {
    /// Relative path, absolute path, `file://` or `http(s)://` URL of the model.
    pub model_url: String,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            model_url: "./inflation.glb".to_string(),
        }
    }
}

impl AssetSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "asset").unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub damping_factor: f32,
    pub rotate_speed: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: [-8.0, 30.0, 20.0],
            target: [0.0, 0.0, 0.0],
            fov_degrees: 18.0,
            near: 0.1,
            far: 1000.0,
            damping_factor: 0.05,
            rotate_speed: 1.0,
        }
    }
}

impl CameraSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "camera").unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSettings {
    pub model_position: [f32; 3],
    pub light_position: [f32; 3],
    pub light_intensity: f32,
    /// Rotation of the studio environment around Y, in radians.
    pub environment_rotation_y: f32,
    pub ground_size: f32,
    pub ground_height: f32,
    pub ground_color: [f32; 3],
    pub ground_metalness: f32,
    pub ground_roughness: f32,
    pub shadow_opacity: f32,
    pub shadow_scale: f32,
    pub shadow_blur: f32,
    pub shadow_far: f32,
    pub background_color: [f32; 3],
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            model_position: [0.0, 5.0, 0.0],
            light_position: [0.0, 15.0, 0.0],
            light_intensity: 1.0,
            environment_rotation_y: -std::f32::consts::FRAC_PI_2,
            ground_size: 100.0,
            ground_height: -0.01,
            // #1e1818
            ground_color: [30.0 / 255.0, 24.0 / 255.0, 24.0 / 255.0],
            ground_metalness: 0.2,
            ground_roughness: 0.2,
            shadow_opacity: 0.5,
            shadow_scale: 10.0,
            shadow_blur: 5.0,
            shadow_far: 10.0,
            background_color: [0.02, 0.02, 0.02],
        }
    }
}

impl SceneSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "scene").unwrap_or_default()
    }
}

// Aggregate struct for convenience
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub asset: AssetSettings,
    pub camera: CameraSettings,
    pub scene: SceneSettings,
}

impl Settings {
    pub fn load() -> Self {
        Self {
            asset: AssetSettings::load(),
            camera: CameraSettings::load(),
            scene: SceneSettings::load(),
        }
    }

    /// Apply command line overrides: the first positional argument replaces the model URL.
    pub fn with_args<I: IntoIterator<Item = String>>(mut self, args: I) -> Self {
        if let Some(url) = args.into_iter().nth(1) {
            self.asset.model_url = url;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_argument_overrides_model_url() {
        let settings = Settings::default().with_args(vec!["glbvis-rs".to_string()]);
        assert_eq!(settings.asset.model_url, "./inflation.glb");

        let settings = Settings::default()
            .with_args(vec!["glbvis-rs".to_string(), "http://host/a.glb".to_string()]);
        assert_eq!(settings.asset.model_url, "http://host/a.glb");
    }
}
