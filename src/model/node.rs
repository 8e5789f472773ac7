use nalgebra_glm as glm;

/// Local translation / rotation / scale of a scene node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: glm::Vec3,
    pub rotation: glm::Quat,
    pub scale: glm::Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: glm::vec3(0.0, 0.0, 0.0),
            rotation: glm::quat_identity(),
            scale: glm::vec3(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Build from the glTF decomposed form (rotation is `[x, y, z, w]`).
    pub fn from_decomposed(translation: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) -> Self {
        Self {
            translation: glm::make_vec3(&translation),
            rotation: glm::Quat::new(rotation[3], rotation[0], rotation[1], rotation[2]),
            scale: glm::make_vec3(&scale),
        }
    }

    pub fn matrix(&self) -> glm::Mat4 {
        glm::translation(&self.translation)
            * glm::quat_to_mat4(&glm::quat_normalize(&self.rotation))
            * glm::scaling(&self.scale)
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Transform declared by the asset; restored before each pose is applied.
    pub rest: Transform,
    /// Current (possibly animated) transform.
    pub local: Transform,
    pub mesh: Option<usize>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, rest: Transform) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            rest,
            local: rest,
            mesh: None,
        }
    }
}
