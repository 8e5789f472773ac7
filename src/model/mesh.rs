use nalgebra_glm as glm;

use super::{Aabb, SceneNode};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Metallic-roughness factors of a glTF material. Textures are not sampled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            metallic: 1.0,
            roughness: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Primitive {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub material: Material,
    pub bounds: Option<Aabb>,
}

impl Primitive {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>, material: Material) -> Self {
        let bounds = Aabb::from_points(vertices.iter().map(|v| &v.position));
        Self {
            vertices,
            indices,
            material,
            bounds,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: String,
    pub primitives: Vec<Primitive>,
}

/// Root of the decoded scene graph.
#[derive(Debug, Clone, Default)]
pub struct DecodedMesh {
    pub name: String,
    pub nodes: Vec<SceneNode>,
    pub roots: Vec<usize>,
    pub meshes: Vec<MeshData>,
}

impl DecodedMesh {
    /// World matrix of every node, indexed like `nodes`. `None` for nodes not
    /// reachable from a root; those belong to another scene and are not shown.
    pub fn world_matrices(&self, root: &glm::Mat4) -> Vec<Option<glm::Mat4>> {
        let mut world = vec![None; self.nodes.len()];
        let mut stack: Vec<(usize, glm::Mat4)> = self
            .roots
            .iter()
            .rev()
            .filter(|&&r| r < self.nodes.len())
            .map(|&r| (r, *root))
            .collect();

        // glTF forbids cycles, but a malformed document must not hang the viewer.
        while let Some((idx, parent)) = stack.pop() {
            if world[idx].is_some() {
                continue;
            }
            let node = &self.nodes[idx];
            let m = parent * node.local.matrix();
            world[idx] = Some(m);
            for &child in node.children.iter().rev() {
                if child < self.nodes.len() {
                    stack.push((child, m));
                }
            }
        }
        world
    }

    /// World-space bounds of all visible mesh primitives in the current pose.
    pub fn bounds(&self, root: &glm::Mat4) -> Option<Aabb> {
        let world = self.world_matrices(root);
        let mut out: Option<Aabb> = None;
        for (node, matrix) in self.nodes.iter().zip(&world) {
            let Some(matrix) = matrix else { continue };
            let Some(mesh) = node.mesh.and_then(|m| self.meshes.get(m)) else {
                continue;
            };
            for prim in &mesh.primitives {
                if let Some(b) = prim.bounds {
                    let b = b.transformed(matrix);
                    out = Some(match out {
                        Some(acc) => acc.union(&b),
                        None => b,
                    });
                }
            }
        }
        out
    }

    /// Restore every node to the transform declared by the asset.
    pub fn reset_pose(&mut self) {
        for node in &mut self.nodes {
            node.local = node.rest;
        }
    }

    pub fn primitive_count(&self) -> usize {
        self.meshes.iter().map(|m| m.primitives.len()).sum()
    }
}
