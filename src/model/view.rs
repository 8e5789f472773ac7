use nalgebra_glm as glm;

use super::{Aabb, DecodedMesh};
use crate::animation::AnimationController;
use crate::asset::LoadHandle;
use crate::error::LoadError;
use crate::shell::{CursorStyle, HostUi};

#[derive(Debug)]
pub enum LoadOutcome {
    Pending,
    /// The mesh and its actions live in the controller.
    Success,
    Failure(LoadError),
}

/// The placed model: receives the load result, owns the controller, and
/// reacts to pointer input.
pub struct ModelView {
    handle: Option<LoadHandle>,
    outcome: LoadOutcome,
    controller: AnimationController,
    position: glm::Vec3,
    hovered: bool,
    disposed: bool,
}

impl ModelView {
    pub fn new(handle: LoadHandle, position: [f32; 3]) -> Self {
        Self {
            handle: Some(handle),
            outcome: LoadOutcome::Pending,
            controller: AnimationController::new(),
            position: glm::make_vec3(&position),
            hovered: false,
            disposed: false,
        }
    }

    /// Per-frame update: deliver load events, then advance animation.
    pub fn tick(&mut self, elapsed_seconds: f32, shell: &mut dyn HostUi) {
        if self.disposed {
            return;
        }
        if let Some(result) = self.handle.as_mut().and_then(|h| h.poll(shell)) {
            self.handle = None;
            match result {
                Ok(asset) => {
                    self.controller.ingest(asset.mesh, asset.clips);
                    self.outcome = LoadOutcome::Success;
                    // first frame is shown at time zero
                    return;
                }
                Err(e) => self.outcome = LoadOutcome::Failure(e),
            }
        }
        self.controller.tick(elapsed_seconds);
    }

    /// Restart all clips. Returns whether the click hit a loaded model.
    pub fn on_click(&mut self) -> bool {
        if self.disposed || !matches!(self.outcome, LoadOutcome::Success) {
            return false;
        }
        self.controller.trigger_all();
        true
    }

    pub fn set_hovered(&mut self, hovered: bool, shell: &mut dyn HostUi) {
        let hovered = hovered && self.visible_mesh().is_some();
        if self.hovered == hovered {
            return;
        }
        self.hovered = hovered;
        shell.set_cursor(if hovered {
            CursorStyle::Pointer
        } else {
            CursorStyle::Default
        });
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn outcome(&self) -> &LoadOutcome {
        &self.outcome
    }

    pub fn controller(&self) -> &AnimationController {
        &self.controller
    }

    /// The mesh to draw. Nothing is drawn while pending, after a failure, or once disposed.
    pub fn visible_mesh(&self) -> Option<&DecodedMesh> {
        match self.outcome {
            LoadOutcome::Success if !self.disposed => self.controller.mesh(),
            _ => None,
        }
    }

    pub fn placement(&self) -> glm::Mat4 {
        glm::translation(&self.position)
    }

    pub fn world_bounds(&self) -> Option<Aabb> {
        self.visible_mesh()?.bounds(&self.placement())
    }

    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.handle = None;
        self.controller.dispose();
    }
}

impl Drop for ModelView {
    fn drop(&mut self) {
        self.dispose();
    }
}
