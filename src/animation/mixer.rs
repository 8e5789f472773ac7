// Mixer: advances actions and writes their poses into the scene graph

use super::action::AnimationAction;
use super::clip::AnimationClip;
use crate::model::DecodedMesh;

/// Owns the decoded mesh, its clips, and one action per clip.
pub struct AnimationMixer {
    root: DecodedMesh,
    clips: Vec<AnimationClip>,
    actions: Vec<AnimationAction>,
}

impl AnimationMixer {
    pub fn new(root: DecodedMesh) -> Self {
        Self {
            root,
            clips: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Register `clip` and return the action bound to it.
    pub fn clip_action(&mut self, clip: AnimationClip) -> &mut AnimationAction {
        let index = self.clips.len();
        self.actions.push(AnimationAction::new(index, &clip));
        self.clips.push(clip);
        &mut self.actions[index]
    }

    pub fn root(&self) -> &DecodedMesh {
        &self.root
    }

    pub fn actions(&self) -> &[AnimationAction] {
        &self.actions
    }

    pub fn actions_mut(&mut self) -> &mut [AnimationAction] {
        &mut self.actions
    }

    /// Advance every action by `dt` seconds and pose the mesh.
    pub fn update(&mut self, dt: f32) {
        for action in &mut self.actions {
            action.advance(dt);
        }
        self.apply_pose();
    }

    /// Rest pose first, then each active action in clip order; later clips win
    /// where two target the same node property.
    fn apply_pose(&mut self) {
        self.root.reset_pose();
        for action in self.actions.iter().filter(|a| a.is_active()) {
            let Some(clip) = self.clips.get(action.clip_index()) else {
                continue;
            };
            for track in &clip.tracks {
                if let Some(node) = self.root.nodes.get_mut(track.node) {
                    track.apply(action.time(), &mut node.local);
                }
            }
        }
    }

    pub fn stop_all_action(&mut self) {
        for action in &mut self.actions {
            action.stop();
        }
        self.root.reset_pose();
    }
}
