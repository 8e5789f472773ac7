// Animation controller: normalizes clips, plays them once and re-triggers on demand

use super::action::{ActionState, AnimationAction, LoopMode, NORMALIZED_CLIP_DURATION};
use super::clip::AnimationClip;
use super::mixer::AnimationMixer;
use crate::model::DecodedMesh;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// No mesh ingested yet.
    Unbound,
    /// At least one action is still running.
    Playing,
    /// Every action reached its end and holds the last frame.
    Held,
    Stopped,
}

#[derive(Default)]
pub struct AnimationController {
    mixer: Option<AnimationMixer>,
    disposed: bool,
}

impl AnimationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of the decoded mesh and start every clip once.
    ///
    /// Clips are stretched to [`NORMALIZED_CLIP_DURATION`], played in source order,
    /// and clamped on their final frame. A second call is ignored.
    pub fn ingest(&mut self, mesh: DecodedMesh, clips: Vec<AnimationClip>) -> &[AnimationAction] {
        if self.mixer.is_some() || self.disposed {
            log::warn!("Animation controller already bound, ignoring '{}'", mesh.name);
            return self.actions();
        }

        let mut mixer = AnimationMixer::new(mesh);
        for mut clip in clips {
            let source_duration = clip.duration;
            clip.duration = NORMALIZED_CLIP_DURATION;
            log::debug!(
                "Clip '{}' ({} tracks, {:.2}s) normalized to {}s",
                clip.name,
                clip.tracks.len(),
                source_duration,
                NORMALIZED_CLIP_DURATION
            );
            mixer
                .clip_action(clip)
                .set_loop(LoopMode::Once)
                .set_clamp_when_finished(true)
                .set_duration(NORMALIZED_CLIP_DURATION)
                .reset()
                .play();
        }
        // pose frame zero right away
        mixer.update(0.0);

        log::info!(
            "Bound '{}' with {} animation action(s)",
            mixer.root().name,
            mixer.actions().len()
        );
        self.mixer.insert(mixer).actions()
    }

    /// Advance playback by `elapsed_seconds`.
    pub fn tick(&mut self, elapsed_seconds: f32) {
        if self.disposed {
            return;
        }
        let Some(mixer) = self.mixer.as_mut() else {
            return;
        };
        let dt = if elapsed_seconds.is_finite() {
            elapsed_seconds.max(0.0)
        } else {
            0.0
        };
        mixer.update(dt);
    }

    /// Restart every action from its first frame.
    pub fn trigger_all(&mut self) {
        if self.disposed {
            return;
        }
        let Some(mixer) = self.mixer.as_mut() else {
            return;
        };
        for action in mixer.actions_mut() {
            action.reset().play();
        }
        log::debug!("Re-triggered {} action(s)", mixer.actions().len());
    }

    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let Some(mixer) = self.mixer.as_mut() {
            mixer.stop_all_action();
        }
    }

    pub fn mesh(&self) -> Option<&DecodedMesh> {
        self.mixer.as_ref().map(AnimationMixer::root)
    }

    pub fn actions(&self) -> &[AnimationAction] {
        self.mixer.as_ref().map(AnimationMixer::actions).unwrap_or(&[])
    }

    pub fn state(&self) -> ControllerState {
        if self.disposed {
            return ControllerState::Stopped;
        }
        let Some(mixer) = &self.mixer else {
            return ControllerState::Unbound;
        };
        let actions = mixer.actions();
        if actions.iter().any(|a| a.state() == ActionState::Playing) {
            ControllerState::Playing
        } else if actions.iter().all(|a| a.state() == ActionState::Held) {
            ControllerState::Held
        } else {
            ControllerState::Stopped
        }
    }
}
