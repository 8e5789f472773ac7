// Playback handle binding one clip to the mixer

use super::clip::AnimationClip;

/// Every ingested clip plays over this many seconds, whatever the asset declares.
pub const NORMALIZED_CLIP_DURATION: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    Once,
    Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    Playing,
    /// Finished a play-once run and holds the final frame.
    Held,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: usize,
    name: String,
    /// Clip-local time.
    time: f32,
    time_scale: f32,
    clip_duration: f32,
    /// Wall-clock seconds a full run takes.
    duration: f32,
    loop_mode: LoopMode,
    clamp_when_finished: bool,
    state: ActionState,
}

impl AnimationAction {
    pub fn new(clip_index: usize, clip: &AnimationClip) -> Self {
        Self {
            clip: clip_index,
            name: clip.name.clone(),
            time: 0.0,
            time_scale: 1.0,
            clip_duration: clip.duration,
            duration: clip.duration,
            loop_mode: LoopMode::Repeat,
            clamp_when_finished: false,
            state: ActionState::Stopped,
        }
    }

    pub fn clip_index(&self) -> usize {
        self.clip
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn state(&self) -> ActionState {
        self.state
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn clamp_when_finished(&self) -> bool {
        self.clamp_when_finished
    }

    /// Whether the action's pose should be applied to the mesh.
    pub fn is_active(&self) -> bool {
        matches!(self.state, ActionState::Playing | ActionState::Held)
    }

    pub fn set_loop(&mut self, mode: LoopMode) -> &mut Self {
        self.loop_mode = mode;
        self
    }

    pub fn set_clamp_when_finished(&mut self, clamp: bool) -> &mut Self {
        self.clamp_when_finished = clamp;
        self
    }

    /// Stretch playback so one run of the clip takes `duration` seconds.
    pub fn set_duration(&mut self, duration: f32) -> &mut Self {
        if duration > 0.0 {
            self.duration = duration;
            self.time_scale = self.clip_duration / duration;
        }
        self
    }

    /// Rewind to the first frame without changing whether the action runs.
    pub fn reset(&mut self) -> &mut Self {
        self.time = 0.0;
        if self.state == ActionState::Held {
            self.state = ActionState::Stopped;
        }
        self
    }

    pub fn play(&mut self) -> &mut Self {
        self.state = ActionState::Playing;
        self
    }

    pub fn stop(&mut self) -> &mut Self {
        self.state = ActionState::Stopped;
        self.time = 0.0;
        self
    }

    /// Advance playback by `dt` wall-clock seconds.
    pub fn advance(&mut self, dt: f32) {
        if self.state != ActionState::Playing {
            return;
        }
        self.time += dt * self.time_scale;
        if self.time < self.clip_duration {
            return;
        }
        match self.loop_mode {
            LoopMode::Once => {
                self.time = self.clip_duration;
                self.state = if self.clamp_when_finished {
                    ActionState::Held
                } else {
                    ActionState::Stopped
                };
            }
            LoopMode::Repeat => {
                if self.clip_duration > 0.0 {
                    self.time %= self.clip_duration;
                } else {
                    self.time = 0.0;
                }
            }
        }
    }
}
