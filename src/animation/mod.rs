// Clip sampling, per-clip playback actions, and the controller that owns them.

pub mod action;
pub mod clip;
pub mod controller;
pub mod interpolation;
pub mod mixer;

pub use action::{ActionState, AnimationAction, LoopMode, NORMALIZED_CLIP_DURATION};
pub use clip::{AnimationClip, Interpolation, Property, Sample, Track, TrackValues};
pub use controller::{AnimationController, ControllerState};
pub use mixer::AnimationMixer;
