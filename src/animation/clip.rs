// Keyframe tracks and clips decoded from glTF animations

use nalgebra_glm as glm;

use super::interpolation::*;
use crate::model::Transform;

/// Node property driven by a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Translation,
    Rotation,
    Scale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Step,
    Linear,
    /// Values are stored as `[in_tangent, value, out_tangent]` per key.
    CubicSpline,
}

#[derive(Debug, Clone)]
pub enum TrackValues {
    Vec3(Vec<glm::Vec3>),
    Quat(Vec<glm::Quat>),
}

impl TrackValues {
    pub fn len(&self) -> usize {
        match self {
            TrackValues::Vec3(v) => v.len(),
            TrackValues::Quat(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Vec3(glm::Vec3),
    Quat(glm::Quat),
}

/// A single animated channel targeting one node.
#[derive(Debug, Clone)]
pub struct Track {
    pub node: usize,
    pub property: Property,
    pub interpolation: Interpolation,
    pub times: Vec<f32>,
    pub values: TrackValues,
}

enum Span {
    Empty,
    Hold(usize),
    Between { from: usize, t: f32, dt: f32 },
}

impl Track {
    /// Number of values a track with this many keys must carry.
    pub fn expected_values(interpolation: Interpolation, keys: usize) -> usize {
        match interpolation {
            Interpolation::CubicSpline => keys * 3,
            _ => keys,
        }
    }

    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    fn span(&self, time: f32) -> Span {
        let n = self.times.len();
        if n == 0 {
            return Span::Empty;
        }
        if time <= self.times[0] {
            return Span::Hold(0);
        }
        if time >= self.times[n - 1] {
            return Span::Hold(n - 1);
        }
        // first key strictly after `time`
        let next = self.times.partition_point(|&k| k <= time);
        let from = next - 1;
        let dt = self.times[next] - self.times[from];
        if dt <= 0.0 {
            return Span::Hold(from);
        }
        Span::Between {
            from,
            t: (time - self.times[from]) / dt,
            dt,
        }
    }

    /// Sample the track at `time` (clip-local seconds). Before the first key the
    /// first value is held, after the last key the last value is held.
    pub fn sample(&self, time: f32) -> Option<Sample> {
        let span = self.span(time);
        let cubic = self.interpolation == Interpolation::CubicSpline;
        // index of the key value itself inside the values array
        let key = |i: usize| if cubic { i * 3 + 1 } else { i };

        match &self.values {
            TrackValues::Vec3(values) => {
                let v = match span {
                    Span::Empty => return None,
                    Span::Hold(i) => *values.get(key(i))?,
                    Span::Between { from, t, dt } => match self.interpolation {
                        Interpolation::Step => *values.get(from)?,
                        Interpolation::Linear => {
                            lerp_vec3(values.get(from)?, values.get(from + 1)?, t)
                        }
                        Interpolation::CubicSpline => {
                            let (a, b) = (from * 3, (from + 1) * 3);
                            hermite_vec3(
                                values.get(a + 1)?,
                                values.get(a + 2)?,
                                values.get(b + 1)?,
                                values.get(b)?,
                                t,
                                dt,
                            )
                        }
                    },
                };
                Some(Sample::Vec3(v))
            }
            TrackValues::Quat(values) => {
                let q = match span {
                    Span::Empty => return None,
                    Span::Hold(i) => *values.get(key(i))?,
                    Span::Between { from, t, dt } => match self.interpolation {
                        Interpolation::Step => *values.get(from)?,
                        Interpolation::Linear => {
                            slerp_shortest(values.get(from)?, values.get(from + 1)?, t)
                        }
                        Interpolation::CubicSpline => {
                            let (a, b) = (from * 3, (from + 1) * 3);
                            hermite_quat(
                                values.get(a + 1)?,
                                values.get(a + 2)?,
                                values.get(b + 1)?,
                                values.get(b)?,
                                t,
                                dt,
                            )
                        }
                    },
                };
                Some(Sample::Quat(q))
            }
        }
    }

    /// Write the sampled value into the matching field of `transform`.
    pub fn apply(&self, time: f32, transform: &mut Transform) {
        match (self.property, self.sample(time)) {
            (Property::Translation, Some(Sample::Vec3(v))) => transform.translation = v,
            (Property::Scale, Some(Sample::Vec3(v))) => transform.scale = v,
            (Property::Rotation, Some(Sample::Quat(q))) => transform.rotation = q,
            _ => {}
        }
    }
}

/// A named, timed set of tracks.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    /// Nominal duration. Starts as the last key time; playback may override it.
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        let duration = tracks.iter().map(Track::end_time).fold(0.0, f32::max);
        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }
}
