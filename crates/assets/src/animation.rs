use crate::scene::Scene;
use glam::{Quat, Vec3};

/// How values between two keyframes are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Linear,
    /// Holds the previous keyframe until the next one.
    Step,
}

/// Keyframe values of one channel, typed by the node property they drive.
#[derive(Debug, Clone, PartialEq)]
pub enum Keyframes {
    Translation(Vec<Vec3>),
    Rotation(Vec<Quat>),
    Scale(Vec<Vec3>),
}

impl Keyframes {
    pub fn len(&self) -> usize {
        match self {
            Keyframes::Translation(v) | Keyframes::Scale(v) => v.len(),
            Keyframes::Rotation(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn at(&self, i: usize) -> NodeProperty {
        match self {
            Keyframes::Translation(v) => NodeProperty::Translation(v[i]),
            Keyframes::Rotation(v) => NodeProperty::Rotation(v[i]),
            Keyframes::Scale(v) => NodeProperty::Scale(v[i]),
        }
    }

    fn blend(&self, a: usize, b: usize, s: f32) -> NodeProperty {
        match self {
            Keyframes::Translation(v) => NodeProperty::Translation(v[a].lerp(v[b], s)),
            Keyframes::Rotation(v) => NodeProperty::Rotation(v[a].slerp(v[b], s).normalize()),
            Keyframes::Scale(v) => NodeProperty::Scale(v[a].lerp(v[b], s)),
        }
    }
}

/// A sampled value for one node property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeProperty {
    Translation(Vec3),
    Rotation(Quat),
    Scale(Vec3),
}

/// One animated property of one scene node.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationChannel {
    /// Index of the target node in the source document.
    pub node: usize,
    pub interpolation: Interpolation,
    /// Keyframe times in seconds, ascending. Same length as `values`.
    pub times: Vec<f32>,
    pub values: Keyframes,
}

impl AnimationChannel {
    /// Value at `time`. Times before the first or after the last keyframe
    /// hold the nearest keyframe.
    pub fn sample(&self, time: f32) -> Option<NodeProperty> {
        let count = self.times.len().min(self.values.len());
        if count == 0 {
            return None;
        }
        let times = &self.times[..count];
        let next = times.partition_point(|&t| t <= time);
        if next == 0 {
            return Some(self.values.at(0));
        }
        if next == count {
            return Some(self.values.at(count - 1));
        }
        let prev = next - 1;
        match self.interpolation {
            Interpolation::Step => Some(self.values.at(prev)),
            Interpolation::Linear => {
                let span = times[next] - times[prev];
                let s = if span > 0.0 { (time - times[prev]) / span } else { 0.0 };
                Some(self.values.blend(prev, next, s))
            }
        }
    }
}

/// A named animation: node channels and the clip length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    /// Length in seconds: the largest keyframe time across all samplers.
    pub duration: f32,
    pub channels: Vec<AnimationChannel>,
}

impl AnimationClip {
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Sample every channel at `time`, paired with its target node.
    pub fn sample(&self, time: f32) -> Vec<(usize, NodeProperty)> {
        self.channels
            .iter()
            .filter_map(|c| c.sample(time).map(|p| (c.node, p)))
            .collect()
    }
}

/// Plays a single clip, looping at its end.
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    clip: AnimationClip,
    time: f32,
    playing: bool,
}

impl AnimationPlayer {
    pub fn new(clip: AnimationClip) -> Self {
        Self {
            clip,
            time: 0.0,
            playing: false,
        }
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }

    /// Current playback position in seconds, always within `[0, duration)`.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advance by `dt` seconds. Negative or non-finite steps are ignored.
    pub fn update(&mut self, dt: f32) {
        if !self.playing || !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let duration = self.clip.duration;
        if duration <= 0.0 {
            self.time = 0.0;
            return;
        }
        self.time = (self.time + dt).rem_euclid(duration);
    }

    /// Write the clip's pose at the current time into `scene`.
    /// Returns how many node properties were written.
    pub fn apply(&self, scene: &mut Scene) -> usize {
        let mut written = 0;
        for (node, property) in self.clip.sample(self.time) {
            if scene.set_node_property(node, property) {
                written += 1;
            }
        }
        written
    }
}
