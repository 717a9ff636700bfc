// Native (authored) animation clips, their samplers and the mixer that plays them.

use glam::{Mat4, Quat, Vec3};
use std::ops::{Add, Mul};

/// Local translation/rotation/scale of a scene node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl NodeTransform {
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    Step,
    Linear,
    /// Keyframe values are stored as `[in_tangent, value, out_tangent]` triples.
    CubicSpline,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Property {
    Translation,
    Rotation,
    Scale,
}

#[derive(Clone, Debug)]
pub enum Keyframes {
    Vec3(Vec<Vec3>),
    Quat(Vec<Quat>),
}

#[derive(Clone, Debug)]
pub struct Sampler {
    pub times: Vec<f32>,
    pub values: Keyframes,
    pub interpolation: Interpolation,
}

impl Sampler {
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    // (lower key, upper key, factor in [0, 1], span seconds)
    fn locate(&self, time: f32) -> Option<(usize, usize, f32, f32)> {
        let last = self.times.len().checked_sub(1)?;
        if last == 0 || time <= self.times[0] {
            return Some((0, 0, 0.0, 0.0));
        }
        if time >= self.times[last] {
            return Some((last, last, 0.0, 0.0));
        }
        let upper = self.times.partition_point(|t| *t <= time);
        let lower = upper - 1;
        let span = self.times[upper] - self.times[lower];
        let factor = if span <= f32::EPSILON {
            0.0
        } else {
            ((time - self.times[lower]) / span).clamp(0.0, 1.0)
        };
        Some((lower, upper, factor, span))
    }

    fn sample_with<T>(&self, values: &[T], time: f32, lerp: impl Fn(T, T, f32) -> T) -> Option<T>
    where
        T: Copy + Add<Output = T> + Mul<f32, Output = T>,
    {
        let (lower, upper, factor, span) = self.locate(time)?;
        match self.interpolation {
            Interpolation::CubicSpline => {
                let v0 = *values.get(lower * 3 + 1)?;
                if lower == upper {
                    return Some(v0);
                }
                let b0 = *values.get(lower * 3 + 2)?;
                let a1 = *values.get(upper * 3)?;
                let v1 = *values.get(upper * 3 + 1)?;
                Some(hermite(v0, b0 * span, v1, a1 * span, factor))
            }
            Interpolation::Step => values.get(lower).copied(),
            Interpolation::Linear => {
                let a = *values.get(lower)?;
                if lower == upper {
                    return Some(a);
                }
                Some(lerp(a, *values.get(upper)?, factor))
            }
        }
    }

    pub fn sample_vec3(&self, time: f32) -> Option<Vec3> {
        match &self.values {
            Keyframes::Vec3(values) => self.sample_with(values, time, |a, b, t| a.lerp(b, t)),
            Keyframes::Quat(_) => None,
        }
    }

    pub fn sample_quat(&self, time: f32) -> Option<Quat> {
        match &self.values {
            Keyframes::Quat(values) => self
                .sample_with(values, time, |a, b, t| a.normalize().slerp(b.normalize(), t))
                .map(Quat::normalize),
            Keyframes::Vec3(_) => None,
        }
    }
}

#[inline]
fn hermite<T>(v0: T, m0: T, v1: T, m1: T, t: f32) -> T
where
    T: Copy + Add<Output = T> + Mul<f32, Output = T>,
{
    let t2 = t * t;
    let t3 = t2 * t;
    v0 * (2.0 * t3 - 3.0 * t2 + 1.0)
        + m0 * (t3 - 2.0 * t2 + t)
        + v1 * (-2.0 * t3 + 3.0 * t2)
        + m1 * (t3 - t2)
}

#[derive(Clone, Debug)]
pub struct AnimationChannel {
    pub node: usize,
    pub property: Property,
    pub sampler: Sampler,
}

#[derive(Clone, Debug)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub channels: Vec<AnimationChannel>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            duration: 0.0,
            channels: Vec::new(),
        }
    }

    pub fn add_channel(&mut self, channel: AnimationChannel) {
        self.duration = self.duration.max(channel.sampler.end_time());
        self.channels.push(channel);
    }

    /// Write the clip's pose at `time` into the node locals it animates.
    pub fn apply(&self, time: f32, locals: &mut [NodeTransform]) {
        for channel in &self.channels {
            let Some(local) = locals.get_mut(channel.node) else {
                continue;
            };
            match channel.property {
                Property::Translation => {
                    if let Some(v) = channel.sampler.sample_vec3(time) {
                        local.translation = v;
                    }
                }
                Property::Rotation => {
                    if let Some(q) = channel.sampler.sample_quat(time) {
                        local.rotation = q;
                    }
                }
                Property::Scale => {
                    if let Some(v) = channel.sampler.sample_vec3(time) {
                        local.scale = v;
                    }
                }
            }
        }
    }
}

/// Playback state of the clip a mixer is driving. Clips repeat by default.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipAction {
    pub clip: usize,
    pub time: f32,
    pub looping: bool,
    pub playing: bool,
}

impl ClipAction {
    pub fn advance(&mut self, dt: f32, duration: f32) -> f32 {
        if !self.playing {
            return self.time;
        }
        let mut time = self.time + dt;
        if duration > 0.0 {
            if self.looping {
                time = time.rem_euclid(duration);
            } else if time >= duration {
                time = duration;
                self.playing = false;
            }
        }
        self.time = time.max(0.0);
        self.time
    }
}

#[derive(Clone, Debug, Default)]
pub struct AnimationMixer {
    action: Option<ClipAction>,
}

impl AnimationMixer {
    /// Start `clip_index` from the beginning. Returns `false` (and leaves the
    /// mixer idle) when the asset has no such clip.
    pub fn play(&mut self, clip_index: usize, clips: &[AnimationClip]) -> bool {
        match clips.get(clip_index) {
            Some(clip) => {
                log::info!(
                    "[anim] playing clip {} '{}' ({:.2}s, {} channels)",
                    clip_index,
                    clip.name,
                    clip.duration,
                    clip.channels.len()
                );
                self.action = Some(ClipAction {
                    clip: clip_index,
                    time: 0.0,
                    looping: true,
                    playing: true,
                });
                true
            }
            None => {
                log::warn!(
                    "[anim] asset has {} clip(s); clip {} unavailable, animation skipped",
                    clips.len(),
                    clip_index
                );
                self.action = None;
                false
            }
        }
    }

    pub fn action(&self) -> Option<&ClipAction> {
        self.action.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.action.as_ref().map(|a| a.playing).unwrap_or(false)
    }

    pub fn update(&mut self, dt: f32, clips: &[AnimationClip], locals: &mut [NodeTransform]) {
        let Some(action) = self.action.as_mut() else {
            return;
        };
        let Some(clip) = clips.get(action.clip) else {
            return;
        };
        let time = action.advance(dt, clip.duration);
        clip.apply(time, locals);
    }
}

/// How much animation time one rendered frame advances.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameClock {
    /// Constant step per frame regardless of wall-clock time.
    Fixed(f32),
    /// Wall-clock delta, clamped to `max_step`.
    Elapsed { max_step: f32 },
}

impl FrameClock {
    pub fn step(&self, elapsed_sec: f32) -> f32 {
        match *self {
            FrameClock::Fixed(step) => step,
            FrameClock::Elapsed { max_step } => elapsed_sec.clamp(0.0, max_step),
        }
    }
}
