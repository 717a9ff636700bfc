// Progress-driven tween timelines.
//
// A timeline is a list of tweens laid out on a local time axis. It has no
// clock of its own: callers render it at a progress value in `[0, 1]` and
// every tween writes its interpolated channels into the target.

use super::easing::Ease;
use smallvec::SmallVec;

/// A single animatable scalar on a tween target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    RotationX,
    RotationY,
    RotationZ,
    PositionX,
    PositionY,
    PositionZ,
    /// Vertical translation as a percentage of the element's own height.
    YPercent,
    /// Uniform scale.
    Scale,
}

/// Anything whose scalar channels can be read and written by a tween.
pub trait TweenTarget {
    /// Current value of `channel`, or `None` when the target lacks it.
    fn read(&self, channel: Channel) -> Option<f32>;
    /// Write `value` into `channel`; returns `false` when the target lacks it.
    fn write(&mut self, channel: Channel, value: f32) -> bool;
}

/// Destination of a tweened channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TweenValue {
    /// Absolute destination.
    To(f32),
    /// Destination relative to the value captured when the tween starts.
    By(f32),
}

impl TweenValue {
    #[inline]
    pub fn resolve(self, from: f32) -> f32 {
        match self {
            TweenValue::To(v) => v,
            TweenValue::By(d) => from + d,
        }
    }
}

/// Where a new tween starts relative to the ones already on the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// After everything already placed.
    Append,
    /// At the same time as the previously added tween.
    WithPrevious,
}

type ChannelSpec = SmallVec<[(Channel, TweenValue); 3]>;
type ResolvedChannels = SmallVec<[(Channel, f32, f32); 3]>;

#[derive(Clone, Debug)]
pub struct Tween {
    pub channels: ChannelSpec,
    pub start: f32,
    pub duration: f32,
    pub ease: Ease,
    // (channel, from, to), captured the first time the playhead moves past `start`
    resolved: Option<ResolvedChannels>,
}

impl Tween {
    pub fn new(channels: &[(Channel, TweenValue)], start: f32, duration: f32, ease: Ease) -> Self {
        Self {
            channels: channels.iter().copied().collect(),
            start,
            duration: duration.max(0.0),
            ease,
            resolved: None,
        }
    }

    #[inline]
    pub fn end(&self) -> f32 {
        self.start + self.duration
    }

    pub fn is_initialized(&self) -> bool {
        self.resolved.is_some()
    }

    fn local_progress(&self, time: f32) -> f32 {
        if self.duration <= 0.0 {
            return if time >= self.start { 1.0 } else { 0.0 };
        }
        ((time - self.start) / self.duration).clamp(0.0, 1.0)
    }

    fn render(&mut self, time: f32, target: &mut dyn TweenTarget) {
        if self.resolved.is_none() {
            if time <= self.start {
                return;
            }
            let mut resolved = ResolvedChannels::new();
            for (channel, value) in &self.channels {
                match target.read(*channel) {
                    Some(from) => resolved.push((*channel, from, value.resolve(from))),
                    None => log::warn!("[tween] target has no {:?} channel", channel),
                }
            }
            self.resolved = Some(resolved);
        }
        let k = self.ease.apply(self.local_progress(time));
        if let Some(resolved) = &self.resolved {
            for (channel, from, to) in resolved {
                target.write(*channel, from + (to - from) * k);
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Timeline {
    tweens: SmallVec<[Tween; 2]>,
    last_time: Option<f32>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tween towards `channels`, builder style.
    pub fn to(
        mut self,
        channels: &[(Channel, TweenValue)],
        duration: f32,
        ease: Ease,
        placement: Placement,
    ) -> Self {
        let start = match placement {
            Placement::Append => self.duration(),
            Placement::WithPrevious => self.tweens.last().map(|t| t.start).unwrap_or(0.0),
        };
        self.tweens.push(Tween::new(channels, start, duration, ease));
        self
    }

    pub fn duration(&self) -> f32 {
        self.tweens.iter().map(Tween::end).fold(0.0, f32::max)
    }

    pub fn tweens(&self) -> &[Tween] {
        &self.tweens
    }

    /// Render the timeline at `progress`. Returns `false` when the playhead
    /// did not move, in which case nothing is written to the target.
    pub fn render(&mut self, progress: f32, target: &mut dyn TweenTarget) -> bool {
        let time = progress.clamp(0.0, 1.0) * self.duration();
        if self.last_time == Some(time) {
            return false;
        }
        self.last_time = Some(time);
        for tween in self.tweens.iter_mut() {
            tween.render(time, target);
        }
        true
    }
}
