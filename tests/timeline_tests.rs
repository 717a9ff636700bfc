// Host-side tests for progress-driven timelines.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod page {
    pub mod easing {
        include!("../src/core/easing.rs");
    }
    pub mod timeline {
        include!("../src/core/timeline.rs");
    }
}

use page::easing::Ease;
use page::timeline::*;
use TweenValue::{By, To};

/// Rotation/position probe without 2D layer channels.
#[derive(Default)]
struct Probe {
    rot: [f32; 3],
    pos: [f32; 3],
    writes: usize,
}

impl TweenTarget for Probe {
    fn read(&self, channel: Channel) -> Option<f32> {
        match channel {
            Channel::RotationX => Some(self.rot[0]),
            Channel::RotationY => Some(self.rot[1]),
            Channel::RotationZ => Some(self.rot[2]),
            Channel::PositionX => Some(self.pos[0]),
            Channel::PositionY => Some(self.pos[1]),
            Channel::PositionZ => Some(self.pos[2]),
            _ => None,
        }
    }

    fn write(&mut self, channel: Channel, value: f32) -> bool {
        let slot = match channel {
            Channel::RotationX => &mut self.rot[0],
            Channel::RotationY => &mut self.rot[1],
            Channel::RotationZ => &mut self.rot[2],
            Channel::PositionX => &mut self.pos[0],
            Channel::PositionY => &mut self.pos[1],
            Channel::PositionZ => &mut self.pos[2],
            _ => return false,
        };
        *slot = value;
        self.writes += 1;
        true
    }
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

#[test]
fn placement_lays_tweens_on_the_time_axis() {
    let tl = Timeline::new()
        .to(&[(Channel::RotationZ, By(1.0))], 1.0, Ease::Linear, Placement::Append)
        .to(&[(Channel::PositionX, To(2.0))], 1.0, Ease::Linear, Placement::WithPrevious)
        .to(&[(Channel::PositionY, To(3.0))], 2.0, Ease::Linear, Placement::Append);
    let starts: Vec<f32> = tl.tweens().iter().map(|t| t.start).collect();
    assert_eq!(starts, vec![0.0, 0.0, 1.0]);
    assert_eq!(tl.duration(), 3.0);
}

#[test]
fn relative_tween_captures_start_value_on_first_activation() {
    let mut probe = Probe::default();
    probe.rot[2] = 1.0;
    let mut tl = Timeline::new().to(&[(Channel::RotationZ, By(2.0))], 1.0, Ease::Linear, Placement::Append);

    // at the very start nothing is captured or written
    assert!(tl.render(0.0, &mut probe));
    assert_eq!(probe.writes, 0);
    assert!(!tl.tweens()[0].is_initialized());

    tl.render(0.5, &mut probe);
    assert!(approx(probe.rot[2], 2.0));
    assert!(tl.tweens()[0].is_initialized());

    // later outside writes do not move the captured origin
    probe.rot[2] = 10.0;
    tl.render(1.0, &mut probe);
    assert!(approx(probe.rot[2], 3.0));

    tl.render(0.0, &mut probe);
    assert!(approx(probe.rot[2], 1.0));
}

#[test]
fn absolute_tween_interpolates_towards_destination() {
    let mut probe = Probe::default();
    probe.pos = [1.0, 1.0, 1.0];
    let mut tl = Timeline::new().to(
        &[
            (Channel::PositionX, To(2.5)),
            (Channel::PositionY, To(-1.0)),
            (Channel::PositionZ, To(2.0)),
        ],
        1.0,
        Ease::Linear,
        Placement::Append,
    );
    tl.render(0.4, &mut probe);
    assert!(approx(probe.pos[0], 1.0 + 1.5 * 0.4));
    assert!(approx(probe.pos[1], 1.0 - 2.0 * 0.4));
    assert!(approx(probe.pos[2], 1.0 + 0.4));
    tl.render(1.0, &mut probe);
    assert_eq!(probe.pos, [2.5, -1.0, 2.0]);
}

#[test]
fn unchanged_progress_writes_nothing() {
    let mut probe = Probe::default();
    let mut tl = Timeline::new().to(&[(Channel::RotationY, To(5.0))], 1.0, Ease::Linear, Placement::Append);
    assert!(tl.render(0.3, &mut probe));
    let writes = probe.writes;
    assert!(!tl.render(0.3, &mut probe));
    assert_eq!(probe.writes, writes);
    // clamped progress above 1 is the same playhead as 1
    assert!(tl.render(1.0, &mut probe));
    assert!(!tl.render(1.7, &mut probe));
}

#[test]
fn ease_shapes_tween_progress() {
    let mut probe = Probe::default();
    let mut tl = Timeline::new().to(&[(Channel::RotationZ, To(1.0))], 1.0, Ease::QuadInOut, Placement::Append);
    tl.render(0.25, &mut probe);
    assert!(approx(probe.rot[2], 0.125));
    tl.render(0.75, &mut probe);
    assert!(approx(probe.rot[2], 0.875));
}

#[test]
fn appended_tween_waits_for_its_slot() {
    let mut probe = Probe::default();
    let mut tl = Timeline::new()
        .to(&[(Channel::RotationX, To(1.0))], 1.0, Ease::Linear, Placement::Append)
        .to(&[(Channel::RotationY, To(1.0))], 1.0, Ease::Linear, Placement::Append);
    tl.render(0.25, &mut probe);
    assert!(approx(probe.rot[0], 0.5));
    assert_eq!(probe.rot[1], 0.0);
    assert!(!tl.tweens()[1].is_initialized());
    tl.render(0.75, &mut probe);
    assert_eq!(probe.rot[0], 1.0);
    assert!(approx(probe.rot[1], 0.5));
}

#[test]
fn channels_missing_on_target_are_skipped() {
    let mut probe = Probe::default();
    let mut tl = Timeline::new().to(
        &[(Channel::YPercent, To(-5.0)), (Channel::RotationX, To(1.0))],
        1.0,
        Ease::Linear,
        Placement::Append,
    );
    tl.render(1.0, &mut probe);
    assert_eq!(probe.rot[0], 1.0);
    assert_eq!(probe.writes, 1);
}

#[test]
fn eases_fix_their_endpoints() {
    for ease in [Ease::Linear, Ease::QuadInOut, Ease::CubicOut] {
        assert_eq!(ease.apply(0.0), 0.0, "{ease:?}");
        assert_eq!(ease.apply(1.0), 1.0, "{ease:?}");
        assert_eq!(ease.apply(-3.0), 0.0, "{ease:?}");
        assert_eq!(ease.apply(4.0), 1.0, "{ease:?}");
    }
    assert_eq!(Ease::default(), Ease::Linear);
    assert_eq!(Ease::QuadInOut.apply(0.25), 0.125);
    assert_eq!(Ease::QuadInOut.apply(0.75), 0.875);
}
