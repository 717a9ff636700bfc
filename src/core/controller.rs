// Scroll-driven transform controller.
//
// Each binding couples one timeline to the scroll range of a trigger
// element. Bindings are updated in registration order, so when several
// active bindings write the same channel in one update the binding
// registered last wins. A binding whose range is not being scrolled through
// renders at a clamped progress that does not change, which writes nothing:
// its target keeps whatever value was applied last.

use super::constants::*;
use super::easing::Ease;
use super::scroll::{ElementBox, MarkerError, ScrollMarker, ScrollRange, Scrub, ScrubState};
use super::timeline::{Channel, Placement, Timeline, TweenTarget, TweenValue};
use std::cell::RefCell;
use std::rc::Rc;

pub type SharedTarget = Rc<RefCell<dyn TweenTarget>>;

/// CSS transform state of a 2D page layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerTransform {
    pub y_percent: f32,
    pub scale: f32,
    dirty: bool,
}

impl Default for LayerTransform {
    fn default() -> Self {
        Self {
            y_percent: 0.0,
            scale: 1.0,
            dirty: false,
        }
    }
}

impl LayerTransform {
    pub fn css_transform(&self) -> String {
        format!(
            "translate(0%, {:.4}%) scale({:.4})",
            self.y_percent, self.scale
        )
    }

    /// Returns whether the transform changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

impl TweenTarget for LayerTransform {
    fn read(&self, channel: Channel) -> Option<f32> {
        match channel {
            Channel::YPercent => Some(self.y_percent),
            Channel::Scale => Some(self.scale),
            _ => None,
        }
    }

    fn write(&mut self, channel: Channel, value: f32) -> bool {
        match channel {
            Channel::YPercent => self.y_percent = value,
            Channel::Scale => self.scale = value,
            _ => return false,
        }
        self.dirty = true;
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingState {
    /// Trigger element not measured (or not present in the page).
    Unarmed,
    /// Scroll offset inside `[start, end]`.
    Active,
    /// Scroll offset outside the range; the last applied values hold.
    Idle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TriggerSpec {
    pub selector: String,
    pub start: ScrollMarker,
    pub end: ScrollMarker,
}

impl TriggerSpec {
    pub fn parse(selector: &str, start: &str, end: &str) -> Result<Self, MarkerError> {
        Ok(Self {
            selector: selector.to_string(),
            start: start.parse()?,
            end: end.parse()?,
        })
    }
}

pub struct ScrollBinding {
    pub name: String,
    pub trigger: TriggerSpec,
    scrub: ScrubState,
    timeline: Timeline,
    target: SharedTarget,
    range: Option<ScrollRange>,
    state: BindingState,
}

impl ScrollBinding {
    pub fn new(
        name: &str,
        trigger: TriggerSpec,
        scrub: Scrub,
        timeline: Timeline,
        target: SharedTarget,
    ) -> Self {
        Self {
            name: name.to_string(),
            trigger,
            scrub: ScrubState::new(scrub),
            timeline,
            target,
            range: None,
            state: BindingState::Unarmed,
        }
    }

    pub fn state(&self) -> BindingState {
        self.state
    }

    pub fn range(&self) -> Option<ScrollRange> {
        self.range
    }

    /// Progress currently applied to the timeline.
    pub fn progress(&self) -> f32 {
        self.scrub.applied()
    }

    fn render(&mut self) -> bool {
        let progress = self.scrub.applied();
        let mut target = self.target.borrow_mut();
        self.timeline.render(progress, &mut *target)
    }

    fn sample(&mut self, scroll_y: f32) -> Option<f32> {
        let range = self.range?;
        self.state = if range.contains(scroll_y) {
            BindingState::Active
        } else {
            BindingState::Idle
        };
        Some(range.progress(scroll_y))
    }
}

#[derive(Default)]
pub struct ScrollController {
    bindings: Vec<ScrollBinding>,
    scroll_y: f32,
}

impl ScrollController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, binding: ScrollBinding) {
        self.bindings.push(binding);
    }

    pub fn bindings(&self) -> &[ScrollBinding] {
        &self.bindings
    }

    pub fn binding(&self, name: &str) -> Option<&ScrollBinding> {
        self.bindings.iter().find(|b| b.name == name)
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    /// Measure every trigger and resolve its scroll range. A binding whose
    /// trigger cannot be found stays unarmed.
    pub fn refresh(&mut self, layout: impl Fn(&str) -> Option<ElementBox>, viewport_height: f32) {
        let scroll_y = self.scroll_y;
        for b in self.bindings.iter_mut() {
            let Some(element) = layout(&b.trigger.selector) else {
                log::warn!(
                    "[scroll] {}: trigger '{}' not found; binding stays unarmed",
                    b.name,
                    b.trigger.selector
                );
                b.range = None;
                b.state = BindingState::Unarmed;
                continue;
            };
            let range = ScrollRange::resolve(&b.trigger.start, &b.trigger.end, element, viewport_height);
            log::debug!(
                "[scroll] {}: range {:.1}..{:.1}px",
                b.name,
                range.start,
                range.end
            );
            let first_arm = b.range.is_none();
            b.range = Some(range);
            let Some(progress) = b.sample(scroll_y) else {
                continue;
            };
            if first_arm {
                b.scrub.jump_to(progress);
                b.render();
            } else {
                b.scrub.set_target(progress);
                if b.scrub.scrub() == Scrub::Immediate {
                    b.render();
                }
            }
        }
    }

    /// React to a new scroll offset. Immediate scrubs are applied here;
    /// smoothed ones are retargeted and catch up in [`tick`](Self::tick).
    pub fn on_scroll(&mut self, scroll_y: f32) {
        self.scroll_y = scroll_y;
        for b in self.bindings.iter_mut() {
            let Some(progress) = b.sample(scroll_y) else {
                continue;
            };
            b.scrub.set_target(progress);
            if b.scrub.scrub() == Scrub::Immediate {
                b.render();
            }
        }
    }

    /// Advance smoothed scrubs by `dt` seconds. Returns whether anything was written.
    pub fn tick(&mut self, dt: f32) -> bool {
        let mut wrote = false;
        for b in self.bindings.iter_mut() {
            if b.range.is_none() || b.scrub.is_settled() {
                continue;
            }
            b.scrub.advance(dt);
            wrote |= b.render();
        }
        wrote
    }
}

/// The page's scroll choreography, in registration order: three model
/// sequences followed by the parallax layer.
pub fn page_bindings(
    model: SharedTarget,
    layer: SharedTarget,
) -> Result<ScrollController, MarkerError> {
    use Channel::*;
    use TweenValue::{By, To};

    let mut controller = ScrollController::new();

    let spin = SEQ_A_ROTATION_DELTA;
    controller.register(ScrollBinding::new(
        "sequence-a",
        TriggerSpec::parse(TRIGGER_1, SEQ_A_START, SEQ_A_END)?,
        Scrub::Immediate,
        Timeline::new().to(
            &[(RotationX, By(spin.x)), (RotationY, By(spin.y)), (RotationZ, By(spin.z))],
            TWEEN_DURATION,
            Ease::Linear,
            Placement::Append,
        ),
        model.clone(),
    ));

    let turn = SEQ_B_ROTATION;
    controller.register(ScrollBinding::new(
        "sequence-b",
        TriggerSpec::parse(TRIGGER_2, SEQ_B_START, SEQ_B_END)?,
        Scrub::Immediate,
        Timeline::new().to(
            &[(RotationX, To(turn.x)), (RotationY, To(turn.y)), (RotationZ, To(turn.z))],
            TWEEN_DURATION,
            Ease::Linear,
            Placement::Append,
        ),
        model.clone(),
    ));

    let dest = SEQ_C_POSITION;
    controller.register(ScrollBinding::new(
        "sequence-c",
        TriggerSpec::parse(TRIGGER_3, SEQ_C_START, SEQ_C_END)?,
        Scrub::Immediate,
        Timeline::new()
            .to(
                &[(RotationZ, By(SEQ_C_SPIN_Z))],
                TWEEN_DURATION,
                Ease::QuadInOut,
                Placement::Append,
            )
            .to(
                &[(PositionX, To(dest.x)), (PositionY, To(dest.y)), (PositionZ, To(dest.z))],
                TWEEN_DURATION,
                Ease::Linear,
                Placement::WithPrevious,
            ),
        model,
    ));

    controller.register(ScrollBinding::new(
        "parallax",
        TriggerSpec::parse(PARALLAX_LAYER, PARALLAX_START, PARALLAX_END)?,
        Scrub::Smoothed(PARALLAX_SCRUB_SEC),
        Timeline::new().to(
            &[(YPercent, To(PARALLAX_Y_PERCENT)), (Scale, To(PARALLAX_SCALE))],
            TWEEN_DURATION,
            Ease::Linear,
            Placement::Append,
        ),
        layer,
    ));

    Ok(controller)
}
