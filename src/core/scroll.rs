// Scroll geometry: trigger markers, resolved scroll ranges and scrub coupling.
//
// A marker such as `"40% bottom"` pairs a point on the trigger element with
// a point on the viewport; the scroll offset at which those two points meet
// is the marker's resolved position. A binding's range is the interval
// between its resolved start and end markers.

use super::easing::Ease;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MarkerError {
    #[error("scroll marker `{0}` must name an element edge and a viewport edge")]
    Shape(String),
    #[error("unrecognised scroll edge `{0}`")]
    Edge(String),
}

/// A point along an element or the viewport, measured from its top.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Edge {
    Fraction(f32),
    Pixels(f32),
}

impl Edge {
    #[inline]
    pub fn offset(self, extent: f32) -> f32 {
        match self {
            Edge::Fraction(f) => f * extent,
            Edge::Pixels(px) => px,
        }
    }
}

impl FromStr for Edge {
    type Err = MarkerError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let bad = || MarkerError::Edge(token.to_string());
        match token {
            "top" => Ok(Edge::Fraction(0.0)),
            "center" => Ok(Edge::Fraction(0.5)),
            "bottom" => Ok(Edge::Fraction(1.0)),
            t if t.ends_with('%') => t[..t.len() - 1]
                .parse::<f32>()
                .map(|p| Edge::Fraction(p / 100.0))
                .map_err(|_| bad()),
            t if t.ends_with("px") => t[..t.len() - 2]
                .parse::<f32>()
                .map(Edge::Pixels)
                .map_err(|_| bad()),
            t => t.parse::<f32>().map(Edge::Pixels).map_err(|_| bad()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollMarker {
    pub element: Edge,
    pub viewport: Edge,
}

impl FromStr for ScrollMarker {
    type Err = MarkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(element), Some(viewport), None) => Ok(ScrollMarker {
                element: element.parse()?,
                viewport: viewport.parse()?,
            }),
            _ => Err(MarkerError::Shape(s.to_string())),
        }
    }
}

impl ScrollMarker {
    /// Scroll offset at which the element point meets the viewport point.
    pub fn resolve(&self, element: ElementBox, viewport_height: f32) -> f32 {
        element.top + self.element.offset(element.height) - self.viewport.offset(viewport_height)
    }
}

/// Element box in document coordinates (top already includes the page scroll).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ElementBox {
    pub top: f32,
    pub height: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollRange {
    pub start: f32,
    pub end: f32,
}

impl ScrollRange {
    pub fn resolve(
        start: &ScrollMarker,
        end: &ScrollMarker,
        element: ElementBox,
        viewport_height: f32,
    ) -> Self {
        Self {
            start: start.resolve(element, viewport_height),
            end: end.resolve(element, viewport_height),
        }
    }

    /// Clamped progress of `scroll_y` through the range.
    pub fn progress(&self, scroll_y: f32) -> f32 {
        let span = self.end - self.start;
        if span <= f32::EPSILON {
            return if scroll_y >= self.start { 1.0 } else { 0.0 };
        }
        ((scroll_y - self.start) / span).clamp(0.0, 1.0)
    }

    #[inline]
    pub fn contains(&self, scroll_y: f32) -> bool {
        scroll_y >= self.start && scroll_y <= self.end
    }
}

/// How timeline progress follows scroll progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scrub {
    /// Progress equals the scroll ratio exactly.
    Immediate,
    /// Progress catches up with the scroll ratio over this many seconds.
    Smoothed(f32),
}

// Catch-up curve for smoothed scrubbing
const SCRUB_EASE: Ease = Ease::CubicOut;

#[derive(Clone, Debug)]
pub struct ScrubState {
    scrub: Scrub,
    applied: f32,
    from: f32,
    to: f32,
    elapsed: f32,
}

impl ScrubState {
    pub fn new(scrub: Scrub) -> Self {
        Self {
            scrub,
            applied: 0.0,
            from: 0.0,
            to: 0.0,
            elapsed: 0.0,
        }
    }

    pub fn scrub(&self) -> Scrub {
        self.scrub
    }

    #[inline]
    pub fn applied(&self) -> f32 {
        self.applied
    }

    pub fn is_settled(&self) -> bool {
        (self.applied - self.to).abs() <= f32::EPSILON
    }

    /// Snap to `progress` without smoothing.
    pub fn jump_to(&mut self, progress: f32) {
        self.applied = progress;
        self.from = progress;
        self.to = progress;
        self.elapsed = 0.0;
    }

    /// Retarget the scrub. Immediate scrubs apply the new value right away;
    /// smoothed scrubs restart their catch-up from the current value.
    pub fn set_target(&mut self, progress: f32) {
        match self.scrub {
            Scrub::Immediate => self.jump_to(progress),
            Scrub::Smoothed(_) => {
                if (progress - self.to).abs() > f32::EPSILON {
                    self.from = self.applied;
                    self.to = progress;
                    self.elapsed = 0.0;
                }
            }
        }
    }

    /// Advance smoothing by `dt` seconds and return the applied progress.
    pub fn advance(&mut self, dt: f32) -> f32 {
        if let Scrub::Smoothed(lag) = self.scrub {
            if !self.is_settled() {
                self.elapsed += dt.max(0.0);
                let t = if lag <= 0.0 { 1.0 } else { self.elapsed / lag };
                if t >= 1.0 {
                    self.applied = self.to;
                } else {
                    self.applied = self.from + (self.to - self.from) * SCRUB_EASE.apply(t);
                }
            }
        }
        self.applied
    }
}
