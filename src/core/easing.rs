/// Easing curves used by scroll tweens and scrub smoothing.
///
/// Every curve maps `[0, 1]` onto `[0, 1]` with `ease(0) == 0` and
/// `ease(1) == 1`; inputs outside the unit range are clamped first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Ease {
    #[default]
    Linear,
    QuadInOut,
    CubicOut,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - 2.0 * (1.0 - t) * (1.0 - t)
                }
            }
            Ease::CubicOut => {
                let u = 1.0 - t;
                1.0 - u * u * u
            }
        }
    }
}
