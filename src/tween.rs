use crate::error::{VitrineError, VitrineResult};

/// Ten frames at 60 Hz.
pub const DEFAULT_FADE_SECS: f64 = 10.0 / 60.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
}

impl Default for Ease {
    fn default() -> Self {
        Self::Linear
    }
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }
}

/// Fade-in timing: total ramp duration plus easing curve.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FadeSpec {
    /// Total ramp duration in seconds.
    #[serde(default = "default_duration_secs")]
    pub duration_secs: f64,
    /// Progress curve applied to the elapsed fraction.
    #[serde(default)]
    pub ease: Ease,
}

fn default_duration_secs() -> f64 {
    DEFAULT_FADE_SECS
}

impl Default for FadeSpec {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_FADE_SECS,
            ease: Ease::Linear,
        }
    }
}

impl FadeSpec {
    pub fn validate(&self) -> VitrineResult<()> {
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(VitrineError::validation(
                "fade duration_secs must be finite and > 0",
            ));
        }
        Ok(())
    }
}

/// Timed opacity ramp advanced by clock deltas.
///
/// Progress is the eased fraction of elapsed time over the configured
/// duration, clamped to `[0, 1]`. A non-positive duration counts as already
/// complete, so the tween stays total for unvalidated inputs.
#[derive(Clone, Debug)]
pub struct Tween {
    duration_secs: f64,
    ease: Ease,
    elapsed_secs: f64,
}

impl Tween {
    pub fn new(spec: FadeSpec) -> Self {
        Self {
            duration_secs: spec.duration_secs,
            ease: spec.ease,
            elapsed_secs: 0.0,
        }
    }

    /// Advance by `dt_secs` and return the new progress. Negative deltas are
    /// ignored; the clock never runs backwards.
    pub fn advance(&mut self, dt_secs: f64) -> f64 {
        self.elapsed_secs += dt_secs.max(0.0);
        self.progress()
    }

    /// Eased progress in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.duration_secs <= 0.0 {
            return 1.0;
        }
        self.ease.apply(self.elapsed_secs / self.duration_secs)
    }

    pub fn finished(&self) -> bool {
        self.elapsed_secs >= self.duration_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_EASES: [Ease; 7] = [
        Ease::Linear,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::InCubic,
        Ease::OutCubic,
        Ease::InOutCubic,
    ];

    #[test]
    fn endpoints_are_stable() {
        for ease in ALL_EASES {
            assert_eq!(ease.apply(0.0), 0.0);
            assert_eq!(ease.apply(1.0), 1.0);
        }
    }

    #[test]
    fn monotonic_spot_check() {
        for ease in ALL_EASES {
            let a = ease.apply(0.25);
            let b = ease.apply(0.5);
            let c = ease.apply(0.75);
            assert!(a < b);
            assert!(b < c);
        }
    }

    #[test]
    fn apply_clamps_out_of_range_input() {
        for ease in ALL_EASES {
            assert_eq!(ease.apply(-3.0), 0.0);
            assert_eq!(ease.apply(42.0), 1.0);
        }
    }

    // dt 0.25 over duration 2.5 is binary-exact, so each tick adds exactly a
    // tenth and the tween completes on the tenth tick, not the ninth.
    #[test]
    fn linear_tween_steps_in_exact_tenths() {
        let mut tween = Tween::new(FadeSpec {
            duration_secs: 2.5,
            ease: Ease::Linear,
        });

        for tick in 1..=9u32 {
            let progress = tween.advance(0.25);
            assert!((progress - f64::from(tick) * 0.1).abs() < 1e-12);
            assert!(!tween.finished());
            assert!(progress < 1.0);
        }

        assert_eq!(tween.advance(0.25), 1.0);
        assert!(tween.finished());
    }

    #[test]
    fn eased_progress_matches_curve() {
        let mut tween = Tween::new(FadeSpec {
            duration_secs: 1.0,
            ease: Ease::OutQuad,
        });
        assert_eq!(tween.advance(0.5), 0.75);
    }

    #[test]
    fn negative_deltas_do_not_rewind() {
        let mut tween = Tween::new(FadeSpec {
            duration_secs: 1.0,
            ease: Ease::Linear,
        });
        tween.advance(0.5);
        assert_eq!(tween.advance(-10.0), 0.5);
    }

    #[test]
    fn non_positive_duration_is_already_complete() {
        let tween = Tween::new(FadeSpec {
            duration_secs: 0.0,
            ease: Ease::Linear,
        });
        assert_eq!(tween.progress(), 1.0);
        assert!(tween.finished());
    }

    #[test]
    fn validate_rejects_bad_durations() {
        assert!(FadeSpec::default().validate().is_ok());
        assert!(
            FadeSpec {
                duration_secs: 0.0,
                ease: Ease::Linear,
            }
            .validate()
            .is_err()
        );
        assert!(
            FadeSpec {
                duration_secs: f64::NAN,
                ease: Ease::Linear,
            }
            .validate()
            .is_err()
        );
    }
}
