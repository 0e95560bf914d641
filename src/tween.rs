use glam::Vec3;

/// Easing curves for timed interpolation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Ease {
    /// Constant speed.
    Linear,
    /// Accelerate from zero (quadratic).
    QuadIn,
    /// Decelerate to zero (quadratic).
    QuadOut,
    /// Accelerate then decelerate (quadratic).
    QuadInOut,
    /// Pronounced accelerate/decelerate (quintic). The default for camera
    /// moves.
    #[default]
    StrongInOut,
    /// Pronounced decelerate (quintic).
    StrongOut,
}

impl Ease {
    /// Apply the easing function to a linear progress value (0.0 to 1.0).
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::QuadIn => t * t,
            Ease::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Ease::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Ease::StrongInOut => {
                if t < 0.5 {
                    16.0 * t * t * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(5) / 2.0
                }
            }
            Ease::StrongOut => 1.0 - (1.0 - t).powi(5),
        }
    }
}

/// A time-bounded interpolation between two points.
///
/// The tween is advanced with [`step`](Tween::step) using frame deltas; it
/// clamps at the end point and reports completion exactly once through
/// [`is_complete`](Tween::is_complete). A zero or negative duration completes
/// on the first step.
#[derive(Clone, Debug)]
pub struct Tween {
    from: Vec3,
    to: Vec3,
    duration: f32,
    elapsed: f32,
    ease: Ease,
}

impl Tween {
    pub fn new(from: Vec3, to: Vec3, duration: f32, ease: Ease) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
            ease,
        }
    }

    /// Advance by `dt` seconds and return the interpolated position.
    pub fn step(&mut self, dt: f32) -> Vec3 {
        self.elapsed += dt.max(0.0);
        self.sample()
    }

    /// The position at the current elapsed time.
    pub fn sample(&self) -> Vec3 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        self.from.lerp(self.to, self.ease.apply(t))
    }

    /// The end point of the tween.
    pub fn end(&self) -> Vec3 {
        self.to
    }

    pub fn is_complete(&self) -> bool {
        self.duration <= 0.0 || self.elapsed >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_endpoints_are_fixed() {
        for ease in [
            Ease::Linear,
            Ease::QuadIn,
            Ease::QuadOut,
            Ease::QuadInOut,
            Ease::StrongInOut,
            Ease::StrongOut,
        ] {
            assert!((ease.apply(0.0)).abs() < 1e-6, "{ease:?} at 0");
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-6, "{ease:?} at 1");
        }
    }

    #[test]
    fn strong_in_out_is_symmetric() {
        let e = Ease::StrongInOut;
        assert!((e.apply(0.5) - 0.5).abs() < 1e-6);
        assert!((e.apply(0.25) + e.apply(0.75) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn tween_reaches_target_and_clamps() {
        let mut tween = Tween::new(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 1.0, Ease::Linear);

        let mid = tween.step(0.5);
        assert!((mid.x - 5.0).abs() < 1e-5);
        assert!(!tween.is_complete());

        let end = tween.step(0.5);
        assert!((end.x - 10.0).abs() < 1e-5);
        assert!(tween.is_complete());

        // Overshooting past the duration stays clamped at the end point.
        let past = tween.step(1.0);
        assert_eq!(past, Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let mut tween = Tween::new(Vec3::ZERO, Vec3::ONE, 0.0, Ease::StrongInOut);
        assert_eq!(tween.step(0.016), Vec3::ONE);
        assert!(tween.is_complete());
    }
}
