//! Easing and scene-time tweens
//!
//! Every animation in the scene (entrances, the camera dolly, the backdrop
//! fade, the full-screen transition) is a [`Tween`] sampled against the
//! scene clock, so animations are deterministic for a given frame timeline.

use std::time::Duration;

use glam::Vec3;

/// Easing function types for transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EasingFunction {
    EaseOutCubic,
    EaseInOutCubic,
    EaseOutQuart,
}

impl EasingFunction {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingFunction::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            EasingFunction::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            EasingFunction::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
        }
    }
}

/// Values a tween can interpolate.
pub trait Lerp: Copy {
    fn lerp_to(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp_to(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Vec3 {
    fn lerp_to(self, to: Self, t: f32) -> Self {
        self.lerp(to, t)
    }
}

/// Interpolation from `from` to `to` starting at a scene time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween<T: Lerp> {
    pub from: T,
    pub to: T,
    /// Scene time (seconds) at which the tween starts.
    pub start_s: f64,
    pub duration_s: f64,
    pub easing: EasingFunction,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T, start_s: f64, duration: Duration, easing: EasingFunction) -> Self {
        Self {
            from,
            to,
            start_s,
            duration_s: duration.as_secs_f64(),
            easing,
        }
    }

    /// Raw linear progress in `[0, 1]`; zero before the start time.
    pub fn progress(&self, now_s: f64) -> f32 {
        if now_s <= self.start_s {
            return 0.0;
        }
        if self.duration_s <= 0.0 {
            return 1.0;
        }
        ((now_s - self.start_s) / self.duration_s).clamp(0.0, 1.0) as f32
    }

    pub fn sample(&self, now_s: f64) -> T {
        let eased = self.easing.apply(self.progress(now_s));
        self.from.lerp_to(self.to, eased)
    }

    pub fn has_started(&self, now_s: f64) -> bool {
        now_s >= self.start_s
    }

    pub fn is_complete(&self, now_s: f64) -> bool {
        self.progress(now_s) >= 1.0
    }

    pub fn end_s(&self) -> f64 {
        self.start_s + self.duration_s
    }
}

/// Frame-rate independent approach factor for exponential smoothing.
pub fn approach_factor(rate: f32, delta_s: f32) -> f32 {
    if delta_s <= 0.0 {
        return 0.0;
    }
    1.0 - (-rate * delta_s).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_functions() {
        for easing in [
            EasingFunction::EaseOutCubic,
            EasingFunction::EaseInOutCubic,
            EasingFunction::EaseOutQuart,
        ] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
            assert_eq!(easing.apply(2.0), 1.0);
        }

        assert!(EasingFunction::EaseOutCubic.apply(0.5) > 0.5);
        let quart = EasingFunction::EaseOutQuart.apply(0.5);
        assert!(quart > EasingFunction::EaseOutCubic.apply(0.5));
        assert_eq!(EasingFunction::EaseInOutCubic.apply(0.5), 0.5);
    }

    #[test]
    fn tween_holds_before_start_and_after_end() {
        let tween = Tween::new(
            0.0_f32,
            10.0,
            2.0,
            Duration::from_secs(1),
            EasingFunction::EaseInOutCubic,
        );
        assert_eq!(tween.sample(1.0), 0.0);
        assert!((tween.sample(2.5) - 5.0).abs() < 1e-4);
        assert_eq!(tween.sample(9.0), 10.0);
        assert!(tween.is_complete(3.0));
        assert!(!tween.is_complete(2.99));
    }

    #[test]
    fn approach_is_frame_rate_independent() {
        let one_step = approach_factor(5.0, 0.1);
        let half = approach_factor(5.0, 0.05);
        let two_steps = 1.0 - (1.0 - half) * (1.0 - half);
        assert!((one_step - two_steps).abs() < 1e-5);
    }
}
