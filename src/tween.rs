//! Time-based tweens and easing curves for shader uniforms.
//!
//! Tweens are evaluated against an explicit clock (`now`, in seconds) rather
//! than reading a timer themselves. Hosts pass `performance.now()` or an
//! `Instant`-derived value; tests pass plain numbers.

use glam::Vec2;

/// Clock values closer than this (seconds) count as the same instant.
const TIME_EPSILON: f64 = 1e-9;

/// Easing functions for uniform animations.
///
/// These control the acceleration curve of a tween.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    /// Constant speed throughout.
    Linear,
    /// Start fast, decelerate (quadratic).
    EaseOut,
    /// Start fast, decelerate harder (cubic). The hover default.
    #[default]
    Power2Out,
}

impl Easing {
    /// Apply the easing function to a linear progress value (0.0 to 1.0).
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::Power2Out => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Values that can be interpolated by a [`Tween`].
pub trait Lerp: Copy {
    fn lerp(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(self, to: Self, t: f32) -> Self {
        Vec2::lerp(self, to, t)
    }
}

/// An animation of one value from `from` to `to`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween<T> {
    pub from: T,
    pub to: T,
    pub start: f64,
    pub duration: f64,
    pub easing: Easing,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T, start: f64, duration: f64, easing: Easing) -> Self {
        Self {
            from,
            to,
            start,
            duration,
            easing,
        }
    }

    /// Linear progress in `[0, 1]` at time `now`.
    ///
    /// A tween is complete at `start + duration` even when the subtraction
    /// rounds a hair short of `duration`.
    pub fn progress(&self, now: f64) -> f32 {
        let elapsed = now - self.start;
        if elapsed + TIME_EPSILON >= self.duration {
            return 1.0;
        }
        ((elapsed / self.duration) as f32).clamp(0.0, 1.0)
    }

    /// Interpolated value at time `now`.
    pub fn value_at(&self, now: f64) -> T {
        self.from.lerp(self.to, self.easing.apply(self.progress(now)))
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }
}

/// A value with at most one running tween.
///
/// Starting a new tween replaces the running one, picking up from the value
/// reached so far so there is no jump.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Animated<T> {
    value: T,
    tween: Option<Tween<T>>,
}

impl<T: Lerp> Animated<T> {
    pub fn new(value: T) -> Self {
        Self { value, tween: None }
    }

    pub fn value(&self) -> T {
        self.value
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    pub fn target(&self) -> T {
        self.tween.map_or(self.value, |tween| tween.to)
    }

    /// Jump to `value`, cancelling any running tween.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.tween = None;
    }

    /// Animate from the current value to `to`.
    pub fn animate_to(&mut self, to: T, now: f64, duration: f64, easing: Easing) {
        self.tween = Some(Tween::new(self.value, to, now, duration, easing));
    }

    /// Advance to `now`. Finished tweens are dropped once their end value is
    /// written.
    pub fn tick(&mut self, now: f64) {
        if let Some(tween) = self.tween {
            self.value = tween.value_at(now);
            if tween.is_finished(now) {
                self.tween = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power2_out_is_cubic_ease_out() {
        let ease = Easing::Power2Out;
        assert_eq!(ease.apply(0.0), 0.0);
        assert_eq!(ease.apply(1.0), 1.0);
        assert!((ease.apply(0.5) - 0.875).abs() < 1e-6);
        assert_eq!(ease.apply(-1.0), 0.0);
        assert_eq!(ease.apply(2.0), 1.0);
    }

    #[test]
    fn ease_out_decelerates() {
        let ease = Easing::EaseOut;
        assert!(ease.apply(0.5) > 0.5);
        assert!((ease.apply(0.5) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn tween_reaches_target_after_duration() {
        let tween = Tween::new(0.0f32, 1.0, 10.0, 0.3, Easing::Linear);
        assert_eq!(tween.value_at(10.0), 0.0);
        assert!((tween.value_at(10.15) - 0.5).abs() < 1e-4);
        assert_eq!(tween.value_at(10.3), 1.0);
        assert_eq!(tween.value_at(99.0), 1.0);
        assert!(tween.is_finished(10.3));
        assert!(!tween.is_finished(10.2));
    }

    #[test]
    fn tween_finishes_exactly_at_its_end_time() {
        // 0.3 - 0.1 rounds below 0.2.
        let tween = Tween::new(0.0f32, 1.0, 0.1, 0.2, Easing::Power2Out);
        assert!(tween.is_finished(0.3));
        assert_eq!(tween.value_at(0.3), 1.0);
        assert!(!tween.is_finished(0.299));
    }

    #[test]
    fn zero_duration_tween_is_immediate() {
        let tween = Tween::new(Vec2::ZERO, Vec2::ONE, 0.0, 0.0, Easing::Power2Out);
        assert_eq!(tween.value_at(0.0), Vec2::ONE);
    }

    #[test]
    fn retargeting_continues_from_current_value() {
        let mut hover = Animated::new(0.0f32);
        hover.animate_to(1.0, 0.0, 1.0, Easing::Linear);
        hover.tick(0.5);
        assert!((hover.value() - 0.5).abs() < 1e-6);

        hover.animate_to(0.0, 0.5, 1.0, Easing::Linear);
        hover.tick(0.5);
        assert!((hover.value() - 0.5).abs() < 1e-6);
        hover.tick(1.0);
        assert!((hover.value() - 0.25).abs() < 1e-6);
        hover.tick(1.5);
        assert_eq!(hover.value(), 0.0);
        assert!(!hover.is_animating());
    }

    #[test]
    fn set_cancels_running_tween() {
        let mut mouse = Animated::new(Vec2::splat(0.5));
        mouse.animate_to(Vec2::new(0.1, 0.9), 0.0, 1.0, Easing::Linear);
        mouse.set(Vec2::splat(0.5));
        mouse.tick(2.0);
        assert_eq!(mouse.value(), Vec2::splat(0.5));
    }
}
