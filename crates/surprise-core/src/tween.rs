#![forbid(unsafe_code)]

//! Tick-driven playback of a [`TransitionSpec`].
//!
//! [`Animation`] is the minimal interface for anything advanced by elapsed
//! time. [`Tween`] implements it for one transition: a delay phase followed
//! by an eased sweep across evenly spaced keyframes.
//!
//! # Invariants
//!
//! 1. `value()` is 0.0 until the delay has elapsed and 1.0 once complete.
//! 2. `frame()` is `None` during the delay (the node keeps its own state)
//!    and the last keyframe once complete.
//! 3. Time past completion is reported by `overshoot()`, never lost.

use std::time::Duration;

use crate::easing::Easing;
use crate::node::Keyframe;
use crate::transition::TransitionSpec;

/// Anything advanced by elapsed time.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Progress in `[0, 1]`.
    fn value(&self) -> f32;

    /// Return to the initial state.
    fn reset(&mut self);

    /// Time elapsed past completion.
    fn overshoot(&self) -> Duration {
        Duration::ZERO
    }
}

/// Playback state of a single transition.
#[derive(Debug, Clone)]
pub struct Tween {
    keyframes: Vec<Keyframe>,
    duration: Duration,
    delay: Duration,
    easing: Easing,
    elapsed: Duration,
}

impl Tween {
    /// Build a tween from a transition spec.
    ///
    /// A spec with fewer than two keyframes plays as a hold of its only
    /// keyframe (or of nothing, reported via `frame() == None`).
    #[must_use]
    pub fn new(spec: &TransitionSpec) -> Self {
        Self {
            keyframes: spec.keyframes.clone(),
            duration: spec.duration,
            delay: spec.delay,
            easing: spec.easing,
            elapsed: Duration::ZERO,
        }
    }

    /// Whether the delay phase is over.
    #[must_use]
    pub fn has_started(&self) -> bool {
        self.elapsed >= self.delay
    }

    /// Linear progress through the active phase, before easing.
    fn linear_progress(&self) -> f32 {
        if !self.has_started() {
            return 0.0;
        }
        if self.duration.is_zero() {
            return 1.0;
        }
        let active = self.elapsed.saturating_sub(self.delay);
        (active.as_secs_f64() / self.duration.as_secs_f64()).min(1.0) as f32
    }

    /// Interpolated keyframe at the current time.
    #[must_use]
    pub fn frame(&self) -> Option<Keyframe> {
        if !self.has_started() {
            return None;
        }
        let (first, rest) = self.keyframes.split_first()?;
        if rest.is_empty() {
            return Some(*first);
        }
        let linear = self.linear_progress();
        if linear >= 1.0 {
            return self.keyframes.last().copied();
        }

        let eased = self.easing.evaluate(linear);
        let segments = (self.keyframes.len() - 1) as f32;
        let scaled = eased * segments;
        // Overshoot past either end extrapolates along the edge segment.
        let index = (scaled.floor() as isize).clamp(0, segments as isize - 1) as usize;
        let local = scaled - index as f32;
        Some(self.keyframes[index].lerp(self.keyframes[index + 1], local))
    }
}

impl Animation for Tween {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.delay.saturating_add(self.duration)
    }

    fn value(&self) -> f32 {
        self.linear_progress()
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    fn overshoot(&self) -> Duration {
        self.elapsed
            .saturating_sub(self.delay.saturating_add(self.duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeId, Transform};

    const MS_100: Duration = Duration::from_millis(100);

    fn fade_in(duration: Duration, delay: Duration) -> TransitionSpec {
        TransitionSpec::new(
            NodeId::Cake,
            vec![
                Keyframe::new(0.0, Transform::NEUTRAL),
                Keyframe::new(1.0, Transform::NEUTRAL),
            ],
            duration,
        )
        .delay(delay)
    }

    #[test]
    fn linear_midpoint() {
        let mut tween = Tween::new(&fade_in(Duration::from_millis(200), Duration::ZERO));
        tween.tick(MS_100);
        let frame = tween.frame().unwrap();
        assert!((frame.opacity - 0.5).abs() < 1e-3);
        assert!(!tween.is_complete());
    }

    #[test]
    fn delay_defers_start() {
        let mut tween = Tween::new(&fade_in(MS_100, Duration::from_millis(150)));
        tween.tick(MS_100);
        assert!(!tween.has_started());
        assert!(tween.frame().is_none());
        assert_eq!(tween.value(), 0.0);

        tween.tick(Duration::from_millis(50));
        assert!(tween.has_started());
        assert_eq!(tween.frame().unwrap().opacity, 0.0);

        tween.tick(MS_100);
        assert!(tween.is_complete());
        assert_eq!(tween.frame().unwrap().opacity, 1.0);
    }

    #[test]
    fn three_keyframes_pass_through_middle() {
        let spec = TransitionSpec::new(
            NodeId::HeadingWow,
            vec![
                Keyframe::new(0.0, Transform::NEUTRAL),
                Keyframe::new(1.0, Transform::scaled(1.03)),
                Keyframe::new(1.0, Transform::NEUTRAL),
            ],
            Duration::from_millis(200),
        );
        let mut tween = Tween::new(&spec);
        tween.tick(MS_100);
        let mid = tween.frame().unwrap();
        assert!((mid.transform.scale - 1.03).abs() < 1e-3);
        assert!((mid.opacity - 1.0).abs() < 1e-3);
    }

    #[test]
    fn overshoot_easing_extrapolates_last_segment() {
        let spec = TransitionSpec::new(
            NodeId::Cake,
            vec![
                Keyframe::new(0.0, Transform::scaled(0.9)),
                Keyframe::REST,
            ],
            Duration::from_millis(500),
        )
        .easing(Easing::OVERSHOOT);
        let mut tween = Tween::new(&spec);
        tween.tick(Duration::from_millis(300));
        let frame = tween.frame().unwrap();
        assert!(frame.transform.scale > 1.0, "scale {}", frame.transform.scale);
    }

    #[test]
    fn overshoot_reports_excess_time() {
        let mut tween = Tween::new(&fade_in(MS_100, Duration::ZERO));
        tween.tick(Duration::from_millis(130));
        assert_eq!(tween.overshoot(), Duration::from_millis(30));
    }

    #[test]
    fn zero_duration_completes_on_first_tick() {
        let mut tween = Tween::new(&fade_in(Duration::ZERO, Duration::ZERO));
        assert!(tween.is_complete());
        tween.tick(Duration::ZERO);
        assert_eq!(tween.value(), 1.0);
    }

    #[test]
    fn reset_rewinds() {
        let mut tween = Tween::new(&fade_in(MS_100, Duration::ZERO));
        tween.tick(MS_100);
        tween.reset();
        assert!(!tween.is_complete());
        assert_eq!(tween.value(), 0.0);
    }
}
