#![forbid(unsafe_code)]

//! Easing curves for transitions.
//!
//! [`Easing`] maps linear progress `t ∈ [0, 1]` to eased progress. Curves
//! match their CSS counterparts so timings authored against a browser
//! reproduce here. [`Easing::OVERSHOOT`] is the "ease-out-back" approximation
//! used by most reveal stages: it runs past 1.0 before settling.
//!
//! # Invariants
//!
//! 1. `evaluate(0.0) == 0.0` and `evaluate(1.0) == 1.0` for every curve.
//! 2. Input is clamped to `[0, 1]`; output is not (overshoot is intentional).

/// A cubic Bézier timing curve with fixed endpoints `(0,0)` and `(1,1)`.
///
/// `x1` and `x2` must lie in `[0, 1]` so the curve is a function of time;
/// [`CubicBezier::new`] clamps them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

impl CubicBezier {
    const NEWTON_ITERATIONS: usize = 8;
    const BISECTION_ITERATIONS: usize = 32;
    const EPSILON: f32 = 1e-6;

    #[must_use]
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1: clamp_unit(x1),
            y1,
            x2: clamp_unit(x2),
            y2,
        }
    }

    /// Eased value at time `t` (clamped to `[0, 1]`).
    #[must_use]
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        let s = self.solve_curve_x(t);
        Self::sample(self.y1, self.y2, s)
    }

    // B(s) = 3(1-s)²s·p1 + 3(1-s)s²·p2 + s³, expanded to a·s³ + b·s² + c·s.
    #[inline]
    fn sample(p1: f32, p2: f32, s: f32) -> f32 {
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        let a = 1.0 - c - b;
        ((a * s + b) * s + c) * s
    }

    #[inline]
    fn sample_derivative(p1: f32, p2: f32, s: f32) -> f32 {
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        let a = 1.0 - c - b;
        (3.0 * a * s + 2.0 * b) * s + c
    }

    /// Find the curve parameter `s` whose x-coordinate equals `x`.
    fn solve_curve_x(&self, x: f32) -> f32 {
        // Newton-Raphson first; it converges in a few steps for typical curves.
        let mut s = x;
        for _ in 0..Self::NEWTON_ITERATIONS {
            let err = Self::sample(self.x1, self.x2, s) - x;
            if err.abs() < Self::EPSILON {
                return s;
            }
            let d = Self::sample_derivative(self.x1, self.x2, s);
            if d.abs() < Self::EPSILON {
                break;
            }
            s -= err / d;
        }

        // Fall back to bisection for flat regions.
        let (mut lo, mut hi) = (0.0f32, 1.0f32);
        s = x;
        for _ in 0..Self::BISECTION_ITERATIONS {
            let v = Self::sample(self.x1, self.x2, s);
            if (v - x).abs() < Self::EPSILON {
                break;
            }
            if v < x {
                lo = s;
            } else {
                hi = s;
            }
            s = (lo + hi) * 0.5;
        }
        s
    }
}

const fn clamp_unit(v: f32) -> f32 {
    if v < 0.0 {
        0.0
    } else if v > 1.0 {
        1.0
    } else {
        v
    }
}

/// Easing curve applied to a transition's overall progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Easing {
    /// No easing.
    #[default]
    Linear,
    /// CSS `ease-out`: `cubic-bezier(0, 0, 0.58, 1)`.
    EaseOut,
    /// CSS `ease-in-out`: `cubic-bezier(0.42, 0, 0.58, 1)`.
    EaseInOut,
    /// Arbitrary cubic Bézier.
    CubicBezier(CubicBezier),
}

impl Easing {
    /// Pronounced overshoot approximating "ease-out-back".
    pub const OVERSHOOT: Easing = Easing::CubicBezier(CubicBezier::new(0.34, 1.56, 0.64, 1.0));

    const EASE_OUT: CubicBezier = CubicBezier::new(0.0, 0.0, 0.58, 1.0);
    const EASE_IN_OUT: CubicBezier = CubicBezier::new(0.42, 0.0, 0.58, 1.0);

    /// Eased value at time `t`.
    #[must_use]
    pub fn evaluate(&self, t: f32) -> f32 {
        match self {
            Self::Linear => t.clamp(0.0, 1.0),
            Self::EaseOut => Self::EASE_OUT.evaluate(t),
            Self::EaseInOut => Self::EASE_IN_OUT.evaluate(t),
            Self::CubicBezier(curve) => curve.evaluate(t),
        }
    }

    /// Label for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseOut => "ease-out",
            Self::EaseInOut => "ease-in-out",
            Self::CubicBezier(_) if *self == Self::OVERSHOOT => "overshoot",
            Self::CubicBezier(_) => "cubic-bezier",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 4] = [
        Easing::Linear,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::OVERSHOOT,
    ];

    #[test]
    fn endpoints_are_exact() {
        for easing in ALL {
            assert_eq!(easing.evaluate(0.0), 0.0, "{}", easing.name());
            assert_eq!(easing.evaluate(1.0), 1.0, "{}", easing.name());
        }
    }

    #[test]
    fn input_is_clamped() {
        for easing in ALL {
            assert_eq!(easing.evaluate(-0.5), 0.0);
            assert_eq!(easing.evaluate(1.5), 1.0);
        }
    }

    #[test]
    fn overshoot_exceeds_one_mid_curve() {
        let peak = (1..100)
            .map(|i| Easing::OVERSHOOT.evaluate(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.05, "peak was {peak}");
    }

    #[test]
    fn standard_curves_are_monotonic() {
        for easing in [Easing::Linear, Easing::EaseOut, Easing::EaseInOut] {
            let mut prev = 0.0f32;
            for i in 0..=200 {
                let v = easing.evaluate(i as f32 / 200.0);
                assert!(v >= prev - 1e-4, "{} not monotonic at {i}", easing.name());
                prev = v;
            }
        }
    }

    #[test]
    fn ease_in_out_is_symmetric() {
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            let a = Easing::EaseInOut.evaluate(t);
            let b = 1.0 - Easing::EaseInOut.evaluate(1.0 - t);
            assert!((a - b).abs() < 1e-3, "asymmetric at t={t}: {a} vs {b}");
        }
    }

    #[test]
    fn ease_out_leads_linear() {
        assert!(Easing::EaseOut.evaluate(0.25) > 0.25);
        assert!(Easing::EaseOut.evaluate(0.5) > 0.5);
    }

    #[test]
    fn linear_bezier_is_identity() {
        let curve = CubicBezier::new(0.0, 0.0, 1.0, 1.0);
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert!((curve.evaluate(t) - t).abs() < 1e-3);
        }
    }
}
