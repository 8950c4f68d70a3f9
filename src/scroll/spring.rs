//! Critically damped spring smoothing.
//!
//! Scroll progress can arrive at high frequency and in uneven steps
//! (trackpads, momentum scrolling, scroll-snapping). Feeding the raw mapped
//! value straight to a transform makes it jitter. A critically damped spring
//! follows the target as fast as possible without overshoot:
//!
//! ```text
//! e(t) = (e₀ + (v₀ + ω·e₀)·t) · e^(−ωt)        e = value − target
//! v(t) = (v₀ − ω·(v₀ + ω·e₀)·t) · e^(−ωt)      ω = √stiffness
//! ```
//!
//! The closed form is exact for any frame delta, so output does not depend
//! on the frame rate.

/// Below this distance and speed the spring snaps onto its target.
const REST_EPSILON: f64 = 1e-3;

pub const DEFAULT_STIFFNESS: f64 = 170.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SpringFilter {
    omega: f64,
    value: Option<f64>,
    velocity: f64,
}

impl Default for SpringFilter {
    fn default() -> Self {
        Self::new(DEFAULT_STIFFNESS)
    }
}

impl SpringFilter {
    /// Unit-mass spring with damping chosen for critical damping.
    ///
    /// Non-positive or non-finite stiffness falls back to the default.
    pub fn new(stiffness: f64) -> Self {
        let stiffness = if stiffness.is_finite() && stiffness > 0.0 {
            stiffness
        } else {
            DEFAULT_STIFFNESS
        };
        Self {
            omega: stiffness.sqrt(),
            value: None,
            velocity: 0.0,
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Advance by `dt` seconds towards `target` and return the new value.
    ///
    /// The first call snaps to the target: there is no previous position to
    /// ease from.
    pub fn step(&mut self, target: f64, dt: f64) -> f64 {
        let Some(current) = self.value else {
            return self.snap(target);
        };
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let e0 = current - target;
        let v0 = self.velocity;
        let decay = (-self.omega * dt).exp();
        let a = v0 + self.omega * e0;
        let e = (e0 + a * dt) * decay;
        let v = (v0 - self.omega * a * dt) * decay;

        if e.abs() < REST_EPSILON && v.abs() < REST_EPSILON {
            return self.snap(target);
        }
        self.value = Some(target + e);
        self.velocity = v;
        target + e
    }

    /// Jump to `value` with zero velocity.
    pub fn snap(&mut self, value: f64) -> f64 {
        self.value = Some(value);
        self.velocity = 0.0;
        value
    }

    /// Forget the position; the next step snaps.
    pub fn reset(&mut self) {
        self.value = None;
        self.velocity = 0.0;
    }

    pub fn is_settled_at(&self, target: f64) -> bool {
        self.value == Some(target) && self.velocity == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 1.0 / 60.0;

    #[test]
    fn first_step_snaps() {
        let mut spring = SpringFilter::default();
        assert_eq!(spring.step(42.0, FRAME), 42.0);
        assert!(spring.is_settled_at(42.0));
    }

    #[test]
    fn approaches_target_without_overshoot() {
        let mut spring = SpringFilter::new(100.0);
        spring.snap(0.0);
        let mut prev = 0.0;
        for _ in 0..120 {
            let v = spring.step(100.0, FRAME);
            assert!(v >= prev, "moved backwards: {prev} -> {v}");
            assert!(v <= 100.0, "overshot: {v}");
            prev = v;
        }
        assert!(spring.is_settled_at(100.0));
    }

    #[test]
    fn lags_behind_sudden_jump() {
        let mut spring = SpringFilter::default();
        spring.snap(0.0);
        let v = spring.step(100.0, FRAME);
        assert!(v > 0.0 && v < 100.0);
    }

    #[test]
    fn frame_rate_independent() {
        let mut coarse = SpringFilter::new(120.0);
        let mut fine = SpringFilter::new(120.0);
        coarse.snap(0.0);
        fine.snap(0.0);
        let a = coarse.step(50.0, 0.1);
        let mut b = 0.0;
        for _ in 0..10 {
            b = fine.step(50.0, 0.01);
        }
        assert!((a - b).abs() < 1e-6, "{a} vs {b}");
    }

    #[test]
    fn zero_dt_holds_position() {
        let mut spring = SpringFilter::default();
        spring.snap(5.0);
        spring.step(10.0, FRAME);
        let held = spring.value().unwrap();
        assert!((spring.step(10.0, 0.0) - held).abs() < 1e-9);
    }

    #[test]
    fn reset_makes_next_step_snap() {
        let mut spring = SpringFilter::default();
        spring.snap(0.0);
        spring.step(10.0, FRAME);
        spring.reset();
        assert_eq!(spring.step(-3.0, FRAME), -3.0);
    }

    #[test]
    fn invalid_stiffness_uses_default() {
        assert_eq!(SpringFilter::new(-1.0), SpringFilter::default());
        assert_eq!(SpringFilter::new(f64::NAN), SpringFilter::default());
    }
}
