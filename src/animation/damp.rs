//! Critically damped springs for eased values.
//!
//! `smooth_time` is roughly the time to reach the target; the approach is
//! frame-rate independent because every step integrates over `delta`.

use std::f32::consts::{PI, TAU};

/// Values closer than this to their target snap onto it.
pub const SNAP_EPSILON: f32 = 1e-3;

/// A value eased toward a moving target, with its spring velocity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Damped {
    pub value: f32,
    pub velocity: f32,
}

impl Damped {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            velocity: 0.0,
        }
    }

    /// Step toward `target`. Returns true while still moving.
    pub fn step(&mut self, target: f32, smooth_time: f32, delta: f32) -> bool {
        if delta <= 0.0 {
            return false;
        }
        if (self.value - target).abs() <= SNAP_EPSILON {
            self.value = target;
            self.velocity = 0.0;
            return false;
        }

        let smooth_time = smooth_time.max(1e-4);
        let omega = 2.0 / smooth_time;
        let decay = exp_decay(omega * delta);
        let change = self.value - target;
        let temp = (self.velocity + omega * change) * delta;
        self.velocity = (self.velocity - omega * temp) * decay;
        let mut output = target + (change + temp) * decay;

        // Never overshoot.
        if (target - self.value > 0.0) == (output > target) {
            output = target;
            self.velocity = 0.0;
        }
        self.value = output;
        true
    }

    /// Step toward `target` along the shortest arc.
    ///
    /// On arrival the value snaps to `target` itself, not to an equivalent
    /// angle a full turn away.
    pub fn step_angle(&mut self, target: f32, smooth_time: f32, delta: f32) -> bool {
        if delta <= 0.0 {
            return false;
        }
        let offset = delta_angle(self.value, target);
        if offset.abs() <= SNAP_EPSILON {
            self.value = target;
            self.velocity = 0.0;
            return false;
        }
        self.step(self.value + offset, smooth_time, delta)
    }
}

/// Rational approximation of `e^-x`.
fn exp_decay(x: f32) -> f32 {
    1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x)
}

/// Signed shortest angular distance from `current` to `target`, in (-π, π].
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let mut delta = (target - current).rem_euclid(TAU);
    if delta > PI {
        delta -= TAU;
    }
    delta
}

/// Eases a value by a fixed fraction per reference frame, scaled to `delta`.
///
/// At `delta = 1 / reference_fps` this is a plain `lerp(current, target, rate)`.
pub fn lerp_toward(current: f32, target: f32, rate: f32, reference_fps: f32, delta: f32) -> f32 {
    if delta <= 0.0 {
        return current;
    }
    let t = 1.0 - (1.0 - rate.clamp(0.0, 1.0)).powf(delta * reference_fps);
    current + (target - current) * t
}
