use nalgebra::Vector3;

use crate::math::{is_zero, safe_normalize};

// ---------------------------------------------------------------------------
// Stopping-distance physics along the current thrust axis
// ---------------------------------------------------------------------------

/// Deceleration the opposite pool can produce, as a negative acceleration
/// (m/s^2). Zero when the mass is unusable.
pub fn braking_speed(opposite_capacity: f64, mass: f64) -> f64 {
    if mass <= 0.0 || !mass.is_finite() || !opposite_capacity.is_finite() {
        return 0.0;
    }
    -(opposite_capacity / mass)
}

/// Component of gravity along `heading_axis`: dot(g_hat, axis) * |g|.
pub fn gravity_effect(gravity: &Vector3<f64>, heading_axis: &Vector3<f64>) -> f64 {
    safe_normalize(gravity).dot(heading_axis) * gravity.norm()
}

/// Distance covered along the heading before the closing speed reaches
/// zero under constant net acceleration `braking + gravity`.
///
/// `speed` is the velocity component along the heading; motion away from
/// the heading counts as zero. With no net deceleration the vehicle never
/// stops, so the result is infinite while it is closing. Non-finite
/// inputs yield NaN.
pub fn stopping_displacement(speed: f64, braking: f64, gravity: f64) -> f64 {
    let a = braking + gravity;
    if !speed.is_finite() || !a.is_finite() {
        return f64::NAN;
    }
    let v = speed.max(0.0);
    if v == 0.0 {
        return 0.0;
    }
    if a >= 0.0 {
        return f64::INFINITY;
    }
    let t = v / a.abs();
    v * t + 0.5 * a * t * t
}

/// Where the vehicle comes to rest if it brakes now along its velocity.
/// Equal to `position` at rest; `None` when braking cannot stop it.
pub fn stopping_point(position: &Vector3<f64>, velocity: &Vector3<f64>, braking: f64) -> Option<Vector3<f64>> {
    if is_zero(velocity) {
        return Some(*position);
    }
    let distance = stopping_displacement(velocity.norm(), braking, 0.0);
    if !distance.is_finite() {
        return None;
    }
    Some(position + safe_normalize(velocity) * distance)
}
