use nalgebra::{Rotation3, Vector3};

// ---------------------------------------------------------------------------
// Frame convention
// ---------------------------------------------------------------------------
//
// Orientation matrices map body coordinates to world coordinates. Their
// columns are the body axes expressed in world space:
//   column 0 = Right (+X), column 1 = Up (+Y), column 2 = Backward (+Z).
// Forward is therefore -Z.

/// Vectors shorter than this are treated as zero.
pub const ZERO_EPSILON: f64 = 1e-9;

pub fn forward() -> Vector3<f64> {
    Vector3::new(0.0, 0.0, -1.0)
}

pub fn backward() -> Vector3<f64> {
    Vector3::new(0.0, 0.0, 1.0)
}

pub fn up() -> Vector3<f64> {
    Vector3::new(0.0, 1.0, 0.0)
}

pub fn right() -> Vector3<f64> {
    Vector3::new(1.0, 0.0, 0.0)
}

pub fn is_zero(v: &Vector3<f64>) -> bool {
    v.norm() < ZERO_EPSILON
}

/// Unit vector along `v`, or zero when `v` has no usable direction.
pub fn safe_normalize(v: &Vector3<f64>) -> Vector3<f64> {
    let n = v.norm();
    if n < ZERO_EPSILON || !n.is_finite() {
        Vector3::zeros()
    } else {
        v / n
    }
}

/// Unsigned angle between two vectors (rad). Zero if either is zero.
pub fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let denom = a.norm() * b.norm();
    if denom < ZERO_EPSILON * ZERO_EPSILON || !denom.is_finite() {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

/// World-space forward axis of an orientation.
pub fn forward_of(orientation: &Rotation3<f64>) -> Vector3<f64> {
    orientation * forward()
}

/// Rotate a world vector into the body frame of `orientation`.
pub fn to_local(orientation: &Rotation3<f64>, world: &Vector3<f64>) -> Vector3<f64> {
    orientation.inverse() * world
}

/// Orientation whose forward axis points along `dir`, with `up_hint` used to
/// fix roll. Falls back to another hint when the two are parallel.
pub fn facing(dir: &Vector3<f64>, up_hint: &Vector3<f64>) -> Rotation3<f64> {
    let hint = if safe_normalize(dir).cross(&safe_normalize(up_hint)).norm() < 1e-6 {
        backward()
    } else {
        *up_hint
    };
    // face_towards aligns local +Z with its argument; forward is -Z.
    Rotation3::face_towards(&(-dir), &hint)
}

/// Finite in every component.
pub fn is_finite(v: &Vector3<f64>) -> bool {
    v.iter().all(|c| c.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn angle_between_perpendicular() {
        assert_relative_eq!(angle_between(&forward(), &up()), FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn angle_between_zero_vector_is_zero() {
        assert_eq!(angle_between(&Vector3::zeros(), &up()), 0.0);
    }

    #[test]
    fn facing_points_forward_along_direction() {
        let dir = Vector3::new(1.0, 0.0, 0.0);
        let r = facing(&dir, &up());
        assert_relative_eq!(forward_of(&r), dir, epsilon = 1e-12);
        assert_relative_eq!(r * up(), up(), epsilon = 1e-12);
    }

    #[test]
    fn facing_straight_up_does_not_degenerate() {
        let r = facing(&up(), &up());
        assert_relative_eq!(forward_of(&r), up(), epsilon = 1e-12);
        assert!(r.matrix().iter().all(|c| c.is_finite()));
    }

    #[test]
    fn safe_normalize_zero() {
        assert_eq!(safe_normalize(&Vector3::zeros()), Vector3::zeros());
    }
}
