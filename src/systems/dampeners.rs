use nalgebra::{Rotation3, Vector3};

use super::direction::Direction;
use crate::math::safe_normalize;

// ---------------------------------------------------------------------------
// Closed-loop dampening: counter gravity and arrest current velocity
// ---------------------------------------------------------------------------

/// Per-axis breakdown of one dampener evaluation. Axis order everywhere is
/// (right, up, forward).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DampenerSolution {
    /// Force needed to hover: mass * |gravity|.
    pub required_hover_thrust: f64,
    /// Share of hover thrust each axis must carry: -dot(axis, gravity_hat).
    pub gravity_ratio: Vector3<f64>,
    /// Velocity along each body axis.
    pub axis_velocity: Vector3<f64>,
    /// mass * axis velocity.
    pub arrest: Vector3<f64>,
    /// Signed thrust to command per axis.
    pub thrust: Vector3<f64>,
}

impl DampenerSolution {
    pub fn compute(
        mass: f64,
        gravity: &Vector3<f64>,
        velocity: &Vector3<f64>,
        orientation: &Rotation3<f64>,
    ) -> Self {
        let gravity_dir = safe_normalize(gravity);
        let required_hover_thrust = mass * gravity.norm();

        let axes = [
            Direction::Right.world_vector(orientation),
            Direction::Up.world_vector(orientation),
            Direction::Forward.world_vector(orientation),
        ];

        let mut out = DampenerSolution { required_hover_thrust, ..Default::default() };
        for (i, axis) in axes.iter().enumerate() {
            let ratio = -safe_normalize(axis).dot(&gravity_dir);
            let along = velocity.dot(axis);
            out.gravity_ratio[i] = ratio;
            out.axis_velocity[i] = along;
            out.arrest[i] = mass * along;
            out.thrust[i] = required_hover_thrust * ratio - out.arrest[i];
        }
        out
    }

    /// The three signed requests, keyed by the positive direction of each
    /// axis. Negative values flip to the opposite pool.
    pub fn requests(&self) -> [(Direction, f64); 3] {
        [
            (Direction::Right, self.thrust.x),
            (Direction::Up, self.thrust.y),
            (Direction::Forward, self.thrust.z),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn hover_in_gravity_at_rest() {
        let s = DampenerSolution::compute(
            1000.0,
            &Vector3::new(0.0, -9.81, 0.0),
            &Vector3::zeros(),
            &Rotation3::identity(),
        );
        assert_relative_eq!(s.required_hover_thrust, 9810.0, epsilon = 1e-9);
        assert_relative_eq!(s.thrust, Vector3::new(0.0, 9810.0, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn arrests_forward_motion_in_space() {
        let s = DampenerSolution::compute(
            50.0,
            &Vector3::zeros(),
            &Vector3::new(0.0, 0.0, -4.0), // moving forward
            &Rotation3::identity(),
        );
        assert_eq!(s.required_hover_thrust, 0.0);
        assert_relative_eq!(s.axis_velocity.z, 4.0, epsilon = 1e-12);
        // Brake: negative forward request -> back thrusters
        assert_relative_eq!(s.thrust, Vector3::new(0.0, 0.0, -200.0), epsilon = 1e-12);
        assert_eq!(s.requests()[2], (Direction::Forward, s.thrust.z));
    }

    #[test]
    fn nose_down_vehicle_splits_hover_thrust() {
        // Pitched 90 deg down: forward points along gravity.
        let orientation = Rotation3::from_axis_angle(&Vector3::x_axis(), -std::f64::consts::FRAC_PI_2);
        let s = DampenerSolution::compute(
            10.0,
            &Vector3::new(0.0, -10.0, 0.0),
            &Vector3::zeros(),
            &orientation,
        );
        assert_relative_eq!(s.gravity_ratio.z, -1.0, epsilon = 1e-9);
        assert_relative_eq!(s.thrust.z, -100.0, epsilon = 1e-9);
        assert_relative_eq!(s.thrust.y, 0.0, epsilon = 1e-9);
    }
}
