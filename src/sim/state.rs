use nalgebra::{Rotation3, UnitQuaternion, Vector3};

use crate::math::forward_of;

// ---------------------------------------------------------------------------
// Rigid-body state: position, velocity, attitude, angular rate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct BodyState {
    pub time: f64,
    pub pos: Vector3<f64>,         // m, world
    pub vel: Vector3<f64>,         // m/s, world
    pub quat: UnitQuaternion<f64>, // body -> world
    pub omega: Vector3<f64>,       // rad/s, world
}

impl BodyState {
    pub fn at_rest(pos: Vector3<f64>, quat: UnitQuaternion<f64>) -> Self {
        Self { time: 0.0, pos, vel: Vector3::zeros(), quat, omega: Vector3::zeros() }
    }

    pub fn apply(&self, d: &Deriv, dt: f64) -> BodyState {
        BodyState {
            time: self.time + dt,
            pos: self.pos + d.dpos * dt,
            vel: self.vel + d.dvel * dt,
            quat: self.quat,
            omega: self.omega,
        }
    }

    pub fn orientation(&self) -> Rotation3<f64> {
        self.quat.to_rotation_matrix()
    }

    /// Nose direction in world space.
    pub fn forward(&self) -> Vector3<f64> {
        forward_of(&self.orientation())
    }

    pub fn speed(&self) -> f64 {
        self.vel.norm()
    }
}

// ---------------------------------------------------------------------------
// State derivative
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Deriv {
    pub dpos: Vector3<f64>,
    pub dvel: Vector3<f64>,
}

// ---------------------------------------------------------------------------
// Simulation config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub dt: f64,
    pub max_time: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0, // one autopilot tick
            max_time: 120.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_attitude_faces_negative_z() {
        let s = BodyState::at_rest(Vector3::zeros(), UnitQuaternion::identity());
        assert!((s.forward() - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn apply_moves_position_and_velocity_only() {
        let s = BodyState::at_rest(Vector3::zeros(), UnitQuaternion::identity());
        let d = Deriv { dpos: Vector3::new(1.0, 0.0, 0.0), dvel: Vector3::new(0.0, 2.0, 0.0) };
        let next = s.apply(&d, 0.5);
        assert_eq!(next.pos, Vector3::new(0.5, 0.0, 0.0));
        assert_eq!(next.vel, Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(next.quat, s.quat);
        assert!((next.time - 0.5).abs() < 1e-15);
    }
}
