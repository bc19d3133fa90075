use nalgebra::{UnitQuaternion, Vector3};

use super::state::{BodyState, Deriv};

// ---------------------------------------------------------------------------
// Translational RK4 with forces held constant over the step
// ---------------------------------------------------------------------------

/// Everything acting on the body during one step.
#[derive(Debug, Clone, Copy)]
pub struct Forces {
    /// Sum of thruster forces, N, world.
    pub thrust: Vector3<f64>,
    /// Gravitational acceleration, m/s^2, world.
    pub gravity: Vector3<f64>,
    pub mass: f64,
    /// Linear drag rate of the host's own dampeners, 1/s. Zero when off.
    pub damping: f64,
}

pub fn derivatives(state: &BodyState, forces: &Forces) -> Deriv {
    let accel = if forces.mass > 0.0 { forces.thrust / forces.mass } else { Vector3::zeros() };
    Deriv {
        dpos: state.vel,
        dvel: accel + forces.gravity - state.vel * forces.damping,
    }
}

/// Single RK4 step. Attitude advances by the (constant) body rate.
pub fn rk4_step(state: &BodyState, forces: &Forces, dt: f64) -> BodyState {
    let k1 = derivatives(state, forces);
    let k2 = derivatives(&state.apply(&k1, dt * 0.5), forces);
    let k3 = derivatives(&state.apply(&k2, dt * 0.5), forces);
    let k4 = derivatives(&state.apply(&k3, dt), forces);

    let spin = UnitQuaternion::new(state.omega * dt);

    BodyState {
        time: state.time + dt,
        pos: state.pos + (k1.dpos + 2.0 * k2.dpos + 2.0 * k3.dpos + k4.dpos) * (dt / 6.0),
        vel: state.vel + (k1.dvel + 2.0 * k2.dvel + 2.0 * k3.dvel + k4.dvel) * (dt / 6.0),
        quat: spin * state.quat,
        omega: state.omega,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn still() -> BodyState {
        BodyState::at_rest(Vector3::zeros(), UnitQuaternion::identity())
    }

    #[test]
    fn constant_thrust_is_exact() {
        let forces = Forces { thrust: Vector3::new(100.0, 0.0, 0.0), gravity: Vector3::zeros(), mass: 50.0, damping: 0.0 };
        let mut s = still();
        for _ in 0..100 {
            s = rk4_step(&s, &forces, 0.01);
        }
        // x = a t^2 / 2 with a = 2, t = 1
        assert_relative_eq!(s.pos.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(s.vel.x, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn damping_decays_velocity() {
        let forces = Forces { thrust: Vector3::zeros(), gravity: Vector3::zeros(), mass: 1.0, damping: 1.0 };
        let mut s = still();
        s.vel = Vector3::new(10.0, 0.0, 0.0);
        for _ in 0..100 {
            s = rk4_step(&s, &forces, 0.01);
        }
        assert_relative_eq!(s.vel.x, 10.0 * (-1.0_f64).exp(), epsilon = 1e-6);
    }

    #[test]
    fn body_rate_turns_attitude() {
        let forces = Forces { thrust: Vector3::zeros(), gravity: Vector3::zeros(), mass: 1.0, damping: 0.0 };
        let mut s = still();
        s.omega = Vector3::new(0.0, -std::f64::consts::FRAC_PI_2, 0.0);
        for _ in 0..100 {
            s = rk4_step(&s, &forces, 0.01);
        }
        // A quarter turn clockwise about +Y points the nose at +X.
        assert_relative_eq!(s.forward(), Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-9);
        let norm = s.quat.quaternion().norm();
        assert!((norm - 1.0).abs() < 1e-9, "quaternion norm drifted to {}", norm);
    }
}
