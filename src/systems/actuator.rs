use nalgebra::{Rotation3, Vector3};

use super::direction::Direction;
use crate::host::{Gyroscope, Thruster};
use crate::math::forward_of;

// ---------------------------------------------------------------------------
// Thruster adapter
// ---------------------------------------------------------------------------

/// Cosine above which two axes count as the same direction.
const AXIS_MATCH: f64 = 1.0 - 1e-6;

/// Which pool a thruster belongs to, from its nozzle axis relative to the
/// vehicle's base frame. `None` if it is not aligned with any body axis.
pub fn classify(thruster_orientation: &Rotation3<f64>, base: &Rotation3<f64>) -> Option<Direction> {
    let push = -forward_of(thruster_orientation);
    Direction::ALL
        .iter()
        .copied()
        .find(|d| d.world_vector(base).dot(&push) > AXIS_MATCH)
}

pub struct ControllableThruster {
    inner: Box<dyn Thruster>,
    direction: Direction,
}

impl std::fmt::Debug for ControllableThruster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllableThruster")
            .field("direction", &self.direction)
            .field("max", &self.max_thrust())
            .field("current", &self.current_thrust())
            .finish()
    }
}

impl ControllableThruster {
    pub fn new(inner: Box<dyn Thruster>, direction: Direction) -> Self {
        Self { inner, direction }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Zero while the thruster is not functional.
    pub fn max_thrust(&self) -> f64 {
        if !self.inner.is_working() {
            return 0.0;
        }
        self.inner.max_effective_thrust().max(0.0)
    }

    pub fn current_thrust(&self) -> f64 {
        if !self.inner.is_working() {
            return 0.0;
        }
        self.inner.thrust_override()
    }

    /// Negative and non-finite values are ignored.
    pub fn set_thrust(&mut self, value: f64) {
        if value < 0.0 || !value.is_finite() {
            return;
        }
        self.inner.set_thrust_override(value);
    }
}

// ---------------------------------------------------------------------------
// Gyro adapter
// ---------------------------------------------------------------------------

pub struct ControllableGyro {
    inner: Box<dyn Gyroscope>,
}

impl std::fmt::Debug for ControllableGyro {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllableGyro").finish_non_exhaustive()
    }
}

impl ControllableGyro {
    pub fn new(inner: Box<dyn Gyroscope>) -> Self {
        Self { inner }
    }

    /// Project a world-space rotation vector into this gyro's frame and
    /// command it. X/Y/Z of the local vector drive pitch/yaw/roll.
    pub fn apply_world_rotation(&mut self, world: &Vector3<f64>) {
        let local = self.inner.world_orientation().inverse() * world;
        self.inner.set_override(local.x, local.y, local.z);
    }

    pub fn release(&mut self) {
        self.inner.set_override(0.0, 0.0, 0.0);
        self.inner.release_override();
    }
}
