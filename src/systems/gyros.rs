use nalgebra::Vector3;
use tracing::{debug, info, warn};

use super::actuator::ControllableGyro;
use super::arena::{ActuatorId, Arena};
use crate::control::{AttitudeAlgorithm, OrientationCommand, OrientationOverride, PidGains};
use crate::events::{EventQueue, FlightEvent};
use crate::host::{Gyroscope, Vehicle};
use crate::math::is_finite;

// ---------------------------------------------------------------------------
// Gyro bank: heading -> solver -> PIDs -> every gyro's local frame
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct GyroBank {
    gyros: Arena<ControllableGyro>,
    orientation: OrientationOverride,
    algorithm: AttitudeAlgorithm,
    target: Option<Vector3<f64>>,
    tracking: bool,
    last_command: Option<OrientationCommand>,
    events: EventQueue,
    closed: bool,
}

impl GyroBank {
    pub fn new(gains: &PidGains, dt: f64) -> Self {
        Self {
            gyros: Arena::new(),
            orientation: OrientationOverride::new(gains, dt),
            algorithm: AttitudeAlgorithm::default(),
            target: None,
            tracking: false,
            last_command: None,
            events: EventQueue::default(),
            closed: false,
        }
    }

    pub fn attach(&mut self, gyro: Box<dyn Gyroscope>) -> Option<ActuatorId> {
        if self.closed {
            return None;
        }
        let id = self.gyros.add(ControllableGyro::new(gyro));
        debug!(%id, "gyro staged");
        Some(id)
    }

    pub fn detach(&mut self, id: ActuatorId) {
        if self.closed {
            return;
        }
        self.gyros.remove(id);
    }

    pub fn gyro_count(&self) -> usize {
        self.gyros.len()
    }

    /// Point the vehicle at a fixed world position. Leaves tracking mode.
    pub fn set_target_heading(&mut self, position: Vector3<f64>) {
        if self.closed {
            return;
        }
        if !is_finite(&position) {
            warn!(?position, "ignoring non-finite heading target");
            return;
        }
        self.target = Some(position);
        self.tracking = false;
    }

    /// Follow the host's tracked position, re-read every tick.
    pub fn use_tracking_mode(&mut self) {
        if self.closed {
            return;
        }
        info!("gyro bank tracking external position");
        self.tracking = true;
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn target_heading(&self) -> Option<Vector3<f64>> {
        self.target
    }

    pub fn algorithm(&self) -> AttitudeAlgorithm {
        self.algorithm
    }

    pub fn set_algorithm(&mut self, algorithm: AttitudeAlgorithm) {
        self.algorithm = algorithm;
    }

    /// Filtered rates sent on the last tick that had a heading.
    pub fn last_command(&self) -> Option<OrientationCommand> {
        self.last_command
    }

    pub fn take_events(&mut self) -> Vec<FlightEvent> {
        self.events.take()
    }

    fn apply_pending(&mut self) {
        if !self.gyros.has_pending() {
            return;
        }
        let applied = self.gyros.apply_pending();
        for id in applied.added {
            self.events.push(FlightEvent::GyroAttached { id });
        }
        for (id, _) in applied.removed {
            debug!(%id, "gyro detached");
            self.events.push(FlightEvent::GyroDetached { id });
        }
    }

    fn heading(&self, vehicle: &dyn Vehicle) -> Option<Vector3<f64>> {
        if self.tracking {
            vehicle.tracked_position().filter(is_finite)
        } else {
            self.target
        }
    }

    pub fn update(&mut self, _tick: u64, vehicle: &dyn Vehicle) {
        if self.closed {
            return;
        }
        self.apply_pending();
        let Some(heading) = self.heading(vehicle) else {
            return;
        };

        let orientation = vehicle.orientation();
        let desired_forward = heading - vehicle.position();
        // Away from gravity; zero in space, where roll is left free.
        let desired_up = -vehicle.natural_gravity();
        if !is_finite(&desired_forward) || !is_finite(&desired_up) {
            warn!("ignoring non-finite kinematics in gyro update");
            return;
        }

        let solved = self.algorithm.solve(&desired_forward, &desired_up, &orientation);
        self.orientation.set(solved);
        let rates = self.orientation.filtered();
        if !rates.is_finite() {
            warn!(?rates, "solver produced non-finite rates, skipping tick");
            return;
        }

        let body = Vector3::new(-rates.pitch, rates.yaw, rates.roll);
        let world = orientation * body;
        for (_, gyro) in self.gyros.iter_mut() {
            gyro.apply_world_rotation(&world);
        }
        self.last_command = Some(rates);
    }

    /// Drop the heading, leave tracking mode and release every gyro.
    pub fn reset(&mut self) {
        if self.closed {
            return;
        }
        self.target = None;
        self.tracking = false;
        self.last_command = None;
        self.orientation.reset();
        for (_, gyro) in self.gyros.iter_mut() {
            gyro.release();
        }
    }

    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.reset();
        let count = self.gyros.drain().len();
        self.closed = true;
        info!(count, "gyro bank closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
