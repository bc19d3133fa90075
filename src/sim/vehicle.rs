use std::cell::RefCell;
use std::rc::Rc;

use nalgebra::{Rotation3, UnitQuaternion, Vector3};

use super::integrator::{rk4_step, Forces};
use super::state::BodyState;
use crate::host::{Gyroscope, Thruster, Vehicle};
use crate::math::{facing, forward_of};
use crate::systems::Direction;

// ---------------------------------------------------------------------------
// Simulated actuators
// ---------------------------------------------------------------------------

/// A thruster bolted to the hull. `mount` is body-relative.
#[derive(Debug, Clone)]
pub struct MountedThruster {
    pub mount: Rotation3<f64>,
    pub max_thrust: f64,
    pub output: f64,
    pub working: bool,
}

impl MountedThruster {
    /// A thruster that pushes the hull along `direction`.
    pub fn pushing(direction: Direction, max_thrust: f64) -> Self {
        let nozzle = -direction.body_vector();
        let hint = match direction {
            Direction::Up | Direction::Down => Vector3::z(),
            _ => Vector3::y(),
        };
        Self { mount: facing(&nozzle, &hint), max_thrust, output: 0.0, working: true }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MountedGyro {
    pub mount: Rotation3<f64>,
    /// Pitch/yaw/roll override in the gyro's own frame.
    pub rates: Vector3<f64>,
    pub overridden: bool,
}

/// Hull plus actuators, shared between the vehicle and its actuator handles.
#[derive(Debug)]
struct Rig {
    body: BodyState,
    thrusters: Vec<MountedThruster>,
    gyros: Vec<MountedGyro>,
}

type SharedRig = Rc<RefCell<Rig>>;

/// Host handle for one simulated thruster.
pub struct SimThruster {
    rig: SharedRig,
    index: usize,
}

impl Thruster for SimThruster {
    fn world_orientation(&self) -> Rotation3<f64> {
        let rig = self.rig.borrow();
        rig.body.orientation() * rig.thrusters[self.index].mount
    }

    fn is_working(&self) -> bool {
        self.rig.borrow().thrusters[self.index].working
    }

    fn max_effective_thrust(&self) -> f64 {
        self.rig.borrow().thrusters[self.index].max_thrust
    }

    fn thrust_override(&self) -> f64 {
        self.rig.borrow().thrusters[self.index].output
    }

    fn set_thrust_override(&mut self, value: f64) {
        let mut rig = self.rig.borrow_mut();
        let t = &mut rig.thrusters[self.index];
        t.output = value.max(0.0).min(t.max_thrust);
    }
}

/// Host handle for one simulated gyro.
pub struct SimGyro {
    rig: SharedRig,
    index: usize,
}

impl Gyroscope for SimGyro {
    fn world_orientation(&self) -> Rotation3<f64> {
        let rig = self.rig.borrow();
        rig.body.orientation() * rig.gyros[self.index].mount
    }

    fn set_override(&mut self, pitch: f64, yaw: f64, roll: f64) {
        let mut rig = self.rig.borrow_mut();
        let g = &mut rig.gyros[self.index];
        g.rates = Vector3::new(pitch, yaw, roll);
        g.overridden = true;
    }

    fn release_override(&mut self) {
        let mut rig = self.rig.borrow_mut();
        let g = &mut rig.gyros[self.index];
        g.rates = Vector3::zeros();
        g.overridden = false;
    }
}

// ---------------------------------------------------------------------------
// Simulated vehicle
// ---------------------------------------------------------------------------

/// Point-mass hull with thrusters and gyros, integrated with RK4.
#[derive(Debug)]
pub struct SimVehicle {
    rig: SharedRig,
    mass: f64,
    cargo_mass: f64,
    gravity: Vector3<f64>,
    host_damping: f64,
    host_dampeners: bool,
    max_turn_rate: f64,
    tracked: Option<Vector3<f64>>,
}

impl SimVehicle {
    pub fn builder() -> SimVehicleBuilder {
        SimVehicleBuilder::new()
    }

    pub fn state(&self) -> BodyState {
        self.rig.borrow().body.clone()
    }

    /// Host handles for every thruster, in mount order.
    pub fn thruster_handles(&self) -> Vec<Box<dyn Thruster>> {
        (0..self.rig.borrow().thrusters.len())
            .map(|index| Box::new(SimThruster { rig: self.rig.clone(), index }) as Box<dyn Thruster>)
            .collect()
    }

    pub fn gyro_handles(&self) -> Vec<Box<dyn Gyroscope>> {
        (0..self.rig.borrow().gyros.len())
            .map(|index| Box::new(SimGyro { rig: self.rig.clone(), index }) as Box<dyn Gyroscope>)
            .collect()
    }

    pub fn thruster(&self, index: usize) -> Option<MountedThruster> {
        self.rig.borrow().thrusters.get(index).cloned()
    }

    pub fn gyro(&self, index: usize) -> Option<MountedGyro> {
        self.rig.borrow().gyros.get(index).cloned()
    }

    /// Knock a thruster out (or repair it). A broken thruster produces no
    /// force.
    pub fn set_thruster_working(&mut self, index: usize, working: bool) {
        if let Some(t) = self.rig.borrow_mut().thrusters.get_mut(index) {
            t.working = working;
        }
    }

    pub fn set_tracked_position(&mut self, position: Option<Vector3<f64>>) {
        self.tracked = position;
    }

    pub fn host_dampeners_enabled(&self) -> bool {
        self.host_dampeners
    }

    /// Net thruster force in world space.
    pub fn thrust_force(&self) -> Vector3<f64> {
        let rig = self.rig.borrow();
        let orientation = rig.body.orientation();
        rig.thrusters
            .iter()
            .filter(|t| t.working)
            .map(|t| -forward_of(&(orientation * t.mount)) * t.output)
            .sum()
    }

    /// World angular velocity requested by the gyros, averaged over the
    /// overridden ones and limited to the hull's turn rate.
    pub fn gyro_rate(&self) -> Vector3<f64> {
        let rig = self.rig.borrow();
        let orientation = rig.body.orientation();
        let active: Vec<Vector3<f64>> = rig
            .gyros
            .iter()
            .filter(|g| g.overridden)
            .map(|g| -(orientation * g.mount * g.rates))
            .collect();
        if active.is_empty() {
            return Vector3::zeros();
        }
        let mean: Vector3<f64> = active.iter().sum::<Vector3<f64>>() / active.len() as f64;
        let rate = mean.norm();
        if rate > self.max_turn_rate {
            mean * (self.max_turn_rate / rate)
        } else {
            mean
        }
    }

    /// Advance the hull by `dt` under the current actuator outputs.
    pub fn step(&mut self, dt: f64) {
        let forces = Forces {
            thrust: self.thrust_force(),
            gravity: self.gravity,
            mass: self.mass,
            damping: if self.host_dampeners { self.host_damping } else { 0.0 },
        };
        let omega = self.gyro_rate();
        let mut rig = self.rig.borrow_mut();
        rig.body.omega = omega;
        let next = rk4_step(&rig.body, &forces, dt);
        rig.body = next;
    }
}

impl Vehicle for SimVehicle {
    fn orientation(&self) -> Rotation3<f64> {
        self.rig.borrow().body.orientation()
    }

    fn position(&self) -> Vector3<f64> {
        self.rig.borrow().body.pos
    }

    fn linear_velocity(&self) -> Vector3<f64> {
        self.rig.borrow().body.vel
    }

    fn natural_gravity(&self) -> Vector3<f64> {
        self.gravity
    }

    fn physical_mass(&self) -> f64 {
        self.mass
    }

    fn total_mass(&self) -> f64 {
        self.mass + self.cargo_mass
    }

    fn set_dampeners_enabled(&mut self, enabled: bool) {
        self.host_dampeners = enabled;
    }

    fn tracked_position(&self) -> Option<Vector3<f64>> {
        self.tracked
    }
}

// ---------------------------------------------------------------------------
// Vehicle builder
// ---------------------------------------------------------------------------

pub struct SimVehicleBuilder {
    mass: f64,
    cargo_mass: f64,
    gravity: Vector3<f64>,
    position: Vector3<f64>,
    velocity: Vector3<f64>,
    attitude: UnitQuaternion<f64>,
    host_damping: f64,
    max_turn_rate: f64,
    thrusters: Vec<MountedThruster>,
    gyros: Vec<MountedGyro>,
}

impl SimVehicleBuilder {
    pub fn new() -> Self {
        Self {
            mass: 1000.0,
            cargo_mass: 0.0,
            gravity: Vector3::zeros(),
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            attitude: UnitQuaternion::identity(),
            host_damping: 0.5,
            max_turn_rate: std::f64::consts::PI,
            thrusters: Vec::new(),
            gyros: Vec::new(),
        }
    }

    pub fn mass(mut self, v: f64) -> Self { self.mass = v; self }
    pub fn cargo_mass(mut self, v: f64) -> Self { self.cargo_mass = v; self }
    pub fn gravity(mut self, v: Vector3<f64>) -> Self { self.gravity = v; self }
    pub fn position(mut self, v: Vector3<f64>) -> Self { self.position = v; self }
    pub fn velocity(mut self, v: Vector3<f64>) -> Self { self.velocity = v; self }
    pub fn attitude(mut self, v: UnitQuaternion<f64>) -> Self { self.attitude = v; self }
    pub fn host_damping(mut self, v: f64) -> Self { self.host_damping = v; self }
    pub fn max_turn_rate(mut self, v: f64) -> Self { self.max_turn_rate = v; self }

    pub fn thruster(mut self, t: MountedThruster) -> Self {
        self.thrusters.push(t);
        self
    }

    /// `per_direction` thrusters of `max_thrust` on each of the six axes.
    pub fn six_axis_thrusters(mut self, per_direction: usize, max_thrust: f64) -> Self {
        for d in Direction::ALL {
            for _ in 0..per_direction {
                self.thrusters.push(MountedThruster::pushing(d, max_thrust));
            }
        }
        self
    }

    pub fn gyro(mut self, mount: Rotation3<f64>) -> Self {
        self.gyros.push(MountedGyro { mount, ..Default::default() });
        self
    }

    pub fn build(self) -> SimVehicle {
        let mut body = BodyState::at_rest(self.position, self.attitude);
        body.vel = self.velocity;
        SimVehicle {
            rig: Rc::new(RefCell::new(Rig { body, thrusters: self.thrusters, gyros: self.gyros })),
            mass: self.mass,
            cargo_mass: self.cargo_mass,
            gravity: self.gravity,
            host_damping: self.host_damping,
            host_dampeners: true,
            max_turn_rate: self.max_turn_rate,
            tracked: None,
        }
    }
}

impl Default for SimVehicleBuilder {
    fn default() -> Self {
        Self::new()
    }
}
