use std::fmt;

use nalgebra::{Rotation3, Vector3};
use tracing::{debug, info, warn};

use super::command::Command;
use super::kinematics::{braking_speed, gravity_effect, stopping_displacement, stopping_point};
use super::patrol::PatrolRoute;
use super::state::{BotState, EngagementPattern};
use crate::config::AutopilotConfig;
use crate::error::{CommandError, ConfigError, RouteError};
use crate::events::{EventQueue, FlightEvent};
use crate::host::{Gyroscope, StatusSink, Thruster, Vehicle};
use crate::math::is_finite;
use crate::systems::{ActuatorId, DampenerSolution, Direction, GyroBank, ThrustAllocator, ThrustPower};

// ---------------------------------------------------------------------------
// Telemetry
// ---------------------------------------------------------------------------

/// Snapshot taken at the end of every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Telemetry {
    pub tick: u64,
    pub state: BotState,
    pub pattern: EngagementPattern,
    /// Distance left to the stand-off point; 0 while idle.
    pub distance: f64,
    /// Predicted stopping distance along the thrust axis; 0 while idle.
    pub displacement: f64,
    pub target: Option<Vector3<f64>>,
    pub stopping_point: Option<Vector3<f64>>,
    pub total_mass: f64,
    pub physical_mass: f64,
    pub gravity: f64,
    /// Dampener terms, axis order (right, up, forward).
    pub dampening: DampenerSolution,
}

impl fmt::Display for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.dampening;
        writeln!(f, "Distance: {:.2}", self.distance)?;
        writeln!(f, "Displacement: {:.2}", self.displacement)?;
        writeln!(f, "Bot State: {}", self.state)?;
        writeln!(f, "Pattern: {}", self.pattern)?;
        writeln!(f, "::: Dampeners :::")?;
        writeln!(f, "Total Mass: {:.1}", self.total_mass)?;
        writeln!(f, "Grid Mass: {:.1}", self.physical_mass)?;
        writeln!(f, "Gravity Length: {:.3}", self.gravity)?;
        writeln!(f, "Required Thrust: {:.1}", d.required_hover_thrust)?;
        writeln!(f)?;
        writeln!(f, "Forward Velocity: {:.3}", d.axis_velocity.z)?;
        writeln!(f, "Up Velocity: {:.3}", d.axis_velocity.y)?;
        writeln!(f, "Right Velocity: {:.3}", d.axis_velocity.x)?;
        writeln!(f)?;
        writeln!(f, "Forward Arrest: {:.1}", d.arrest.z)?;
        writeln!(f, "Up Arrest: {:.1}", d.arrest.y)?;
        write!(f, "Right Arrest: {:.1}", d.arrest.x)
    }
}

// ---------------------------------------------------------------------------
// Navigation state machine
// ---------------------------------------------------------------------------

/// Owns the thrust engine, the gyro bank and the patrol route, and turns a
/// target plus live kinematics into actuator commands once per tick.
#[derive(Debug)]
pub struct Autopilot {
    config: AutopilotConfig,
    thrusters: ThrustAllocator,
    gyros: GyroBank,
    route: PatrolRoute,
    state: BotState,
    pattern: EngagementPattern,
    engagement_range: f64,
    target: Option<Vector3<f64>>,
    tracking: bool,
    thrust_direction: Direction,
    events: EventQueue,
    telemetry: Option<Telemetry>,
    closed: bool,
}

impl Autopilot {
    pub fn new(config: AutopilotConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let route = PatrolRoute::new(config.patrol_route.clone())
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let mut thrusters = ThrustAllocator::new(config.dampener_interval_ticks);
        thrusters.set_axis_remap(config.axis_remap);
        let mut gyros = GyroBank::new(&config.gyro_pid, config.dt());
        gyros.set_algorithm(config.attitude_algorithm);

        Ok(Self {
            engagement_range: config.engagement_range,
            thrusters,
            gyros,
            route,
            state: BotState::default(),
            pattern: EngagementPattern::default(),
            target: None,
            tracking: false,
            thrust_direction: Direction::Forward,
            events: EventQueue::default(),
            telemetry: None,
            closed: false,
            config,
        })
    }

    // -- accessors -----------------------------------------------------------

    pub fn config(&self) -> &AutopilotConfig {
        &self.config
    }

    pub fn state(&self) -> BotState {
        self.state
    }

    pub fn pattern(&self) -> EngagementPattern {
        self.pattern
    }

    pub fn engagement_range(&self) -> f64 {
        self.engagement_range
    }

    pub fn target(&self) -> Option<Vector3<f64>> {
        self.target
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn thrust_direction(&self) -> Direction {
        self.thrust_direction
    }

    /// Axis the vehicle accelerates along toward its target.
    pub fn set_thrust_direction(&mut self, direction: Direction) {
        self.thrust_direction = direction;
    }

    pub fn telemetry(&self) -> Option<&Telemetry> {
        self.telemetry.as_ref()
    }

    pub fn thrusters(&self) -> &ThrustAllocator {
        &self.thrusters
    }

    pub fn thrusters_mut(&mut self) -> &mut ThrustAllocator {
        &mut self.thrusters
    }

    pub fn gyros(&self) -> &GyroBank {
        &self.gyros
    }

    pub fn gyros_mut(&mut self) -> &mut GyroBank {
        &mut self.gyros
    }

    pub fn route(&self) -> &PatrolRoute {
        &self.route
    }

    pub fn route_mut(&mut self) -> &mut PatrolRoute {
        &mut self.route
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Everything raised since the last call, in order.
    pub fn take_events(&mut self) -> Vec<FlightEvent> {
        self.events.take()
    }

    // -- actuators -----------------------------------------------------------

    pub fn attach_thruster(&mut self, thruster: Box<dyn Thruster>, base: &Rotation3<f64>) -> Option<ActuatorId> {
        self.thrusters.attach(thruster, base)
    }

    pub fn detach_thruster(&mut self, id: ActuatorId) {
        self.thrusters.detach(id);
    }

    pub fn attach_gyro(&mut self, gyro: Box<dyn Gyroscope>) -> Option<ActuatorId> {
        self.gyros.attach(gyro)
    }

    pub fn detach_gyro(&mut self, id: ActuatorId) {
        self.gyros.detach(id);
    }

    // -- commands ------------------------------------------------------------

    fn transition(&mut self, to: BotState) {
        if self.state == to {
            return;
        }
        info!(from = %self.state, %to, "state changed");
        self.events.push(FlightEvent::StateChanged { from: self.state, to });
        self.state = to;
    }

    fn set_pattern(&mut self, pattern: EngagementPattern) {
        if self.pattern == pattern {
            return;
        }
        debug!(%pattern, "engagement pattern changed");
        self.events.push(FlightEvent::EngagementPatternChanged(pattern));
        self.pattern = pattern;
    }

    /// Intercept `target` from whatever state the autopilot is in.
    pub fn acquire_target(&mut self, target: Vector3<f64>) {
        if self.closed {
            return;
        }
        if !is_finite(&target) {
            warn!(?target, "ignoring non-finite target");
            return;
        }
        self.target = Some(target);
        self.transition(BotState::Intercepting);
    }

    /// Fly the patrol route, closing all the way in on each waypoint.
    pub fn patrol(&mut self) {
        if self.closed {
            return;
        }
        self.engagement_range = 0.0;
        self.transition(BotState::Patrolling);
    }

    /// Back to `Waiting` with no target, no tracking and every actuator idle.
    pub fn reset(&mut self) {
        if self.closed {
            return;
        }
        self.gyros.reset();
        self.thrusters.reset_thrust();
        self.thrusters.disable_custom_dampeners();
        self.target = None;
        self.tracking = false;
        self.transition(BotState::Waiting);
        self.set_pattern(EngagementPattern::None);
        self.engagement_range = self.config.engagement_range;
    }

    /// Head for the host's tracked position instead of the stored target.
    pub fn track_external(&mut self) {
        if self.closed {
            return;
        }
        self.tracking = true;
        self.gyros.use_tracking_mode();
    }

    pub fn enable_damping(&mut self) {
        self.thrusters.enable_custom_dampeners();
    }

    pub fn force_forward_thrust(&mut self) {
        self.thrusters.set_thrust_power(Direction::Forward, ThrustPower::Full);
    }

    /// Intercept the route's waypoint `index` (zero-based).
    pub fn select_waypoint(&mut self, index: usize) -> Result<(), RouteError> {
        let node = self.route.node(index)?;
        self.acquire_target(node);
        Ok(())
    }

    pub fn execute(&mut self, command: Command) -> Result<(), CommandError> {
        match command {
            Command::Reset => self.reset(),
            Command::SelectWaypoint(n) => {
                let index = usize::from(n.saturating_sub(1));
                self.select_waypoint(index).map_err(|_| CommandError::WaypointOutOfRange(n))?;
            }
            Command::EnableDamping => self.enable_damping(),
            Command::TrackExternal => self.track_external(),
            Command::ForceForwardThrust => self.force_forward_thrust(),
            Command::Patrol => self.patrol(),
        }
        Ok(())
    }

    /// Parse and run one line from the command channel.
    pub fn handle_message(&mut self, message: &str) -> Result<Command, CommandError> {
        let command: Command = message.parse()?;
        debug!(?command, "command received");
        self.execute(command)?;
        Ok(command)
    }

    // -- tick ----------------------------------------------------------------

    fn advance_waypoint(&mut self) {
        let node = self.route.next_node();
        let waypoint = self.route.current_index();
        debug!(waypoint, ?node, "next patrol waypoint");
        self.target = Some(node);
        self.events.push(FlightEvent::WaypointAdvanced { waypoint });
    }

    /// Signed request along the thrust axis: positive accelerates, negative
    /// brakes through the opposite pool. The unused side is zeroed.
    fn drive(&mut self, signed: f64) {
        let axis = self.thrust_direction;
        if signed >= 0.0 {
            self.thrusters.set_thrust(axis.opposite(), 0.0);
        }
        self.thrusters.set_thrust(axis, signed);
    }

    fn full_ahead(&self) -> f64 {
        self.thrusters.max_effective_thrust(self.thrust_direction)
    }

    fn full_astern(&self) -> f64 {
        -self.thrusters.max_effective_thrust(self.thrust_direction.opposite())
    }

    /// Thrust engine, then gyros, then the state machine, then telemetry.
    pub fn update(&mut self, tick: u64, vehicle: &mut dyn Vehicle, status: &mut dyn StatusSink) {
        if self.closed {
            return;
        }
        self.thrusters.update(tick, vehicle);
        self.gyros.update(tick, &*vehicle);
        self.events.extend(self.thrusters.take_events());
        self.events.extend(self.gyros.take_events());

        let orientation = vehicle.orientation();
        let position = vehicle.position();
        let velocity = vehicle.linear_velocity();
        let gravity = vehicle.natural_gravity();
        let mass = vehicle.physical_mass();

        let heading_axis = self.thrust_direction.world_vector(&orientation);
        let braking = braking_speed(self.thrusters.max_effective_thrust(self.thrust_direction.opposite()), mass);

        let mut distance = 0.0;
        let mut displacement = 0.0;

        if !(is_finite(&position) && is_finite(&velocity) && is_finite(&gravity) && mass.is_finite()) {
            warn!(tick, "ignoring tick with non-finite vehicle kinematics");
        } else if self.state.is_active() || self.tracking {
            if self.state == BotState::Patrolling && self.target.is_none() {
                self.advance_waypoint();
            }

            let closing_speed = velocity.dot(&heading_axis);
            displacement = stopping_displacement(closing_speed, braking, gravity_effect(&gravity, &heading_axis));

            let aim = if self.tracking { vehicle.tracked_position().filter(is_finite) } else { self.target };
            if let Some(aim) = aim {
                if !self.tracking {
                    self.gyros.set_target_heading(aim);
                }
                distance = (aim - position).norm() - self.engagement_range;
                if distance.is_finite() && !displacement.is_nan() {
                    self.evaluate(distance, displacement, closing_speed);
                } else {
                    warn!(distance, displacement, "ignoring non-finite kinematics");
                }
            }
        }

        let telemetry = Telemetry {
            tick,
            state: self.state,
            pattern: self.pattern,
            distance,
            displacement,
            target: self.target,
            stopping_point: stopping_point(&position, &velocity, braking),
            total_mass: vehicle.total_mass(),
            physical_mass: mass,
            gravity: gravity.norm(),
            dampening: DampenerSolution::compute(mass, &gravity, &velocity, &orientation),
        };
        status.write_left(&self.thrusters.capacity_summary());
        status.write_right(&telemetry.to_string());
        self.telemetry = Some(telemetry);
    }

    fn evaluate(&mut self, distance: f64, displacement: f64, closing_speed: f64) {
        match self.state {
            BotState::Intercepting => {
                if displacement < distance {
                    self.drive(self.full_ahead());
                } else {
                    self.transition(BotState::Engaging);
                    self.drive(0.0);
                }
            }
            BotState::Engaging => {
                let buffer = self.engagement_range * self.config.engagement_buffer_ratio;
                // Outside the band: close in, braking once the stopping
                // distance covers the gap. Inside the range: back off
                // unless already moving away.
                if distance > buffer {
                    let signed = if displacement < distance { self.full_ahead() } else { self.full_astern() };
                    self.drive(signed);
                } else if distance < -buffer && closing_speed >= 0.0 {
                    self.drive(self.full_astern());
                } else {
                    self.drive(0.0);
                }

                if self.pattern == EngagementPattern::None {
                    self.set_pattern(EngagementPattern::Circling);
                    let power = ThrustPower::Fraction(self.config.circling_power);
                    self.thrusters.set_thrust_power(Direction::Left, power);
                }
            }
            BotState::Patrolling => {
                let ahead = if displacement < distance { self.full_ahead() } else { 0.0 };
                self.drive(ahead);
                if distance < self.config.waypoint_arrival_distance {
                    self.advance_waypoint();
                }
            }
            BotState::None
            | BotState::Chasing
            | BotState::Evading
            | BotState::Fleeing
            | BotState::Stalking
            | BotState::Waiting => {}
        }
    }

    // -- lifecycle -----------------------------------------------------------

    /// Release every actuator. Idempotent; a closed autopilot ignores
    /// commands and ticks.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.gyros.close();
        self.thrusters.close();
        self.closed = true;
        info!("autopilot closed");
    }
}
