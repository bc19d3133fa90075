use std::fmt::Write as _;

use nalgebra::Rotation3;
use tracing::{debug, info, warn};

use super::actuator::{classify, ControllableThruster};
use super::arena::{ActuatorId, Arena};
use super::dampeners::DampenerSolution;
use super::direction::{Direction, DirectionMap, ThrustPower};
use super::remap::AxisRemap;
use crate::events::{EventQueue, FlightEvent};
use crate::host::{Thruster, Vehicle};

/// Shortfalls and surpluses below this are rounding noise (N).
const THRUST_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Thrust allocation engine
// ---------------------------------------------------------------------------

/// Six direction pools of thrusters with cached capacity, fair-share
/// distribution, an axis remap and an optional closed-loop dampener.
#[derive(Debug)]
pub struct ThrustAllocator {
    thrusters: Arena<ControllableThruster>,
    max_effective: DirectionMap<f64>,
    utilized: DirectionMap<f64>,
    remap: AxisRemap,
    custom_dampeners: bool,
    host_dampeners_pending: Option<bool>,
    dampener_interval: u64,
    last_dampening: Option<DampenerSolution>,
    pass_two: Vec<(ActuatorId, f64)>,
    events: EventQueue,
    closed: bool,
}

impl ThrustAllocator {
    /// `dampener_interval` is the tick period of the custom dampener loop.
    pub fn new(dampener_interval: u64) -> Self {
        Self {
            thrusters: Arena::new(),
            max_effective: DirectionMap::default(),
            utilized: DirectionMap::default(),
            remap: AxisRemap::IDENTITY,
            custom_dampeners: false,
            host_dampeners_pending: None,
            dampener_interval: dampener_interval.max(1),
            last_dampening: None,
            pass_two: Vec::new(),
            events: EventQueue::default(),
            closed: false,
        }
    }

    // -- attach / detach ---------------------------------------------------

    /// Classify a thruster against the vehicle's `base` frame and stage it
    /// for its pool. Unaligned thrusters are discarded.
    pub fn attach(&mut self, thruster: Box<dyn Thruster>, base: &Rotation3<f64>) -> Option<ActuatorId> {
        if self.closed {
            return None;
        }
        let Some(direction) = classify(&thruster.world_orientation(), base) else {
            debug!("thruster not aligned with any body axis, discarded");
            self.events.push(FlightEvent::ThrusterDiscarded);
            return None;
        };
        let id = self.thrusters.add(ControllableThruster::new(thruster, direction));
        debug!(%id, ?direction, "thruster staged");
        Some(id)
    }

    /// Stage removal of a thruster; applied on the next `update`.
    pub fn detach(&mut self, id: ActuatorId) {
        if self.closed {
            return;
        }
        self.thrusters.remove(id);
    }

    fn apply_pending(&mut self) {
        if !self.thrusters.has_pending() {
            return;
        }
        let applied = self.thrusters.apply_pending();
        for id in applied.added {
            if let Some(t) = self.thrusters.get(id) {
                self.events.push(FlightEvent::ThrusterAttached { id, direction: t.direction() });
            }
        }
        for (id, t) in applied.removed {
            debug!(%id, direction = ?t.direction(), "thruster detached");
            self.events.push(FlightEvent::ThrusterDetached { id, direction: t.direction() });
        }
        self.recalculate_max_effective_thrust();
    }

    // -- tick --------------------------------------------------------------

    pub fn update(&mut self, tick: u64, vehicle: &mut dyn Vehicle) {
        if self.closed {
            return;
        }
        self.apply_pending();
        if let Some(enabled) = self.host_dampeners_pending.take() {
            vehicle.set_dampeners_enabled(enabled);
        }
        self.recalculate_max_effective_thrust();

        if self.custom_dampeners && tick % self.dampener_interval == 0 {
            self.dampen(&*vehicle);
        }
    }

    /// Re-sum every pool's capacity and current output from its thrusters.
    pub fn recalculate_max_effective_thrust(&mut self) {
        if self.closed {
            return;
        }
        self.max_effective.fill(0.0);
        self.utilized.fill(0.0);
        for (_, t) in self.thrusters.iter() {
            self.max_effective[t.direction()] += t.max_thrust();
            self.utilized[t.direction()] += t.current_thrust();
        }
    }

    // -- queries -------------------------------------------------------------

    pub fn axis_remap(&self) -> AxisRemap {
        self.remap
    }

    pub fn set_axis_remap(&mut self, remap: AxisRemap) {
        if self.closed || remap == self.remap {
            return;
        }
        info!(?remap, "axis remap changed");
        self.remap = remap;
    }

    /// Thrusters serving `direction` in the current operating frame.
    pub fn thruster_list(&self, direction: Direction) -> impl Iterator<Item = (ActuatorId, &ControllableThruster)> {
        let pool = self.remap.resolve(direction);
        self.thrusters.iter().filter(move |(_, t)| t.direction() == pool)
    }

    pub fn thruster(&self, id: ActuatorId) -> Option<&ControllableThruster> {
        self.thrusters.get(id)
    }

    pub fn thruster_count(&self, direction: Direction) -> usize {
        self.thruster_list(direction).count()
    }

    pub fn max_effective_thrust(&self, direction: Direction) -> f64 {
        self.max_effective[self.remap.resolve(direction)]
    }

    pub fn utilized_thrust(&self, direction: Direction) -> f64 {
        self.utilized[self.remap.resolve(direction)]
    }

    pub fn last_dampening(&self) -> Option<&DampenerSolution> {
        self.last_dampening.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn take_events(&mut self) -> Vec<FlightEvent> {
        self.events.take()
    }

    /// One line per pool: `Forward | capacity / utilized`.
    pub fn capacity_summary(&self) -> String {
        let mut out = String::new();
        for (d, max) in self.max_effective.iter() {
            let _ = writeln!(out, "{d} | {max:.0} / {:.0}", self.utilized[d]);
        }
        out
    }

    // -- commands ------------------------------------------------------------

    /// Request `magnitude` newtons along `direction` in the operating frame.
    ///
    /// This is a set, not an accumulation. A negative magnitude clears
    /// `direction` and requests the positive magnitude on its opposite.
    pub fn set_thrust(&mut self, direction: Direction, magnitude: f64) {
        self.set_signed(direction, magnitude, true);
    }

    pub fn set_thrust_power(&mut self, direction: Direction, power: ThrustPower) {
        let magnitude = power.fraction() * self.max_effective_thrust(direction);
        self.set_thrust(direction, magnitude);
    }

    /// Zero every pool through the regular distribution path.
    pub fn reset_thrust(&mut self) {
        for d in Direction::ALL {
            self.distribute(d, d, 0.0);
        }
    }

    fn set_signed(&mut self, direction: Direction, magnitude: f64, remapped: bool) {
        if self.closed {
            return;
        }
        if !magnitude.is_finite() {
            warn!(?direction, magnitude, "ignoring non-finite thrust request");
            return;
        }
        let remap = self.remap;
        let resolve = move |d: Direction| if remapped { remap.resolve(d) } else { d };
        let (direction, magnitude) = if magnitude < 0.0 {
            let pool = resolve(direction);
            self.distribute(direction, pool, 0.0);
            (direction.opposite(), -magnitude)
        } else {
            (direction, magnitude)
        };
        let pool = resolve(direction);
        self.distribute(direction, pool, magnitude);
    }

    /// Two-pass fair share over the thrusters in `pool`.
    ///
    /// Pass one splits `value` evenly, saturating thrusters that cannot take
    /// their share. Pass two spreads whatever those could not take across
    /// the thrusters that were not saturated.
    fn distribute(&mut self, logical: Direction, pool: Direction, value: f64) {
        if self.closed {
            return;
        }
        let available = self.max_effective[pool];
        if value - available > THRUST_EPSILON {
            warn!(direction = ?logical, requested = value, available, "insufficient thrust available");
            self.events.push(FlightEvent::InsufficientThrust { direction: logical, requested: value, available });
        }

        let count = self.thrusters.iter().filter(|(_, t)| t.direction() == pool).count();
        if count == 0 {
            self.utilized[pool] = 0.0;
            return;
        }

        let share = value / count as f64;
        let mut remainder = value;
        let mut applied = 0.0;
        self.pass_two.clear();
        for (id, t) in self.thrusters.iter_mut().filter(|(_, t)| t.direction() == pool) {
            let max = t.max_thrust();
            if max < share {
                t.set_thrust(max);
                remainder -= max;
                applied += max;
                continue;
            }
            t.set_thrust(share);
            remainder -= share;
            applied += share;
            self.pass_two.push((id, max));
        }

        if remainder > THRUST_EPSILON && !self.pass_two.is_empty() {
            let extra = remainder / self.pass_two.len() as f64;
            for &(id, max) in &self.pass_two {
                if let Some(t) = self.thrusters.get_mut(id) {
                    let topped = (share + extra).min(max);
                    t.set_thrust(topped);
                    applied += topped - share;
                }
            }
        }
        self.pass_two.clear();

        self.utilized[pool] = applied;
        debug!(direction = ?logical, ?pool, requested = value, applied, count, "thrust distributed");
    }

    // -- dampeners -----------------------------------------------------------

    /// Take over velocity damping from the host.
    pub fn enable_custom_dampeners(&mut self) {
        if self.closed || self.custom_dampeners {
            return;
        }
        info!("custom dampeners enabled");
        self.custom_dampeners = true;
        self.host_dampeners_pending = Some(false);
    }

    pub fn disable_custom_dampeners(&mut self) {
        if self.closed || !self.custom_dampeners {
            return;
        }
        info!("custom dampeners disabled");
        self.custom_dampeners = false;
        self.last_dampening = None;
        self.host_dampeners_pending = Some(true);
    }

    pub fn custom_dampeners_enabled(&self) -> bool {
        self.custom_dampeners
    }

    fn dampen(&mut self, vehicle: &dyn Vehicle) {
        let velocity = vehicle.linear_velocity();
        let gravity = vehicle.natural_gravity();
        let mass = vehicle.physical_mass();
        if !crate::math::is_finite(&velocity) || !crate::math::is_finite(&gravity) || !mass.is_finite() {
            warn!("ignoring non-finite kinematics in dampener loop");
            return;
        }
        let solution = DampenerSolution::compute(mass, &gravity, &velocity, &vehicle.orientation());
        for (direction, value) in solution.requests() {
            self.set_signed(direction, value, false);
        }
        self.last_dampening = Some(solution);
    }

    // -- lifecycle -----------------------------------------------------------

    /// Zero and release every thruster. Idempotent; later calls on a closed
    /// allocator do nothing.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        let released = self.thrusters.drain();
        let count = released.len();
        for (_, mut t) in released {
            t.set_thrust(0.0);
        }
        self.max_effective.fill(0.0);
        self.utilized.fill(0.0);
        self.closed = true;
        info!(count, "thrust allocator closed");
    }
}
