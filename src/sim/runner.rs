use tracing::{debug, info};

use super::event::{EventDetector, SimEvent};
use super::state::{BodyState, SimConfig};
use super::vehicle::SimVehicle;
use crate::config::AutopilotConfig;
use crate::error::ConfigError;
use crate::events::FlightEvent;
use crate::host::TextSurfaces;
use crate::nav::{Autopilot, BotState};
use crate::systems::{Direction, DirectionMap};

// ---------------------------------------------------------------------------
// Flight log
// ---------------------------------------------------------------------------

/// Vehicle and autopilot state right after the autopilot's update for a
/// tick, before the hull is integrated.
#[derive(Debug, Clone)]
pub struct Sample {
    pub tick: u64,
    pub body: BodyState,
    pub bot_state: BotState,
    /// Output per logical direction.
    pub thrust: DirectionMap<f64>,
    pub distance: f64,
    pub displacement: f64,
}

impl Sample {
    fn capture(tick: u64, vehicle: &SimVehicle, autopilot: &Autopilot) -> Self {
        let mut thrust = DirectionMap::default();
        for d in Direction::ALL {
            thrust[d] = autopilot.thrusters().utilized_thrust(d);
        }
        let (distance, displacement) = autopilot
            .telemetry()
            .map(|t| (t.distance, t.displacement))
            .unwrap_or_default();
        Self { tick, body: vehicle.state(), bot_state: autopilot.state(), thrust, distance, displacement }
    }
}

#[derive(Debug, Default)]
pub struct FlightLog {
    pub samples: Vec<Sample>,
    pub events: Vec<SimEvent>,
    /// Autopilot notifications, tagged with the tick that raised them.
    pub flight_events: Vec<(u64, FlightEvent)>,
    /// Final contents of the two status surfaces.
    pub status: TextSurfaces,
}

impl FlightLog {
    /// First tick the autopilot was in `state`.
    pub fn first_tick_in(&self, state: BotState) -> Option<u64> {
        self.samples.iter().find(|s| s.bot_state == state).map(|s| s.tick)
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }
}

// ---------------------------------------------------------------------------
// Simulation loop
// ---------------------------------------------------------------------------

/// Build an autopilot for `vehicle` and hand it every thruster and gyro,
/// classified against the vehicle's current attitude.
pub fn rig_autopilot(config: AutopilotConfig, vehicle: &SimVehicle) -> Result<Autopilot, ConfigError> {
    use crate::host::Vehicle as _;

    let mut autopilot = Autopilot::new(config)?;
    let base = vehicle.orientation();
    for thruster in vehicle.thruster_handles() {
        autopilot.attach_thruster(thruster, &base);
    }
    for gyro in vehicle.gyro_handles() {
        autopilot.attach_gyro(gyro);
    }
    Ok(autopilot)
}

/// Tick the autopilot against the simulated vehicle until `config.max_time`.
pub fn simulate_with(
    autopilot: &mut Autopilot,
    vehicle: &mut SimVehicle,
    config: &SimConfig,
    detectors: &mut [Box<dyn EventDetector>],
) -> FlightLog {
    let capacity = ((config.max_time / config.dt) as usize + 1).min(200_000);
    let mut log = FlightLog { samples: Vec::with_capacity(capacity), ..Default::default() };

    let mut tick: u64 = 0;
    let mut time = 0.0;
    while time < config.max_time {
        autopilot.update(tick, vehicle, &mut log.status);
        log.flight_events.extend(autopilot.take_events().into_iter().map(|e| (tick, e)));

        let sample = Sample::capture(tick, vehicle, autopilot);
        if let Some(prev) = log.samples.last() {
            for detector in detectors.iter_mut() {
                if let Some(kind) = detector.check(prev, &sample) {
                    debug!(tick, ?kind, "sim event");
                    log.events.push(SimEvent { tick, time, kind, position: sample.body.pos });
                }
            }
        }
        log.samples.push(sample);

        vehicle.step(config.dt);
        tick += 1;
        time += config.dt;
    }

    info!(ticks = tick, events = log.events.len(), "simulation finished");
    log
}

/// Build, rig and fly in one call.
pub fn simulate(
    autopilot_config: AutopilotConfig,
    vehicle: &mut SimVehicle,
    config: &SimConfig,
    detectors: &mut [Box<dyn EventDetector>],
    setup: impl FnOnce(&mut Autopilot),
) -> Result<(Autopilot, FlightLog), ConfigError> {
    let mut autopilot = rig_autopilot(autopilot_config, vehicle)?;
    setup(&mut autopilot);
    let log = simulate_with(&mut autopilot, vehicle, config, detectors);
    Ok((autopilot, log))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::event::{EventKind, ProximityDetector};
    use nalgebra::{UnitQuaternion, Vector3};
    use std::f64::consts::FRAC_PI_2;

    /// Nose on +X, one 1 kN thruster per axis, 1 t, nothing else acting.
    fn scout() -> SimVehicle {
        SimVehicle::builder()
            .mass(1000.0)
            .host_damping(0.0)
            .attitude(UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -FRAC_PI_2))
            .six_axis_thrusters(1, 1000.0)
            .gyro(nalgebra::Rotation3::identity())
            .build()
    }

    fn single_node_route() -> AutopilotConfig {
        AutopilotConfig { patrol_route: vec![Vector3::zeros()], ..Default::default() }
    }

    #[test]
    fn intercept_burns_full_until_stopping_distance_covers_the_gap() {
        let mut vehicle = scout();
        let config = SimConfig { dt: 1.0 / 60.0, max_time: 60.0 };
        let (_, log) = simulate(single_node_route(), &mut vehicle, &config, &mut [], |a| {
            a.acquire_target(Vector3::new(1000.0, 0.0, 0.0))
        })
        .unwrap();

        let engaged = log
            .samples
            .iter()
            .position(|s| s.bot_state == BotState::Engaging)
            .expect("never reached Engaging");
        assert!(engaged > 0);
        for s in &log.samples[..engaged] {
            assert_eq!(s.bot_state, BotState::Intercepting, "tick {}", s.tick);
            assert_eq!(s.thrust[Direction::Forward], 1000.0, "tick {}", s.tick);
            assert!(s.displacement < s.distance, "tick {}", s.tick);
        }

        let at = &log.samples[engaged];
        assert_eq!(at.thrust[Direction::Forward], 0.0);
        assert!(at.displacement >= at.distance);
        // a = 1 m/s^2 both ways: the burn ends halfway to the 600 m stand-off.
        assert!((at.body.pos.x - 300.0).abs() < 5.0, "switched at x = {:.1}", at.body.pos.x);
        assert!(at.body.pos.y.abs() < 1e-6 && at.body.pos.z.abs() < 1e-6);
    }

    #[test]
    fn engagement_stops_short_of_the_target() {
        let mut vehicle = scout();
        let config = SimConfig { dt: 1.0 / 60.0, max_time: 90.0 };
        let mut detectors: Vec<Box<dyn EventDetector>> =
            vec![Box::new(ProximityDetector::new(Vector3::new(1000.0, 0.0, 0.0), 100.0))];
        let (pilot, log) = simulate(single_node_route(), &mut vehicle, &config, &mut detectors, |a| {
            a.acquire_target(Vector3::new(1000.0, 0.0, 0.0))
        })
        .unwrap();

        assert_eq!(pilot.state(), BotState::Engaging);
        let closest = log
            .samples
            .iter()
            .map(|s| (s.body.pos - Vector3::new(1000.0, 0.0, 0.0)).norm())
            .fold(f64::INFINITY, f64::min);
        assert!(closest > 100.0, "came within {:.1} m", closest);
        assert!(log.events.iter().all(|e| !matches!(e.kind, EventKind::Proximity { .. })));
        assert!(log
            .flight_events
            .iter()
            .any(|(_, e)| *e == FlightEvent::StateChanged { from: BotState::Intercepting, to: BotState::Engaging }));
        assert!(log.status.right.contains("Bot State: Engaging"));
    }

    #[test]
    fn gyros_turn_the_nose_onto_the_target() {
        // Nose on +X, target straight ahead along -Z.
        let mut vehicle = scout();
        let config = SimConfig { dt: 1.0 / 60.0, max_time: 8.0 };
        let (_, log) = simulate(single_node_route(), &mut vehicle, &config, &mut [], |a| {
            a.acquire_target(Vector3::new(0.0, 0.0, -5000.0))
        })
        .unwrap();
        let nose = log.last().map(|s| s.body.forward()).unwrap();
        let bearing = (Vector3::new(0.0, 0.0, -5000.0) - log.last().unwrap().body.pos).normalize();
        assert!(nose.dot(&bearing) > 0.99, "nose {:?} bearing {:?}", nose, bearing);
    }

    #[test]
    fn tracking_mode_steers_for_the_host_position() {
        let mut vehicle = scout();
        let contact = Vector3::new(0.0, 0.0, -3000.0);
        vehicle.set_tracked_position(Some(contact));
        let config = SimConfig { dt: 1.0 / 60.0, max_time: 8.0 };
        let (pilot, log) = simulate(single_node_route(), &mut vehicle, &config, &mut [], |a| {
            // The stored target is ignored while tracking.
            a.acquire_target(Vector3::new(1000.0, 0.0, 0.0));
            a.track_external();
        })
        .unwrap();

        assert!(pilot.is_tracking());
        assert_eq!(log.first_tick_in(BotState::Intercepting), Some(0));
        let last = log.last().unwrap();
        let bearing = (contact - last.body.pos).normalize();
        assert!(last.body.forward().dot(&bearing) > 0.99);
        // Distance is measured to the tracked contact, not the stored target.
        let expected = (contact - last.body.pos).norm() - 400.0;
        assert!((last.distance - expected).abs() < 1.0, "{} vs {}", last.distance, expected);
    }
}
