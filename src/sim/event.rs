use nalgebra::Vector3;

use super::runner::Sample;

// ---------------------------------------------------------------------------
// Simulation events
// ---------------------------------------------------------------------------

/// Kinds of simulation events.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// Came within `radius` of a watched point.
    Proximity { point: Vector3<f64>, radius: f64 },
    /// Speed dropped back below the detector's threshold after exceeding it.
    CameToRest,
    Custom(String),
}

/// A discrete event that occurred during simulation.
#[derive(Debug, Clone)]
pub struct SimEvent {
    pub tick: u64,
    pub time: f64,
    pub kind: EventKind,
    pub position: Vector3<f64>,
}

/// Passive detectors inspect consecutive samples and report events.
pub trait EventDetector {
    fn check(&mut self, prev: &Sample, current: &Sample) -> Option<EventKind>;
}

/// Fires once, the first time the vehicle enters a sphere.
pub struct ProximityDetector {
    pub point: Vector3<f64>,
    pub radius: f64,
    fired: bool,
}

impl ProximityDetector {
    pub fn new(point: Vector3<f64>, radius: f64) -> Self {
        Self { point, radius, fired: false }
    }
}

impl EventDetector for ProximityDetector {
    fn check(&mut self, prev: &Sample, current: &Sample) -> Option<EventKind> {
        if self.fired {
            return None;
        }
        let was_outside = (prev.body.pos - self.point).norm() > self.radius;
        let is_inside = (current.body.pos - self.point).norm() <= self.radius;
        if was_outside && is_inside {
            self.fired = true;
            Some(EventKind::Proximity { point: self.point, radius: self.radius })
        } else {
            None
        }
    }
}

/// Detects the vehicle settling after it has been moving.
pub struct RestDetector {
    pub threshold: f64,
}

impl EventDetector for RestDetector {
    fn check(&mut self, prev: &Sample, current: &Sample) -> Option<EventKind> {
        if prev.body.speed() >= self.threshold && current.body.speed() < self.threshold {
            Some(EventKind::CameToRest)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::BotState;
    use crate::sim::state::BodyState;
    use crate::systems::DirectionMap;
    use nalgebra::UnitQuaternion;

    fn sample(x: f64, vx: f64) -> Sample {
        let mut body = BodyState::at_rest(Vector3::new(x, 0.0, 0.0), UnitQuaternion::identity());
        body.vel = Vector3::new(vx, 0.0, 0.0);
        Sample {
            tick: 0,
            body,
            bot_state: BotState::Intercepting,
            thrust: DirectionMap::default(),
            distance: 0.0,
            displacement: 0.0,
        }
    }

    #[test]
    fn proximity_fires_once() {
        let mut det = ProximityDetector::new(Vector3::new(100.0, 0.0, 0.0), 10.0);
        assert!(det.check(&sample(80.0, 5.0), &sample(85.0, 5.0)).is_none());
        assert!(det.check(&sample(85.0, 5.0), &sample(92.0, 5.0)).is_some());
        // Should not fire again
        assert!(det.check(&sample(85.0, 5.0), &sample(92.0, 5.0)).is_none());
    }

    #[test]
    fn rest_after_motion() {
        let mut det = RestDetector { threshold: 0.1 };
        assert_eq!(det.check(&sample(0.0, 1.0), &sample(0.0, 0.05)), Some(EventKind::CameToRest));
        assert!(det.check(&sample(0.0, 0.05), &sample(0.0, 0.0)).is_none());
    }
}
