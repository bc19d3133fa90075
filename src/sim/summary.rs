use std::io::{self, Write};
use std::path::Path;

use nalgebra::Vector3;
use serde::Serialize;

use super::runner::FlightLog;
use crate::events::FlightEvent;
use crate::nav::BotState;

/// Summary statistics computed from a flight log.
#[derive(Debug, Clone, Serialize)]
pub struct FlightSummary {
    pub duration_s: f64,
    pub ticks: u64,
    pub path_length_m: f64,
    pub max_speed_ms: f64,
    pub final_position: Vector3<f64>,
    pub final_speed_ms: f64,
    pub final_state: BotState,
    pub state_changes: usize,
    pub waypoints_reached: usize,
    pub shortfalls: usize,
}

impl FlightSummary {
    /// `None` for an empty log.
    pub fn from_log(log: &FlightLog) -> Option<Self> {
        let last = log.samples.last()?;

        let path_length_m = log
            .samples
            .windows(2)
            .map(|w| (w[1].body.pos - w[0].body.pos).norm())
            .sum();

        let max_speed_ms = log
            .samples
            .iter()
            .map(|s| s.body.speed())
            .fold(0.0_f64, f64::max);

        let count = |pred: fn(&FlightEvent) -> bool| log.flight_events.iter().filter(|(_, e)| pred(e)).count();

        Some(FlightSummary {
            duration_s: last.body.time,
            ticks: last.tick + 1,
            path_length_m,
            max_speed_ms,
            final_position: last.body.pos,
            final_speed_ms: last.body.speed(),
            final_state: last.bot_state,
            state_changes: count(|e| matches!(e, FlightEvent::StateChanged { .. })),
            waypoints_reached: count(|e| matches!(e, FlightEvent::WaypointAdvanced { .. })),
            shortfalls: count(|e| matches!(e, FlightEvent::InsufficientThrust { .. })),
        })
    }
}

/// Write the summary as pretty JSON.
pub fn write_summary<W: Write>(writer: &mut W, summary: &FlightSummary) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, summary)?;
    writeln!(writer)
}

pub fn write_summary_file(path: impl AsRef<Path>, summary: &FlightSummary) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::runner::Sample;
    use crate::sim::state::BodyState;
    use crate::systems::DirectionMap;
    use nalgebra::UnitQuaternion;

    fn sample(tick: u64, x: f64, vx: f64, state: BotState) -> Sample {
        let mut body = BodyState::at_rest(Vector3::new(x, 0.0, 0.0), UnitQuaternion::identity());
        body.time = tick as f64;
        body.vel = Vector3::new(vx, 0.0, 0.0);
        Sample { tick, body, bot_state: state, thrust: DirectionMap::default(), distance: 0.0, displacement: 0.0 }
    }

    fn log() -> FlightLog {
        FlightLog {
            samples: vec![
                sample(0, 0.0, 0.0, BotState::Intercepting),
                sample(1, 10.0, 20.0, BotState::Intercepting),
                sample(2, 25.0, 5.0, BotState::Engaging),
            ],
            flight_events: vec![
                (0, FlightEvent::StateChanged { from: BotState::Waiting, to: BotState::Intercepting }),
                (2, FlightEvent::StateChanged { from: BotState::Intercepting, to: BotState::Engaging }),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn summary_from_log() {
        let s = FlightSummary::from_log(&log()).unwrap();
        assert_eq!(s.ticks, 3);
        assert!((s.path_length_m - 25.0).abs() < 1e-12);
        assert!((s.max_speed_ms - 20.0).abs() < 1e-12);
        assert_eq!(s.final_state, BotState::Engaging);
        assert_eq!(s.state_changes, 2);
        assert_eq!(s.shortfalls, 0);
        assert!(FlightSummary::from_log(&FlightLog::default()).is_none());
    }

    #[test]
    fn json_output_is_valid() {
        let summary = FlightSummary::from_log(&log()).unwrap();
        let mut buf = Vec::new();
        write_summary(&mut buf, &summary).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["final_state"], "Engaging");
        assert_eq!(value["final_position"][0], 25.0);
    }
}
