use std::path::PathBuf;
use std::process::ExitCode;

use grid_autopilot::sim::{
    csv, simulate, summary, EventDetector, EventKind, FlightLog, FlightSummary, ProximityDetector, RestDetector,
    SimConfig, SimVehicle,
};
use clap::Parser;
use grid_autopilot::{AutopilotConfig, BotState, FlightEvent};
use nalgebra::{Rotation3, Vector3};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "grid-autopilot")]
#[command(about = "Fly the autopilot through an intercept and a patrol and print a flight report")]
struct Args {
    /// Autopilot config JSON; defaults apply when omitted
    config: Option<PathBuf>,

    /// Write the intercept trajectory as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the intercept summary as JSON
    #[arg(long)]
    summary: Option<PathBuf>,
}

/// 12 t gunship, two thrusters per axis, a second gyro mounted rolled.
fn scout(position: Vector3<f64>, host_damping: f64) -> SimVehicle {
    SimVehicle::builder()
        .mass(12_000.0)
        .cargo_mass(800.0)
        .position(position)
        .host_damping(host_damping)
        .six_axis_thrusters(2, 60_000.0)
        .gyro(Rotation3::identity())
        .gyro(Rotation3::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2))
        .build()
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt::init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => AutopilotConfig::from_json_file(path)?,
        None => AutopilotConfig {
            patrol_route: vec![
                Vector3::new(0.0, 0.0, -800.0),
                Vector3::new(800.0, 0.0, -800.0),
                Vector3::new(800.0, 0.0, 0.0),
            ],
            ..Default::default()
        },
    };
    info!(range = config.engagement_range, nodes = config.patrol_route.len(), "configuration loaded");

    let sim = SimConfig { dt: config.dt(), max_time: 120.0 };

    println!();
    println!("====================================================================");
    println!("  GRID AUTOPILOT - Flight Report");
    println!("====================================================================");

    // -----------------------------------------------------------------------
    // Scenario 1: intercept a stationary contact off the port bow
    // -----------------------------------------------------------------------
    let contact = Vector3::new(-900.0, 0.0, -2400.0);
    let mut vehicle = scout(Vector3::zeros(), 0.0);
    let mut detectors: Vec<Box<dyn EventDetector>> = vec![
        Box::new(ProximityDetector::new(contact, config.engagement_range * 1.5)),
        Box::new(RestDetector { threshold: 0.5 }),
    ];
    let (mut autopilot, intercept) =
        simulate(config.clone(), &mut vehicle, &sim, &mut detectors, |a| a.acquire_target(contact))?;
    autopilot.close();

    print_report("Intercept", &intercept, Some(contact));

    // -----------------------------------------------------------------------
    // Scenario 2: patrol the configured route
    // -----------------------------------------------------------------------
    let start = config.patrol_route.last().copied().unwrap_or_else(Vector3::zeros);
    // Patrol leans on the host dampeners to bleed speed between nodes.
    let mut vehicle = scout(start, 0.1);
    let mut detectors: Vec<Box<dyn EventDetector>> = config
        .patrol_route
        .iter()
        .map(|&node| Box::new(ProximityDetector::new(node, config.waypoint_arrival_distance)) as Box<dyn EventDetector>)
        .collect();
    let (mut autopilot, patrol) = simulate(config.clone(), &mut vehicle, &sim, &mut detectors, |a| {
        a.patrol();
    })?;
    autopilot.close();

    print_report("Patrol", &patrol, None);

    if let Some(path) = &args.csv {
        csv::write_trajectory_file(path, &intercept.samples)?;
        info!(path = %path.display(), rows = intercept.samples.len(), "trajectory written");
    }
    if let Some(path) = &args.summary {
        if let Some(s) = FlightSummary::from_log(&intercept) {
            summary::write_summary_file(path, &s)?;
            info!(path = %path.display(), "summary written");
        }
    }

    println!("====================================================================");
    println!();
    Ok(())
}

fn print_report(name: &str, log: &FlightLog, contact: Option<Vector3<f64>>) {
    let Some(summary) = FlightSummary::from_log(log) else {
        println!("  {name}: no samples");
        return;
    };

    println!();
    println!("  {name}");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Duration:      {:>8.1} s     Path length:  {:>8.0} m",
        summary.duration_s, summary.path_length_m
    );
    println!(
        "  Max speed:     {:>8.1} m/s   Final speed:  {:>8.2} m/s",
        summary.max_speed_ms, summary.final_speed_ms
    );
    println!(
        "  Final state:   {:>8}       Shortfalls:   {:>8}",
        summary.final_state.to_string(),
        summary.shortfalls
    );
    if let Some(contact) = contact {
        println!("  Stand-off:     {:>8.1} m", (summary.final_position - contact).norm());
    }
    println!();

    println!("  Events");
    println!("  ──────────────────────────────────────────────────────────────────");
    for (tick, event) in &log.flight_events {
        match event {
            FlightEvent::StateChanged { from, to } => {
                println!("  STATE     tick={tick:>6}   {from} -> {to}");
            }
            FlightEvent::WaypointAdvanced { waypoint } => {
                println!("  WAYPOINT  tick={tick:>6}   heading for node {waypoint}");
            }
            FlightEvent::EngagementPatternChanged(to) => {
                println!("  PATTERN   tick={tick:>6}   {to}");
            }
            _ => {}
        }
    }
    for event in &log.events {
        let label = match &event.kind {
            EventKind::Proximity { radius, .. } => format!("within {radius:.0} m"),
            EventKind::CameToRest => "came to rest".to_string(),
            EventKind::Custom(s) => s.clone(),
        };
        println!("  SIM       t={:>7.1}s   {label}", event.time);
    }
    println!();

    println!("  {:>7}  {:>9}  {:>9}  {:>9}  {:>12}", "t (s)", "dist (m)", "disp (m)", "vel (m/s)", "state");
    println!("  {}", "─".repeat(56));
    let interval = (log.samples.len() / 20).max(1);
    let mut last_state = BotState::None;
    for (i, s) in log.samples.iter().enumerate() {
        let changed = s.bot_state != last_state;
        last_state = s.bot_state;
        if !(i % interval == 0 || changed || i == log.samples.len() - 1) {
            continue;
        }
        println!(
            "  {:>7.2}  {:>9.1}  {:>9.1}  {:>9.2}  {:>12}",
            s.body.time,
            s.distance,
            s.displacement,
            s.body.speed(),
            s.bot_state.to_string()
        );
    }
    if let Some(status) = log.status.right.lines().next() {
        println!("  Last status: {status}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_take_a_config_and_output_paths() {
        let args = Args::try_parse_from(["grid-autopilot", "cfg.json", "--csv", "out.csv", "--summary", "s.json"])
            .expect("valid command line");
        assert_eq!(args.config, Some(PathBuf::from("cfg.json")));
        assert_eq!(args.csv, Some(PathBuf::from("out.csv")));
        assert_eq!(args.summary, Some(PathBuf::from("s.json")));
    }

    #[test]
    fn args_are_all_optional() {
        let args = Args::try_parse_from(["grid-autopilot"]).expect("no arguments is valid");
        assert!(args.config.is_none() && args.csv.is_none() && args.summary.is_none());
        assert!(Args::try_parse_from(["grid-autopilot", "--csv"]).is_err(), "--csv needs a path");
    }
}
