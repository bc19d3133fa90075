use std::path::Path;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::control::{AttitudeAlgorithm, PidGains};
use crate::error::ConfigError;
use crate::systems::AxisRemap;

// ---------------------------------------------------------------------------
// Autopilot configuration
// ---------------------------------------------------------------------------

/// Tunables for one autopilot. Every field has a default, so a JSON file
/// only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotConfig {
    /// Update rate; the PID sample period is its reciprocal.
    pub ticks_per_second: f64,
    pub gyro_pid: PidGains,
    pub attitude_algorithm: AttitudeAlgorithm,
    pub axis_remap: AxisRemap,
    /// Stand-off distance restored by a reset.
    pub engagement_range: f64,
    /// Half-width of the station-keeping band, as a fraction of the range.
    pub engagement_buffer_ratio: f64,
    /// A patrol waypoint counts as reached inside this distance.
    pub waypoint_arrival_distance: f64,
    /// Lateral thrust while circling, as a fraction of pool capacity.
    pub circling_power: f64,
    /// Tick period of the custom dampener loop.
    pub dampener_interval_ticks: u64,
    pub patrol_route: Vec<Vector3<f64>>,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 60.0,
            gyro_pid: PidGains::default(),
            attitude_algorithm: AttitudeAlgorithm::default(),
            axis_remap: AxisRemap::IDENTITY,
            engagement_range: 400.0,
            engagement_buffer_ratio: 0.1,
            waypoint_arrival_distance: 20.0,
            circling_power: 0.1,
            dampener_interval_ticks: 10,
            patrol_route: default_patrol_route(),
        }
    }
}

/// The seven-node survey loop the autopilot ships with.
pub fn default_patrol_route() -> Vec<Vector3<f64>> {
    vec![
        Vector3::new(-43229.021168609252, -9269.5177582804135, 43489.220552603845),
        Vector3::new(-42215.248862785862, -10106.238471936351, 44052.730770789916),
        Vector3::new(-41429.448022182289, -9966.6928187007179, 45368.193750827246),
        Vector3::new(-41763.776891319809, -8156.2750849056138, 45627.912503207961),
        Vector3::new(-42359.304601329386, -6601.9854178186824, 43311.280304341512),
        Vector3::new(-44799.281991765121, -7653.6194506676993, 42228.293961479911),
        Vector3::new(-43120.573476366189, -9248.4646031342054, 42960.09875162087),
    ]
}

impl AutopilotConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Seconds per tick.
    pub fn dt(&self) -> f64 {
        1.0 / self.ticks_per_second
    }

    pub fn engagement_buffer(&self) -> f64 {
        self.engagement_range * self.engagement_buffer_ratio
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if !(self.ticks_per_second.is_finite() && self.ticks_per_second > 0.0) {
            return invalid(format!("ticks_per_second must be positive, got {}", self.ticks_per_second));
        }
        let g = &self.gyro_pid;
        if ![g.kp, g.ki, g.kd, g.max_output].iter().all(|v| v.is_finite()) {
            return invalid("gyro_pid gains must be finite".into());
        }
        if g.max_output <= 0.0 {
            return invalid(format!("gyro_pid.max_output must be positive, got {}", g.max_output));
        }
        for (name, value) in [
            ("engagement_range", self.engagement_range),
            ("engagement_buffer_ratio", self.engagement_buffer_ratio),
            ("waypoint_arrival_distance", self.waypoint_arrival_distance),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return invalid(format!("{name} must be non-negative, got {value}"));
            }
        }
        if !(0.0..=1.0).contains(&self.circling_power) {
            return invalid(format!("circling_power must be within [0, 1], got {}", self.circling_power));
        }
        if self.dampener_interval_ticks == 0 {
            return invalid("dampener_interval_ticks must be at least 1".into());
        }
        if self.patrol_route.is_empty() {
            return invalid("patrol_route needs at least one waypoint".into());
        }
        if let Some(i) = self.patrol_route.iter().position(|p| !crate::math::is_finite(p)) {
            return invalid(format!("patrol_route[{i}] is not finite"));
        }
        Ok(())
    }
}
