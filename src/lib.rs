//! Flight-control core for thruster-and-gyro vehicles.
//!
//! The host supplies a [`host::Vehicle`] plus boxed [`host::Thruster`] and
//! [`host::Gyroscope`] handles; an [`Autopilot`] is ticked once per frame
//! and drives them. [`sim`] carries a rigid-body vehicle to fly it against.

pub mod config;
pub mod control;
pub mod error;
pub mod events;
pub mod host;
pub mod math;
pub mod nav;
pub mod sim;
pub mod systems;

pub use config::AutopilotConfig;
pub use error::{CommandError, ConfigError, RouteError};
pub use events::FlightEvent;
pub use nav::{Autopilot, BotState, Command, EngagementPattern, Telemetry};
pub use systems::{AxisRemap, Direction, ThrustPower};
