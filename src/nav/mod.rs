pub mod autopilot;
pub mod command;
pub mod kinematics;
pub mod patrol;
pub mod state;

pub use autopilot::{Autopilot, Telemetry};
pub use command::Command;
pub use patrol::PatrolRoute;
pub use state::{BotState, EngagementPattern};
