pub mod csv;
pub mod event;
pub mod integrator;
pub mod runner;
pub mod state;
pub mod summary;
pub mod vehicle;

pub use event::{EventDetector, EventKind, ProximityDetector, RestDetector, SimEvent};
pub use integrator::rk4_step;
pub use runner::{rig_autopilot, simulate, simulate_with, FlightLog, Sample};
pub use state::{BodyState, SimConfig};
pub use summary::FlightSummary;
pub use vehicle::{MountedThruster, SimVehicle, SimVehicleBuilder};
