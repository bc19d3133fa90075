pub mod attitude;
pub mod orientation;
pub mod pid;

pub use attitude::{rotation_angles_simultaneous, rotation_angles_with_roll, AttitudeAlgorithm};
pub use orientation::{OrientationCommand, OrientationOverride};
pub use pid::{Pid, PidGains};
