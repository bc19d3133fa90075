use super::pid::{Pid, PidGains};

// ---------------------------------------------------------------------------
// Orientation override: desired yaw/pitch/roll, each filtered by its own PID
// ---------------------------------------------------------------------------

/// Desired rotation about the body axes, in radians.
///
/// Yaw is positive to the right, pitch positive nose-up, roll positive
/// clockwise as seen from behind.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrientationCommand {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl OrientationCommand {
    pub fn is_finite(&self) -> bool {
        self.yaw.is_finite() && self.pitch.is_finite() && self.roll.is_finite()
    }
}

#[derive(Debug, Clone)]
pub struct OrientationOverride {
    command: OrientationCommand,
    yaw_pid: Pid,
    pitch_pid: Pid,
    roll_pid: Pid,
}

impl OrientationOverride {
    pub fn new(gains: &PidGains, dt: f64) -> Self {
        Self {
            command: OrientationCommand::default(),
            yaw_pid: Pid::from_gains(gains, dt),
            pitch_pid: Pid::from_gains(gains, dt),
            roll_pid: Pid::from_gains(gains, dt),
        }
    }

    pub fn set(&mut self, command: OrientationCommand) {
        self.command = command;
    }

    /// Raw, unfiltered command as last written by the solver.
    pub fn command(&self) -> OrientationCommand {
        self.command
    }

    /// Advance all three controllers one sample and return the filtered
    /// rates.
    pub fn filtered(&mut self) -> OrientationCommand {
        OrientationCommand {
            yaw: self.yaw_pid.control(self.command.yaw),
            pitch: self.pitch_pid.control(self.command.pitch),
            roll: self.roll_pid.control(self.command.roll),
        }
    }

    pub fn reset(&mut self) {
        self.command = OrientationCommand::default();
        self.yaw_pid.reset();
        self.pitch_pid.reset();
        self.roll_pid.reset();
    }
}
