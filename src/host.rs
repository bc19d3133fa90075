use nalgebra::{Rotation3, Vector3};

// ---------------------------------------------------------------------------
// Host contracts
// ---------------------------------------------------------------------------
//
// The simulation that owns the vehicle implements these. The core never
// constructs or destroys host entities; it only reads kinematics and writes
// actuator commands through them.

/// Kinematic view of the controlled vehicle.
pub trait Vehicle {
    /// Body -> world rotation (columns: right, up, backward).
    fn orientation(&self) -> Rotation3<f64>;
    fn position(&self) -> Vector3<f64>;
    fn linear_velocity(&self) -> Vector3<f64>;
    /// Natural gravity acceleration at the vehicle, zero in space.
    fn natural_gravity(&self) -> Vector3<f64>;
    /// Mass that thrust has to accelerate.
    fn physical_mass(&self) -> f64;
    /// Mass including inventory; reported only.
    fn total_mass(&self) -> f64 {
        self.physical_mass()
    }
    /// Toggle the host's built-in velocity damping.
    fn set_dampeners_enabled(&mut self, enabled: bool);
    /// Position of the externally tracked entity (e.g. a player), if any.
    fn tracked_position(&self) -> Option<Vector3<f64>> {
        None
    }
}

/// A translational actuator owned by the host.
pub trait Thruster {
    fn world_orientation(&self) -> Rotation3<f64>;
    fn is_working(&self) -> bool;
    /// Rated output under current conditions (N).
    fn max_effective_thrust(&self) -> f64;
    fn thrust_override(&self) -> f64;
    fn set_thrust_override(&mut self, value: f64);
}

/// A rotational actuator owned by the host. Rates are in the gyro's own
/// frame: pitch about X, yaw about Y, roll about Z.
pub trait Gyroscope {
    fn world_orientation(&self) -> Rotation3<f64>;
    fn set_override(&mut self, pitch: f64, yaw: f64, roll: f64);
    fn release_override(&mut self);
}

/// Two write-only text surfaces. Best effort; never blocks.
pub trait StatusSink {
    fn write_left(&mut self, text: &str);
    fn write_right(&mut self, text: &str);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl StatusSink for NullSink {
    fn write_left(&mut self, _text: &str) {}
    fn write_right(&mut self, _text: &str) {}
}

/// Keeps the latest text written to each surface.
#[derive(Debug, Default, Clone)]
pub struct TextSurfaces {
    pub left: String,
    pub right: String,
}

impl StatusSink for TextSurfaces {
    fn write_left(&mut self, text: &str) {
        self.left.clear();
        self.left.push_str(text);
    }

    fn write_right(&mut self, text: &str) {
        self.right.clear();
        self.right.push_str(text);
    }
}
