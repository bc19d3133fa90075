pub mod actuator;
pub mod arena;
pub mod dampeners;
pub mod direction;
pub mod gyros;
pub mod remap;
pub mod thrusters;

pub use actuator::{classify, ControllableGyro, ControllableThruster};
pub use arena::{ActuatorId, Arena};
pub use dampeners::DampenerSolution;
pub use direction::{Direction, DirectionMap, ThrustPower};
pub use gyros::GyroBank;
pub use remap::AxisRemap;
pub use thrusters::ThrustAllocator;
