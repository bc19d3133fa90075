use crate::nav::state::{BotState, EngagementPattern};
use crate::systems::arena::ActuatorId;
use crate::systems::direction::Direction;

// ---------------------------------------------------------------------------
// Flight events
// ---------------------------------------------------------------------------

/// Observable notifications, queued by the component that raised them and
/// drained by whoever drives the tick.
#[derive(Debug, Clone, PartialEq)]
pub enum FlightEvent {
    /// A request exceeded the pool's total capacity; maximal output was
    /// applied anyway.
    InsufficientThrust {
        direction: Direction,
        requested: f64,
        available: f64,
    },
    StateChanged { from: BotState, to: BotState },
    EngagementPatternChanged(EngagementPattern),
    WaypointAdvanced { waypoint: usize },
    ThrusterAttached { id: ActuatorId, direction: Direction },
    ThrusterDetached { id: ActuatorId, direction: Direction },
    /// The thruster is not aligned with any body axis and was dropped.
    ThrusterDiscarded,
    GyroAttached { id: ActuatorId },
    GyroDetached { id: ActuatorId },
}

/// A queue of events in raise order.
#[derive(Debug, Default, Clone)]
pub struct EventQueue {
    events: Vec<FlightEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: FlightEvent) {
        self.events.push(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = FlightEvent>) {
        self.events.extend(events);
    }

    /// Remove and return everything queued so far.
    pub fn take(&mut self) -> Vec<FlightEvent> {
        std::mem::take(&mut self.events)
    }
}
