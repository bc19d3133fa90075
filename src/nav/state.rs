use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Autopilot states
// ---------------------------------------------------------------------------

/// Navigation state. `Chasing`, `Evading`, `Fleeing`, `Stalking` and `None`
/// are valid states with no behavior attached: a tick in one of them
/// commands nothing and never transitions on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BotState {
    None,
    Chasing,
    Engaging,
    Evading,
    Fleeing,
    Intercepting,
    Patrolling,
    Stalking,
    #[default]
    Waiting,
}

impl BotState {
    /// States the state machine actually drives.
    pub fn is_active(self) -> bool {
        matches!(self, BotState::Intercepting | BotState::Engaging | BotState::Patrolling)
    }
}

impl fmt::Display for BotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BotState::None => "None",
            BotState::Chasing => "Chasing",
            BotState::Engaging => "Engaging",
            BotState::Evading => "Evading",
            BotState::Fleeing => "Fleeing",
            BotState::Intercepting => "Intercepting",
            BotState::Patrolling => "Patrolling",
            BotState::Stalking => "Stalking",
            BotState::Waiting => "Waiting",
        };
        f.write_str(name)
    }
}

/// Lateral motion layered on top of station keeping while engaging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngagementPattern {
    #[default]
    None,
    Circling,
}

impl fmt::Display for EngagementPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngagementPattern::None => f.write_str("None"),
            EngagementPattern::Circling => f.write_str("Circling"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_waiting() {
        assert_eq!(BotState::default(), BotState::Waiting);
        assert_eq!(EngagementPattern::default(), EngagementPattern::None);
    }

    #[test]
    fn placeholder_states_are_inactive() {
        for s in [BotState::None, BotState::Chasing, BotState::Evading, BotState::Fleeing, BotState::Stalking] {
            assert!(!s.is_active(), "{s} should carry no behavior");
        }
        assert!(BotState::Patrolling.is_active());
    }
}
