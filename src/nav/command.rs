use std::str::FromStr;

use crate::error::CommandError;

// ---------------------------------------------------------------------------
// Free-text command channel
// ---------------------------------------------------------------------------

/// One message from the host's chat/debug channel. Only the first
/// character matters, case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `0` or `x`.
    Reset,
    /// `1`..=`6`: intercept the patrol route's node n-1.
    SelectWaypoint(u8),
    /// `d`: hand velocity damping to the thrust engine.
    EnableDamping,
    /// `p`: head for the host's tracked position.
    TrackExternal,
    /// `t`: full thrust forward.
    ForceForwardThrust,
    /// `r`: patrol with no engagement range.
    Patrol,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(first) = s.trim_start().chars().next() else {
            return Err(CommandError::Unrecognized(s.to_string()));
        };
        match first.to_ascii_lowercase() {
            '0' | 'x' => Ok(Command::Reset),
            c @ '1'..='6' => Ok(Command::SelectWaypoint(c as u8 - b'0')),
            c @ ('7'..='9') => Err(CommandError::WaypointOutOfRange(c as u8 - b'0')),
            'd' => Ok(Command::EnableDamping),
            'p' => Ok(Command::TrackExternal),
            't' => Ok(Command::ForceForwardThrust),
            'r' => Ok(Command::Patrol),
            _ => Err(CommandError::Unrecognized(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_by_first_character() {
        assert_eq!("0".parse(), Ok(Command::Reset));
        assert_eq!("X marks the spot".parse(), Ok(Command::Reset));
        assert_eq!("3".parse(), Ok(Command::SelectWaypoint(3)));
        assert_eq!("dampen".parse(), Ok(Command::EnableDamping));
        assert_eq!("P".parse(), Ok(Command::TrackExternal));
        assert_eq!("thrust".parse(), Ok(Command::ForceForwardThrust));
        assert_eq!("  route".parse(), Ok(Command::Patrol));
    }

    #[test]
    fn rejects_unknown_input() {
        assert_eq!("9".parse::<Command>(), Err(CommandError::WaypointOutOfRange(9)));
        assert_eq!("hello".parse::<Command>(), Err(CommandError::Unrecognized("hello".into())));
        assert!("".parse::<Command>().is_err());
    }
}
