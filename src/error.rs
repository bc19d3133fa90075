use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failures while loading or validating an [`AutopilotConfig`](crate::config::AutopilotConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Patrol route misuse. The route itself never becomes empty.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteError {
    #[error("a patrol route needs at least one waypoint")]
    Empty,

    #[error("waypoint {index} out of range (route has {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Rejected input on the free-text command channel.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("unrecognized command: {0:?}")]
    Unrecognized(String),

    #[error("waypoint selector {0} must be between 1 and 6")]
    WaypointOutOfRange(u8),
}
