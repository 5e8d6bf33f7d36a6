//! # Daemon Error Types
//!
//! Errors surfaced synchronously to the caller of the daemon API: construction,
//! lifecycle misuse, thread spawning, and ambient settings/logging setup.
//!
//! Failures raised by a daemon's body are *not* represented here; those are
//! captured asynchronously as [`WorkerFailure`](crate::WorkerFailure) values.

use thiserror::Error;

use crate::daemon::DaemonState;

/// Daemon operation result type
pub type DaemonResult<T> = Result<T, DaemonError>;

/// Errors returned by builder, lifecycle, settings and logging operations
#[derive(Debug, Error)]
pub enum DaemonError {
    /// A required builder field was missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Daemon '{name}' was already started (state: {state})")]
    AlreadyStarted { name: String, state: DaemonState },

    #[error("Daemon '{name}' has not been started")]
    NotStarted { name: String },

    #[error("Failed to spawn thread for daemon '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The thread unwound past the failure boundary
    #[error("Thread for daemon '{name}' terminated abnormally")]
    Join { name: String },

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl DaemonError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a logging setup error
    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging(message.into())
    }

    /// Check whether the caller can fix the input and try again
    ///
    /// Configuration and settings problems are fixed by supplying different
    /// input; a spawn failure leaves the daemon in `Created` so `start()` can be
    /// retried. Lifecycle misuse is never recoverable for the same daemon.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DaemonError::Configuration(_) | DaemonError::Settings(_) | DaemonError::Spawn { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_constructor() {
        let err = DaemonError::configuration("name required");
        match err {
            DaemonError::Configuration(msg) => assert_eq!(msg, "name required"),
            _ => panic!("Expected Configuration variant"),
        }
    }

    #[test]
    fn test_configuration_display() {
        let err = DaemonError::configuration("name required");
        assert_eq!(err.to_string(), "Configuration error: name required");
    }

    #[test]
    fn test_already_started_display_includes_state() {
        let err = DaemonError::AlreadyStarted {
            name: "flusher".to_string(),
            state: DaemonState::Running,
        };
        let msg = err.to_string();
        assert!(msg.contains("flusher"));
        assert!(msg.contains("running"));
    }

    #[test]
    fn test_spawn_error_exposes_source() {
        let err = DaemonError::Spawn {
            name: "flusher".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::OutOfMemory, "no threads left"),
        };
        let source = std::error::Error::source(&err).expect("spawn error should have a source");
        assert_eq!(source.to_string(), "no threads left");
    }

    #[test]
    fn test_is_recoverable() {
        assert!(DaemonError::configuration("name required").is_recoverable());
        assert!(!DaemonError::NotStarted {
            name: "flusher".to_string()
        }
        .is_recoverable());
        assert!(!DaemonError::AlreadyStarted {
            name: "flusher".to_string(),
            state: DaemonState::Completed,
        }
        .is_recoverable());
        assert!(!DaemonError::logging("subscriber already set").is_recoverable());
    }
}
