//! # Failure Handlers
//!
//! A [`FailureHandler`] is told about every failure that escapes a daemon's
//! body. Handlers run on the daemon's own thread, after the failure has been
//! captured, so [`Daemon::error`](crate::Daemon::error) already reports it
//! when the handler is invoked.
//!
//! The default is [`LogFailureHandler`], a stateless value installed by the
//! builder when no handler is supplied. There is no process-wide mutable
//! default.

use tracing::error;

use crate::failure::WorkerFailure;

/// Receives failures that escaped a daemon's body
///
/// Implemented for any `Fn(&str, &WorkerFailure) + Send + Sync` closure, so a
/// closure can be passed directly to
/// [`DaemonBuilder::failure_handler`](crate::DaemonBuilder::failure_handler).
pub trait FailureHandler: Send + Sync {
    /// Called once, on the daemon thread, with the daemon name and its failure
    fn on_failure(&self, name: &str, failure: &WorkerFailure);
}

impl<F> FailureHandler for F
where
    F: Fn(&str, &WorkerFailure) + Send + Sync,
{
    fn on_failure(&self, name: &str, failure: &WorkerFailure) {
        self(name, failure)
    }
}

/// Logs the failure at `ERROR` and takes no further action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogFailureHandler;

impl FailureHandler for LogFailureHandler {
    fn on_failure(&self, name: &str, failure: &WorkerFailure) {
        error!(
            daemon = name,
            failure = %failure.detail(),
            "{} threw an uncaught exception",
            name
        );
    }
}
