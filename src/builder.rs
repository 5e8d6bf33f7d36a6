//! # Daemon Builder
//!
//! Collects a daemon's name, body, failure handler and thread settings, then
//! validates them in [`DaemonBuilder::build`].
//!
//! Validation is driven by the [`REQUIRED_FIELDS`] table; adding a required
//! field means adding a row there.
//!
//! A daemon built without a body is valid: it completes immediately when
//! started.

use std::fmt;

use tracing::debug;

use crate::daemon::{Body, Daemon};
use crate::error::{DaemonError, DaemonResult};
use crate::failure::BodyOutcome;
use crate::handler::{FailureHandler, LogFailureHandler};
use crate::settings::ThreadSettings;

/// One required-field rule: the field name and a check returning the reason
/// the field is invalid
struct FieldRule {
    field: &'static str,
    check: fn(&DaemonBuilder) -> Result<(), &'static str>,
}

const REQUIRED_FIELDS: &[FieldRule] = &[FieldRule {
    field: "name",
    check: check_name,
}];

fn check_name(builder: &DaemonBuilder) -> Result<(), &'static str> {
    match builder.name.as_deref() {
        None | Some("") => Err("required"),
        // Thread names are handed to the OS as C strings.
        Some(name) if name.contains('\0') => Err("must not contain NUL bytes"),
        Some(_) => Ok(()),
    }
}

/// Configures a [`Daemon`]
///
/// Obtained from [`Daemon::builder`].
///
/// ```rust
/// use daemon_thread::{Daemon, DaemonError};
///
/// let err = Daemon::builder().body(|| ()).build().unwrap_err();
/// assert!(matches!(err, DaemonError::Configuration(ref msg) if msg == "name required"));
/// ```
#[derive(Default)]
pub struct DaemonBuilder {
    name: Option<String>,
    body: Option<Body>,
    on_failure: Option<Box<dyn FailureHandler>>,
    thread: ThreadSettings,
}

impl DaemonBuilder {
    /// Thread name; validated by [`build`](Self::build)
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Work to run on the daemon thread
    ///
    /// The closure may return `()` or `Result<(), E>`. An `Err`, like a panic,
    /// becomes the daemon's captured failure.
    pub fn body<F, R>(mut self, body: F) -> Self
    where
        F: FnOnce() -> R + Send + 'static,
        R: BodyOutcome,
    {
        self.body = Some(Box::new(move || body().into_result()));
        self
    }

    /// Replace the default [`LogFailureHandler`]
    ///
    /// Closures need their argument types spelled out:
    /// `|name: &str, failure: &WorkerFailure| { ... }`.
    pub fn failure_handler(mut self, handler: impl FailureHandler + 'static) -> Self {
        self.on_failure = Some(Box::new(handler));
        self
    }

    pub fn thread_settings(mut self, settings: ThreadSettings) -> Self {
        self.thread = settings;
        self
    }

    /// Validate and produce the daemon
    ///
    /// Fails with [`DaemonError::Configuration`] when a required field is
    /// missing or invalid.
    pub fn build(self) -> DaemonResult<Daemon> {
        for rule in REQUIRED_FIELDS {
            (rule.check)(&self).map_err(|reason| {
                DaemonError::configuration(format!("{} {}", rule.field, reason))
            })?;
        }

        let name = self
            .name
            .ok_or_else(|| DaemonError::configuration("name required"))?;

        if self.body.is_none() {
            debug!(daemon = %name, "daemon built without a body");
        }

        let on_failure = self
            .on_failure
            .unwrap_or_else(|| Box::new(LogFailureHandler));

        Ok(Daemon::new(name, self.body, on_failure, self.thread))
    }
}

impl fmt::Debug for DaemonBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DaemonBuilder")
            .field("name", &self.name)
            .field("has_body", &self.body.is_some())
            .field("custom_failure_handler", &self.on_failure.is_some())
            .field("thread", &self.thread)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::DaemonState;
    use crate::failure::WorkerFailure;

    fn configuration_message(err: DaemonError) -> String {
        match err {
            DaemonError::Configuration(msg) => msg,
            other => panic!("Expected Configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let err = DaemonBuilder::default().body(|| ()).build().unwrap_err();
        assert_eq!(configuration_message(err), "name required");
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let err = Daemon::builder().name("").build().unwrap_err();
        assert_eq!(configuration_message(err), "name required");
    }

    #[test]
    fn test_nul_in_name_is_rejected() {
        let err = Daemon::builder().name("bad\0name").build().unwrap_err();
        assert_eq!(configuration_message(err), "name must not contain NUL bytes");
    }

    #[test]
    fn test_valid_name_builds_background_daemon() {
        let daemon = Daemon::builder().name("worker-1").build().unwrap();
        assert_eq!(daemon.name(), "worker-1");
        assert!(daemon.is_background());
        assert_eq!(daemon.state(), DaemonState::Created);
    }

    #[test]
    fn test_last_name_wins() {
        let daemon = Daemon::builder()
            .name("first")
            .name("second")
            .build()
            .unwrap();
        assert_eq!(daemon.name(), "second");
    }

    #[test]
    fn test_fallible_and_infallible_bodies_are_accepted() {
        let infallible = Daemon::builder().name("infallible").body(|| ()).build();
        let fallible = Daemon::builder()
            .name("fallible")
            .body(|| Ok::<(), std::io::Error>(()))
            .build();
        assert!(infallible.is_ok());
        assert!(fallible.is_ok());
    }

    #[test]
    fn test_debug_hides_closures() {
        let builder = Daemon::builder()
            .name("dbg")
            .body(|| ())
            .failure_handler(|_: &str, _: &WorkerFailure| {});
        let debug = format!("{builder:?}");
        assert!(debug.contains("\"dbg\""));
        assert!(debug.contains("has_body: true"));
        assert!(debug.contains("custom_failure_handler: true"));
    }
}
