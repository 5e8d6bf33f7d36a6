//! Named background threads with captured, observable failures.
//!
//! Any component can launch a background worker without repeating the
//! naming and failure-capture boilerplate. A [`Daemon`] runs its body once on
//! its own named thread; whatever escapes the body (an `Err` or a panic) is
//! stored for later inspection through [`Daemon::error`] and handed to a
//! [`FailureHandler`], which logs it by default.
//!
//! ```rust
//! use daemon_thread::Daemon;
//!
//! let daemon = Daemon::builder()
//!     .name("index-compactor")
//!     .body(|| {
//!         // background work
//!     })
//!     .build()?;
//!
//! daemon.start()?;
//! daemon.join()?;
//! assert!(daemon.error().is_none());
//! # Ok::<(), daemon_thread::DaemonError>(())
//! ```
//!
//! # Modules
//!
//! - [`builder`]: validated construction of daemons
//! - [`daemon`]: the daemon handle, its thread and the failure boundary
//! - [`error`]: errors returned to callers
//! - [`failure`]: failures captured from bodies
//! - [`handler`]: failure handlers and the logging default
//! - [`logging`]: optional `tracing` subscriber setup
//! - [`settings`]: thread and logging settings from TOML and environment
//!
//! Cancellation, retries and supervision are out of scope: a daemon launches
//! and observes, nothing more.

pub mod builder;
pub mod daemon;
pub mod error;
pub mod failure;
pub mod handler;
pub mod logging;
pub mod settings;

#[cfg(test)]
mod testing;

pub use builder::DaemonBuilder;
pub use daemon::{Daemon, DaemonState};
pub use error::{DaemonError, DaemonResult};
pub use failure::{BodyOutcome, BoxError, WorkerFailure};
pub use handler::{FailureHandler, LogFailureHandler};
pub use settings::{LogFormat, LoggingSettings, RuntimeSettings, ThreadSettings};
