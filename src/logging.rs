//! Convenience `tracing` subscriber setup for binaries embedding daemons.
//!
//! Library code only emits events; it never installs a subscriber itself.
//! Daemon threads log through the dispatcher that was current when they were
//! started, so a subscriber installed here is seen by every daemon.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{DaemonError, DaemonResult};
use crate::settings::{LogFormat, LoggingSettings};

/// Build the filter: `RUST_LOG` when set, otherwise the configured directives
fn build_filter(settings: &LoggingSettings) -> DaemonResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.filter).map_err(|e| {
            DaemonError::logging(format!("invalid filter '{}': {}", settings.filter, e))
        }),
    }
}

/// Install the global subscriber described by `settings`
///
/// Returns [`DaemonError::Logging`] if the filter does not parse or a global
/// subscriber is already installed.
pub fn init_tracing(settings: &LoggingSettings) -> DaemonResult<()> {
    let filter = build_filter(settings)?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = match settings.format {
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_thread_names(true)
                    .compact(),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_thread_names(true)
                    .json(),
            )
            .try_init(),
    };

    result.map_err(|e| DaemonError::logging(e.to_string()))?;

    tracing::debug!(format = %settings.format, "tracing initialized");
    Ok(())
}
