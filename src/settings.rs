//! # Runtime Settings
//!
//! Optional settings for daemon threads and for the convenience logging
//! initializer. Values are layered, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file passed to [`RuntimeSettings::load`]
//! 3. Environment variables prefixed with `DAEMON_`, using `__` between
//!    nested keys (`DAEMON_THREAD__STACK_SIZE_BYTES=1048576`,
//!    `DAEMON_LOGGING__FORMAT=json`)
//!
//! ```toml
//! [thread]
//! stack_size_bytes = 1048576
//!
//! [logging]
//! filter = "info,daemon_thread=debug"
//! format = "json"
//! ```
//!
//! Every settings struct also derives a `bon` builder for programmatic use.

use std::path::Path;

use bon::Builder;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::DaemonResult;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "DAEMON";

/// Filter used when neither settings nor `RUST_LOG` provide one
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Settings applied to each spawned daemon thread
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Builder)]
#[serde(default)]
pub struct ThreadSettings {
    /// Stack size for the spawned thread; platform default when unset
    pub stack_size_bytes: Option<usize>,
}

/// Output format for [`init_tracing`](crate::logging::init_tracing)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    #[display("compact")]
    Compact,
    #[display("json")]
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Builder)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directives; `RUST_LOG` takes precedence when set
    #[builder(into, default = DEFAULT_LOG_FILTER.to_string())]
    pub filter: String,

    #[builder(default)]
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Top-level settings document
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Builder)]
#[serde(default)]
pub struct RuntimeSettings {
    #[builder(default)]
    pub thread: ThreadSettings,

    #[builder(default)]
    pub logging: LoggingSettings,
}

impl RuntimeSettings {
    /// Load settings from defaults, an optional TOML file, and the environment
    ///
    /// A path that is given must exist; pass `None` to rely on defaults and
    /// environment overrides only.
    pub fn load(path: Option<&Path>) -> DaemonResult<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }
}
