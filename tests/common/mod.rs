//! Shared helpers for daemon integration tests
#![allow(dead_code)]

#[path = "../../src/testing.rs"]
mod testing;

pub(crate) use testing::CapturedLogs;

/// Error type used by failing test bodies
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct RuntimeFailure(pub String);

impl RuntimeFailure {
    pub fn new(message: &str) -> Self {
        Self(message.to_string())
    }
}
