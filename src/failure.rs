//! # Worker Failures
//!
//! A [`WorkerFailure`] is whatever escaped a daemon's body: either an error the
//! body returned, or a panic that unwound out of it. Failures are cheap to
//! clone so handlers can keep their own copy.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt::Write as _;
use std::sync::Arc;

/// Boxed error type accepted from fallible bodies
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Failure captured from a daemon's body
#[derive(Debug, Clone, thiserror::Error)]
pub enum WorkerFailure {
    /// The body returned `Err`
    #[error(transparent)]
    Error(Arc<dyn StdError + Send + Sync + 'static>),

    /// The body panicked
    #[error("panicked: {message}")]
    Panic { message: String },
}

impl WorkerFailure {
    /// Wrap an error returned by a body
    pub fn from_error(error: impl Into<BoxError>) -> Self {
        let error: BoxError = error.into();
        Self::Error(Arc::from(error))
    }

    /// Build a failure from a panic payload caught at the failure boundary
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&'static str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "<non-string panic payload>".to_string());

        Self::Panic { message }
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panic { .. })
    }

    /// Borrow the original error as a concrete type, if it is one
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            Self::Error(error) => error.downcast_ref::<E>(),
            Self::Panic { .. } => None,
        }
    }

    /// Full description: the failure message followed by its `source()` chain
    pub fn detail(&self) -> String {
        let mut detail = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            let _ = write!(detail, "\n  caused by: {cause}");
            source = cause.source();
        }
        detail
    }
}

/// Normalizes what a body returns into a `Result`
///
/// Implemented for `()` (infallible bodies) and for `Result<(), E>` where the
/// error converts into [`BoxError`].
pub trait BodyOutcome {
    fn into_result(self) -> Result<(), BoxError>;
}

impl BodyOutcome for () {
    fn into_result(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E> BodyOutcome for Result<(), E>
where
    E: Into<BoxError>,
{
    fn into_result(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}
