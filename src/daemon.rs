//! # Daemon Threads
//!
//! A [`Daemon`] owns one named background thread. The body runs behind a
//! failure boundary: an `Err` returned by the body or a panic unwinding out of
//! it is captured once into the daemon, then reported to the configured
//! [`FailureHandler`]. Nothing escapes to the caller's thread.
//!
//! ## States
//!
//! - **Created**: built, not yet started
//! - **Running**: thread spawned, body executing
//! - **Completed**: body returned normally
//! - **Failed**: body failed; [`Daemon::error`] is populated
//!
//! Rust threads never keep the process alive once `main` returns, so every
//! daemon is a background thread by construction.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, debug_span, warn, Dispatch};

use crate::builder::DaemonBuilder;
use crate::error::{DaemonError, DaemonResult};
use crate::failure::{BoxError, WorkerFailure};
use crate::handler::FailureHandler;
use crate::settings::ThreadSettings;

/// Type-erased body, already normalized to a `Result`
pub(crate) type Body = Box<dyn FnOnce() -> Result<(), BoxError> + Send + 'static>;

/// Lifecycle state of a daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[repr(u8)]
pub enum DaemonState {
    #[display("created")]
    Created = 0,
    #[display("running")]
    Running = 1,
    #[display("completed")]
    Completed = 2,
    #[display("failed")]
    Failed = 3,
}

impl DaemonState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Created,
            1 => Self::Running,
            2 => Self::Completed,
            _ => Self::Failed,
        }
    }

    /// Whether the daemon has finished running, successfully or not
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// State shared between the daemon handle and its thread
struct DaemonShared {
    name: String,
    /// Taken by the thread when it starts running
    body: Mutex<Option<Body>>,
    on_failure: Box<dyn FailureHandler>,
    failure: OnceLock<WorkerFailure>,
    state: AtomicU8,
}

impl DaemonShared {
    fn state(&self) -> DaemonState {
        if self.failure.get().is_some() {
            return DaemonState::Failed;
        }
        DaemonState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Thread entry point: run the body behind the failure boundary
    fn run(&self) {
        let span = debug_span!("daemon", name = %self.name);
        let _entered = span.enter();

        let body = self
            .body
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let outcome = match body {
            Some(body) => panic::catch_unwind(AssertUnwindSafe(body)),
            None => Ok(Ok(())),
        };

        match outcome {
            Ok(Ok(())) => {
                self.state.store(DaemonState::Completed as u8, Ordering::Release);
                debug!(daemon = %self.name, "daemon completed");
            }
            Ok(Err(error)) => self.fail(WorkerFailure::from_error(error)),
            Err(payload) => self.fail(WorkerFailure::from_panic(payload)),
        }
    }

    fn fail(&self, failure: WorkerFailure) {
        // The body runs at most once, so this is the only write.
        let failure = self.failure.get_or_init(|| failure);
        self.state.store(DaemonState::Failed as u8, Ordering::Release);

        let reported = panic::catch_unwind(AssertUnwindSafe(|| {
            self.on_failure.on_failure(&self.name, failure)
        }));

        if let Err(payload) = reported {
            let handler_failure = WorkerFailure::from_panic(payload);
            warn!(
                daemon = %self.name,
                handler_failure = %handler_failure,
                "Failure handler panicked; original failure kept"
            );
        }
    }
}

/// A named background thread with a captured, observable failure
///
/// Built with [`Daemon::builder`], started once with [`Daemon::start`].
///
/// ```rust
/// use daemon_thread::Daemon;
///
/// let daemon = Daemon::builder()
///     .name("cache-warmer")
///     .body(|| Err::<(), _>("backend unreachable"))
///     .failure_handler(|_name: &str, _failure: &daemon_thread::WorkerFailure| {})
///     .build()?;
///
/// daemon.start()?;
/// daemon.join()?;
/// assert_eq!(daemon.error().unwrap().to_string(), "backend unreachable");
/// # Ok::<(), daemon_thread::DaemonError>(())
/// ```
pub struct Daemon {
    shared: Arc<DaemonShared>,
    thread: ThreadSettings,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Daemon {
    /// Start configuring a new daemon
    pub fn builder() -> DaemonBuilder {
        DaemonBuilder::default()
    }

    pub(crate) fn new(
        name: String,
        body: Option<Body>,
        on_failure: Box<dyn FailureHandler>,
        thread: ThreadSettings,
    ) -> Self {
        Self {
            shared: Arc::new(DaemonShared {
                name,
                body: Mutex::new(body),
                on_failure,
                failure: OnceLock::new(),
                state: AtomicU8::new(DaemonState::Created as u8),
            }),
            thread,
            handle: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Always `true`: a daemon never keeps the process alive
    pub fn is_background(&self) -> bool {
        true
    }

    pub fn state(&self) -> DaemonState {
        self.shared.state()
    }

    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    /// The failure that escaped the body, if any
    ///
    /// Never blocks. Returns `None` until the body has failed.
    pub fn error(&self) -> Option<&WorkerFailure> {
        self.shared.failure.get()
    }

    /// Spawn the daemon thread
    ///
    /// Returns once the thread exists. A daemon can only be started once; later
    /// calls fail with [`DaemonError::AlreadyStarted`]. If the OS refuses to
    /// create the thread the daemon stays in `Created` and may be started again.
    pub fn start(&self) -> DaemonResult<()> {
        // A concurrent join() holds the handle lock until the body ends.
        let current = self.state();
        if current != DaemonState::Created {
            return Err(self.already_started(current));
        }

        let mut handle_slot = self.handle.lock().unwrap_or_else(PoisonError::into_inner);

        if let Err(current) = self.shared.state.compare_exchange(
            DaemonState::Created as u8,
            DaemonState::Running as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            return Err(self.already_started(DaemonState::from_u8(current)));
        }

        let mut builder = thread::Builder::new().name(self.shared.name.clone());
        if let Some(stack_size) = self.thread.stack_size_bytes {
            builder = builder.stack_size(stack_size);
        }

        // The thread logs through the caller's subscriber, scoped or global.
        let dispatch = tracing::dispatcher::get_default(Dispatch::clone);
        let shared = Arc::clone(&self.shared);

        let spawned = builder.spawn(move || {
            tracing::dispatcher::with_default(&dispatch, || shared.run());
        });

        match spawned {
            Ok(handle) => {
                *handle_slot = Some(handle);
                debug!(daemon = %self.shared.name, "daemon thread spawned");
                Ok(())
            }
            Err(source) => {
                self.shared
                    .state
                    .store(DaemonState::Created as u8, Ordering::Release);
                Err(DaemonError::Spawn {
                    name: self.shared.name.clone(),
                    source,
                })
            }
        }
    }

    fn already_started(&self, state: DaemonState) -> DaemonError {
        DaemonError::AlreadyStarted {
            name: self.shared.name.clone(),
            state,
        }
    }

    /// Block until the daemon thread has finished
    ///
    /// Body failures are not errors here; inspect [`Daemon::error`] instead.
    /// Joining an already joined daemon returns immediately.
    pub fn join(&self) -> DaemonResult<()> {
        let mut handle_slot = self.handle.lock().unwrap_or_else(PoisonError::into_inner);

        match handle_slot.take() {
            Some(handle) => handle.join().map_err(|_| DaemonError::Join {
                name: self.shared.name.clone(),
            }),
            None if self.state() == DaemonState::Created => Err(DaemonError::NotStarted {
                name: self.shared.name.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Daemon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Daemon")
            .field("name", &self.shared.name)
            .field("state", &self.state())
            .field("error", &self.error())
            .field("thread", &self.thread)
            .finish_non_exhaustive()
    }
}
