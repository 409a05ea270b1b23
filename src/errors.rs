//! Indication Engine Error Hierarchy
//!
//! Defines error types for the lifecycle indication engine, categorized by
//! the phase they occur in: manager assembly, filter handling, worker
//! lifecycle and runtime collaboration with the host broker.

use std::time::Duration;

use config::ConfigError;
use tokio::task::JoinError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration loading/validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Manager assembly failures (bad callback combination, missing seams)
    #[error(transparent)]
    Setup(#[from] SetupError),

    /// Filter registration and query parsing failures
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Worker lifecycle failures
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Failures raised while polling, gathering or delivering
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// Unrecoverable failures requiring manager teardown
    #[error("Fatal error: {0}")]
    Fatal(String),
}

/// Construction-time misconfiguration. No manager is created when any of
/// these is returned by the builder.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// Exactly one of polling mode or a gather source must be selected
    #[error("Exactly one of polling mode or a gather source must be configured")]
    GatherConfig,

    #[error("An event watcher is required")]
    WatcherMissing,

    #[error("A broker is required")]
    BrokerMissing,

    /// Neither a custom filter checker nor an allowed-class list was given
    #[error("A filter checker or an allowed-class list is required")]
    FilterCheckerMissing,
}

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// Malformed or unsupported select expression
    #[error("Invalid select expression: {0}")]
    InvalidSelectExpression(String),

    /// The ISA target class is not on the provider's allow-list
    #[error("Filter class not allowed: {0}")]
    ClassNotAllowed(String),

    /// Removal target absent
    #[error("No filter registered for query: {0}")]
    NotFound(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// `start` called while the worker is already running
    #[error("Indication worker is already running")]
    AlreadyRunning,

    /// Worker terminated due to `stop`
    #[error("Indication worker cancelled")]
    Cancelled,

    /// Worker task panicked or could not be joined
    #[error("Background worker failed: {0}")]
    Join(#[from] JoinError),
}

/// Errors surfaced by collaborators during a worker cycle. Any of these
/// terminates the worker loop; there is no automatic restart.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("Instance enumeration failed at {path}: {reason}")]
    Enumeration { path: String, reason: String },

    #[error("Indication delivery failed: {0}")]
    Delivery(String),

    #[error("Gather source failed: {0}")]
    Gather(String),

    #[error("Event watcher failed: {0}")]
    Watch(String),

    /// Single retried attempt exceeded its time budget
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Native allocation failure reported by a collaborator
    #[error("Allocation failed: {0}")]
    Allocation(String),
}

impl Error {
    /// True when the error is the normal worker exit on cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Lifecycle(LifecycleError::Cancelled))
    }
}
