//! Collaborator seams.
//!
//! Each concrete provider plugs its environment in through these traits:
//! the host broker (instance enumeration + indication transport), a change
//! watcher over the underlying resource, an optional push-mode gather
//! source, and a filter checker. Every seam is a single-method capability;
//! mocks are generated for tests.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio_util::sync::CancellationToken;

use crate::CimInstance;
use crate::DiffEntry;
use crate::ObjectPath;
use crate::Result;
use crate::SelectExpression;

/// The host CIMOM boundary: object enumeration for polling mode and the
/// indication delivery transport. Implementations must not call back into
/// filter management from `enumerate_instances` (the manager may hold its
/// registry lock across that call).
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CimBroker: Send + Sync + 'static {
    /// Enumerate the current instances at the watched path.
    async fn enumerate_instances(
        &self,
        path: &ObjectPath,
    ) -> Result<Vec<CimInstance>>;

    /// Deliver one indication into the given namespace. Fire-and-forget at
    /// the CIM level; failures terminate the worker.
    async fn deliver(
        &self,
        namespace: &str,
        indication: CimInstance,
    ) -> Result<()>;
}

/// A blocking change signal over the watched resource (an inotify file
/// watch, a D-Bus signal wait, a periodic tick).
///
/// `watch` blocks until something may have changed (`true`), a benign wake
/// happens (`false`, the worker loops without polling), or the token is
/// cancelled, in which case it must return promptly with
/// [`LifecycleError::Cancelled`](crate::LifecycleError::Cancelled). No
/// manager lock is held while the watcher runs. Watcher failures are
/// retried by the worker under the configured backoff policy before the
/// loop gives up.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EventWatcher: Send + Sync + 'static {
    async fn watch(
        &self,
        cancel: CancellationToken,
    ) -> Result<bool>;
}

/// Push-mode source: yields (old, new) pairs directly from the event
/// stream, replacing the poll-and-diff step.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait InstGather: Send + Sync + 'static {
    async fn gather(&self) -> Result<Vec<DiffEntry>>;
}

/// Validates a subscriber-supplied filter before it is accepted.
#[cfg_attr(test, automock)]
pub trait FilterChecker: Send + Sync + 'static {
    fn check(
        &self,
        expression: &SelectExpression,
    ) -> bool;
}

/// Default checker: accepts a filter only when its `ISA` target is on the
/// provider's allow-list.
#[derive(Debug, Clone)]
pub struct AllowListChecker {
    allowed: Vec<String>,
}

impl AllowListChecker {
    pub fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }
}

impl FilterChecker for AllowListChecker {
    fn check(
        &self,
        expression: &SelectExpression,
    ) -> bool {
        self.allowed.iter().any(|class| class == expression.isa_class())
    }
}
