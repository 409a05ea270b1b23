//! Stock watcher implementations.
//!
//! Providers with a real event source (inotify, D-Bus signals) implement
//! [`EventWatcher`] themselves; these two cover the common cases of a
//! periodic poll tick and an externally notified wake.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::EventWatcher;
use crate::LifecycleError;
use crate::PollConfig;
use crate::Result;

/// Wakes the worker on a fixed tick. Every wake reports a possible change,
/// so each tick triggers a full poll cycle.
#[derive(Debug, Clone)]
pub struct IntervalWatcher {
    interval: Duration,
}

impl IntervalWatcher {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_config(poll: &PollConfig) -> Self {
        Self::new(Duration::from_millis(poll.tick_interval_ms))
    }
}

#[async_trait]
impl EventWatcher for IntervalWatcher {
    async fn watch(
        &self,
        cancel: CancellationToken,
    ) -> Result<bool> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LifecycleError::Cancelled.into()),
            _ = sleep(self.interval) => Ok(true),
        }
    }
}

/// Wakes the worker whenever the paired [`Notify`] handle is signalled.
/// Useful for adapters that translate an external event stream (file
/// watches, bus signals) into wake-ups.
#[derive(Debug, Clone)]
pub struct NotifyWatcher {
    notify: Arc<Notify>,
}

impl NotifyWatcher {
    pub fn new() -> Self {
        Self {
            notify: Arc::new(Notify::new()),
        }
    }

    /// Handle used to signal a possible change.
    pub fn handle(&self) -> Arc<Notify> {
        self.notify.clone()
    }
}

impl Default for NotifyWatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventWatcher for NotifyWatcher {
    async fn watch(
        &self,
        cancel: CancellationToken,
    ) -> Result<bool> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LifecycleError::Cancelled.into()),
            _ = self.notify.notified() => Ok(true),
        }
    }
}
