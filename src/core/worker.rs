//! The background worker loop.
//!
//! One worker per manager. Each cycle: baseline-fill pairs that have no
//! snapshot yet, block in the watcher, then poll-and-diff (or gather) and
//! deliver one indication per detected change. Within a cycle, entries are
//! emitted in discovery order (previous-snapshot order for modifications
//! and deletions, current-snapshot order for creations), and all of cycle
//! N's indications are delivered before cycle N+1 begins.
//!
//! Lock discipline: the registry mutex is held across the poll step
//! (enumerate, rotate, diff) and released before the watcher blocks and
//! before any indication is delivered, so broker callbacks may re-enter
//! filter management without deadlock.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::trace;
use tracing::warn;

use super::indication::build_indication;
use super::manager::ManagerCore;
use crate::gen_diffs;
use crate::metrics::INDICATIONS_DELIVERED_METRIC;
use crate::metrics::INDICATION_DELIVERY_FAILURES_METRIC;
use crate::metrics::POLL_CYCLES_METRIC;
use crate::metrics::POLL_CYCLE_DURATION_METRIC;
use crate::utils::backoff::retry_with_backoff;
use crate::CimInstance;
use crate::DiffEntry;
use crate::Error;
use crate::LifecycleError;
use crate::Mode;
use crate::ObjectPath;
use crate::OperationContext;
use crate::Result;
use crate::RuntimeError;

pub(crate) struct IndicationWorker {
    core: Arc<ManagerCore>,
    ctx: OperationContext,
    cancel: CancellationToken,
}

impl IndicationWorker {
    pub(crate) fn new(
        core: Arc<ManagerCore>,
        ctx: OperationContext,
        cancel: CancellationToken,
    ) -> Self {
        Self { core, ctx, cancel }
    }

    /// Run until cancelled or a runtime error terminates the loop. There is
    /// no automatic restart: the error is surfaced to the main side on its
    /// next `stop` call.
    pub(crate) async fn run(self) -> Result<()> {
        let result = self.run_loop().await;
        match &result {
            Err(e) if e.is_cancelled() => info!("indication worker exiting: cancelled"),
            Err(e) => error!("indication worker terminated: {}", e),
            Ok(()) => {}
        }
        result
    }

    async fn run_loop(&self) -> Result<()> {
        loop {
            if self.cancel.is_cancelled() {
                return Err(LifecycleError::Cancelled.into());
            }
            if self.core.mode == Mode::Polling {
                self.baseline_fill().await?;
            }

            let woke = self.watch().await?;
            if self.cancel.is_cancelled() {
                return Err(LifecycleError::Cancelled.into());
            }
            if !woke {
                trace!("watcher wake without change");
                continue;
            }

            let entries = match self.core.mode {
                Mode::Polling => self.poll_cycle().await?,
                Mode::Push => self.gather_cycle().await?,
            };
            self.deliver_all(entries).await?;
        }
    }

    /// Block in the watcher under the configured backoff policy. No manager
    /// lock is held here, so `stop` and filter management stay responsive
    /// while the watcher waits on its resource.
    async fn watch(&self) -> Result<bool> {
        let watcher = self.core.watcher.clone();
        let cancel = self.cancel.clone();
        retry_with_backoff(
            move || {
                let watcher = watcher.clone();
                let cancel = cancel.clone();
                async move { watcher.watch(cancel).await }
            },
            &self.core.config.retry.watcher,
        )
        .await
    }

    /// First enumeration for any pair that has no snapshot yet: new pairs
    /// after `start`, and every pair after a restart (snapshots are
    /// discarded on `stop`).
    async fn baseline_fill(&self) -> Result<()> {
        let mut registry = self.core.registry.lock().await;
        let missing: Vec<ObjectPath> = registry
            .pairs()
            .filter(|pair| !pair.has_baseline())
            .map(|pair| pair.path.clone())
            .collect();
        for path in missing {
            debug!("baseline enumeration at {}", path);
            let snapshot = self.enumerate(&path).await?;
            registry.baseline(&path, snapshot);
        }
        Ok(())
    }

    async fn enumerate(
        &self,
        path: &ObjectPath,
    ) -> Result<Vec<CimInstance>> {
        self.core
            .broker
            .enumerate_instances(path)
            .await
            .map_err(|e| {
                RuntimeError::Enumeration {
                    path: path.canonical(),
                    reason: e.to_string(),
                }
                .into()
            })
    }

    /// Re-enumerate every watched path, rotate current into previous and
    /// collect the diff entries matching this manager's indication type.
    async fn poll_cycle(&self) -> Result<Vec<DiffEntry>> {
        let started = Instant::now();
        let ty = self.core.indication_type;

        let mut registry = self.core.registry.lock().await;
        let class = registry.class_name().unwrap_or("unfiltered").to_string();
        let mut entries = Vec::new();
        for path in registry.watched_paths() {
            let fresh = self.enumerate(&path).await?;
            if let Some(pair) = registry.pair_mut(&path) {
                if let Some(previous) = pair.previous.as_ref() {
                    entries.extend(gen_diffs(previous, &fresh, ty));
                }
                pair.current = Some(fresh);
                pair.rotate();
            }
        }

        POLL_CYCLES_METRIC.with_label_values(&[&class]).inc();
        POLL_CYCLE_DURATION_METRIC
            .with_label_values(&[&class])
            .observe(started.elapsed().as_millis() as f64);
        trace!("poll cycle produced {} diff entries", entries.len());
        Ok(entries)
    }

    /// Push mode: the gather source yields (old, new) pairs directly.
    /// Entries not matching this manager's indication type are dropped.
    async fn gather_cycle(&self) -> Result<Vec<DiffEntry>> {
        let Some(gather) = self.core.gather.as_ref() else {
            return Err(Error::Fatal("push mode without a gather source".to_string()));
        };
        let ty = self.core.indication_type;
        let entries = gather
            .gather()
            .await
            .map_err(|e| RuntimeError::Gather(e.to_string()))?;
        Ok(entries.into_iter().filter(|e| e.matches_type(ty)).collect())
    }

    /// Build and deliver one indication per entry. The registry lock is
    /// released here; only the recorded class name is read up front.
    async fn deliver_all(
        &self,
        entries: Vec<DiffEntry>,
    ) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let ty = self.core.indication_type;
        let class_name = self
            .core
            .registry
            .lock()
            .await
            .class_name()
            .map(str::to_string);
        let Some(class_name) = class_name else {
            warn!("dropping {} diff entries: no filter class recorded", entries.len());
            return Ok(());
        };

        for entry in entries {
            let indication = build_indication(
                &class_name,
                &entry,
                ty,
                &self.core.config.manager.indication_time_property,
            )?;
            match self.core.broker.deliver(&self.ctx.namespace, indication).await {
                Ok(()) => {
                    INDICATIONS_DELIVERED_METRIC.with_label_values(&[ty.as_str()]).inc();
                }
                Err(e) => {
                    INDICATION_DELIVERY_FAILURES_METRIC
                        .with_label_values(&[ty.as_str()])
                        .inc();
                    return Err(RuntimeError::Delivery(e.to_string()).into());
                }
            }
        }
        Ok(())
    }
}
