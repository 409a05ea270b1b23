//! The indication manager: lifecycle, filter management and worker
//! ownership.
//!
//! ## Key Responsibilities
//! - Validates the assembly of collaborator seams at construction
//! - Owns the filter registry and the single background worker
//! - Drives the `Stopped -> Running -> Stopped` lifecycle with prompt,
//!   token-based cancellation (`stop` never hangs on a blocked watcher)
//!
//! ## Example
//! ```ignore
//! let manager = IndicationManagerBuilder::new(IndicationType::Creation, config)
//!     .broker(broker)
//!     .watcher(watcher)
//!     .polling()
//!     .allowed_classes(vec!["LMI_Account".into()])
//!     .build()?;
//! manager.add_filter(query).await?;
//! manager.start(OperationContext::new("root/cimv2")).await?;
//! ```
//!
//! ## Notes
//! - **Thread safety**: one manager-wide registry mutex; held only briefly
//!   by filter management and across the poll step, never across watcher or
//!   delivery callbacks.
//! - **Restart semantics**: `stop` discards all snapshots, so the next
//!   `start` re-baselines every watched path.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::worker::IndicationWorker;
use crate::metrics::ACTIVE_FILTERS_METRIC;
use crate::AllowListChecker;
use crate::CimBroker;
use crate::EventWatcher;
use crate::FilterChecker;
use crate::FilterError;
use crate::FilterRegistry;
use crate::IndicationType;
use crate::InstGather;
use crate::LifecycleError;
use crate::NotifierConfig;
use crate::OperationContext;
use crate::Result;
use crate::SelectExpression;
use crate::SetupError;

/// How diff entries are produced: by re-enumerating and diffing watched
/// paths, or by a caller-supplied gather source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Polling,
    Push,
}

/// Shared state between the manager handle and its worker.
pub(crate) struct ManagerCore {
    pub(crate) indication_type: IndicationType,
    pub(crate) mode: Mode,
    pub(crate) config: NotifierConfig,
    pub(crate) broker: Arc<dyn CimBroker>,
    pub(crate) watcher: Arc<dyn EventWatcher>,
    pub(crate) gather: Option<Arc<dyn InstGather>>,
    pub(crate) checker: Arc<dyn FilterChecker>,
    pub(crate) registry: Mutex<FilterRegistry>,
    pub(crate) running: AtomicBool,
}

#[derive(Default)]
struct Lifecycle {
    cancel: Option<CancellationToken>,
    handle: Option<JoinHandle<Result<()>>>,
}

/// Builder pattern implementation for assembling an [`IndicationManager`]
/// with its collaborator seams. Exactly one of polling mode or a gather
/// source must be selected; watcher and broker are always required.
pub struct IndicationManagerBuilder {
    indication_type: IndicationType,
    config: NotifierConfig,
    broker: Option<Arc<dyn CimBroker>>,
    watcher: Option<Arc<dyn EventWatcher>>,
    gather: Option<Arc<dyn InstGather>>,
    checker: Option<Arc<dyn FilterChecker>>,
    allowed_classes: Option<Vec<String>>,
    polling: bool,
}

impl IndicationManagerBuilder {
    pub fn new(
        indication_type: IndicationType,
        config: NotifierConfig,
    ) -> Self {
        Self {
            indication_type,
            config,
            broker: None,
            watcher: None,
            gather: None,
            checker: None,
            allowed_classes: None,
            polling: false,
        }
    }

    pub fn broker(
        mut self,
        broker: Arc<dyn CimBroker>,
    ) -> Self {
        self.broker = Some(broker);
        self
    }

    pub fn watcher(
        mut self,
        watcher: Arc<dyn EventWatcher>,
    ) -> Self {
        self.watcher = Some(watcher);
        self
    }

    /// Select polling mode: watched paths are re-enumerated and diffed on
    /// every wake. Incompatible with [`gather`](Self::gather).
    pub fn polling(mut self) -> Self {
        self.polling = true;
        self
    }

    /// Select push mode with the given gather source. Incompatible with
    /// [`polling`](Self::polling).
    pub fn gather(
        mut self,
        gather: Arc<dyn InstGather>,
    ) -> Self {
        self.gather = Some(gather);
        self
    }

    /// Custom filter checker, replacing the default allow-list one.
    pub fn filter_checker(
        mut self,
        checker: Arc<dyn FilterChecker>,
    ) -> Self {
        self.checker = Some(checker);
        self
    }

    /// Classes accepted by the default filter checker.
    pub fn allowed_classes(
        mut self,
        allowed: Vec<String>,
    ) -> Self {
        self.allowed_classes = Some(allowed);
        self
    }

    pub fn build(self) -> Result<IndicationManager> {
        let mode = match (self.polling, self.gather.is_some()) {
            (true, false) => Mode::Polling,
            (false, true) => Mode::Push,
            _ => return Err(SetupError::GatherConfig.into()),
        };
        let watcher = self.watcher.ok_or(SetupError::WatcherMissing)?;
        let broker = self.broker.ok_or(SetupError::BrokerMissing)?;
        let checker: Arc<dyn FilterChecker> = match (self.checker, self.allowed_classes) {
            (Some(custom), _) => custom,
            (None, Some(allowed)) => Arc::new(AllowListChecker::new(allowed)),
            (None, None) => return Err(SetupError::FilterCheckerMissing.into()),
        };

        Ok(IndicationManager {
            core: Arc::new(ManagerCore {
                indication_type: self.indication_type,
                mode,
                registry: Mutex::new(FilterRegistry::new(mode == Mode::Polling)),
                config: self.config,
                broker,
                watcher,
                gather: self.gather,
                checker,
                running: AtomicBool::new(false),
            }),
            lifecycle: Mutex::new(Lifecycle::default()),
        })
    }
}

/// A single-owner indication manager. Constructed by a provider at plugin
/// load, destroyed at cleanup; never shared across providers.
pub struct IndicationManager {
    pub(crate) core: Arc<ManagerCore>,
    lifecycle: Mutex<Lifecycle>,
}

impl IndicationManager {
    pub fn indication_type(&self) -> IndicationType {
        self.core.indication_type
    }

    pub fn mode(&self) -> Mode {
        self.core.mode
    }

    pub fn is_running(&self) -> bool {
        self.core.running.load(Ordering::Acquire)
    }

    pub async fn filter_count(&self) -> usize {
        self.core.registry.lock().await.filter_count()
    }

    /// Parse and validate a filter query against the configured checker.
    /// Called from the authorize/activate lifecycle hooks before
    /// [`add_filter`](Self::add_filter).
    pub fn verify_filter(
        &self,
        query: &str,
    ) -> Result<SelectExpression> {
        let expression = SelectExpression::parse(query)?;
        if !self.core.checker.check(&expression) {
            return Err(FilterError::ClassNotAllowed(expression.isa_class().to_string()).into());
        }
        Ok(expression)
    }

    /// Register a filter. In polling mode the filter's object path gets an
    /// enumeration pair; when the worker is already running, a brand-new
    /// pair is baseline-enumerated immediately so a late subscriber does
    /// not see pre-existing instances reported as created.
    pub async fn add_filter(
        &self,
        query: &str,
    ) -> Result<()> {
        let expression = SelectExpression::parse(query)?;
        let path = expression.object_path(&self.core.config.manager.namespace);

        let mut registry = self.core.registry.lock().await;
        let outcome = registry.add_filter(expression, path);
        ACTIVE_FILTERS_METRIC
            .with_label_values(&[registry.class_name().unwrap_or("unknown")])
            .set(registry.filter_count() as f64);

        if let Some(path) = outcome.created_pair {
            if self.core.mode == Mode::Polling && self.is_running() {
                debug!("immediate baseline enumeration at {} for late subscriber", path);
                let snapshot = self.core.broker.enumerate_instances(&path).await?;
                registry.baseline(&path, snapshot);
            }
        }
        Ok(())
    }

    /// Unregister the filter with this exact query text.
    pub async fn remove_filter(
        &self,
        query: &str,
    ) -> Result<()> {
        let mut registry = self.core.registry.lock().await;
        registry.remove_filter(query)?;
        ACTIVE_FILTERS_METRIC
            .with_label_values(&[registry.class_name().unwrap_or("unknown")])
            .set(registry.filter_count() as f64);
        Ok(())
    }

    /// Start the background worker. Fails with
    /// [`LifecycleError::AlreadyRunning`] when a worker exists, including a
    /// worker that has already terminated on error but was not yet stopped.
    pub async fn start(
        &self,
        ctx: OperationContext,
    ) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock().await;
        if lifecycle.handle.is_some() {
            return Err(LifecycleError::AlreadyRunning.into());
        }

        let cancel = CancellationToken::new();
        let worker = IndicationWorker::new(self.core.clone(), ctx, cancel.clone());
        self.core.running.store(true, Ordering::Release);
        lifecycle.cancel = Some(cancel);
        lifecycle.handle = Some(tokio::spawn(worker.run()));
        info!(
            "indication worker started ({:?}, {:?})",
            self.core.indication_type, self.core.mode
        );
        Ok(())
    }

    /// Stop the background worker and wait for it to exit. A no-op when not
    /// running. Snapshots are discarded, so the next `start` re-baselines
    /// every watched path. A worker that terminated with a runtime error
    /// surfaces that error here.
    pub async fn stop(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock().await;
        let Some(handle) = lifecycle.handle.take() else {
            debug!("stop requested while not running");
            return Ok(());
        };
        if let Some(cancel) = lifecycle.cancel.take() {
            cancel.cancel();
        }
        self.core.running.store(false, Ordering::Release);

        let joined = handle.await;
        self.core.registry.lock().await.clear_snapshots();
        info!("indication worker stopped");

        match joined {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) if e.is_cancelled() => Ok(()),
            Ok(Err(e)) => {
                warn!("indication worker had terminated with: {}", e);
                Err(e)
            }
            Err(join_error) => Err(LifecycleError::Join(join_error).into()),
        }
    }

    /// Stop if running, then release all filters and enumeration pairs.
    pub async fn destroy(&self) -> Result<()> {
        let stopped = self.stop().await;
        self.core.registry.lock().await.remove_all();
        info!("indication manager destroyed");
        stopped
    }
}
