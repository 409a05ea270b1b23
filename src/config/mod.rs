//! Configuration management for the indication engine.
//!
//! Provides layered configuration loading with priority:
//! 1. Default values (hardcoded)
//! 2. Optional config file
//! 3. Environment variables (highest priority, `IND_ENGINE__` prefix with
//!    `__` separator)
//!
//! Every field carries a serde default, so a manager can be assembled with
//! `NotifierConfig::default()` and no file at all.

mod manager;
mod poll;
mod retry;
pub use manager::*;
pub use poll::*;
pub use retry::*;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::Result;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct NotifierConfig {
    /// Namespace and indication construction settings
    #[serde(default)]
    pub manager: ManagerConfig,
    /// Polling tick settings (consumed by [`IntervalWatcher`](crate::IntervalWatcher))
    #[serde(default)]
    pub poll: PollConfig,
    /// Retry policies at the watcher boundary
    #[serde(default)]
    pub retry: RetryPolicies,
}

impl NotifierConfig {
    /// Load configuration, optionally merging a config file under the
    /// environment variables.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(p) = path {
            builder = builder.add_source(File::with_name(p).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("IND_ENGINE")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }
}
