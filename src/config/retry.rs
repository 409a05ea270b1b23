use serde::Deserialize;

/// Basic retry policy template
#[derive(Debug, Deserialize, Clone, Copy, Default)]
pub struct BackoffPolicy {
    /// Maximum number of attempts (0 means unlimited retries)
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Single attempt timeout (unit: milliseconds; 0 disables the timeout,
    /// required for watchers that legitimately block until an event)
    #[serde(default)]
    pub timeout_ms: u64,

    /// Backoff base (unit: milliseconds)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Maximum backoff time (unit: milliseconds)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

/// Divide strategies by engine boundary
#[derive(Debug, Deserialize, Clone)]
pub struct RetryPolicies {
    // Watcher boundary: a failing resource watch is re-tried with backoff
    // before the worker gives up
    #[serde(default)]
    pub watcher: BackoffPolicy,
}

impl Default for RetryPolicies {
    fn default() -> Self {
        Self {
            watcher: BackoffPolicy {
                max_retries: 5,
                timeout_ms: 0,
                base_delay_ms: 100,
                max_delay_ms: 5000,
            },
        }
    }
}
fn default_max_retries() -> usize {
    5
}
fn default_base_delay_ms() -> u64 {
    100
}
fn default_max_delay_ms() -> u64 {
    5000
}
