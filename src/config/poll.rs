use serde::Deserialize;

/// Polling tick settings.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct PollConfig {
    /// Interval between poll wake-ups (unit: milliseconds)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

fn default_tick_interval_ms() -> u64 {
    3000
}
