// ── Synchronization tuning ──
//
// These describe *when* the engine polls. The CLI builds a `SyncConfig`
// and hands it in; core never reads config files.

use std::time::Duration;

/// Polling cadence configuration for the supervisor.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Steady cadence: silent background refresh, always running.
    pub steady_interval: Duration,
    /// Recovery cadence: visible reconnect attempts, only acted on
    /// while degraded.
    pub recovery_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            steady_interval: Duration::from_secs(2),
            recovery_interval: Duration::from_secs(3),
        }
    }
}
