// Shared transport configuration for building reqwest::Client instances.
//
// Keeps timeout and user-agent settings in one place so every
// RegistryClient is built the same way.

use std::time::Duration;

/// Transport configuration for the registry HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout. A registry that does not answer within this
    /// window is treated the same as one that refused the connection.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::ApiError> {
        Ok(reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("iotly/", env!("CARGO_PKG_VERSION")))
            .build()?)
    }
}
