// ── Core error types ──
//
// Exactly one user-meaningful failure kind exists in this engine:
// the registry could not be reached or did not behave. "Device not
// found" and "network down" surface identically to the operator; the
// underlying detail is preserved in the reason string for logs.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Any failure of a registry call — timeout, refusal, bad status,
    /// malformed response. Never fatal: the engine degrades and keeps
    /// retrying on its polling cadence.
    #[error("registry unreachable: {reason}")]
    RegistryUnreachable { reason: String },

    /// The supervisor has been shut down; no further calls are serviced.
    #[error("synchronization engine is shut down")]
    ShutDown,
}

impl From<iotly_api::ApiError> for CoreError {
    fn from(err: iotly_api::ApiError) -> Self {
        Self::RegistryUnreachable {
            reason: err.to_string(),
        }
    }
}
