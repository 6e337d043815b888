use thiserror::Error;

/// Top-level error type for the `iotly-api` crate.
///
/// Covers every failure mode of a registry round-trip: transport,
/// HTTP status, and payload decoding. `iotly-core` folds all of these
/// into a single connectivity verdict — the registry is either
/// reachable and well-behaved, or it is not.
#[derive(Debug, Error)]
pub enum ApiError {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Registry responses ──────────────────────────────────────────
    /// Non-success status from the registry.
    #[error("Registry error (HTTP {status}): {message}")]
    Registry { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}
