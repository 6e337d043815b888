//! Async client for the iotly device registry HTTP API.
//!
//! This crate is the wire layer only: URL construction, request/response
//! exchange, and JSON decoding. It knows nothing about polling cadence,
//! connectivity health, or the canonical device collection — that lives
//! in `iotly-core`.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::RegistryClient;
pub use error::ApiError;
pub use transport::TransportConfig;
pub use types::{CreateDeviceRequest, RegistryDevice, SetSwitchRequest, UpdateDeviceRequest};
