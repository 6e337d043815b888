//! Core synchronization engine for the iotly workspace.
//!
//! Maintains a local replica of a remote device registry by polling,
//! exposes a connectivity state machine for degraded-mode handling,
//! executes mutation commands optimistically, and projects filtered
//! views of the device collection. Transport lives in `iotly-api`;
//! this crate is runtime plumbing and domain logic only.

pub mod command;
pub mod config;
pub mod error;
pub mod filter;
pub mod health;
pub mod model;
pub mod notice;
pub mod registry;
pub mod store;
pub mod sync;

pub use command::Command;
pub use config::SyncConfig;
pub use error::CoreError;
pub use filter::DeviceFilter;
pub use health::{ConnectivityState, PollOutcome};
pub use model::{Device, DeviceCollection, DeviceId, DeviceMode};
pub use notice::Notice;
pub use registry::Registry;
pub use store::DeviceStore;
pub use sync::Supervisor;
