//! CLI error types and exit codes.
//!
//! Maps `CoreError` and local failures into user-facing messages with a
//! stable exit code per failure class.

use thiserror::Error;

use iotly_core::CoreError;

/// Exit codes, stable for scripting.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(
        "no registry URL configured\n\
         Set `registry_url` in {path}, export IOTLY_REGISTRY_URL, or pass --registry."
    )]
    NoRegistry { path: String },

    #[error("invalid value for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("device '{name}' not found\nRun `iotly devices list` to see registered devices.")]
    DeviceNotFound { name: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("failed to load configuration: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoRegistry { .. } | Self::Validation { .. } => exit_code::USAGE,
            Self::DeviceNotFound { .. } => exit_code::NOT_FOUND,
            Self::Core(CoreError::RegistryUnreachable { .. }) => exit_code::CONNECTION,
            _ => exit_code::GENERAL,
        }
    }
}
