//! Shared helpers for command handlers.

use std::sync::Arc;

use iotly_core::{Device, Registry};

use crate::error::CliError;

/// Fetch the current list and resolve a device by name.
pub async fn find_device(registry: &Arc<dyn Registry>, name: &str) -> Result<Device, CliError> {
    let devices = registry.list().await?;
    devices
        .into_iter()
        .find(|d| d.name == name)
        .ok_or_else(|| CliError::DeviceNotFound { name: name.into() })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()?;
    Ok(confirmed)
}
