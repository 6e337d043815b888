// ── Registry seam ──
//
// The supervisor talks to the registry through this trait so tests can
// script poll outcomes without a network. The production implementation
// wraps `iotly_api::RegistryClient` and converts wire types to domain
// types at this boundary.

use async_trait::async_trait;

use iotly_api::{RegistryClient, UpdateDeviceRequest};

use crate::error::CoreError;
use crate::model::{Device, DeviceId, DeviceMode};

/// The remote device registry, as the synchronization engine sees it.
///
/// Every method is one request/response exchange that either resolves
/// or fails with a connectivity error. Switch and delete are keyed by
/// name, rename by id — the registry's contract, not ours.
#[async_trait]
pub trait Registry: Send + Sync + 'static {
    /// Fetch the full device list in registry order.
    async fn list(&self) -> Result<Vec<Device>, CoreError>;

    /// Create a device with the given mode; the registry assigns a name.
    async fn create(&self, mode: DeviceMode) -> Result<Device, CoreError>;

    /// Set a controller's switch state, keyed by name.
    async fn set_switch(&self, name: &str, on: bool) -> Result<Device, CoreError>;

    /// Rename a device, keyed by id.
    async fn rename(&self, id: &DeviceId, name: &str) -> Result<Device, CoreError>;

    /// Delete a device, keyed by name.
    async fn delete(&self, name: &str) -> Result<(), CoreError>;
}

#[async_trait]
impl Registry for RegistryClient {
    async fn list(&self) -> Result<Vec<Device>, CoreError> {
        let raw = self.list_devices().await?;
        Ok(raw.into_iter().map(Device::from).collect())
    }

    async fn create(&self, mode: DeviceMode) -> Result<Device, CoreError> {
        let raw = self.create_device(&mode.to_string()).await?;
        Ok(Device::from(raw))
    }

    async fn set_switch(&self, name: &str, on: bool) -> Result<Device, CoreError> {
        let raw = RegistryClient::set_switch(self, name, on).await?;
        Ok(Device::from(raw))
    }

    async fn rename(&self, id: &DeviceId, name: &str) -> Result<Device, CoreError> {
        let update = UpdateDeviceRequest {
            name: Some(name.to_owned()),
        };
        let raw = self.update_device(id.as_str(), &update).await?;
        Ok(Device::from(raw))
    }

    async fn delete(&self, name: &str) -> Result<(), CoreError> {
        self.delete_device(name).await?;
        Ok(())
    }
}
