// ── Device domain types ──
//
// Canonical types as the rest of the workspace sees them. Wire types
// from `iotly-api` are converted here and never escape the registry
// seam.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use iotly_api::RegistryDevice;

/// Opaque stable identifier assigned by the registry. Immutable for the
/// lifetime of a device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// What kind of endpoint a device is. Immutable for a device's lifetime
/// from this engine's perspective.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceMode {
    /// Has a switch the operator can toggle.
    Controller,
    /// Reports a sensor value; has no switch.
    Monitoring,
}

/// The canonical device type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    /// Display key, also the lookup key for switch and delete operations.
    /// Uniqueness across the collection is enforced by the registry.
    pub name: String,
    pub mode: DeviceMode,
    /// Meaningful only when `mode` is [`DeviceMode::Controller`].
    pub switch_on: bool,
    /// Meaningful only when `mode` is [`DeviceMode::Monitoring`].
    /// `None` means "never reported", which is distinct from zero.
    pub sensor_value: Option<f64>,
    /// The registry's own heartbeat verdict — never derived from this
    /// engine's polling.
    pub online: bool,
    /// Set by the registry; display-only while `online` is false.
    pub last_online: Option<DateTime<Utc>>,
}

impl From<RegistryDevice> for Device {
    fn from(raw: RegistryDevice) -> Self {
        let mode = raw
            .mode
            .parse()
            .unwrap_or(DeviceMode::Monitoring);
        Self {
            id: DeviceId::new(raw.id),
            name: raw.name,
            mode,
            switch_on: raw.switch_state,
            sensor_value: raw.sensor_value,
            online: raw.device_status,
            last_online: raw.last_online,
        }
    }
}

/// The canonical, ordered device collection.
///
/// An ordered mapping from id to device, replaced wholesale on every
/// successful poll — there is no incremental merge, so the view can
/// never show a device the registry no longer reports. Registry order
/// is preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceCollection {
    devices: IndexMap<DeviceId, Device>,
}

impl DeviceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &DeviceId) -> Option<&Device> {
        self.devices.get(id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Device> {
        self.devices.values().find(|d| d.name == name)
    }

    /// Iterate devices in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl FromIterator<Device> for DeviceCollection {
    fn from_iter<I: IntoIterator<Item = Device>>(iter: I) -> Self {
        Self {
            devices: iter.into_iter().map(|d| (d.id.clone(), d)).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a DeviceCollection {
    type Item = &'a Device;
    type IntoIter = indexmap::map::Values<'a, DeviceId, Device>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.values()
    }
}
