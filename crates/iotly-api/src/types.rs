// ── Wire types for the registry API ──
//
// These mirror the registry's JSON exactly. `iotly-core` converts them
// into canonical domain types; nothing above the client layer should
// touch these directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A device as the registry reports it.
///
/// `sensorValue` is omitted entirely for controller-mode devices and may
/// be omitted for a monitoring device that has not reported yet — absence
/// is meaningful and distinct from zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryDevice {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub mode: String,
    #[serde(default)]
    pub switch_state: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_value: Option<f64>,
    #[serde(default)]
    pub device_status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_online: Option<DateTime<Utc>>,
}

/// Body for `POST /api/devices`. The registry assigns the name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeviceRequest {
    pub mode: String,
}

/// Body for `PUT /api/devices/switch?name={name}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSwitchRequest {
    pub switch_state: bool,
}

/// Partial-update body for `PUT /api/devices/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDeviceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
