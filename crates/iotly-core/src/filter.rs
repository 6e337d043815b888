// ── View projection ──
//
// Pure filter predicates over the canonical collection. Stateless and
// deterministic: projecting the same collection twice yields the same
// ordered subset.

use strum::{Display, EnumString};

use crate::model::{Device, DeviceCollection, DeviceMode};

/// Filter predicate for the device view.
///
/// `SwitchOn` / `SwitchOff` only ever match controller-mode devices — a
/// monitoring device has no switch, so both predicates exclude it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum DeviceFilter {
    #[default]
    All,
    Online,
    Offline,
    SwitchOn,
    SwitchOff,
}

impl DeviceFilter {
    pub fn matches(&self, device: &Device) -> bool {
        match self {
            Self::All => true,
            Self::Online => device.online,
            Self::Offline => !device.online,
            Self::SwitchOn => device.mode == DeviceMode::Controller && device.switch_on,
            Self::SwitchOff => device.mode == DeviceMode::Controller && !device.switch_on,
        }
    }

    /// Project the visible subset, preserving collection order.
    pub fn apply(&self, collection: &DeviceCollection) -> Vec<Device> {
        collection
            .iter()
            .filter(|d| self.matches(d))
            .cloned()
            .collect()
    }
}
