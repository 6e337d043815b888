// ── Mutation commands ──
//
// All write operations are expressed as one `Command` enum, executed by
// the supervisor. Commands are independent: none takes a lock that
// blocks another, so a rename and a delete on two different devices may
// be in flight simultaneously. Failures are never retried here — the
// next poll cycle picks up the registry's current truth.

use crate::model::{DeviceId, DeviceMode};

/// A write operation against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a device; the registry assigns the name.
    Create { mode: DeviceMode },
    /// Set a switch state, keyed by name.
    SetSwitch { name: String, on: bool },
    /// Rename a device, keyed by id.
    Rename { id: DeviceId, name: String },
    /// Delete a device, keyed by name.
    Delete { name: String },
}
