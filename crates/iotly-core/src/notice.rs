// ── User-facing notices ──
//
// Transient, dismissible messages broadcast by the supervisor. The
// connectivity pair (ConnectionLost / Reconnected) is emitted exactly
// once per transition by the state machine; mutation notices fire once
// per successful command.

/// A one-shot notification for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// First failed poll after a healthy stretch. Not repeated while
    /// the engine stays degraded.
    ConnectionLost { message: String },
    /// First successful poll after a degraded stretch.
    Reconnected,
    DeviceCreated { name: String },
    SwitchSet { name: String, on: bool },
    Renamed { from: String, to: String },
    Deleted { name: String },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionLost { message } => write!(f, "{message}"),
            Self::Reconnected => write!(f, "registry reconnected"),
            Self::DeviceCreated { name } => write!(f, "{name} created"),
            Self::SwitchSet { name, on } => {
                write!(f, "switch turned {} for {name}", if *on { "ON" } else { "OFF" })
            }
            Self::Renamed { from, to } => write!(f, "{from} renamed to {to}"),
            Self::Deleted { name } => write!(f, "{name} deleted"),
        }
    }
}
