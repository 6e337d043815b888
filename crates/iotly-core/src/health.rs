// ── Connectivity state machine ──
//
// Two states, no terminal state. Each poll outcome is folded through
// `apply`, which yields the next state plus at most one user-facing
// notice. Repeated failures refresh the stored message silently so the
// operator is not spammed; recovery fires exactly one notice.

use crate::notice::Notice;

/// The engine's view of registry connectivity.
///
/// Owned by the supervisor, observed by consumers through a `watch`
/// channel for the single connectivity banner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConnectivityState {
    /// Last poll succeeded (also the optimistic initial state).
    #[default]
    Healthy,
    /// Last poll failed; the collection has been cleared and the view
    /// shows a banner instead of data it cannot vouch for.
    Degraded { message: String },
}

/// Outcome of a single reconciliation poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Success,
    Failure(String),
}

impl ConnectivityState {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// The retained error message, if degraded.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Healthy => None,
            Self::Degraded { message } => Some(message),
        }
    }

    /// Fold one poll outcome into the machine.
    ///
    /// Returns the next state and the notice to surface, if any. Only
    /// the two transitions produce a notice; both steady states are
    /// silent.
    pub fn apply(self, outcome: PollOutcome) -> (Self, Option<Notice>) {
        match (self, outcome) {
            (Self::Healthy, PollOutcome::Failure(message)) => (
                Self::Degraded {
                    message: message.clone(),
                },
                Some(Notice::ConnectionLost { message }),
            ),
            (Self::Degraded { .. }, PollOutcome::Success) => {
                (Self::Healthy, Some(Notice::Reconnected))
            }
            // Message refreshed silently while already degraded.
            (Self::Degraded { .. }, PollOutcome::Failure(message)) => {
                (Self::Degraded { message }, None)
            }
            (Self::Healthy, PollOutcome::Success) => (Self::Healthy, None),
        }
    }
}
