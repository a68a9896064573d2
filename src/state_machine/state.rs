//! Turn lifecycle states

use serde::Serialize;

/// Controller state. Terminal outcomes are not states of their own: every
/// completion lands back in `Idle` within the same transition and reports
/// its outcome alongside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnState {
    /// Ready for input
    #[default]
    Idle,

    /// Request in flight
    Pending {
        exchange_id: u64,
        /// Conversation was cleared after the request went out; its result
        /// must not land in the new conversation
        superseded: bool,
    },
}

impl TurnState {
    pub fn is_pending(&self) -> bool {
        matches!(self, TurnState::Pending { .. })
    }

    /// Exchange currently in flight, if any
    #[cfg(test)]
    pub fn exchange_id(&self) -> Option<u64> {
        match self {
            TurnState::Idle => None,
            TurnState::Pending { exchange_id, .. } => Some(*exchange_id),
        }
    }
}

/// How a completed exchange ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalOutcome {
    Success,
    ApplicationError,
    TransportError,
}
