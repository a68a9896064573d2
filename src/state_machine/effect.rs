//! Effects produced by state transitions

use super::event::ExchangeId;
use crate::backend::{ErrorCategory, ExchangeError};
use crate::session::Turn;

/// Effects to be executed after a state transition, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Add a turn to the conversation store
    AppendTurn(Turn),

    /// Run a turn through the rendering pipeline and display it
    RenderTurn(Turn),

    /// Empty the input surface
    ClearInput,

    /// Insert the pending placeholder
    ShowPending,

    /// Remove the pending placeholder
    RemovePending,

    /// Display a one-line message that is not a turn
    ShowNotice {
        category: ErrorCategory,
        message: String,
    },

    /// Enable or disable the submit trigger
    SetSubmitEnabled(bool),

    FocusInput,

    /// Send the current conversation snapshot to the backend
    IssueRequest { exchange_id: ExchangeId },

    /// Re-seed the conversation and reset the display
    ResetConversation,
}

impl Effect {
    pub fn notice(error: &ExchangeError) -> Self {
        Effect::ShowNotice {
            category: error.category(),
            message: error.to_string(),
        }
    }

    /// Effects that end every exchange regardless of outcome
    pub fn restore_input() -> [Effect; 2] {
        [Effect::SetSubmitEnabled(true), Effect::FocusInput]
    }
}
