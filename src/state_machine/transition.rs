//! Pure state transition function

use super::{Effect, Event, TerminalOutcome, TurnState};
use crate::backend::{ErrorCategory, ExchangeError};
use crate::session::Turn;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: TurnState,
    pub effects: Vec<Effect>,
    /// Set when this transition finished an exchange
    pub outcome: Option<TerminalOutcome>,
}

impl TransitionResult {
    pub fn new(state: TurnState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
            outcome: None,
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }

    pub fn with_outcome(mut self, outcome: TerminalOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A request is already in flight, wait for it to finish")]
    Busy,
    #[error("Completion for exchange {received} does not match pending exchange {expected}")]
    UnknownExchange { expected: u64, received: u64 },
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function.
///
/// Given the same state and event it always produces the same result and
/// performs no I/O.
pub fn transition(state: &TurnState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (*state, event) {
        // ============================================================
        // Submission
        // ============================================================

        // Blank input is ignored, not an error
        (TurnState::Idle, Event::Submit { text, .. }) if text.trim().is_empty() => {
            Ok(TransitionResult::new(TurnState::Idle))
        }

        (TurnState::Idle, Event::Submit { text, exchange_id }) => {
            let turn = Turn::user(text.trim());
            Ok(TransitionResult::new(TurnState::Pending {
                exchange_id,
                superseded: false,
            })
            .with_effect(Effect::AppendTurn(turn.clone()))
            .with_effect(Effect::RenderTurn(turn))
            .with_effect(Effect::ClearInput)
            .with_effect(Effect::ShowPending)
            .with_effect(Effect::SetSubmitEnabled(false))
            .with_effect(Effect::IssueRequest { exchange_id }))
        }

        (TurnState::Pending { .. }, Event::Submit { .. }) => Err(TransitionError::Busy),

        // ============================================================
        // Completion
        // ============================================================
        (
            TurnState::Pending {
                exchange_id: expected,
                ..
            },
            Event::ExchangeCompleted { exchange_id, .. },
        ) if exchange_id != expected => Err(TransitionError::UnknownExchange {
            expected,
            received: exchange_id,
        }),

        // Conversation was cleared while this request was out: close the
        // exchange without touching the new conversation
        (
            TurnState::Pending {
                superseded: true, ..
            },
            Event::ExchangeCompleted { outcome, .. },
        ) => Ok(TransitionResult::new(TurnState::Idle)
            .with_effect(Effect::RemovePending)
            .with_effects(Effect::restore_input())
            .with_outcome(terminal_outcome(outcome.as_ref().err()))),

        (TurnState::Pending { .. }, Event::ExchangeCompleted { outcome, .. }) => {
            match outcome {
                Ok(reply) => {
                    let turn = Turn::assistant(reply);
                    Ok(TransitionResult::new(TurnState::Idle)
                        .with_effect(Effect::RemovePending)
                        .with_effect(Effect::AppendTurn(turn.clone()))
                        .with_effect(Effect::RenderTurn(turn))
                        .with_effects(Effect::restore_input())
                        .with_outcome(TerminalOutcome::Success))
                }
                Err(error) => Ok(TransitionResult::new(TurnState::Idle)
                    .with_effect(Effect::RemovePending)
                    .with_effect(Effect::notice(&error))
                    .with_effects(Effect::restore_input())
                    .with_outcome(terminal_outcome(Some(&error)))),
            }
        }

        (TurnState::Idle, Event::ExchangeCompleted { exchange_id, .. }) => {
            Err(TransitionError::InvalidTransition(format!(
                "completion for exchange {exchange_id} while idle"
            )))
        }

        // ============================================================
        // Clear
        // ============================================================
        (TurnState::Idle, Event::Clear) => {
            Ok(TransitionResult::new(TurnState::Idle).with_effect(Effect::ResetConversation))
        }

        // The in-flight request is not cancelled; it is only marked so its
        // result is dropped when it arrives
        (TurnState::Pending { exchange_id, .. }, Event::Clear) => {
            Ok(TransitionResult::new(TurnState::Pending {
                exchange_id,
                superseded: true,
            })
            .with_effect(Effect::ResetConversation))
        }
    }
}

fn terminal_outcome(error: Option<&ExchangeError>) -> TerminalOutcome {
    match error.map(ExchangeError::category) {
        None => TerminalOutcome::Success,
        Some(ErrorCategory::Application) => TerminalOutcome::ApplicationError,
        Some(ErrorCategory::Transport) => TerminalOutcome::TransportError,
    }
}
