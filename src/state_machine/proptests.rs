//! Property-based tests for the state machine
//!
//! These tests drive random event sequences through `transition`, apply
//! the effects to a small model of the store and display, and check the
//! invariants after every step.

use super::*;
use crate::backend::ExchangeError;
use crate::session::{Role, Turn};
use proptest::prelude::*;

// ============================================================================
// Model
// ============================================================================

/// Minimal stand-in for the session and display
#[derive(Debug)]
struct Model {
    state: TurnState,
    store: Vec<Turn>,
    pending_entries: usize,
    submit_enabled: bool,
    notices: usize,
    successes_since_clear: usize,
    /// Failed exchanges leave their user turn behind but add nothing else
    failures_since_clear: usize,
    next_exchange: u64,
}

impl Model {
    fn new() -> Self {
        Self {
            state: TurnState::Idle,
            store: vec![Turn::system("sys")],
            pending_entries: 0,
            submit_enabled: true,
            notices: 0,
            successes_since_clear: 0,
            failures_since_clear: 0,
            next_exchange: 1,
        }
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::AppendTurn(turn) => self.store.push(turn),
                Effect::ShowPending => self.pending_entries += 1,
                Effect::RemovePending => self.pending_entries -= 1,
                Effect::SetSubmitEnabled(enabled) => self.submit_enabled = enabled,
                Effect::ShowNotice { .. } => self.notices += 1,
                Effect::ResetConversation => {
                    self.store = vec![Turn::system("sys")];
                    self.successes_since_clear = 0;
                    self.failures_since_clear = 0;
                }
                Effect::RenderTurn(_)
                | Effect::ClearInput
                | Effect::FocusInput
                | Effect::IssueRequest { .. } => {}
            }
        }
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

#[derive(Debug, Clone)]
enum Step {
    Submit(String),
    Complete(Result<String, ExchangeError>),
    /// Completion carrying an id that matches nothing
    StrayComplete,
    Clear,
}

fn arb_error() -> impl Strategy<Value = ExchangeError> {
    prop_oneof![
        (400u16..600, "[a-z ]{0,20}").prop_map(|(status, body)| ExchangeError::Http { status, body }),
        "[a-z ]{1,20}".prop_map(ExchangeError::Application),
        Just(ExchangeError::EmptyResponse),
        "[a-z ]{1,20}".prop_map(ExchangeError::Transport),
    ]
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => "[a-z ]{0,12}".prop_map(Step::Submit),
        3 => "[a-z]{1,12}".prop_map(|reply| Step::Complete(Ok(reply))),
        2 => arb_error().prop_map(|e| Step::Complete(Err(e))),
        1 => Just(Step::StrayComplete),
        1 => Just(Step::Clear),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_invariants_hold_over_random_sequences(steps in proptest::collection::vec(arb_step(), 1..40)) {
        let mut model = Model::new();

        for step in steps {
            let before = model.state;
            let event = match step {
                Step::Submit(text) => {
                    let exchange_id = model.next_exchange;
                    model.next_exchange += 1;
                    Event::Submit { text, exchange_id }
                }
                Step::Complete(outcome) => Event::ExchangeCompleted {
                    exchange_id: before.exchange_id().unwrap_or(0),
                    outcome,
                },
                Step::StrayComplete => Event::ExchangeCompleted {
                    exchange_id: u64::MAX,
                    outcome: Ok("stray".to_string()),
                },
                Step::Clear => Event::Clear,
            };
            let is_submit = matches!(event, Event::Submit { .. });
            let is_completion = matches!(event, Event::ExchangeCompleted { .. });

            match transition(&before, event) {
                Ok(result) => {
                    if let Some(outcome) = result.outcome {
                        prop_assert!(before.is_pending());
                        prop_assert_eq!(result.new_state, TurnState::Idle);
                        let superseded = matches!(before, TurnState::Pending { superseded: true, .. });
                        if !superseded {
                            if outcome == TerminalOutcome::Success {
                                model.successes_since_clear += 1;
                            } else {
                                model.failures_since_clear += 1;
                            }
                        }
                    } else {
                        prop_assert!(!is_completion, "completions always report an outcome");
                    }
                    model.state = result.new_state;
                    model.apply(result.effects);
                }
                Err(TransitionError::Busy) => {
                    prop_assert!(is_submit && before.is_pending());
                }
                Err(TransitionError::UnknownExchange { .. } | TransitionError::InvalidTransition(_)) => {
                    prop_assert!(is_completion);
                }
            }

            // At most one pending entry, shown exactly while pending
            prop_assert!(model.pending_entries <= 1);
            prop_assert_eq!(model.pending_entries == 1, model.state.is_pending());
            prop_assert_eq!(model.submit_enabled, !model.state.is_pending());

            // System turn first, then user/assistant pairs; a failure keeps
            // only the user turn that started it
            prop_assert_eq!(model.store[0].role(), Role::System);
            let in_flight = usize::from(matches!(
                model.state,
                TurnState::Pending { superseded: false, .. }
            ));
            prop_assert_eq!(
                model.store.len(),
                1 + 2 * model.successes_since_clear + model.failures_since_clear + in_flight
            );
            let assistants = model.store.iter().filter(|t| t.role() == Role::Assistant).count();
            prop_assert_eq!(assistants, model.successes_since_clear);
        }
    }

    #[test]
    fn prop_blank_input_never_starts_an_exchange(text in "[ \t\n]{0,10}") {
        let result = transition(&TurnState::Idle, Event::Submit { text, exchange_id: 1 }).unwrap();
        prop_assert_eq!(result.new_state, TurnState::Idle);
        prop_assert!(result.effects.is_empty());
    }

    #[test]
    fn prop_user_turn_is_trimmed(text in "[ ]{0,3}[a-z]{1,10}[ \n]{0,3}") {
        let result = transition(&TurnState::Idle, Event::Submit { text: text.clone(), exchange_id: 7 }).unwrap();
        prop_assert_eq!(
            result.effects.first(),
            Some(&Effect::AppendTurn(Turn::user(text.trim())))
        );
        prop_assert_eq!(result.effects.last(), Some(&Effect::IssueRequest { exchange_id: 7 }));
    }
}
