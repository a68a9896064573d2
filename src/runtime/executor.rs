//! Chat runtime executor

use crate::backend::{ChatBackend, ChatRequest};
use crate::codegen::{self, CodegenError, GeneratedCode, CODEGEN_TEMPERATURE};
use crate::display::DisplaySurface;
use crate::render::render;
use crate::session::Session;
use crate::state_machine::{
    transition, Effect, Event, ExchangeId, TerminalOutcome, TransitionError, TurnState,
};
use std::sync::Arc;
use tokio::sync::mpsc;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Owns the session and the display, and is the only thing that mutates
/// either. Backend requests run on spawned tasks and report back over a
/// channel; their completions are applied by [`ChatRuntime::handle_event`].
pub struct ChatRuntime<D: DisplaySurface> {
    session: Session,
    state: TurnState,
    backend: Arc<dyn ChatBackend>,
    display: D,
    event_tx: mpsc::Sender<Event>,
    event_rx: mpsc::Receiver<Event>,
    next_exchange: ExchangeId,
    last_outcome: Option<TerminalOutcome>,
    codegen_temperature: f32,
}

impl<D: DisplaySurface> ChatRuntime<D> {
    pub fn new(session: Session, backend: Arc<dyn ChatBackend>, display: D) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            session,
            state: TurnState::Idle,
            backend,
            display,
            event_tx,
            event_rx,
            next_exchange: 0,
            last_outcome: None,
            codegen_temperature: CODEGEN_TEMPERATURE,
        }
    }

    pub fn with_codegen_temperature(mut self, temperature: f32) -> Self {
        self.codegen_temperature = temperature;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    #[cfg(test)]
    pub fn state(&self) -> TurnState {
        self.state
    }

    /// How the most recent exchange ended
    pub fn last_outcome(&self) -> Option<TerminalOutcome> {
        self.last_outcome
    }

    /// Submit user text. Blank text is ignored; a submission while an
    /// exchange is in flight is rejected with [`TransitionError::Busy`].
    pub fn submit(&mut self, text: &str) -> Result<(), TransitionError> {
        self.next_exchange += 1;
        self.process_event(Event::Submit {
            text: text.to_string(),
            exchange_id: self.next_exchange,
        })
    }

    /// Start a fresh conversation. Never fails.
    pub fn clear(&mut self) {
        if let Err(e) = self.process_event(Event::Clear) {
            tracing::error!(error = %e, "Clear rejected");
        }
    }

    /// Wait for the next backend completion
    pub async fn next_event(&mut self) -> Option<Event> {
        self.event_rx.recv().await
    }

    /// Apply an event received from [`ChatRuntime::next_event`]. Stale or
    /// mismatched completions are logged and dropped.
    pub fn handle_event(&mut self, event: Event) {
        if let Err(e) = self.process_event(event) {
            tracing::warn!(error = %e, state = ?self.state, "Dropped event");
        }
    }

    /// Drive completions until no exchange is in flight
    pub async fn wait_idle(&mut self) {
        while self.state.is_pending() {
            match self.event_rx.recv().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }
    }

    /// Generate code for `prompt`, show it, and remember it as the
    /// session's last artifact. Backend failures are shown as a notice and
    /// also returned.
    pub async fn generate_code(&mut self, prompt: &str) -> Result<GeneratedCode, CodegenError> {
        match codegen::generate_code(self.backend.as_ref(), prompt, self.codegen_temperature).await
        {
            Ok(generated) => {
                self.display.show_generated(&generated);
                self.session.set_last_code(generated.clone());
                Ok(generated)
            }
            Err(CodegenError::Exchange(error)) => {
                self.display
                    .show_notice(error.category(), &error.to_string());
                Err(CodegenError::Exchange(error))
            }
            Err(e) => Err(e),
        }
    }

    fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        let result = transition(&self.state, event)?;

        tracing::debug!(from = ?self.state, to = ?result.new_state, "Transition");
        self.state = result.new_state;

        if let Some(outcome) = result.outcome {
            tracing::info!(session_id = %self.session.id(), ?outcome, "Exchange finished");
            self.last_outcome = Some(outcome);
        }

        for effect in result.effects {
            self.execute_effect(effect);
        }

        Ok(())
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::AppendTurn(turn) => self.session.append(turn),
            Effect::RenderTurn(turn) => {
                let document = render(turn.content());
                self.display.show_turn(turn.role(), document);
            }
            Effect::ClearInput => self.display.clear_input(),
            Effect::ShowPending => self.display.show_pending(),
            Effect::RemovePending => self.display.remove_pending(),
            Effect::ShowNotice { category, message } => {
                self.display.show_notice(category, &message);
            }
            Effect::SetSubmitEnabled(enabled) => self.display.set_submit_enabled(enabled),
            Effect::FocusInput => self.display.focus_input(),
            Effect::IssueRequest { exchange_id } => self.issue_request(exchange_id),
            Effect::ResetConversation => {
                self.session.clear();
                self.display.reset();
            }
        }
    }

    fn issue_request(&self, exchange_id: ExchangeId) {
        let request = ChatRequest {
            messages: self.session.snapshot(),
        };
        let backend = Arc::clone(&self.backend);
        let event_tx = self.event_tx.clone();

        tracing::debug!(exchange_id, turns = request.messages.len(), "Issuing chat request");

        tokio::spawn(async move {
            let outcome = backend.chat(&request).await;
            if event_tx
                .send(Event::ExchangeCompleted {
                    exchange_id,
                    outcome,
                })
                .await
                .is_err()
            {
                tracing::warn!(exchange_id, "Runtime gone before exchange completed");
            }
        });
    }
}
