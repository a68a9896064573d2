//! Session-scoped conversation state
//!
//! A `Session` owns everything that lives for the lifetime of one chat:
//! the conversation log and the last generated code artifact. It is created
//! at startup, reset on clear, and handed to the runtime by value.

mod store;
mod turn;

pub use store::ConversationStore;
pub use turn::{Role, Turn};

use crate::codegen::GeneratedCode;

/// One chat session
#[derive(Debug)]
pub struct Session {
    id: String,
    store: ConversationStore,
    last_code: Option<GeneratedCode>,
}

impl Session {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            store: ConversationStore::new(system_prompt),
            last_code: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn append(&mut self, turn: Turn) {
        self.store.append(turn);
    }

    pub fn snapshot(&self) -> Vec<Turn> {
        self.store.snapshot()
    }

    pub fn last_code(&self) -> Option<&GeneratedCode> {
        self.last_code.as_ref()
    }

    pub fn set_last_code(&mut self, code: GeneratedCode) {
        self.last_code = Some(code);
    }

    /// Drop all history and the last artifact, keeping the system prompt
    pub fn clear(&mut self) {
        self.store.clear();
        self.last_code = None;
        tracing::debug!(session_id = %self.id, "Session cleared");
    }
}
