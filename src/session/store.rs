//! Append-only conversation log

#[cfg(test)]
use super::turn::Role;
use super::turn::Turn;

/// Ordered log of turns, always headed by a single system turn.
///
/// The whole sequence is resent to the backend on every request, so
/// insertion order is part of the contract.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    system_prompt: String,
    turns: Vec<Turn>,
}

impl ConversationStore {
    /// Create a store seeded with `system_prompt`
    pub fn new(system_prompt: impl Into<String>) -> Self {
        let mut store = Self {
            system_prompt: String::new(),
            turns: Vec::new(),
        };
        store.seed(system_prompt);
        store
    }

    /// Replace the whole log with `[system: system_prompt]`
    pub fn seed(&mut self, system_prompt: impl Into<String>) {
        self.system_prompt = system_prompt.into();
        self.turns = vec![Turn::system(self.system_prompt.clone())];
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Owned copy of the log as of this call
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    /// Re-seed with the current system prompt
    pub fn clear(&mut self) {
        let prompt = std::mem::take(&mut self.system_prompt);
        self.seed(prompt);
    }

    #[cfg(test)]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[cfg(test)]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Number of turns authored by `role`
    #[cfg(test)]
    pub fn count(&self, role: Role) -> usize {
        self.turns.iter().filter(|t| t.role() == role).count()
    }
}
