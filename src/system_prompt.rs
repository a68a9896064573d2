//! System prompt that seeds every conversation

/// Default prompt for the chat assistant
const BASE_PROMPT: &str = r"You are a helpful programming assistant. Answer questions clearly and concisely.

When you include code, put it in fenced code blocks tagged with the language, for example ```python. Keep explanations short and focused on what the user asked.";

/// The prompt to seed conversations with. A non-blank override replaces the
/// default entirely.
pub fn build_system_prompt(custom: Option<&str>) -> String {
    custom
        .map(str::trim)
        .filter(|prompt| !prompt.is_empty())
        .unwrap_or(BASE_PROMPT)
        .to_string()
}
