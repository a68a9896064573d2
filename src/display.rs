//! Display model
//!
//! The runtime never touches a UI directly. It drives a [`DisplaySurface`],
//! and every surface keeps a [`Transcript`]: the ordered record of what the
//! user has been shown, plus the state of the input controls.

mod terminal;

pub use terminal::TerminalSurface;

use crate::backend::ErrorCategory;
use crate::codegen::GeneratedCode;
use crate::render::{escape_html, CodeSegment, DisplayDocument, Segment};
use crate::session::Role;
use serde::Serialize;

/// The seam between the turn controller and a concrete UI
pub trait DisplaySurface: Send {
    /// Append a rendered turn
    fn show_turn(&mut self, role: Role, document: DisplayDocument);

    /// Show the pending placeholder. A surface holds at most one.
    fn show_pending(&mut self);

    fn remove_pending(&mut self);

    /// Show a one-line message that is not part of the conversation
    fn show_notice(&mut self, category: ErrorCategory, message: &str);

    fn show_generated(&mut self, code: &GeneratedCode);

    /// Show a REPL message (help text, command result or error). Not part
    /// of the conversation.
    fn show_status(&mut self, message: &str);

    fn clear_input(&mut self);

    fn set_submit_enabled(&mut self, enabled: bool);

    fn focus_input(&mut self);

    /// Drop everything shown so far except a pending placeholder
    fn reset(&mut self);

    fn transcript(&self) -> &Transcript;
}

/// One item on the messages surface
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisplayEntry {
    Turn {
        role: Role,
        document: DisplayDocument,
    },
    Pending,
    Notice {
        category: ErrorCategory,
        message: String,
    },
    Generated(GeneratedCode),
}

/// In-memory messages view and input state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcript {
    entries: Vec<DisplayEntry>,
    input: String,
    submit_enabled: bool,
    focused: bool,
    #[serde(skip)]
    last_status: Option<String>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            input: String::new(),
            submit_enabled: true,
            focused: true,
            last_status: None,
        }
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[DisplayEntry] {
        &self.entries
    }

    #[cfg(test)]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the input text, as a user typing would
    #[cfg(test)]
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    #[cfg(test)]
    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    #[cfg(test)]
    pub fn focused(&self) -> bool {
        self.focused
    }

    #[cfg(test)]
    pub fn last_status(&self) -> Option<&str> {
        self.last_status.as_deref()
    }

    pub fn has_pending(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| matches!(entry, DisplayEntry::Pending))
    }

    /// Every code block shown, in display order, generated code included
    pub fn code_blocks(&self) -> Vec<CodeSegment> {
        self.entries
            .iter()
            .flat_map(|entry| -> Vec<CodeSegment> {
                match entry {
                    DisplayEntry::Turn { document, .. } => {
                        document.code_blocks().cloned().collect()
                    }
                    DisplayEntry::Generated(code) => {
                        vec![CodeSegment::new(code.code.clone(), code.language.clone())]
                    }
                    DisplayEntry::Pending | DisplayEntry::Notice { .. } => Vec::new(),
                }
            })
            .collect()
    }

    /// Standalone HTML page of the conversation shown so far
    pub fn to_html(&self, title: &str) -> String {
        let mut body = String::new();
        for entry in &self.entries {
            match entry {
                DisplayEntry::Turn { role, document } => {
                    body.push_str(&format!("<div class=\"message {role}\">\n"));
                    for segment in document.segments() {
                        match segment {
                            Segment::Text(text) => {
                                body.push_str(&format!("<p>{}</p>\n", text.html));
                            }
                            Segment::Code(code) => body.push_str(&code_html(code)),
                        }
                    }
                    body.push_str("</div>\n");
                }
                DisplayEntry::Notice { category, message } => {
                    let class = match category {
                        ErrorCategory::Application => "application",
                        ErrorCategory::Transport => "transport",
                    };
                    body.push_str(&format!(
                        "<div class=\"notice {class}\">{}</div>\n",
                        escape_html(message)
                    ));
                }
                DisplayEntry::Generated(code) => {
                    body.push_str("<div class=\"message generated\">\n");
                    body.push_str(&code_html(&CodeSegment::new(
                        code.code.clone(),
                        code.language.clone(),
                    )));
                    body.push_str("</div>\n");
                }
                DisplayEntry::Pending => {}
            }
        }

        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<p class=\"exported\">Exported {exported}</p>\n{body}</body>\n</html>\n",
            title = escape_html(title),
            exported = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        )
    }
}

fn code_html(code: &CodeSegment) -> String {
    format!(
        "<pre><code class=\"language-{}\">{}</code></pre>\n",
        escape_html(&code.language),
        escape_html(&code.code)
    )
}

impl DisplaySurface for Transcript {
    fn show_turn(&mut self, role: Role, document: DisplayDocument) {
        self.entries.push(DisplayEntry::Turn { role, document });
    }

    fn show_pending(&mut self) {
        if !self.has_pending() {
            self.entries.push(DisplayEntry::Pending);
        }
    }

    fn remove_pending(&mut self) {
        self.entries
            .retain(|entry| !matches!(entry, DisplayEntry::Pending));
    }

    fn show_notice(&mut self, category: ErrorCategory, message: &str) {
        self.entries.push(DisplayEntry::Notice {
            category,
            message: message.to_string(),
        });
    }

    fn show_generated(&mut self, code: &GeneratedCode) {
        self.entries.push(DisplayEntry::Generated(code.clone()));
    }

    fn show_status(&mut self, message: &str) {
        self.last_status = Some(message.to_string());
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.submit_enabled = enabled;
    }

    fn focus_input(&mut self) {
        self.focused = true;
    }

    fn reset(&mut self) {
        self.entries
            .retain(|entry| matches!(entry, DisplayEntry::Pending));
    }

    fn transcript(&self) -> &Transcript {
        self
    }
}
