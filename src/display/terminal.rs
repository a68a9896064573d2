//! Line-oriented terminal surface

use super::{DisplaySurface, Transcript};
use crate::backend::ErrorCategory;
use crate::codegen::GeneratedCode;
use crate::render::{DisplayDocument, Segment};
use crate::session::Role;
use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use std::io::{self, Stdout, Write};

const PENDING_TEXT: &str = "Thinking...";

/// Prints the conversation to a terminal while keeping a [`Transcript`]
pub struct TerminalSurface<W: Write + Send = Stdout> {
    transcript: Transcript,
    out: W,
    /// The "Thinking..." line is currently on screen
    pending_drawn: bool,
}

impl TerminalSurface<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            transcript: Transcript::new(),
            out,
            pending_drawn: false,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print through `draw`, keeping the pending line below the new output
    fn emit(&mut self, draw: impl FnOnce(&mut W) -> io::Result<()>) {
        if let Err(e) = self.try_emit(draw) {
            tracing::warn!(error = %e, "Terminal write failed");
        }
    }

    fn try_emit(&mut self, draw: impl FnOnce(&mut W) -> io::Result<()>) -> io::Result<()> {
        if self.pending_drawn {
            queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
            self.pending_drawn = false;
        }
        draw(&mut self.out)?;
        if self.transcript.has_pending() {
            queue!(
                self.out,
                SetAttribute(Attribute::Dim),
                Print(PENDING_TEXT),
                SetAttribute(Attribute::Reset)
            )?;
            self.pending_drawn = true;
        }
        self.out.flush()
    }
}

fn print_code(out: &mut impl Write, label: &str, code: &str) -> io::Result<()> {
    queue!(
        out,
        SetForegroundColor(Color::DarkGrey),
        Print(format!("--- {label} ---\n")),
        ResetColor,
        SetForegroundColor(Color::Yellow),
        Print(code),
        Print("\n"),
        ResetColor,
        SetForegroundColor(Color::DarkGrey),
        Print("---\n"),
        ResetColor
    )
}

impl<W: Write + Send> DisplaySurface for TerminalSurface<W> {
    fn show_turn(&mut self, role: Role, document: DisplayDocument) {
        let (label, color) = match role {
            Role::User => ("you", Color::Cyan),
            Role::Assistant => ("assistant", Color::Green),
            Role::System => ("system", Color::DarkGrey),
        };
        let first_block = self.transcript.code_blocks().len() + 1;

        self.emit(|out| {
            queue!(
                out,
                SetForegroundColor(color),
                SetAttribute(Attribute::Bold),
                Print(format!("{label}> ")),
                SetAttribute(Attribute::Reset),
                ResetColor
            )?;
            let mut block = first_block;
            for segment in document.segments() {
                match segment {
                    Segment::Text(text) => queue!(out, Print(&text.source))?,
                    Segment::Code(code) => {
                        queue!(out, Print("\n"))?;
                        print_code(out, &format!("{} #{block}", code.language), &code.code)?;
                        block += 1;
                    }
                }
            }
            queue!(out, Print("\n"))
        });
        self.transcript.show_turn(role, document);
    }

    fn show_pending(&mut self) {
        self.transcript.show_pending();
        self.emit(|_| Ok(()));
    }

    fn remove_pending(&mut self) {
        self.transcript.remove_pending();
        self.emit(|_| Ok(()));
    }

    fn show_notice(&mut self, category: ErrorCategory, message: &str) {
        let color = match category {
            ErrorCategory::Application => Color::Yellow,
            ErrorCategory::Transport => Color::Red,
        };
        self.emit(|out| {
            queue!(
                out,
                SetForegroundColor(color),
                Print(format!("! {message}\n")),
                ResetColor
            )
        });
        self.transcript.show_notice(category, message);
    }

    fn show_generated(&mut self, code: &GeneratedCode) {
        let block = self.transcript.code_blocks().len() + 1;
        let mut label = format!("{} #{block}", code.language);
        if let Some(model) = &code.model {
            label.push_str(&format!(" ({model}"));
            if let Some(latency) = code.latency_ms {
                label.push_str(&format!(", {latency}ms"));
            }
            label.push(')');
        }
        self.emit(|out| print_code(out, &label, &code.code));
        self.transcript.show_generated(code);
    }

    fn show_status(&mut self, message: &str) {
        self.emit(|out| queue!(out, Print(format!("{message}\n"))));
        self.transcript.show_status(message);
    }

    fn clear_input(&mut self) {
        self.transcript.clear_input();
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.transcript.set_submit_enabled(enabled);
    }

    fn focus_input(&mut self) {
        self.transcript.focus_input();
    }

    fn reset(&mut self) {
        self.transcript.reset();
        self.emit(|out| {
            queue!(
                out,
                SetAttribute(Attribute::Dim),
                Print("Conversation cleared.\n"),
                SetAttribute(Attribute::Reset)
            )
        });
    }

    fn transcript(&self) -> &Transcript {
        &self.transcript
    }
}
