//! Message rendering pipeline
//!
//! Converts raw turn text into a `DisplayDocument`: an ordered list of
//! formatted text segments and extracted code segments.
//!
//! The passes run in a fixed order:
//! 1. fenced code blocks are lifted out and replaced by placeholders
//! 2. the remaining prose is escaped and formatted
//! 3. placeholders are resolved back into code segments

mod fence;
mod inline;
mod language;


pub use fence::extract_code_block;
pub use inline::escape_html;
pub use language::{detect_language, extension_for};

use fence::{Extraction, Fragment};
use serde::Serialize;

/// Prose between code blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextSegment {
    /// Formatted, safe to insert into an HTML surface
    pub html: String,
    /// The prose as written, for plain-text surfaces
    pub source: String,
}

/// One fenced code block, verbatim apart from outer whitespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeSegment {
    pub code: String,
    /// Lowercased fence tag
    pub language: String,
    /// File extension derived from `language`
    pub extension: String,
}

impl CodeSegment {
    pub fn new(code: impl Into<String>, language: impl Into<String>) -> Self {
        let language = language.into();
        Self {
            code: code.into(),
            extension: extension_for(&language).to_string(),
            language,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    Text(TextSegment),
    Code(CodeSegment),
}

/// Rendered form of one turn. Derived on demand and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayDocument {
    segments: Vec<Segment>,
}

impl DisplayDocument {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Code segments in source order
    pub fn code_blocks(&self) -> impl Iterator<Item = &CodeSegment> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Code(code) => Some(code),
            Segment::Text(_) => None,
        })
    }
}

/// Render turn content into a display document
pub fn render(content: &str) -> DisplayDocument {
    let Extraction { fragments, blocks } = fence::extract(content);
    let mut blocks: Vec<Option<CodeSegment>> = blocks.into_iter().map(Some).collect();

    let mut segments: Vec<Segment> = fragments
        .into_iter()
        .filter_map(|fragment| match fragment {
            Fragment::Text(text) => Some(Segment::Text(TextSegment {
                html: inline::format(&text),
                source: text,
            })),
            Fragment::Placeholder(index) => blocks
                .get_mut(index)
                .and_then(Option::take)
                .map(Segment::Code),
        })
        .collect();

    if segments.is_empty() {
        segments.push(Segment::Text(TextSegment {
            html: String::new(),
            source: String::new(),
        }));
    }

    DisplayDocument { segments }
}
