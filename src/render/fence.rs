//! Fenced code-block extraction
//!
//! Runs before any formatting. Each fenced region is lifted out of the text
//! and replaced by a `Fragment::Placeholder`, so later passes only ever see
//! prose and cannot corrupt code.

use super::language::DEFAULT_LANGUAGE;
use super::CodeSegment;
use regex::Regex;
use std::sync::LazyLock;

/// Opening fence, optional tag line, lazily matched body, closing fence.
/// The tag line only counts when it ends in a newline, so ```` ```x``` ````
/// is an untagged block containing `x`.
static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:([^\s`]*)[^\n`]*\n)?(.*?)```").expect("fence pattern is valid")
});

/// A piece of the working text after extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Fragment {
    Text(String),
    /// Index into `Extraction::blocks`
    Placeholder(usize),
}

#[derive(Debug, Default)]
pub(super) struct Extraction {
    pub fragments: Vec<Fragment>,
    pub blocks: Vec<CodeSegment>,
}

pub(super) fn extract(content: &str) -> Extraction {
    let mut extraction = Extraction::default();
    let mut cursor = 0;

    for caps in FENCE.captures_iter(content) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_text(&mut extraction.fragments, content.get(cursor..whole.start()));

        let language = caps
            .get(1)
            .map(|m| m.as_str().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        let code = caps.get(2).map_or("", |m| m.as_str()).trim();

        extraction
            .fragments
            .push(Fragment::Placeholder(extraction.blocks.len()));
        extraction.blocks.push(CodeSegment::new(code, language));
        cursor = whole.end();
    }

    push_text(&mut extraction.fragments, content.get(cursor..));
    extraction
}

fn push_text(fragments: &mut Vec<Fragment>, text: Option<&str>) {
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        fragments.push(Fragment::Text(text.to_string()));
    }
}

/// Pull code out of a model reply that may wrap it in fences.
///
/// Prefers the first block tagged `preferred_language`, then the first block
/// of any language. Returns `None` when the text has no complete fence.
pub fn extract_code_block(text: &str, preferred_language: &str) -> Option<String> {
    let preferred = preferred_language.to_lowercase();
    let blocks = extract(text).blocks;
    let index = blocks
        .iter()
        .position(|block| block.language == preferred)
        .unwrap_or(0);
    blocks.into_iter().nth(index).map(|block| block.code)
}
