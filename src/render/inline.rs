//! Inline formatting for prose fragments
//!
//! Text is HTML-escaped first, then classified line by line into block
//! kinds (heading, bullet, numbered item, plain). Within a line an ordered
//! list of rules rewrites a token stream; a rule only ever matches inside
//! `Token::Text`, so markup emitted by an earlier rule (including the body
//! of an inline code span) is never reinterpreted.

use regex::Regex;
use std::sync::LazyLock;

const LINE_BREAK: &str = "<br>";
const PARAGRAPH_BREAK: &str = "<br><br>";

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*###\s+(.+)$").expect("heading pattern is valid"));
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*]\s+(.*)$").expect("bullet pattern is valid"));
static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\.\s+(.*)$").expect("numbered pattern is valid"));

/// Applied in order; code spans first so their contents are frozen
static INLINE_RULES: LazyLock<Vec<InlineRule>> = LazyLock::new(|| {
    vec![
        InlineRule::new(r"`([^`\n]+)`", "<code>", "</code>", true),
        InlineRule::new(r"\*\*(.+?)\*\*", "<strong>", "</strong>", false),
        InlineRule::new(r"\*([^*\n]+)\*", "<em>", "</em>", false),
    ]
});

/// Escape text for an HTML display surface
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Format a code-free fragment into display markup
pub(super) fn format(text: &str) -> String {
    let escaped = escape_html(text);
    let multi_line = escaped.contains('\n');

    let mut html = String::with_capacity(escaped.len());
    let mut newlines = 0usize;
    let mut prev_block = false;

    for (index, raw) in escaped.split('\n').enumerate() {
        if index > 0 {
            newlines += 1;
        }
        let line = Line::classify(raw, multi_line);
        if matches!(line, Line::Blank) {
            continue;
        }
        html.push_str(separator(newlines, prev_block || line.is_block()));
        html.push_str(&line.to_html());
        newlines = 0;
        prev_block = line.is_block();
    }
    html.push_str(separator(newlines, prev_block));

    html
}

/// Markup for a run of newlines. Block elements already break the flow, so
/// a single newline next to one adds nothing.
fn separator(newlines: usize, adjacent_block: bool) -> &'static str {
    match (newlines, adjacent_block) {
        (0, _) | (1, true) => "",
        (1, false) | (_, true) => LINE_BREAK,
        _ => PARAGRAPH_BREAK,
    }
}

/// One escaped source line, classified
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Heading(&'a str),
    Bullet(&'a str),
    Numbered { number: &'a str, body: &'a str },
    Plain(&'a str),
    Blank,
}

impl<'a> Line<'a> {
    fn classify(line: &'a str, multi_line: bool) -> Self {
        if multi_line && line.trim().is_empty() {
            return Line::Blank;
        }
        if let Some(caps) = HEADING.captures(line) {
            return Line::Heading(caps.get(1).map_or("", |m| m.as_str()));
        }
        if let Some(caps) = BULLET.captures(line) {
            return Line::Bullet(caps.get(1).map_or("", |m| m.as_str()));
        }
        if let Some(caps) = NUMBERED.captures(line) {
            return Line::Numbered {
                number: caps.get(1).map_or("", |m| m.as_str()),
                body: caps.get(2).map_or("", |m| m.as_str()),
            };
        }
        Line::Plain(line)
    }

    fn is_block(&self) -> bool {
        matches!(
            self,
            Line::Heading(_) | Line::Bullet(_) | Line::Numbered { .. }
        )
    }

    fn to_html(&self) -> String {
        match self {
            Line::Heading(text) => format!(
                r#"<div class="md-heading"><strong>{}</strong></div>"#,
                format_inline(text)
            ),
            Line::Bullet(text) => {
                format!(r#"<div class="md-bullet">&bull; {}</div>"#, format_inline(text))
            }
            Line::Numbered { number, body } => format!(
                r#"<div class="md-list">{number}. {}</div>"#,
                format_inline(body)
            ),
            Line::Plain(text) => format_inline(text),
            Line::Blank => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// Escaped text still open to later rules
    Text(String),
    /// Final markup
    Markup(String),
}

struct InlineRule {
    pattern: Regex,
    open: &'static str,
    close: &'static str,
    /// Whether the captured body is sealed against later rules
    frozen: bool,
}

impl InlineRule {
    fn new(pattern: &str, open: &'static str, close: &'static str, frozen: bool) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("inline rule pattern is valid"),
            open,
            close,
            frozen,
        }
    }

    fn apply(&self, tokens: Vec<Token>) -> Vec<Token> {
        let mut out = Vec::with_capacity(tokens.len());
        for token in tokens {
            let Token::Text(text) = token else {
                out.push(token);
                continue;
            };

            let mut cursor = 0;
            for caps in self.pattern.captures_iter(&text) {
                let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                push_text(&mut out, text.get(cursor..whole.start()));
                out.push(Token::Markup(self.open.to_string()));
                if self.frozen {
                    out.push(Token::Markup(body.as_str().to_string()));
                } else {
                    out.push(Token::Text(body.as_str().to_string()));
                }
                out.push(Token::Markup(self.close.to_string()));
                cursor = whole.end();
            }
            push_text(&mut out, text.get(cursor..));
        }
        out
    }
}

fn push_text(out: &mut Vec<Token>, text: Option<&str>) {
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        out.push(Token::Text(text.to_string()));
    }
}

fn format_inline(text: &str) -> String {
    INLINE_RULES
        .iter()
        .fold(vec![Token::Text(text.to_string())], |tokens, rule| {
            rule.apply(tokens)
        })
        .into_iter()
        .map(|token| match token {
            Token::Text(s) | Token::Markup(s) => s,
        })
        .collect()
}
