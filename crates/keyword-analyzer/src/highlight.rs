/// Highlight compiler.
///
/// Turns source text plus highlight tokens into an ordered list of spans. Each
/// token is compiled into a case-insensitive literal pattern and applied only to
/// the still-unmarked spans, so a shorter token never splits a region marked by a
/// longer one. Renderers escape span content themselves; no markup is produced
/// here.
use analyzer_common::model::MatchRecord;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::debug;

use crate::normalize::highlight_tokens;

/// Upper bound on a compiled token pattern. Larger tokens are skipped.
const PATTERN_SIZE_LIMIT: usize = 256 * 1024;

/// A contiguous piece of the source text, marked or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightSpan {
    pub content: String,
    pub is_match: bool,
}

impl HighlightSpan {
    pub fn plain(content: &str) -> Self {
        Self {
            content: content.to_string(),
            is_match: false,
        }
    }

    pub fn marked(content: &str) -> Self {
        Self {
            content: content.to_string(),
            is_match: true,
        }
    }
}

/// Compile a token into a literal, case-insensitive pattern.
///
/// Returns `Ok(None)` for tokens that are blank after trimming.
pub fn compile_token(token: &str) -> Result<Option<Regex>, regex::Error> {
    if token.trim().is_empty() {
        return Ok(None);
    }
    RegexBuilder::new(&regex::escape(token))
        .case_insensitive(true)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
        .map(Some)
}

/// Split `text` into spans, marking occurrences of `tokens` in the given order.
///
/// Concatenating the returned spans yields `text` exactly. A token that fails to
/// compile is skipped and the remaining tokens are still applied.
pub fn highlight(text: &str, tokens: &[String]) -> Vec<HighlightSpan> {
    let initial = if text.is_empty() {
        Vec::new()
    } else {
        vec![HighlightSpan::plain(text)]
    };

    tokens
        .iter()
        .fold(initial, |spans, token| match compile_token(token) {
            Ok(Some(pattern)) => mark_unmarked(spans, &pattern),
            Ok(None) => spans,
            Err(e) => {
                debug!(token = %token, error = %e, "skipping highlight token");
                spans
            }
        })
}

/// Highlight `text` with the tokens derived from `matches`.
pub fn highlight_matches(text: &str, matches: &[MatchRecord]) -> Vec<HighlightSpan> {
    highlight(text, &highlight_tokens(matches))
}

fn mark_unmarked(spans: Vec<HighlightSpan>, pattern: &Regex) -> Vec<HighlightSpan> {
    let mut out = Vec::with_capacity(spans.len());
    for span in spans {
        if span.is_match {
            out.push(span);
            continue;
        }

        let content = span.content.as_str();
        let mut cursor = 0;
        for m in pattern.find_iter(content) {
            if m.start() == m.end() {
                continue;
            }
            if m.start() > cursor {
                out.push(HighlightSpan::plain(&content[cursor..m.start()]));
            }
            out.push(HighlightSpan::marked(m.as_str()));
            cursor = m.end();
        }

        if cursor == 0 {
            out.push(span);
        } else if cursor < content.len() {
            out.push(HighlightSpan::plain(&content[cursor..]));
        }
    }
    out
}
