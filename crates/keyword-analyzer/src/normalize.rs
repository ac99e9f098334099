/// Highlight token extraction from match records.
///
/// `matched_text` may carry several fragments ("foo, bar baz"); they are split on
/// runs of commas and whitespace, deduplicated case-sensitively and ordered
/// longest first so longer tokens are marked before any of their substrings.
use std::collections::HashSet;

use analyzer_common::model::MatchRecord;

fn is_separator(c: char) -> bool {
    c == ',' || c.is_whitespace()
}

/// Deduplicated highlight tokens, longest first; ties keep first-seen order.
pub fn highlight_tokens(matches: &[MatchRecord]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut tokens: Vec<&str> = matches
        .iter()
        .flat_map(|m| m.matched_text.split(is_separator))
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(*t))
        .collect();

    // sort_by_key is stable
    tokens.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));
    tokens.into_iter().map(str::to_string).collect()
}
