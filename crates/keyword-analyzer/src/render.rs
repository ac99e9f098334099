/// Report renderers: ANSI terminal text, an HTML fragment, and JSON.
///
/// All three consume highlight spans rather than pre-marked strings. Source text
/// is escaped for the target (control characters for the terminal, entities for
/// HTML) before any marker is added around it.
use analyzer_common::model::AnalysisResult;
use serde::Serialize;

use crate::highlight::HighlightSpan;
use crate::present::{
    bar_width_pct, format_number, humanize_match_type, relevance_label, text_bar, top_category,
};

const SCORE_BAR_WIDTH: usize = 30;
const CATEGORY_BAR_WIDTH: usize = 20;
const TABLE_HEADERS: [&str; 5] = ["Phrase", "Type", "Weight", "Matched", "Category"];

const ANSI_MARK_START: &str = "\x1b[7m";
const ANSI_RESET: &str = "\x1b[0m";

/// Write control characters as escapes so source text cannot drive the terminal.
/// Newlines and tabs are kept when `keep_layout` is set.
fn escape_controls(s: &str, keep_layout: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' | '\t' if keep_layout => out.push(c),
            c if c.is_control() => out.extend(c.escape_default()),
            c => out.push(c),
        }
    }
    out
}

fn pad(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    format!("{cell}{}", " ".repeat(width.saturating_sub(len)))
}

fn table_rows(result: &AnalysisResult) -> Vec<[String; 5]> {
    result
        .matches
        .iter()
        .map(|m| {
            [
                m.phrase.clone(),
                humanize_match_type(&m.match_type),
                format_number(m.weight),
                m.matched_text.clone(),
                m.category.clone(),
            ]
        })
        .collect()
}

/// Plain-text report for a terminal. `color` enables ANSI reverse video for
/// matches; without it matches are bracketed.
pub fn terminal(spans: &[HighlightSpan], result: &AnalysisResult, color: bool) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Relevant: {} — {}%  ({} matched)\n",
        relevance_label(result.relevant),
        format_number(result.score_pct),
        result.match_count()
    ));
    out.push_str(&format!("[{}]\n", text_bar(result.score_pct, SCORE_BAR_WIDTH)));
    out.push_str(&format!(
        "Top category: {}\n",
        escape_controls(top_category(&result.category_scores), false)
    ));

    out.push_str(&format!("\nMatches ({})\n", result.matches.len()));
    let rows: Vec<[String; 5]> = table_rows(result)
        .into_iter()
        .map(|row| row.map(|cell| escape_controls(&cell, false)))
        .collect();
    let mut widths = TABLE_HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let header: Vec<String> = TABLE_HEADERS
        .iter()
        .zip(widths)
        .map(|(h, w)| pad(h, w))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');
    for row in &rows {
        let line: Vec<String> = row.iter().zip(widths).map(|(c, w)| pad(c, w)).collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }

    out.push_str("\nPreview\n");
    for span in spans {
        let content = escape_controls(&span.content, true);
        match (span.is_match, color) {
            (false, _) => out.push_str(&content),
            (true, true) => out.push_str(&format!("{ANSI_MARK_START}{content}{ANSI_RESET}")),
            (true, false) => out.push_str(&format!("[{content}]")),
        }
    }
    out.push('\n');

    out.push_str("\nCategory Scores\n");
    let name_width = result
        .category_scores
        .iter()
        .map(|(name, _)| escape_controls(name, false).chars().count())
        .max()
        .unwrap_or(0);
    for (name, score) in result.category_scores.iter() {
        out.push_str(&format!(
            "{}  {}  {}\n",
            pad(&escape_controls(name, false), name_width),
            text_bar(score, CATEGORY_BAR_WIDTH),
            format_number(score)
        ));
    }

    out
}

/// HTML fragment mirroring the result panel. Every piece of text coming from the
/// input or the service is entity-escaped; only `<mark>` wraps matches.
pub fn html(spans: &[HighlightSpan], result: &AnalysisResult) -> String {
    let esc = |s: &str| html_escape::encode_text(s).into_owned();
    let mut out = String::new();

    out.push_str("<section class=\"result-panel\">\n");
    out.push_str(&format!(
        "  <div class=\"result-badge {}\">{} — {}%</div>\n",
        if result.relevant { "yes" } else { "no" },
        relevance_label(result.relevant),
        format_number(result.score_pct)
    ));
    out.push_str(&format!(
        "  <div class=\"progress-bar-bg\"><div class=\"progress-bar-fill\" style=\"width: {}%\"></div></div>\n",
        format_number(bar_width_pct(result.score_pct))
    ));
    out.push_str(&format!(
        "  <div class=\"muted small\">Top category: {}</div>\n",
        esc(top_category(&result.category_scores))
    ));

    out.push_str(&format!(
        "  <h4 class=\"section-title\">Matches ({})</h4>\n",
        result.matches.len()
    ));
    out.push_str("  <table class=\"matches-table\">\n    <thead><tr>");
    for h in TABLE_HEADERS {
        out.push_str(&format!("<th>{h}</th>"));
    }
    out.push_str("</tr></thead>\n    <tbody>\n");
    for row in table_rows(result) {
        out.push_str("      <tr>");
        for (i, cell) in row.iter().enumerate() {
            if i == 3 {
                out.push_str(&format!("<td class=\"matched\">{}</td>", esc(cell)));
            } else {
                out.push_str(&format!("<td>{}</td>", esc(cell)));
            }
        }
        out.push_str("</tr>\n");
    }
    out.push_str("    </tbody>\n  </table>\n");

    out.push_str("  <h4 class=\"section-title\">Preview</h4>\n  <div class=\"preview-box\">");
    for span in spans {
        if span.is_match {
            out.push_str(&format!("<mark>{}</mark>", esc(&span.content)));
        } else {
            out.push_str(&esc(&span.content));
        }
    }
    out.push_str("</div>\n");

    out.push_str("  <h4 class=\"section-title\">Category Scores</h4>\n  <div class=\"category-list\">\n");
    for (name, score) in result.category_scores.iter() {
        out.push_str(&format!(
            "    <div class=\"category-row\"><div class=\"cat-name\">{}</div><div class=\"cat-bar-bg\"><div class=\"cat-bar-fill\" style=\"width: {}%\"></div></div><div class=\"cat-val\">{}</div></div>\n",
            esc(name),
            format_number(bar_width_pct(score)),
            format_number(score)
        ));
    }
    out.push_str("  </div>\n</section>\n");

    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    top_category: &'a str,
    result: &'a AnalysisResult,
    preview: &'a [HighlightSpan],
}

/// Machine-readable report: the raw result plus derived fields.
pub fn json(spans: &[HighlightSpan], result: &AnalysisResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonReport {
        top_category: top_category(&result.category_scores),
        result,
        preview: spans,
    })
}
