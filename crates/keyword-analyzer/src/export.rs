/// CSV export of match records.
///
/// Every field is quoted and embedded quotes are doubled, so a standard quoted-CSV
/// reader returns the original values unchanged, commas and newlines included.
use std::path::Path;

use analyzer_common::model::MatchRecord;
use tracing::{info, warn};

use crate::present::format_number;

pub const CSV_FILE_NAME: &str = "analyzer_matches.csv";
pub const CSV_MIME_TYPE: &str = "text/csv; charset=utf-8";

const HEADER: [&str; 5] = ["phrase", "category", "match_type", "weight", "matched_text"];

/// Serialize `matches` with a header row. `None` when there is nothing to export.
pub fn matches_to_csv(matches: &[MatchRecord]) -> Option<String> {
    if matches.is_empty() {
        return None;
    }

    let mut rows = Vec::with_capacity(matches.len() + 1);
    rows.push(csv_row(&HEADER));
    for m in matches {
        let weight = format_number(m.weight);
        rows.push(csv_row(&[
            m.phrase.as_str(),
            m.category.as_str(),
            m.match_type.as_str(),
            weight.as_str(),
            m.matched_text.as_str(),
        ]));
    }
    Some(rows.join("\n"))
}

fn csv_row(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| quote_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

fn quote_field(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Write `analyzer_matches.csv` into `dir`.
///
/// Fire and forget: an empty match list writes nothing, and a failed write is
/// logged, not returned.
pub fn save_csv(matches: &[MatchRecord], dir: &Path) {
    let Some(csv) = matches_to_csv(matches) else {
        return;
    };

    let path = dir.join(CSV_FILE_NAME);
    match std::fs::write(&path, csv) {
        Ok(()) => info!(
            path = %path.display(),
            rows = matches.len(),
            mime = CSV_MIME_TYPE,
            "exported matches"
        ),
        Err(e) => warn!(path = %path.display(), error = %e, "failed to export matches"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(phrase: &str, category: &str, match_type: &str, weight: f64, matched: &str) -> MatchRecord {
        MatchRecord {
            phrase: phrase.to_string(),
            category: category.to_string(),
            match_type: match_type.to_string(),
            weight,
            matched_text: matched.to_string(),
        }
    }

    /// Reader for the quoting rule used above: quoted fields, doubled quotes,
    /// comma between fields, newline between rows.
    fn parse_csv(input: &str) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        let mut row = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut chars = input.chars().peekable();
        while let Some(c) = chars.next() {
            match (in_quotes, c) {
                (true, '"') if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                (true, '"') => in_quotes = false,
                (true, c) => field.push(c),
                (false, '"') => in_quotes = true,
                (false, ',') => row.push(std::mem::take(&mut field)),
                (false, '\n') => {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                (false, c) => field.push(c),
            }
        }
        row.push(field);
        rows.push(row);
        rows
    }

    #[test]
    fn header_then_raw_values() {
        let csv = matches_to_csv(&[record("p1", "diagnostic", "exact_phrase", 2.0, "foo,bar")]).unwrap();
        assert_eq!(
            csv,
            "\"phrase\",\"category\",\"match_type\",\"weight\",\"matched_text\"\n\
             \"p1\",\"diagnostic\",\"exact_phrase\",\"2\",\"foo,bar\""
        );
    }

    #[test]
    fn quotes_are_doubled() {
        let csv = matches_to_csv(&[record("12\" stapler", "Endo", "token", 1.5, "say \"hi\"")]).unwrap();
        let data_row = csv.lines().nth(1).unwrap();
        assert_eq!(
            data_row,
            "\"12\"\" stapler\",\"Endo\",\"token\",\"1.5\",\"say \"\"hi\"\"\""
        );
    }

    #[test]
    fn round_trips_awkward_values() {
        let matches = vec![
            record("a, b", "Endo", "exact", 6.0, "line\nbreak"),
            record("\"quoted\"", "Diagnostic", "fuzzy_weak", 0.25, "ratio:82"),
            record("", "", "", 0.0, ""),
            record("trailing \"", "x,y", "token", 3.75, "\r\n,\""),
        ];
        let csv = matches_to_csv(&matches).unwrap();
        let rows = parse_csv(&csv);

        assert_eq!(rows.len(), matches.len() + 1);
        assert_eq!(rows[0], HEADER.iter().map(|h| h.to_string()).collect::<Vec<_>>());
        for (row, m) in rows[1..].iter().zip(&matches) {
            assert_eq!(
                row,
                &vec![
                    m.phrase.clone(),
                    m.category.clone(),
                    m.match_type.clone(),
                    format_number(m.weight),
                    m.matched_text.clone(),
                ]
            );
        }
    }

    #[test]
    fn nothing_to_export_is_none() {
        assert_eq!(matches_to_csv(&[]), None);
    }

    #[test]
    fn save_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        save_csv(&[record("p1", "Endo", "exact", 2.0, "stapler")], dir.path());

        let written = std::fs::read_to_string(dir.path().join(CSV_FILE_NAME)).unwrap();
        assert!(written.starts_with("\"phrase\""));
        assert!(written.ends_with("\"stapler\""));
    }

    #[test]
    fn save_with_no_matches_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        save_csv(&[], dir.path());
        assert!(!dir.path().join(CSV_FILE_NAME).exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn save_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        save_csv(&[record("p1", "Endo", "exact", 2.0, "stapler")], &missing);
        assert!(!missing.exists());
    }

    fn awkward_record() -> impl Strategy<Value = MatchRecord> {
        let field = || r#"[a-zé ",\n\r]{0,12}"#;
        (field(), field(), field(), -1.0e6f64..1.0e6, field()).prop_map(
            |(phrase, category, match_type, weight, matched_text)| MatchRecord {
                phrase,
                category,
                match_type,
                weight,
                matched_text,
            },
        )
    }

    proptest! {
        #[test]
        fn prop_quoted_csv_reads_back(matches in prop::collection::vec(awkward_record(), 1..8)) {
            let csv = matches_to_csv(&matches).unwrap();
            let rows = parse_csv(&csv);

            prop_assert_eq!(rows.len(), matches.len() + 1);
            for (row, m) in rows[1..].iter().zip(&matches) {
                prop_assert_eq!(&row[0], &m.phrase);
                prop_assert_eq!(&row[1], &m.category);
                prop_assert_eq!(&row[2], &m.match_type);
                prop_assert_eq!(row[3].parse::<f64>().unwrap(), m.weight);
                prop_assert_eq!(&row[4], &m.matched_text);
                prop_assert_eq!(row.len(), HEADER.len());
            }
        }
    }
}
