/// Pure display derivations shared by the report renderers.
use analyzer_common::model::CategoryScores;

/// Shown in place of a top category when the service reported no scores.
pub const NO_CATEGORY: &str = "—";

/// "exact_phrase" -> "EXACT PHRASE". Only the first underscore becomes a space.
///
/// Display only; the CSV export keeps the raw value.
pub fn humanize_match_type(t: &str) -> String {
    if t.is_empty() {
        return String::new();
    }
    t.replacen('_', " ", 1).to_uppercase()
}

/// Category with the highest score, or [`NO_CATEGORY`].
///
/// Ties go to the first entry in response order. That order comes from the
/// service's JSON, so a tie is only as stable as the service's field order.
pub fn top_category(scores: &CategoryScores) -> &str {
    let mut best: Option<(&str, f64)> = None;
    for (name, score) in scores.iter() {
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((name, score));
        }
    }
    best.map(|(name, _)| name).unwrap_or(NO_CATEGORY)
}

pub fn relevance_label(relevant: bool) -> &'static str {
    if relevant {
        "YES"
    } else {
        "NO"
    }
}

/// Bar width in percent. Layout only: the number next to the bar stays unclamped.
pub fn bar_width_pct(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

/// Fixed-width text bar filled in proportion to `bar_width_pct(value)`.
pub fn text_bar(value: f64, width: usize) -> String {
    let filled = ((bar_width_pct(value) / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Integral values print without a fraction: `2.0` -> "2", `1.5` -> "1.5".
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // avoids "-0"
        return "0".to_string();
    }
    n.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humanize_replaces_only_first_underscore() {
        assert_eq!(humanize_match_type("exact_phrase"), "EXACT PHRASE");
        assert_eq!(humanize_match_type("fuzzy_strong_extra"), "FUZZY STRONG_EXTRA");
        assert_eq!(humanize_match_type("token"), "TOKEN");
        assert_eq!(humanize_match_type(""), "");
    }

    #[test]
    fn top_category_picks_highest_score() {
        let scores: CategoryScores = [("endo", 40.0), ("diagnostic", 75.0)].into_iter().collect();
        assert_eq!(top_category(&scores), "diagnostic");
    }

    #[test]
    fn top_category_tie_goes_to_first_entry() {
        let scores: CategoryScores = [("endo", 5.0), ("diagnostic", 5.0)].into_iter().collect();
        assert_eq!(top_category(&scores), "endo");
        let scores: CategoryScores = [("diagnostic", 5.0), ("endo", 5.0)].into_iter().collect();
        assert_eq!(top_category(&scores), "diagnostic");
    }

    #[test]
    fn top_category_of_nothing_is_sentinel() {
        assert_eq!(top_category(&CategoryScores::default()), NO_CATEGORY);
    }

    #[test]
    fn bars_clamp_but_numbers_do_not() {
        assert_eq!(bar_width_pct(140.0), 100.0);
        assert_eq!(bar_width_pct(-3.0), 0.0);
        assert_eq!(bar_width_pct(f64::NAN), 0.0);
        assert_eq!(text_bar(250.0, 4), "████");
        assert_eq!(text_bar(50.0, 4), "██░░");
        assert_eq!(text_bar(0.0, 3), "░░░");
        assert_eq!(format_number(140.0), "140");
    }

    #[test]
    fn numbers_print_like_the_service_wrote_them() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(relevance_label(true), "YES");
        assert_eq!(relevance_label(false), "NO");
    }
}
