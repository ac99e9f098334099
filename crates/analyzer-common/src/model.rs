use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

/// Category filter sent with an analyze request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    All,
    Diagnostic,
    Endo,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Diagnostic => "diagnostic",
            Category::Endo => "endo",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /api/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeRequest {
    pub text: String,
    pub category: Category,
}

impl AnalyzeRequest {
    pub fn new(text: impl Into<String>, category: Category) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }
}

/// One phrase/category match reported by the analysis service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Keyword phrase from the service's dictionary.
    #[serde(default, deserialize_with = "null_as_default")]
    pub phrase: String,
    /// Category the phrase belongs to, e.g. "Diagnostic".
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    /// Open set: "exact", "token", "fuzzy_strong", "fuzzy_weak", ...
    #[serde(default, deserialize_with = "null_as_default")]
    pub match_type: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        serialize_with = "serialize_number"
    )]
    pub weight: f64,
    /// Literal text from the input that triggered the match. May hold several
    /// comma-separated fragments.
    #[serde(default, deserialize_with = "null_as_default")]
    pub matched_text: String,
}

/// Per-category scores in the order the service wrote them.
///
/// The order matters: `top_category` breaks ties by first occurrence, so it is
/// only as deterministic as the service's JSON field order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct CategoryScores(Vec<(String, f64)>);

impl CategoryScores {
    pub fn new(scores: Vec<(String, f64)>) -> Self {
        Self(scores)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, score)| (name.as_str(), *score))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for CategoryScores {
    fn from(map: Map<String, Value>) -> Self {
        let scores = map
            .into_iter()
            .filter_map(|(name, value)| match value.as_f64() {
                Some(score) => Some((name, score)),
                None => {
                    debug!(category = %name, value = %value, "dropping non-numeric category score");
                    None
                }
            })
            .collect();
        Self(scores)
    }
}

impl From<CategoryScores> for Map<String, Value> {
    fn from(scores: CategoryScores) -> Self {
        scores
            .0
            .into_iter()
            .map(|(name, score)| (name, number_value(score)))
            .collect()
    }
}

impl<'a> FromIterator<(&'a str, f64)> for CategoryScores {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, score)| (name.to_string(), score))
                .collect(),
        )
    }
}

/// Response of a successful analyze call. Replaced wholesale on every call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub relevant: bool,
    /// 0..=100 as computed by the service. Displayed as-is, never clamped.
    #[serde(serialize_with = "serialize_number")]
    pub score_pct: f64,
    #[serde(default)]
    pub category_scores: CategoryScores,
    #[serde(default)]
    pub matches: Vec<MatchRecord>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_number"
    )]
    pub raw_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meaningful_tokens_matched: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text_tokens_raw: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text_tokens_filtered: Vec<String>,
}

impl AnalysisResult {
    /// Number of matched phrases, as reported by the service or counted locally.
    pub fn match_count(&self) -> usize {
        self.matched_count
            .map(|n| n as usize)
            .unwrap_or(self.matches.len())
    }
}

/// JSON number for `n`: whole values are written as integers (`67`, not
/// `67.0`), matching how the service writes them.
pub fn number_value(n: f64) -> Value {
    // 2^53, beyond which f64 no longer holds every integer
    const EXACT_INT_LIMIT: f64 = 9_007_199_254_740_992.0;
    if n.fract() == 0.0 && n.abs() < EXACT_INT_LIMIT {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

fn serialize_number<S: Serializer>(n: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    number_value(*n).serialize(serializer)
}

fn serialize_opt_number<S: Serializer>(n: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    n.map(number_value).serialize(serializer)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_serializes_lowercase() {
        let req = AnalyzeRequest::new("Hemorrhoid Stapler", Category::Diagnostic);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"text": "Hemorrhoid Stapler", "category": "diagnostic"})
        );
        assert_eq!(Category::default(), Category::All);
        assert_eq!(Category::Endo.to_string(), "endo");
    }

    #[test]
    fn category_scores_keep_response_order() {
        let body = r#"{
            "relevant": true,
            "score_pct": 62,
            "category_scores": {"endo": 40, "diagnostic": 75.5, "bogus": "n/a"},
            "matches": []
        }"#;
        let result: AnalysisResult = serde_json::from_str(body).unwrap();
        let scores: Vec<(&str, f64)> = result.category_scores.iter().collect();
        assert_eq!(scores, vec![("endo", 40.0), ("diagnostic", 75.5)]);
    }

    #[test]
    fn match_record_tolerates_missing_and_null_fields() {
        let body = r#"{"phrase": "stapler", "weight": null, "matched_text": null}"#;
        let record: MatchRecord = serde_json::from_str(body).unwrap();
        assert_eq!(record.phrase, "stapler");
        assert_eq!(record.category, "");
        assert_eq!(record.weight, 0.0);
        assert_eq!(record.matched_text, "");
    }

    #[test]
    fn diagnostic_fields_are_optional() {
        let body = r#"{
            "relevant": false,
            "score_pct": 10,
            "category_scores": {},
            "matches": [{"phrase": "a", "category": "Endo", "match_type": "token",
                         "weight": 1.5, "matched_text": "a"}]
        }"#;
        let result: AnalysisResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.raw_score, None);
        assert_eq!(result.match_count(), 1);

        let body = r#"{
            "relevant": true, "score_pct": 80, "category_scores": {}, "matches": [],
            "raw_score": 12.5, "matched_count": 4,
            "meaningful_tokens_matched": ["stapler"]
        }"#;
        let result: AnalysisResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.raw_score, Some(12.5));
        assert_eq!(result.match_count(), 4);
        assert_eq!(result.meaningful_tokens_matched, vec!["stapler"]);
    }

    #[test]
    fn whole_numbers_serialize_as_integers() {
        assert_eq!(number_value(67.0).to_string(), "67");
        assert_eq!(number_value(-0.0).to_string(), "0");
        assert_eq!(number_value(62.5).to_string(), "62.5");
        assert_eq!(number_value(1e300), Value::from(1e300));
        assert_eq!(number_value(f64::NAN), Value::Null);

        let result = AnalysisResult {
            relevant: true,
            score_pct: 67.0,
            category_scores: [("Endo", 6.0), ("Diagnostic", 2.5)].into_iter().collect(),
            matches: vec![MatchRecord {
                weight: 6.0,
                ..Default::default()
            }],
            raw_score: Some(12.0),
            ..Default::default()
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains(r#""score_pct":67,"#), "{json}");
        assert!(json.contains(r#""category_scores":{"Endo":6,"Diagnostic":2.5}"#), "{json}");
        assert!(json.contains(r#""weight":6,"#), "{json}");
        assert!(json.contains(r#""raw_score":12"#), "{json}");

        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
