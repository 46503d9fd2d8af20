//! Answer scoring against gold labels.
//!
//! Each gold answer carries a semantic type that decides how loosely a model
//! response may be phrased and still count: booleans accept yes/no synonyms,
//! numbers compare after rounding to two decimals, lists compare
//! order-insensitively element by element.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Unknown semantic type `{0}`")]
    UnknownSemantic(String),
    #[error("Predictions and labels differ in length: {predictions} vs {labels}")]
    LengthMismatch { predictions: usize, labels: usize },
    #[error("Cannot score an empty run")]
    EmptyRun,
}

pub type ScoringResult<T> = Result<T, ScoringError>;

/// Semantic type of a gold answer.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
    strum::AsRefStr,
)]
pub enum Semantic {
    #[strum(serialize = "boolean")]
    #[serde(rename = "boolean")]
    Boolean,
    #[strum(serialize = "category")]
    #[serde(rename = "category")]
    Category,
    #[strum(serialize = "number")]
    #[serde(rename = "number")]
    Number,
    #[strum(serialize = "list[category]")]
    #[serde(rename = "list[category]")]
    ListCategory,
    #[strum(serialize = "list[number]")]
    #[serde(rename = "list[number]")]
    ListNumber,
}

impl Semantic {
    pub fn parse(text: &str) -> ScoringResult<Self> {
        text.trim()
            .to_lowercase()
            .parse()
            .map_err(|_| ScoringError::UnknownSemantic(text.trim().to_string()))
    }
}

/// Does `response` match `truth` under the given semantic?
pub fn matches(response: &str, truth: &str, semantic: Semantic) -> bool {
    match semantic {
        Semantic::Boolean => match (parse_boolean(response), parse_boolean(truth)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        Semantic::Category => normalize_category(response) == normalize_category(truth),
        Semantic::Number => match (parse_number(response), parse_number(truth)) {
            (Some(a), Some(b)) => round2(a) == round2(b),
            _ => false,
        },
        Semantic::ListCategory => {
            lists_match(response, truth, |a, b| {
                normalize_category(a) == normalize_category(b)
            })
        }
        Semantic::ListNumber => lists_match(response, truth, |a, b| {
            match (parse_number(a), parse_number(b)) {
                (Some(a), Some(b)) => round2(a) == round2(b),
                _ => false,
            }
        }),
    }
}

fn strip_quotes(text: &str) -> &str {
    text.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
}

fn normalize_category(text: &str) -> String {
    strip_quotes(text).to_lowercase()
}

fn parse_boolean(text: &str) -> Option<bool> {
    match normalize_category(text).as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn parse_number(text: &str) -> Option<f64> {
    strip_quotes(text)
        .trim_start_matches(['$', '€', '£'])
        .trim_end_matches('%')
        .replace(',', "")
        .parse()
        .ok()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn split_list(text: &str) -> Vec<String> {
    let inner = text.trim().trim_start_matches('[').trim_end_matches(']');
    inner
        .split(',')
        .map(|part| strip_quotes(part).to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Order-insensitive element-wise match: every element pairs off exactly
/// once under the given equivalence.
fn lists_match(response: &str, truth: &str, eq: impl Fn(&str, &str) -> bool) -> bool {
    let response_items = split_list(response);
    let mut truth_items = split_list(truth);
    if response_items.len() != truth_items.len() {
        return false;
    }
    for item in &response_items {
        match truth_items.iter().position(|t| eq(item, t)) {
            Some(found) => {
                truth_items.swap_remove(found);
            }
            None => return false,
        }
    }
    true
}

/// Fraction of predictions equal to their label.
pub fn accuracy<T: PartialEq>(predictions: &[T], labels: &[T]) -> ScoringResult<f64> {
    check_lengths(predictions, labels)?;
    let correct = predictions
        .iter()
        .zip(labels)
        .filter(|(p, l)| p == l)
        .count();
    Ok(correct as f64 / predictions.len() as f64)
}

/// In this multi-class exact-match setting precision equals accuracy: every
/// prediction is an attempt and a hit is a hit.
pub fn precision<T: PartialEq>(predictions: &[T], labels: &[T]) -> ScoringResult<f64> {
    accuracy(predictions, labels)
}

pub fn recall<T: PartialEq>(predictions: &[T], labels: &[T]) -> ScoringResult<f64> {
    precision(predictions, labels)
}

pub fn f_score<T: PartialEq>(predictions: &[T], labels: &[T]) -> ScoringResult<f64> {
    let p = precision(predictions, labels)?;
    let r = recall(predictions, labels)?;
    if p + r == 0.0 {
        return Ok(0.0);
    }
    Ok(2.0 * p * r / (p + r))
}

fn check_lengths<T>(predictions: &[T], labels: &[T]) -> ScoringResult<()> {
    if predictions.len() != labels.len() {
        return Err(ScoringError::LengthMismatch {
            predictions: predictions.len(),
            labels: labels.len(),
        });
    }
    if predictions.is_empty() {
        return Err(ScoringError::EmptyRun);
    }
    Ok(())
}

/// One scored question of an evaluation run.
#[derive(Debug, Clone)]
pub struct ScoredRow {
    pub dataset: String,
    pub response: String,
    pub truth: String,
    pub semantic: Semantic,
}

/// Per-dataset accuracy plus the overall rate, in dataset name order.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetBreakdown {
    pub per_dataset: BTreeMap<String, DatasetScore>,
    pub overall: DatasetScore,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetScore {
    pub correct: usize,
    pub total: usize,
}

impl DatasetScore {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64
    }
}

impl DatasetBreakdown {
    pub fn from_rows(rows: &[ScoredRow]) -> ScoringResult<Self> {
        if rows.is_empty() {
            return Err(ScoringError::EmptyRun);
        }
        let mut per_dataset: BTreeMap<String, DatasetScore> = BTreeMap::new();
        let mut overall = DatasetScore {
            correct: 0,
            total: 0,
        };
        for row in rows {
            let hit = matches(&row.response, &row.truth, row.semantic);
            let score = per_dataset
                .entry(row.dataset.clone())
                .or_insert(DatasetScore {
                    correct: 0,
                    total: 0,
                });
            score.total += 1;
            overall.total += 1;
            if hit {
                score.correct += 1;
                overall.correct += 1;
            }
        }
        Ok(Self {
            per_dataset,
            overall,
        })
    }
}

impl fmt::Display for DatasetBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy by dataset:")?;
        writeln!(f, "{}", "-".repeat(30))?;
        for (dataset, score) in &self.per_dataset {
            writeln!(f, "{}: {:.2}", dataset, score.accuracy())?;
        }
        writeln!(f, "{}", "-".repeat(30))?;
        write!(f, "Overall Accuracy: {:.2}", self.overall.accuracy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_semantic_parse() {
        assert_eq!(Semantic::parse("boolean").unwrap(), Semantic::Boolean);
        assert_eq!(
            Semantic::parse("list[number]").unwrap(),
            Semantic::ListNumber
        );
        assert!(matches!(
            Semantic::parse("vector"),
            Err(ScoringError::UnknownSemantic(_))
        ));
    }

    #[test]
    fn test_boolean_synonyms() {
        assert!(matches("Yes", "True", Semantic::Boolean));
        assert!(matches("no", "False", Semantic::Boolean));
        assert!(!matches("maybe", "True", Semantic::Boolean));
    }

    #[test]
    fn test_category_case_and_quotes() {
        assert!(matches("\"New York\"", "new york", Semantic::Category));
        assert!(!matches("New York", "Boston", Semantic::Category));
    }

    #[test]
    fn test_number_rounding_and_symbols() {
        assert!(matches("31.337", "31.34", Semantic::Number));
        assert!(matches("$1,200", "1200", Semantic::Number));
        assert!(!matches("31.3", "31.4", Semantic::Number));
        assert!(!matches("n/a", "31.4", Semantic::Number));
    }

    #[test]
    fn test_list_category_order_insensitive() {
        assert!(matches(
            "['LA', 'NY']",
            "[\"NY\", \"LA\"]",
            Semantic::ListCategory
        ));
        assert!(!matches("['LA']", "['NY', 'LA']", Semantic::ListCategory));
        // Duplicates must pair off one-to-one.
        assert!(!matches(
            "['NY', 'NY']",
            "['NY', 'LA']",
            Semantic::ListCategory
        ));
    }

    #[test]
    fn test_list_number() {
        assert!(matches("[1, 2.004]", "[2.0, 1]", Semantic::ListNumber));
        assert!(!matches("[1, 2]", "[1, 3]", Semantic::ListNumber));
    }

    #[test]
    fn test_metrics() {
        let predictions = vec!["a", "b", "c", "d"];
        let labels = vec!["a", "b", "x", "d"];
        assert_eq!(accuracy(&predictions, &labels).unwrap(), 0.75);
        assert_eq!(f_score(&predictions, &labels).unwrap(), 0.75);
        let none = vec!["q"];
        assert_eq!(f_score(&none, &["z"]).unwrap(), 0.0);
    }

    #[test]
    fn test_metrics_length_mismatch() {
        assert!(matches!(
            accuracy(&["a"], &["a", "b"]),
            Err(ScoringError::LengthMismatch { .. })
        ));
        assert!(matches!(
            accuracy::<&str>(&[], &[]),
            Err(ScoringError::EmptyRun)
        ));
    }

    #[test]
    fn test_dataset_breakdown() {
        let rows = vec![
            ScoredRow {
                dataset: "066".into(),
                response: "NY".into(),
                truth: "ny".into(),
                semantic: Semantic::Category,
            },
            ScoredRow {
                dataset: "066".into(),
                response: "4".into(),
                truth: "5".into(),
                semantic: Semantic::Number,
            },
            ScoredRow {
                dataset: "067".into(),
                response: "True".into(),
                truth: "yes".into(),
                semantic: Semantic::Boolean,
            },
        ];
        let breakdown = DatasetBreakdown::from_rows(&rows).unwrap();
        assert_eq!(breakdown.per_dataset["066"].accuracy(), 0.5);
        assert_eq!(breakdown.per_dataset["067"].accuracy(), 1.0);
        assert!((breakdown.overall.accuracy() - 2.0 / 3.0).abs() < 1e-9);
        let rendered = breakdown.to_string();
        assert!(rendered.contains("066: 0.50"));
        assert!(rendered.contains("Overall Accuracy: 0.67"));
    }
}
