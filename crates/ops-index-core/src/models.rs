//! Core data models used throughout ops-index.
//!
//! [`SourceRecord`] is the raw shape of one element in the curriculum JSON
//! file. [`IndexedChunk`] is its normalized, tokenized form held in memory,
//! and [`ResultRecord`] is what callers get back from a retrieval.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Provenance label used when a record carries no `source` of its own.
pub const DEFAULT_SOURCE: &str = "POPS_2014";

/// One element of the input JSON array.
///
/// Every field is optional; `null` is treated the same as a missing key and
/// unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceRecord {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub grade_context: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// A normalized text fragment with precomputed token statistics.
///
/// `tokens`, `term_frequency` and `length` are derived from `text` once, when
/// the chunk is built, and never updated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedChunk {
    /// Synthetic id, `ops-<array position>`. Unique within one load only.
    pub id: String,
    /// Position within the loaded collection.
    pub ordinal: usize,
    pub text: String,
    pub subject: String,
    pub grade_context: String,
    pub content_type: String,
    pub source: String,
    /// Lowercased word tokens of `text`, in order.
    pub tokens: Vec<String>,
    /// Histogram of `tokens`.
    pub term_frequency: HashMap<String, u32>,
    /// `max(tokens.len(), 1)`.
    pub length: usize,
}

/// Distinct, non-empty facet values, each list sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetIndex {
    pub subjects: Vec<String>,
    pub grades: Vec<String>,
    pub content_types: Vec<String>,
}

/// A retrieval result as exposed to callers.
///
/// `score` is present only for keyword queries; the empty-query listing
/// leaves it out entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: String,
    pub text: String,
    pub subject: String,
    pub grade_context: String,
    pub content_type: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl ResultRecord {
    pub(crate) fn from_chunk(chunk: &IndexedChunk, score: Option<f64>) -> Self {
        Self {
            id: chunk.id.clone(),
            text: chunk.text.clone(),
            subject: chunk.subject.clone(),
            grade_context: chunk.grade_context.clone(),
            content_type: chunk.content_type.clone(),
            source: chunk.source.clone(),
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_record_missing_and_null_fields() {
        let json = r#"[{"content": "x", "subject": null, "extra": 5}, {}]"#;
        let records: Vec<SourceRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].content.as_deref(), Some("x"));
        assert!(records[0].subject.is_none());
        assert!(records[1].content.is_none());
    }

    #[test]
    fn test_result_record_omits_absent_score() {
        let rec = ResultRecord {
            id: "ops-0".to_string(),
            text: "t".to_string(),
            subject: String::new(),
            grade_context: String::new(),
            content_type: String::new(),
            source: DEFAULT_SOURCE.to_string(),
            score: None,
        };
        let v = serde_json::to_value(&rec).unwrap();
        assert!(v.get("score").is_none());

        let scored = ResultRecord {
            score: Some(0.25),
            ..rec
        };
        let v = serde_json::to_value(&scored).unwrap();
        assert_eq!(v["score"], serde_json::json!(0.25));
    }

    #[test]
    fn test_facet_index_field_names() {
        let f = FacetIndex::default();
        let v = serde_json::to_value(&f).unwrap();
        assert!(v.get("subjects").is_some());
        assert!(v.get("grades").is_some());
        assert!(v.get("content_types").is_some());
    }
}
