//! Chunk index construction.
//!
//! Turns decoded [`SourceRecord`]s into an immutable [`ChunkIndex`]: a list
//! of [`IndexedChunk`]s plus the [`FacetIndex`] computed from exactly those
//! chunks.
//!
//! # Algorithm
//!
//! 1. Trim `content`; records whose content is missing or blank are dropped.
//! 2. Trim `subject`, `grade_context` and `content_type` (missing → `""`).
//! 3. Trim `source`, falling back to the default source when it is empty.
//! 4. Tokenize the content and build the term-frequency histogram.
//! 5. Collect facet values from the retained chunks.
//!
//! # Example
//!
//! ```rust
//! use ops_index_core::chunk::ChunkIndex;
//!
//! let json = r#"[{"content": "Kertotaulu on tärkeä", "subject": "Matematiikka"},
//!                {"content": "   "}]"#;
//! let index = ChunkIndex::from_json_str(json, "POPS_2014").unwrap();
//! assert_eq!(index.len(), 1);
//! assert_eq!(index.facets().subjects, vec!["Matematiikka"]);
//! ```

use std::collections::{BTreeSet, HashMap};

use anyhow::{Context, Result};

use crate::models::{FacetIndex, IndexedChunk, SourceRecord};

/// Split text into lowercased word tokens.
///
/// A word is a maximal run of Unicode alphanumeric characters or `_`.
/// Everything else (whitespace, punctuation, soft hyphens, symbols) is a
/// separator.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            current.extend(ch.to_lowercase());
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Count token occurrences.
pub fn term_frequency(tokens: &[String]) -> HashMap<String, u32> {
    let mut tf = HashMap::new();
    for t in tokens {
        *tf.entry(t.clone()).or_insert(0) += 1;
    }
    tf
}

/// An immutable snapshot of the loaded chunk collection and its facets.
#[derive(Debug, Clone, Default)]
pub struct ChunkIndex {
    chunks: Vec<IndexedChunk>,
    facets: FacetIndex,
}

impl ChunkIndex {
    /// Build an index from decoded records.
    ///
    /// `default_source` is used for records without a non-blank `source`.
    /// Chunk ids are `ops-<i>` where `i` is the record's position in the
    /// input, so ids of dropped records are simply skipped.
    pub fn from_records(records: Vec<SourceRecord>, default_source: &str) -> Self {
        let mut chunks = Vec::with_capacity(records.len());

        for (i, record) in records.into_iter().enumerate() {
            let text = trimmed(record.content.as_deref());
            if text.is_empty() {
                continue;
            }
            let source = match trimmed(record.source.as_deref()) {
                s if s.is_empty() => default_source.to_string(),
                s => s,
            };
            let ordinal = chunks.len();
            chunks.push(make_chunk(
                format!("ops-{}", i),
                ordinal,
                text,
                trimmed(record.subject.as_deref()),
                trimmed(record.grade_context.as_deref()),
                trimmed(record.content_type.as_deref()),
                source,
            ));
        }

        let facets = build_facets(&chunks);
        Self { chunks, facets }
    }

    /// Decode a JSON array of records and build an index from it.
    ///
    /// Fails only when the document is not a JSON array of objects with
    /// string-or-null fields. Missing fields are fine.
    pub fn from_json_str(json: &str, default_source: &str) -> Result<Self> {
        let records: Vec<SourceRecord> =
            serde_json::from_str(json).context("Failed to parse chunk JSON")?;
        Ok(Self::from_records(records, default_source))
    }

    pub fn chunks(&self) -> &[IndexedChunk] {
        &self.chunks
    }

    pub fn facets(&self) -> &FacetIndex {
        &self.facets
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Look up a chunk by its id.
    pub fn get(&self, id: &str) -> Option<&IndexedChunk> {
        self.chunks.iter().find(|c| c.id == id)
    }
}

fn trimmed(value: Option<&str>) -> String {
    value.unwrap_or_default().trim().to_string()
}

fn make_chunk(
    id: String,
    ordinal: usize,
    text: String,
    subject: String,
    grade_context: String,
    content_type: String,
    source: String,
) -> IndexedChunk {
    let tokens = tokenize(&text);
    let term_frequency = term_frequency(&tokens);
    let length = tokens.len().max(1);

    IndexedChunk {
        id,
        ordinal,
        text,
        subject,
        grade_context,
        content_type,
        source,
        tokens,
        term_frequency,
        length,
    }
}

fn build_facets(chunks: &[IndexedChunk]) -> FacetIndex {
    let mut subjects = BTreeSet::new();
    let mut grades = BTreeSet::new();
    let mut content_types = BTreeSet::new();

    for c in chunks {
        subjects.insert(c.subject.as_str());
        grades.insert(c.grade_context.as_str());
        content_types.insert(c.content_type.as_str());
    }

    let clean = |set: BTreeSet<&str>| -> Vec<String> {
        set.into_iter()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    };

    FacetIndex {
        subjects: clean(subjects),
        grades: clean(grades),
        content_types: clean(content_types),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(content: &str, subject: &str) -> SourceRecord {
        SourceRecord {
            content: Some(content.to_string()),
            subject: Some(subject.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_tokenize_lowercases_and_splits() {
        assert_eq!(
            tokenize("Hello, World! snake_case 42x"),
            vec!["hello", "world", "snake_case", "42x"]
        );
    }

    #[test]
    fn test_tokenize_unicode_words() {
        assert_eq!(
            tokenize("Äidinkieli ja KIRJALLISUUS: 1–2 lk."),
            vec!["äidinkieli", "ja", "kirjallisuus", "1", "2", "lk"]
        );
    }

    #[test]
    fn test_tokenize_soft_hyphen_splits() {
        assert_eq!(tokenize("Kerto\u{00AD}taulu"), vec!["kerto", "taulu"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ... !!").is_empty());
    }

    #[test]
    fn test_blank_content_dropped() {
        let records = vec![
            record("First text", "A"),
            record("   \n\t ", "B"),
            SourceRecord::default(),
            record("Second text", "C"),
        ];
        let index = ChunkIndex::from_records(records, "POPS_2014");
        assert_eq!(index.len(), 2);
        assert_eq!(index.chunks()[0].id, "ops-0");
        assert_eq!(index.chunks()[1].id, "ops-3");
        assert_eq!(index.chunks()[1].ordinal, 1);
        assert_eq!(index.facets().subjects, vec!["A", "C"]);
    }

    #[test]
    fn test_fields_trimmed_and_source_defaulted() {
        let records = vec![
            SourceRecord {
                content: Some("  body text  ".to_string()),
                subject: Some(" Historia ".to_string()),
                grade_context: Some(" 3-6 ".to_string()),
                content_type: None,
                source: Some("   ".to_string()),
            },
            SourceRecord {
                content: Some("other".to_string()),
                source: Some(" POPS_2016 ".to_string()),
                ..Default::default()
            },
        ];
        let index = ChunkIndex::from_records(records, "POPS_2014");
        let c = &index.chunks()[0];
        assert_eq!(c.text, "body text");
        assert_eq!(c.subject, "Historia");
        assert_eq!(c.grade_context, "3-6");
        assert_eq!(c.content_type, "");
        assert_eq!(c.source, "POPS_2014");
        assert_eq!(index.chunks()[1].source, "POPS_2016");
        assert!(index.facets().content_types.is_empty());
    }

    #[test]
    fn test_token_stats_consistent() {
        let index = ChunkIndex::from_records(vec![record("a b a, A", "x")], "s");
        let c = &index.chunks()[0];
        assert_eq!(c.tokens, vec!["a", "b", "a", "a"]);
        assert_eq!(c.term_frequency.get("a"), Some(&3));
        assert_eq!(c.term_frequency.get("b"), Some(&1));
        assert_eq!(c.length, 4);
    }

    #[test]
    fn test_length_floor_is_one() {
        let index = ChunkIndex::from_records(vec![record("—", "x")], "s");
        let c = &index.chunks()[0];
        assert!(c.tokens.is_empty());
        assert_eq!(c.length, 1);
    }

    #[test]
    fn test_facets_sorted_distinct() {
        let records = vec![
            record("1", "Matematiikka"),
            record("2", "Historia"),
            record("3", "Matematiikka"),
            record("4", ""),
        ];
        let index = ChunkIndex::from_records(records, "s");
        assert_eq!(index.facets().subjects, vec!["Historia", "Matematiikka"]);
        assert!(index.facets().grades.is_empty());
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        assert!(ChunkIndex::from_json_str(r#"{"content": "x"}"#, "s").is_err());
        assert!(ChunkIndex::from_json_str("not json", "s").is_err());
    }

    #[test]
    fn test_get_by_id() {
        let index = ChunkIndex::from_records(vec![record("one", "a"), record("two", "b")], "s");
        assert_eq!(index.get("ops-1").map(|c| c.text.as_str()), Some("two"));
        assert!(index.get("ops-9").is_none());
    }
}
