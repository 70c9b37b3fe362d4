//! Faceted keyword retrieval over a [`ChunkIndex`].
//!
//! # Scoring
//!
//! For a query tokenized the same way as chunk text:
//!
//! 1. `hits` = sum over query tokens (repeats counted) of the chunk's term
//!    frequency for that token. No hits → score `0.0`.
//! 2. `coverage` = distinct query tokens present in the chunk divided by
//!    distinct query tokens.
//! 3. `base = hits / (0.5 + 0.5 × length)`.
//! 4. `score = base × (1 + coverage)`.
//!
//! Chunks with `score > min_score` are returned by descending score, ties
//! broken by load order. An empty query skips scoring and lists the shortest
//! matching chunks instead.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::chunk::{tokenize, ChunkIndex};
use crate::models::{IndexedChunk, ResultRecord};

/// Default number of results.
pub const DEFAULT_LIMIT: usize = 8;

/// All inputs for a single retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrieveRequest {
    /// Free-text query. Blank means "list shortest chunks".
    pub query: String,
    /// Maximum number of results.
    pub limit: usize,
    /// Allowed subjects (case-insensitive). Empty = any.
    pub subjects: Vec<String>,
    /// Allowed grade contexts (case-insensitive). Empty = any.
    pub grades: Vec<String>,
    /// Allowed content types (case-insensitive). Empty = any.
    pub content_types: Vec<String>,
    /// Results must score strictly above this.
    pub min_score: f64,
}

impl Default for RetrieveRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            limit: DEFAULT_LIMIT,
            subjects: Vec::new(),
            grades: Vec::new(),
            content_types: Vec::new(),
            min_score: 0.0,
        }
    }
}

impl RetrieveRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn subjects<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subjects = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn grades<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.grades = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn content_types<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content_types = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }
}

/// Lowercased, trimmed facet values; an empty filter accepts everything.
///
/// Only values that are empty as given are dropped. A whitespace-only value
/// trims to `""` and selects chunks with no value for that facet.
struct FacetFilter {
    subjects: HashSet<String>,
    grades: HashSet<String>,
    content_types: HashSet<String>,
}

impl FacetFilter {
    fn new(req: &RetrieveRequest) -> Self {
        Self {
            subjects: normalize_values(&req.subjects),
            grades: normalize_values(&req.grades),
            content_types: normalize_values(&req.content_types),
        }
    }

    fn accepts(&self, chunk: &IndexedChunk) -> bool {
        allowed(&self.subjects, &chunk.subject)
            && allowed(&self.grades, &chunk.grade_context)
            && allowed(&self.content_types, &chunk.content_type)
    }
}

fn normalize_values(values: &[String]) -> HashSet<String> {
    values
        .iter()
        .filter(|v| !v.is_empty())
        .map(|v| v.trim().to_lowercase())
        .collect()
}

fn allowed(set: &HashSet<String>, value: &str) -> bool {
    set.is_empty() || set.contains(&value.to_lowercase())
}

/// Score one chunk against already-tokenized query terms.
///
/// Returns `0.0` when the query has no tokens or none of them occur in the
/// chunk.
pub fn score_chunk(query_tokens: &[String], chunk: &IndexedChunk) -> f64 {
    if query_tokens.is_empty() {
        return 0.0;
    }

    let tf = &chunk.term_frequency;
    let hits: u64 = query_tokens
        .iter()
        .map(|t| tf.get(t).copied().unwrap_or(0) as u64)
        .sum();
    if hits == 0 {
        return 0.0;
    }

    let distinct: HashSet<&str> = query_tokens.iter().map(String::as_str).collect();
    let present = distinct.iter().filter(|t| tf.contains_key(**t)).count();
    let coverage = present as f64 / distinct.len() as f64;

    let base = hits as f64 / (0.5 + 0.5 * chunk.length as f64);
    base * (1.0 + coverage)
}

/// Round to 6 decimal places.
///
/// Goes through the exact decimal expansion (`{:.6}`) rather than scaling,
/// so values sitting on a half-ulp boundary round the way their true binary
/// value dictates: `5e-7` is stored just below one half and becomes `0.0`.
pub fn round_score(score: f64) -> f64 {
    format!("{:.6}", score).parse().unwrap_or(score)
}

/// Run a retrieval against an index snapshot.
pub fn retrieve(index: &ChunkIndex, req: &RetrieveRequest) -> Vec<ResultRecord> {
    let filter = FacetFilter::new(req);
    let mut rows: Vec<&IndexedChunk> = index
        .chunks()
        .iter()
        .filter(|c| filter.accepts(c))
        .collect();

    if req.query.trim().is_empty() {
        rows.sort_by_cached_key(|c| (c.text.chars().count(), c.ordinal));
        return rows
            .into_iter()
            .take(req.limit)
            .map(|c| ResultRecord::from_chunk(c, None))
            .collect();
    }

    let query_tokens = tokenize(&req.query);
    let mut scored: Vec<(f64, &IndexedChunk)> = rows
        .into_iter()
        .map(|c| (score_chunk(&query_tokens, c), c))
        .filter(|(s, _)| *s > req.min_score)
        .collect();

    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then(a.1.ordinal.cmp(&b.1.ordinal))
    });

    scored
        .into_iter()
        .take(req.limit)
        .map(|(s, c)| ResultRecord::from_chunk(c, Some(round_score(s))))
        .collect()
}
