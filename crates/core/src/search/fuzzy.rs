//! Edit-distance fuzzy index over institution names and localities.
//!
//! Each record is scored per field and keeps its best field score:
//!
//! | match on the normalized field | score |
//! | --- | --- |
//! | raw field equal to the query, ignoring case and outer spaces | 0 |
//! | equal to the query | 0.01 |
//! | starts with the query | 0.05 – 0.20 |
//! | contains the query | 0.10 – 0.30 |
//! | anything else | `1 - normalized_levenshtein`, floored at 0.05 |
//!
//! Partial matches score better the more of the field they cover. The
//! Levenshtein pass compares the query against the whole field, every run of
//! as many tokens as the query has, and the prefixes of those candidates, so
//! both typos and unfinished words are tolerated. Locality scores are damped
//! to `0.2 + 0.8 * s` because the name is the primary key users type.

use std::sync::Arc;

use super::normalize::normalize_text;
use super::{SearchIndex, Suggestion};
use crate::model::InstitutionRecord;

/// Default acceptance threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.4;

const FUZZY_FLOOR: f64 = 0.05;
const NORMALIZED_EXACT: f64 = 0.01;
const PREFIX_PENALTY: f64 = 0.05;
const LOCALITY_BASE: f64 = 0.2;

#[derive(Debug, Clone)]
struct IndexedField {
    folded: String,
    text: String,
    tokens: Vec<String>,
    len: usize,
}

impl IndexedField {
    fn new(raw: &str) -> Self {
        let folded = raw.trim().to_lowercase();
        let text = normalize_text(raw);
        let tokens = text.split(' ').filter(|t| !t.is_empty()).map(str::to_string).collect();
        let len = text.chars().count();
        Self { folded, text, tokens, len }
    }
}

#[derive(Debug, Clone)]
struct IndexEntry {
    name: IndexedField,
    locality: IndexedField,
}

/// Immutable fuzzy index over one snapshot of the directory.
#[derive(Debug, Clone)]
pub struct FuzzySearchIndex {
    records: Arc<Vec<InstitutionRecord>>,
    entries: Vec<IndexEntry>,
    threshold: f64,
}

impl FuzzySearchIndex {
    /// Index `records` with the default threshold.
    pub fn build(records: impl Into<Arc<Vec<InstitutionRecord>>>) -> Self {
        let records = records.into();
        let entries = records
            .iter()
            .map(|r| IndexEntry { name: IndexedField::new(&r.name), locality: IndexedField::new(&r.locality) })
            .collect();

        tracing::debug!(records = records.len(), "built fuzzy search index");
        Self { records, entries, threshold: DEFAULT_THRESHOLD }
    }

    /// Replace the acceptance threshold, clamped to `[0, 1]`.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// The snapshot this index was built from.
    pub fn records(&self) -> &Arc<Vec<InstitutionRecord>> {
        &self.records
    }

    fn score_entry(query: &IndexedField, entry: &IndexEntry) -> f64 {
        let name = field_score(query, &entry.name);
        let locality = LOCALITY_BASE + (1.0 - LOCALITY_BASE) * field_score(query, &entry.locality);
        name.min(locality)
    }
}

impl SearchIndex for FuzzySearchIndex {
    fn query(&self, text: &str, limit: usize) -> Vec<Suggestion> {
        let query = IndexedField::new(text);
        if query.text.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut matches: Vec<(usize, f64)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (position, Self::score_entry(&query, entry)))
            .filter(|(_, score)| *score <= self.threshold)
            .collect();

        // Stable: equal scores keep collection order.
        matches.sort_by(|a, b| a.1.total_cmp(&b.1));
        matches.truncate(limit);

        tracing::debug!(query = %query.text, matches = matches.len(), "fuzzy query");

        matches
            .into_iter()
            .map(|(position, score)| Suggestion { record: self.records[position].clone(), score, position })
            .collect()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

fn field_score(query: &IndexedField, field: &IndexedField) -> f64 {
    if field.text.is_empty() {
        return 1.0;
    }
    if field.folded == query.folded {
        return 0.0;
    }
    if field.text == query.text {
        return NORMALIZED_EXACT;
    }

    let coverage = (query.len as f64 / field.len as f64).min(1.0);
    if field.text.starts_with(&query.text) {
        return 0.05 + 0.15 * (1.0 - coverage);
    }
    if field.text.contains(&query.text) {
        return 0.10 + 0.20 * (1.0 - coverage);
    }

    let mut best = 1.0 - strsim::normalized_levenshtein(&query.text, &field.text);

    let width = query.tokens.len().max(1);
    if field.tokens.len() >= width {
        for window in field.tokens.windows(width) {
            let candidate = window.join(" ");
            best = best.min(1.0 - strsim::normalized_levenshtein(&query.text, &candidate));
            best = best.min(prefix_score(query, &candidate));
        }
    }
    best = best.min(prefix_score(query, &field.text));

    best.clamp(FUZZY_FLOOR, 1.0)
}

/// Compare the query against the candidate's leading `len` and `len + 1` chars.
fn prefix_score(query: &IndexedField, candidate: &str) -> f64 {
    let mut best = 1.0;
    for extra in 0..=1 {
        let take = query.len + extra;
        let prefix: String = candidate.chars().take(take).collect();
        if prefix.chars().count() < take && extra > 0 {
            break;
        }
        let sim = strsim::normalized_levenshtein(&query.text, &prefix);
        best = f64::min(best, 1.0 - sim + PREFIX_PENALTY);
    }
    best
}
