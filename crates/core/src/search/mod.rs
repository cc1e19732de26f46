//! Ranked approximate search over the institution directory.
//!
//! Any index implementation must honour the same scoring contract:
//! scores lie in `[0, 1]`, lower is better, an empty query yields nothing,
//! and equal scores keep the original collection order.

pub mod fuzzy;
pub mod normalize;

use crate::model::InstitutionRecord;

pub use fuzzy::{DEFAULT_THRESHOLD, FuzzySearchIndex};
pub use normalize::normalize_text;

/// A ranked match.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub record: InstitutionRecord,
    /// Match quality in `[0, 1]`; 0 is an exact match.
    pub score: f64,
    /// Position of the record in the indexed snapshot.
    pub position: usize,
}

/// A read-only, rebuild-only search index.
pub trait SearchIndex: Send + Sync {
    /// Matches for `text`, best first, at most `limit` of them.
    fn query(&self, text: &str, limit: usize) -> Vec<Suggestion>;

    /// Number of indexed records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
