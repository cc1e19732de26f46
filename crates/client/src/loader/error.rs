//! Collection load failures.

use crate::fetch::FetchError;

use super::Collection;

/// A reference collection could not be loaded.
///
/// Carries a human-readable message; `retryable` tells a front end whether
/// offering "try again" makes sense.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not load {collection}: {message}")]
pub struct LoadError {
    pub collection: String,
    pub message: String,
    pub retryable: bool,
}

impl LoadError {
    pub(crate) fn from_fetch(collection: &Collection, err: FetchError) -> Self {
        Self { collection: collection.to_string(), retryable: err.is_transient(), message: err.to_string() }
    }

    pub(crate) fn unexpected(collection: &Collection) -> Self {
        Self {
            collection: collection.to_string(),
            message: "loader returned a payload of the wrong kind".to_string(),
            retryable: false,
        }
    }
}
