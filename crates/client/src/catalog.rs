//! Owner of the current search index snapshot.

use std::sync::Arc;

use eduform_core::search::DEFAULT_THRESHOLD;
use eduform_core::{FuzzySearchIndex, InstitutionFilter, SearchIndex};

use crate::loader::{Collection, CollectionData, LoadError, ReferenceDataLoader};
use crate::sequence::LatestOnly;

/// Shared handle to an index snapshot.
pub type IndexHandle = LatestOnly<Arc<dyn SearchIndex>>;

/// Builds search indexes from the loaded directory and publishes the newest.
///
/// Rebuilds may overlap; only the most recently started one is published.
#[derive(Clone)]
pub struct SearchCatalog {
    loader: ReferenceDataLoader,
    threshold: f64,
    index: IndexHandle,
}

impl SearchCatalog {
    pub fn new(loader: ReferenceDataLoader) -> Self {
        Self { loader, threshold: DEFAULT_THRESHOLD, index: LatestOnly::new() }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Handle for readers such as a suggestion controller.
    pub fn handle(&self) -> IndexHandle {
        self.index.clone()
    }

    pub fn current(&self) -> Option<Arc<dyn SearchIndex>> {
        self.index.current()
    }

    /// Rebuild over the directory records that pass `filter`.
    ///
    /// Returns whether the new index was published; `false` means a newer
    /// rebuild finished first.
    pub async fn rebuild(&self, filter: &InstitutionFilter) -> Result<bool, LoadError> {
        self.build(filter, false).await
    }

    /// Like [`rebuild`](Self::rebuild) but reloads the directory from the network first.
    pub async fn refresh(&self, filter: &InstitutionFilter) -> Result<bool, LoadError> {
        self.build(filter, true).await
    }

    async fn build(&self, filter: &InstitutionFilter, force: bool) -> Result<bool, LoadError> {
        let ticket = self.index.issue();
        let directory = if force {
            match self.loader.refresh(Collection::Institutions).await? {
                CollectionData::Institutions(records) => records,
                CollectionData::Names(_) => return Err(LoadError::unexpected(&Collection::Institutions)),
            }
        } else {
            self.loader.institutions().await?
        };

        let index = if filter.is_empty() {
            FuzzySearchIndex::build(directory)
        } else {
            FuzzySearchIndex::build(filter.apply(&directory).cloned().collect::<Vec<_>>())
        }
        .with_threshold(self.threshold);

        let size = index.len();
        let published = self.index.complete(ticket, Arc::new(index));
        if published {
            tracing::info!(records = size, force, "search index rebuilt");
        } else {
            tracing::debug!(records = size, "discarding index from superseded rebuild");
        }
        Ok(published)
    }
}
