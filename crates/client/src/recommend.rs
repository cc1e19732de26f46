//! Interest-based program recommendations.
//!
//! A submission fetches the offerings that pass the form filters, asks the
//! recommendation service to choose among them, resolves the chosen offering
//! ids against the cached directory and groups the result by program.

use std::collections::HashSet;
use std::sync::Arc;

use eduform_core::results::{group_by_program, paginate, select_offerings};
use eduform_core::{GroupedProgram, Page, ProgramRef};

use crate::api::{EngineClient, InstitutionQuery, RecommendationRequest, validate_interests};
use crate::fetch::FetchError;
use crate::loader::{LoadError, ReferenceDataLoader};
use crate::sequence::{LatestOnly, Ticket};

/// What the user filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationForm {
    pub interests: String,
    pub region: Option<String>,
    pub locality: Option<String>,
    pub founder_type: Option<String>,
    pub entrance_exam: Option<bool>,
}

impl RecommendationForm {
    fn query(&self) -> InstitutionQuery {
        InstitutionQuery {
            region: self.region.clone(),
            locality: self.locality.clone(),
            founder_type: self.founder_type.clone(),
            entrance_exam: self.entrance_exam,
        }
    }
}

/// Grouped recommendation outcome.
///
/// No groups with an explanation is a legitimate answer, not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationResults {
    pub explanation: String,
    pub groups: Vec<GroupedProgram>,
    /// Recommended offerings missing from the directory.
    pub unresolved: usize,
}

impl RecommendationResults {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Program groups on page `page`.
    pub fn page(&self, page: usize, page_size: usize) -> Page<GroupedProgram> {
        paginate(&self.groups, page, page_size)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Load(#[from] LoadError),
}

impl RecommendError {
    /// Whether trying again may help.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_transient(),
            Self::Load(e) => e.retryable,
        }
    }
}

/// Runs recommendation submissions; newer submissions win.
#[derive(Clone)]
pub struct Recommender {
    api: EngineClient,
    loader: ReferenceDataLoader,
    latest: LatestOnly<Arc<RecommendationResults>>,
}

impl Recommender {
    pub fn new(loader: ReferenceDataLoader) -> Self {
        Self { api: loader.api().clone(), loader, latest: LatestOnly::new() }
    }

    /// Results of the newest submission that finished.
    pub fn latest(&self) -> Option<Arc<RecommendationResults>> {
        self.latest.current()
    }

    pub fn handle(&self) -> LatestOnly<Arc<RecommendationResults>> {
        self.latest.clone()
    }

    /// Submit `form`; results are published only if no newer submission finished first.
    pub async fn submit(&self, form: &RecommendationForm) -> Result<(Ticket, Arc<RecommendationResults>), RecommendError> {
        let ticket = self.latest.issue();
        let results = Arc::new(self.recommend(form).await?);
        self.latest.complete(ticket, Arc::clone(&results));
        Ok((ticket, results))
    }

    /// One full recommendation round trip.
    pub async fn recommend(&self, form: &RecommendationForm) -> Result<RecommendationResults, RecommendError> {
        validate_interests(&form.interests)?;

        let offerings = self.api.institutions(&form.query()).await?;
        let mut seen = HashSet::new();
        let programs: Vec<ProgramRef> = offerings
            .iter()
            .filter(|r| !r.program_offering_id.is_empty() && seen.insert(r.program_offering_id.clone()))
            .map(|r| r.program_ref())
            .collect();

        let request = RecommendationRequest::new(form.interests.trim(), programs);
        let response = self.api.recommend(&request).await?;

        let directory = self.loader.institutions().await?;
        let selected = select_offerings(&directory, &response.programs);
        let unresolved = response.programs.len().saturating_sub(selected.len());
        let groups = group_by_program(selected);

        tracing::info!(
            candidates = request.programs.len(),
            recommended = response.programs.len(),
            groups = groups.len(),
            unresolved,
            "recommendation resolved"
        );

        Ok(RecommendationResults { explanation: response.explanation, groups, unresolved })
    }
}
