//! Engine API request types and validation.

use serde::Serialize;

use eduform_core::ProgramRef;

use crate::fetch::{ApiRequest, FetchError};

/// Longest accepted interests text, in characters.
pub const MAX_INTERESTS_CHARS: usize = 200;

/// Filters for the directory endpoint. Unset or blank filters are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstitutionQuery {
    pub region: Option<String>,
    pub locality: Option<String>,
    pub founder_type: Option<String>,
    /// Restrict to programs with (true) or without (false) an entrance exam.
    pub entrance_exam: Option<bool>,
}

impl InstitutionQuery {
    pub(crate) fn to_request(&self, path: &str) -> ApiRequest {
        let mut request = ApiRequest::get(path);
        if let Some(region) = &self.region {
            request = request.with_query("region", region);
        }
        if let Some(locality) = &self.locality {
            request = request.with_query("locality", locality);
        }
        if let Some(founder_type) = &self.founder_type {
            request = request.with_query("founderType", founder_type);
        }
        if let Some(exam) = self.entrance_exam {
            request = request.with_query("entranceExam", if exam { "true" } else { "false" });
        }
        request
    }
}

/// Body of the recommendation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationRequest {
    pub interests: String,
    pub programs: Vec<ProgramRef>,
}

impl RecommendationRequest {
    pub fn new(interests: impl Into<String>, programs: Vec<ProgramRef>) -> Self {
        Self { interests: interests.into(), programs }
    }

    /// Validate the request before it goes out.
    pub fn validate(&self) -> Result<(), FetchError> {
        validate_interests(&self.interests)
    }
}

/// Interests must be non-blank and at most [`MAX_INTERESTS_CHARS`] characters.
pub fn validate_interests(interests: &str) -> Result<(), FetchError> {
    if interests.trim().is_empty() {
        return Err(FetchError::InvalidRequest("interests cannot be empty".to_string()));
    }

    let count = interests.chars().count();
    if count > MAX_INTERESTS_CHARS {
        return Err(FetchError::InvalidRequest(format!(
            "interests too long: {count} chars (max {MAX_INTERESTS_CHARS})"
        )));
    }

    Ok(())
}
