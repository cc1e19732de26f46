//! Typed client for the institution engine API.
//!
//! ### Endpoints
//!
//! - `GET /regions`, `GET /cities[?region=]`, `GET /founder-types`: JSON string arrays
//! - `GET /institutions?region=&locality=&founderType=&entranceExam=`: directory objects
//! - `POST /institutions/recommendations`: `{ interests, programs }` in, `{ explanation, programs }` out
//!
//! Every call goes through one [`ResilientFetcher`].

pub mod request;
pub mod response;

pub use request::{InstitutionQuery, MAX_INTERESTS_CHARS, RecommendationRequest, validate_interests};
pub use response::{InstitutionWire, RecommendationResponse};

use std::sync::Arc;

use eduform_core::{AppConfig, InstitutionRecord};

use crate::fetch::{ApiRequest, FetchError, HttpConfig, HttpTransport, ResilientFetcher, RetryPolicy, Transport};

const REGIONS_PATH: &str = "/regions";
const CITIES_PATH: &str = "/cities";
const FOUNDER_TYPES_PATH: &str = "/founder-types";
const INSTITUTIONS_PATH: &str = "/institutions";
const RECOMMENDATIONS_PATH: &str = "/institutions/recommendations";

/// Engine API client.
#[derive(Debug, Clone)]
pub struct EngineClient {
    fetcher: ResilientFetcher,
}

impl EngineClient {
    pub fn new(fetcher: ResilientFetcher) -> Self {
        Self { fetcher }
    }

    /// Wire a client over an arbitrary transport.
    pub fn with_transport(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self::new(ResilientFetcher::new(transport, policy))
    }

    /// Production client from application configuration.
    ///
    /// Fails when no API token is configured.
    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        let transport = HttpTransport::new(HttpConfig::from_app(config)?)?;
        Ok(Self::with_transport(Arc::new(transport), RetryPolicy::from_app(config)))
    }

    pub async fn regions(&self) -> Result<Vec<String>, FetchError> {
        self.names(ApiRequest::get(REGIONS_PATH)).await
    }

    /// Cities, optionally restricted to one region.
    pub async fn cities(&self, region: Option<&str>) -> Result<Vec<String>, FetchError> {
        let mut request = ApiRequest::get(CITIES_PATH);
        if let Some(region) = region {
            request = request.with_query("region", region);
        }
        self.names(request).await
    }

    pub async fn founder_types(&self) -> Result<Vec<String>, FetchError> {
        self.names(ApiRequest::get(FOUNDER_TYPES_PATH)).await
    }

    /// Directory records matching `query`.
    pub async fn institutions(&self, query: &InstitutionQuery) -> Result<Vec<InstitutionRecord>, FetchError> {
        let response = self.fetcher.request(&query.to_request(INSTITUTIONS_PATH)).await?;
        let wire: Vec<InstitutionWire> = response.json()?;

        tracing::debug!(count = wire.len(), "parsed institution directory");
        Ok(wire.into_iter().map(InstitutionRecord::from).collect())
    }

    /// Ask the recommendation service to pick programs for `request.interests`.
    pub async fn recommend(&self, request: &RecommendationRequest) -> Result<RecommendationResponse, FetchError> {
        request.validate()?;

        let response = self.fetcher.request(&ApiRequest::post_json(RECOMMENDATIONS_PATH, request)?).await?;
        let parsed: RecommendationResponse = response.json()?;

        tracing::debug!(
            submitted = request.programs.len(),
            recommended = parsed.programs.len(),
            "recommendation received"
        );
        Ok(parsed)
    }

    async fn names(&self, request: ApiRequest) -> Result<Vec<String>, FetchError> {
        let response = self.fetcher.request(&request).await?;
        let names: Vec<String> = response.json()?;
        Ok(names.into_iter().map(|n| n.trim().to_string()).filter(|n| !n.is_empty()).collect())
    }
}
