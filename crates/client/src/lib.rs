//! Client code for eduform.
//!
//! This crate talks to the institution engine API and orchestrates the
//! reference data, search and recommendation flows on top of the core
//! cache, index and aggregation types.

pub mod api;
pub mod catalog;
pub mod fetch;
pub mod loader;
pub mod recommend;
pub mod sequence;
pub mod suggest;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{EngineClient, InstitutionQuery, RecommendationRequest, RecommendationResponse};
pub use catalog::{IndexHandle, SearchCatalog};
pub use fetch::{ApiRequest, ApiResponse, FetchError, HttpConfig, HttpTransport, ResilientFetcher, RetryPolicy, Transport};
pub use loader::{Collection, CollectionData, LoadError, LoadState, ReferenceDataLoader};
pub use recommend::{RecommendError, RecommendationForm, RecommendationResults, Recommender};
pub use sequence::{LatestOnly, Ticket};
pub use suggest::{Phase, SubmitOutcome, SuggestionController, SuggestionSettings, SuggestionState};
