//! Core types and shared functionality for eduform.
//!
//! This crate provides:
//! - Timed reference-data cache with SQLite backend
//! - Institution model and wire-field parsing
//! - Fuzzy search index over the institution directory
//! - Result grouping and pagination
//! - Unified error types and layered configuration

pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod results;
pub mod search;

pub use cache::{CacheDb, CacheEntry, Clock, DEFAULT_TTL, EntryMeta, ManualClock, SystemClock, TimedCache};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use model::{InstitutionRecord, ProgramRef};
pub use results::{GroupedProgram, InstitutionFilter, Page, PagedView};
pub use search::{FuzzySearchIndex, SearchIndex, Suggestion};
