//! Command-line arguments.

use clap::{Args, Parser, Subcommand};

use eduform_client::RecommendationForm;
use eduform_core::InstitutionFilter;

#[derive(Parser, Debug)]
#[command(name = "eduform", version, about = "Browse and search the educational institution directory")]
/// Command-line arguments accepted by the `eduform` binary.
pub(crate) struct Cli {
    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub(crate) json: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// List regions.
    Regions(RefreshArgs),
    /// List cities, optionally within one region.
    Cities {
        #[arg(long, value_name = "REGION")]
        region: Option<String>,
        #[command(flatten)]
        refresh: RefreshArgs,
    },
    /// List founder types.
    FounderTypes(RefreshArgs),
    /// Fuzzy search institutions by name or locality.
    Search {
        /// Text to search for.
        text: String,
        /// Maximum number of matches (default: search_limit from config).
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        refresh: RefreshArgs,
    },
    /// Paged table of institutions and their programs.
    Table {
        /// Free-text filter on name, locality or program.
        #[arg(long, value_name = "TEXT")]
        text: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value_t = 1, value_name = "N")]
        page: usize,
        #[command(flatten)]
        refresh: RefreshArgs,
    },
    /// Recommend programs for a description of your interests.
    Recommend {
        /// Interests, up to 200 characters.
        #[arg(long, value_name = "TEXT")]
        interests: String,
        #[command(flatten)]
        filters: FilterArgs,
        /// Only programs with (true) or without (false) an entrance exam.
        #[arg(long, value_name = "BOOL")]
        entrance_exam: Option<bool>,
        #[arg(long, default_value_t = 1, value_name = "N")]
        page: usize,
        #[command(flatten)]
        refresh: RefreshArgs,
    },
    /// Inspect or maintain the local cache.
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Subcommand, Debug)]
pub(crate) enum CacheCommand {
    /// List cached collections.
    List,
    /// Delete expired entries and optionally cap the entry count.
    Purge {
        #[arg(long, value_name = "N")]
        max_entries: Option<usize>,
    },
    /// Drop one cached collection by key, e.g. `cachedCities:Zadarska`.
    Remove { key: String },
    /// Delete every cached entry.
    Clear,
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct RefreshArgs {
    /// Bypass the cache and fetch fresh data.
    #[arg(long)]
    pub(crate) refresh: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct FilterArgs {
    #[arg(long, value_name = "REGION")]
    pub(crate) region: Option<String>,
    #[arg(long, value_name = "LOCALITY")]
    pub(crate) locality: Option<String>,
    #[arg(long, value_name = "TYPE")]
    pub(crate) founder_type: Option<String>,
}

impl FilterArgs {
    pub(crate) fn to_filter(&self, text: Option<String>) -> InstitutionFilter {
        InstitutionFilter {
            text,
            region: self.region.clone(),
            locality: self.locality.clone(),
            founder_type: self.founder_type.clone(),
        }
    }

    pub(crate) fn to_form(&self, interests: &str, entrance_exam: Option<bool>) -> RecommendationForm {
        RecommendationForm {
            interests: interests.to_string(),
            region: self.region.clone(),
            locality: self.locality.clone(),
            founder_type: self.founder_type.clone(),
            entrance_exam,
        }
    }
}
