//! Settings for the directory client: endpoint, credentials, cache location
//! and the tuning knobs of search, retry and paging.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Client settings. `EDUFORM_*` variables override the TOML file named by
/// `EDUFORM_CONFIG_FILE`, which overrides the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the institution engine API.
    ///
    /// Set via EDUFORM_API_BASE_URL environment variable.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Bearer token sent with every API request.
    ///
    /// Set via EDUFORM_API_TOKEN environment variable.
    /// Required only when a network call is made.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Cache file holding the reference collections.
    ///
    /// Set via EDUFORM_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Sent with every API request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-attempt HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Reference collection time-to-live in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Maximum attempts per request, first try included.
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,

    /// Fixed delay between attempts in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Keystroke quiet period before a suggestion query, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Inline suggestion count.
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,

    /// Result count for a submitted search.
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Highest fuzzy score accepted as a match, in `[0, 1]`.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,

    /// Program groups per page in the recommendation view.
    #[serde(default = "default_grouped_page_size")]
    pub grouped_page_size: usize,

    /// Rows per page in the flat institution table.
    #[serde(default = "default_table_page_size")]
    pub table_page_size: usize,
}

fn default_api_base_url() -> String {
    "https://engine.eduformacije.com/api/v1".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./eduform-cache.sqlite")
}

fn default_user_agent() -> String {
    "eduform/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_cache_ttl_secs() -> u64 {
    86_400 // 24h
}

fn default_retry_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_suggestion_limit() -> usize {
    5
}

fn default_search_limit() -> usize {
    50
}

fn default_fuzzy_threshold() -> f64 {
    0.4
}

fn default_grouped_page_size() -> usize {
    3
}

fn default_table_page_size() -> usize {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_token: None,
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            debounce_ms: default_debounce_ms(),
            suggestion_limit: default_suggestion_limit(),
            search_limit: default_search_limit(),
            fuzzy_threshold: default_fuzzy_threshold(),
            grouped_page_size: default_grouped_page_size(),
            table_page_size: default_table_page_size(),
        }
    }
}

impl AppConfig {
    /// Per-request HTTP timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Merge defaults, the optional TOML file and the environment, then validate.
    ///
    /// # Errors
    ///
    /// `ConfigError::LoadFailed` when a source cannot be read or parsed, or
    /// the validation error for the merged result.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment()
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("EDUFORM_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("EDUFORM_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }

    /// Check if the API token is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the token is not set.
    pub fn require_api_token(&self) -> Result<&str, ConfigError> {
        self.api_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "api_token".into(),
                hint: "Set EDUFORM_API_TOKEN environment variable".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./eduform-cache.sqlite"));
        assert_eq!(config.user_agent, "eduform/0.1");
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.cache_ttl_secs, 86_400);
        assert_eq!(config.retry_max_attempts, 3);
        assert_eq!(config.retry_delay_ms, 1_000);
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.suggestion_limit, 5);
        assert_eq!(config.search_limit, 50);
        assert_eq!(config.grouped_page_size, 3);
        assert_eq!(config.table_page_size, 10);
        assert!((config.fuzzy_threshold - 0.4).abs() < f64::EPSILON);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_durations() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
        assert_eq!(config.cache_ttl(), Duration::from_secs(24 * 60 * 60));
        assert_eq!(config.retry_delay(), Duration::from_secs(1));
        assert_eq!(config.debounce(), Duration::from_millis(300));
    }

    #[test]
    fn test_require_api_token_missing() {
        let config = AppConfig::default();
        assert!(matches!(config.require_api_token(), Err(ConfigError::Missing { .. })));

        let blank = AppConfig { api_token: Some("  ".into()), ..Default::default() };
        assert!(matches!(blank.require_api_token(), Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_require_api_token_present() {
        let config = AppConfig { api_token: Some("test-token".into()), ..Default::default() };
        assert_eq!(config.require_api_token().unwrap(), "test-token");
    }

    #[test]
    fn test_load_layers_file_and_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("eduform.toml", "table_page_size = 25\nretry_delay_ms = 250\n")?;
            jail.set_env("EDUFORM_CONFIG_FILE", "eduform.toml");
            jail.set_env("EDUFORM_TABLE_PAGE_SIZE", "20");
            jail.set_env("EDUFORM_API_TOKEN", "secret");

            let config = AppConfig::load().expect("config should load");
            assert_eq!(config.table_page_size, 20);
            assert_eq!(config.retry_delay_ms, 250);
            assert_eq!(config.api_token.as_deref(), Some("secret"));
            assert_eq!(config.grouped_page_size, 3);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("EDUFORM_GROUPED_PAGE_SIZE", "0");
            assert!(matches!(AppConfig::load(), Err(ConfigError::Invalid { .. })));
            Ok(())
        });
    }
}
