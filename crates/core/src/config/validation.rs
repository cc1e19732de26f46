//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `api_base_url` or `user_agent` is empty
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `cache_ttl_secs`, `retry_max_attempts` or either page size is 0
    /// - `retry_max_attempts` exceeds 10
    /// - `fuzzy_threshold` is outside `[0, 1]`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(invalid("api_base_url", "must not be empty"));
        }
        if url::Url::parse(&self.api_base_url).is_err() {
            return Err(invalid("api_base_url", "must be an absolute URL"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.cache_ttl_secs == 0 {
            return Err(invalid("cache_ttl_secs", "must be greater than 0"));
        }

        if self.retry_max_attempts == 0 {
            return Err(invalid("retry_max_attempts", "must be at least 1"));
        }
        if self.retry_max_attempts > 10 {
            return Err(invalid("retry_max_attempts", "must not exceed 10"));
        }

        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(invalid("fuzzy_threshold", "must be within [0, 1]"));
        }

        if self.grouped_page_size == 0 {
            return Err(invalid("grouped_page_size", "must be greater than 0"));
        }
        if self.table_page_size == 0 {
            return Err(invalid("table_page_size", "must be greater than 0"));
        }

        if self.suggestion_limit > self.search_limit {
            tracing::warn!(
                suggestion_limit = self.suggestion_limit,
                search_limit = self.search_limit,
                "suggestion_limit exceeds search_limit; inline lists will be longer than submitted searches"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_base_url() {
        let config = AppConfig { api_base_url: " ".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "api_base_url"));
    }

    #[test]
    fn test_validate_relative_base_url() {
        let config = AppConfig { api_base_url: "api/v1".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "api_base_url"));
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));

        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_zero_attempts() {
        let config = AppConfig { retry_max_attempts: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "retry_max_attempts"));
    }

    #[test]
    fn test_validate_threshold_range() {
        let config = AppConfig { fuzzy_threshold: 1.5, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "fuzzy_threshold"));

        let config = AppConfig { fuzzy_threshold: 0.0, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_page_sizes() {
        let config = AppConfig { grouped_page_size: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "grouped_page_size"));

        let config = AppConfig { table_page_size: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "table_page_size"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig {
            timeout_ms: 100,
            cache_ttl_secs: 1,
            retry_max_attempts: 1,
            grouped_page_size: 1,
            table_page_size: 1,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
