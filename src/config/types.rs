//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/wooseo/) and project (.wooseo/) level configuration.

use serde::{Deserialize, Serialize};

use crate::ai::provider::ProviderConfig;
use crate::constants::retry as retry_constants;
use crate::types::{Result, SeoError};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Provider selection, credentials, models and prompt template
    pub llm: ProviderConfig,

    /// Retry policy for generation requests
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: ProviderConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `SeoError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(SeoError::Config(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }

        if !self.retry.factor.is_finite() || self.retry.factor < 1.0 {
            return Err(SeoError::Config(format!(
                "retry.factor must be a finite number >= 1.0, got {}",
                self.retry.factor
            )));
        }

        for (name, settings) in [("gemini", &self.llm.gemini), ("openai", &self.llm.openai)] {
            if settings.timeout_secs == 0 {
                return Err(SeoError::Config(format!(
                    "{}.timeout_secs must be greater than 0",
                    name
                )));
            }
            if settings.model.trim().is_empty() {
                return Err(SeoError::Config(format!("{}.model must not be empty", name)));
            }
        }

        Ok(())
    }
}

// =============================================================================
// Retry Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first call
    pub max_attempts: u32,

    /// Delay after the first failure, in milliseconds
    pub base_delay_ms: u64,

    /// Multiplier applied to the delay after each failure
    pub factor: f32,

    /// Cap on any single delay, in milliseconds
    pub max_delay_ms: u64,

    /// Stop immediately on 401/403 instead of retrying
    pub fail_fast_on_auth: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: retry_constants::MAX_ATTEMPTS,
            base_delay_ms: retry_constants::BASE_DELAY_MS,
            factor: retry_constants::BACKOFF_FACTOR,
            max_delay_ms: retry_constants::MAX_DELAY_MS,
            fail_fast_on_auth: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay_ms, 1000);
        assert_eq!(config.retry.max_delay_ms, 30_000);
        assert!(!config.retry.fail_fast_on_auth);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        assert!(matches!(config.validate(), Err(SeoError::Config(_))));
    }

    #[test]
    fn test_non_finite_factor_rejected() {
        for factor in [f32::NAN, f32::INFINITY, 0.5] {
            let mut config = Config::default();
            config.retry.factor = factor;
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("retry.factor"), "{factor}: {err}");
        }

        let mut config = Config::default();
        config.retry.factor = 1e30;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_model_rejected() {
        let mut config = Config::default();
        config.llm.openai.model = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("openai.model"));
    }

    #[test]
    fn test_api_keys_are_not_serialized() {
        let mut config = Config::default();
        config.llm.gemini.api_key = Some("AIza-secret".to_string());
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(!text.contains("AIza-secret"));
        assert!(!format!("{:?}", config).contains("AIza-secret"));
    }
}
