//! LLM Provider Abstraction
//!
//! Defines the LlmProvider trait for structured SEO generation.
//! Both backends return JSON as text, which is parsed a second time and
//! validated against the seven-key [`SeoResult`] contract.
//!
//! ## Modules
//!
//! - `gemini`: query-key `generateContent` endpoint with a response schema
//! - `openai`: bearer-auth chat completions in JSON-object mode

mod gemini;
mod openai;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::constants::{gemini as gemini_defaults, network, openai as openai_defaults};
use crate::types::{Result, SeoError, SeoResult};

// =============================================================================
// LLM Response with Usage Metrics
// =============================================================================

/// Complete provider response: the validated payload plus usage and timing
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Validated SEO payload
    pub result: SeoResult,
    /// Token usage metrics
    pub usage: TokenUsage,
    /// Response timing
    pub timing: ResponseTiming,
    /// Provider and model info
    pub metadata: ResponseMetadata,
}

/// Token usage metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens (prompt)
    pub input_tokens: u32,
    /// Output tokens (response)
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Total tokens used (input + output)
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }

    /// Create from OpenAI-style usage response
    pub fn from_openai(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            input_tokens: prompt_tokens,
            output_tokens: completion_tokens,
        }
    }

    /// Create from Gemini `usageMetadata`
    pub fn from_gemini(prompt_token_count: u32, candidates_token_count: u32) -> Self {
        Self {
            input_tokens: prompt_token_count,
            output_tokens: candidates_token_count,
        }
    }
}

/// Response timing metrics
#[derive(Debug, Clone, Default)]
pub struct ResponseTiming {
    /// Total response time in milliseconds (wall clock)
    pub total_ms: u64,
}

impl ResponseTiming {
    pub fn from_duration(duration: std::time::Duration) -> Self {
        Self {
            total_ms: duration.as_millis() as u64,
        }
    }
}

/// Response metadata
#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    /// Model used
    pub model: String,
    /// Provider name
    pub provider: String,
}

/// Shared LLM provider type
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

// =============================================================================
// Provider Configuration
// =============================================================================

/// Supported provider backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Query-key JSON endpoint with a response schema
    #[default]
    Gemini,
    /// Bearer-auth chat completions
    OpenAi,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Gemini => write!(f, "gemini"),
            ProviderKind::OpenAi => write!(f, "openai"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAi),
            _ => Err(format!(
                "Unknown provider: {}. Valid values: gemini, openai",
                s
            )),
        }
    }
}

/// Per-provider connection settings
///
/// Note: API keys are handled securely - they are never serialized to output
/// and are redacted in debug output. Each provider converts the key to
/// SecretString internally for runtime protection.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// API key, never serialized to output
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// API base URL (for proxies and tests)
    pub api_base: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ProviderSettings {
    fn with_model(model: &str) -> Self {
        Self {
            api_key: None,
            model: model.to_string(),
            api_base: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
        }
    }

    /// The API key, if one is set and not blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self::with_model("")
    }
}

/// Provider selection and parameters, treated as immutable per call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Active provider
    pub provider: ProviderKind,
    /// Custom prompt template; the provider default is used when unset or blank
    pub prompt_template: Option<String>,
    pub gemini: ProviderSettings,
    pub openai: ProviderSettings,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            prompt_template: None,
            gemini: ProviderSettings::with_model(gemini_defaults::DEFAULT_MODEL),
            openai: ProviderSettings::with_model(openai_defaults::DEFAULT_MODEL),
        }
    }
}

impl ProviderConfig {
    /// Settings of the active provider
    pub fn active(&self) -> &ProviderSettings {
        match self.provider {
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::OpenAi => &self.openai,
        }
    }

    /// Model of the active provider
    pub fn model(&self) -> &str {
        &self.active().model
    }

    /// Resolve the active provider's key or fail with `MissingCredential`
    pub fn require_api_key(&self) -> Result<&str> {
        self.active()
            .api_key()
            .ok_or_else(|| SeoError::missing_credential(self.provider.to_string()))
    }
}

// =============================================================================
// LLM Provider Trait
// =============================================================================

/// LLM Provider trait for SEO generation
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Issue one completion request and return the validated result.
    ///
    /// No retries happen here; the orchestrator owns the retry policy.
    async fn generate(&self, prompt: &str) -> Result<LlmResponse>;

    /// Provider name for logging and metadata
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Send a minimal request to check the key and model are usable
    async fn health_check(&self) -> Result<bool>;
}

/// Create a shared provider for the active backend
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    let api_key = config.require_api_key()?;
    match config.provider {
        ProviderKind::Gemini => Ok(Arc::new(GeminiProvider::new(api_key, &config.gemini)?)),
        ProviderKind::OpenAi => Ok(Arc::new(OpenAiProvider::new(api_key, &config.openai)?)),
    }
}
