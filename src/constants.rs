//! Global Constants
//!
//! Centralized constants for providers, retry tuning and page selectors.

/// Retry constants for the generation pipeline
pub mod retry {
    /// Total attempts, including the first call
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Delay after the first failed attempt (milliseconds)
    pub const BASE_DELAY_MS: u64 = 1_000;

    /// Backoff multiplier (1s, 2s, 4s, ...)
    pub const BACKOFF_FACTOR: f32 = 2.0;

    /// Upper bound for any single delay (milliseconds)
    pub const MAX_DELAY_MS: u64 = 30_000;
}

/// Network constants
pub mod network {
    /// Default HTTP request timeout in seconds
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
}

/// Gemini endpoint defaults
pub mod gemini {
    pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
    pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-05-20";
}

/// OpenAI endpoint defaults
pub mod openai {
    pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
    pub const DEFAULT_MODEL: &str = "gpt-4o";

    /// Fixed sampling temperature for SEO generation
    pub const TEMPERATURE: f32 = 0.7;

    /// Completion token cap for SEO generation
    pub const MAX_TOKENS: u32 = 2000;

    /// Token cap for the connection test
    pub const HEALTH_CHECK_MAX_TOKENS: u32 = 10;
}

/// Prompt used by provider connection tests
pub const HEALTH_CHECK_PROMPT: &str = "Test de conexión. Responde solo: OK";

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "WOOSEO_";
