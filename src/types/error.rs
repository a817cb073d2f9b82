//! Unified Error Type System
//!
//! Centralized error types for generation and injection.
//!
//! ## Error Categories
//!
//! - **Credential**: No API key for the active provider (fail fast, never retried)
//! - **Auth**: Provider rejected the key (401/403), retried unless fail-fast is on
//! - **Transport**: Network failure or non-2xx response (retried)
//! - **Malformed**: Response shape or embedded JSON invalid (retried)
//! - **Injection**: A single field could not be written to the page (per field)
//! - **Config**: Invalid or unreadable configuration

use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories for retry decisions and user-facing status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing API key, user must configure one
    Credential,
    /// Provider rejected the credentials
    Auth,
    /// Network or HTTP failure
    Transport,
    /// Response did not have the expected structure
    Malformed,
    /// Field could not be written to the page
    Injection,
    /// Configuration problem
    Config,
    /// Local I/O and everything else
    Other,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Credential => write!(f, "CREDENTIAL"),
            Self::Auth => write!(f, "AUTH"),
            Self::Transport => write!(f, "TRANSPORT"),
            Self::Malformed => write!(f, "MALFORMED"),
            Self::Injection => write!(f, "INJECTION"),
            Self::Config => write!(f, "CONFIG"),
            Self::Other => write!(f, "OTHER"),
        }
    }
}

impl ErrorCategory {
    /// Whether the generation pipeline may retry an error of this category.
    ///
    /// Auth is only retryable when the caller has not asked to fail fast.
    pub fn is_retryable(&self, fail_fast_on_auth: bool) -> bool {
        match self {
            Self::Transport | Self::Malformed => true,
            Self::Auth => !fail_fast_on_auth,
            Self::Credential | Self::Injection | Self::Config | Self::Other => false,
        }
    }
}

// =============================================================================
// Provider API Error
// =============================================================================

/// Non-success response from a provider endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code
    pub status: u16,
    /// Status text plus any error message embedded in the response body
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "API error ({}): {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 401 and 403 mean the key itself is wrong
    pub fn is_auth(&self) -> bool {
        matches!(self.status, 401 | 403)
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum SeoError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Generation Errors
    // -------------------------------------------------------------------------
    #[error("API key for {provider} is not configured. Set it in the configuration file or environment")]
    MissingCredential { provider: String },

    #[error("{0}")]
    Api(ApiError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed result: {0}")]
    MalformedResult(String),

    // -------------------------------------------------------------------------
    // Injection Errors
    // -------------------------------------------------------------------------
    #[error("Field '{field}' was not found on the page")]
    FieldNotFound { field: String },

    #[error("Field '{field}' is read-only and was left unchanged")]
    FieldProtected { field: String },

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),
}

impl From<ApiError> for SeoError {
    fn from(err: ApiError) -> Self {
        SeoError::Api(err)
    }
}

impl From<reqwest::Error> for SeoError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SeoError::Transport(format!("request timed out: {}", err))
        } else if err.is_decode() {
            SeoError::MalformedResult(format!("response body is not valid JSON: {}", err))
        } else {
            SeoError::Transport(err.to_string())
        }
    }
}

/// Result type alias using SeoError
pub type Result<T> = std::result::Result<T, SeoError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl SeoError {
    pub fn missing_credential(provider: impl Into<String>) -> Self {
        Self::MissingCredential {
            provider: provider.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResult(message.into())
    }

    pub fn field_not_found(field: impl Into<String>) -> Self {
        Self::FieldNotFound {
            field: field.into(),
        }
    }

    pub fn field_protected(field: impl Into<String>) -> Self {
        Self::FieldProtected {
            field: field.into(),
        }
    }

    /// Classify this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingCredential { .. } => ErrorCategory::Credential,
            Self::Api(api) if api.is_auth() => ErrorCategory::Auth,
            Self::Api(_) | Self::Transport(_) => ErrorCategory::Transport,
            Self::MalformedResult(_) | Self::Json(_) => ErrorCategory::Malformed,
            Self::FieldNotFound { .. } | Self::FieldProtected { .. } | Self::UnknownField(_) => {
                ErrorCategory::Injection
            }
            Self::Config(_) => ErrorCategory::Config,
            Self::Io(_) => ErrorCategory::Other,
        }
    }

    /// Check if the generation pipeline should retry after this error
    pub fn is_retryable(&self, fail_fast_on_auth: bool) -> bool {
        self.category().is_retryable(fail_fast_on_auth)
    }
}
