//! AI Integration Layer
//!
//! Provider backends and the prompt templates sent to them.

pub mod prompt;
pub mod provider;

pub use prompt::{default_template, render_prompt, resolve_template};
pub use provider::{
    GeminiProvider, LlmProvider, LlmResponse, OpenAiProvider, ProviderConfig, ProviderKind,
    ProviderSettings, ResponseMetadata, ResponseTiming, SharedProvider, TokenUsage,
    create_provider,
};
