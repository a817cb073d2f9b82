//! WooSEO - SEO Metadata Generator for WooCommerce Product Editors
//!
//! Reads a product from an editor page, asks an LLM for a complete set of
//! SEO fields and writes them back into whichever editor widgets the page
//! exposes.
//!
//! ## Core Features
//!
//! - **Two Providers**: Gemini (response schema) and OpenAI (JSON mode)
//! - **Retry with Backoff**: exponential delays between failed attempts
//! - **Strategy Chains**: each field tries its widgets in priority order
//! - **Message Protocol**: JSON requests for page-side and generation work
//!
//! ## Quick Start
//!
//! ```ignore
//! use wooseo::{ConfigLoader, MemoryPage, Orchestrator};
//! use wooseo::page::{apply_all, extract};
//! use std::path::Path;
//!
//! let config = ConfigLoader::load()?;
//! let mut page = MemoryPage::load(Path::new("product.html"))?;
//! let snapshot = extract(&page);
//! let generation = Orchestrator::new(config.retry.clone())
//!     .run(&snapshot, &config.llm)
//!     .await?;
//! let report = apply_all(&mut page, &generation.result);
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: LLM provider abstraction and prompt templates
//! - [`generation`]: provider call with retry and backoff
//! - [`page`]: editor page model, extraction and field injection
//! - [`messaging`]: request/response protocol handlers
//! - [`config`]: layered configuration

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod generation;
pub mod messaging;
pub mod page;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, RetryConfig};

// Error Types
pub use types::error::{ApiError, ErrorCategory, Result, SeoError};

// Domain Types
pub use types::{Generation, GenerationMetadata, ProductSnapshot, SeoField, SeoResult};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use generation::{AttemptRecord, Orchestrator};
pub use messaging::{BackgroundHandler, ContentHandler, Request, Response};
pub use page::{InjectionReport, MemoryPage, Page};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    GeminiProvider, LlmProvider, LlmResponse, OpenAiProvider, ProviderConfig, ProviderKind,
    SharedProvider,
};
