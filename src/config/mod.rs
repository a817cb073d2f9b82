//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/wooseo/config.toml)
//! 3. Project config (.wooseo/config.toml)
//! 4. Environment variables (WOOSEO_*, nested keys joined with `__`)
//! 5. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
