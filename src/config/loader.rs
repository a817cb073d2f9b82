//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/wooseo/config.toml)
//! 3. Project config (.wooseo/config.toml)
//! 4. Environment variables (WOOSEO_* prefix, `__` between nested keys)
//!
//! `GEMINI_API_KEY` and `OPENAI_API_KEY` fill in a provider key when no
//! other source set one.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::constants::ENV_PREFIX;
use crate::types::{Result, SeoError};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let global = Self::global_config_path().filter(|p| p.exists());
        let project = Some(Self::project_config_path()).filter(|p| p.exists());

        let mut config = Self::extract(Self::figment(global.as_deref(), project.as_deref()))?;
        Self::apply_env_credentials(&mut config);

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file only (env vars still apply)
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let mut config = Self::extract(Self::figment(None, Some(path)))?;
        Self::apply_env_credentials(&mut config);

        config.validate()?;
        Ok(config)
    }

    fn figment(global: Option<&Path>, project: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(path) = global {
            debug!("Loading global config from: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = project {
            debug!("Loading project config from: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        // e.g. WOOSEO_LLM__GEMINI__API_KEY -> llm.gemini.api_key
        figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true))
    }

    fn extract(figment: Figment) -> Result<Config> {
        figment
            .extract()
            .map_err(|e| SeoError::Config(format!("Configuration error: {}", e)))
    }

    fn apply_env_credentials(config: &mut Config) {
        let fill = |slot: &mut Option<String>, var: &str| {
            let missing = slot.as_deref().is_none_or(|k| k.trim().is_empty());
            if missing && let Ok(value) = env::var(var) {
                debug!("Using API key from {}", var);
                *slot = Some(value);
            }
        };
        fill(&mut config.llm.gemini.api_key, "GEMINI_API_KEY");
        fill(&mut config.llm.openai.api_key, "OPENAI_API_KEY");
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/wooseo/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("wooseo"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".wooseo")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Show current effective configuration (API keys are never printed)
    pub fn show_config(as_json: bool) -> Result<()> {
        let config = Self::load()?;

        if as_json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(&config).map_err(|e| SeoError::Config(e.to_string()))?
            );
        }

        Ok(())
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a default config file, globally or for the current project
    pub fn init(global: bool, force: bool) -> Result<PathBuf> {
        let dir = if global {
            Self::global_dir().ok_or_else(|| {
                SeoError::Config("Cannot determine global config directory".to_string())
            })?
        } else {
            Self::project_dir()
        };

        fs::create_dir_all(&dir)?;

        let config_path = dir.join("config.toml");
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_config())?;
            info!("Created config: {}", config_path.display());
        } else {
            info!("Config exists: {}", config_path.display());
        }

        Ok(config_path)
    }

    /// Generate default config content (TOML)
    fn default_config() -> String {
        r#"# wooseo configuration
# Project settings in .wooseo/config.toml override ~/.config/wooseo/config.toml.
# API keys may also come from GEMINI_API_KEY / OPENAI_API_KEY or
# WOOSEO_LLM__GEMINI__API_KEY / WOOSEO_LLM__OPENAI__API_KEY.

version = "1.0"

[llm]
# "gemini" or "openai"
provider = "gemini"
# Leave unset to use the built-in template for the selected provider.
# Placeholders: {title} {description} {ingredients} {size} {imageUrl}
# prompt_template = ""

[llm.gemini]
model = "gemini-2.5-flash-preview-05-20"
timeout_secs = 60
# api_key = ""

[llm.openai]
model = "gpt-4o"
timeout_secs = 60
# api_key = ""

[retry]
max_attempts = 3
base_delay_ms = 1000
factor = 2.0
max_delay_ms = 30000
# Stop on 401/403 instead of retrying
fail_fast_on_auth = false
"#
        .to_string()
    }
}
