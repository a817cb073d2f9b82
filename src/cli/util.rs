//! CLI Common Utilities
//!
//! Shared configuration loading and saved-page handling for commands.

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::ai::provider::ProviderKind;
use crate::config::{Config, ConfigLoader};
use crate::page::MemoryPage;
use crate::types::{Result, SeoError, SeoResult};

/// Provider overrides given on the command line (highest priority layer)
#[derive(Debug, Clone, Default)]
pub struct ProviderOverrides {
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
}

/// Command execution context
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: Config,
}

impl CommandContext {
    /// Load config from `path` if given, otherwise from the full chain,
    /// then apply command-line overrides
    pub fn load(path: Option<&Path>, overrides: &ProviderOverrides) -> Result<Self> {
        let mut config = match path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };

        if let Some(provider) = overrides.provider {
            config.llm.provider = provider;
        }
        if let Some(model) = overrides.model.as_deref().filter(|m| !m.trim().is_empty()) {
            match config.llm.provider {
                ProviderKind::Gemini => config.llm.gemini.model = model.to_string(),
                ProviderKind::OpenAi => config.llm.openai.model = model.to_string(),
            }
        }

        config.validate()?;
        Ok(Self { config })
    }
}

/// Open a saved product editor page, with a hint when the file is missing
pub fn open_page(path: &Path) -> Result<MemoryPage> {
    if !path.exists() {
        return Err(SeoError::Config(format!("Page not found: {}", path.display())));
    }
    MemoryPage::load(path)
}

/// Read a generation result from a file or stdin (`-`).
///
/// Accepts the bare seven-key object or a `{data, metadata}` envelope.
pub fn read_result(path: &Path) -> Result<SeoResult> {
    let text = if path == Path::new("-") {
        read_stdin()?
    } else {
        std::fs::read_to_string(path)?
    };

    let value: serde_json::Value = serde_json::from_str(&text)?;
    match value.get("data") {
        Some(data) if value.get("metadata").is_some() => SeoResult::from_value(data),
        _ => SeoResult::from_value(&value),
    }
}

pub fn read_stdin() -> Result<String> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    Ok(input)
}

/// Where a modified page is written: `--output` if given, else in place
pub fn output_path(page: &Path, output: Option<PathBuf>) -> PathBuf {
    output.unwrap_or_else(|| page.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const RESULT: &str = r#"{"title":"t","html_description":"h","focus_keyword":"f","seo_title":"s","slug":"sl","seo_description":"d","image_alt":"a"}"#;

    #[test]
    fn test_read_result_accepts_bare_and_envelope() {
        let dir = TempDir::new().unwrap();
        let bare = dir.path().join("bare.json");
        std::fs::write(&bare, RESULT).unwrap();
        assert_eq!(read_result(&bare).unwrap().slug, "sl");

        let envelope = dir.path().join("envelope.json");
        std::fs::write(
            &envelope,
            format!(
                r#"{{"data":{},"metadata":{{"provider":"gemini","model":"m","generated_at":"2025-01-01T00:00:00Z"}}}}"#,
                RESULT
            ),
        )
        .unwrap();
        assert_eq!(read_result(&envelope).unwrap().image_alt, "a");
    }

    #[test]
    fn test_open_missing_page_is_config_error() {
        let err = open_page(Path::new("/nonexistent/page.html")).unwrap_err();
        assert!(matches!(err, SeoError::Config(_)));
    }

    #[test]
    fn test_overrides_apply_to_selected_provider() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[llm]\nprovider = \"gemini\"\n").unwrap();

        let overrides = ProviderOverrides {
            provider: Some(ProviderKind::OpenAi),
            model: Some("gpt-4o-mini".to_string()),
        };
        let ctx = CommandContext::load(Some(&path), &overrides).unwrap();
        assert_eq!(ctx.config.llm.provider, ProviderKind::OpenAi);
        assert_eq!(ctx.config.llm.openai.model, "gpt-4o-mini");
        assert_eq!(ctx.config.llm.gemini.model, "gemini-2.5-flash-preview-05-20");
    }

    #[test]
    fn test_output_path_defaults_to_page() {
        let page = Path::new("page.html");
        assert_eq!(output_path(page, None), PathBuf::from("page.html"));
        assert_eq!(
            output_path(page, Some(PathBuf::from("out.html"))),
            PathBuf::from("out.html")
        );
    }
}
