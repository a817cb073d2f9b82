//! Generation output with its provenance kept beside the SEO payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::seo::SeoResult;

/// Which backend produced a result, and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub provider: String,
    pub model: String,
    /// RFC 3339 / ISO-8601 UTC timestamp
    pub generated_at: DateTime<Utc>,
}

impl GenerationMetadata {
    pub fn now(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            generated_at: Utc::now(),
        }
    }

    /// Short label for status lines, e.g. `GEMINI (gemini-2.5-flash)`
    pub fn label(&self) -> String {
        if self.model.is_empty() {
            self.provider.to_uppercase()
        } else {
            format!("{} ({})", self.provider.to_uppercase(), self.model)
        }
    }
}

/// A validated result plus its metadata.
///
/// The metadata is a sibling of the seven SEO keys so that strict key
/// validation of `result` is never affected by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    pub result: SeoResult,
    pub metadata: GenerationMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_includes_model() {
        let meta = GenerationMetadata::now("gemini", "gemini-2.5-flash-preview-05-20");
        assert_eq!(meta.label(), "GEMINI (gemini-2.5-flash-preview-05-20)");
        let meta = GenerationMetadata::now("openai", "");
        assert_eq!(meta.label(), "OPENAI");
    }

    #[test]
    fn test_timestamp_serializes_as_rfc3339() {
        let meta = GenerationMetadata::now("openai", "gpt-4o");
        let json = serde_json::to_value(&meta).unwrap();
        let stamp = json["generated_at"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
    }
}
