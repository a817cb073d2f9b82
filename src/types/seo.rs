//! SEO result payload and its seven-key contract.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::error::{Result, SeoError};

/// The seven logical SEO fields, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeoField {
    Title,
    HtmlDescription,
    FocusKeyword,
    SeoTitle,
    Slug,
    SeoDescription,
    ImageAlt,
}

impl SeoField {
    pub const ALL: [SeoField; 7] = [
        SeoField::Title,
        SeoField::HtmlDescription,
        SeoField::FocusKeyword,
        SeoField::SeoTitle,
        SeoField::Slug,
        SeoField::SeoDescription,
        SeoField::ImageAlt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeoField::Title => "title",
            SeoField::HtmlDescription => "html_description",
            SeoField::FocusKeyword => "focus_keyword",
            SeoField::SeoTitle => "seo_title",
            SeoField::Slug => "slug",
            SeoField::SeoDescription => "seo_description",
            SeoField::ImageAlt => "image_alt",
        }
    }
}

impl fmt::Display for SeoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeoField {
    type Err = SeoError;

    fn from_str(s: &str) -> Result<Self> {
        SeoField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| SeoError::UnknownField(s.to_string()))
    }
}

/// Generated SEO metadata for one product.
///
/// All seven keys are required; a payload missing any of them is rejected
/// with [`SeoError::MalformedResult`] and never reaches injection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoResult {
    pub title: String,
    pub html_description: String,
    pub focus_keyword: String,
    pub seo_title: String,
    pub slug: String,
    pub seo_description: String,
    pub image_alt: String,
}

impl SeoResult {
    /// Parse the JSON text a provider embeds in its response.
    pub fn parse_payload(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text.trim()).map_err(|e| {
            SeoError::malformed(format!("embedded payload is not valid JSON: {}", e))
        })?;
        Self::from_value(&value)
    }

    /// Validate an already-parsed JSON value against the seven-key contract.
    ///
    /// Extra keys are ignored.
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| SeoError::malformed("payload must be a JSON object"))?;

        let mut missing = Vec::new();
        let mut not_strings = Vec::new();
        for field in SeoField::ALL {
            match object.get(field.as_str()) {
                None | Some(Value::Null) => missing.push(field.as_str()),
                Some(Value::String(_)) => {}
                Some(_) => not_strings.push(field.as_str()),
            }
        }

        if !missing.is_empty() {
            return Err(SeoError::malformed(format!(
                "missing required keys: {}",
                missing.join(", ")
            )));
        }
        if !not_strings.is_empty() {
            return Err(SeoError::malformed(format!(
                "keys must be strings: {}",
                not_strings.join(", ")
            )));
        }

        let text = |field: SeoField| -> String {
            object
                .get(field.as_str())
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Ok(Self {
            title: text(SeoField::Title),
            html_description: text(SeoField::HtmlDescription),
            focus_keyword: text(SeoField::FocusKeyword),
            seo_title: text(SeoField::SeoTitle),
            slug: text(SeoField::Slug),
            seo_description: text(SeoField::SeoDescription),
            image_alt: text(SeoField::ImageAlt),
        })
    }

    pub fn get(&self, field: SeoField) -> &str {
        match field {
            SeoField::Title => &self.title,
            SeoField::HtmlDescription => &self.html_description,
            SeoField::FocusKeyword => &self.focus_keyword,
            SeoField::SeoTitle => &self.seo_title,
            SeoField::Slug => &self.slug,
            SeoField::SeoDescription => &self.seo_description,
            SeoField::ImageAlt => &self.image_alt,
        }
    }

    /// Return a copy with one field replaced (manual edits before injection)
    pub fn with_field(&self, field: SeoField, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        let value = value.into();
        match field {
            SeoField::Title => next.title = value,
            SeoField::HtmlDescription => next.html_description = value,
            SeoField::FocusKeyword => next.focus_keyword = value,
            SeoField::SeoTitle => next.seo_title = value,
            SeoField::Slug => next.slug = value,
            SeoField::SeoDescription => next.seo_description = value,
            SeoField::ImageAlt => next.image_alt = value,
        }
        next
    }

    /// Iterate fields in canonical order
    pub fn fields(&self) -> impl Iterator<Item = (SeoField, &str)> {
        SeoField::ALL.into_iter().map(move |field| (field, self.get(field)))
    }
}
