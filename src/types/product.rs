//! Product snapshot read from the editor page.

use serde::{Deserialize, Serialize};

/// Current product field values, read fresh for every generation request.
///
/// Absent fields deserialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub title: String,
    /// Raw description, usually HTML
    pub description: String,
    pub ingredients: String,
    pub size: String,
    pub image_url: String,
}

impl ProductSnapshot {
    /// True when neither a title nor a description could be read
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.description.trim().is_empty()
    }
}
