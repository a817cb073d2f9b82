//! Product snapshot extraction.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::Page;
use crate::types::ProductSnapshot;

static INGREDIENTS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)ingredientes:(.*?)(\.|\n)").expect("valid ingredients regex")
});

static SIZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(peso|talla|medida|contenido): (.*?)(\.|\n)").expect("valid size regex")
});

const TITLE_SELECTORS: &[&str] = &["#title", ".editor-post-title__input"];
const DESCRIPTION_SELECTOR: &str = "textarea.wp-editor-area";
const IMAGE_SELECTORS: &[&str] = &[".editor-post-featured-image img", "#postimagediv img"];

fn first_text(page: &dyn Page, selectors: &[&str]) -> String {
    selectors
        .iter()
        .find_map(|s| page.find(s))
        .map(|el| el.text)
        .unwrap_or_default()
}

/// Ingredients line from a free-text description
pub fn parse_ingredients(description: &str) -> String {
    INGREDIENTS_PATTERN
        .captures(description)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Weight, size, measure or content line from a free-text description
pub fn parse_size(description: &str) -> String {
    SIZE_PATTERN
        .captures(description)
        .and_then(|c| c.get(2))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Read the current product fields from the page
pub fn extract(page: &dyn Page) -> ProductSnapshot {
    let title = first_text(page, TITLE_SELECTORS);

    let description = match page.block_editor() {
        Some(store) => store.edited_content(),
        None => first_text(page, &[DESCRIPTION_SELECTOR]),
    };

    let image_url = IMAGE_SELECTORS
        .iter()
        .find_map(|s| page.find(s))
        .and_then(|el| el.attr("src").map(str::to_string))
        .unwrap_or_default();

    let snapshot = ProductSnapshot {
        ingredients: parse_ingredients(&description),
        size: parse_size(&description),
        title,
        description,
        image_url,
    };

    debug!(
        title = %snapshot.title,
        description_len = snapshot.description.len(),
        has_ingredients = !snapshot.ingredients.is_empty(),
        has_size = !snapshot.size.is_empty(),
        has_image = !snapshot.image_url.is_empty(),
        "Extracted product data"
    );
    snapshot
}
