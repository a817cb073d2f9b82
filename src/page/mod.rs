//! Host Page Abstraction
//!
//! The product editor page is reached only through the [`Page`] trait.
//! Any subset of elements and editor widgets may be absent.
//!
//! ## Modules
//!
//! - `memory`: in-memory HTML page, loaded from a saved product editor page
//! - `locator`: targeting strategies for a single field
//! - `inject`: per-field strategy chooser and bulk apply
//! - `extract`: product snapshot extraction

pub mod extract;
pub mod inject;
pub mod locator;
pub mod memory;

pub use extract::extract;
pub use inject::{
    Applied, EditorDiagnostics, FieldOutcome, FieldTarget, InjectionReport, apply, apply_all,
    diagnose_editors,
};
pub use memory::MemoryPage;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Position of an element in document order
pub type ElementId = usize;

/// Current state of one element, read from the page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ElementInfo {
    /// Lowercase tag name (`input`, `textarea`, `span`, ...)
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    /// Value for text controls, text content otherwise
    pub text: String,
}

impl ElementInfo {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// `input` and `textarea` carry a value; everything else carries text
    pub fn is_text_control(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea")
    }

    /// False for `readonly` or `disabled` controls
    pub fn is_editable(&self) -> bool {
        !self.attributes.contains_key("readonly") && !self.attributes.contains_key("disabled")
    }
}

/// Events dispatched after a programmatic write so page frameworks notice it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SyntheticEvent {
    Input {
        bubbles: bool,
        cancelable: bool,
    },
    Change {
        bubbles: bool,
    },
    KeyDown {
        key: String,
        code: String,
        key_code: u32,
        bubbles: bool,
    },
}

impl SyntheticEvent {
    pub fn input() -> Self {
        Self::Input {
            bubbles: true,
            cancelable: false,
        }
    }

    pub fn cancelable_input() -> Self {
        Self::Input {
            bubbles: true,
            cancelable: true,
        }
    }

    pub fn change() -> Self {
        Self::Change { bubbles: true }
    }

    pub fn enter() -> Self {
        Self::KeyDown {
            key: "Enter".to_string(),
            code: "Enter".to_string(),
            key_code: 13,
            bubbles: true,
        }
    }
}

/// Visual rich-text editor instance (the classic editor's content editor)
pub trait RichTextEditor {
    fn is_hidden(&self) -> bool;
    fn set_content(&mut self, html: &str);
    fn focus(&mut self);
}

/// Iframe hosting the visual editor body
pub trait EditorFrame {
    /// Body HTML, `None` when the frame document is not accessible
    fn body_html(&self) -> Option<String>;
    /// Replace the body HTML; false when the frame document rejects the write
    fn set_body_html(&mut self, html: &str) -> bool;
}

/// Block editor data store
pub trait BlockEditor {
    fn edited_content(&self) -> String;
    fn edit_post_content(&mut self, content: &str);
}

/// Read and write access to the product editor page
pub trait Page {
    /// First element matching the CSS selector, in document order.
    /// Selectors that do not parse match nothing.
    fn query_selector(&self, selector: &str) -> Option<ElementId>;

    fn element(&self, id: ElementId) -> Option<ElementInfo>;

    /// Set the value of a text control, or replace the text of any other element
    fn set_text(&mut self, id: ElementId, text: &str);

    fn focus(&mut self, id: ElementId);
    fn dispatch_event(&mut self, id: ElementId, event: SyntheticEvent);

    fn rich_text_editor(&self) -> Option<&dyn RichTextEditor>;
    fn rich_text_editor_mut(&mut self) -> Option<&mut dyn RichTextEditor>;

    fn editor_frame(&self) -> Option<&dyn EditorFrame>;
    fn editor_frame_mut(&mut self) -> Option<&mut dyn EditorFrame>;

    /// The block editor store, only when it is active on this page
    fn block_editor(&self) -> Option<&dyn BlockEditor>;
    fn block_editor_mut(&mut self) -> Option<&mut dyn BlockEditor>;

    /// Convenience lookup combining `query_selector` and `element`
    fn find(&self, selector: &str) -> Option<ElementInfo> {
        self.query_selector(selector).and_then(|id| self.element(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(tag: &str, attributes: &[(&str, &str)]) -> ElementInfo {
        ElementInfo {
            tag: tag.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            text: String::new(),
        }
    }

    #[test]
    fn test_text_controls() {
        assert!(info("input", &[]).is_text_control());
        assert!(info("textarea", &[]).is_text_control());
        assert!(!info("span", &[("class", "tagify__input")]).is_text_control());
    }

    #[test]
    fn test_readonly_and_disabled_are_not_editable() {
        assert!(info("input", &[("id", "post_name")]).is_editable());
        assert!(!info("input", &[("readonly", "")]).is_editable());
        assert!(!info("input", &[("disabled", "disabled")]).is_editable());
        assert_eq!(info("input", &[("name", "post_name")]).attr("name"), Some("post_name"));
    }

    #[test]
    fn test_enter_event_shape() {
        let json = serde_json::to_value(SyntheticEvent::enter()).unwrap();
        assert_eq!(json["type"], "keydown");
        assert_eq!(json["key"], "Enter");
        assert_eq!(json["key_code"], 13);
    }
}
