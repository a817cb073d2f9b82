//! Field Locators
//!
//! Each locator is one strategy for reaching a field: find a target on the
//! page, then write a value to it in the way that widget expects.

use tracing::debug;

use super::{ElementId, Page, SyntheticEvent};
use crate::types::{Result, SeoError, SeoField};

/// Where a locator found its field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Element(ElementId),
    RichTextEditor,
    EditorFrame,
    BlockEditor,
}

/// A single targeting strategy
pub trait Locator: Send + Sync {
    /// Strategy name reported in results and logs
    fn describe(&self) -> String;

    fn locate(&self, page: &dyn Page) -> Option<Target>;

    fn apply_value(&self, page: &mut dyn Page, target: Target, value: &str) -> Result<()>;
}

fn unexpected_target(field: SeoField, target: Target) -> SeoError {
    debug!(%field, ?target, "Locator received a target it cannot write");
    SeoError::field_not_found(field.as_str())
}

// =============================================================================
// Plain elements
// =============================================================================

/// Input, textarea or generic node matched by a CSS selector
#[derive(Debug, Clone)]
pub struct ElementLocator {
    field: SeoField,
    selector: &'static str,
    /// Refuse to write into read-only or disabled elements
    guard_editable: bool,
}

impl ElementLocator {
    pub fn new(field: SeoField, selector: &'static str) -> Self {
        Self {
            field,
            selector,
            guard_editable: false,
        }
    }

    pub fn guarded(field: SeoField, selector: &'static str) -> Self {
        Self {
            field,
            selector,
            guard_editable: true,
        }
    }
}

impl Locator for ElementLocator {
    fn describe(&self) -> String {
        format!("element {}", self.selector)
    }

    fn locate(&self, page: &dyn Page) -> Option<Target> {
        page.query_selector(self.selector).map(Target::Element)
    }

    fn apply_value(&self, page: &mut dyn Page, target: Target, value: &str) -> Result<()> {
        let Target::Element(id) = target else {
            return Err(unexpected_target(self.field, target));
        };
        let element = page
            .element(id)
            .ok_or_else(|| SeoError::field_not_found(self.field.as_str()))?;

        if self.guard_editable && !element.is_editable() {
            return Err(SeoError::field_protected(self.field.as_str()));
        }

        page.set_text(id, value);
        if element.is_text_control() {
            page.focus(id);
            page.dispatch_event(id, SyntheticEvent::input());
            page.dispatch_event(id, SyntheticEvent::change());
        }
        Ok(())
    }
}

// =============================================================================
// Description editors
// =============================================================================

/// Visible visual editor instance
#[derive(Debug, Clone, Default)]
pub struct RichTextEditorLocator;

impl Locator for RichTextEditorLocator {
    fn describe(&self) -> String {
        "rich-text editor".to_string()
    }

    fn locate(&self, page: &dyn Page) -> Option<Target> {
        page.rich_text_editor()
            .filter(|editor| !editor.is_hidden())
            .map(|_| Target::RichTextEditor)
    }

    fn apply_value(&self, page: &mut dyn Page, _target: Target, value: &str) -> Result<()> {
        let editor = page
            .rich_text_editor_mut()
            .ok_or_else(|| SeoError::field_not_found(SeoField::HtmlDescription.as_str()))?;
        editor.set_content(value);
        editor.focus();
        Ok(())
    }
}

/// Iframe body of the visual editor
#[derive(Debug, Clone, Default)]
pub struct EditorFrameLocator;

impl Locator for EditorFrameLocator {
    fn describe(&self) -> String {
        "editor iframe".to_string()
    }

    fn locate(&self, page: &dyn Page) -> Option<Target> {
        page.editor_frame()
            .filter(|frame| frame.body_html().is_some())
            .map(|_| Target::EditorFrame)
    }

    fn apply_value(&self, page: &mut dyn Page, _target: Target, value: &str) -> Result<()> {
        let frame = page
            .editor_frame_mut()
            .ok_or_else(|| SeoError::field_not_found(SeoField::HtmlDescription.as_str()))?;
        if frame.set_body_html(value) {
            Ok(())
        } else {
            debug!("Editor iframe rejected the write");
            Err(SeoError::field_not_found(SeoField::HtmlDescription.as_str()))
        }
    }
}

/// Block editor data store
#[derive(Debug, Clone, Default)]
pub struct BlockEditorLocator;

impl Locator for BlockEditorLocator {
    fn describe(&self) -> String {
        "block editor".to_string()
    }

    fn locate(&self, page: &dyn Page) -> Option<Target> {
        page.block_editor().map(|_| Target::BlockEditor)
    }

    fn apply_value(&self, page: &mut dyn Page, _target: Target, value: &str) -> Result<()> {
        let store = page
            .block_editor_mut()
            .ok_or_else(|| SeoError::field_not_found(SeoField::HtmlDescription.as_str()))?;
        store.edit_post_content(value);
        Ok(())
    }
}

// =============================================================================
// Tag input
// =============================================================================

/// Tag widget input: the keyword is typed and committed with Enter
#[derive(Debug, Clone)]
pub struct TagInputLocator {
    selector: &'static str,
}

impl TagInputLocator {
    pub fn new(selector: &'static str) -> Self {
        Self { selector }
    }
}

impl Locator for TagInputLocator {
    fn describe(&self) -> String {
        format!("tag input {}", self.selector)
    }

    fn locate(&self, page: &dyn Page) -> Option<Target> {
        page.query_selector(self.selector).map(Target::Element)
    }

    fn apply_value(&self, page: &mut dyn Page, target: Target, value: &str) -> Result<()> {
        let Target::Element(id) = target else {
            return Err(unexpected_target(SeoField::FocusKeyword, target));
        };
        if page.element(id).is_none() {
            return Err(SeoError::field_not_found(SeoField::FocusKeyword.as_str()));
        }

        // Replacing the whole node drops any half-typed tag markup
        page.set_text(id, value);

        page.focus(id);
        page.dispatch_event(id, SyntheticEvent::cancelable_input());
        page.dispatch_event(id, SyntheticEvent::enter());
        debug!(selector = self.selector, "Committed tag with Enter");
        Ok(())
    }
}
