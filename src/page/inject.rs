//! Field Injection Strategy Chooser
//!
//! Every logical field maps to an ordered list of locators. The first
//! locator that finds a target and accepts the write wins. A protected
//! target stops the search immediately so the slug is never written
//! through a fallback.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::Page;
use super::locator::{
    BlockEditorLocator, EditorFrameLocator, ElementLocator, Locator, RichTextEditorLocator,
    TagInputLocator,
};
use crate::types::{Result, SeoError, SeoField, SeoResult};

const TITLE_SELECTORS: &[&str] = &[
    "#title",
    "input[name=\"post_title\"]",
    "#post-title-0",
    ".editor-post-title__input",
];

const DESCRIPTION_TEXTAREAS: &[&str] = &[
    "#content",
    "textarea[name=\"content\"]",
    "textarea.wp-editor-area",
];

const TAG_INPUT: &str = ".tagify__input";

const FOCUS_KEYWORD_SELECTORS: &[&str] = &[
    "input[name=\"rank_math_focus_keyword\"]",
    "#rank-math-focus-keyword",
    ".rank-math-focus-keyword",
    "input[placeholder*=\"Rank Math\"]",
];

const SEO_TITLE_SELECTORS: &[&str] = &[
    "#rank-math-editor-title",
    "input[name=\"rank_math_title\"]",
    "#rank-math-title",
    ".rank-math-title",
];

const SEO_DESCRIPTION_SELECTORS: &[&str] = &[
    "#rank-math-editor-description",
    "textarea[name=\"rank_math_description\"]",
    "#rank-math-description",
    ".rank-math-description",
];

const IMAGE_ALT_SELECTORS: &[&str] = &[
    "input[name=\"_wp_attachment_image_alt\"]",
    "#attachment_alt",
    "input[aria-label=\"Alt text\"]",
    "input[aria-label=\"Texto alternativo\"]",
];

const SLUG_SELECTORS: &[&str] = &[
    "#post_name",
    "#editable-post-name",
    "input[name=\"post_name\"]",
    "#new-post-slug",
    ".editor-post-slug__input",
];

/// A logical field with its ordered strategies
pub struct FieldTarget {
    field: SeoField,
    locators: Vec<Box<dyn Locator>>,
}

impl std::fmt::Debug for FieldTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldTarget")
            .field("field", &self.field)
            .field("strategies", &self.strategies())
            .finish()
    }
}

fn elements(
    field: SeoField,
    selectors: &[&'static str],
) -> impl Iterator<Item = Box<dyn Locator>> {
    selectors
        .iter()
        .map(move |&s| Box::new(ElementLocator::new(field, s)) as Box<dyn Locator>)
}

impl FieldTarget {
    pub fn new(field: SeoField, locators: Vec<Box<dyn Locator>>) -> Self {
        Self { field, locators }
    }

    /// Built-in strategy list for a field
    pub fn for_field(field: SeoField) -> Self {
        let locators: Vec<Box<dyn Locator>> = match field {
            SeoField::Title => elements(field, TITLE_SELECTORS).collect(),
            SeoField::HtmlDescription => {
                let mut list: Vec<Box<dyn Locator>> = vec![
                    Box::new(RichTextEditorLocator),
                    Box::new(EditorFrameLocator),
                ];
                list.extend(elements(field, DESCRIPTION_TEXTAREAS));
                list.push(Box::new(BlockEditorLocator));
                list
            }
            SeoField::FocusKeyword => {
                let mut list: Vec<Box<dyn Locator>> =
                    vec![Box::new(TagInputLocator::new(TAG_INPUT))];
                list.extend(elements(field, FOCUS_KEYWORD_SELECTORS));
                list
            }
            SeoField::SeoTitle => elements(field, SEO_TITLE_SELECTORS).collect(),
            SeoField::SeoDescription => elements(field, SEO_DESCRIPTION_SELECTORS).collect(),
            SeoField::ImageAlt => elements(field, IMAGE_ALT_SELECTORS).collect(),
            SeoField::Slug => SLUG_SELECTORS
                .iter()
                .map(|&s| Box::new(ElementLocator::guarded(field, s)) as Box<dyn Locator>)
                .collect(),
        };
        Self::new(field, locators)
    }

    pub fn field(&self) -> SeoField {
        self.field
    }

    pub fn strategies(&self) -> Vec<String> {
        self.locators.iter().map(|l| l.describe()).collect()
    }

    /// Try each strategy in order until one writes the value
    pub fn apply(&self, page: &mut dyn Page, value: &str) -> Result<Applied> {
        for locator in &self.locators {
            let Some(target) = locator.locate(&*page) else {
                debug!(field = %self.field, strategy = %locator.describe(), "Not present");
                continue;
            };

            match locator.apply_value(page, target, value) {
                Ok(()) => {
                    let strategy = locator.describe();
                    info!(field = %self.field, %strategy, "Field applied");
                    return Ok(Applied {
                        field: self.field,
                        strategy,
                    });
                }
                Err(e @ SeoError::FieldProtected { .. }) => {
                    warn!(
                        field = %self.field,
                        strategy = %locator.describe(),
                        "Field is protected"
                    );
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        field = %self.field,
                        strategy = %locator.describe(),
                        error = %e,
                        "Strategy failed, trying next"
                    );
                }
            }
        }

        warn!(field = %self.field, "No strategy could reach the field");
        Err(SeoError::field_not_found(self.field.as_str()))
    }
}

/// The strategy that wrote a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Applied {
    pub field: SeoField,
    pub strategy: String,
}

/// Write one field to the page
pub fn apply(page: &mut dyn Page, field: SeoField, value: &str) -> Result<Applied> {
    FieldTarget::for_field(field).apply(page, value)
}

/// Result of one field in a bulk apply
#[derive(Debug, Clone, Serialize)]
pub struct FieldOutcome {
    pub field: SeoField,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FieldOutcome {
    pub fn is_applied(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-field results of applying a whole [`SeoResult`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct InjectionReport {
    pub outcomes: Vec<FieldOutcome>,
}

impl InjectionReport {
    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_applied()).count()
    }

    pub fn all_applied(&self) -> bool {
        self.outcomes.iter().all(FieldOutcome::is_applied)
    }

    pub fn failures(&self) -> impl Iterator<Item = &FieldOutcome> {
        self.outcomes.iter().filter(|o| !o.is_applied())
    }
}

/// Apply all seven fields; a failing field never stops the others
pub fn apply_all(page: &mut dyn Page, result: &SeoResult) -> InjectionReport {
    let outcomes = result
        .fields()
        .map(|(field, value)| match apply(page, field, value) {
            Ok(applied) => FieldOutcome {
                field,
                strategy: Some(applied.strategy),
                error: None,
            },
            Err(e) => FieldOutcome {
                field,
                strategy: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    let report = InjectionReport { outcomes };
    info!(
        applied = report.applied_count(),
        total = report.outcomes.len(),
        "Injection finished"
    );
    report
}

// =============================================================================
// Diagnostics
// =============================================================================

/// Presence of a well-known element
#[derive(Debug, Clone, Serialize)]
pub struct ElementPresence {
    pub selector: &'static str,
    pub found: bool,
}

/// Which editor variants and well-known elements exist on the page
#[derive(Debug, Clone, Serialize)]
pub struct EditorDiagnostics {
    pub rich_text_editor: bool,
    pub rich_text_editor_hidden: bool,
    pub editor_frame: bool,
    pub editor_frame_accessible: bool,
    pub block_editor: bool,
    pub elements: Vec<ElementPresence>,
}

/// Check the page for every editor variant and known selector
pub fn diagnose_editors(page: &dyn Page) -> EditorDiagnostics {
    let rich_text = page.rich_text_editor();
    let frame = page.editor_frame();

    let presence = DESCRIPTION_TEXTAREAS
        .iter()
        .chain(std::iter::once(&TAG_INPUT))
        .chain(TITLE_SELECTORS)
        .chain(FOCUS_KEYWORD_SELECTORS)
        .chain(SEO_TITLE_SELECTORS)
        .chain(SEO_DESCRIPTION_SELECTORS)
        .chain(IMAGE_ALT_SELECTORS)
        .chain(SLUG_SELECTORS)
        .map(|&selector| ElementPresence {
            selector,
            found: page.query_selector(selector).is_some(),
        })
        .collect();

    let diagnostics = EditorDiagnostics {
        rich_text_editor: rich_text.is_some(),
        rich_text_editor_hidden: rich_text.is_some_and(|e| e.is_hidden()),
        editor_frame: frame.is_some(),
        editor_frame_accessible: frame.is_some_and(|f| f.body_html().is_some()),
        block_editor: page.block_editor().is_some(),
        elements: presence,
    };

    info!(
        rich_text_editor = diagnostics.rich_text_editor,
        editor_frame = diagnostics.editor_frame,
        block_editor = diagnostics.block_editor,
        "Editor diagnostics"
    );
    for element in &diagnostics.elements {
        debug!(selector = element.selector, found = element.found, "Known element");
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{EditorFrame, MemoryPage, SyntheticEvent};

    /// Classic editor fields without a slug input
    const CLASSIC_FIELDS: &str = r#"
        <input id="title" name="post_title">
        <textarea id="content" class="wp-editor-area"></textarea>
        <span class="tagify__input"></span>
        <input id="rank-math-editor-title">
        <textarea id="rank-math-editor-description"></textarea>
        <input name="_wp_attachment_image_alt">"#;

    fn full_result() -> SeoResult {
        SeoResult {
            title: "Comedero doble de acero para gatos".to_string(),
            html_description: "<h2>Comedero doble</h2>".to_string(),
            focus_keyword: "comedero doble para gatos".to_string(),
            seo_title: "comedero doble para gatos | Golfitos Petshop".to_string(),
            slug: "comedero-doble-gatos".to_string(),
            seo_description: "comedero doble para gatos de acero.".to_string(),
            image_alt: "Comedero doble de acero inoxidable".to_string(),
        }
    }

    fn classic_page() -> MemoryPage {
        MemoryPage::from_html(&format!(r#"{CLASSIC_FIELDS}<input id="post_name">"#))
    }

    /// Classic editor widgets; `wrap_class` decides whether the visual tab is active
    fn editor_page(wrap_class: &str) -> MemoryPage {
        MemoryPage::from_html(&format!(
            r#"<div id="wp-content-wrap" class="{wrap_class}">
                <iframe id="content_ifr" srcdoc=""></iframe>
                <textarea id="content" class="wp-editor-area"></textarea>
            </div>"#
        ))
    }

    fn frame_body(page: &MemoryPage) -> Option<String> {
        page.editor_frame().and_then(|frame| frame.body_html())
    }

    /// Frame that exposes its body but refuses writes
    struct RejectingFrame;

    impl EditorFrame for RejectingFrame {
        fn body_html(&self) -> Option<String> {
            Some(String::new())
        }

        fn set_body_html(&mut self, _html: &str) -> bool {
            false
        }
    }

    #[test]
    fn test_rich_text_editor_wins_when_visible() {
        let mut page = editor_page("wp-editor-wrap tmce-active");

        let applied = apply(&mut page, SeoField::HtmlDescription, "<p>x</p>").unwrap();
        assert_eq!(applied.strategy, "rich-text editor");
        assert_eq!(page.find("#content").unwrap().text, "<p>x</p>");
        assert_eq!(frame_body(&page).as_deref(), Some(""));
        assert!(page.events().is_empty());
    }

    #[test]
    fn test_hidden_editor_falls_through_to_frame() {
        let mut page = editor_page("wp-editor-wrap html-active");

        let applied = apply(&mut page, SeoField::HtmlDescription, "<p>x</p>").unwrap();
        assert_eq!(applied.strategy, "editor iframe");
        assert_eq!(frame_body(&page).as_deref(), Some("<p>x</p>"));
        assert_eq!(page.find("#content").unwrap().text, "");
    }

    #[test]
    fn test_rejected_frame_write_falls_through_to_textarea() {
        let mut page = editor_page("wp-editor-wrap html-active").with_frame(RejectingFrame);

        let applied = apply(&mut page, SeoField::HtmlDescription, "<p>x</p>").unwrap();
        assert_eq!(applied.strategy, "element #content");
        assert_eq!(page.find("#content").unwrap().text, "<p>x</p>");
    }

    #[test]
    fn test_source_textarea_then_block_editor() {
        let mut page = classic_page();
        let applied = apply(&mut page, SeoField::HtmlDescription, "<p>x</p>").unwrap();
        assert_eq!(applied.strategy, "element #content");
        let content = page.query_selector("#content").unwrap();
        assert_eq!(page.element(content).unwrap().text, "<p>x</p>");
        assert_eq!(
            page.events_for(content),
            vec![&SyntheticEvent::input(), &SyntheticEvent::change()]
        );

        let mut block = MemoryPage::from_html(r#"<body class="block-editor-page"></body>"#);
        let applied = apply(&mut block, SeoField::HtmlDescription, "<p>y</p>").unwrap();
        assert_eq!(applied.strategy, "block editor");
        assert_eq!(block.block_editor().unwrap().edited_content(), "<p>y</p>");
    }

    #[test]
    fn test_focus_keyword_falls_back_to_rank_math_input() {
        let mut page = MemoryPage::from_html(r#"<input placeholder="Ejemplo: Rank Math SEO">"#);
        let applied = apply(&mut page, SeoField::FocusKeyword, "collar").unwrap();
        assert_eq!(applied.strategy, "element input[placeholder*=\"Rank Math\"]");
        assert_eq!(page.find("input").unwrap().text, "collar");
    }

    #[test]
    fn test_missing_field_is_not_found() {
        let mut page = MemoryPage::new();
        let err = apply(&mut page, SeoField::SeoTitle, "x").unwrap_err();
        assert!(matches!(err, SeoError::FieldNotFound { ref field } if field == "seo_title"));
    }

    #[test]
    fn test_slug_is_idempotent() {
        let mut page = classic_page();
        apply(&mut page, SeoField::Slug, "comedero-doble-gatos").unwrap();
        let first = page.to_html();
        apply(&mut page, SeoField::Slug, "comedero-doble-gatos").unwrap();
        assert_eq!(page.to_html(), first);

        let slug = page.query_selector("#post_name").unwrap();
        assert_eq!(page.events_for(slug).len(), 4);
    }

    #[test]
    fn test_protected_slug_is_untouched() {
        let mut page = MemoryPage::from_html(
            r#"<input id="post_name" value="old" readonly><input name="post_name">"#,
        );

        let err = apply(&mut page, SeoField::Slug, "new").unwrap_err();
        assert!(matches!(err, SeoError::FieldProtected { .. }));
        assert_eq!(page.find("#post_name").unwrap().text, "old");
        assert_eq!(page.find("input:not([id])").unwrap().text, "");
        assert!(page.events().is_empty());
    }

    #[test]
    fn test_apply_all_reports_each_field() {
        let mut page = MemoryPage::from_html(CLASSIC_FIELDS);

        let report = apply_all(&mut page, &full_result());
        assert_eq!(report.outcomes.len(), 7);
        assert_eq!(report.applied_count(), 6);
        assert!(!report.all_applied());
        let failed: Vec<_> = report.failures().map(|o| o.field).collect();
        assert_eq!(failed, vec![SeoField::Slug]);
        assert_eq!(
            page.find("#title").unwrap().text,
            "Comedero doble de acero para gatos"
        );
        assert_eq!(
            page.find(".tagify__input").unwrap().text,
            "comedero doble para gatos"
        );
    }

    #[test]
    fn test_diagnostics() {
        let page = MemoryPage::from_html(&format!(
            r#"{CLASSIC_FIELDS}<iframe id="content_ifr" src="https://cdn.example/editor"></iframe>"#
        ));
        let diagnostics = diagnose_editors(&page);
        assert!(!diagnostics.rich_text_editor);
        assert!(diagnostics.editor_frame);
        assert!(!diagnostics.editor_frame_accessible);
        assert!(!diagnostics.block_editor);
        let found = |s: &str| {
            diagnostics
                .elements
                .iter()
                .find(|p| p.selector == s)
                .map(|p| p.found)
        };
        assert_eq!(found(".tagify__input"), Some(true));
        assert_eq!(found("#new-post-slug"), Some(false));
    }

    #[test]
    fn test_strategy_lists() {
        let description = FieldTarget::for_field(SeoField::HtmlDescription);
        assert_eq!(
            description.strategies(),
            vec![
                "rich-text editor",
                "editor iframe",
                "element #content",
                "element textarea[name=\"content\"]",
                "element textarea.wp-editor-area",
                "block editor",
            ]
        );
        assert_eq!(FieldTarget::for_field(SeoField::Slug).strategies().len(), 5);
    }
}
