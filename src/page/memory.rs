//! In-memory page backed by a saved product editor HTML page.
//!
//! The document is parsed with kuchikiki and queried with real CSS
//! selectors. Editor widgets are detected from the markup WordPress
//! renders:
//!
//! - `#wp-content-wrap`: visual editor, visible when it has `tmce-active`
//! - `iframe#content_ifr`: editor iframe, reachable when it carries `srcdoc`
//! - `body.block-editor-page`: block editor, content kept in
//!   `textarea.editor-post-text-editor` when present
//!
//! Focus changes and dispatched events are recorded so callers can observe
//! the side effects of injection. They are never written back to the page.

use kuchikiki::traits::*;
use kuchikiki::{NodeRef, Selectors};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use super::{
    BlockEditor, EditorFrame, ElementId, ElementInfo, Page, RichTextEditor, SyntheticEvent,
};
use crate::types::Result;

/// Replace every child of `node` with a single text node
fn replace_text(node: &NodeRef, text: &str) {
    for child in node.children().collect::<Vec<_>>() {
        child.detach();
    }
    node.append(NodeRef::new_text(text));
}

fn has_class(node: &NodeRef, class: &str) -> bool {
    node.as_element().is_some_and(|element| {
        element
            .attributes
            .borrow()
            .get("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    })
}

// =============================================================================
// Editor widgets
// =============================================================================

/// Visual editor; writes go to the source textarea it saves into
struct VisualEditor {
    hidden: bool,
    textarea: Option<NodeRef>,
}

impl RichTextEditor for VisualEditor {
    fn is_hidden(&self) -> bool {
        self.hidden
    }

    fn set_content(&mut self, html: &str) {
        if let Some(textarea) = &self.textarea {
            replace_text(textarea, html);
        }
    }

    // A saved page has no caret to move
    fn focus(&mut self) {}
}

/// Editor iframe whose document is inlined as `srcdoc`
struct FrameDocument {
    iframe: NodeRef,
}

impl EditorFrame for FrameDocument {
    fn body_html(&self) -> Option<String> {
        let element = self.iframe.as_element()?;
        let attributes = element.attributes.borrow();
        attributes.get("srcdoc").map(str::to_string)
    }

    fn set_body_html(&mut self, html: &str) -> bool {
        let Some(element) = self.iframe.as_element() else {
            return false;
        };
        let mut attributes = element.attributes.borrow_mut();
        if !attributes.contains("srcdoc") {
            return false;
        }
        attributes.insert("srcdoc", html.to_string());
        true
    }
}

/// Block editor store, mirrored into the code editor textarea
struct BlockEditorStore {
    textarea: Option<NodeRef>,
    content: String,
}

impl BlockEditor for BlockEditorStore {
    fn edited_content(&self) -> String {
        self.content.clone()
    }

    fn edit_post_content(&mut self, content: &str) {
        self.content = content.to_string();
        if let Some(textarea) = &self.textarea {
            replace_text(textarea, content);
        }
    }
}

// =============================================================================
// Page
// =============================================================================

/// Dispatched event with its target element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub target: ElementId,
    pub event: SyntheticEvent,
}

/// Product editor page held in memory
pub struct MemoryPage {
    document: NodeRef,
    /// Every element in document order; the index is its [`ElementId`]
    elements: Vec<NodeRef>,
    rich_text: Option<Box<dyn RichTextEditor>>,
    frame: Option<Box<dyn EditorFrame>>,
    block_editor: Option<Box<dyn BlockEditor>>,
    events: Vec<RecordedEvent>,
    focused: Option<ElementId>,
}

impl std::fmt::Debug for MemoryPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryPage")
            .field("elements", &self.elements.len())
            .field("rich_text_editor", &self.rich_text.is_some())
            .field("editor_frame", &self.frame.is_some())
            .field("block_editor", &self.block_editor.is_some())
            .field("events", &self.events.len())
            .finish()
    }
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::from_html("")
    }
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a page; malformed markup is repaired the way browsers do
    pub fn from_html(html: &str) -> Self {
        let document = kuchikiki::parse_html().one(html);
        let elements: Vec<NodeRef> = document
            .descendants()
            .elements()
            .map(|element| element.as_node().clone())
            .collect();

        let select = |selector: &str| {
            document
                .select_first(selector)
                .ok()
                .map(|element| element.as_node().clone())
        };

        let rich_text = select("#wp-content-wrap").map(|wrap| {
            Box::new(VisualEditor {
                hidden: !has_class(&wrap, "tmce-active"),
                textarea: select("textarea#content"),
            }) as Box<dyn RichTextEditor>
        });

        let frame = select("iframe#content_ifr")
            .map(|iframe| Box::new(FrameDocument { iframe }) as Box<dyn EditorFrame>);

        let block_editor = select("body.block-editor-page").map(|_| {
            let textarea = select("textarea.editor-post-text-editor");
            Box::new(BlockEditorStore {
                content: textarea
                    .as_ref()
                    .map(NodeRef::text_contents)
                    .unwrap_or_default(),
                textarea,
            }) as Box<dyn BlockEditor>
        });

        debug!(
            elements = elements.len(),
            rich_text_editor = rich_text.is_some(),
            editor_frame = frame.is_some(),
            block_editor = block_editor.is_some(),
            "Parsed page"
        );

        Self {
            document,
            elements,
            rich_text,
            frame,
            block_editor,
            events: Vec::new(),
            focused: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading page from: {}", path.display());
        Ok(Self::from_html(&fs::read_to_string(path)?))
    }

    /// Serialize the current document
    pub fn to_html(&self) -> String {
        self.document.to_string()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_html())?;
        debug!("Saved page to: {}", path.display());
        Ok(())
    }

    /// Replace the visual editor, e.g. with a live browser binding
    pub fn with_rich_text(mut self, editor: impl RichTextEditor + 'static) -> Self {
        self.rich_text = Some(Box::new(editor));
        self
    }

    pub fn with_frame(mut self, frame: impl EditorFrame + 'static) -> Self {
        self.frame = Some(Box::new(frame));
        self
    }

    pub fn with_block_editor(mut self, editor: impl BlockEditor + 'static) -> Self {
        self.block_editor = Some(Box::new(editor));
        self
    }

    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Events dispatched to one element, in order
    pub fn events_for(&self, id: ElementId) -> Vec<&SyntheticEvent> {
        self.events
            .iter()
            .filter(|e| e.target == id)
            .map(|e| &e.event)
            .collect()
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    /// Nodes removed by a text replacement keep their id but leave the tree
    fn attached(&self, id: ElementId) -> Option<&NodeRef> {
        let node = self.elements.get(id)?;
        let root = node.inclusive_ancestors().last()?;
        (root == self.document).then_some(node)
    }
}

impl Page for MemoryPage {
    fn query_selector(&self, selector: &str) -> Option<ElementId> {
        let Ok(selectors) = Selectors::compile(selector) else {
            debug!(selector, "Ignoring selector that does not parse");
            return None;
        };
        (0..self.elements.len()).find(|&id| {
            self.attached(id)
                .and_then(|node| node.clone().into_element_ref())
                .is_some_and(|element| selectors.matches(&element))
        })
    }

    fn element(&self, id: ElementId) -> Option<ElementInfo> {
        let node = self.attached(id)?;
        let element = node.as_element()?;
        let tag = element.name.local.to_string();
        let attributes: BTreeMap<String, String> = element
            .attributes
            .borrow()
            .map
            .iter()
            .map(|(name, attribute)| (name.local.to_string(), attribute.value.clone()))
            .collect();

        let text = if tag == "input" {
            attributes.get("value").cloned().unwrap_or_default()
        } else {
            node.text_contents()
        };

        Some(ElementInfo {
            tag,
            attributes,
            text,
        })
    }

    fn set_text(&mut self, id: ElementId, text: &str) {
        let Some(node) = self.attached(id) else {
            return;
        };
        let Some(element) = node.as_element() else {
            return;
        };
        if &*element.name.local == "input" {
            element
                .attributes
                .borrow_mut()
                .insert("value", text.to_string());
        } else {
            replace_text(node, text);
        }
    }

    fn focus(&mut self, id: ElementId) {
        if self.attached(id).is_some() {
            self.focused = Some(id);
        }
    }

    fn dispatch_event(&mut self, id: ElementId, event: SyntheticEvent) {
        self.events.push(RecordedEvent { target: id, event });
    }

    fn rich_text_editor(&self) -> Option<&dyn RichTextEditor> {
        self.rich_text.as_deref()
    }

    fn rich_text_editor_mut(&mut self) -> Option<&mut dyn RichTextEditor> {
        self.rich_text
            .as_mut()
            .map(|editor| editor.as_mut() as &mut dyn RichTextEditor)
    }

    fn editor_frame(&self) -> Option<&dyn EditorFrame> {
        self.frame.as_deref()
    }

    fn editor_frame_mut(&mut self) -> Option<&mut dyn EditorFrame> {
        self.frame
            .as_mut()
            .map(|frame| frame.as_mut() as &mut dyn EditorFrame)
    }

    fn block_editor(&self) -> Option<&dyn BlockEditor> {
        self.block_editor.as_deref()
    }

    fn block_editor_mut(&mut self) -> Option<&mut dyn BlockEditor> {
        self.block_editor
            .as_mut()
            .map(|editor| editor.as_mut() as &mut dyn BlockEditor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CLASSIC: &str = r#"<!DOCTYPE html>
<html><body class="post-type-product">
  <input type="text" id="title" name="post_title" value="Collar">
  <div id="wp-content-wrap" class="wp-core-ui wp-editor-wrap html-active">
    <iframe id="content_ifr" srcdoc="<p>Talla: M.</p>"></iframe>
    <textarea id="content" class="wp-editor-area" name="content">Talla: M.</textarea>
  </div>
  <div id="postimagediv"><div class="inside"><img src="https://example.com/collar.jpg"></div></div>
</body></html>"#;

    #[test]
    fn test_editors_detected_from_markup() {
        let page = MemoryPage::from_html(CLASSIC);
        assert!(page.rich_text_editor().unwrap().is_hidden());
        assert_eq!(
            page.editor_frame().unwrap().body_html().as_deref(),
            Some("<p>Talla: M.</p>")
        );
        assert!(page.block_editor().is_none());

        let visual =
            MemoryPage::from_html(r#"<div id="wp-content-wrap" class="tmce-active"></div>"#);
        assert!(!visual.rich_text_editor().unwrap().is_hidden());
    }

    #[test]
    fn test_query_selector_uses_css() {
        let page = MemoryPage::from_html(CLASSIC);
        let title = page.query_selector("#title").unwrap();
        assert_eq!(page.element(title).unwrap().text, "Collar");
        assert_eq!(page.find("textarea.wp-editor-area").unwrap().text, "Talla: M.");
        assert_eq!(
            page.find("#postimagediv img").unwrap().attr("src"),
            Some("https://example.com/collar.jpg")
        );
        assert_eq!(page.query_selector("input[name=\"post_name\"]"), None);
        assert_eq!(page.query_selector("[[broken"), None);
    }

    #[test]
    fn test_set_text_on_inputs_and_nodes() {
        let mut page = MemoryPage::from_html(
            r#"<input id="post_name"><span id="editable-post-name"><b>viejo</b></span>"#,
        );
        let input = page.query_selector("#post_name").unwrap();
        page.set_text(input, "collar-perro");
        assert_eq!(
            page.element(input).unwrap().attr("value"),
            Some("collar-perro")
        );

        let span = page.query_selector("#editable-post-name").unwrap();
        page.set_text(span, "collar-perro");
        assert_eq!(page.element(span).unwrap().text, "collar-perro");
        // the replaced <b> is gone from the tree
        assert_eq!(page.query_selector("#editable-post-name b"), None);
        assert_eq!(page.query_selector("b"), None);
    }

    #[test]
    fn test_frame_without_srcdoc_is_not_reachable() {
        let mut page = MemoryPage::from_html(
            r#"<iframe id="content_ifr" src="https://cdn.example/editor"></iframe>"#,
        );
        let frame = page.editor_frame_mut().unwrap();
        assert_eq!(frame.body_html(), None);
        assert!(!frame.set_body_html("<p>x</p>"));
    }

    #[test]
    fn test_block_editor_mirrors_code_editor() {
        let mut page = MemoryPage::from_html(
            r#"<body class="block-editor-page"><textarea class="editor-post-text-editor">Peso: 1 kg.</textarea></body>"#,
        );
        assert_eq!(page.block_editor().unwrap().edited_content(), "Peso: 1 kg.");
        page.block_editor_mut().unwrap().edit_post_content("<p>nuevo</p>");
        assert_eq!(
            page.find(".editor-post-text-editor").unwrap().text,
            "<p>nuevo</p>"
        );
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.html");
        let mut page = MemoryPage::from_html(CLASSIC);
        let title = page.query_selector("#title").unwrap();
        page.set_text(title, "Collar ajustable");
        page.rich_text_editor_mut().unwrap().set_content("<h2>Collar</h2>");
        page.dispatch_event(title, SyntheticEvent::change());
        page.save(&path).unwrap();

        let reloaded = MemoryPage::load(&path).unwrap();
        assert_eq!(reloaded.find("#title").unwrap().text, "Collar ajustable");
        assert_eq!(reloaded.find("#content").unwrap().text, "<h2>Collar</h2>");
        assert!(reloaded.events().is_empty());
    }
}
