//! Page-side message handler.

use tracing::{info, warn};

use super::{Request, Response};
use crate::page::{Page, apply, apply_all, diagnose_editors, extract};
use crate::types::{SeoField, SeoResult};

/// Answers page requests against one page
pub struct ContentHandler<'a> {
    page: &'a mut dyn Page,
}

impl<'a> ContentHandler<'a> {
    pub fn new(page: &'a mut dyn Page) -> Self {
        Self { page }
    }

    pub fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::GetProductData => Response::ProductData {
                product_data: extract(&*self.page),
            },
            Request::ApplyJson { data } => match SeoResult::from_value(&data) {
                Ok(result) => {
                    let report = apply_all(self.page, &result);
                    for failure in report.failures() {
                        warn!(
                            field = %failure.field,
                            error = failure.error.as_deref().unwrap_or_default(),
                            "Field not applied"
                        );
                    }
                    Response::ok()
                }
                Err(e) => Response::failure(e.to_string()),
            },
            Request::ApplySingleField { field, value } => {
                let field = match field.parse::<SeoField>() {
                    Ok(field) => field,
                    Err(e) => return Response::failure(e.to_string()),
                };
                if field == SeoField::HtmlDescription {
                    diagnose_editors(&*self.page);
                }
                match apply(self.page, field, &value) {
                    Ok(applied) => {
                        info!(%field, strategy = %applied.strategy, "Single field applied");
                        Response::ok()
                    }
                    Err(e) => Response::failure(format!("Could not apply field {}: {}", field, e)),
                }
            }
            Request::DebugEditors => {
                diagnose_editors(&*self.page);
                Response::ok()
            }
            Request::GenerateSeo { .. } => Response::invalid(),
        }
    }

    /// Parse and answer a raw message
    pub fn handle_raw(&mut self, raw: &str) -> Response {
        match Request::parse(raw) {
            Some(request) => self.handle(request),
            None => Response::invalid(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{MemoryPage, Page};
    use serde_json::json;

    fn page() -> MemoryPage {
        MemoryPage::from_html(
            r#"<input id="title" value="Rascador">
            <textarea id="content" class="wp-editor-area">Medida: 80 cm.</textarea>
            <input id="post_name">"#,
        )
    }

    fn payload() -> serde_json::Value {
        json!({
            "title": "Rascador de 80 cm para gatos",
            "html_description": "<h2>Rascador</h2>",
            "focus_keyword": "rascador para gatos",
            "seo_title": "rascador para gatos | Golfitos Petshop",
            "slug": "rascador-gatos-80cm",
            "seo_description": "rascador para gatos de 80 cm.",
            "image_alt": "Rascador beige de 80 cm"
        })
    }

    #[test]
    fn test_get_product_data() {
        let mut page = page();
        let response = ContentHandler::new(&mut page).handle(Request::GetProductData);
        match response {
            Response::ProductData { product_data } => {
                assert_eq!(product_data.title, "Rascador");
                assert_eq!(product_data.size, "80 cm");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_apply_json_succeeds_with_missing_widgets() {
        let mut page = page();
        let response =
            ContentHandler::new(&mut page).handle(Request::ApplyJson { data: payload() });
        assert_eq!(response, Response::ok());
        assert_eq!(page.find("#title").unwrap().text, "Rascador de 80 cm para gatos");
        assert_eq!(page.find("#post_name").unwrap().text, "rascador-gatos-80cm");
    }

    #[test]
    fn test_apply_json_rejects_incomplete_payload() {
        let mut page = page();
        let mut data = payload();
        data.as_object_mut().unwrap().remove("slug");
        let response = ContentHandler::new(&mut page).handle(Request::ApplyJson { data });
        assert!(matches!(response, Response::Status { success: false, .. }));
        assert_eq!(page.find("#title").unwrap().text, "Rascador");
    }

    #[test]
    fn test_apply_single_field() {
        let mut page = page();
        let mut handler = ContentHandler::new(&mut page);

        let ok = handler.handle_raw(r#"{"action":"APPLY_SINGLE_FIELD","field":"html_description","value":"<p>nuevo</p>"}"#);
        assert_eq!(ok, Response::ok());

        let missing = handler.handle(Request::ApplySingleField {
            field: "seo_title".to_string(),
            value: "x".to_string(),
        });
        match missing {
            Response::Status { success, error } => {
                assert!(!success);
                assert!(error.unwrap().contains("seo_title"));
            }
            other => panic!("unexpected {other:?}"),
        }

        let unknown = handler.handle(Request::ApplySingleField {
            field: "price".to_string(),
            value: "10".to_string(),
        });
        assert!(matches!(unknown, Response::Status { success: false, .. }));
        assert_eq!(page.find("#content").unwrap().text, "<p>nuevo</p>");
    }

    #[test]
    fn test_debug_and_invalid_messages() {
        let mut page = page();
        let mut handler = ContentHandler::new(&mut page);
        assert_eq!(handler.handle(Request::DebugEditors), Response::ok());
        assert_eq!(handler.handle_raw("{}"), Response::invalid());
        assert_eq!(
            handler.handle(Request::GenerateSeo {
                data: Default::default()
            }),
            Response::invalid()
        );
    }
}
