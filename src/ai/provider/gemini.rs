//! Gemini API Provider
//!
//! Calls `models/{model}:generateContent` with the key as a query parameter
//! and a response schema requiring the seven SEO keys as strings.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{
    LlmProvider, LlmResponse, ProviderSettings, ResponseMetadata, ResponseTiming, TokenUsage,
};
use crate::constants::{HEALTH_CHECK_PROMPT, gemini as gemini_constants};
use crate::types::{ApiError, Result, SeoError, SeoField, SeoResult};

/// Gemini API Provider with secure API key handling
pub struct GeminiProvider {
    api_key: SecretString,
    api_base: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiProvider {
    pub fn new(api_key: &str, settings: &ProviderSettings) -> Result<Self> {
        let api_base = settings
            .api_base
            .clone()
            .unwrap_or_else(|| gemini_constants::DEFAULT_API_BASE.to_string());

        let model = if settings.model.trim().is_empty() {
            gemini_constants::DEFAULT_MODEL.to_string()
        } else {
            settings.model.clone()
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| SeoError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key.to_string()),
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    fn build_request(prompt: &str, structured: bool) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: structured.then(|| GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            }),
        }
    }

    async fn post(&self, request: &GenerateContentRequest) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.expose_secret())])
            .json(request)
            .send()
            .await?)
    }
}

/// Object schema with every SEO key declared as a required string
fn response_schema() -> Value {
    let properties: serde_json::Map<String, Value> = SeoField::ALL
        .iter()
        .map(|field| (field.as_str().to_string(), json!({ "type": "STRING" })))
        .collect();
    let required: Vec<&str> = SeoField::ALL.iter().map(SeoField::as_str).collect();

    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
    })
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<LlmResponse> {
        info!("Generating with Gemini (model: {})", self.model);

        let start_time = Instant::now();
        let request = Self::build_request(prompt, true);

        debug!(model = %self.model, "Sending request to Gemini API");
        let response = self.post(&request).await?;

        let status = response.status();
        if !status.is_success() {
            let message = status.canonical_reason().unwrap_or("Unknown status");
            return Err(ApiError::new(status.as_u16(), message).into());
        }

        let body = response.text().await?;
        let elapsed = start_time.elapsed();

        let response_body: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            SeoError::malformed(format!("unexpected Gemini response format: {}", e))
        })?;

        let usage = response_body
            .usage_metadata
            .map(|u| TokenUsage::from_gemini(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        let text = response_body
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            .ok_or_else(|| SeoError::malformed("Gemini response contains no candidate text"))?;

        let result = SeoResult::parse_payload(text)?;

        Ok(LlmResponse {
            result,
            usage,
            timing: ResponseTiming::from_duration(elapsed),
            metadata: ResponseMetadata {
                model: self.model.clone(),
                provider: self.name().to_string(),
            },
        })
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        let request = Self::build_request(HEALTH_CHECK_PROMPT, false);

        match self.post(&request).await {
            Ok(resp) if resp.status().is_success() => {
                info!("Gemini API is available");
                Ok(true)
            }
            Ok(resp) => {
                warn!("Gemini API check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Gemini API check failed: {}", e);
                Ok(false)
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL: &str = "gemini-2.5-flash-preview-05-20";

    fn provider_for(server: &MockServer) -> GeminiProvider {
        let settings = ProviderSettings {
            api_key: None,
            model: MODEL.to_string(),
            api_base: Some(server.uri()),
            timeout_secs: 5,
        };
        GeminiProvider::new("AIza-test", &settings).unwrap()
    }

    fn candidate_body(text: &str) -> Value {
        json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}],
            "usageMetadata": {"promptTokenCount": 300, "candidatesTokenCount": 150}
        })
    }

    fn seo_payload() -> String {
        json!({
            "title": "Arena sanitaria aglomerante 10 kg para gatos",
            "html_description": "<h2>Arena aglomerante</h2><p>Control de olores.</p>",
            "focus_keyword": "arena sanitaria aglomerante para gatos",
            "seo_title": "arena sanitaria aglomerante para gatos | Golfitos Petshop",
            "slug": "arena-sanitaria-aglomerante-gatos-10kg",
            "seo_description": "arena sanitaria aglomerante para gatos con control de olores.",
            "image_alt": "Saco de arena sanitaria aglomerante de 10 kg"
        })
        .to_string()
    }

    #[test]
    fn test_schema_requires_all_fields() {
        let schema = response_schema();
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["required"].as_array().unwrap().len(), 7);
        assert_eq!(schema["properties"]["image_alt"]["type"], "STRING");
    }

    #[test]
    fn test_request_uses_camel_case_config() {
        let request = serde_json::to_value(GeminiProvider::build_request("hola", true)).unwrap();
        assert_eq!(request["contents"][0]["role"], "user");
        assert_eq!(request["contents"][0]["parts"][0]["text"], "hola");
        assert_eq!(
            request["generationConfig"]["responseMimeType"],
            "application/json"
        );

        let plain = serde_json::to_value(GeminiProvider::build_request("hola", false)).unwrap();
        assert!(plain.get("generationConfig").is_none());
    }

    #[tokio::test]
    async fn test_generate_parses_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/models/{}:generateContent", MODEL)))
            .and(query_param("key", "AIza-test"))
            .and(body_partial_json(
                json!({"generationConfig": {"responseMimeType": "application/json"}}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(&seo_payload())))
            .expect(1)
            .mount(&server)
            .await;

        let response = provider_for(&server).generate("prompt").await.unwrap();
        assert_eq!(response.result.slug, "arena-sanitaria-aglomerante-gatos-10kg");
        assert_eq!(response.usage.input_tokens, 300);
        assert_eq!(response.metadata.model, MODEL);
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = provider_for(&server).generate("prompt").await.unwrap_err();
        match err {
            SeoError::Api(api) => {
                assert_eq!(api.status, 429);
                assert_eq!(api.message, "Too Many Requests");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_text_that_is_not_json_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(candidate_body("Aquí tienes el SEO")),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server).generate("prompt").await.unwrap_err();
        assert!(matches!(err, SeoError::MalformedResult(_)));
    }

    #[tokio::test]
    async fn test_missing_candidates_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let err = provider_for(&server).generate("prompt").await.unwrap_err();
        assert!(matches!(err, SeoError::MalformedResult(ref m) if m.contains("candidate")));
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("key", "AIza-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("OK")))
            .mount(&server)
            .await;
        assert!(provider_for(&server).health_check().await.unwrap());

        let failing = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&failing)
            .await;
        assert!(!provider_for(&failing).health_check().await.unwrap());
    }
}
