//! OpenAI API Provider
//!
//! SEO generation through OpenAI's Chat Completions API in JSON-object mode.
//! The assistant message content is JSON text and is parsed a second time.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{
    LlmProvider, LlmResponse, ProviderSettings, ResponseMetadata, ResponseTiming, TokenUsage,
};
use crate::constants::{HEALTH_CHECK_PROMPT, openai as openai_constants};
use crate::types::{ApiError, Result, SeoError, SeoResult};

const SYSTEM_PROMPT: &str = "You are an e-commerce SEO assistant. Respond only with a valid JSON object containing exactly the requested keys. Do not add any text outside the JSON object.";

/// OpenAI API Provider with secure API key handling
pub struct OpenAiProvider {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(api_key: &str, settings: &ProviderSettings) -> Result<Self> {
        let api_base = settings
            .api_base
            .clone()
            .unwrap_or_else(|| openai_constants::DEFAULT_API_BASE.to_string());

        let model = if settings.model.trim().is_empty() {
            openai_constants::DEFAULT_MODEL.to_string()
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
        format!("{}/chat/completions", self.api_base)
    }

    fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: Some(openai_constants::TEMPERATURE),
            max_tokens: openai_constants::MAX_TOKENS,
            response_format: Some(ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        }
    }

    async fn post(&self, request: &ChatCompletionRequest) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose_secret())
            .json(request)
            .send()
            .await?)
    }
}

/// Build an `ApiError` from a failed response, keeping the body's
/// `error.message` when OpenAI sent one.
async fn api_error(response: reqwest::Response) -> ApiError {
    let status = response.status();
    let status_text = status.canonical_reason().unwrap_or("Unknown status");
    let body = response.text().await.unwrap_or_default();

    let embedded = serde_json::from_str::<ErrorEnvelope>(&body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|detail| detail.message)
        .filter(|message| !message.trim().is_empty());

    let message = match embedded {
        Some(detail) => format!("{} - {}", status_text, detail),
        None => status_text.to_string(),
    };
    ApiError::new(status.as_u16(), message)
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(&self, prompt: &str) -> Result<LlmResponse> {
        info!("Generating with OpenAI (model: {})", self.model);

        let start_time = Instant::now();
        let request = self.build_request(prompt);

        debug!(url = %self.endpoint(), "Sending request to OpenAI API");
        let response = self.post(&request).await?;

        if !response.status().is_success() {
            return Err(api_error(response).await.into());
        }

        let body = response.text().await?;
        let elapsed = start_time.elapsed();

        let response_body: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            SeoError::malformed(format!("unexpected OpenAI response format: {}", e))
        })?;

        let usage = response_body
            .usage
            .map(|u| TokenUsage::from_openai(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        let content = response_body
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or_else(|| SeoError::malformed("OpenAI response contains no message content"))?;

        debug!("Received response from OpenAI, parsing embedded JSON");
        let result = SeoResult::parse_payload(content)?;

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
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: HEALTH_CHECK_PROMPT.to_string(),
            }],
            temperature: None,
            max_tokens: openai_constants::HEALTH_CHECK_MAX_TOKENS,
            response_format: None,
        };

        match self.post(&request).await {
            Ok(resp) if resp.status().is_success() => {
                info!("OpenAI API is available");
                Ok(true)
            }
            Ok(resp) => {
                warn!("OpenAI API check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("OpenAI API check failed: {}", e);
                Ok(false)
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}
