//! Generation Orchestrator
//!
//! Builds the prompt for the active provider and calls it with exponential
//! backoff. Intermediate failures are logged and swallowed; when every
//! attempt fails the error of the final attempt is returned.

use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

use crate::ai::prompt::{render_prompt, resolve_template};
use crate::ai::provider::{LlmProvider, LlmResponse, ProviderConfig, create_provider};
use crate::config::RetryConfig;
use crate::types::{Generation, GenerationMetadata, ProductSnapshot, Result, SeoError};

/// Outcome of a single provider call
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub attempt: u32,
    pub success: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// Runs product snapshots through a provider with retry
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    retry: RetryConfig,
}

impl Orchestrator {
    pub fn new(retry: RetryConfig) -> Self {
        Self { retry }
    }

    /// Generate SEO metadata for one product.
    ///
    /// Fails with `MissingCredential` before any network traffic when the
    /// active provider has no key.
    #[instrument(skip_all, fields(provider = %config.provider, model = %config.model()))]
    pub async fn run(
        &self,
        snapshot: &ProductSnapshot,
        config: &ProviderConfig,
    ) -> Result<Generation> {
        let provider = create_provider(config)?;
        self.run_with_provider(provider.as_ref(), snapshot, config).await
    }

    /// Same as [`run`](Self::run) with an already constructed provider
    pub async fn run_with_provider(
        &self,
        provider: &dyn LlmProvider,
        snapshot: &ProductSnapshot,
        config: &ProviderConfig,
    ) -> Result<Generation> {
        config.require_api_key()?;

        let template = resolve_template(config);
        let prompt = render_prompt(template, snapshot);
        debug!(prompt_len = prompt.len(), "Prompt rendered");

        let (response, attempts) = self.generate_with_retry(provider, &prompt).await;
        let response = response?;

        info!(
            provider = provider.name(),
            attempts = attempts.len(),
            total_tokens = response.usage.total(),
            duration_ms = response.timing.total_ms,
            "SEO generation complete"
        );

        Ok(Generation {
            result: response.result,
            metadata: GenerationMetadata::now(provider.name(), provider.model()),
        })
    }

    /// Call the provider up to `max_attempts` times.
    ///
    /// Returns the final outcome together with a record of every attempt.
    pub async fn generate_with_retry(
        &self,
        provider: &dyn LlmProvider,
        prompt: &str,
    ) -> (Result<LlmResponse>, Vec<AttemptRecord>) {
        let max_attempts = self.retry.max_attempts.max(1);
        let max_delay = Duration::from_millis(self.retry.max_delay_ms);
        let mut current_delay = Duration::from_millis(self.retry.base_delay_ms).min(max_delay);
        let mut attempts = Vec::with_capacity(max_attempts as usize);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            let attempt_start = Instant::now();

            match provider.generate(prompt).await {
                Ok(response) => {
                    attempts.push(AttemptRecord {
                        attempt,
                        success: true,
                        error: None,
                        duration_ms: attempt_start.elapsed().as_millis() as u64,
                    });
                    return (Ok(response), attempts);
                }
                Err(err) => {
                    attempts.push(AttemptRecord {
                        attempt,
                        success: false,
                        error: Some(err.to_string()),
                        duration_ms: attempt_start.elapsed().as_millis() as u64,
                    });

                    if !err.is_retryable(self.retry.fail_fast_on_auth) {
                        error!(
                            provider = provider.name(),
                            attempt,
                            category = %err.category(),
                            error = %err,
                            "Generation failed, not retrying"
                        );
                        return (Err(err), attempts);
                    }

                    if attempt < max_attempts {
                        warn!(
                            provider = provider.name(),
                            attempt,
                            max_attempts,
                            delay_ms = current_delay.as_millis() as u64,
                            error = %err,
                            "Generation attempt failed, retrying"
                        );
                        sleep(current_delay).await;
                        current_delay =
                            calculate_backoff(current_delay, self.retry.factor, max_delay);
                    } else {
                        error!(
                            provider = provider.name(),
                            attempts = max_attempts,
                            error = %err,
                            "Generation failed after all attempts"
                        );
                    }

                    last_error = Some(err);
                }
            }
        }

        let err = last_error
            .unwrap_or_else(|| SeoError::Transport("generation was never attempted".to_string()));
        (Err(err), attempts)
    }
}

/// Next delay in the exponential schedule, never above `max`
fn calculate_backoff(current: Duration, factor: f32, max: Duration) -> Duration {
    let next = Duration::try_from_secs_f32(current.as_secs_f32() * factor).unwrap_or(max);
    std::cmp::min(next, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{ProviderKind, ResponseMetadata, ResponseTiming, TokenUsage};
    use crate::types::{ApiError, SeoResult};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    type Script = Box<dyn Fn(u32) -> Option<SeoError> + Send + Sync>;

    /// Provider whose script decides the error (if any) for each 1-based call
    struct ScriptedProvider {
        calls: AtomicU32,
        script: Script,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn scripted(script: impl Fn(u32) -> Option<SeoError> + Send + Sync + 'static) -> Self {
            Self {
                calls: AtomicU32::new(0),
                script: Box::new(script),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing(failures: u32) -> Self {
            Self::with_status(failures, 503)
        }

        fn with_status(failures: u32, status: u16) -> Self {
            Self::scripted(move |call| {
                (call <= failures)
                    .then(|| ApiError::new(status, format!("failure #{call}")).into())
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn sample_result() -> SeoResult {
        SeoResult {
            title: "Pelota de goma para perros".to_string(),
            html_description: "<h2>Pelota</h2>".to_string(),
            focus_keyword: "pelota de goma para perros".to_string(),
            seo_title: "pelota de goma para perros | Golfitos Petshop".to_string(),
            slug: "pelota-goma-perros".to_string(),
            seo_description: "pelota de goma para perros resistente.".to_string(),
            image_alt: "Pelota de goma roja para perros".to_string(),
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn generate(&self, prompt: &str) -> Result<LlmResponse> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.prompts.lock().unwrap().push(prompt.to_string());
            if let Some(err) = (self.script)(call) {
                return Err(err);
            }
            Ok(LlmResponse {
                result: sample_result(),
                usage: TokenUsage::default(),
                timing: ResponseTiming::default(),
                metadata: ResponseMetadata::default(),
            })
        }

        fn name(&self) -> &str {
            "gemini"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    fn config_with_key() -> ProviderConfig {
        let mut config = ProviderConfig::default();
        config.gemini.api_key = Some("AIza-test".to_string());
        config.prompt_template = Some("Producto: {title} ({size})".to_string());
        config
    }

    fn snapshot() -> ProductSnapshot {
        ProductSnapshot {
            title: "Pelota".to_string(),
            size: "mediana".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_failures_then_success() {
        let provider = ScriptedProvider::failing(2);
        let orchestrator = Orchestrator::default();
        let start = tokio::time::Instant::now();

        let generation = orchestrator
            .run_with_provider(&provider, &snapshot(), &config_with_key())
            .await
            .unwrap();

        assert_eq!(provider.calls(), 3);
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert_eq!(generation.result, sample_result());
        assert_eq!(generation.metadata.provider, "gemini");
        assert_eq!(generation.metadata.model, "scripted-model");
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_attempts_return_last_error() {
        let provider = ScriptedProvider::failing(u32::MAX);
        let orchestrator = Orchestrator::default();

        let err = orchestrator
            .run_with_provider(&provider, &snapshot(), &config_with_key())
            .await
            .unwrap_err();

        assert_eq!(provider.calls(), 3);
        assert!(err.to_string().contains("failure #3"), "got {err}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_records_and_schedule() {
        let provider = ScriptedProvider::failing(1);
        let orchestrator = Orchestrator::default();
        let start = tokio::time::Instant::now();

        let (result, attempts) = orchestrator.generate_with_retry(&provider, "p").await;
        assert!(result.is_ok());
        assert_eq!(attempts.len(), 2);
        assert!(!attempts[0].success);
        assert!(attempts[1].success);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(1) && elapsed < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_calls() {
        let provider = ScriptedProvider::failing(0);
        let mut config = config_with_key();
        config.gemini.api_key = None;

        let err = Orchestrator::default()
            .run_with_provider(&provider, &snapshot(), &config)
            .await
            .unwrap_err();

        assert!(matches!(err, SeoError::MissingCredential { .. }));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_run_without_key_fails_before_network() {
        let mut config = ProviderConfig::default();
        config.provider = ProviderKind::OpenAi;
        let err = Orchestrator::default()
            .run(&snapshot(), &config)
            .await
            .unwrap_err();
        assert!(
            matches!(err, SeoError::MissingCredential { ref provider } if provider == "openai")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_errors_retry_by_default() {
        let provider = ScriptedProvider::with_status(u32::MAX, 401);
        let _ = Orchestrator::default()
            .run_with_provider(&provider, &snapshot(), &config_with_key())
            .await;
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_fast_on_auth() {
        let provider = ScriptedProvider::with_status(u32::MAX, 403);
        let orchestrator = Orchestrator::new(RetryConfig {
            fail_fast_on_auth: true,
            ..Default::default()
        });

        let err = orchestrator
            .run_with_provider(&provider, &snapshot(), &config_with_key())
            .await
            .unwrap_err();

        assert_eq!(provider.calls(), 1);
        assert!(matches!(err, SeoError::Api(ref api) if api.status == 403));
    }

    #[tokio::test(start_paused = true)]
    async fn test_prompt_uses_configured_template() {
        let provider = ScriptedProvider::failing(0);
        Orchestrator::default()
            .run_with_provider(&provider, &snapshot(), &config_with_key())
            .await
            .unwrap();
        assert_eq!(
            provider.prompts.lock().unwrap().as_slice(),
            ["Producto: Pelota (mediana)".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_results_are_retried() {
        let provider = ScriptedProvider::scripted(|call| {
            (call <= 2).then(|| SeoError::malformed(format!("missing key slug (call {call})")))
        });
        let start = tokio::time::Instant::now();

        let generation = Orchestrator::default()
            .run_with_provider(&provider, &snapshot(), &config_with_key())
            .await
            .unwrap();

        assert_eq!(provider.calls(), 3);
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert_eq!(generation.result, sample_result());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failures_return_last_error() {
        let provider = ScriptedProvider::scripted(|call| {
            Some(SeoError::Transport(format!("connection reset #{call}")))
        });

        let err = Orchestrator::default()
            .run_with_provider(&provider, &snapshot(), &config_with_key())
            .await
            .unwrap_err();

        assert_eq!(provider.calls(), 3);
        assert!(matches!(err, SeoError::Transport(ref m) if m == "connection reset #3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delays_are_capped() {
        let provider = ScriptedProvider::failing(u32::MAX);
        let orchestrator = Orchestrator::new(RetryConfig {
            max_attempts: 4,
            base_delay_ms: 1_000,
            factor: 100.0,
            max_delay_ms: 5_000,
            ..Default::default()
        });
        let start = tokio::time::Instant::now();

        let (result, attempts) = orchestrator.generate_with_retry(&provider, "p").await;
        assert!(result.is_err());
        assert_eq!(attempts.len(), 4);
        // 1s, then 5s twice
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(11) && elapsed < Duration::from_secs(12));
    }

    #[test]
    fn test_calculate_backoff() {
        let max = Duration::from_secs(30);
        let next = calculate_backoff(Duration::from_millis(1000), 2.0, max);
        assert_eq!(next, Duration::from_millis(2000));
        assert_eq!(calculate_backoff(Duration::from_secs(20), 2.0, max), max);
    }

    #[test]
    fn test_calculate_backoff_handles_extreme_factors() {
        let max = Duration::from_secs(30);
        let current = Duration::from_secs(1);
        assert_eq!(calculate_backoff(current, f32::INFINITY, max), max);
        assert_eq!(calculate_backoff(current, f32::NAN, max), max);
        assert_eq!(calculate_backoff(current, 1e30, max), max);
    }
}
