//! Background message handler: runs generation requests.

use tracing::{error, info};

use super::{Request, Response};
use crate::ai::provider::SharedProvider;
use crate::config::Config;
use crate::generation::Orchestrator;
use crate::types::{Generation, ProductSnapshot, Result};

/// Answers `generate_seo` with the configured provider
pub struct BackgroundHandler {
    config: Config,
    orchestrator: Orchestrator,
    provider: Option<SharedProvider>,
}

impl BackgroundHandler {
    pub fn new(config: Config) -> Self {
        let orchestrator = Orchestrator::new(config.retry.clone());
        Self {
            config,
            orchestrator,
            provider: None,
        }
    }

    /// Use a prebuilt provider instead of one created from the config
    pub fn with_provider(mut self, provider: SharedProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub async fn generate(&self, snapshot: &ProductSnapshot) -> Result<Generation> {
        match &self.provider {
            Some(provider) => {
                self.orchestrator
                    .run_with_provider(provider.as_ref(), snapshot, &self.config.llm)
                    .await
            }
            None => self.orchestrator.run(snapshot, &self.config.llm).await,
        }
    }

    pub async fn handle(&self, request: Request) -> Response {
        let Request::GenerateSeo { data } = request else {
            return Response::invalid();
        };

        match self.generate(&data).await {
            Ok(generation) => {
                info!(source = %generation.metadata.label(), "Generation answered");
                generation.into()
            }
            Err(e) => {
                error!("Generation request failed: {}", e);
                Response::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}
