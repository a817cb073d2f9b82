//! Test Connection Command
//!
//! Check that the configured key and model are accepted by the provider.

use std::path::Path;

use crate::ai::provider::create_provider;
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, ProviderOverrides};
use crate::types::{Result, SeoError};

pub async fn run(config_path: Option<&Path>, overrides: &ProviderOverrides) -> Result<()> {
    let ctx = CommandContext::load(config_path, overrides)?;
    let output = Output::new();

    let provider = create_provider(&ctx.config.llm)?;
    output.info(&format!(
        "Testing {} ({})...",
        provider.name(),
        provider.model()
    ));

    if provider.health_check().await? {
        output.success("Connection OK");
        Ok(())
    } else {
        Err(SeoError::Transport(format!(
            "{} rejected the test request; check the API key and model",
            provider.name()
        )))
    }
}
