//! Generate Command
//!
//! Extract the product from a saved page, generate SEO metadata and
//! optionally inject it back.
//!
//! Usage:
//!   wooseo generate <PAGE> [--provider openai] [--model gpt-4o] [--apply] [--write [-o OUT]]

use std::path::PathBuf;

use tracing::info;

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, ProviderOverrides, open_page, output_path};
use crate::generation::Orchestrator;
use crate::messaging::Response;
use crate::page::{apply_all, extract};
use crate::types::Result;

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub page: PathBuf,
    pub config: Option<PathBuf>,
    pub overrides: ProviderOverrides,
    /// Inject the result into the page
    pub apply: bool,
    /// Save the modified page (implies `apply`)
    pub write: bool,
    pub output: Option<PathBuf>,
    pub format: String,
}

pub async fn run(options: GenerateOptions) -> Result<()> {
    let ctx = CommandContext::load(options.config.as_deref(), &options.overrides)?;
    let output = Output::new();
    let json_output = options.format == "json";

    let mut page = open_page(&options.page)?;
    let snapshot = extract(&page);
    if snapshot.is_empty() && !json_output {
        output.warning("No title or description found; the prompt will be mostly empty");
    }

    let orchestrator = Orchestrator::new(ctx.config.retry.clone());
    let generation = orchestrator.run(&snapshot, &ctx.config.llm).await?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&Response::from(generation.clone()))?
        );
    } else {
        output.result(&generation.result, &generation.metadata);
    }

    if options.apply || options.write {
        let report = apply_all(&mut page, &generation.result);
        if !json_output {
            output.report(&report);
        }

        if options.write {
            let target = output_path(&options.page, options.output);
            page.save(&target)?;
            info!("Page written to {}", target.display());
            if !json_output {
                output.success(&format!("Saved {}", target.display()));
            }
        }
    }

    Ok(())
}
