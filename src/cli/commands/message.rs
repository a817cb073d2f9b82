//! Message Command
//!
//! Answer one protocol message read from stdin and print the response.
//! `generate_seo` goes to the background handler; page actions need a page.
//!
//! Usage:
//!   echo '{"action":"GET_PRODUCT_DATA"}' | wooseo message --page product.html

use std::path::PathBuf;

use crate::cli::util::{CommandContext, ProviderOverrides, open_page, output_path, read_stdin};
use crate::messaging::{BackgroundHandler, ContentHandler, Request, Response};
use crate::types::{Result, SeoError};

#[derive(Debug, Clone, Default)]
pub struct MessageOptions {
    pub page: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub overrides: ProviderOverrides,
    /// Save the page after page-side actions
    pub write: bool,
    pub output: Option<PathBuf>,
}

pub async fn run(options: MessageOptions) -> Result<()> {
    let raw = read_stdin()?;
    let response = respond(&raw, options).await?;
    println!("{}", response.to_json()?);
    Ok(())
}

/// Route one raw message to the handler that owns it
pub async fn respond(raw: &str, options: MessageOptions) -> Result<Response> {
    let Some(request) = Request::parse(raw) else {
        return Ok(Response::invalid());
    };

    if request.is_background() {
        let ctx = CommandContext::load(options.config.as_deref(), &options.overrides)?;
        return Ok(BackgroundHandler::new(ctx.config).handle(request).await);
    }

    let page_path = options.page.ok_or_else(|| {
        SeoError::Config("This action needs a saved page (--page)".to_string())
    })?;
    let mut page = open_page(&page_path)?;
    let response = ContentHandler::new(&mut page).handle(request);

    if options.write {
        page.save(&output_path(&page_path, options.output))?;
    }
    Ok(response)
}
