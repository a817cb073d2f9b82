//! Diagnose Command
//!
//! Report which editor variants and well-known fields a page exposes.

use std::path::Path;

use crate::cli::ui::Output;
use crate::cli::util::open_page;
use crate::page::diagnose_editors;
use crate::types::Result;

pub fn run(page_path: &Path, format: &str) -> Result<()> {
    let page = open_page(page_path)?;
    let diagnostics = diagnose_editors(&page);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&diagnostics)?);
    } else {
        Output::new().diagnostics(&diagnostics);
    }
    Ok(())
}
