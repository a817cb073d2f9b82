//! Extract Command
//!
//! Read the product snapshot from a saved product editor page.
//!
//! Usage:
//!   wooseo extract <PAGE> [-f json]

use std::path::Path;

use crate::cli::ui::Output;
use crate::cli::util::open_page;
use crate::page::extract;
use crate::types::Result;

pub fn run(page_path: &Path, format: &str) -> Result<()> {
    let page = open_page(page_path)?;
    let snapshot = extract(&page);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let output = Output::new();
    output.snapshot(&snapshot);
    if snapshot.is_empty() {
        output.warning("No title or description found on this page");
    }
    Ok(())
}
