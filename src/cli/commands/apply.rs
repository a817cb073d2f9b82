//! Apply Command
//!
//! Inject a saved generation result (or one field of it) into a saved page.
//!
//! Usage:
//!   wooseo apply <PAGE> <RESULT|-> [--field slug] [--write [-o OUT]]

use std::path::PathBuf;

use crate::cli::ui::Output;
use crate::cli::util::{open_page, output_path, read_result};
use crate::page::{InjectionReport, apply, apply_all};
use crate::types::{Result, SeoError, SeoField};

#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    pub page: PathBuf,
    pub result: PathBuf,
    pub field: Option<String>,
    pub write: bool,
    pub output: Option<PathBuf>,
}

pub fn run(options: ApplyOptions) -> Result<()> {
    let output = Output::new();
    let mut page = open_page(&options.page)?;
    let result = read_result(&options.result)?;

    match options.field.as_deref() {
        Some(name) => {
            let field: SeoField = name.parse()?;
            match apply(&mut page, field, result.get(field)) {
                Ok(applied) => {
                    output.success(&format!("{} applied via {}", field, applied.strategy))
                }
                Err(e @ SeoError::FieldProtected { .. }) => {
                    output.warning(&e.to_string());
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
        None => {
            let report: InjectionReport = apply_all(&mut page, &result);
            output.report(&report);
        }
    }

    if options.write {
        let target = output_path(&options.page, options.output);
        page.save(&target)?;
        output.success(&format!("Saved {}", target.display()));
    }
    Ok(())
}
