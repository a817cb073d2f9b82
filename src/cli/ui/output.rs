use console::style;

use crate::page::{EditorDiagnostics, InjectionReport};
use crate::types::{GenerationMetadata, ProductSnapshot, SeoResult};

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    fn field(&self, name: &str, value: &str) {
        let shown = if value.is_empty() {
            style("(empty)".to_string()).dim()
        } else {
            style(value.to_string())
        };
        println!("  {:<18} {}", style(name).cyan(), shown);
    }

    pub fn snapshot(&self, snapshot: &ProductSnapshot) {
        self.section("Product");
        self.field("title", &snapshot.title);
        self.field("ingredients", &snapshot.ingredients);
        self.field("size", &snapshot.size);
        self.field("imageUrl", &snapshot.image_url);
        self.field(
            "description",
            &format!("{} chars", snapshot.description.chars().count()),
        );
    }

    pub fn result(&self, result: &SeoResult, metadata: &GenerationMetadata) {
        self.section(&format!("Generated with {}", metadata.label()));
        for (field, value) in result.fields() {
            self.field(field.as_str(), value);
        }
        println!(
            "\n  {}",
            style(format!("generated at {}", metadata.generated_at.to_rfc3339())).dim()
        );
    }

    pub fn report(&self, report: &InjectionReport) {
        self.section("Injection");
        for outcome in &report.outcomes {
            match (&outcome.strategy, &outcome.error) {
                (Some(strategy), _) => {
                    self.success(&format!("{:<16} via {}", outcome.field.as_str(), strategy))
                }
                (None, Some(error)) => {
                    self.warning(&format!("{:<16} {}", outcome.field.as_str(), error))
                }
                (None, None) => {}
            }
        }
        println!(
            "\n  {}/{} fields applied",
            report.applied_count(),
            report.outcomes.len()
        );
    }

    pub fn diagnostics(&self, diagnostics: &EditorDiagnostics) {
        let mark = |present: bool| {
            if present {
                style("✓").green()
            } else {
                style("✗").red()
            }
        };

        self.section("Editors");
        println!(
            "  {} rich-text editor{}",
            mark(diagnostics.rich_text_editor),
            if diagnostics.rich_text_editor_hidden {
                " (hidden)"
            } else {
                ""
            }
        );
        println!(
            "  {} editor iframe{}",
            mark(diagnostics.editor_frame),
            if diagnostics.editor_frame && !diagnostics.editor_frame_accessible {
                " (not accessible)"
            } else {
                ""
            }
        );
        println!("  {} block editor", mark(diagnostics.block_editor));

        self.section("Elements");
        for element in &diagnostics.elements {
            println!("  {} {}", mark(element.found), element.selector);
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
