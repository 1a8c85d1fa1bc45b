//! crates/code_docs_core/src/export.rs
//!
//! Materializes a documentation result as a downloadable markdown file.

use chrono::NaiveDate;

/// A file ready to hand to the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content: String,
}

impl ExportArtifact {
    pub const MEDIA_TYPE: &'static str = "text/markdown; charset=utf-8";

    pub fn new(markdown: &str, date: NaiveDate) -> Self {
        Self {
            file_name: export_file_name(date),
            content: markdown.to_string(),
        }
    }
}

/// `documentation-YYYY-MM-DD.md`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("documentation-{}.md", date.format("%Y-%m-%d"))
}
