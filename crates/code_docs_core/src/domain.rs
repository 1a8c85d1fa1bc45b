//! crates/code_docs_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or serialization format.

use chrono::{DateTime, Utc};

/// File extensions the upload picker offers. Advisory only: the content of
/// any file is treated as opaque text.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "py", "java", "html", "css"];

/// Where the current source buffer came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceOrigin {
    #[default]
    Typed,
    File { file_name: String },
}

/// The code to be documented.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceCode {
    pub text: String,
    pub origin: SourceOrigin,
}

impl SourceCode {
    pub fn typed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: SourceOrigin::Typed,
        }
    }

    pub fn from_file(file_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: SourceOrigin::File {
                file_name: file_name.into(),
            },
        }
    }

    /// True when there is nothing but whitespace to submit.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Whether a file name carries one of the [`ACCEPTED_EXTENSIONS`].
pub fn has_accepted_extension(file_name: &str) -> bool {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Status of the in-flight or most recent generation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// The markdown text returned by the provider for one successful request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentationResult {
    pub markdown: String,
    pub generated_at: DateTime<Utc>,
}

impl DocumentationResult {
    pub fn new(markdown: String) -> Self {
        Self {
            markdown,
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_source_is_blank() {
        assert!(SourceCode::typed("").is_blank());
        assert!(SourceCode::typed(" \n\t ").is_blank());
        assert!(!SourceCode::typed("  fn main() {}  ").is_blank());
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(has_accepted_extension("app.tsx"));
        assert!(has_accepted_extension("Main.JAVA"));
        assert!(!has_accepted_extension("lib.rs"));
        assert!(!has_accepted_extension("Makefile"));
    }
}
