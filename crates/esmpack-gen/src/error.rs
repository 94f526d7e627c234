//! Error types for parsing and code generation

use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while parsing or splicing JavaScript source
#[derive(Error, Debug, Diagnostic)]
pub enum GenError {
    /// The parser reported one or more syntax errors
    #[error("Failed to parse '{path}': {}", messages.join(", "))]
    #[diagnostic(code(esmpack::gen::parse_failed))]
    ParseFailed { path: String, messages: Vec<String> },

    /// Two edits touched overlapping source ranges
    #[error("Overlapping edit at {start}..{end} (previous edit ends at {cursor})")]
    #[diagnostic(
        code(esmpack::gen::overlapping_edit),
        help("edits must cover disjoint spans of the original source")
    )]
    OverlappingEdit { start: u32, end: u32, cursor: u32 },

    /// An edit pointed outside the source text
    #[error("Edit {start}..{end} is out of bounds for source of length {len}")]
    #[diagnostic(code(esmpack::gen::edit_out_of_bounds))]
    EditOutOfBounds { start: u32, end: u32, len: usize },
}

impl GenError {
    /// Create a ParseFailed error
    pub fn parse_failed(path: impl Into<String>, messages: Vec<String>) -> Self {
        Self::ParseFailed {
            path: path.into(),
            messages,
        }
    }
}

/// Result type for parse and codegen operations
pub type Result<T> = std::result::Result<T, GenError>;
