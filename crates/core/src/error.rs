//! Error types for the pageport PDF parsing library.

use thiserror::Error;

/// Primary error type for PDF parsing operations.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed xref table: {0}")]
    MalformedXref(String),

    #[error("bad /Root entry: {0}")]
    MissingRoot(&'static str),

    #[error("bad /Pages entry: {0}")]
    MissingPages(&'static str),

    #[error("bad /Kids entry: {0}")]
    MissingKids(&'static str),

    #[error("document is encrypted")]
    Encrypted,

    #[error("object {number} {generation} not found")]
    ObjectNotFound { number: u32, generation: u32 },

    #[error("{filter} decode failed: {reason}")]
    FilterDecode { filter: String, reason: String },

    #[error("page {0} out of range")]
    PageOutOfRange(usize),

    #[error("type error: expected {expected}, got {got}")]
    TypeError {
        expected: &'static str,
        got: &'static str,
    },

    #[error("PDF syntax error: {0}")]
    SyntaxError(String),
}

/// Convenience Result type alias for PdfError.
pub type Result<T> = std::result::Result<T, PdfError>;
