//! Error types for form rendering

use thiserror::Error;

use mediform_ooxml::OoxmlError;

/// Errors that can occur while reading form input or rendering the form
#[derive(Error, Debug)]
pub enum FormError {
    /// The document model rejected an operation
    #[error("Document error: {0}")]
    Document(#[from] OoxmlError),

    /// Form input is not valid JSON or carries unknown fields
    #[error("Invalid form values: {0}")]
    Values(#[from] serde_json::Error),

    /// A field holds a character that cannot be written to a document
    #[error("Invalid form values: {field} contains U+{codepoint:04X}, which a document cannot hold")]
    InvalidCharacter { field: &'static str, codepoint: u32 },

    /// Error reading input or writing output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for form operations
pub type Result<T> = std::result::Result<T, FormError>;
