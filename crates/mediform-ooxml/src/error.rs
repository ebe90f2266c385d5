//! Error types for OOXML operations

use thiserror::Error;

/// Errors that can occur while building, writing or reading a DOCX package
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// Error reading or writing the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Required part not found in the package
    #[error("Required file not found: {0}")]
    MissingFile(String),

    /// A row index past the end of the table
    #[error("Row {row} out of range (table has {rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },

    /// A grid column past the end of the table grid
    #[error("Column {col} out of range in row {row} (grid has {cols} columns)")]
    ColumnOutOfRange { row: usize, col: usize, cols: usize },

    /// A merge whose range is empty or overlaps an existing merged cell
    #[error("Invalid merge in row {row}: columns {from}..={to}")]
    InvalidMerge { row: usize, from: usize, to: usize },

    /// Text holding a character XML 1.0 cannot represent
    #[error("Character U+{codepoint:04X} cannot be written to a document")]
    InvalidCharacter { codepoint: u32 },

    /// Invalid document structure
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),
}

/// Result type for OOXML operations
pub type Result<T> = std::result::Result<T, OoxmlError>;
