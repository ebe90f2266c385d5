//! # mediform-ooxml
//!
//! A small Office Open XML (WordprocessingML) layer for mediform.
//!
//! This crate provides functionality to:
//! - Build a single-section document of paragraphs and tables in memory
//! - Merge table cells, size grid columns and set minimum row heights
//! - Write the document as a DOCX package
//! - Read a generated package back for inspection
//!
//! ## Example: Writing a Table
//!
//! ```
//! use mediform_ooxml::{Document, DocxWriter, HeightRule, Length};
//!
//! let mut doc = Document::new();
//! let table = doc.add_table(2, 3);
//! table.merge(0, 0, 2)?;
//! table.set_row_height(1, Length::inches(0.5), HeightRule::AtLeast)?;
//! table.cell_mut(1, 2)?.first_paragraph_mut().add_run("value");
//!
//! let bytes = DocxWriter::new().generate(&doc)?;
//! let parsed = mediform_ooxml::Document::parse(
//!     mediform_ooxml::OoxmlArchive::from_reader(std::io::Cursor::new(bytes))?.document_xml()?,
//! )?;
//! assert_eq!(parsed.tables().count(), 1);
//! # Ok::<(), mediform_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod document;
pub mod error;
pub mod reader;
pub mod units;
pub mod writer;

pub use archive::OoxmlArchive;
pub use document::{
    Alignment, Block, Border, BorderStyle, Document, HeightRule, Paragraph, RowHeight, Run,
    RunProperties, SectionProperties, Spacing, Table, TableBorders, TableCell, TableRow,
    VerticalAlign,
};
pub use error::{OoxmlError, Result};
pub use units::{Length, RgbColor};
pub use writer::{is_xml_char, CoreProperties, DocxWriter, DOCUMENT_PATH};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
