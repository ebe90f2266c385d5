//! # mediform-core
//!
//! Renders the mediation application form ("FORM ‘A’") as a DOCX document.
//!
//! The form is a fixed two-paragraph header followed by a 17 × 3 table of
//! applicant, opposite-party and dispute details. Layout is constant data
//! ([`layout`]); only the party details vary between renders.
//!
//! ## Example
//!
//! ```
//! use mediform_core::{render_document, FormValues, StyleProfile};
//!
//! let values = FormValues::from_json(r#"{"APPLICANT_NAME": "HARSH KUMAR"}"#)?;
//! let doc = render_document(&StyleProfile::default(), &values)?;
//!
//! let table = doc.tables().next().unwrap();
//! assert_eq!(table.cell(1, 2)?.text(), "HARSH KUMAR");
//! # Ok::<(), mediform_core::FormError>(())
//! ```

pub mod error;
pub mod formatter;
pub mod header;
pub mod layout;
pub mod render;
pub mod style;
pub mod table;
pub mod values;

pub use error::{FormError, Result};
pub use formatter::{CellFormatter, ParagraphFormat};
pub use header::HeaderWriter;
pub use layout::{HeightKey, MergeRule, RowHeights, RowRole};
pub use render::{render_docx, render_document, write_docx, DOCUMENT_TITLE};
pub use style::StyleProfile;
pub use table::TableRenderer;
pub use values::{ContactKind, FormFields, FormValues, Party, PartyDetails, PLACEHOLDER};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
