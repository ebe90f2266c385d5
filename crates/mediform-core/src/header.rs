//! Title block above the form table

use mediform_ooxml::{Alignment, Document, Length};

use crate::formatter::{CellFormatter, ParagraphFormat};
use crate::style::StyleProfile;

/// Form title, printed bold
pub const FORM_TITLE: &str = "FORM ‘A’\nMEDIATION APPLICATION FORM\n[REFER RULE 3(1)]";

/// Issuing authority, printed below the title
pub const FORM_AUTHORITY: &str = "Mumbai District Legal Services Authority\nCity Civil Court, Mumbai";

/// Writes the two centered header paragraphs
///
/// Each [`HeaderWriter::write`] appends both paragraphs again; callers write
/// the header once per document.
#[derive(Debug, Clone, Copy)]
pub struct HeaderWriter<'a> {
    formatter: CellFormatter<'a>,
}

impl<'a> HeaderWriter<'a> {
    pub fn new(style: &'a StyleProfile) -> Self {
        Self {
            formatter: CellFormatter::new(style),
        }
    }

    pub fn write(&self, doc: &mut Document) {
        self.formatter.apply_paragraph(
            doc.add_paragraph(),
            FORM_TITLE,
            ParagraphFormat::aligned(Alignment::Center).bold(),
        );
        self.formatter.apply_paragraph(
            doc.add_paragraph(),
            FORM_AUTHORITY,
            ParagraphFormat::aligned(Alignment::Center).space_after(Length::inches(0.34)),
        );
    }
}
