//! Whole-document rendering

use std::path::Path;

use mediform_ooxml::{CoreProperties, Document, DocxWriter};
use tracing::debug;

use crate::error::Result;
use crate::header::HeaderWriter;
use crate::style::StyleProfile;
use crate::table::TableRenderer;
use crate::values::FormValues;

/// Title stored in the package properties of every rendered form
pub const DOCUMENT_TITLE: &str = "Mediation Application Form";

/// Build the in-memory form: margins, header, then the table
pub fn render_document(style: &StyleProfile, values: &FormValues) -> Result<Document> {
    let mut doc = Document::new();
    style.configure(&mut doc);
    HeaderWriter::new(style).write(&mut doc);
    TableRenderer::new(style).render(&mut doc, values)?;
    Ok(doc)
}

fn writer() -> DocxWriter {
    DocxWriter::new().with_properties(CoreProperties {
        title: Some(DOCUMENT_TITLE.to_string()),
        creator: Some(format!("mediform {}", crate::VERSION)),
    })
}

/// Render the form to DOCX package bytes
pub fn render_docx(style: &StyleProfile, values: &FormValues) -> Result<Vec<u8>> {
    let doc = render_document(style, values)?;
    let bytes = writer().generate(&doc)?;
    debug!(bytes = bytes.len(), "Generated DOCX package");
    Ok(bytes)
}

/// Render the form and write it to `path`
pub fn write_docx<P: AsRef<Path>>(style: &StyleProfile, values: &FormValues, path: P) -> Result<()> {
    let doc = render_document(style, values)?;
    writer().write_to_file(&doc, path.as_ref())?;
    debug!(path = %path.as_ref().display(), "Wrote DOCX file");
    Ok(())
}
