//! DOCX Writer
//!
//! This module serializes a [`Document`] into a complete DOCX package: the
//! main `word/document.xml` part plus the content types, relationships,
//! default styles and core properties Word needs to open the file.
//!
//! # Example
//!
//! ```
//! use mediform_ooxml::{Document, DocxWriter};
//!
//! let mut doc = Document::new();
//! doc.add_paragraph().add_run("Hello");
//! let bytes = DocxWriter::new().generate(&doc)?;
//! assert!(!bytes.is_empty());
//! # Ok::<(), mediform_ooxml::OoxmlError>(())
//! ```

use std::io::Cursor;
use std::path::Path;

use crate::archive::OoxmlArchive;
use crate::document::{Block, Document, Paragraph, Run, SectionProperties, Table, TableCell};
use crate::error::{OoxmlError, Result};

/// Main document part
pub const DOCUMENT_PATH: &str = "word/document.xml";

const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
</Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
</Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:docDefaults>
<w:rPrDefault><w:rPr><w:rFonts w:ascii="Times New Roman" w:hAnsi="Times New Roman" w:cs="Times New Roman"/><w:sz w:val="22"/></w:rPr></w:rPrDefault>
<w:pPrDefault><w:pPr><w:spacing w:after="0" w:line="240" w:lineRule="auto"/></w:pPr></w:pPrDefault>
</w:docDefaults>
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>
<w:style w:type="table" w:default="1" w:styleId="TableNormal"><w:name w:val="Normal Table"/><w:tblPr><w:tblInd w:w="0" w:type="dxa"/><w:tblCellMar><w:top w:w="0" w:type="dxa"/><w:left w:w="108" w:type="dxa"/><w:bottom w:w="0" w:type="dxa"/><w:right w:w="108" w:type="dxa"/></w:tblCellMar></w:tblPr></w:style>
</w:styles>"#;

/// Package-level metadata written to `docProps/core.xml`
#[derive(Debug, Clone, Default)]
pub struct CoreProperties {
    pub title: Option<String>,
    pub creator: Option<String>,
}

/// DOCX Writer for generating DOCX packages from a [`Document`]
#[derive(Debug, Default)]
pub struct DocxWriter {
    /// XML output buffer
    output: String,
    /// Core properties for docProps/core.xml
    properties: CoreProperties,
}

impl DocxWriter {
    /// Create a new DocxWriter
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the package title and creator
    pub fn with_properties(mut self, properties: CoreProperties) -> Self {
        self.properties = properties;
        self
    }

    /// Generate the DOCX package bytes
    pub fn generate(mut self, doc: &Document) -> Result<Vec<u8>> {
        let archive = self.build_archive(doc)?;
        let mut buffer = Cursor::new(Vec::new());
        archive.write_to(&mut buffer)?;
        Ok(buffer.into_inner())
    }

    /// Generate the package and write it to `path`
    pub fn write_to_file<P: AsRef<Path>>(self, doc: &Document, path: P) -> Result<()> {
        let bytes = self.generate(doc)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Assemble every package part in memory
    ///
    /// Fails with [`OoxmlError::InvalidCharacter`] if any run text, font name
    /// or core property holds a character outside the XML 1.0 range.
    pub fn build_archive(&mut self, doc: &Document) -> Result<OoxmlArchive> {
        check_document_text(doc)?;
        for value in [&self.properties.title, &self.properties.creator]
            .into_iter()
            .flatten()
        {
            check_xml_text(value)?;
        }
        let document_xml = self.generate_document_xml(doc);

        let mut archive = OoxmlArchive::new();
        archive.set_string("[Content_Types].xml", CONTENT_TYPES_XML);
        archive.set_string("_rels/.rels", PACKAGE_RELS_XML);
        archive.set_string("word/_rels/document.xml.rels", DOCUMENT_RELS_XML);
        archive.set_string("word/styles.xml", STYLES_XML);
        archive.set_string("docProps/core.xml", self.generate_core_xml());
        archive.set_string(DOCUMENT_PATH, document_xml);
        Ok(archive)
    }

    /// Generate word/document.xml
    pub fn generate_document_xml(&mut self, doc: &Document) -> String {
        self.output.clear();
        self.output
            .push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
        self.output.push_str(&format!(
            "<w:document xmlns:w=\"{}\" xmlns:r=\"{}\">\n",
            WML_NS, REL_NS
        ));
        self.output.push_str("<w:body>\n");

        for block in &doc.blocks {
            self.generate_block(block);
        }

        self.generate_section(&doc.section);
        self.output.push_str("</w:body>\n");
        self.output.push_str("</w:document>\n");
        std::mem::take(&mut self.output)
    }

    fn generate_core_xml(&self) -> String {
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
             <cp:coreProperties xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" \
             xmlns:dc=\"http://purl.org/dc/elements/1.1/\">\n",
        );
        if let Some(ref t) = self.properties.title {
            xml.push_str(&format!("<dc:title>{}</dc:title>\n", escape_xml(t)));
        }
        if let Some(ref c) = self.properties.creator {
            xml.push_str(&format!("<dc:creator>{}</dc:creator>\n", escape_xml(c)));
        }
        xml.push_str("</cp:coreProperties>");
        xml
    }

    fn generate_block(&mut self, block: &Block) {
        match block {
            Block::Paragraph(p) => self.generate_paragraph(p),
            Block::Table(t) => self.generate_table(t),
        }
    }

    /// Generate XML for a paragraph
    fn generate_paragraph(&mut self, para: &Paragraph) {
        self.output.push_str("<w:p>\n");

        let has_spacing = para.spacing.before.is_some() || para.spacing.after.is_some();
        if para.alignment.is_some() || has_spacing {
            self.output.push_str("<w:pPr>");
            if has_spacing {
                self.output.push_str("<w:spacing");
                if let Some(before) = para.spacing.before {
                    self.output
                        .push_str(&format!(" w:before=\"{}\"", before.as_twips()));
                }
                if let Some(after) = para.spacing.after {
                    self.output
                        .push_str(&format!(" w:after=\"{}\"", after.as_twips()));
                }
                self.output.push_str("/>");
            }
            if let Some(align) = para.alignment {
                self.output
                    .push_str(&format!("<w:jc w:val=\"{}\"/>", align.as_xml()));
            }
            self.output.push_str("</w:pPr>\n");
        }

        for run in &para.runs {
            self.generate_run(run);
        }

        self.output.push_str("</w:p>\n");
    }

    /// Generate XML for a run; `\n` becomes a line break, `\t` a tab
    fn generate_run(&mut self, run: &Run) {
        self.output.push_str("<w:r>");

        let props = &run.properties;
        let has_props = props.font.is_some()
            || props.bold.is_some()
            || props.underline.is_some()
            || props.color.is_some()
            || props.size.is_some();
        if has_props {
            self.output.push_str("<w:rPr>");
            if let Some(ref font) = props.font {
                let font = escape_xml(font);
                self.output.push_str(&format!(
                    "<w:rFonts w:ascii=\"{0}\" w:hAnsi=\"{0}\" w:cs=\"{0}\" w:eastAsia=\"{0}\"/>",
                    font
                ));
            }
            match props.bold {
                Some(true) => self.output.push_str("<w:b/>"),
                Some(false) => self.output.push_str("<w:b w:val=\"0\"/>"),
                None => {}
            }
            if let Some(color) = props.color {
                self.output
                    .push_str(&format!("<w:color w:val=\"{}\"/>", color.to_hex()));
            }
            if let Some(size) = props.size {
                self.output
                    .push_str(&format!("<w:sz w:val=\"{}\"/>", size.as_half_points()));
            }
            match props.underline {
                Some(true) => self.output.push_str("<w:u w:val=\"single\"/>"),
                Some(false) => self.output.push_str("<w:u w:val=\"none\"/>"),
                None => {}
            }
            self.output.push_str("</w:rPr>");
        }

        let mut first_line = true;
        for line in run.text.split('\n') {
            if !first_line {
                self.output.push_str("<w:br/>");
            }
            first_line = false;

            let mut first_segment = true;
            for segment in line.split('\t') {
                if !first_segment {
                    self.output.push_str("<w:tab/>");
                }
                first_segment = false;
                if !segment.is_empty() {
                    self.output.push_str(&format!(
                        "<w:t xml:space=\"preserve\">{}</w:t>",
                        escape_xml(segment)
                    ));
                }
            }
        }

        self.output.push_str("</w:r>\n");
    }

    /// Generate XML for a table
    fn generate_table(&mut self, table: &Table) {
        self.output.push_str("<w:tbl>\n");

        self.output.push_str("<w:tblPr>\n");
        self.output.push_str("<w:tblW w:w=\"0\" w:type=\"auto\"/>\n");
        if let Some(borders) = table.borders {
            self.output.push_str("<w:tblBorders>\n");
            for (name, edge) in borders.edges() {
                if let Some(b) = edge {
                    self.output.push_str(&format!(
                        "<w:{} w:val=\"{}\" w:sz=\"{}\" w:space=\"{}\" w:color=\"{}\"/>\n",
                        name,
                        b.style.as_xml(),
                        b.size,
                        b.space,
                        b.color.to_hex()
                    ));
                }
            }
            self.output.push_str("</w:tblBorders>\n");
        }
        self.output.push_str("<w:tblLayout w:type=\"fixed\"/>\n");
        self.output
            .push_str("<w:tblLook w:val=\"04A0\" w:firstRow=\"1\" w:lastRow=\"0\" w:firstColumn=\"1\" w:lastColumn=\"0\" w:noHBand=\"0\" w:noVBand=\"1\"/>\n");
        self.output.push_str("</w:tblPr>\n");

        // Table grid (column definitions)
        self.output.push_str("<w:tblGrid>\n");
        for width in &table.grid {
            self.output
                .push_str(&format!("<w:gridCol w:w=\"{}\"/>\n", width.as_twips()));
        }
        self.output.push_str("</w:tblGrid>\n");

        for row in &table.rows {
            self.output.push_str("<w:tr>\n");

            if let Some(height) = row.height {
                self.output.push_str(&format!(
                    "<w:trPr><w:trHeight w:val=\"{}\" w:hRule=\"{}\"/></w:trPr>\n",
                    height.value.as_twips(),
                    height.rule.as_xml()
                ));
            }

            for cell in &row.cells {
                self.generate_cell(cell);
            }

            self.output.push_str("</w:tr>\n");
        }

        self.output.push_str("</w:tbl>\n");
    }

    fn generate_cell(&mut self, cell: &TableCell) {
        self.output.push_str("<w:tc>\n");

        self.output.push_str("<w:tcPr>");
        if let Some(width) = cell.width {
            self.output
                .push_str(&format!("<w:tcW w:w=\"{}\" w:type=\"dxa\"/>", width.as_twips()));
        }
        if cell.grid_span > 1 {
            self.output
                .push_str(&format!("<w:gridSpan w:val=\"{}\"/>", cell.grid_span));
        }
        if let Some(v) = cell.vertical_align {
            self.output
                .push_str(&format!("<w:vAlign w:val=\"{}\"/>", v.as_xml()));
        }
        self.output.push_str("</w:tcPr>\n");

        for para in &cell.paragraphs {
            self.generate_paragraph(para);
        }

        // Ensure at least one paragraph in cell
        if cell.paragraphs.is_empty() {
            self.output.push_str("<w:p/>\n");
        }

        self.output.push_str("</w:tc>\n");
    }

    fn generate_section(&mut self, section: &SectionProperties) {
        self.output.push_str("<w:sectPr>\n");
        self.output.push_str(&format!(
            "<w:pgSz w:w=\"{}\" w:h=\"{}\"/>\n",
            section.page_width.as_twips(),
            section.page_height.as_twips()
        ));
        self.output.push_str(&format!(
            "<w:pgMar w:top=\"{}\" w:right=\"{}\" w:bottom=\"{}\" w:left=\"{}\" w:header=\"{}\" w:footer=\"{}\" w:gutter=\"0\"/>\n",
            section.margin_top.as_twips(),
            section.margin_right.as_twips(),
            section.margin_bottom.as_twips(),
            section.margin_left.as_twips(),
            section.header_distance.as_twips(),
            section.footer_distance.as_twips()
        ));
        self.output.push_str("</w:sectPr>\n");
    }
}

/// Whether `c` may appear in XML 1.0 character data
pub fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

fn check_xml_text(text: &str) -> Result<()> {
    match text.chars().find(|&c| !is_xml_char(c)) {
        Some(c) => Err(OoxmlError::InvalidCharacter {
            codepoint: u32::from(c),
        }),
        None => Ok(()),
    }
}

fn check_paragraph_text(para: &Paragraph) -> Result<()> {
    for run in &para.runs {
        check_xml_text(&run.text)?;
        if let Some(ref font) = run.properties.font {
            check_xml_text(font)?;
        }
    }
    Ok(())
}

fn check_document_text(doc: &Document) -> Result<()> {
    for block in &doc.blocks {
        match block {
            Block::Paragraph(p) => check_paragraph_text(p)?,
            Block::Table(t) => {
                for cell in t.rows.iter().flat_map(|r| &r.cells) {
                    for para in &cell.paragraphs {
                        check_paragraph_text(para)?;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Escape special XML characters
pub(crate) fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
