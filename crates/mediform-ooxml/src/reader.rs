//! Document content parsing (word/document.xml)
//!
//! Reads a main document part back into the [`Document`] model. Only the
//! constructs the writer emits are recognized (paragraph alignment and
//! spacing, run fonts/flags/color/size, table grid, borders, row heights,
//! spans, cell widths and vertical alignment); anything else is skipped.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::archive::OoxmlArchive;
use crate::document::{
    Alignment, Block, Border, BorderStyle, Document, HeightRule, Paragraph, RowHeight, Run,
    Table, TableBorders, TableCell, TableRow, VerticalAlign,
};
use crate::error::{OoxmlError, Result};
use crate::units::{Length, RgbColor};

/// Word tables have at most 63 grid columns
const MAX_GRID_SPAN: i64 = 63;

impl Document {
    /// Open a DOCX file and parse its main document part
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let archive = OoxmlArchive::open(path)?;
        Self::from_archive(&archive)
    }

    /// Parse the main document part of an unpacked package
    pub fn from_archive(archive: &OoxmlArchive) -> Result<Self> {
        Self::parse(archive.document_xml()?)
    }

    /// Parse a document from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        // Don't trim text - preserve whitespace in runs
        reader.config_mut().trim_text(false);

        let mut doc = Document::new();
        let mut buf = Vec::new();

        let mut in_body = false;
        let mut in_borders = false;
        let mut in_sect_pr = false;
        let mut in_text_element = false;
        let mut current_table: Option<Table> = None;
        let mut current_row: Option<TableRow> = None;
        let mut current_cell: Option<TableCell> = None;
        let mut current_para: Option<Paragraph> = None;
        let mut current_run: Option<Run> = None;

        loop {
            buf.clear();
            let event = reader.read_event_into(&mut buf)?;
            let is_empty = matches!(event, Event::Empty(_));
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let name = e.local_name();
                    match name.as_ref() {
                        b"body" => in_body = !is_empty,
                        b"sectPr" if current_para.is_none() => in_sect_pr = !is_empty,
                        b"tbl" if in_body => current_table = Some(Table::default()),
                        b"tblBorders" if current_table.is_some() => in_borders = !is_empty,
                        b"top" | b"left" | b"start" | b"bottom" | b"right" | b"end"
                        | b"insideH" | b"insideV"
                            if in_borders =>
                        {
                            if let (Some(table), Some(border)) =
                                (current_table.as_mut(), parse_border(e))
                            {
                                let edge = String::from_utf8_lossy(name.as_ref()).into_owned();
                                table
                                    .borders
                                    .get_or_insert_with(TableBorders::default)
                                    .set_edge(&edge, border);
                            }
                        }
                        b"gridCol" => {
                            if let (Some(table), Some(w)) =
                                (current_table.as_mut(), attr_i64(e, b"w"))
                            {
                                table.grid.push(Length::twips(w));
                            }
                        }
                        b"tr" if current_table.is_some() => {
                            current_row = Some(TableRow::default());
                        }
                        b"trHeight" => {
                            if let (Some(row), Some(val)) = (current_row.as_mut(), attr_i64(e, b"val"))
                            {
                                let rule = attr(e, b"hRule")
                                    .and_then(|r| HeightRule::from_xml(&r))
                                    .unwrap_or(HeightRule::AtLeast);
                                row.height = Some(RowHeight {
                                    value: Length::twips(val),
                                    rule,
                                });
                            }
                        }
                        b"tc" if current_row.is_some() => {
                            current_cell = Some(TableCell {
                                paragraphs: Vec::new(),
                                ..TableCell::new()
                            });
                        }
                        b"tcW" if current_para.is_none() => {
                            if let (Some(cell), Some(w)) = (current_cell.as_mut(), attr_i64(e, b"w"))
                            {
                                cell.width = Some(Length::twips(w));
                            }
                        }
                        b"gridSpan" => {
                            if let (Some(cell), Some(span)) =
                                (current_cell.as_mut(), attr_i64(e, b"val"))
                            {
                                cell.grid_span = span.clamp(1, MAX_GRID_SPAN) as usize;
                            }
                        }
                        b"vAlign" => {
                            if let Some(cell) = current_cell.as_mut() {
                                cell.vertical_align =
                                    attr(e, b"val").and_then(|v| VerticalAlign::from_xml(&v));
                            }
                        }
                        b"p" if in_body => {
                            if is_empty {
                                push_paragraph(
                                    Paragraph::new(),
                                    &mut current_cell,
                                    &current_table,
                                    &mut doc,
                                );
                            } else {
                                current_para = Some(Paragraph::new());
                            }
                        }
                        b"jc" if current_run.is_none() => {
                            if let Some(p) = current_para.as_mut() {
                                p.alignment = attr(e, b"val").and_then(|v| Alignment::from_xml(&v));
                            }
                        }
                        b"spacing" if current_run.is_none() => {
                            if let Some(p) = current_para.as_mut() {
                                if let Some(before) = attr_i64(e, b"before") {
                                    p.spacing.before = Some(Length::twips(before));
                                }
                                if let Some(after) = attr_i64(e, b"after") {
                                    p.spacing.after = Some(Length::twips(after));
                                }
                            }
                        }
                        b"r" if current_para.is_some() => current_run = Some(Run::default()),
                        b"rFonts" => {
                            if let Some(run) = current_run.as_mut() {
                                run.properties.font = attr(e, b"ascii");
                            }
                        }
                        b"b" => {
                            if let Some(run) = current_run.as_mut() {
                                run.properties.bold = Some(toggle_on(e));
                            }
                        }
                        b"u" => {
                            if let Some(run) = current_run.as_mut() {
                                let on = attr(e, b"val").map(|v| v != "none").unwrap_or(true);
                                run.properties.underline = Some(on);
                            }
                        }
                        b"color" => {
                            if let Some(run) = current_run.as_mut() {
                                run.properties.color =
                                    attr(e, b"val").and_then(|v| RgbColor::from_hex(&v));
                            }
                        }
                        b"sz" => {
                            if let (Some(run), Some(half_points)) =
                                (current_run.as_mut(), attr_i64(e, b"val"))
                            {
                                run.properties.size = Some(Length::pt(half_points as f64 / 2.0));
                            }
                        }
                        b"t" if current_run.is_some() => in_text_element = !is_empty,
                        b"br" | b"cr" => {
                            if let Some(run) = current_run.as_mut() {
                                run.text.push('\n');
                            }
                        }
                        b"tab" => {
                            if let Some(run) = current_run.as_mut() {
                                run.text.push('\t');
                            }
                        }
                        b"pgSz" if in_sect_pr => {
                            if let Some(w) = attr_i64(e, b"w") {
                                doc.section.page_width = Length::twips(w);
                            }
                            if let Some(h) = attr_i64(e, b"h") {
                                doc.section.page_height = Length::twips(h);
                            }
                        }
                        b"pgMar" if in_sect_pr => {
                            let s = &mut doc.section;
                            for (key, slot) in [
                                (&b"top"[..], &mut s.margin_top),
                                (&b"bottom"[..], &mut s.margin_bottom),
                                (&b"left"[..], &mut s.margin_left),
                                (&b"right"[..], &mut s.margin_right),
                                (&b"header"[..], &mut s.header_distance),
                                (&b"footer"[..], &mut s.footer_distance),
                            ] {
                                if let Some(v) = attr_i64(e, key) {
                                    *slot = Length::twips(v);
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Event::End(ref e) => match e.local_name().as_ref() {
                    b"body" => in_body = false,
                    b"sectPr" => in_sect_pr = false,
                    b"tblBorders" => in_borders = false,
                    b"t" => in_text_element = false,
                    b"r" => {
                        if let (Some(run), Some(p)) = (current_run.take(), current_para.as_mut()) {
                            p.runs.push(run);
                        }
                    }
                    b"p" => {
                        if let Some(p) = current_para.take() {
                            push_paragraph(p, &mut current_cell, &current_table, &mut doc);
                        }
                    }
                    b"tc" => {
                        if let (Some(mut cell), Some(row)) = (current_cell.take(), current_row.as_mut())
                        {
                            if cell.paragraphs.is_empty() {
                                cell.paragraphs.push(Paragraph::new());
                            }
                            row.cells.push(cell);
                        }
                    }
                    b"tr" => {
                        if let (Some(row), Some(table)) = (current_row.take(), current_table.as_mut())
                        {
                            table.rows.push(row);
                        }
                    }
                    b"tbl" => {
                        if let Some(table) = current_table.take() {
                            doc.blocks.push(Block::Table(table));
                        }
                    }
                    _ => {}
                },
                Event::Text(ref e) => {
                    // Only capture text inside <w:t> elements
                    if in_text_element {
                        if let Some(ref mut run) = current_run {
                            let text = e.unescape().unwrap_or_default();
                            run.text.push_str(&text);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if current_table.is_some() || current_para.is_some() {
            return Err(OoxmlError::InvalidStructure(
                "unterminated table or paragraph".to_string(),
            ));
        }

        Ok(doc)
    }
}

fn push_paragraph(
    para: Paragraph,
    current_cell: &mut Option<TableCell>,
    current_table: &Option<Table>,
    doc: &mut Document,
) {
    if let Some(cell) = current_cell.as_mut() {
        cell.paragraphs.push(para);
    } else if current_table.is_none() {
        doc.blocks.push(Block::Paragraph(para));
    }
}

fn parse_border(e: &BytesStart) -> Option<Border> {
    let style = BorderStyle::from_xml(&attr(e, b"val")?)?;
    Some(Border {
        style,
        size: attr_i64(e, b"sz").unwrap_or(0) as u32,
        space: attr_i64(e, b"space").unwrap_or(0) as u32,
        color: attr(e, b"color")
            .and_then(|c| RgbColor::from_hex(&c))
            .unwrap_or(RgbColor::BLACK),
    })
}

/// `<w:b/>` is on; `w:val="0"`/`"false"` switches it off
fn toggle_on(e: &BytesStart) -> bool {
    attr(e, b"val")
        .map(|v| v != "0" && v != "false")
        .unwrap_or(true)
}

/// Attribute value by local name, ignoring the namespace prefix
fn attr(e: &BytesStart, local: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.local_name().as_ref() == local)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn attr_i64(e: &BytesStart, local: &[u8]) -> Option<i64> {
    attr(e, local).and_then(|v| v.parse().ok())
}
