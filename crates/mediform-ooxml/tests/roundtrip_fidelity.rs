//! Write → read fidelity of the document model
//!
//! Everything the writer emits must come back from the reader unchanged,
//! up to the twip rounding of lengths.

use std::io::Cursor;

use mediform_ooxml::{
    Alignment, Border, BorderStyle, Document, DocxWriter, HeightRule, Length, OoxmlArchive,
    RgbColor, TableBorders, VerticalAlign,
};

fn round_trip(doc: &Document) -> Document {
    let bytes = DocxWriter::new().generate(doc).unwrap();
    let archive = OoxmlArchive::from_reader(Cursor::new(bytes)).unwrap();
    Document::from_archive(&archive).unwrap()
}

#[test]
fn test_paragraph_formatting_survives() {
    let mut doc = Document::new();
    let para = doc.add_paragraph();
    para.alignment = Some(Alignment::Center);
    para.spacing.after = Some(Length::inches(0.34));
    let run = para.add_run("Title\nsecond line");
    run.properties.bold = Some(true);
    run.properties.underline = Some(false);
    run.properties.font = Some("Times New Roman".into());
    run.properties.size = Some(Length::pt(10.82727336883545));
    run.properties.color = Some(RgbColor(0x12, 0x34, 0x56));

    let parsed = round_trip(&doc);
    let para = parsed.paragraphs().next().unwrap();
    assert_eq!(para.alignment, Some(Alignment::Center));
    assert_eq!(para.spacing.after.map(Length::as_twips), Some(490));
    assert_eq!(para.text(), "Title\nsecond line");

    let props = &para.runs[0].properties;
    assert_eq!(props.bold, Some(true));
    assert_eq!(props.underline, Some(false));
    assert_eq!(props.font.as_deref(), Some("Times New Roman"));
    assert_eq!(props.size.map(Length::as_half_points), Some(21));
    assert_eq!(props.color, Some(RgbColor(0x12, 0x34, 0x56)));
}

#[test]
fn test_table_structure_survives() {
    let mut doc = Document::new();
    let table = doc.add_table(3, 3);
    table.borders = Some(TableBorders::uniform(Border {
        style: BorderStyle::Single,
        size: 4,
        space: 0,
        color: RgbColor::BLACK,
    }));
    table.merge(0, 0, 2).unwrap();
    table.merge(1, 1, 2).unwrap();
    table.set_column_width(0, Length::inches(0.39)).unwrap();
    table.set_row_height(2, Length::inches(1.57), HeightRule::AtLeast).unwrap();
    let cell = table.cell_mut(2, 2).unwrap();
    cell.vertical_align = Some(VerticalAlign::Top);
    cell.first_paragraph_mut().add_run("first");
    cell.add_paragraph().add_run("second");

    let parsed = round_trip(&doc);
    let table = parsed.tables().next().unwrap();

    assert_eq!(table.row_count(), 3);
    assert_eq!(table.column_count(), 3);
    assert_eq!(table.rows[0].cells.len(), 1);
    assert_eq!(table.span_at(1, 2).unwrap(), (1, 2));
    assert_eq!(table.grid[0].as_twips(), 562);

    let height = table.rows[2].height.unwrap();
    assert_eq!(height.rule, HeightRule::AtLeast);
    assert_eq!(height.value.as_twips(), 2261);

    let cell = table.cell(2, 2).unwrap();
    assert_eq!(cell.vertical_align, Some(VerticalAlign::Top));
    assert_eq!(cell.text(), "first\nsecond");

    let borders = table.borders.unwrap();
    let inside = borders.inside_v.unwrap();
    assert_eq!(inside.style, BorderStyle::Single);
    assert_eq!(inside.size, 4);
    assert_eq!(inside.color, RgbColor::BLACK);
}

#[test]
fn test_section_margins_survive() {
    let mut doc = Document::new();
    doc.section.margin_left = Length::inches(0.45);
    doc.section.margin_top = Length::inches(0.2291667);

    let parsed = round_trip(&doc);
    assert_eq!(parsed.section.margin_left.as_twips(), 648);
    assert_eq!(parsed.section.margin_top.as_twips(), 330);
    assert_eq!(parsed.section.page_width, doc.section.page_width);
}
