//! In-memory WordprocessingML document model
//!
//! The model covers what a single-section form needs: paragraphs with
//! alignment and spacing, formatted runs, and tables with a column grid,
//! borders, row heights and horizontally merged cells. It is written out by
//! [`crate::writer::DocxWriter`] and read back by [`Document::parse`].
//!
//! Cells are addressed by *grid column*. Once `0..=2` of a row are merged,
//! grid columns 0, 1 and 2 all resolve to the same physical cell, the way
//! Word presents a merged cell.

use crate::error::{OoxmlError, Result};
use crate::units::{Length, RgbColor};

/// A word-processing document with a single section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Page size and margins
    pub section: SectionProperties,
    /// Body content in document order
    pub blocks: Vec<Block>,
}

/// Block-level elements
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// A paragraph
    Paragraph(Paragraph),
    /// A table
    Table(Table),
}

/// Page geometry of the (only) section
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionProperties {
    pub page_width: Length,
    pub page_height: Length,
    pub margin_top: Length,
    pub margin_bottom: Length,
    pub margin_left: Length,
    pub margin_right: Length,
    pub header_distance: Length,
    pub footer_distance: Length,
}

impl Default for SectionProperties {
    /// US Letter with one-inch margins, matching Word's blank document
    fn default() -> Self {
        Self {
            page_width: Length::inches(8.5),
            page_height: Length::inches(11.0),
            margin_top: Length::inches(1.0),
            margin_bottom: Length::inches(1.0),
            margin_left: Length::inches(1.0),
            margin_right: Length::inches(1.0),
            header_distance: Length::inches(0.5),
            footer_distance: Length::inches(0.5),
        }
    }
}

impl SectionProperties {
    /// Width available between the left and right margins
    pub fn block_width(&self) -> Length {
        self.page_width - self.margin_left - self.margin_right
    }
}

/// Paragraph justification (`w:jc`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn as_xml(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
        }
    }

    pub fn from_xml(val: &str) -> Option<Self> {
        match val {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "both" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

/// Paragraph spacing (`w:spacing`)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Spacing {
    pub before: Option<Length>,
    pub after: Option<Length>,
}

/// A paragraph of runs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub alignment: Option<Alignment>,
    pub spacing: Spacing,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a run and return it for styling
    pub fn add_run(&mut self, text: impl Into<String>) -> &mut Run {
        self.runs.push(Run::new(text));
        let last = self.runs.len() - 1;
        &mut self.runs[last]
    }

    /// Concatenated text of all runs
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Character formatting (`w:rPr`)
///
/// `None` means "inherit"; `Some(false)` is written explicitly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunProperties {
    pub font: Option<String>,
    pub size: Option<Length>,
    pub color: Option<RgbColor>,
    pub bold: Option<bool>,
    pub underline: Option<bool>,
}

/// A run of uniformly formatted text
///
/// Newlines become `w:br` and tabs become `w:tab` when written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    pub text: String,
    pub properties: RunProperties,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            properties: RunProperties::default(),
        }
    }
}

/// Cell vertical alignment (`w:vAlign`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAlign {
    Top,
    Center,
    Bottom,
}

impl VerticalAlign {
    pub fn as_xml(self) -> &'static str {
        match self {
            VerticalAlign::Top => "top",
            VerticalAlign::Center => "center",
            VerticalAlign::Bottom => "bottom",
        }
    }

    pub fn from_xml(val: &str) -> Option<Self> {
        match val {
            "top" => Some(VerticalAlign::Top),
            "center" => Some(VerticalAlign::Center),
            "bottom" => Some(VerticalAlign::Bottom),
            _ => None,
        }
    }
}

/// A table cell spanning one or more grid columns
#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    /// Number of grid columns covered (`w:gridSpan`)
    pub grid_span: usize,
    /// Preferred width (`w:tcW`)
    pub width: Option<Length>,
    pub vertical_align: Option<VerticalAlign>,
    /// Never empty: a cell always holds at least one paragraph
    pub paragraphs: Vec<Paragraph>,
}

impl Default for TableCell {
    fn default() -> Self {
        Self::new()
    }
}

impl TableCell {
    pub fn new() -> Self {
        Self {
            grid_span: 1,
            width: None,
            vertical_align: None,
            paragraphs: vec![Paragraph::new()],
        }
    }

    /// The first paragraph, which every cell has
    pub fn first_paragraph_mut(&mut self) -> &mut Paragraph {
        if self.paragraphs.is_empty() {
            self.paragraphs.push(Paragraph::new());
        }
        &mut self.paragraphs[0]
    }

    /// Append a new empty paragraph and return it
    pub fn add_paragraph(&mut self) -> &mut Paragraph {
        self.paragraphs.push(Paragraph::new());
        let last = self.paragraphs.len() - 1;
        &mut self.paragraphs[last]
    }

    /// Paragraph texts joined with newlines
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Row height rule (`w:hRule`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightRule {
    AtLeast,
    Exact,
    Auto,
}

impl HeightRule {
    pub fn as_xml(self) -> &'static str {
        match self {
            HeightRule::AtLeast => "atLeast",
            HeightRule::Exact => "exact",
            HeightRule::Auto => "auto",
        }
    }

    pub fn from_xml(val: &str) -> Option<Self> {
        match val {
            "atLeast" => Some(HeightRule::AtLeast),
            "exact" => Some(HeightRule::Exact),
            "auto" => Some(HeightRule::Auto),
            _ => None,
        }
    }
}

/// Row height (`w:trHeight`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowHeight {
    pub value: Length,
    pub rule: HeightRule,
}

/// A table row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    pub height: Option<RowHeight>,
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Number of grid columns the row covers
    pub fn grid_len(&self) -> usize {
        self.cells.iter().map(|c| c.grid_span).sum()
    }

    /// Index of the physical cell covering `grid_col`, with the grid column
    /// the cell starts at
    pub fn locate(&self, grid_col: usize) -> Option<(usize, usize)> {
        let mut start = 0;
        for (idx, cell) in self.cells.iter().enumerate() {
            if grid_col < start + cell.grid_span {
                return Some((idx, start));
            }
            start += cell.grid_span;
        }
        None
    }

    pub fn cell_at(&self, grid_col: usize) -> Option<&TableCell> {
        self.locate(grid_col).map(|(idx, _)| &self.cells[idx])
    }

    pub fn cell_at_mut(&mut self, grid_col: usize) -> Option<&mut TableCell> {
        self.locate(grid_col).map(move |(idx, _)| &mut self.cells[idx])
    }
}

/// Border line style (`w:val` of a border element)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    Single,
    Double,
    Dotted,
    Dashed,
    Nil,
}

impl BorderStyle {
    pub fn as_xml(self) -> &'static str {
        match self {
            BorderStyle::Single => "single",
            BorderStyle::Double => "double",
            BorderStyle::Dotted => "dotted",
            BorderStyle::Dashed => "dashed",
            BorderStyle::Nil => "nil",
        }
    }

    pub fn from_xml(val: &str) -> Option<Self> {
        match val {
            "single" => Some(BorderStyle::Single),
            "double" => Some(BorderStyle::Double),
            "dotted" => Some(BorderStyle::Dotted),
            "dashed" => Some(BorderStyle::Dashed),
            "nil" | "none" => Some(BorderStyle::Nil),
            _ => None,
        }
    }
}

/// One border edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
    pub style: BorderStyle,
    /// Line weight in eighths of a point (`w:sz`)
    pub size: u32,
    /// Padding in points (`w:space`)
    pub space: u32,
    pub color: RgbColor,
}

/// The six table border edges (`w:tblBorders`)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TableBorders {
    pub top: Option<Border>,
    pub left: Option<Border>,
    pub bottom: Option<Border>,
    pub right: Option<Border>,
    pub inside_h: Option<Border>,
    pub inside_v: Option<Border>,
}

impl TableBorders {
    /// The same border on every edge, interior gridlines included
    pub fn uniform(border: Border) -> Self {
        Self {
            top: Some(border),
            left: Some(border),
            bottom: Some(border),
            right: Some(border),
            inside_h: Some(border),
            inside_v: Some(border),
        }
    }

    /// Edges in schema order with their element names
    pub fn edges(&self) -> [(&'static str, Option<Border>); 6] {
        [
            ("top", self.top),
            ("left", self.left),
            ("bottom", self.bottom),
            ("right", self.right),
            ("insideH", self.inside_h),
            ("insideV", self.inside_v),
        ]
    }

    pub(crate) fn set_edge(&mut self, name: &str, border: Border) {
        match name {
            "top" => self.top = Some(border),
            "left" | "start" => self.left = Some(border),
            "bottom" => self.bottom = Some(border),
            "right" | "end" => self.right = Some(border),
            "insideH" => self.inside_h = Some(border),
            "insideV" => self.inside_v = Some(border),
            _ => {}
        }
    }
}

/// A table with a fixed column grid
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Grid column widths (`w:tblGrid`)
    pub grid: Vec<Length>,
    pub borders: Option<TableBorders>,
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Allocate `rows` × `columns` single cells sharing `width` evenly
    pub fn new(rows: usize, columns: usize, width: Length) -> Self {
        let col_width = if columns == 0 {
            Length::ZERO
        } else {
            Length::emu(width.as_emu() / columns as i64)
        };
        let row = TableRow {
            height: None,
            cells: (0..columns)
                .map(|_| TableCell {
                    width: Some(col_width),
                    ..TableCell::new()
                })
                .collect(),
        };
        Self {
            grid: vec![col_width; columns],
            borders: None,
            rows: vec![row; rows],
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.grid.len()
    }

    pub fn row(&self, row: usize) -> Result<&TableRow> {
        let rows = self.rows.len();
        self.rows
            .get(row)
            .ok_or(OoxmlError::RowOutOfRange { row, rows })
    }

    pub fn row_mut(&mut self, row: usize) -> Result<&mut TableRow> {
        let rows = self.rows.len();
        self.rows
            .get_mut(row)
            .ok_or(OoxmlError::RowOutOfRange { row, rows })
    }

    /// The cell covering grid column `col` of `row`
    pub fn cell(&self, row: usize, col: usize) -> Result<&TableCell> {
        let cols = self.grid.len();
        self.row(row)?
            .cell_at(col)
            .ok_or(OoxmlError::ColumnOutOfRange { row, col, cols })
    }

    /// Mutable access to the cell covering grid column `col` of `row`
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Result<&mut TableCell> {
        let cols = self.grid.len();
        self.row_mut(row)?
            .cell_at_mut(col)
            .ok_or(OoxmlError::ColumnOutOfRange { row, col, cols })
    }

    /// First grid column and span of the cell covering `col`
    pub fn span_at(&self, row: usize, col: usize) -> Result<(usize, usize)> {
        let cols = self.grid.len();
        let r = self.row(row)?;
        let (idx, start) = r
            .locate(col)
            .ok_or(OoxmlError::ColumnOutOfRange { row, col, cols })?;
        Ok((start, r.cells[idx].grid_span))
    }

    /// Merge grid columns `from..=to` of `row` into one cell
    ///
    /// Both ends must fall on cell boundaries. Non-empty paragraphs of the
    /// absorbed cells move into the merged cell; widths add up when every
    /// absorbed cell has one. Merging an already merged range is a no-op.
    pub fn merge(&mut self, row: usize, from: usize, to: usize) -> Result<()> {
        let cols = self.grid.len();
        if from > to {
            return Err(OoxmlError::InvalidMerge { row, from, to });
        }
        if to >= cols {
            return Err(OoxmlError::ColumnOutOfRange { row, col: to, cols });
        }

        let r = self.row_mut(row)?;
        let (first, first_start) = r
            .locate(from)
            .ok_or(OoxmlError::ColumnOutOfRange { row, col: from, cols })?;
        let (last, last_start) = r
            .locate(to)
            .ok_or(OoxmlError::ColumnOutOfRange { row, col: to, cols })?;
        let last_end = last_start + r.cells[last].grid_span - 1;
        if first_start != from || last_end != to {
            return Err(OoxmlError::InvalidMerge { row, from, to });
        }
        if first == last {
            return Ok(());
        }

        let absorbed: Vec<TableCell> = r.cells.drain(first..=last).collect();
        let width = absorbed
            .iter()
            .map(|c| c.width)
            .collect::<Option<Vec<_>>>()
            .map(|ws| ws.into_iter().sum());
        let vertical_align = absorbed[0].vertical_align;
        let mut paragraphs: Vec<Paragraph> = absorbed
            .into_iter()
            .flat_map(|c| c.paragraphs)
            .filter(|p| !p.is_empty())
            .collect();
        if paragraphs.is_empty() {
            paragraphs.push(Paragraph::new());
        }

        r.cells.insert(
            first,
            TableCell {
                grid_span: to - from + 1,
                width,
                vertical_align,
                paragraphs,
            },
        );
        Ok(())
    }

    /// Set grid column `col` to `width` and refresh the width of every cell
    /// covering it (merged cells get the sum of their grid columns)
    pub fn set_column_width(&mut self, col: usize, width: Length) -> Result<()> {
        let cols = self.grid.len();
        if col >= cols {
            return Err(OoxmlError::ColumnOutOfRange { row: 0, col, cols });
        }
        self.grid[col] = width;

        let grid = &self.grid;
        for row in &mut self.rows {
            if let Some((idx, start)) = row.locate(col) {
                let cell = &mut row.cells[idx];
                let end = (start + cell.grid_span).min(grid.len());
                cell.width = Some(grid[start..end].iter().copied().sum());
            }
        }
        Ok(())
    }

    /// Replace the height of `row`
    pub fn set_row_height(&mut self, row: usize, value: Length, rule: HeightRule) -> Result<()> {
        self.row_mut(row)?.height = Some(RowHeight { value, rule });
        Ok(())
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an empty paragraph and return it
    pub fn add_paragraph(&mut self) -> &mut Paragraph {
        self.blocks.push(Block::Paragraph(Paragraph::new()));
        match self.blocks.last_mut() {
            Some(Block::Paragraph(p)) => p,
            _ => unreachable!("a paragraph was just pushed"),
        }
    }

    /// Append a table sized to the current text width and return it
    pub fn add_table(&mut self, rows: usize, columns: usize) -> &mut Table {
        let width = self.section.block_width();
        self.blocks
            .push(Block::Table(Table::new(rows, columns, width)));
        match self.blocks.last_mut() {
            Some(Block::Table(t)) => t,
            _ => unreachable!("a table was just pushed"),
        }
    }

    /// Body-level paragraphs (not those inside tables)
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_3x3() -> Table {
        Table::new(3, 3, Length::inches(6.0))
    }

    #[test]
    fn test_new_table_shape() {
        let table = table_3x3();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.grid, vec![Length::inches(2.0); 3]);
        for row in &table.rows {
            assert_eq!(row.cells.len(), 3);
            assert_eq!(row.grid_len(), 3);
        }
    }

    #[test]
    fn test_merge_full_row_addresses_same_cell() {
        let mut table = table_3x3();
        table.merge(0, 0, 2).unwrap();

        assert_eq!(table.rows[0].cells.len(), 1);
        assert_eq!(table.span_at(0, 0).unwrap(), (0, 3));
        assert_eq!(table.span_at(0, 2).unwrap(), (0, 3));
        assert_eq!(table.cell(0, 1).unwrap().width, Some(Length::inches(6.0)));
    }

    #[test]
    fn test_merge_right_keeps_first_column() {
        let mut table = table_3x3();
        table.merge(1, 1, 2).unwrap();

        assert_eq!(table.span_at(1, 0).unwrap(), (0, 1));
        assert_eq!(table.span_at(1, 1).unwrap(), (1, 2));
        assert_eq!(table.span_at(1, 2).unwrap(), (1, 2));
    }

    #[test]
    fn test_merge_moves_non_empty_content() {
        let mut table = table_3x3();
        table
            .cell_mut(0, 2)
            .unwrap()
            .first_paragraph_mut()
            .add_run("kept");
        table.merge(0, 0, 2).unwrap();

        let cell = table.cell(0, 0).unwrap();
        assert_eq!(cell.paragraphs.len(), 1);
        assert_eq!(cell.text(), "kept");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut table = table_3x3();
        table.merge(2, 1, 2).unwrap();
        table.merge(2, 1, 2).unwrap();
        assert_eq!(table.rows[2].cells.len(), 2);
    }

    #[test]
    fn test_merge_rejects_misaligned_range() {
        let mut table = table_3x3();
        table.merge(0, 0, 1).unwrap();
        assert!(matches!(
            table.merge(0, 1, 2),
            Err(OoxmlError::InvalidMerge { .. })
        ));
        assert!(matches!(
            table.merge(1, 2, 1),
            Err(OoxmlError::InvalidMerge { .. })
        ));
        assert!(matches!(
            table.merge(1, 0, 3),
            Err(OoxmlError::ColumnOutOfRange { .. })
        ));
    }

    #[test]
    fn test_out_of_range_access_is_error() {
        let mut table = table_3x3();
        assert!(matches!(
            table.cell(3, 0),
            Err(OoxmlError::RowOutOfRange { row: 3, rows: 3 })
        ));
        assert!(matches!(
            table.cell_mut(0, 3),
            Err(OoxmlError::ColumnOutOfRange { col: 3, .. })
        ));
    }

    #[test]
    fn test_set_column_width_updates_merged_cells() {
        let mut table = table_3x3();
        table.merge(0, 1, 2).unwrap();
        table.set_column_width(1, Length::inches(1.0)).unwrap();
        table.set_column_width(2, Length::inches(4.0)).unwrap();

        assert_eq!(table.grid[1], Length::inches(1.0));
        assert_eq!(
            table.cell(0, 1).unwrap().width,
            Some(Length::inches(1.0) + Length::inches(4.0))
        );
        assert_eq!(table.cell(1, 2).unwrap().width, Some(Length::inches(4.0)));
    }

    #[test]
    fn test_set_row_height_replaces() {
        let mut table = table_3x3();
        table
            .set_row_height(1, Length::inches(0.5), HeightRule::AtLeast)
            .unwrap();
        table
            .set_row_height(1, Length::inches(0.7), HeightRule::AtLeast)
            .unwrap();
        assert_eq!(
            table.rows[1].height,
            Some(RowHeight {
                value: Length::inches(0.7),
                rule: HeightRule::AtLeast
            })
        );
    }

    #[test]
    fn test_document_add_table_uses_block_width() {
        let mut doc = Document::new();
        doc.section.margin_left = Length::inches(0.5);
        doc.section.margin_right = Length::inches(0.5);
        let table = doc.add_table(1, 2);
        assert_eq!(table.grid, vec![Length::inches(3.75); 2]);
        assert_eq!(doc.tables().count(), 1);
        assert_eq!(doc.paragraphs().count(), 0);
    }

    #[test]
    fn test_block_width_saturates_with_huge_margins() {
        let mut section = SectionProperties::default();
        section.margin_left = Length::emu(i64::MAX);
        section.margin_right = Length::emu(i64::MAX);
        assert_eq!(section.block_width(), Length::emu(i64::MIN));

        let mut doc = Document::new();
        doc.section = section;
        assert_eq!(doc.add_table(1, 3).column_count(), 3);
    }

    #[test]
    fn test_cell_text_joins_paragraphs() {
        let mut cell = TableCell::new();
        cell.first_paragraph_mut().add_run("one");
        cell.add_paragraph().add_run("two");
        assert_eq!(cell.text(), "one\ntwo");
    }
}
