//! The 17 × 3 application form table
//!
//! [`TableRenderer::render`] runs the steps in the only valid order:
//! allocate, merge, size columns, size rows, then write text. Merging after
//! text has been written would fold paragraphs of neighbouring cells
//! together, so the individual steps are public for tests and tooling but
//! production callers go through `render`.

use mediform_ooxml::{Alignment, Document, HeightRule, Length, Table, TableBorders};
use tracing::debug;

use crate::error::Result;
use crate::formatter::{CellFormatter, ParagraphFormat};
use crate::layout::{
    column_widths, merge_rule, resolve_height_key, RowHeights, RowRole, FORM_BORDER,
    FORM_COLUMNS, FORM_ROWS, ROW_ROLES,
};
use crate::style::StyleProfile;
use crate::values::{FormValues, PartyDetails};

const NUMBER_COL: usize = 0;
const LABEL_COL: usize = 1;
const VALUE_COL: usize = 2;

const REGISTERED_ADDRESS_LABEL: &str = "REGISTERED ADDRESS:\n";
const CORRESPONDENCE_ADDRESS_LABEL: &str = "CORRESPONDENCE BRANCH ADDRESS:\n";

/// Builds and fills the form table
#[derive(Debug, Clone, Copy)]
pub struct TableRenderer<'a> {
    formatter: CellFormatter<'a>,
}

impl<'a> TableRenderer<'a> {
    pub fn new(style: &'a StyleProfile) -> Self {
        Self {
            formatter: CellFormatter::new(style),
        }
    }

    /// Build the complete table for `values` at the end of `doc`
    pub fn render(&self, doc: &mut Document, values: &FormValues) -> Result<()> {
        let table = self.initialize(doc);
        self.merge(table)?;
        self.set_column_widths(table, &column_widths())?;
        self.set_row_heights(table, &RowHeights::default())?;
        self.populate(table, values)?;
        debug!(rows = table.row_count(), "Rendered form table");
        Ok(())
    }

    /// Append an empty bordered table with the form's shape
    pub fn initialize<'d>(&self, doc: &'d mut Document) -> &'d mut Table {
        let table = doc.add_table(FORM_ROWS, FORM_COLUMNS);
        table.borders = Some(TableBorders::uniform(FORM_BORDER));
        table
    }

    /// Apply the fixed merge rule of every row
    pub fn merge(&self, table: &mut Table) -> Result<()> {
        for idx in 0..table.row_count() {
            if let Some((from, to)) = merge_rule(idx).columns() {
                table.merge(idx, from, to)?;
                debug!(row = idx, from, to, "Merged cells");
            }
        }
        Ok(())
    }

    /// Set every grid column width; merged cells receive the sum of the
    /// columns they span
    pub fn set_column_widths(&self, table: &mut Table, widths: &[Length]) -> Result<()> {
        for (col, &width) in widths.iter().enumerate() {
            table.set_column_width(col, width)?;
        }
        Ok(())
    }

    /// Give each row the minimum height of its bucket
    pub fn set_row_heights(&self, table: &mut Table, heights: &RowHeights) -> Result<()> {
        for idx in 0..table.row_count() {
            let key = resolve_height_key(idx);
            table.set_row_height(idx, heights.get(key), HeightRule::AtLeast)?;
            debug!(row = idx, key = key.as_str(), "Set row height");
        }
        Ok(())
    }

    /// Write labels and values into every row
    pub fn populate(&self, table: &mut Table, values: &FormValues) -> Result<()> {
        for (idx, role) in ROW_ROLES.iter().enumerate() {
            self.write_row(table, idx, role, values)?;
        }
        Ok(())
    }

    fn write_row(
        &self,
        table: &mut Table,
        idx: usize,
        role: &RowRole,
        values: &FormValues,
    ) -> Result<()> {
        let f = &self.formatter;
        match *role {
            RowRole::SectionLabel { text } => {
                f.left_label_cell(table.cell_mut(idx, NUMBER_COL)?, text, true);
            }
            RowRole::NameRow {
                party,
                number,
                label,
            } => {
                self.write_number(table, idx, number)?;
                f.left_label_cell(table.cell_mut(idx, LABEL_COL)?, label, true);
                let name = values.party(party).name();
                f.left_label_cell(table.cell_mut(idx, VALUE_COL)?, name, true);
            }
            RowRole::Subheading { number, text } => {
                self.write_number(table, idx, number)?;
                f.left_label_cell(table.cell_mut(idx, LABEL_COL)?, text, true);
            }
            RowRole::AddressBlock {
                party,
                number,
                gap_in,
            } => {
                self.write_number(table, idx, number)?;
                f.left_label_cell(table.cell_mut(idx, LABEL_COL)?, "Address", true);
                self.write_addresses(table, idx, values.party(party), Length::inches(gap_in))?;
            }
            RowRole::ContactField { party, kind } => {
                f.left_label_cell(table.cell_mut(idx, LABEL_COL)?, kind.label(), true);
                let value = values.party(party).contact(kind);
                f.left_label_cell(table.cell_mut(idx, VALUE_COL)?, value, true);
            }
            RowRole::TitleLine { text } => {
                f.center_label_cell(table.cell_mut(idx, NUMBER_COL)?, text, true, true);
            }
            RowRole::NatureOfDispute { text } => {
                f.left_label_cell(table.cell_mut(idx, LABEL_COL)?, text, true);
            }
        }
        Ok(())
    }

    fn write_number(&self, table: &mut Table, idx: usize, number: Option<&str>) -> Result<()> {
        if let Some(number) = number {
            self.formatter
                .center_label_cell(table.cell_mut(idx, NUMBER_COL)?, number, false, false);
        }
        Ok(())
    }

    fn write_addresses(
        &self,
        table: &mut Table,
        idx: usize,
        party: &PartyDetails,
        gap: Length,
    ) -> Result<()> {
        let f = &self.formatter;
        let left = ParagraphFormat::aligned(Alignment::Left);
        let cell = table.cell_mut(idx, VALUE_COL)?;

        let registered = cell.first_paragraph_mut();
        f.apply_paragraph(registered, REGISTERED_ADDRESS_LABEL, left.bold());
        f.apply_paragraph(registered, party.registered_address(), left.space_after(gap));

        let correspondence = cell.add_paragraph();
        f.apply_paragraph(correspondence, CORRESPONDENCE_ADDRESS_LABEL, left.bold());
        f.apply_paragraph(correspondence, party.correspondence_address(), left);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediform_ooxml::{BorderStyle, VerticalAlign};

    use crate::layout::MergeRule;
    use crate::values::{FormFields, PLACEHOLDER};

    fn rendered(values: &FormValues) -> Document {
        let style = StyleProfile::default();
        let mut doc = Document::new();
        TableRenderer::new(&style).render(&mut doc, values).unwrap();
        doc
    }

    fn only_table(doc: &Document) -> &Table {
        doc.tables().next().unwrap()
    }

    #[test]
    fn test_initialize_borders() {
        let style = StyleProfile::default();
        let mut doc = Document::new();
        let table = TableRenderer::new(&style).initialize(&mut doc);

        assert_eq!(table.row_count(), FORM_ROWS);
        assert_eq!(table.column_count(), FORM_COLUMNS);
        let borders = table.borders.unwrap();
        for (name, edge) in borders.edges() {
            let edge = edge.unwrap_or_else(|| panic!("missing {name}"));
            assert_eq!(edge.style, BorderStyle::Single);
            assert_eq!(edge.size, 4);
            assert_eq!(edge.space, 0);
            assert_eq!(edge.color.to_hex(), "000000");
        }
    }

    #[test]
    fn test_merge_state() {
        let style = StyleProfile::default();
        let renderer = TableRenderer::new(&style);
        let mut doc = Document::new();
        let table = renderer.initialize(&mut doc);
        renderer.merge(table).unwrap();

        for idx in 0..FORM_ROWS {
            let cells = table.row(idx).unwrap().cells.len();
            match merge_rule(idx) {
                MergeRule::Full => {
                    assert_eq!(cells, 1, "row {idx}");
                    assert_eq!(table.span_at(idx, 0).unwrap(), (0, 3));
                }
                MergeRule::Right => {
                    assert_eq!(cells, 2, "row {idx}");
                    assert_eq!(table.span_at(idx, 2).unwrap(), (1, 2));
                }
                MergeRule::None => assert_eq!(cells, 3, "row {idx}"),
            }
        }
    }

    #[test]
    fn test_merged_width_is_span_sum() {
        let doc = rendered(&FormValues::default());
        let table = only_table(&doc);
        let widths = column_widths();

        let full = table.cell(0, 0).unwrap().width.unwrap();
        assert_eq!(full, widths[0] + widths[1] + widths[2]);
        let right = table.cell(2, 1).unwrap().width.unwrap();
        assert_eq!(right, widths[1] + widths[2]);
        assert_eq!(table.cell(1, 0).unwrap().width, Some(widths[0]));
        assert_eq!(table.grid, widths.to_vec());
    }

    #[test]
    fn test_row_heights_at_least() {
        let doc = rendered(&FormValues::default());
        let table = only_table(&doc);
        let heights = RowHeights::default();

        for (idx, row) in table.rows.iter().enumerate() {
            let height = row.height.unwrap();
            assert_eq!(height.rule, HeightRule::AtLeast);
            assert_eq!(height.value, heights.get(resolve_height_key(idx)));
        }
    }

    #[test]
    fn test_row_heights_replace_previous() {
        let style = StyleProfile::default();
        let renderer = TableRenderer::new(&style);
        let mut doc = Document::new();
        let table = renderer.initialize(&mut doc);
        renderer.set_row_heights(table, &RowHeights::default()).unwrap();
        renderer.set_row_heights(table, &RowHeights::default()).unwrap();
        assert_eq!(table.rows[3].height.unwrap().value, Length::inches(1.13));
    }

    #[test]
    fn test_labels_and_numbers() {
        let doc = rendered(&FormValues::default());
        let table = only_table(&doc);

        assert_eq!(table.cell(0, 0).unwrap().text(), "DETAILS OF PARTIES:");
        assert_eq!(table.cell(1, 0).unwrap().text(), "1");
        assert_eq!(table.cell(1, 1).unwrap().text(), "Name of\nApplicant");
        assert_eq!(table.cell(3, 0).unwrap().text(), "1");
        assert_eq!(table.cell(7, 0).unwrap().text(), "2");
        assert_eq!(table.cell(9, 0).unwrap().text(), "");
        assert_eq!(table.cell(10, 0).unwrap().text(), "");
        assert_eq!(table.cell(9, 1).unwrap().text(), "Name");
        assert_eq!(table.cell(12, 1).unwrap().text(), "Mobile No.");
        assert_eq!(table.cell(14, 0).unwrap().text(), "DETAILS OF DISPUTE:");
        assert!(table.cell(16, 2).unwrap().text().starts_with("Nature of disputes"));

        let number = &table.cell(7, 0).unwrap().paragraphs[0];
        assert_eq!(number.alignment, Some(Alignment::Center));
        assert_eq!(number.runs[0].properties.bold, Some(false));

        let title = table.cell(15, 0).unwrap();
        assert_eq!(title.vertical_align, Some(VerticalAlign::Center));
        assert_eq!(title.paragraphs[0].runs[0].properties.underline, Some(true));
    }

    #[test]
    fn test_address_block_placeholders_and_spacing() {
        let doc = rendered(&FormValues::new(FormFields::default()));
        let table = only_table(&doc);

        for (row, gap) in [(3, 0.28), (10, 0.68)] {
            let cell = table.cell(row, 2).unwrap();
            assert_eq!(cell.paragraphs.len(), 2);

            let registered = &cell.paragraphs[0];
            assert_eq!(registered.text(), format!("REGISTERED ADDRESS:\n{PLACEHOLDER}"));
            assert_eq!(registered.spacing.after, Some(Length::inches(gap)));
            assert_eq!(registered.runs[0].properties.bold, Some(true));
            assert_eq!(registered.runs[1].properties.bold, Some(false));

            let correspondence = &cell.paragraphs[1];
            assert_eq!(
                correspondence.text(),
                format!("CORRESPONDENCE BRANCH ADDRESS:\n{PLACEHOLDER}")
            );
            assert_eq!(correspondence.spacing.after, Some(Length::ZERO));
            assert_eq!(table.cell(row, 1).unwrap().text(), "Address");
        }
    }

    #[test]
    fn test_populate_fails_on_short_table() {
        let style = StyleProfile::default();
        let mut table = Table::new(5, FORM_COLUMNS, Length::inches(7.0));
        let err = TableRenderer::new(&style)
            .populate(&mut table, &FormValues::default())
            .unwrap_err();
        assert!(err.to_string().contains("Document error"));
    }
}
