//! Cell and paragraph formatting helpers

use mediform_ooxml::{Alignment, Length, Paragraph, TableCell, VerticalAlign};

use crate::style::StyleProfile;

/// Formatting for one [`CellFormatter::apply_paragraph`] call
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParagraphFormat {
    /// Paragraph alignment; `None` leaves the current one untouched
    pub align: Option<Alignment>,
    pub bold: bool,
    pub underline: bool,
    pub space_before: Length,
    pub space_after: Length,
}

impl ParagraphFormat {
    pub fn aligned(align: Alignment) -> Self {
        Self {
            align: Some(align),
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn space_after(mut self, space: Length) -> Self {
        self.space_after = space;
        self
    }
}

/// Writes styled labels into existing table cells
///
/// None of these operations create cells; the table must already have the
/// row and column allocated.
#[derive(Debug, Clone, Copy)]
pub struct CellFormatter<'a> {
    style: &'a StyleProfile,
}

impl<'a> CellFormatter<'a> {
    pub fn new(style: &'a StyleProfile) -> Self {
        Self { style }
    }

    /// Centered text, vertically centered in the cell
    pub fn center_label_cell(&self, cell: &mut TableCell, text: &str, bold: bool, underline: bool) {
        cell.vertical_align = Some(VerticalAlign::Center);
        let format = ParagraphFormat {
            bold,
            underline,
            ..ParagraphFormat::aligned(Alignment::Center)
        };
        self.apply_paragraph(cell.first_paragraph_mut(), text, format);
    }

    /// Left-justified text at the top of the cell
    pub fn top_label_cell(&self, cell: &mut TableCell, text: &str, bold: bool, underline: bool) {
        cell.vertical_align = Some(VerticalAlign::Top);
        let format = ParagraphFormat {
            bold,
            underline,
            ..ParagraphFormat::aligned(Alignment::Left)
        };
        self.apply_paragraph(cell.first_paragraph_mut(), text, format);
    }

    /// Left-aligned text, vertically centered. Form labels pass `bold = true`.
    pub fn left_label_cell(&self, cell: &mut TableCell, text: &str, bold: bool) {
        cell.vertical_align = Some(VerticalAlign::Center);
        let format = ParagraphFormat {
            bold,
            ..ParagraphFormat::aligned(Alignment::Left)
        };
        self.apply_paragraph(cell.first_paragraph_mut(), text, format);
    }

    /// Set alignment and spacing on `para`, then append a styled run
    pub fn apply_paragraph(&self, para: &mut Paragraph, text: &str, format: ParagraphFormat) {
        if let Some(align) = format.align {
            para.alignment = Some(align);
        }
        para.spacing.before = Some(format.space_before);
        para.spacing.after = Some(format.space_after);

        let run = para.add_run(text);
        self.style
            .apply_run_style(run, format.bold, format.underline);
    }
}
