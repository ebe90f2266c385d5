//! Document-wide styling
//!
//! A [`StyleProfile`] is an immutable value handed to every renderer, so two
//! renders with different profiles never share state.

use serde::{Deserialize, Serialize};

use mediform_ooxml::{Document, Length, RgbColor, Run};

/// Page margins and the single font every run uses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleProfile {
    /// Font family applied to every run
    pub font_name: String,
    /// Font size in points (written as truncated half-points)
    pub font_size_pt: f64,
    /// Text color
    pub color: RgbColor,
    /// Left page margin in inches
    pub margin_left_in: f64,
    /// Right page margin in inches
    pub margin_right_in: f64,
    /// Top page margin in inches
    pub margin_top_in: f64,
}

impl Default for StyleProfile {
    fn default() -> Self {
        Self {
            font_name: "Times New Roman".to_string(),
            font_size_pt: 10.82727336883545,
            color: RgbColor::BLACK,
            margin_left_in: 0.45,
            margin_right_in: 0.45,
            margin_top_in: 0.2291667,
        }
    }
}

impl StyleProfile {
    pub fn font_size(&self) -> Length {
        Length::pt(self.font_size_pt)
    }

    /// Set the left and right margins of the document section
    pub fn apply_section(&self, doc: &mut Document) {
        doc.section.margin_left = Length::inches(self.margin_left_in);
        doc.section.margin_right = Length::inches(self.margin_right_in);
    }

    /// Set the top margin of the document section
    pub fn apply_top_margin(&self, doc: &mut Document) {
        doc.section.margin_top = Length::inches(self.margin_top_in);
    }

    /// Apply both the top margin and the side margins
    pub fn configure(&self, doc: &mut Document) {
        self.apply_top_margin(doc);
        self.apply_section(doc);
    }

    /// Stamp the profile font, size and color plus the given flags onto a run
    pub fn apply_run_style(&self, run: &mut Run, bold: bool, underline: bool) {
        let props = &mut run.properties;
        props.font = Some(self.font_name.clone());
        props.size = Some(self.font_size());
        props.color = Some(self.color);
        props.bold = Some(bold);
        props.underline = Some(underline);
    }
}
