//! Fixed layout of the application form table
//!
//! Everything here is constant data: the three column widths, the five
//! row-height buckets, the merge rule per row and the role each row plays.
//! The table renderer consumes these tables; nothing mutates them.

use mediform_ooxml::{Border, BorderStyle, Length, RgbColor};

use crate::values::{ContactKind, Party};

/// Number of rows in the form table
pub const FORM_ROWS: usize = 17;

/// Number of grid columns in the form table
pub const FORM_COLUMNS: usize = 3;

/// Border applied to every edge and gridline of the form table
pub const FORM_BORDER: Border = Border {
    style: BorderStyle::Single,
    size: 4,
    space: 0,
    color: RgbColor::BLACK,
};

const COLUMN_WIDTHS_IN: [f64; FORM_COLUMNS] = [0.39, 1.30, 5.68];

/// Widths of the number, label and value columns
pub fn column_widths() -> [Length; FORM_COLUMNS] {
    COLUMN_WIDTHS_IN.map(Length::inches)
}

/// Named row-height bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeightKey {
    TinyGap,
    SmallText,
    BaseText,
    Section,
    MajorSection,
}

impl HeightKey {
    pub const ALL: [HeightKey; 5] = [
        HeightKey::TinyGap,
        HeightKey::SmallText,
        HeightKey::BaseText,
        HeightKey::Section,
        HeightKey::MajorSection,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HeightKey::TinyGap => "tiny_gap",
            HeightKey::SmallText => "small_text",
            HeightKey::BaseText => "base_text",
            HeightKey::Section => "section",
            HeightKey::MajorSection => "major_section",
        }
    }
}

/// Minimum height for each [`HeightKey`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowHeights {
    pub tiny_gap: Length,
    pub small_text: Length,
    pub base_text: Length,
    pub section: Length,
    pub major_section: Length,
}

impl Default for RowHeights {
    fn default() -> Self {
        Self {
            tiny_gap: Length::inches(0.24),
            small_text: Length::inches(0.38),
            base_text: Length::inches(0.46),
            section: Length::inches(1.13),
            major_section: Length::inches(1.57),
        }
    }
}

impl RowHeights {
    pub fn get(&self, key: HeightKey) -> Length {
        match key {
            HeightKey::TinyGap => self.tiny_gap,
            HeightKey::SmallText => self.small_text,
            HeightKey::BaseText => self.base_text,
            HeightKey::Section => self.section,
            HeightKey::MajorSection => self.major_section,
        }
    }
}

/// Ordered height predicates; the first match wins
const HEIGHT_RULES: [(fn(usize) -> bool, HeightKey); 4] = [
    (|i| i == 2 || (4..=8).contains(&i), HeightKey::SmallText),
    (|i| i == 3, HeightKey::Section),
    (|i| i == 10, HeightKey::MajorSection),
    (|i| i == 16, HeightKey::TinyGap),
];

/// Height bucket for row `idx`, falling back to [`HeightKey::BaseText`]
pub fn resolve_height_key(idx: usize) -> HeightKey {
    HEIGHT_RULES
        .iter()
        .find(|(matches, _)| matches(idx))
        .map(|&(_, key)| key)
        .unwrap_or(HeightKey::BaseText)
}

/// How a row's cells are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeRule {
    /// One cell spanning all three columns
    Full,
    /// Number column kept, label and value columns joined
    Right,
    None,
}

impl MergeRule {
    /// Inclusive grid column range to merge, if any
    pub fn columns(self) -> Option<(usize, usize)> {
        match self {
            MergeRule::Full => Some((0, FORM_COLUMNS - 1)),
            MergeRule::Right => Some((1, FORM_COLUMNS - 1)),
            MergeRule::None => None,
        }
    }
}

/// Merge rule for row `idx`
pub fn merge_rule(idx: usize) -> MergeRule {
    match idx {
        0 | 14 | 15 => MergeRule::Full,
        2 | 7 | 8 | 16 => MergeRule::Right,
        _ => MergeRule::None,
    }
}

/// What a row of the form shows
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowRole {
    /// Bold heading across the whole row
    SectionLabel { text: &'static str },
    /// Optional number, bold label, bold party name
    NameRow {
        party: Party,
        number: Option<&'static str>,
        label: &'static str,
    },
    /// Bold heading in the merged label/value cell, optionally numbered
    Subheading {
        number: Option<&'static str>,
        text: &'static str,
    },
    /// Registered and correspondence addresses of a party
    AddressBlock {
        party: Party,
        number: Option<&'static str>,
        /// Space after the registered address, in inches
        gap_in: f64,
    },
    ContactField { party: Party, kind: ContactKind },
    /// Centered, bold, underlined title across the whole row
    TitleLine { text: &'static str },
    NatureOfDispute { text: &'static str },
}

pub const ROW_ROLES: [RowRole; FORM_ROWS] = [
    RowRole::SectionLabel {
        text: "DETAILS OF PARTIES:",
    },
    RowRole::NameRow {
        party: Party::Applicant,
        number: Some("1"),
        label: "Name of\nApplicant",
    },
    RowRole::Subheading {
        number: None,
        text: "Address and contact details of Applicant",
    },
    RowRole::AddressBlock {
        party: Party::Applicant,
        number: Some("1"),
        gap_in: 0.28,
    },
    RowRole::ContactField {
        party: Party::Applicant,
        kind: ContactKind::Phone,
    },
    RowRole::ContactField {
        party: Party::Applicant,
        kind: ContactKind::Mobile,
    },
    RowRole::ContactField {
        party: Party::Applicant,
        kind: ContactKind::Email,
    },
    RowRole::Subheading {
        number: Some("2"),
        text: "Name, Address and Contact details of Opposite Party:",
    },
    RowRole::Subheading {
        number: None,
        text: "Address and contact details of Defendant/s",
    },
    RowRole::NameRow {
        party: Party::Defendant,
        number: None,
        label: "Name",
    },
    RowRole::AddressBlock {
        party: Party::Defendant,
        number: None,
        gap_in: 0.68,
    },
    RowRole::ContactField {
        party: Party::Defendant,
        kind: ContactKind::Phone,
    },
    RowRole::ContactField {
        party: Party::Defendant,
        kind: ContactKind::Mobile,
    },
    RowRole::ContactField {
        party: Party::Defendant,
        kind: ContactKind::Email,
    },
    RowRole::SectionLabel {
        text: "DETAILS OF DISPUTE:",
    },
    RowRole::TitleLine {
        text: "THE COMM. COURTS (PRE-INSTITUTION………SETTLEMENT) RULES,2018",
    },
    RowRole::NatureOfDispute {
        text: "Nature of disputes as per section 2(1)(c) of the Commercial Courts Act, 2015 (4 of 2016):",
    },
];

/// Role of row `idx`, or `None` past the last row
pub fn row_role(idx: usize) -> Option<RowRole> {
    ROW_ROLES.get(idx).copied()
}
