//! Length units used by WordprocessingML
//!
//! Lengths are stored in English Metric Units (EMU) and converted to the unit
//! each XML attribute expects: twentieths of a point (`w:w`, `w:pgMar`,
//! `w:trHeight`, `w:spacing`) or half-points (`w:sz`).

use serde::{Deserialize, Serialize};

const EMU_PER_INCH: f64 = 914_400.0;
const EMU_PER_PT: f64 = 12_700.0;
const EMU_PER_TWIP: f64 = 635.0;

/// A length in English Metric Units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Length(i64);

impl Length {
    /// Zero length
    pub const ZERO: Length = Length(0);

    /// Construct from raw EMU
    pub const fn emu(emu: i64) -> Self {
        Self(emu)
    }

    /// Construct from inches (truncated to whole EMU)
    pub fn inches(value: f64) -> Self {
        Self((value * EMU_PER_INCH) as i64)
    }

    /// Construct from points (truncated to whole EMU)
    pub fn pt(value: f64) -> Self {
        Self((value * EMU_PER_PT) as i64)
    }

    /// Construct from twentieths of a point, saturating at the `i64` range
    pub fn twips(value: i64) -> Self {
        Self(value.saturating_mul(EMU_PER_TWIP as i64))
    }

    /// Raw EMU value
    pub fn as_emu(self) -> i64 {
        self.0
    }

    /// Value in inches
    pub fn as_inches(self) -> f64 {
        self.0 as f64 / EMU_PER_INCH
    }

    /// Value in points
    pub fn as_pt(self) -> f64 {
        self.0 as f64 / EMU_PER_PT
    }

    /// Value in twentieths of a point, rounded to the nearest twip
    pub fn as_twips(self) -> i64 {
        (self.0 as f64 / EMU_PER_TWIP).round() as i64
    }

    /// Value in half-points, truncated (the `w:sz` unit)
    pub fn as_half_points(self) -> i64 {
        (self.as_pt() * 2.0) as i64
    }
}

impl std::ops::Add for Length {
    type Output = Length;

    fn add(self, rhs: Length) -> Length {
        Length(self.0.saturating_add(rhs.0))
    }
}

impl std::ops::Sub for Length {
    type Output = Length;

    fn sub(self, rhs: Length) -> Length {
        Length(self.0.saturating_sub(rhs.0))
    }
}

impl std::iter::Sum for Length {
    fn sum<I: Iterator<Item = Length>>(iter: I) -> Length {
        iter.fold(Length::ZERO, |acc, l| acc + l)
    }
}

/// A 24-bit RGB color written as six hex digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbColor(pub u8, pub u8, pub u8);

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor(0x00, 0x00, 0x00);

    /// Parse `RRGGBB` (an optional leading `#` is accepted)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Uppercase hex form used in `w:color`
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl Serialize for RgbColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RgbColor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        RgbColor::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid RGB color: {}", s)))
    }
}
