//! Field normalizers
//!
//! Best-effort conversions from raw page tokens (count labels, currency
//! strings, rating text) to typed values. None of these fail: unparseable
//! input yields the zero default.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::ExtractError;

static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(-?[0-9]+)(?:([.,])([0-9]+))?").unwrap());

/// First run of digits in a label: "2 beds" -> 2, "寝室1室" -> 1, "Studio" -> 0
pub fn count_from_label(label: &str) -> u32 {
    DIGIT_RUN
        .find(label)
        .map(|m| m.as_str().parse::<u32>().unwrap_or(u32::MAX))
        .unwrap_or(0)
}

/// Digits of a currency string, or None if it has none: "¥15,000" -> 15000
pub fn parse_price(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    // All-digit input can only fail on overflow
    Some(digits.parse::<u64>().unwrap_or(u64::MAX))
}

/// Like [`parse_price`] but defaults to 0
pub fn price_from_text(text: &str) -> u64 {
    parse_price(text).unwrap_or(0)
}

/// First decimal number in noisy text: "4.85 (120)" -> 4.85, "1.5 baths" -> 1.5
///
/// A leading minus is kept so string coordinates ("-33.86") keep their sign.
/// A comma followed by one or two digits is a decimal mark ("4,5"); followed
/// by three it is a thousands separator ("1,234").
pub fn float_from_text(text: &str) -> f64 {
    let Some(caps) = DECIMAL.captures(text) else {
        return 0.0;
    };

    let whole = &caps[1];
    let number = match (caps.get(2), caps.get(3)) {
        (Some(sep), Some(frac)) if sep.as_str() == "," && frac.as_str().len() == 3 => {
            format!("{}{}", whole, frac.as_str())
        }
        (Some(_), Some(frac)) => format!("{}.{}", whole, frac.as_str()),
        _ => whole.to_string(),
    };

    number.parse::<f64>().unwrap_or(0.0)
}

/// Clamp a rating into [0, 5], mapping NaN to 0
pub fn clamp_rating(rating: f64) -> f64 {
    if rating.is_nan() {
        0.0
    } else {
        rating.clamp(0.0, 5.0)
    }
}

/// Semantic field a label row describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelField {
    Guests,
    Bedrooms,
    Bathrooms,
    CleaningFee,
}

/// One row of the label table, as configured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRow {
    pub field: LabelField,
    /// Regex alternatives, tried in order
    pub patterns: Vec<String>,
}

impl LabelRow {
    fn new(field: LabelField, patterns: &[&str]) -> Self {
        Self {
            field,
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// English and Japanese labels seen on listing pages
pub fn default_label_rows() -> Vec<LabelRow> {
    vec![
        LabelRow::new(LabelField::Guests, &[r"guests?", "人が泊まれます", "ゲスト"]),
        LabelRow::new(LabelField::Bedrooms, &[r"bedrooms?", "寝室"]),
        LabelRow::new(LabelField::Bathrooms, &[r"baths?", r"bathrooms?", "バスルーム"]),
        LabelRow::new(LabelField::CleaningFee, &[r"[Cc]leaning fee", "清掃料金"]),
    ]
}

/// Compiled label table: semantic field -> ordered pattern alternatives
#[derive(Debug, Clone)]
pub struct LabelTable {
    rows: Vec<(LabelField, Vec<Regex>)>,
}

impl LabelTable {
    /// Compile rows. Rows for the same field are merged in order.
    pub fn compile(rows: &[LabelRow]) -> Result<Self, ExtractError> {
        let mut compiled: Vec<(LabelField, Vec<Regex>)> = Vec::new();

        for row in rows {
            let mut patterns = Vec::with_capacity(row.patterns.len());
            for pattern in &row.patterns {
                let re = Regex::new(pattern).map_err(|source| ExtractError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
                patterns.push(re);
            }

            match compiled.iter_mut().find(|(field, _)| *field == row.field) {
                Some((_, existing)) => existing.extend(patterns),
                None => compiled.push((row.field, patterns)),
            }
        }

        Ok(Self { rows: compiled })
    }

    /// First item whose text matches any alternative for `field`
    pub fn find<'a>(&self, field: LabelField, items: &[&'a str]) -> Option<&'a str> {
        let patterns = self
            .rows
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, patterns)| patterns)?;

        items
            .iter()
            .copied()
            .find(|item| patterns.iter().any(|re| re.is_match(item)))
    }
}
