//! Raw cell to target type.
//!
//! Every coercer is total: a missing or unparsable cell yields the
//! documented fallback, never an error. `None` means the header was not found.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};

use tally_core::cell::CellValue;

/// Text values read as "flagged", after trimming and lower-casing.
pub const AFFIRMATIVE: &[&str] = &["yes", "true", "y", "1", "flagged", "mark", "highlight"];

/// Largest spreadsheet serial day accepted as a date (9999-12-31).
const MAX_SERIAL_DAY: f64 = 2_958_465.0;

/// Boolean flag. True for `true`, numeric `1`, and the affirmative
/// vocabulary; false for everything else.
#[must_use]
pub fn to_flag(raw: Option<&CellValue>) -> bool {
    match raw {
        Some(CellValue::Bool(b)) => *b,
        Some(CellValue::Number(n)) => (*n - 1.0).abs() < f64::EPSILON,
        Some(CellValue::Text(s)) => {
            let folded = s.trim().to_lowercase();
            AFFIRMATIVE.contains(&folded.as_str())
        }
        Some(CellValue::Empty) | None => false,
    }
}

/// Parse a numeric cell. Decimals, thousands separators, and surrounding
/// whitespace are accepted. Negative values are preserved. Non-finite
/// values count as unparsable.
#[must_use]
pub fn parse_quantity(raw: Option<&CellValue>) -> Option<f64> {
    let value = match raw? {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => parse_numeric(s)?,
        CellValue::Bool(_) | CellValue::Empty => return None,
    };
    value.is_finite().then_some(value)
}

/// Quantity with a `0` fallback. Negatives pass through; clamping happens
/// when the shortage is derived.
#[must_use]
pub fn to_quantity(raw: Option<&CellValue>) -> f64 {
    parse_quantity(raw).unwrap_or(0.0)
}

/// Trimmed text; empty for a missing cell. Whole numbers print without a
/// decimal part so numeric-looking codes survive ("123", not "123.0").
#[must_use]
pub fn to_trimmed_string(raw: Option<&CellValue>) -> String {
    raw.map(|cell| cell.to_string().trim().to_string())
        .unwrap_or_default()
}

/// Trimmed text, or `None` when missing or blank.
#[must_use]
pub fn to_optional_string(raw: Option<&CellValue>) -> Option<String> {
    let s = to_trimmed_string(raw);
    (!s.is_empty()).then_some(s)
}

/// Timestamp, or `None` when missing or unparsable.
///
/// Text accepts RFC 3339, `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`,
/// `MM/DD/YYYY`, and `DD-Mon-YYYY`. Numbers are spreadsheet serial days
/// counted from 1899-12-30.
#[must_use]
pub fn to_date(raw: Option<&CellValue>) -> Option<DateTime<Utc>> {
    match raw? {
        CellValue::Text(s) => parse_date_text(s.trim()),
        CellValue::Number(n) => from_serial_day(*n),
        CellValue::Bool(_) | CellValue::Empty => None,
    }
}

fn parse_numeric(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | ' ' | '\u{a0}'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

fn parse_date_text(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    ["%Y-%m-%d", "%m/%d/%Y", "%d-%b-%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

fn from_serial_day(serial: f64) -> Option<DateTime<Utc>> {
    if !(1.0..=MAX_SERIAL_DAY).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_time(NaiveTime::MIN);
    #[allow(clippy::cast_possible_truncation)]
    let seconds = (serial * 86_400.0).round() as i64;
    let offset = TimeDelta::try_seconds(seconds)?;
    epoch.checked_add_signed(offset).map(|dt| dt.and_utc())
}
