//! Per-cell cleaning and coercion.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tender_model::dates::parse_date_text;

use crate::decode::RawCell;

/// Seconds per day, for fractional spreadsheet serials.
const DAY_SECONDS: f64 = 86_400.0;

/// The serial-date correction applied by the historical import convention:
/// serial day-counts are anchored at 1900-01-01 minus two days. This
/// compensates for the Lotus 1-2-3 leap-year defect and must be preserved
/// as-is — existing stored data was imported under it.
const SERIAL_CORRECTION_DAYS: f64 = 2.0;

/// Clean a cell into an optional text value.
///
/// Trims, strips NUL bytes and control characters (tabs and newlines
/// survive), and treats an empty result as absence rather than as an empty
/// string value.
pub fn clean_cell_text(cell: &RawCell) -> Option<String> {
    match cell {
        RawCell::Empty => None,
        RawCell::Text(s) => clean_text(s),
        RawCell::Number(n) => Some(number_to_text(*n)),
        RawCell::Bool(b) => Some(b.to_string()),
        RawCell::DateTime(dt) => Some(dt.format("%Y-%m-%d").to_string()),
    }
}

/// Clean raw text: trim, then drop NUL and control characters.
pub fn clean_text(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c == '\t' || *c == '\n' || *c == '\r' || !c.is_control())
        .collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Coerce a cell into a calendar date.
///
/// Precedence: a native date value, then a parsable date string, then a
/// numeric day-count interpreted as a spreadsheet serial.
pub fn coerce_date(cell: &RawCell) -> Option<NaiveDateTime> {
    match cell {
        RawCell::DateTime(dt) => Some(*dt),
        RawCell::Text(s) => parse_date_text(s),
        RawCell::Number(n) => serial_date(*n),
        RawCell::Empty | RawCell::Bool(_) => None,
    }
}

/// Convert a spreadsheet serial day-count to a date using the fixed
/// 1900-01-01 epoch with the historical two-day correction.
pub fn serial_date(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1900, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let seconds = ((serial - SERIAL_CORRECTION_DAYS) * DAY_SECONDS).round();
    if seconds.abs() > i64::MAX as f64 {
        return None;
    }
    epoch.checked_add_signed(Duration::seconds(seconds as i64))
}

/// Render a numeric cell the way it reads in the grid: integral values lose
/// the trailing `.0`.
fn number_to_text(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
