//! Date-text parsing shared by ingestion coercion and filter compilation.

use chrono::{NaiveDate, NaiveDateTime};

/// Parse a calendar date (optionally with a time part) out of user-supplied
/// text.
///
/// ISO forms are tried first; ambiguous numeric dates prefer day-first order,
/// matching the convention of the source spreadsheets, with month-first as a
/// fallback.
pub fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    for format in [
        "%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y",
    ] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}
