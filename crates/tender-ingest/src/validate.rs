//! Per-row validation.
//!
//! Purely local: required-field and length checks against the catalog's
//! registry. Never touches the record store.

use std::fmt;

use tender_model::fields::registry;
use tender_model::CatalogRecord;

/// A row-level failure, carrying the 1-based spreadsheet line number
/// (header row included, so data row `i` is line `i + 2`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

impl RowError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.line, self.message)
    }
}

/// Check a mapped draft. Valid drafts pass through unchanged; the caller
/// keeps ownership either way.
pub fn validate(record: &CatalogRecord, line: usize) -> Result<(), RowError> {
    if record.product_name().is_empty() {
        return Err(RowError::new(line, "product name must not be empty"));
    }

    let fields = registry(record.catalog());
    for (field, value) in fields.iter().zip(record.values()) {
        let Some(max_len) = field.max_len else {
            continue;
        };
        if let Some(text) = value.as_text() {
            let len = text.chars().count();
            if len > max_len {
                return Err(RowError::new(
                    line,
                    format!("{} is too long (maximum {max_len} characters)", field.name),
                ));
            }
        }
    }

    Ok(())
}
