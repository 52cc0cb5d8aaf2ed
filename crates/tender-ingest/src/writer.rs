//! Chunked batch writing with row-by-row fallback.

use tender_model::CatalogRecord;
use thiserror::Error;

use crate::validate::RowError;

/// Rows persisted per multi-row insert attempt.
pub const BATCH_SIZE: usize = 1_000;

/// Opaque failure reported by a sink operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SinkError(pub String);

impl SinkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Where validated drafts are persisted.
///
/// `insert_many` must be all-or-nothing: when it fails, no row of the slice
/// may remain applied, because the writer retries every row individually.
pub trait RecordSink {
    fn insert_many(&self, records: &[&CatalogRecord]) -> Result<(), SinkError>;
    fn insert_one(&self, record: &CatalogRecord) -> Result<(), SinkError>;
}

/// A validated draft still tagged with its spreadsheet line number.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRow {
    pub line: usize,
    pub record: CatalogRecord,
}

/// Outcome of writing one run's validated drafts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteReport {
    pub success: u64,
    pub failures: Vec<RowError>,
}

/// Persist drafts in fixed-size chunks.
///
/// Each chunk is first attempted as one multi-row insert; if that fails for
/// any reason the chunk result is discarded and every row is inserted
/// individually, so a chunk-level failure never silently drops an
/// otherwise-valid row. Only a failure of the per-row fallback counts as a
/// final failure for that row.
pub fn write_batches(sink: &dyn RecordSink, rows: &[PendingRow]) -> WriteReport {
    let mut report = WriteReport::default();

    for chunk in rows.chunks(BATCH_SIZE) {
        let records: Vec<&CatalogRecord> = chunk.iter().map(|r| &r.record).collect();
        match sink.insert_many(&records) {
            Ok(()) => report.success += chunk.len() as u64,
            Err(err) => {
                log::warn!(
                    "batch insert of {} rows failed ({err}); retrying row-by-row",
                    chunk.len()
                );
                for row in chunk {
                    match sink.insert_one(&row.record) {
                        Ok(()) => report.success += 1,
                        Err(err) => report.failures.push(RowError::new(row.line, err.to_string())),
                    }
                }
            }
        }
    }

    report
}
