//! The ingestion orchestrator.
//!
//! Drives decode → map → validate in one in-memory pass, then the chunked
//! store writes, aggregates the counts, and persists one audit record per
//! run. Everything after the header row is stripped is handled per-row and
//! never aborts the run; audit persistence is best-effort and never raises
//! to the caller.

use tender_model::{CatalogKind, ImportRunDraft, ImportSummary};
use thiserror::Error;
use uuid::Uuid;

use crate::decode::{decode_rows, DecodeError};
use crate::mapper::{map_row, primary_column_is_empty};
use crate::validate::validate;
use crate::writer::{write_batches, PendingRow, RecordSink, SinkError};

/// Input-size ceiling, enforced before any parsing work.
pub const MAX_PAYLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Row-level error strings collected per run.
pub const ERROR_CAP: usize = 100;

/// Error strings returned in the summary for immediate display.
pub const SUMMARY_ERROR_CAP: usize = 10;

/// Where audit records are persisted.
pub trait AuditSink {
    fn save_import_run(&self, draft: &ImportRunDraft) -> Result<Uuid, SinkError>;
}

/// Outcome of the two-step audit save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    SavedWithErrors(Uuid),
    SavedWithoutErrors(Uuid),
    NotSaved,
}

impl AuditOutcome {
    pub fn run_id(self) -> Option<Uuid> {
        match self {
            AuditOutcome::SavedWithErrors(id) | AuditOutcome::SavedWithoutErrors(id) => Some(id),
            AuditOutcome::NotSaved => None,
        }
    }
}

/// Terminal rejections. Once the header row has been stripped successfully,
/// nothing in the run raises one of these.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("payload is {size} bytes; the limit is {limit}")]
    TooLarge { size: usize, limit: usize },
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("file has no data rows")]
    NoDataRows,
}

/// Run one ingestion: decode the payload, stream rows through mapping and
/// validation, write validated drafts in chunks, and record the run.
///
/// The returned summary always satisfies `total == success + failed`; rows
/// skipped for an empty primary column are excluded from all counts. An
/// audit-persistence failure degrades (and is logged) without affecting the
/// summary.
pub fn ingest<S>(
    store: &S,
    catalog: CatalogKind,
    payload: &[u8],
    file_name: &str,
    imported_by: &str,
) -> Result<ImportSummary, IngestError>
where
    S: RecordSink + AuditSink,
{
    if payload.len() > MAX_PAYLOAD_BYTES {
        return Err(IngestError::TooLarge {
            size: payload.len(),
            limit: MAX_PAYLOAD_BYTES,
        });
    }

    let rows = decode_rows(payload)?;
    if rows.len() <= 1 {
        return Err(IngestError::NoDataRows);
    }
    let data_rows = &rows[1..];

    // Phase 1: map + validate, fully in memory.
    let mut pending: Vec<PendingRow> = Vec::new();
    let mut failed: u64 = 0;
    let mut errors: Vec<String> = Vec::new();
    for (index, row) in data_rows.iter().enumerate() {
        if primary_column_is_empty(row) {
            continue;
        }
        // 1-based spreadsheet line: +1 for the header, +1 for one-based rows.
        let line = index + 2;
        let record = map_row(catalog, row);
        match validate(&record, line) {
            Ok(()) => pending.push(PendingRow { line, record }),
            Err(err) => {
                failed += 1;
                if errors.len() < ERROR_CAP {
                    errors.push(err.to_string());
                }
            }
        }
    }

    // Phase 2: store writes only.
    let report = write_batches(store, &pending);
    let success = report.success;
    failed += report.failures.len() as u64;
    for failure in &report.failures {
        if errors.len() < ERROR_CAP {
            errors.push(failure.to_string());
        }
    }

    let total = success + failed;

    let outcome = persist_import_run(
        store,
        ImportRunDraft {
            catalog,
            file_name: file_name.to_string(),
            total,
            success,
            failed,
            errors: if errors.is_empty() {
                None
            } else {
                Some(errors.clone())
            },
            imported_by: imported_by.to_string(),
        },
    );

    let summary_errors: Vec<String> = errors.iter().take(SUMMARY_ERROR_CAP).cloned().collect();
    let truncated = (failed as usize) > summary_errors.len();

    Ok(ImportSummary {
        total,
        success,
        failed,
        errors: summary_errors,
        truncated,
        import_run_id: outcome.run_id(),
    })
}

/// Save the audit record, degrading once: a failure with the error list
/// attached retries without it; a second failure is logged and swallowed.
pub fn persist_import_run<S: AuditSink + ?Sized>(
    sink: &S,
    mut draft: ImportRunDraft,
) -> AuditOutcome {
    let had_errors = draft.errors.is_some();
    match sink.save_import_run(&draft) {
        Ok(id) if had_errors => AuditOutcome::SavedWithErrors(id),
        Ok(id) => AuditOutcome::SavedWithoutErrors(id),
        Err(err) if had_errors => {
            log::warn!("saving import run with its error list failed ({err}); retrying without it");
            draft.errors = None;
            match sink.save_import_run(&draft) {
                Ok(id) => AuditOutcome::SavedWithoutErrors(id),
                Err(err) => {
                    log::warn!("saving import run failed again ({err}); dropping the audit record");
                    AuditOutcome::NotSaved
                }
            }
        }
        Err(err) => {
            log::warn!("saving import run failed ({err}); dropping the audit record");
            AuditOutcome::NotSaved
        }
    }
}
