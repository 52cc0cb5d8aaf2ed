//! `tender-ingest` turns an uploaded tabular payload into validated,
//! persisted catalog records.
//!
//! The pipeline is: [`decode`] the payload into raw rows, [`mapper`] +
//! [`coerce`] each row into a record draft, [`validate`] it locally, then
//! [`writer`] persists drafts in chunks with a row-by-row fallback. The
//! orchestrator in [`run`] wires the stages together, aggregates counts,
//! and records one [`tender_model::ImportRun`] per invocation.
//!
//! Store access goes through the [`RecordSink`] and [`AuditSink`] seams;
//! `tender-store` provides the SQLite implementation.

pub mod coerce;
pub mod decode;
pub mod mapper;
pub mod run;
pub mod validate;
pub mod writer;

pub use decode::{DecodeError, RawCell};
pub use run::{
    ingest, persist_import_run, AuditOutcome, AuditSink, IngestError, ERROR_CAP,
    MAX_PAYLOAD_BYTES, SUMMARY_ERROR_CAP,
};
pub use validate::RowError;
pub use writer::{write_batches, PendingRow, RecordSink, SinkError, WriteReport, BATCH_SIZE};
