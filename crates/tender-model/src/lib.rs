//! `tender-model` defines the core data structures for the tender-price
//! catalogs.
//!
//! The crate is intentionally self-contained so it can be reused by:
//! - the ingestion pipeline (row mapping, validation, batch writing)
//! - the filter compiler and statistics engine
//! - the SQLite-backed record store
//!
//! The per-catalog field registries in [`fields`] are the single source of
//! truth for positional column order, field typing, validation limits, and
//! SQL column names.

mod catalog;
pub mod dates;
pub mod fields;
mod filter;
mod import_run;
mod record;

pub use catalog::{CatalogKind, UnknownCatalog};
pub use fields::{FieldDef, FieldKind, PRODUCT_NAME_MAX_LEN};
pub use filter::{ComparisonOperator, Condition, ConditionGroup, MatchType, SearchFilter};
pub use import_run::{ImportRun, ImportRunDraft, ImportSummary};
pub use record::{
    Bioequivalence, CatalogRecord, FieldValue, OriginalBrand, RecordShapeError, StoredRecord,
    WinningBidA, WinningBidB,
};
