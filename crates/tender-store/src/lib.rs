//! `tender-store` is the SQLite-backed record store for the tender-price
//! catalogs.
//!
//! One table per catalog (columns generated from the field registries) plus
//! the `import_runs` audit table. The store implements the ingest sink
//! traits, lowers compiled [`tender_query::Predicate`]s to SQL for both
//! listing and statistics, and owns all record identity.

mod schema;
mod sql;
mod store;

pub use store::{
    Page, Pagination, Result, Store, StoreError, IMPORT_RUN_LIST_CAP, MAX_PAGE_LIMIT,
};
