use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{NaiveDateTime, Timelike, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tender_ingest::{AuditSink, RecordSink, SinkError};
use tender_model::fields::{registry, FieldKind};
use tender_model::{
    CatalogKind, CatalogRecord, FieldValue, ImportRun, ImportRunDraft, RecordShapeError,
    StoredRecord,
};
use tender_query::{price_stats, Predicate, PriceStats};
use thiserror::Error;
use uuid::Uuid;

use crate::schema;
use crate::sql::{lower, SqlParam, DATETIME_FORMAT};

/// Newest-first cap on audit listings.
pub const IMPORT_RUN_LIST_CAP: usize = 50;

/// Upper bound on the page size a caller may request.
pub const MAX_PAGE_LIMIT: u64 = 500;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("record not found: {0}")]
    RecordNotFound(Uuid),
    #[error(transparent)]
    Shape(#[from] RecordShapeError),
    #[error("catalog {0} has no unit_price column")]
    NoPriceColumn(CatalogKind),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// One page of a listing, newest records first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub data: Vec<StoredRecord>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// SQLite-backed record store for all four catalogs plus the import audit.
#[derive(Debug, Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(Duration::from_secs(5))?;
        schema::init(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert one record (manual entry), assigning identity.
    pub fn insert_record(&self, record: &CatalogRecord) -> Result<StoredRecord> {
        let id = Uuid::new_v4();
        let created_at = now();
        let conn = self.conn.lock().expect("store mutex poisoned");
        insert_with(&conn, record, id, created_at)?;
        Ok(StoredRecord {
            id,
            created_at,
            record: record.clone(),
        })
    }

    pub fn get(&self, catalog: CatalogKind, id: Uuid) -> Result<StoredRecord> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let parts = conn
            .query_row(
                &format!(
                    "SELECT {} FROM {} WHERE id = ?1",
                    select_columns(catalog),
                    catalog.table()
                ),
                params![id.to_string()],
                |row| row_to_parts(catalog, row),
            )
            .optional()?;

        let Some((id, created_at, values)) = parts else {
            return Err(StoreError::RecordNotFound(id));
        };
        Ok(StoredRecord {
            id,
            created_at,
            record: CatalogRecord::from_values(catalog, values)?,
        })
    }

    /// Replace a record's fields, keeping its identity and creation time.
    pub fn update_record(&self, id: Uuid, record: &CatalogRecord) -> Result<StoredRecord> {
        let catalog = record.catalog();
        let assignments: Vec<String> = registry(catalog)
            .iter()
            .map(|f| format!("{} = ?", f.name))
            .collect();
        let mut bind = field_params(record);
        bind.push(SqlParam::Text(id.to_string()));

        {
            let conn = self.conn.lock().expect("store mutex poisoned");
            let changed = conn.execute(
                &format!(
                    "UPDATE {} SET {} WHERE id = ?",
                    catalog.table(),
                    assignments.join(", ")
                ),
                params_from_iter(&bind),
            )?;
            if changed == 0 {
                return Err(StoreError::RecordNotFound(id));
            }
        }

        self.get(catalog, id)
    }

    pub fn delete_record(&self, catalog: CatalogKind, id: Uuid) -> Result<()> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let changed = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", catalog.table()),
            params![id.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::RecordNotFound(id));
        }
        Ok(())
    }

    /// Bulk-delete every record of a catalog; returns the deleted count.
    pub fn clear(&self, catalog: CatalogKind) -> Result<usize> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        Ok(conn.execute(&format!("DELETE FROM {}", catalog.table()), [])?)
    }

    /// Paginated, newest-first listing under a compiled predicate.
    pub fn list(
        &self,
        catalog: CatalogKind,
        predicate: &Predicate,
        page: u64,
        limit: u64,
    ) -> Result<Page> {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_LIMIT);
        let filter = lower(predicate);

        let conn = self.conn.lock().expect("store mutex poisoned");
        let total: u64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE {}",
                catalog.table(),
                filter.clause
            ),
            params_from_iter(&filter.params),
            |row| row.get::<_, i64>(0),
        )? as u64;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} WHERE {} ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
            select_columns(catalog),
            catalog.table(),
            filter.clause
        ))?;
        let mut bind = filter.params;
        bind.push(SqlParam::Int(limit as i64));
        bind.push(SqlParam::Int(((page - 1) * limit) as i64));

        let rows = stmt.query_map(params_from_iter(&bind), |row| row_to_parts(catalog, row))?;
        let mut data = Vec::new();
        for parts in rows {
            let (id, created_at, values) = parts?;
            data.push(StoredRecord {
                id,
                created_at,
                record: CatalogRecord::from_values(catalog, values)?,
            });
        }

        Ok(Page {
            data,
            pagination: Pagination {
                page,
                limit,
                total,
                total_pages: if total == 0 { 0 } else { total.div_ceil(limit) },
            },
        })
    }

    /// Raw unit-price texts of every record matching the predicate.
    ///
    /// Statistics and listing run through the same [`lower`]ing of the same
    /// predicate, so their filter semantics cannot differ.
    pub fn unit_price_texts(
        &self,
        catalog: CatalogKind,
        predicate: &Predicate,
    ) -> Result<Vec<Option<String>>> {
        if !registry(catalog).iter().any(|f| f.name == "unit_price") {
            return Err(StoreError::NoPriceColumn(catalog));
        }
        let filter = lower(predicate);

        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT unit_price FROM {} WHERE {}",
            catalog.table(),
            filter.clause
        ))?;
        let rows = stmt.query_map(params_from_iter(&filter.params), |row| {
            row.get::<_, Option<String>>(0)
        })?;

        let mut texts = Vec::new();
        for text in rows {
            texts.push(text?);
        }
        Ok(texts)
    }

    /// Price statistics over the filtered catalog.
    pub fn stats(&self, catalog: CatalogKind, predicate: &Predicate) -> Result<PriceStats> {
        let texts = self.unit_price_texts(catalog, predicate)?;
        Ok(price_stats(&texts))
    }

    /// Persist one audit record. The error list is stored as a JSON array.
    pub fn save_import_run(&self, draft: &ImportRunDraft) -> Result<ImportRun> {
        let id = Uuid::new_v4();
        let created_at = now();
        let errors_json = draft
            .errors
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let conn = self.conn.lock().expect("store mutex poisoned");
        conn.execute(
            r#"
            INSERT INTO import_runs (
              id, catalog, file_name, total, success, failed, errors, imported_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                id.to_string(),
                draft.catalog.code(),
                &draft.file_name,
                draft.total as i64,
                draft.success as i64,
                draft.failed as i64,
                errors_json,
                &draft.imported_by,
                format_dt(created_at),
            ],
        )?;

        Ok(ImportRun {
            id,
            catalog: draft.catalog,
            file_name: draft.file_name.clone(),
            total: draft.total,
            success: draft.success,
            failed: draft.failed,
            errors: draft.errors.clone(),
            imported_by: draft.imported_by.clone(),
            created_at,
        })
    }

    /// Audit listing, newest first, optionally restricted to one catalog,
    /// capped at [`IMPORT_RUN_LIST_CAP`].
    pub fn list_import_runs(&self, catalog: Option<CatalogKind>) -> Result<Vec<ImportRun>> {
        let mut sql = String::from(
            "SELECT id, catalog, file_name, total, success, failed, errors, imported_by, created_at \
             FROM import_runs",
        );
        let mut bind: Vec<SqlParam> = Vec::new();
        if let Some(kind) = catalog {
            sql.push_str(" WHERE catalog = ?");
            bind.push(SqlParam::Text(kind.code().to_string()));
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC LIMIT ?");
        bind.push(SqlParam::Int(IMPORT_RUN_LIST_CAP as i64));

        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(&bind), |row| {
            let id: String = row.get(0)?;
            let catalog: String = row.get(1)?;
            let errors: Option<String> = row.get(6)?;
            let created_at: String = row.get(8)?;
            Ok(ImportRun {
                id: Uuid::parse_str(&id).map_err(|_| rusqlite::Error::InvalidQuery)?,
                catalog: CatalogKind::from_code(&catalog)
                    .map_err(|_| rusqlite::Error::InvalidQuery)?,
                file_name: row.get(2)?,
                total: row.get::<_, i64>(3)? as u64,
                success: row.get::<_, i64>(4)? as u64,
                failed: row.get::<_, i64>(5)? as u64,
                errors: match errors {
                    Some(json) => Some(
                        serde_json::from_str(&json).map_err(|_| rusqlite::Error::InvalidQuery)?,
                    ),
                    None => None,
                },
                imported_by: row.get(7)?,
                created_at: parse_dt(&created_at).ok_or(rusqlite::Error::InvalidQuery)?,
            })
        })?;

        let mut runs = Vec::new();
        for run in rows {
            runs.push(run?);
        }
        Ok(runs)
    }
}

impl RecordSink for Store {
    /// One transaction per chunk: either every row commits or none do, so
    /// the ingest writer can safely retry the whole chunk row-by-row.
    fn insert_many(&self, records: &[&CatalogRecord]) -> std::result::Result<(), SinkError> {
        let mut conn = self.conn.lock().expect("store mutex poisoned");
        let tx = conn.transaction().map_err(sink_err)?;
        for record in records {
            insert_with(&tx, record, Uuid::new_v4(), now()).map_err(sink_err)?;
        }
        tx.commit().map_err(sink_err)
    }

    fn insert_one(&self, record: &CatalogRecord) -> std::result::Result<(), SinkError> {
        self.insert_record(record)
            .map(|_| ())
            .map_err(|e| SinkError::new(e.to_string()))
    }
}

impl AuditSink for Store {
    fn save_import_run(&self, draft: &ImportRunDraft) -> std::result::Result<Uuid, SinkError> {
        Store::save_import_run(self, draft)
            .map(|run| run.id)
            .map_err(|e| SinkError::new(e.to_string()))
    }
}

fn sink_err(err: rusqlite::Error) -> SinkError {
    SinkError::new(err.to_string())
}

/// Current timestamp truncated to whole seconds, the stored precision.
fn now() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

pub(crate) fn format_dt(dt: NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

pub(crate) fn parse_dt(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT).ok()
}

fn select_columns(catalog: CatalogKind) -> String {
    let mut cols = String::from("id, created_at");
    for field in registry(catalog) {
        cols.push_str(", ");
        cols.push_str(field.name);
    }
    cols
}

fn insert_with(
    conn: &Connection,
    record: &CatalogRecord,
    id: Uuid,
    created_at: NaiveDateTime,
) -> rusqlite::Result<()> {
    let catalog = record.catalog();
    let fields = registry(catalog);

    let mut columns = String::from("id");
    let mut marks = String::from("?");
    for field in fields {
        columns.push_str(", ");
        columns.push_str(field.name);
        marks.push_str(", ?");
    }
    columns.push_str(", created_at");
    marks.push_str(", ?");

    let mut bind = Vec::with_capacity(fields.len() + 2);
    bind.push(SqlParam::Text(id.to_string()));
    bind.extend(field_params(record));
    bind.push(SqlParam::Text(format_dt(created_at)));

    conn.execute(
        &format!(
            "INSERT INTO {} ({columns}) VALUES ({marks})",
            catalog.table()
        ),
        params_from_iter(&bind),
    )?;
    Ok(())
}

fn field_params(record: &CatalogRecord) -> Vec<SqlParam> {
    record
        .values()
        .into_iter()
        .map(|value| match value {
            FieldValue::Text(Some(text)) => SqlParam::Text(text),
            FieldValue::Date(Some(dt)) => SqlParam::Text(format_dt(dt)),
            FieldValue::Text(None) | FieldValue::Date(None) => SqlParam::Null,
        })
        .collect()
}

fn row_to_parts(
    catalog: CatalogKind,
    row: &rusqlite::Row<'_>,
) -> rusqlite::Result<(Uuid, NaiveDateTime, Vec<FieldValue>)> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id).map_err(|_| rusqlite::Error::InvalidQuery)?;
    let created_at: String = row.get(1)?;
    let created_at = parse_dt(&created_at).ok_or(rusqlite::Error::InvalidQuery)?;

    let fields = registry(catalog);
    let mut values = Vec::with_capacity(fields.len());
    for (index, field) in fields.iter().enumerate() {
        let raw: Option<String> = row.get(2 + index)?;
        values.push(match field.kind {
            FieldKind::Date => FieldValue::Date(match raw {
                Some(text) => Some(parse_dt(&text).ok_or(rusqlite::Error::InvalidQuery)?),
                None => None,
            }),
            FieldKind::Text | FieldKind::NumericText => FieldValue::Text(raw),
        });
    }
    Ok((id, created_at, values))
}
