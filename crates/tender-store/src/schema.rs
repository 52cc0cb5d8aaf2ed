use rusqlite::Connection;
use tender_model::fields::registry;
use tender_model::{CatalogKind, PRODUCT_NAME_MAX_LEN};

pub(crate) fn init(conn: &Connection) -> rusqlite::Result<()> {
    // Ensure foreign keys are enforced (disabled by default in SQLite).
    conn.pragma_update(None, "foreign_keys", "ON")?;

    let mut ddl = String::new();
    for kind in CatalogKind::ALL {
        ddl.push_str(&catalog_table_ddl(kind));
    }
    ddl.push_str(IMPORT_RUNS_DDL);
    conn.execute_batch(&ddl)
}

/// One table per catalog, columns generated from the field registry so the
/// schema cannot drift from the positional field lists.
fn catalog_table_ddl(kind: CatalogKind) -> String {
    let table = kind.table();
    let mut columns = String::new();
    for field in registry(kind) {
        if field.name == "product_name" {
            // The CHECK mirrors the validator's limit; a multi-row insert
            // that trips it rolls back and takes the row-by-row path.
            columns.push_str(&format!(
                "  product_name TEXT NOT NULL CHECK (length(product_name) <= {PRODUCT_NAME_MAX_LEN}),\n"
            ));
        } else {
            // Dates are stored as ISO-8601 text; lexicographic order matches
            // chronological order.
            columns.push_str(&format!("  {} TEXT,\n", field.name));
        }
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\n  id TEXT PRIMARY KEY,\n{columns}  created_at TEXT NOT NULL\n);\nCREATE INDEX IF NOT EXISTS idx_{table}_created_at ON {table}(created_at);\n"
    )
}

const IMPORT_RUNS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS import_runs (
  id TEXT PRIMARY KEY,
  catalog TEXT NOT NULL,
  file_name TEXT NOT NULL,
  total INTEGER NOT NULL,
  success INTEGER NOT NULL,
  failed INTEGER NOT NULL,
  errors JSON,
  imported_by TEXT NOT NULL,
  created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_import_runs_catalog_created_at
  ON import_runs(catalog, created_at);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let conn = Connection::open_in_memory().expect("open");
        init(&conn).expect("first init");
        init(&conn).expect("second init");
    }

    #[test]
    fn every_catalog_table_exists_with_registry_columns() {
        let conn = Connection::open_in_memory().expect("open");
        init(&conn).expect("init");

        for kind in CatalogKind::ALL {
            let mut stmt = conn
                .prepare(&format!("PRAGMA table_info({})", kind.table()))
                .expect("pragma");
            let names: Vec<String> = stmt
                .query_map([], |r| r.get::<_, String>(1))
                .expect("query")
                .collect::<Result<_, _>>()
                .expect("rows");

            assert_eq!(names.first().map(String::as_str), Some("id"));
            assert_eq!(names.last().map(String::as_str), Some("created_at"));
            for field in registry(kind) {
                assert!(
                    names.iter().any(|n| n == field.name),
                    "{kind}: missing column {}",
                    field.name
                );
            }
        }
    }
}
