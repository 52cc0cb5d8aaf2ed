use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CatalogKind;

/// Audit record for one ingestion invocation.
///
/// Created once per run and immutable thereafter. `errors` may be absent when
/// the run had none, or when persisting the full list failed and the run was
/// saved in degraded form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRun {
    pub id: Uuid,
    pub catalog: CatalogKind,
    pub file_name: String,
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    pub errors: Option<Vec<String>>,
    pub imported_by: String,
    pub created_at: NaiveDateTime,
}

/// The fields of an [`ImportRun`] before the store assigns identity.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRunDraft {
    pub catalog: CatalogKind,
    pub file_name: String,
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    pub errors: Option<Vec<String>>,
    pub imported_by: String,
}

/// Result returned to the caller of an ingestion run.
///
/// `total == success + failed` always holds; rows skipped for having an
/// empty primary column are not counted anywhere. `errors` carries at most
/// the summary cap; `truncated` is set when more failures occurred than the
/// list shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    pub errors: Vec<String>,
    pub truncated: bool,
    pub import_run_id: Option<Uuid>,
}
