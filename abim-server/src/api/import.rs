//! Import API handlers.

use abim_common::api::{ImportFileRequest, ImportFileResponse, ImportOutcome, ImportRowRequest};
use abim_common::csv::parse_csv;
use abim_common::CsvRow;
use axum::{extract::State, Json};
use tracing::{error, info};

use crate::importer;
use crate::store::SqliteStore;
use crate::AppState;

/// POST /api/import/row
///
/// Import one CSV row. Always answers 200 with an outcome; a storage
/// failure comes back as `ok: false` rather than an HTTP error, and the
/// partially written auditee stays as-is.
pub async fn import_row(
    State(state): State<AppState>,
    Json(request): Json<ImportRowRequest>,
) -> Json<ImportOutcome> {
    let store = SqliteStore::new(state.db.clone());
    Json(run_row(&store, request.row).await)
}

/// POST /api/import/file
///
/// The non-browser ingestion path: one CSV document, parsed server-side
/// and imported row by row in order.
pub async fn import_file(
    State(state): State<AppState>,
    Json(request): Json<ImportFileRequest>,
) -> Json<ImportFileResponse> {
    let store = SqliteStore::new(state.db.clone());
    let rows = parse_csv(&request.csv);
    info!("Importing CSV document with {} rows", rows.len());

    let mut outcomes = Vec::with_capacity(rows.len());
    for fields in rows {
        outcomes.push(run_row(&store, CsvRow::new(fields)).await);
    }

    Json(ImportFileResponse {
        total: outcomes.len(),
        outcomes,
    })
}

async fn run_row(store: &SqliteStore, row: CsvRow) -> ImportOutcome {
    match importer::import_row(store, &row).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Row import failed for {:?}: {}", row.name(), e);
            ImportOutcome::failed(row.name_raw())
        }
    }
}
