//! Request/response types for the import API.

use serde::{Deserialize, Serialize};

use crate::row::CsvRow;

/// POST /api/import/row request: one row plus the anti-forgery token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRowRequest {
    pub token: String,
    pub row: CsvRow,
}

/// POST /api/import/file request: a whole CSV document in one call, the
/// ingestion path for callers that do their own file handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportFileRequest {
    pub token: String,
    pub csv: String,
}

/// Per-row import outcome.
///
/// `ok` is false only when the underlying record upsert signalled a
/// storage error; validation skips still report `ok: true`. `label` echoes
/// the row's Name field untouched so client-side logs line up with the
/// source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub ok: bool,
    pub label: String,
}

impl ImportOutcome {
    pub fn processed(label: impl Into<String>) -> Self {
        Self {
            ok: true,
            label: label.into(),
        }
    }

    pub fn failed(label: impl Into<String>) -> Self {
        Self {
            ok: false,
            label: label.into(),
        }
    }
}

/// POST /api/import/file response: outcomes in row order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportFileResponse {
    pub total: usize,
    pub outcomes: Vec<ImportOutcome>,
}
