//! File selection, capability checking, and parsing.

use std::path::Path;

use abim_common::csv::parse_csv;
use abim_common::CsvRow;
use chrono::{DateTime, Utc};

use crate::error::ClientError;

/// File metadata reported before an import starts.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub name: String,
    pub size_bytes: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Fail-closed capability check, run before any read is attempted: the
/// path must exist, be a regular file, and be openable. Anything else
/// aborts the import before it starts.
pub fn check_file(path: &Path) -> Result<(), ClientError> {
    let capability = |reason: String| ClientError::Capability {
        path: path.to_path_buf(),
        reason,
    };

    let meta = std::fs::metadata(path).map_err(|e| capability(e.to_string()))?;
    if !meta.is_file() {
        return Err(capability("not a regular file".to_string()));
    }
    std::fs::File::open(path).map_err(|e| capability(e.to_string()))?;
    Ok(())
}

/// Read the whole file as text and parse it into rows. No header row is
/// assumed; row 0 is data. A read error aborts this file's import with no
/// retry.
pub async fn read_and_parse(path: &Path) -> Result<(FileReport, Vec<CsvRow>), ClientError> {
    let read_err = |source: std::io::Error| ClientError::Read {
        path: path.to_path_buf(),
        source,
    };

    let meta = tokio::fs::metadata(path).await.map_err(read_err)?;
    let text = tokio::fs::read_to_string(path).await.map_err(read_err)?;

    let report = FileReport {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
        size_bytes: meta.len(),
        modified: meta.modified().ok().map(DateTime::<Utc>::from),
    };

    let rows = parse_csv(&text).into_iter().map(CsvRow::new).collect();
    Ok((report, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_fails_capability_check() {
        let err = check_file(Path::new("/nonexistent/import.csv")).unwrap_err();
        assert!(matches!(err, ClientError::Capability { .. }));
    }

    #[test]
    fn directory_fails_capability_check() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = check_file(dir.path()).unwrap_err();
        assert!(matches!(err, ClientError::Capability { .. }));
    }

    #[tokio::test]
    async fn reads_and_parses_rows() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bodies.csv");
        let mut file = std::fs::File::create(&path).expect("create file");
        writeln!(
            file,
            "101,Test Council,Council,Yes,Acme Audit,Jane Doe,jane@example.com,5000,2024"
        )
        .expect("write row");

        check_file(&path).expect("capability check");
        let (report, rows) = read_and_parse(&path).await.expect("read and parse");

        assert_eq!(report.name, "bodies.csv");
        assert!(report.size_bytes > 0);
        // Trailing newline leaves one empty row behind the data row
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name(), "Test Council");
        assert_eq!(rows[1].name(), "");
    }
}
