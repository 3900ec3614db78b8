//! CSV parsing back into row mappings.
//!
//! The counterpart to the writer: reads a delimited file fully into memory
//! and returns one string map per row. Off the pipeline's hot path, but used
//! by downstream tooling and by tests to confirm what was materialized.

use std::collections::HashMap;
use std::path::Path;

use crate::error::AppError;

/// Options for [`read_rows`].
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    /// Treat the first row as column headers and key each row map by them.
    /// When disabled, rows are keyed by zero-based column index.
    pub has_headers: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self { has_headers: true }
    }
}

/// Parses a CSV file into a sequence of row mappings, fully materialized
/// before returning. Empty lines are skipped by the parser.
///
/// # Errors
///
/// Returns `AppError::Csv` if the file cannot be opened or a row fails to
/// parse.
pub fn read_rows(
    path: &Path,
    options: ReadOptions,
) -> Result<Vec<HashMap<String, String>>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(options.has_headers)
        .from_path(path)
        .map_err(|e| AppError::Csv(format!("failed to open {}: {}", path.display(), e)))?;

    let mut rows = Vec::new();

    if options.has_headers {
        let headers = reader
            .headers()
            .map_err(|e| AppError::Csv(format!("failed to read headers: {}", e)))?
            .clone();

        for result in reader.records() {
            let record =
                result.map_err(|e| AppError::Csv(format!("failed to read record: {}", e)))?;
            rows.push(
                headers
                    .iter()
                    .zip(record.iter())
                    .map(|(header, value)| (header.to_string(), value.to_string()))
                    .collect(),
            );
        }
    } else {
        for result in reader.records() {
            let record =
                result.map_err(|e| AppError::Csv(format!("failed to read record: {}", e)))?;
            rows.push(
                record
                    .iter()
                    .enumerate()
                    .map(|(index, value)| (index.to_string(), value.to_string()))
                    .collect(),
            );
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FieldValue, HeaderField, Record};
    use crate::tabular::CsvTable;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    #[test]
    fn round_trips_written_records_as_strings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");

        let mut r = Record::new();
        r.insert("id", FieldValue::Text("u-1".into()));
        r.insert("size", FieldValue::Number(120.into()));
        r.insert(
            "createdAt",
            FieldValue::Timestamp(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()),
        );

        let header = vec![
            HeaderField::new("id", "id"),
            HeaderField::new("size", "size"),
            HeaderField::new("createdAt", "createdAt"),
        ];
        CsvTable::new(&path, header).write(&[r]).unwrap();

        let rows = read_rows(&path, ReadOptions::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], "u-1");
        assert_eq!(rows[0]["size"], "120");
        assert_eq!(rows[0]["createdAt"], "2024-06-01T08:00:00.000Z");
    }

    #[test]
    fn reads_quoted_fields_with_embedded_delimiters() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "name,bio\n\"Doe, J\",\"line1\nline2\"\n").unwrap();

        let rows = read_rows(&path, ReadOptions::default()).unwrap();
        assert_eq!(rows[0]["name"], "Doe, J");
        assert_eq!(rows[0]["bio"], "line1\nline2");
    }

    #[test]
    fn header_only_file_yields_no_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "a,b\n").unwrap();

        let rows = read_rows(&path, ReadOptions::default()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn empty_file_yields_no_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "").unwrap();

        let rows = read_rows(&path, ReadOptions::default()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn disabling_header_inference_keys_by_column_index() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "a,b\nc,d\n").unwrap();

        let rows = read_rows(&path, ReadOptions { has_headers: false }).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["0"], "a");
        assert_eq!(rows[1]["1"], "d");
    }

    #[test]
    fn missing_file_reports_csv_error() {
        let dir = TempDir::new().unwrap();
        let result = read_rows(&dir.path().join("missing.csv"), ReadOptions::default());
        assert!(matches!(result, Err(AppError::Csv(_))));
    }
}
