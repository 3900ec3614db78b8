//! Header-bound CSV writing with atomic file replacement.
//!
//! Writes go to a temporary file in the destination directory and are
//! atomically persisted over the final path, so a failed write never leaves
//! a partial file behind. Each call writes the destination fresh; there is no
//! incremental append to an existing file.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::AppError;
use crate::record::{HeaderField, Record};

/// Creates the file if absent, along with any missing parent directories.
/// Existing files are left untouched.
///
/// # Errors
///
/// Returns `AppError::Filesystem` if a directory or the file cannot be
/// created.
pub async fn ensure_file(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            AppError::Filesystem(format!(
                "failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let exists = tokio::fs::try_exists(path).await.map_err(|e| {
        AppError::Filesystem(format!("failed to stat {}: {}", path.display(), e))
    })?;

    if !exists {
        tokio::fs::write(path, b"").await.map_err(|e| {
            AppError::Filesystem(format!("failed to create {}: {}", path.display(), e))
        })?;
    }

    Ok(())
}

/// Checks that every header id is present among the first record's keys.
///
/// This is a first-record-only check: the field set of a run is derived from
/// its first record and assumed uniform, so a cheap structural probe catches
/// the schema drift worth catching without a per-record scan.
///
/// # Errors
///
/// Returns `AppError::SchemaMismatch` naming exactly the missing ids. Empty
/// input always validates.
pub fn validate(records: &[Record], header: &[HeaderField]) -> Result<(), AppError> {
    let Some(first) = records.first() else {
        return Ok(());
    };

    let missing: Vec<String> = header
        .iter()
        .filter(|field| !first.contains_key(&field.id))
        .map(|field| field.id.clone())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::SchemaMismatch { missing })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CsvTable
// ─────────────────────────────────────────────────────────────────────────────

/// A CSV writer bound to an ordered header and an output path.
///
/// Fields are quoted only when necessary and records are `\n`-terminated.
/// The header row is written once from the field titles; cell values are
/// pulled from each record by field id, in header order.
pub struct CsvTable {
    path: PathBuf,
    header: Vec<HeaderField>,
}

impl CsvTable {
    pub fn new(path: impl AsRef<Path>, header: Vec<HeaderField>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            header,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &[HeaderField] {
        &self.header
    }

    /// Serializes the records to the bound path, replacing it atomically.
    ///
    /// An empty header writes an empty file: with no columns declared there
    /// is nothing to serialize, which is the empty-dataset case upstream.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Filesystem` if the temporary file cannot be created
    /// or persisted, or `AppError::Csv` if serialization fails. On error the
    /// destination is left as it was.
    pub fn write(&self, records: &[Record]) -> Result<(), AppError> {
        let parent = self.path.parent().ok_or_else(|| {
            AppError::Filesystem(format!(
                "cannot determine parent directory for {}",
                self.path.display()
            ))
        })?;

        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::Filesystem(format!(
                "failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;

        let temp = NamedTempFile::new_in(parent).map_err(|e| {
            AppError::Filesystem(format!("failed to create temporary file: {}", e))
        })?;

        let mut writer = csv::Writer::from_writer(BufWriter::new(temp));

        if !self.header.is_empty() {
            writer
                .write_record(self.header.iter().map(|field| field.title.as_str()))
                .map_err(|e| AppError::Csv(format!("failed to write header row: {}", e)))?;

            for record in records {
                let row: Vec<String> = self
                    .header
                    .iter()
                    .map(|field| {
                        record
                            .get(&field.id)
                            .map(|value| value.to_csv_field())
                            .unwrap_or_default()
                    })
                    .collect();

                writer
                    .write_record(&row)
                    .map_err(|e| AppError::Csv(format!("failed to write record: {}", e)))?;
            }
        }

        let buf_writer = writer
            .into_inner()
            .map_err(|e| AppError::Csv(format!("failed to flush CSV writer: {}", e.error())))?;

        let temp = buf_writer
            .into_inner()
            .map_err(|e| AppError::Filesystem(format!("failed to flush buffer: {}", e.error())))?;

        temp.persist(&self.path).map_err(|e| {
            AppError::Filesystem(format!(
                "failed to persist file to {}: {}",
                self.path.display(),
                e.error
            ))
        })?;

        debug!(
            "[CSV] Wrote {} records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Validates the records against the header, then writes them to `path`.
///
/// The destination is created fresh on every call; "append" refers to the
/// pipeline's call pattern of adding one more file per call, not to appending
/// rows to an existing file. Empty input is a no-op.
///
/// # Errors
///
/// Propagates `validate` and `CsvTable::write` failures.
pub fn append(path: &Path, header: &[HeaderField], records: &[Record]) -> Result<(), AppError> {
    if records.is_empty() {
        return Ok(());
    }

    validate(records, header)?;
    CsvTable::new(path, header.to_vec()).write(records)
}
