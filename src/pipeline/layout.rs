//! Project directory layout for one migration run.
//!
//! The layout is computed once, created idempotently, and passed as a value
//! to every downstream stage; no stage computes its own paths.

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::error::AppError;
use crate::tabular;

/// Directory and file coordinates of one run, rooted at
/// `<output_root>/<project_name>`.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    pub project_dir: PathBuf,
    pub master_data_dir: PathBuf,
    pub data_dir: PathBuf,
    pub batches_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub outputs_dir: PathBuf,
    pub marker_dir: PathBuf,

    /// `masterData/master-data.csv` - the full dataset.
    pub master_csv_path: PathBuf,
    /// `data/master-data-copy.csv` - byte copy of the master file.
    pub master_copy_path: PathBuf,
    /// `logs/success.csv` - placeholder, written by downstream stages.
    pub success_csv_path: PathBuf,
    /// `logs/error.csv` - placeholder, written by downstream stages.
    pub error_csv_path: PathBuf,
    /// `marker/marker.csv` - placeholder, written by downstream stages.
    pub marker_csv_path: PathBuf,
    /// `marker/migration-stats.csv` - batch/record count summary.
    pub stats_csv_path: PathBuf,
}

impl ProjectLayout {
    pub fn new(output_root: &Path, project_name: &str) -> Self {
        let project_dir = output_root.join(project_name);
        let master_data_dir = project_dir.join("masterData");
        let data_dir = project_dir.join("data");
        let batches_dir = data_dir.join("batches");
        let logs_dir = project_dir.join("logs");
        let outputs_dir = project_dir.join("outputs");
        let marker_dir = project_dir.join("marker");

        Self {
            master_csv_path: master_data_dir.join("master-data.csv"),
            master_copy_path: data_dir.join("master-data-copy.csv"),
            success_csv_path: logs_dir.join("success.csv"),
            error_csv_path: logs_dir.join("error.csv"),
            marker_csv_path: marker_dir.join("marker.csv"),
            stats_csv_path: marker_dir.join("migration-stats.csv"),
            project_dir,
            master_data_dir,
            data_dir,
            batches_dir,
            logs_dir,
            outputs_dir,
            marker_dir,
        }
    }

    /// Batch file path for a 1-based batch index.
    pub fn batch_csv_path(&self, index: usize) -> PathBuf {
        self.batches_dir.join(format!("batch_{}.csv", index))
    }

    /// Creates the directory skeleton and the placeholder log files.
    ///
    /// Recreating an existing tree is not an error. Directory creation
    /// failures are fatal; a placeholder file that cannot be created is
    /// logged and skipped, since its content belongs to downstream stages.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Filesystem` if a directory cannot be created.
    pub async fn create(&self) -> Result<(), AppError> {
        for dir in [
            &self.master_data_dir,
            &self.batches_dir,
            &self.logs_dir,
            &self.outputs_dir,
            &self.marker_dir,
        ] {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                AppError::Filesystem(format!(
                    "failed to create directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        for placeholder in [
            &self.success_csv_path,
            &self.error_csv_path,
            &self.marker_csv_path,
        ] {
            if let Err(e) = tabular::ensure_file(placeholder).await {
                warn!(
                    "[LAYOUT] Skipping placeholder {}: {}",
                    placeholder.display(),
                    e
                );
            }
        }

        Ok(())
    }
}

/// Appends one timestamped line to a log file, creating it if needed.
///
/// # Errors
///
/// Returns `AppError::Filesystem` if the file cannot be opened or written.
pub async fn append_log_line(path: &Path, message: &str) -> Result<(), AppError> {
    let line = format!(
        "{} - {}\n",
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        message
    );

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| AppError::Filesystem(format!("failed to open {}: {}", path.display(), e)))?;

    file.write_all(line.as_bytes()).await.map_err(|e| {
        AppError::Filesystem(format!("failed to write {}: {}", path.display(), e))
    })?;

    Ok(())
}
