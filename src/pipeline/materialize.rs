//! Dataset materialization: the master CSV, its working copy, and the
//! directory skeleton every later stage depends on.
//!
//! This stage is all-or-nothing: if the skeleton, the master write, the copy,
//! or the config persistence fails, the error propagates and no later stage
//! runs. Partial master data must never look like a complete export.

use std::path::Path;

use tracing::info;

use crate::config::MigrationConfig;
use crate::error::AppError;
use crate::record::{derive_header, HeaderField, Record};
use crate::tabular::CsvTable;

use super::layout::ProjectLayout;

/// The resolved layout and derived header handed to the partitioning stage.
pub struct MaterializedDataset {
    pub layout: ProjectLayout,
    pub header: Vec<HeaderField>,
}

/// Materializes the full record set under `<output_root>/<project_name>`.
///
/// 1. Derive the header from the first record's keys.
/// 2. Create the directory skeleton and placeholder log files.
/// 3. Write `masterData/master-data.csv`.
/// 4. Byte-copy it to `data/master-data-copy.csv`.
/// 5. Persist the run's configuration into the project root.
///
/// An empty record set derives an empty header; the master file and its copy
/// are then created empty.
///
/// # Errors
///
/// `AppError::Filesystem` or `AppError::Csv` from any step aborts the whole
/// operation.
pub async fn materialize_dataset(
    config: &MigrationConfig,
    records: &[Record],
    output_root: &Path,
) -> Result<MaterializedDataset, AppError> {
    let layout = ProjectLayout::new(output_root, &config.project_name);
    layout.create().await?;

    let header = derive_header(records);

    let master = CsvTable::new(&layout.master_csv_path, header.clone());
    master.write(records)?;
    info!(
        "[DATASET] Master CSV created at {} ({} records)",
        layout.master_csv_path.display(),
        records.len()
    );

    tokio::fs::copy(&layout.master_csv_path, &layout.master_copy_path)
        .await
        .map_err(|e| {
            AppError::Filesystem(format!(
                "failed to copy master CSV to {}: {}",
                layout.master_copy_path.display(),
                e
            ))
        })?;
    info!(
        "[DATASET] Master CSV copied to {}",
        layout.master_copy_path.display()
    );

    config.save_into(&layout.project_dir)?;

    Ok(MaterializedDataset { layout, header })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FILE_NAME;
    use crate::record::FieldValue;
    use tempfile::TempDir;

    fn test_config() -> MigrationConfig {
        serde_json::from_str(
            r#"{
                "projectName": "mat-test",
                "source": "s3",
                "awsRegion": "us-east-1",
                "awsAccessKeyId": "AKIA",
                "awsSecretAccessKey": "secret",
                "s3Bucket": "bucket"
            }"#,
        )
        .unwrap()
    }

    fn make_records(count: usize) -> Vec<Record> {
        (0..count)
            .map(|i| {
                let mut record = Record::new();
                record.insert("id", FieldValue::Text(format!("id-{}", i)));
                record.insert("value", FieldValue::Number((i as i64).into()));
                record
            })
            .collect()
    }

    #[tokio::test]
    async fn writes_master_and_identical_copy() {
        let root = TempDir::new().unwrap();
        let records = make_records(3);

        let dataset = materialize_dataset(&test_config(), &records, root.path())
            .await
            .unwrap();

        let master = std::fs::read(&dataset.layout.master_csv_path).unwrap();
        let copy = std::fs::read(&dataset.layout.master_copy_path).unwrap();
        assert_eq!(master, copy, "copy must be byte-identical");

        let content = String::from_utf8(master).unwrap();
        assert_eq!(content.lines().count(), 4, "header plus three records");
        assert!(content.starts_with("id,value\n"));

        let ids: Vec<&str> = dataset.header.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["id", "value"]);
    }

    #[tokio::test]
    async fn persists_config_into_project_dir() {
        let root = TempDir::new().unwrap();

        let dataset = materialize_dataset(&test_config(), &make_records(1), root.path())
            .await
            .unwrap();

        let config_path = dataset.layout.project_dir.join(CONFIG_FILE_NAME);
        assert!(config_path.is_file());

        let saved = std::fs::read_to_string(&config_path).unwrap();
        assert!(saved.contains("mat-test"));
        assert!(!saved.contains("secret"), "secret must be redacted");
    }

    #[tokio::test]
    async fn empty_record_set_creates_empty_master_and_copy() {
        let root = TempDir::new().unwrap();

        let dataset = materialize_dataset(&test_config(), &[], root.path())
            .await
            .unwrap();

        assert!(dataset.header.is_empty());
        assert_eq!(
            std::fs::read_to_string(&dataset.layout.master_csv_path).unwrap(),
            ""
        );
        assert_eq!(
            std::fs::read_to_string(&dataset.layout.master_copy_path).unwrap(),
            ""
        );
    }

    #[tokio::test]
    async fn skeleton_failure_aborts_the_operation() {
        let root = TempDir::new().unwrap();

        // A file squatting on the project dir path makes mkdir fail.
        std::fs::write(root.path().join("mat-test"), "not a dir").unwrap();

        let result = materialize_dataset(&test_config(), &make_records(1), root.path()).await;

        assert!(matches!(result, Err(AppError::Filesystem(_))));
    }
}
