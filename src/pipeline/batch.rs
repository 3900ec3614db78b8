//! Deterministic partitioning of the dataset into fixed-size batch files.
//!
//! Batches are independent artifacts: a batch that fails to write is logged
//! and skipped while the remaining batches proceed, unlike the all-or-nothing
//! master dataset. Each batch carries a typed outcome so the orchestrator can
//! report attempted vs. succeeded instead of relying on swallowed errors.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::AppError;
use crate::record::{HeaderField, Record};
use crate::tabular;

use super::stats::StatsRecord;

/// Records per batch file. Policy constant; not derived from input size.
pub const BATCH_SIZE: usize = 50;

/// Outcome of writing one batch.
pub struct BatchOutcome {
    /// 1-based batch index; also the file name suffix.
    pub index: usize,
    /// Records in this batch (at most [`BATCH_SIZE`]).
    pub record_count: usize,
    /// The batch file path on success, the per-batch error otherwise.
    pub result: Result<PathBuf, AppError>,
}

/// Result of partitioning the whole dataset.
pub struct PartitionSummary {
    pub outcomes: Vec<BatchOutcome>,
    /// `totalRecords` first, then one row per successfully written batch.
    pub stats: Vec<StatsRecord>,
}

impl PartitionSummary {
    pub fn batches_attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn batches_succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.result.is_ok())
            .count()
    }
}

/// Splits the records into consecutive chunks of at most [`BATCH_SIZE`] and
/// writes one CSV per chunk into `batches_dir`, in index order.
///
/// Zero-length input yields zero batches and a lone `totalRecords` stats row.
/// A failed batch leaves a gap in the stats rows; that gap is the signal of a
/// skipped batch.
pub fn partition_into_batches(
    records: &[Record],
    batches_dir: &Path,
    header: &[HeaderField],
) -> PartitionSummary {
    let mut stats = vec![StatsRecord::total(records.len() as u64)];
    let mut outcomes = Vec::new();

    for (chunk_index, chunk) in records.chunks(BATCH_SIZE).enumerate() {
        let index = chunk_index + 1;
        let path = batches_dir.join(format!("batch_{}.csv", index));

        let result = match tabular::append(&path, header, chunk) {
            Ok(()) => {
                stats.push(StatsRecord::batch(index, chunk.len() as u64));
                info!(
                    "[BATCH] Batch {} CSV created with {} records",
                    index,
                    chunk.len()
                );
                Ok(path)
            }
            Err(e) => {
                warn!("[BATCH] Skipping batch {}: {}", index, e);
                Err(e)
            }
        };

        outcomes.push(BatchOutcome {
            index,
            record_count: chunk.len(),
            result,
        });
    }

    PartitionSummary { outcomes, stats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{derive_header, FieldValue};
    use crate::tabular::{read_rows, ReadOptions};
    use tempfile::TempDir;

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

    #[test]
    fn partitions_120_records_into_50_50_20() {
        let dir = TempDir::new().unwrap();
        let records = make_records(120);
        let header = derive_header(&records);

        let summary = partition_into_batches(&records, dir.path(), &header);

        assert_eq!(summary.batches_attempted(), 3);
        assert_eq!(summary.batches_succeeded(), 3);

        let sizes: Vec<usize> = summary.outcomes.iter().map(|o| o.record_count).collect();
        assert_eq!(sizes, vec![50, 50, 20]);

        // Files exist with the shared header and the right row counts.
        for (index, expected) in [(1, 50), (2, 50), (3, 20)] {
            let path = dir.path().join(format!("batch_{}.csv", index));
            let rows = read_rows(&path, ReadOptions::default()).unwrap();
            assert_eq!(rows.len(), expected, "batch_{}", index);
        }

        // Batch order matches source order, with no record lost or reordered.
        let first_of_batch_2 =
            read_rows(&dir.path().join("batch_2.csv"), ReadOptions::default()).unwrap();
        assert_eq!(first_of_batch_2[0]["id"], "id-50");
    }

    #[test]
    fn batch_sizes_always_sum_to_input_length() {
        let dir = TempDir::new().unwrap();

        for count in [1, 49, 50, 51, 100, 101] {
            let records = make_records(count);
            let header = derive_header(&records);
            let summary = partition_into_batches(&records, dir.path(), &header);

            let total: usize = summary.outcomes.iter().map(|o| o.record_count).sum();
            assert_eq!(total, count);
            assert!(summary.outcomes.iter().all(|o| o.record_count <= BATCH_SIZE));
        }
    }

    #[test]
    fn stats_rows_lead_with_total_records() {
        let dir = TempDir::new().unwrap();
        let records = make_records(120);
        let header = derive_header(&records);

        let summary = partition_into_batches(&records, dir.path(), &header);

        let rows: Vec<(String, u64)> = summary
            .stats
            .iter()
            .map(|s| (s.kind.clone(), s.count))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("totalRecords".to_string(), 120),
                ("batch_1".to_string(), 50),
                ("batch_2".to_string(), 50),
                ("batch_3".to_string(), 20),
            ]
        );
    }

    #[test]
    fn zero_records_yield_zero_batches() {
        let dir = TempDir::new().unwrap();

        let summary = partition_into_batches(&[], dir.path(), &[]);

        assert_eq!(summary.batches_attempted(), 0);
        assert_eq!(summary.stats.len(), 1);
        assert_eq!(summary.stats[0].kind, "totalRecords");
        assert_eq!(summary.stats[0].count, 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn failed_batch_is_skipped_and_leaves_stats_gap() {
        let dir = TempDir::new().unwrap();
        let records = make_records(120);
        let header = derive_header(&records);

        // A directory squatting on batch_2.csv forces that write to fail.
        std::fs::create_dir(dir.path().join("batch_2.csv")).unwrap();

        let summary = partition_into_batches(&records, dir.path(), &header);

        assert_eq!(summary.batches_attempted(), 3);
        assert_eq!(summary.batches_succeeded(), 2);
        assert!(summary.outcomes[1].result.is_err());

        let kinds: Vec<&str> = summary.stats.iter().map(|s| s.kind.as_str()).collect();
        assert_eq!(kinds, vec!["totalRecords", "batch_1", "batch_3"]);

        assert!(dir.path().join("batch_1.csv").is_file());
        assert!(dir.path().join("batch_3.csv").is_file());
    }
}
