//! Serialization of the accumulated batch/record counts.

use std::path::Path;

use tracing::info;

use crate::error::AppError;
use crate::record::{FieldValue, HeaderField, Record};
use crate::tabular;

/// One summary row: the aggregate `totalRecords` count or one batch's count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRecord {
    /// `"totalRecords"` or `"batch_<n>"`.
    pub kind: String,
    pub count: u64,
}

impl StatsRecord {
    pub fn total(count: u64) -> Self {
        Self {
            kind: "totalRecords".to_string(),
            count,
        }
    }

    pub fn batch(index: usize, count: u64) -> Self {
        Self {
            kind: format!("batch_{}", index),
            count,
        }
    }
}

/// Writes the stats rows under the fixed `Type,Count` header.
///
/// Pure serialization; the counts were accumulated during partitioning.
///
/// # Errors
///
/// Propagates `tabular::append` failures.
pub fn write_stats(path: &Path, stats: &[StatsRecord]) -> Result<(), AppError> {
    let header = vec![
        HeaderField::new("type", "Type"),
        HeaderField::new("count", "Count"),
    ];

    let records: Vec<Record> = stats
        .iter()
        .map(|stat| {
            let mut record = Record::new();
            record.insert("type", FieldValue::Text(stat.kind.clone()));
            record.insert("count", FieldValue::Number(stat.count.into()));
            record
        })
        .collect();

    tabular::append(path, &header, &records)?;
    info!("[STATS] Stats CSV created at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_fixed_header_and_rows_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("migration-stats.csv");

        let stats = vec![
            StatsRecord::total(120),
            StatsRecord::batch(1, 50),
            StatsRecord::batch(2, 50),
            StatsRecord::batch(3, 20),
        ];

        write_stats(&path, &stats).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Type,Count\ntotalRecords,120\nbatch_1,50\nbatch_2,50\nbatch_3,20\n"
        );
    }

    #[test]
    fn zero_record_run_writes_single_total_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("migration-stats.csv");

        write_stats(&path, &[StatsRecord::total(0)]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Type,Count\ntotalRecords,0\n");
    }
}
