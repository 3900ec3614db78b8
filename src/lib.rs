//! Exports records from a remote AWS data source into a reproducible,
//! batched CSV dataset for downstream migration tooling.
//!
//! The pipeline fetches all records through a cursor-driven pagination loop,
//! materializes a master CSV plus a working copy under a fixed project
//! layout, partitions the dataset into fixed-size batch files, and writes a
//! summary of per-batch and total record counts.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod source;
pub mod tabular;
