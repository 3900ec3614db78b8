//! Durable, validated CSV serialization shared by every pipeline stage.
//!
//! This module provides header-bound CSV writing with atomic file
//! replacement, first-record schema validation, and a symmetric reader that
//! parses a delimited file back into row mappings.

mod reader;
mod writer;

pub use reader::{read_rows, ReadOptions};
pub use writer::{append, ensure_file, validate, CsvTable};
