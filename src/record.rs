//! Flat record model for exported data.
//!
//! Remote sources return loosely shaped items (Cognito attribute lists,
//! DynamoDB attribute maps). This module normalizes them into one shape: an
//! ordered mapping from field name to a tagged scalar value. The column order
//! of a whole dataset is the field order of its first record.

use chrono::{DateTime, SecondsFormat, Utc};

// ─────────────────────────────────────────────────────────────────────────────
// FieldValue
// ─────────────────────────────────────────────────────────────────────────────

/// A single scalar cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Free-form text.
    Text(String),
    /// Integer or decimal number. Stored as `serde_json::Number` so whole
    /// numbers keep their integral form when serialized.
    Number(serde_json::Number),
    /// Point in time, serialized as RFC 3339 with millisecond precision.
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// The string form written into a CSV cell.
    pub fn to_csv_field(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Record
// ─────────────────────────────────────────────────────────────────────────────

/// One flattened row of exported data.
///
/// Field order is insertion order; inserting an existing key replaces its
/// value in place without changing the order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Header
// ─────────────────────────────────────────────────────────────────────────────

/// One column definition: `id` is the record key the value is pulled from,
/// `title` is the display name written into the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    pub id: String,
    pub title: String,
}

impl HeaderField {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Derives the dataset header from the first record's keys (`title == id`).
///
/// An empty record set yields an empty header, which makes every downstream
/// write a no-op. The field set is assumed uniform across the run; records
/// that are missing a derived column fail validation at write time.
pub fn derive_header(records: &[Record]) -> Vec<HeaderField> {
    records
        .first()
        .map(|record| {
            record
                .keys()
                .map(|key| HeaderField::new(key, key))
                .collect()
        })
        .unwrap_or_default()
}
