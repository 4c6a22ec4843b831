//! FILENAME: core/pivot-engine/src/cache.rs
//! Data Index - per-pass lookup from a data cell coordinate to its records.
//!
//! The index is built once per layout pass with one scan over the records and
//! answers `(row dimension id, column dimension id) -> record indices`.
//! Dimension ids use the same `root[&]a[&]b` format as node ids but cover only
//! the dimension fields (the measure level is not part of the key).

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use engine::{record_value, FieldValue, Record};

use crate::definition::ROOT_ID;
use crate::node::child_id;

/// Record indices stored under one coordinate. Almost always a single record.
pub type RecordIndices = SmallVec<[usize; 1]>;

/// How a record's dimension path is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMode {
    /// Every field participates; missing values key as `undefined`.
    Full,
    /// Only the longest prefix of fields the record actually carries.
    /// Used for pre-aggregated total records.
    Prefix,
}

/// Builds the dimension id of `record` over `fields`.
pub fn record_path_id(record: &Record, fields: &[String], mode: PathMode) -> String {
    let mut id = ROOT_ID.to_string();
    for field in fields {
        let value = record_value(record, field);
        if mode == PathMode::Prefix && value.is_empty() {
            break;
        }
        id = child_id(&id, &value.key());
    }
    id
}

/// Builds a dimension id from a list of values.
pub fn values_path_id<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a FieldValue>,
{
    values
        .into_iter()
        .fold(ROOT_ID.to_string(), |id, v| child_id(&id, &v.key()))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataIndex {
    entries: FxHashMap<String, FxHashMap<String, RecordIndices>>,
    record_count: usize,
}

impl DataIndex {
    pub fn build(
        records: &[Record],
        row_fields: &[String],
        col_fields: &[String],
        mode: PathMode,
    ) -> Self {
        let mut entries: FxHashMap<String, FxHashMap<String, RecordIndices>> =
            FxHashMap::default();

        for (index, record) in records.iter().enumerate() {
            let row_id = record_path_id(record, row_fields, mode);
            let col_id = record_path_id(record, col_fields, mode);
            entries
                .entry(row_id)
                .or_default()
                .entry(col_id)
                .or_default()
                .push(index);
        }

        DataIndex {
            entries,
            record_count: records.len(),
        }
    }

    /// Records at a coordinate, in source order. Empty when none match.
    pub fn lookup(&self, row_dim_id: &str, col_dim_id: &str) -> &[usize] {
        self.entries
            .get(row_dim_id)
            .and_then(|cols| cols.get(col_dim_id))
            .map(|indices| indices.as_slice())
            .unwrap_or(&[])
    }

    /// First record at a coordinate.
    pub fn first(&self, row_dim_id: &str, col_dim_id: &str) -> Option<usize> {
        self.lookup(row_dim_id, col_dim_id).first().copied()
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Number of distinct coordinates.
    pub fn len(&self) -> usize {
        self.entries.values().map(|cols| cols.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
