//! Primary key handling utilities

use std::fmt;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};

use super::table::{CellValue, Row, Table};
use crate::error::{Error, Result};

/// Which input of a comparison a table came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

/// Composite key of a row: the row's key cells in key-column order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowKey(Vec<CellValue>);

impl RowKey {
    pub fn new(parts: Vec<CellValue>) -> Self {
        Self(parts)
    }

    pub fn parts(&self) -> &[CellValue] {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "|")?;
            }
            write!(f, "{}", part.display())?;
        }
        Ok(())
    }
}

/// Resolve key column names to positions in `table`
pub fn resolve_key_columns<S: AsRef<str>>(table: &Table, names: &[S], side: Side) -> Result<Vec<usize>> {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            table.column_index(name).ok_or_else(|| Error::MissingKeyColumn {
                column: name.to_string(),
                side,
            })
        })
        .collect()
}

/// Build the key of a row from resolved key column positions
pub fn row_key(row: &Row, key_columns: &[usize]) -> RowKey {
    RowKey(
        key_columns
            .iter()
            .map(|&i| row.get(i).cloned().unwrap_or(CellValue::Null))
            .collect(),
    )
}

/// Lookup from row key to the first row carrying it
#[derive(Debug, Clone)]
pub struct KeyIndex {
    key_columns: Vec<usize>,
    positions: IndexMap<RowKey, usize, FxBuildHasher>,
    duplicate_rows: usize,
}

impl KeyIndex {
    /// Index every row of `table`. Later rows with an already seen key are
    /// counted as duplicates and do not replace the first occurrence.
    pub fn build(table: &Table, key_columns: Vec<usize>) -> Self {
        let mut positions = IndexMap::with_capacity_and_hasher(table.row_count(), FxBuildHasher);
        let mut duplicate_rows = 0;

        for (idx, row) in table.rows.iter().enumerate() {
            let key = row_key(row, &key_columns);
            if positions.contains_key(&key) {
                duplicate_rows += 1;
            } else {
                positions.insert(key, idx);
            }
        }

        Self {
            key_columns,
            positions,
            duplicate_rows,
        }
    }

    /// Key of `row` under this index's key columns
    pub fn key_of(&self, row: &Row) -> RowKey {
        row_key(row, &self.key_columns)
    }

    pub fn contains(&self, key: &RowKey) -> bool {
        self.positions.contains_key(key)
    }

    /// Row position of the first occurrence of `key`
    pub fn position(&self, key: &RowKey) -> Option<usize> {
        self.positions.get(key).copied()
    }

    /// Distinct keys in first-occurrence order
    pub fn keys(&self) -> impl Iterator<Item = &RowKey> {
        self.positions.keys()
    }

    /// (key, first row position) pairs in first-occurrence order
    pub fn iter(&self) -> impl Iterator<Item = (&RowKey, usize)> {
        self.positions.iter().map(|(k, &idx)| (k, idx))
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Rows whose key repeats an earlier row's key
    pub fn duplicate_rows(&self) -> usize {
        self.duplicate_rows
    }
}
