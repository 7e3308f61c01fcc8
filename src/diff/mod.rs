//! Key-based diff engine for comparing tables

pub mod cell_diff;
mod row_diff;
mod schema_diff;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{resolve_key_columns, CellValue, KeyIndex, RowKey, Side, Table};
use crate::output::HtmlReport;
use crate::quality::trim_whitespace;

pub use cell_diff::{CellComparator, Tolerance};
pub use row_diff::{KeyMatch, MatchedRow, RowMatcher};
pub use schema_diff::{SchemaChange, SchemaDiff};

/// Options controlling how a [`Delta`] compares its inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaOptions {
    /// Numeric tolerance applied by `changed`
    pub tolerance: Tolerance,
    /// Strip leading/trailing whitespace from string cells before matching
    pub trim_whitespace: bool,
}

impl Default for DeltaOptions {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::exact(),
            trim_whitespace: true,
        }
    }
}

impl DeltaOptions {
    /// Options with the given absolute and relative tolerance
    pub fn new(abs_tol: f64, rel_tol: f64) -> Result<Self> {
        Ok(Self {
            tolerance: Tolerance::new(abs_tol, rel_tol)?,
            ..Default::default()
        })
    }

    pub fn with_trim_whitespace(mut self, trim: bool) -> Self {
        self.trim_whitespace = trim;
        self
    }
}

/// Number of changed rows for one compared column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnChanges {
    pub column: String,
    pub changed_rows: usize,
}

/// Statistics about the delta
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaStats {
    pub rows_a: usize,
    pub rows_b: usize,
    pub only_in_a: usize,
    pub only_in_b: usize,
    pub matched_keys: usize,
    /// Matched keys with at least one changed cell
    pub mismatched_keys: usize,
    pub cells_changed: usize,
}

impl DeltaStats {
    /// Check if there are any differences
    pub fn has_differences(&self) -> bool {
        self.only_in_a > 0 || self.only_in_b > 0 || self.mismatched_keys > 0
    }
}

/// Snapshot comparison of two tables aligned on key columns.
///
/// Unmatched rows are computed when the delta is built; per-column changes
/// are computed on demand by [`Delta::changed`].
#[derive(Debug, Clone)]
pub struct Delta {
    keys: Vec<String>,
    options: DeltaOptions,
    table_a: Table,
    table_b: Table,
    unmatched_a: Table,
    unmatched_b: Table,
    unmatched_a_keys: Vec<RowKey>,
    unmatched_b_keys: Vec<RowKey>,
    matched: Vec<MatchedRow>,
    schema_changes: Vec<SchemaChange>,
}

impl Delta {
    /// Compare two tables on `keys` with exact numeric comparison
    pub fn new<S: AsRef<str>>(table_a: &Table, table_b: &Table, keys: &[S]) -> Result<Self> {
        Self::with_options(table_a, table_b, keys, DeltaOptions::default())
    }

    /// Compare two tables on `keys` with explicit options
    pub fn with_options<S: AsRef<str>>(
        table_a: &Table,
        table_b: &Table,
        keys: &[S],
        options: DeltaOptions,
    ) -> Result<Self> {
        if keys.is_empty() {
            return Err(Error::EmptyKeySpec);
        }
        // Re-validate in case the options were built field by field
        Tolerance::new(options.tolerance.abs(), options.tolerance.rel())?;

        let key_columns_a = resolve_key_columns(table_a, keys, Side::A)?;
        let key_columns_b = resolve_key_columns(table_b, keys, Side::B)?;

        let (table_a, table_b) = if options.trim_whitespace {
            (
                trim_whitespace::<&str>(table_a, None)?,
                trim_whitespace::<&str>(table_b, None)?,
            )
        } else {
            (table_a.clone(), table_b.clone())
        };

        let index_a = KeyIndex::build(&table_a, key_columns_a);
        let index_b = KeyIndex::build(&table_b, key_columns_b);
        for (side, index) in [(Side::A, &index_a), (Side::B, &index_b)] {
            if index.duplicate_rows() > 0 {
                warn!(
                    %side,
                    duplicates = index.duplicate_rows(),
                    "duplicate keys; first occurrence is used for alignment"
                );
            }
        }

        let key_match = RowMatcher::new(&index_a, &index_b).match_rows(&table_a, &table_b);
        let unmatched_a_keys = distinct_keys(&table_a, &index_a, &key_match.unmatched_a);
        let unmatched_b_keys = distinct_keys(&table_b, &index_b, &key_match.unmatched_b);
        let unmatched_a = table_a.select_rows(key_match.unmatched_a.iter().copied());
        let unmatched_b = table_b.select_rows(key_match.unmatched_b.iter().copied());
        let schema_changes = SchemaDiff::compare(&table_a, &table_b);

        debug!(
            rows_a = table_a.row_count(),
            rows_b = table_b.row_count(),
            only_in_a = unmatched_a.row_count(),
            only_in_b = unmatched_b.row_count(),
            matched = key_match.matched.len(),
            "computed delta"
        );

        Ok(Self {
            keys: keys.iter().map(|k| k.as_ref().to_string()).collect(),
            options,
            table_a,
            table_b,
            unmatched_a,
            unmatched_b,
            unmatched_a_keys,
            unmatched_b_keys,
            matched: key_match.matched,
            schema_changes,
        })
    }

    /// Key column names
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn options(&self) -> &DeltaOptions {
        &self.options
    }

    /// Snapshot of table A as compared (after optional trimming)
    pub fn table_a(&self) -> &Table {
        &self.table_a
    }

    /// Snapshot of table B as compared (after optional trimming)
    pub fn table_b(&self) -> &Table {
        &self.table_b
    }

    /// Rows of A whose key does not occur in B
    pub fn unmatched_a(&self) -> &Table {
        &self.unmatched_a
    }

    /// Rows of B whose key does not occur in A
    pub fn unmatched_b(&self) -> &Table {
        &self.unmatched_b
    }

    /// Distinct keys found only in A, in A order
    pub fn unmatched_a_keys(&self) -> &[RowKey] {
        &self.unmatched_a_keys
    }

    /// Distinct keys found only in B, in B order
    pub fn unmatched_b_keys(&self) -> &[RowKey] {
        &self.unmatched_b_keys
    }

    /// Keys present on both sides, in A order
    pub fn matched_keys(&self) -> impl Iterator<Item = &RowKey> {
        self.matched.iter().map(|m| &m.key)
    }

    /// Aligned row positions for every matched key
    pub fn matched_rows(&self) -> &[MatchedRow] {
        &self.matched
    }

    pub fn schema_changes(&self) -> &[SchemaChange] {
        &self.schema_changes
    }

    /// Non-key columns present in both tables, in A order
    pub fn compared_columns(&self) -> Vec<&str> {
        self.table_a
            .column_names()
            .filter(|name| !self.keys.iter().any(|k| k == name))
            .filter(|name| self.table_b.column_index(name).is_some())
            .collect()
    }

    /// Rows whose `column` differs between A and B.
    ///
    /// The result holds the key columns followed by `<column>_a` and
    /// `<column>_b`, one row per changed key in A's key order.
    pub fn changed(&self, column: &str) -> Result<Table> {
        let (idx_a, idx_b) = self.column_pair(column)?;
        let comparator = CellComparator::new(self.options.tolerance);

        let mut names: Vec<String> = self.keys.clone();
        names.push(format!("{}_a", column));
        names.push(format!("{}_b", column));
        let mut result = Table::with_column_names(names);

        for m in self.changed_pairs(idx_a, idx_b, &comparator) {
            let value_a = self.cell_a(m.row_a, idx_a);
            let value_b = self.cell_b(m.row_b, idx_b);
            let mut cells: Vec<CellValue> = m.key.parts().to_vec();
            cells.push(value_a.clone());
            cells.push(value_b.clone());
            let source_line = self.table_a.rows[m.row_a].source_line;
            result.add_row(cells, source_line);
        }

        result.infer_column_types();
        Ok(result)
    }

    /// Changed-row counts for every compared column
    pub fn change_summary(&self) -> Vec<ColumnChanges> {
        let comparator = CellComparator::new(self.options.tolerance);
        self.compared_columns()
            .into_iter()
            .filter_map(|column| {
                let (idx_a, idx_b) = self.column_pair(column).ok()?;
                Some(ColumnChanges {
                    column: column.to_string(),
                    changed_rows: self.changed_pairs(idx_a, idx_b, &comparator).count(),
                })
            })
            .collect()
    }

    /// Aggregate statistics over all compared columns
    pub fn stats(&self) -> DeltaStats {
        let comparator = CellComparator::new(self.options.tolerance);
        let pairs: Vec<(usize, usize)> = self
            .compared_columns()
            .into_iter()
            .filter_map(|column| self.column_pair(column).ok())
            .collect();

        let mut mismatched_keys = 0;
        let mut cells_changed = 0;
        for m in &self.matched {
            let changed = pairs
                .iter()
                .filter(|&&(idx_a, idx_b)| {
                    !comparator.equal(self.cell_a(m.row_a, idx_a), self.cell_b(m.row_b, idx_b))
                })
                .count();
            if changed > 0 {
                mismatched_keys += 1;
                cells_changed += changed;
            }
        }

        DeltaStats {
            rows_a: self.table_a.row_count(),
            rows_b: self.table_b.row_count(),
            only_in_a: self.unmatched_a.row_count(),
            only_in_b: self.unmatched_b.row_count(),
            matched_keys: self.matched.len(),
            mismatched_keys,
            cells_changed,
        }
    }

    pub fn has_differences(&self) -> bool {
        self.stats().has_differences()
    }

    /// Write a static HTML report to `path`, replacing any existing file
    pub fn to_html(&self, path: impl AsRef<Path>) -> Result<()> {
        HtmlReport::default().write(self, "A", "B", path.as_ref())
    }

    fn column_pair(&self, column: &str) -> Result<(usize, usize)> {
        let idx_a = self
            .table_a
            .column_index(column)
            .ok_or_else(|| Error::ColumnNotFound {
                column: column.to_string(),
                side: Side::A,
            })?;
        let idx_b = self
            .table_b
            .column_index(column)
            .ok_or_else(|| Error::ColumnNotFound {
                column: column.to_string(),
                side: Side::B,
            })?;
        Ok((idx_a, idx_b))
    }

    fn changed_pairs<'a>(
        &'a self,
        idx_a: usize,
        idx_b: usize,
        comparator: &'a CellComparator,
    ) -> impl Iterator<Item = &'a MatchedRow> + 'a {
        self.matched.iter().filter(move |m| {
            !comparator.equal(self.cell_a(m.row_a, idx_a), self.cell_b(m.row_b, idx_b))
        })
    }

    fn cell_a(&self, row: usize, col: usize) -> &CellValue {
        self.table_a.rows[row].get(col).unwrap_or(&CellValue::Null)
    }

    fn cell_b(&self, row: usize, col: usize) -> &CellValue {
        self.table_b.rows[row].get(col).unwrap_or(&CellValue::Null)
    }
}

/// Distinct keys of the given rows, in row order
fn distinct_keys(table: &Table, index: &KeyIndex, rows: &[usize]) -> Vec<RowKey> {
    let mut keys: indexmap::IndexSet<RowKey, rustc_hash::FxBuildHasher> = Default::default();
    for &idx in rows {
        keys.insert(index.key_of(&table.rows[idx]));
    }
    keys.into_iter().collect()
}
