//! Duplicate value and row detection

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::error::Result;
use crate::model::{row_key, CellValue, RowKey, Table};

/// Values of `column` that occur more than once, ordered by first occurrence.
/// Nulls are never reported.
pub fn find_duplicates(table: &Table, column: &str) -> Result<Vec<CellValue>> {
    Ok(count_duplicates(table, column)?.into_keys().collect())
}

/// Like [`find_duplicates`], with the number of occurrences of each value
pub fn count_duplicates(table: &Table, column: &str) -> Result<IndexMap<CellValue, usize>> {
    let idx = table.require_column(column)?;

    let mut counts: IndexMap<&CellValue, usize, FxBuildHasher> = IndexMap::default();
    for value in table.column_values(idx).filter(|v| !v.is_null()) {
        *counts.entry(value).or_insert(0) += 1;
    }

    Ok(counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(value, count)| (value.clone(), count))
        .collect())
}

/// Every row whose values over `columns` (all columns when `None`) occur more
/// than once. All occurrences are kept, in table order. Rows with a null in
/// the compared columns are never duplicates.
pub fn duplicate_rows<S: AsRef<str>>(table: &Table, columns: Option<&[S]>) -> Result<Table> {
    let subset: Vec<usize> = match columns {
        Some(names) => names
            .iter()
            .map(|name| table.require_column(name.as_ref()))
            .collect::<Result<_>>()?,
        None => (0..table.column_count()).collect(),
    };

    let keys: Vec<RowKey> = table.rows.iter().map(|row| row_key(row, &subset)).collect();
    let mut counts: IndexMap<&RowKey, usize, FxBuildHasher> = IndexMap::default();
    for key in keys.iter().filter(|k| !k.parts().iter().any(CellValue::is_null)) {
        *counts.entry(key).or_insert(0) += 1;
    }

    let repeated = keys
        .iter()
        .enumerate()
        .filter(|(_, key)| counts.get(key).is_some_and(|&n| n > 1))
        .map(|(idx, _)| idx);
    Ok(table.select_rows(repeated))
}
