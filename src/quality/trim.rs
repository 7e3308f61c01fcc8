//! Whitespace trimming for string cells

use std::borrow::Cow;

use crate::error::Result;
use crate::model::{CellValue, Table};

/// Return a copy of `table` with leading/trailing whitespace stripped from
/// string cells in `columns` (all columns when `None`).
///
/// Non-string cells and nulls are copied unchanged; the input is never mutated.
pub fn trim_whitespace<S: AsRef<str>>(table: &Table, columns: Option<&[S]>) -> Result<Table> {
    let targets: Vec<usize> = match columns {
        Some(names) => names
            .iter()
            .map(|name| table.require_column(name.as_ref()))
            .collect::<Result<_>>()?,
        None => (0..table.column_count()).collect(),
    };

    let mut trimmed = table.clone();
    for row in &mut trimmed.rows {
        for &idx in &targets {
            if let Some(cell) = row.cells.get_mut(idx) {
                trim_cell(cell);
            }
        }
    }
    Ok(trimmed)
}

fn trim_cell(cell: &mut CellValue) {
    if let CellValue::String(s) = cell {
        let t = s.trim();
        if t.len() != s.len() {
            *s = Cow::Owned(t.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Table {
        Table::from_columns(vec![
            ("name", vec![" Alice ".into(), "Bob".into(), CellValue::Null]),
            ("mixed", vec!["  x".into(), 10.into(), 2.5.into()]),
        ])
        .unwrap()
    }

    #[test]
    fn test_trims_all_string_columns() {
        let table = names();
        let result = trim_whitespace::<&str>(&table, None).unwrap();

        assert_eq!(result.cell(0, "name"), Some(&CellValue::from("Alice")));
        assert_eq!(result.cell(2, "name"), Some(&CellValue::Null));
        assert_eq!(result.cell(0, "mixed"), Some(&CellValue::from("x")));
        assert_eq!(result.cell(1, "mixed"), Some(&CellValue::Int(10)));
        // input untouched
        assert_eq!(table.cell(0, "name"), Some(&CellValue::from(" Alice ")));
    }

    #[test]
    fn test_selected_columns_only() {
        let result = trim_whitespace(&names(), Some(&["mixed"][..])).unwrap();

        assert_eq!(result.cell(0, "name"), Some(&CellValue::from(" Alice ")));
        assert_eq!(result.cell(0, "mixed"), Some(&CellValue::from("x")));
    }

    #[test]
    fn test_idempotent() {
        let once = trim_whitespace::<&str>(&names(), None).unwrap();
        let twice = trim_whitespace::<&str>(&once, None).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_unknown_column() {
        assert!(trim_whitespace(&names(), Some(&["nope"][..])).is_err());
    }
}
