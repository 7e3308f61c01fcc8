//! Excel file parser (xlsx, xls, ods)

use std::borrow::Cow;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{CellValue, Column, Table};

use super::{fit_to_width, Parser};

/// Parser for Excel workbooks. Reads a single sheet, the first one unless
/// `Config::sheet_name` is set.
pub struct ExcelParser;

impl Parser for ExcelParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        let unreadable = |message: String| Error::UnreadableFile {
            path: path.to_path_buf(),
            message,
        };

        let mut workbook = open_workbook_auto(path).map_err(|e| unreadable(e.to_string()))?;

        let sheet_name = match config.sheet_name {
            Some(ref name) => name.clone(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| unreadable("no sheets found in workbook".to_string()))?,
        };
        debug!(sheet = %sheet_name, "reading worksheet");

        let range: Range<Data> = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| unreadable(format!("sheet '{}': {}", sheet_name, e)))?;

        Ok(parse_range(&range))
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "xlsx" | "xls" | "ods" | "xlsm")
    }
}

fn parse_range(range: &Range<Data>) -> Table {
    let mut rows = range.rows();

    // First row is header; an empty sheet is an empty table
    let Some(header_row) = rows.next() else {
        return Table::default();
    };
    let columns: Vec<Column> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let name = cell_to_string(cell);
            Column::new(if name.is_empty() { format!("Column{}", i + 1) } else { name }, i)
        })
        .collect();
    let width = columns.len();
    let mut table = Table::new(columns);

    for (line_num, row) in rows.enumerate() {
        let cells: Vec<CellValue> = row.iter().map(convert_cell).collect();
        // +2 for 1-indexing and header
        table.add_row(fit_to_width(cells, width), line_num + 2);
    }

    table.infer_column_types();
    table
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::Error(e) => format!("#{:?}", e),
    }
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) => CellValue::String(Cow::Owned(s.clone())),
        Data::Float(f) => CellValue::Float(*f),
        Data::Int(i) => CellValue::Int(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) if datetime.time() == chrono::NaiveTime::MIN => {
                CellValue::Date(datetime.date())
            }
            Some(datetime) => CellValue::DateTime(datetime),
            None => CellValue::String(Cow::Owned(dt.to_string())),
        },
        Data::DateTimeIso(s) => parse_iso(s),
        Data::DurationIso(s) => CellValue::String(Cow::Owned(s.clone())),
        Data::Error(e) => CellValue::String(Cow::Owned(format!("#{:?}", e))),
    }
}

fn parse_iso(s: &str) -> CellValue {
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        CellValue::DateTime(dt)
    } else if let Ok(d) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        CellValue::Date(d)
    } else {
        CellValue::String(Cow::Owned(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_cell() {
        assert_eq!(convert_cell(&Data::Empty), CellValue::Null);
        assert!(matches!(convert_cell(&Data::Float(2.0)), CellValue::Float(f) if f == 2.0));
        assert_eq!(convert_cell(&Data::String(" x ".into())), CellValue::from(" x "));
        assert_eq!(
            parse_iso("2024-01-31"),
            CellValue::Date(chrono::NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
        );
    }

    #[test]
    fn test_parse_range() {
        let mut range = Range::new((0, 0), (2, 1));
        range.set_value((0, 0), Data::String("id".into()));
        range.set_value((0, 1), Data::String("".into()));
        range.set_value((1, 0), Data::Float(1.0));
        range.set_value((1, 1), Data::String("a".into()));
        range.set_value((2, 0), Data::Float(2.5));

        let table = parse_range(&range);

        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["id", "Column2"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(1, "Column2"), Some(&CellValue::Null));
        assert_eq!(table.rows[1].source_line, 3);
    }

    #[test]
    fn test_supports_extension() {
        assert!(ExcelParser.supports_extension("XLSX"));
        assert!(!ExcelParser.supports_extension("csv"));
    }
}
