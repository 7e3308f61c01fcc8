//! CSV file reading and writing

use std::borrow::Cow;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{CellValue, Column, Table};

use super::{fit_to_width, Parser};

/// Parser for CSV files
pub struct CsvParser;

impl Parser for CsvParser {
    fn parse(&self, path: &Path, _config: &Config) -> Result<Table> {
        let unreadable = |message: String| Error::UnreadableFile {
            path: path.to_path_buf(),
            message,
        };

        let file = File::open(path).map_err(|e| unreadable(e.to_string()))?;
        let delimiter = if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"))
        {
            b'\t'
        } else {
            b','
        };
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(BufReader::new(file));

        let headers = csv_reader
            .headers()
            .map_err(|e| unreadable(format!("failed to read header: {}", e)))?
            .clone();

        let columns: Vec<Column> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| Column::new(name.to_string(), i))
            .collect();
        let width = columns.len();
        let mut table = Table::new(columns);

        for (line_num, result) in csv_reader.records().enumerate() {
            // +2 for 1-indexing and header
            let line = line_num + 2;
            let record = result.map_err(|e| unreadable(format!("line {}: {}", line, e)))?;
            let cells: Vec<CellValue> = record.iter().map(parse_cell_value).collect();
            table.add_row(fit_to_width(cells, width), line);
        }

        table.infer_column_types();
        Ok(table)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "csv" | "tsv" | "txt")
    }
}

/// Parse a raw field into a typed cell.
///
/// Types are inferred from the trimmed text, but strings keep their
/// surrounding whitespace so trimming stays an explicit step.
fn parse_cell_value(s: &str) -> CellValue {
    let trimmed = s.trim();

    if s.is_empty() || matches!(trimmed, "null" | "NULL" | "NA" | "N/A") {
        return CellValue::Null;
    }
    if trimmed.is_empty() {
        return CellValue::String(Cow::Owned(s.to_string()));
    }

    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }

    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Int(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return CellValue::Float(f);
    }

    if let Ok(date) = chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return CellValue::Date(date);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, format) {
            return CellValue::DateTime(dt);
        }
    }

    CellValue::String(Cow::Owned(s.to_string()))
}

/// Write a table as CSV with a header row. Nulls are written as empty fields.
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let unwritable = |e: csv::Error| Error::UnwritableOutput {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut writer = csv::Writer::from_path(path).map_err(unwritable)?;
    writer.write_record(table.column_names()).map_err(unwritable)?;
    for row in &table.rows {
        let record = (0..table.column_count()).map(|idx| match row.get(idx) {
            None | Some(CellValue::Null) => Cow::Borrowed(""),
            Some(cell) => cell.display(),
        });
        writer
            .write_record(record.map(|field| field.into_owned()))
            .map_err(unwritable)?;
    }
    writer.flush().map_err(Error::from)?;
    Ok(())
}
