//! Parser layer for reading and writing tabular data files

mod csv;
mod excel;

use std::path::Path;

use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{CellValue, Table};

pub use self::csv::{write_csv, CsvParser};
pub use self::excel::ExcelParser;

/// Trait for parsing tabular data files
pub trait Parser: Send + Sync {
    /// Parse a file and return a Table
    fn parse(&self, path: &Path, config: &Config) -> Result<Table>;

    /// Check if this parser can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool;
}

/// Factory for creating parsers based on file extension
pub struct ParserFactory {
    parsers: Vec<Box<dyn Parser>>,
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserFactory {
    /// Create a new parser factory with all supported parsers
    pub fn new() -> Self {
        Self {
            parsers: vec![Box::new(CsvParser), Box::new(ExcelParser)],
        }
    }

    /// Get a parser for the given file path
    pub fn get_parser(&self, path: &Path) -> Result<&dyn Parser> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        self.parsers
            .iter()
            .find(|parser| parser.supports_extension(&ext))
            .map(|parser| parser.as_ref())
            .ok_or_else(|| Error::UnsupportedFormat {
                path: path.to_path_buf(),
            })
    }

    /// Parse a file using the appropriate parser
    pub fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        if !path.is_file() {
            return Err(Error::UnreadableFile {
                path: path.to_path_buf(),
                message: "file not found".to_string(),
            });
        }
        let parser = self.get_parser(path)?;
        let table = parser.parse(path, config)?;
        debug!(
            path = %path.display(),
            rows = table.row_count(),
            columns = table.column_count(),
            "parsed table"
        );
        Ok(table)
    }
}

/// Pad a record with nulls (or cut it) to the header width
pub(crate) fn fit_to_width(mut cells: Vec<CellValue>, width: usize) -> Vec<CellValue> {
    cells.resize(width, CellValue::Null);
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_selection() {
        let factory = ParserFactory::new();

        assert!(factory.get_parser(Path::new("data.CSV")).is_ok());
        assert!(factory.get_parser(Path::new("book.xlsx")).is_ok());
        assert!(matches!(
            factory.get_parser(Path::new("data.parquet")),
            Err(Error::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = ParserFactory::new()
            .parse(Path::new("/definitely/not/here.csv"), &Config::default())
            .unwrap_err();

        assert!(matches!(err, Error::UnreadableFile { .. }));
    }
}
