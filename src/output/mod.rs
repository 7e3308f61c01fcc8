//! Output formatting for deltas and audit results

mod audit;
mod html;
mod json;
mod terminal;

use std::io::Write;

use serde::Serialize;

use crate::config::OutputFormat;
use crate::diff::Delta;
use crate::error::Result;
use crate::model::Table;

pub use audit::{render_audit, render_expectations, AuditFormat};
pub use html::HtmlReport;
pub use json::JsonOutput;
pub use terminal::TerminalOutput;

/// Trait for delta formatters
pub trait OutputFormatter {
    /// Render a delta to a writer. The labels name the two sides.
    fn render(
        &self,
        delta: &Delta,
        label_a: &str,
        label_b: &str,
        writer: &mut dyn Write,
    ) -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter showing at most `row_limit` rows per section
    pub fn create(format: OutputFormat, row_limit: usize) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Terminal => Box::new(TerminalOutput::new().with_row_limit(row_limit)),
            OutputFormat::Json => Box::new(JsonOutput::new()),
            OutputFormat::Html => Box::new(HtmlReport::new().with_row_limit(row_limit)),
        }
    }
}

/// Render a delta to stdout
pub fn render_to_stdout(
    delta: &Delta,
    label_a: &str,
    label_b: &str,
    format: OutputFormat,
    row_limit: usize,
) -> Result<()> {
    let formatter = OutputFactory::create(format, row_limit);
    let mut stdout = std::io::stdout().lock();
    formatter.render(delta, label_a, label_b, &mut stdout)
}

/// Render a whole table as a rounded box table
pub fn render_table(table: &Table) -> String {
    let view = TableView::new(table, usize::MAX);
    terminal::render_view(&view.headers, &view.rows)
}

/// Display-formatted slice of a table, capped at a row limit
#[derive(Debug, Clone, Serialize)]
pub(crate) struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rows in the source table, including those cut by the limit
    pub total: usize,
}

impl TableView {
    pub fn new(table: &Table, limit: usize) -> Self {
        let headers = table.column_names().map(str::to_string).collect();
        let rows = table
            .rows
            .iter()
            .take(limit)
            .map(|row| {
                (0..table.column_count())
                    .map(|idx| row.get(idx).map(|c| c.display().into_owned()).unwrap_or_default())
                    .collect()
            })
            .collect();
        Self {
            headers,
            rows,
            total: table.row_count(),
        }
    }

    pub fn hidden(&self) -> usize {
        self.total - self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;

    #[test]
    fn test_table_view_limit() {
        let table = Table::from_columns(vec![
            ("id", vec![1.into(), 2.into(), 3.into()]),
            ("name", vec!["a".into(), CellValue::Null, "c".into()]),
        ])
        .unwrap();

        let view = TableView::new(&table, 2);

        assert_eq!(view.headers, vec!["id", "name"]);
        assert_eq!(view.rows, vec![vec!["1", "a"], vec!["2", "NULL"]]);
        assert_eq!(view.hidden(), 1);
    }
}
