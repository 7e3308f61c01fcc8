//! Colored terminal output

use std::io::{IsTerminal, Write};

use tabled::builder::Builder;
use tabled::settings::Style;
use termcolor::{Ansi, Color, ColorChoice, ColorSpec, NoColor, WriteColor};

use crate::config::DEFAULT_ROW_LIMIT;
use crate::diff::{cell_diff::percentage_change, Delta};
use crate::error::Result;
use crate::model::Table;

use super::{OutputFormatter, TableView};

/// Terminal output with colors
pub struct TerminalOutput {
    color_choice: ColorChoice,
    row_limit: usize,
}

impl TerminalOutput {
    pub fn new() -> Self {
        Self {
            color_choice: ColorChoice::Auto,
            row_limit: DEFAULT_ROW_LIMIT,
        }
    }

    pub fn with_color_choice(mut self, color_choice: ColorChoice) -> Self {
        self.color_choice = color_choice;
        self
    }

    pub fn with_row_limit(mut self, limit: usize) -> Self {
        self.row_limit = limit;
        self
    }

    fn use_color(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always | ColorChoice::AlwaysAnsi => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
            }
        }
    }

    fn write_report<W: WriteColor>(
        &self,
        delta: &Delta,
        label_a: &str,
        label_b: &str,
        out: &mut W,
    ) -> Result<()> {
        writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(out, " keydiff: {} vs {} (key: {})", label_a, label_b, delta.keys().join(", "))?;
        writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(out)?;

        let stats = delta.stats();
        writeln!(out, "Rows in A: {}, rows in B: {}", stats.rows_a, stats.rows_b)?;
        writeln!(out, "Rows in A only: {}", stats.only_in_a)?;
        writeln!(out, "Rows in B only: {}", stats.only_in_b)?;
        writeln!(
            out,
            "Matched keys: {} ({} with changes, {} cells)",
            stats.matched_keys, stats.mismatched_keys, stats.cells_changed
        )?;
        writeln!(out)?;

        if !delta.schema_changes().is_empty() {
            heading(out, "Schema Changes:", Color::Cyan)?;
            for change in delta.schema_changes() {
                writeln!(out, "  {}", change)?;
            }
            writeln!(out)?;
        }

        if !stats.has_differences() {
            writeln!(out, "No differences found.")?;
            return Ok(());
        }

        self.write_rows(out, "Only in A", delta.unmatched_a(), Color::Red)?;
        self.write_rows(out, "Only in B", delta.unmatched_b(), Color::Green)?;

        for summary in delta.change_summary() {
            if summary.changed_rows == 0 {
                continue;
            }
            let changed = delta.changed(&summary.column)?;
            heading(
                out,
                &format!("Changed — {} ({} rows):", summary.column, summary.changed_rows),
                Color::Yellow,
            )?;
            writeln!(out, "{}", self.changed_table(&changed, delta.keys().len()))?;
            write_hidden(out, summary.changed_rows.saturating_sub(self.row_limit))?;
            writeln!(out)?;
        }

        Ok(())
    }

    fn write_rows<W: WriteColor>(&self, out: &mut W, title: &str, table: &Table, color: Color) -> Result<()> {
        if table.is_empty() {
            return Ok(());
        }

        heading(out, &format!("{} ({} rows):", title, table.row_count()), color)?;
        let view = TableView::new(table, self.row_limit);
        writeln!(out, "{}", render_view(&view.headers, &view.rows))?;
        write_hidden(out, view.hidden())?;
        writeln!(out)?;
        Ok(())
    }

    /// The `changed` table plus a percentage column for numeric pairs
    fn changed_table(&self, changed: &Table, key_count: usize) -> String {
        let mut headers: Vec<String> = changed.column_names().map(str::to_string).collect();
        headers.push("change".to_string());

        let rows: Vec<Vec<String>> = changed
            .rows
            .iter()
            .take(self.row_limit)
            .map(|row| {
                let mut cells: Vec<String> = row.cells.iter().map(|c| c.display().into_owned()).collect();
                let pct = match (row.get(key_count), row.get(key_count + 1)) {
                    (Some(a), Some(b)) => percentage_change(a, b),
                    _ => None,
                };
                cells.push(pct.map(|p| format!("{:+.1}%", p)).unwrap_or_default());
                cells
            })
            .collect();

        render_view(&headers, &rows)
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TerminalOutput {
    fn render(
        &self,
        delta: &Delta,
        label_a: &str,
        label_b: &str,
        writer: &mut dyn Write,
    ) -> Result<()> {
        if self.use_color() {
            self.write_report(delta, label_a, label_b, &mut Ansi::new(writer))
        } else {
            self.write_report(delta, label_a, label_b, &mut NoColor::new(writer))
        }
    }
}

fn heading<W: WriteColor>(out: &mut W, text: &str, color: Color) -> Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{}", text)?;
    out.reset()?;
    writeln!(out)?;
    Ok(())
}

fn write_hidden<W: WriteColor>(out: &mut W, hidden: usize) -> Result<()> {
    if hidden > 0 {
        writeln!(out, "... {} more rows not shown", hidden)?;
    }
    Ok(())
}

/// Render rows as a rounded box table
pub(crate) fn render_view(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut builder = Builder::default();
    builder.push_record(headers.iter().cloned());
    for row in rows {
        builder.push_record(row.iter().cloned());
    }
    builder.build().with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(delta: &Delta) -> String {
        let mut buf = Vec::new();
        TerminalOutput::new()
            .with_color_choice(ColorChoice::Never)
            .render(delta, "a.csv", "b.csv", &mut buf)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_render_differences() {
        let a = Table::from_columns(vec![
            ("id", vec![1.into(), 2.into(), 3.into()]),
            ("price", vec![100.into(), 200.into(), 300.into()]),
        ])
        .unwrap();
        let b = Table::from_columns(vec![
            ("id", vec![2.into(), 3.into(), 4.into()]),
            ("price", vec![200.into(), 250.into(), 400.into()]),
        ])
        .unwrap();

        let text = render(&Delta::new(&a, &b, &["id"]).unwrap());

        assert!(text.contains("Rows in A only: 1"));
        assert!(text.contains("Rows in B only: 1"));
        assert!(text.contains("Changed — price (1 rows):"));
        assert!(text.contains("price_a"));
        assert!(text.contains("-16.7%"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_render_identical() {
        let a = Table::from_columns(vec![("id", vec![1.into()])]).unwrap();

        let text = render(&Delta::new(&a, &a, &["id"]).unwrap());

        assert!(text.contains("No differences found."));
    }
}
