//! HTML report output

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tera::{Context, Tera};
use tracing::info;

use crate::config::DEFAULT_ROW_LIMIT;
use crate::diff::{ColumnChanges, Delta};
use crate::error::{Error, Result};

use super::{OutputFormatter, TableView};

/// Static, self-contained HTML report of a delta
#[derive(Debug, Clone)]
pub struct HtmlReport {
    row_limit: usize,
}

#[derive(Serialize)]
struct Section {
    title: String,
    class: &'static str,
    hidden: usize,
    table: TableView,
}

impl Section {
    fn new(title: String, class: &'static str, table: TableView) -> Self {
        Self {
            title,
            class,
            hidden: table.hidden(),
            table,
        }
    }
}

impl HtmlReport {
    pub fn new() -> Self {
        Self {
            row_limit: DEFAULT_ROW_LIMIT,
        }
    }

    /// Cap every section at `limit` rows
    pub fn with_row_limit(mut self, limit: usize) -> Self {
        self.row_limit = limit;
        self
    }

    /// Render the report to a string
    pub fn render_string(&self, delta: &Delta, label_a: &str, label_b: &str) -> Result<String> {
        let summary: Vec<ColumnChanges> = delta.change_summary();
        let mut sections = vec![
            Section::new(
                "Only in A".to_string(),
                "removed",
                TableView::new(delta.unmatched_a(), self.row_limit),
            ),
            Section::new(
                "Only in B".to_string(),
                "added",
                TableView::new(delta.unmatched_b(), self.row_limit),
            ),
        ];
        for c in summary.iter().filter(|c| c.changed_rows > 0) {
            sections.push(Section::new(
                format!("Changed — {}", c.column),
                "changes",
                TableView::new(&delta.changed(&c.column)?, self.row_limit),
            ));
        }
        let schema_changes: Vec<String> =
            delta.schema_changes().iter().map(|c| c.to_string()).collect();

        let mut ctx = Context::new();
        ctx.insert("label_a", label_a);
        ctx.insert("label_b", label_b);
        ctx.insert("keys", &delta.keys().join(", "));
        ctx.insert("stats", &delta.stats());
        ctx.insert("schema_changes", &schema_changes);
        ctx.insert("summary", &summary);
        ctx.insert("sections", &sections);
        ctx.insert("css", CSS_STYLES);

        Ok(Tera::one_off(TEMPLATE, &ctx, true)?)
    }

    /// Write the report to `path`, replacing any existing file
    pub fn write(&self, delta: &Delta, label_a: &str, label_b: &str, path: &Path) -> Result<()> {
        let html = self.render_string(delta, label_a, label_b)?;
        let unwritable = |e: std::io::Error| Error::UnwritableOutput {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let mut writer = BufWriter::new(File::create(path).map_err(unwritable)?);
        writer.write_all(html.as_bytes()).map_err(unwritable)?;
        writer.flush().map_err(unwritable)?;
        info!(path = %path.display(), "wrote HTML report");
        Ok(())
    }
}

impl Default for HtmlReport {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for HtmlReport {
    fn render(
        &self,
        delta: &Delta,
        label_a: &str,
        label_b: &str,
        writer: &mut dyn Write,
    ) -> Result<()> {
        let html = self.render_string(delta, label_a, label_b)?;
        writer.write_all(html.as_bytes())?;
        Ok(())
    }
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>keydiff: {{ label_a }} vs {{ label_b }}</title>
  <style>{{ css | safe }}</style>
</head>
<body>
  <div class="header">
    <h1>keydiff</h1>
    <p class="files">{{ label_a }} vs {{ label_b }} on {{ keys }}</p>
  </div>

  <div class="summary">
    <div class="stat removed"><span class="num">{{ stats.only_in_a }}</span><span class="label">only in A</span></div>
    <div class="stat added"><span class="num">{{ stats.only_in_b }}</span><span class="label">only in B</span></div>
    <div class="stat modified"><span class="num">{{ stats.mismatched_keys }}</span><span class="label">changed keys</span></div>
    <div class="stat total"><span class="num">{{ stats.rows_a }} / {{ stats.rows_b }}</span><span class="label">rows</span></div>
  </div>
{% if schema_changes %}
  <div class="section">
    <h2>Schema Changes</h2>
    <ul>
{% for change in schema_changes %}      <li>{{ change }}</li>
{% endfor %}    </ul>
  </div>
{% endif %}
  <div class="section">
    <h2>Changed Columns</h2>
    <table class="changes">
      <tr><th>Column</th><th>Changed rows</th></tr>
{% for c in summary %}      <tr><td>{{ c.column }}</td><td>{{ c.changed_rows }}</td></tr>
{% endfor %}    </table>
  </div>
{% for section in sections %}
  <div class="section">
    <h2>{{ section.title }} ({{ section.table.total }})</h2>
{% if section.table.total > 0 %}    <table class="{{ section.class }}">
      <tr>{% for h in section.table.headers %}<th>{{ h }}</th>{% endfor %}</tr>
{% for row in section.table.rows %}      <tr>{% for cell in row %}<td>{{ cell }}</td>{% endfor %}</tr>
{% endfor %}    </table>
{% if section.hidden > 0 %}    <p class="more">{{ section.hidden }} more rows not shown</p>
{% endif %}{% else %}    <p class="more">none</p>
{% endif %}  </div>
{% endfor %}
  <div class="footer">
    <p>Generated by keydiff</p>
  </div>
</body>
</html>
"#;

const CSS_STYLES: &str = r#"
    :root {
      --bg: #1a1b26;
      --fg: #a9b1d6;
      --accent: #7aa2f7;
      --green: #9ece6a;
      --red: #f7768e;
      --yellow: #e0af68;
      --border: #414868;
    }
    * { box-sizing: border-box; margin: 0; padding: 0; }
    body {
      font-family: 'JetBrains Mono', 'Fira Code', monospace;
      background: var(--bg);
      color: var(--fg);
      padding: 2rem;
      line-height: 1.6;
    }
    .header { border-bottom: 2px solid var(--border); padding-bottom: 1rem; margin-bottom: 2rem; }
    .header h1 { color: var(--accent); font-size: 2rem; font-weight: 600; }
    .header .files { opacity: 0.8; margin-top: 0.5rem; }
    .summary { display: flex; gap: 2rem; margin-bottom: 2rem; }
    .stat { display: flex; flex-direction: column; padding: 1rem; border-radius: 8px; background: rgba(255,255,255,0.05); }
    .stat .num { font-size: 1.5rem; font-weight: 600; }
    .stat.added .num { color: var(--green); }
    .stat.removed .num { color: var(--red); }
    .stat.modified .num { color: var(--yellow); }
    .section { margin-bottom: 2rem; }
    .section h2 {
      color: var(--accent);
      font-size: 1.25rem;
      margin-bottom: 1rem;
      padding-bottom: 0.5rem;
      border-bottom: 1px solid var(--border);
    }
    table { width: 100%; border-collapse: collapse; margin-bottom: 1rem; }
    th, td { text-align: left; padding: 0.75rem; border: 1px solid var(--border); }
    th { background: rgba(255,255,255,0.05); font-weight: 600; }
    table.added tr:not(:first-child) { background: rgba(158, 206, 106, 0.1); }
    table.removed tr:not(:first-child) { background: rgba(247, 118, 142, 0.1); }
    table.changes tr:not(:first-child) { background: rgba(224, 175, 104, 0.1); }
    .more { opacity: 0.6; font-style: italic; }
    .footer { margin-top: 3rem; padding-top: 1rem; border-top: 1px solid var(--border); opacity: 0.6; font-size: 0.875rem; }
    ul { list-style: none; padding-left: 1rem; }
"#;
