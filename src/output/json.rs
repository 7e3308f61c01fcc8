//! JSON output format

use std::io::Write;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::diff::{ColumnChanges, Delta, DeltaStats, SchemaChange, Tolerance};
use crate::error::Result;
use crate::model::{CellValue, Table};

use super::OutputFormatter;

/// JSON output formatter. Rows are emitted in full, without a row limit.
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonChanged {
    column: String,
    changed_rows: usize,
    rows: Vec<Map<String, Value>>,
}

#[derive(Serialize)]
struct JsonDelta<'a> {
    label_a: &'a str,
    label_b: &'a str,
    keys: &'a [String],
    tolerance: Tolerance,
    stats: DeltaStats,
    schema_changes: &'a [SchemaChange],
    only_in_a: Vec<Map<String, Value>>,
    only_in_b: Vec<Map<String, Value>>,
    changed: Vec<JsonChanged>,
}

fn cell_value_to_json(value: &CellValue) -> Value {
    match value {
        CellValue::Null => Value::Null,
        CellValue::Bool(b) => Value::Bool(*b),
        CellValue::Int(i) => serde_json::json!(*i),
        // Non-finite floats have no JSON number form
        CellValue::Float(f) if !f.is_finite() => Value::String(f.to_string()),
        CellValue::Float(f) => serde_json::json!(*f),
        CellValue::String(s) => Value::String(s.to_string()),
        CellValue::Date(d) => Value::String(d.to_string()),
        CellValue::DateTime(dt) => Value::String(dt.to_string()),
    }
}

/// One JSON object per row, keyed by column name
fn rows_to_json(table: &Table) -> Vec<Map<String, Value>> {
    table
        .rows
        .iter()
        .map(|row| {
            table
                .column_names()
                .enumerate()
                .map(|(idx, name)| {
                    let value = row.get(idx).map(cell_value_to_json).unwrap_or(Value::Null);
                    (name.to_string(), value)
                })
                .collect()
        })
        .collect()
}

impl OutputFormatter for JsonOutput {
    fn render(
        &self,
        delta: &Delta,
        label_a: &str,
        label_b: &str,
        writer: &mut dyn Write,
    ) -> Result<()> {
        let changed = delta
            .change_summary()
            .into_iter()
            .map(|ColumnChanges { column, changed_rows }| {
                let rows = rows_to_json(&delta.changed(&column)?);
                Ok(JsonChanged {
                    column,
                    changed_rows,
                    rows,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let output = JsonDelta {
            label_a,
            label_b,
            keys: delta.keys(),
            tolerance: delta.options().tolerance,
            stats: delta.stats(),
            schema_changes: delta.schema_changes(),
            only_in_a: rows_to_json(delta.unmatched_a()),
            only_in_b: rows_to_json(delta.unmatched_b()),
            changed,
        };

        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, &output)?;
        } else {
            serde_json::to_writer(&mut *writer, &output)?;
        }
        writeln!(writer)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
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
        let delta = Delta::new(&a, &b, &["id"]).unwrap();

        let mut buf = Vec::new();
        JsonOutput::compact().render(&delta, "a", "b", &mut buf).unwrap();
        let value: Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["stats"]["only_in_a"], 1);
        assert_eq!(value["only_in_a"][0]["id"], 1);
        assert_eq!(value["only_in_b"][0]["price"], 400);
        assert_eq!(value["changed"][0]["column"], "price");
        assert_eq!(value["changed"][0]["rows"][0]["price_a"], 300);
        assert_eq!(value["changed"][0]["rows"][0]["price_b"], 250);
        assert_eq!(value["tolerance"]["abs"], 0.0);
    }

    #[test]
    fn test_tolerance_is_reported() {
        let a = Table::from_columns(vec![("id", vec![1.into()]), ("v", vec![100.into()])]).unwrap();
        let b = Table::from_columns(vec![("id", vec![1.into()]), ("v", vec![105.into()])]).unwrap();
        let options = crate::diff::DeltaOptions::new(0.0, 0.1).unwrap();
        let delta = Delta::with_options(&a, &b, &["id"], options).unwrap();

        let mut buf = Vec::new();
        JsonOutput::compact().render(&delta, "a", "b", &mut buf).unwrap();
        let value: Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["tolerance"]["rel"], 0.1);
        assert_eq!(value["stats"]["mismatched_keys"], 0);
        assert!(value["changed"][0]["rows"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_non_finite_float() {
        assert_eq!(cell_value_to_json(&CellValue::Float(f64::NAN)), Value::String("NaN".into()));
    }
}
