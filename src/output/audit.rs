//! Rendering of data-quality audit and expectation results

use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::quality::{AuditIssue, AuditRule, ExpectationReport};

use super::terminal::render_view;

/// Output format for audit issues
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuditFormat {
    #[default]
    Text,
    Json,
}

#[derive(Serialize)]
struct AuditReport<'a> {
    issue_count: usize,
    issues: &'a [AuditIssue],
}

/// Write `issues` to `writer`
pub fn render_audit(issues: &[AuditIssue], format: AuditFormat, writer: &mut dyn Write) -> Result<()> {
    match format {
        AuditFormat::Json => {
            let report = AuditReport {
                issue_count: issues.len(),
                issues,
            };
            serde_json::to_writer_pretty(&mut *writer, &report)?;
            writeln!(writer)?;
        }
        AuditFormat::Text => {
            if issues.is_empty() {
                writeln!(writer, "No issues found.")?;
                return Ok(());
            }

            let headers: Vec<String> = ["column", "rule", "line", "key", "value", "detail"]
                .iter()
                .map(|h| h.to_string())
                .collect();
            let rows: Vec<Vec<String>> = issues
                .iter()
                .map(|issue| {
                    vec![
                        issue.column.clone(),
                        issue.rule.to_string(),
                        issue.source_line.map(|l| l.to_string()).unwrap_or_default(),
                        issue.key.as_ref().map(|k| k.to_string()).unwrap_or_default(),
                        if issue.rule == AuditRule::MissingColumn {
                            String::new()
                        } else {
                            issue.value.display().into_owned()
                        },
                        issue.detail.clone(),
                    ]
                })
                .collect();

            writeln!(writer, "{}", render_view(&headers, &rows))?;
            writeln!(writer, "{} issue(s) found", issues.len())?;
        }
    }
    Ok(())
}

/// Write an expectation report to `writer`
pub fn render_expectations(report: &ExpectationReport, format: AuditFormat, writer: &mut dyn Write) -> Result<()> {
    match format {
        AuditFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, report)?;
            writeln!(writer)?;
        }
        AuditFormat::Text => writeln!(writer, "{}", report)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellValue, Table};
    use crate::quality::{audit_table, expect_table, AuditConfig, ColumnExpectation, Expectations};

    fn issues() -> Vec<AuditIssue> {
        let table = Table::from_columns(vec![
            ("id", vec![1.into(), 2.into()]),
            ("name", vec!["a".into(), CellValue::Null]),
        ])
        .unwrap();
        audit_table(&table, &AuditConfig::new().forbid_nulls("name")).unwrap()
    }

    #[test]
    fn test_text() {
        let mut buf = Vec::new();
        render_audit(&issues(), AuditFormat::Text, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("null_forbidden"));
        assert!(text.contains("1 issue(s) found"));
    }

    #[test]
    fn test_json() {
        let mut buf = Vec::new();
        render_audit(&issues(), AuditFormat::Json, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["issue_count"], 1);
        assert_eq!(value["issues"][0]["rule"], "null_forbidden");
        assert_eq!(value["issues"][0]["row"], 1);
    }

    #[test]
    fn test_no_issues() {
        let mut buf = Vec::new();
        render_audit(&[], AuditFormat::Text, &mut buf).unwrap();

        assert_eq!(String::from_utf8(buf).unwrap(), "No issues found.\n");
    }

    #[test]
    fn test_expectations() {
        let table = Table::from_columns(vec![("status", vec!["ok".into(), "bad".into()])]).unwrap();
        let expectations =
            Expectations::new().column(ColumnExpectation::new("status").allowed_values(["ok", "pending"]));
        let report = expect_table(&table, &expectations);

        let mut buf = Vec::new();
        render_expectations(&report, AuditFormat::Json, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["passed"], false);
        assert_eq!(value["column_results"][0]["column"], "status");

        let mut buf = Vec::new();
        render_expectations(&report, AuditFormat::Text, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Expectation report: FAILED\n"));
        assert!(text.contains("- status: FAIL -> unexpected values; rows [1]; samples: [bad]"));
    }
}
