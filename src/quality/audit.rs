//! Data-quality audit: null policy, type conformance and date formats

use std::fmt;
use std::str::FromStr;

use chrono::format::{parse, ParseErrorKind, Parsed, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::model::{row_key, CellValue, RowKey, Table};

/// Layouts accepted for `datetime` values stored as text
const ISO_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Rule violated by an audit issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditRule {
    MissingColumn,
    NullForbidden,
    DtypeMismatch,
    InvalidDateFormat,
    InferredDtypeMismatch,
}

impl fmt::Display for AuditRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuditRule::MissingColumn => "missing_column",
            AuditRule::NullForbidden => "null_forbidden",
            AuditRule::DtypeMismatch => "dtype_mismatch",
            AuditRule::InvalidDateFormat => "invalid_date_format",
            AuditRule::InferredDtypeMismatch => "inferred_dtype_mismatch",
        };
        write!(f, "{}", name)
    }
}

/// Expected value category of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedType {
    Integer,
    Float,
    String,
    Boolean,
    Datetime,
}

impl ExpectedType {
    /// Category of a non-null value
    pub fn of(value: &CellValue) -> Option<ExpectedType> {
        match value {
            CellValue::Null => None,
            CellValue::Bool(_) => Some(ExpectedType::Boolean),
            CellValue::Int(_) => Some(ExpectedType::Integer),
            CellValue::Float(_) => Some(ExpectedType::Float),
            CellValue::String(_) => Some(ExpectedType::String),
            CellValue::Date(_) | CellValue::DateTime(_) => Some(ExpectedType::Datetime),
        }
    }

    /// Whether a non-null value conforms to this type
    pub fn accepts(self, value: &CellValue) -> bool {
        match self {
            ExpectedType::Integer => match value {
                CellValue::Int(_) => true,
                CellValue::Float(f) => is_integral(*f),
                CellValue::String(s) => parse_number(s).is_some_and(is_integral),
                _ => false,
            },
            ExpectedType::Float => match value {
                CellValue::Int(_) | CellValue::Float(_) => true,
                CellValue::String(s) => parse_number(s).is_some(),
                _ => false,
            },
            ExpectedType::String => matches!(value, CellValue::String(_)),
            ExpectedType::Boolean => matches!(value, CellValue::Bool(_)),
            ExpectedType::Datetime => match value {
                CellValue::Date(_) | CellValue::DateTime(_) => true,
                CellValue::String(s) => parses_as_iso_datetime(s.trim()),
                _ => false,
            },
        }
    }
}

impl fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExpectedType::Integer => "integer",
            ExpectedType::Float => "float",
            ExpectedType::String => "string",
            ExpectedType::Boolean => "boolean",
            ExpectedType::Datetime => "datetime",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ExpectedType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "str" | "string" | "text" | "object" => Ok(ExpectedType::String),
            "bool" | "boolean" => Ok(ExpectedType::Boolean),
            _ if lower.contains("int") => Ok(ExpectedType::Integer),
            _ if ["float", "double", "numeric", "number"]
                .iter()
                .any(|t| lower.contains(t)) =>
            {
                Ok(ExpectedType::Float)
            }
            _ if lower.starts_with("date") => Ok(ExpectedType::Datetime),
            _ => Err(format!("Unknown column type: {}", s)),
        }
    }
}

fn is_integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

fn parses_as_iso_datetime(text: &str) -> bool {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(text).is_ok()
        || ISO_DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(text, fmt).is_ok())
}

/// Whole-string match of `fmt`. Layouts naming only part of a date
/// (`%Y-%m`, `%H:%M`) are accepted; a full date must also exist.
pub(super) fn parses_with(text: &str, fmt: &str) -> bool {
    let mut parsed = Parsed::new();
    if parse(&mut parsed, text, StrftimeItems::new(fmt)).is_err() {
        return false;
    }
    match parsed.to_naive_date() {
        Ok(_) => true,
        Err(e) => e.kind() == ParseErrorKind::NotEnough,
    }
}

/// Audit configuration; columns not mentioned are not checked (except by
/// type inference when enabled).
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Column -> whether nulls are allowed
    pub allow_nulls: IndexMap<String, bool>,
    /// Column -> expected value type
    pub expected_types: IndexMap<String, ExpectedType>,
    /// Column -> accepted strftime formats, tried in order
    pub date_formats: IndexMap<String, Vec<String>>,
    /// Columns whose values identify a row in reported issues
    pub key_columns: Vec<String>,
    /// Flag values that differ from a column's predominant type
    pub infer_types: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            allow_nulls: IndexMap::new(),
            expected_types: IndexMap::new(),
            date_formats: IndexMap::new(),
            key_columns: Vec::new(),
            infer_types: true,
        }
    }
}

impl AuditConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the null policy for a column
    pub fn allow_nulls(mut self, column: impl Into<String>, allow: bool) -> Self {
        self.allow_nulls.insert(column.into(), allow);
        self
    }

    /// Shorthand for `allow_nulls(column, false)`
    pub fn forbid_nulls(self, column: impl Into<String>) -> Self {
        self.allow_nulls(column, false)
    }

    pub fn expect_type(mut self, column: impl Into<String>, expected: ExpectedType) -> Self {
        self.expected_types.insert(column.into(), expected);
        self
    }

    /// Accepted date formats for a column; appends to any already configured
    pub fn date_formats<I, S>(mut self, column: impl Into<String>, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_formats
            .entry(column.into())
            .or_default()
            .extend(formats.into_iter().map(Into::into));
        self
    }

    pub fn with_key_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_infer_types(mut self, infer: bool) -> Self {
        self.infer_types = infer;
        self
    }
}

/// A single detected violation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditIssue {
    pub column: String,
    pub rule: AuditRule,
    /// 0-based row position, `None` for column-level issues
    pub row: Option<usize>,
    /// Line of the row in its source file
    pub source_line: Option<usize>,
    /// Row key when key columns are configured
    pub key: Option<RowKey>,
    pub value: CellValue,
    pub detail: String,
}

/// Check `table` against `config`. Issues are sorted by column, rule and row.
pub fn audit_table(table: &Table, config: &AuditConfig) -> Result<Vec<AuditIssue>> {
    let key_columns = config
        .key_columns
        .iter()
        .map(|name| table.require_column(name))
        .collect::<Result<Vec<_>>>()?;
    let auditor = Auditor {
        table,
        key_columns,
        issues: Vec::new(),
    };
    let mut issues = auditor.run(config);

    issues.sort_by(|a, b| (&a.column, a.rule, a.row).cmp(&(&b.column, b.rule, b.row)));
    debug!(issues = issues.len(), rows = table.row_count(), "audit complete");
    Ok(issues)
}

struct Auditor<'a> {
    table: &'a Table,
    key_columns: Vec<usize>,
    issues: Vec<AuditIssue>,
}

impl Auditor<'_> {
    fn run(mut self, config: &AuditConfig) -> Vec<AuditIssue> {
        for (column, &allow) in &config.allow_nulls {
            if allow {
                continue;
            }
            self.check_column(column, |value| {
                value
                    .is_null()
                    .then(|| (AuditRule::NullForbidden, "null value in non-nullable column".to_string()))
            });
        }

        for (column, &expected) in &config.expected_types {
            self.check_column(column, |value| {
                (!value.is_null() && !expected.accepts(value)).then(|| {
                    (
                        AuditRule::DtypeMismatch,
                        format!("expected {}, got '{}'", expected, value.display()),
                    )
                })
            });
        }

        for (column, formats) in &config.date_formats {
            self.check_column(column, |value| {
                if value.is_null() || matches!(value, CellValue::Date(_) | CellValue::DateTime(_)) {
                    return None;
                }
                let text = value.display();
                let text = text.trim();
                formats
                    .iter()
                    .find(|fmt| parses_with(text, fmt))
                    .is_none()
                    .then(|| {
                        (
                            AuditRule::InvalidDateFormat,
                            format!("'{}' matches none of [{}]", text, formats.join(", ")),
                        )
                    })
            });
        }

        if config.infer_types {
            let table = self.table;
            for col in &table.columns {
                if config.expected_types.contains_key(&col.name) {
                    continue;
                }
                self.check_inferred(col.index, &col.name);
            }
        }

        self.issues
    }

    /// Run a per-value rule over a configured column
    fn check_column<F>(&mut self, column: &str, rule: F)
    where
        F: Fn(&CellValue) -> Option<(AuditRule, String)>,
    {
        let Some(idx) = self.table.column_index(column) else {
            warn!(column, "audited column not found in table");
            self.issues.push(AuditIssue {
                column: column.to_string(),
                rule: AuditRule::MissingColumn,
                row: None,
                source_line: None,
                key: None,
                value: CellValue::Null,
                detail: "column not found".to_string(),
            });
            return;
        };
        let found: Vec<_> = self
            .table
            .column_values(idx)
            .enumerate()
            .filter_map(|(row, value)| rule(value).map(|(r, detail)| (row, value.clone(), r, detail)))
            .collect();
        for (row, value, rule, detail) in found {
            self.push(column, row, rule, value, detail);
        }
    }

    fn check_inferred(&mut self, idx: usize, column: &str) {
        let categories: Vec<Option<ExpectedType>> = self
            .table
            .column_values(idx)
            .map(|v| ExpectedType::of(v).map(fold_numeric))
            .collect();

        let mut counts: IndexMap<ExpectedType, usize> = IndexMap::new();
        for category in categories.iter().flatten() {
            *counts.entry(*category).or_insert(0) += 1;
        }
        // Ties go to the category seen first
        let Some(predominant) = counts
            .iter()
            .fold(None, |best: Option<(ExpectedType, usize)>, (&cat, &n)| match best {
                Some((_, m)) if m >= n => best,
                _ => Some((cat, n)),
            })
            .map(|(cat, _)| cat)
        else {
            return;
        };

        for (row, category) in categories.into_iter().enumerate() {
            if category.is_some_and(|c| c != predominant) {
                let value = self.table.rows[row].get(idx).cloned().unwrap_or(CellValue::Null);
                let detail = format!("expected {} (inferred), got '{}'", predominant, value.display());
                self.push(column, row, AuditRule::InferredDtypeMismatch, value, detail);
            }
        }
    }

    fn push(&mut self, column: &str, row: usize, rule: AuditRule, value: CellValue, detail: String) {
        let source = &self.table.rows[row];
        let key = (!self.key_columns.is_empty()).then(|| row_key(source, &self.key_columns));
        self.issues.push(AuditIssue {
            column: column.to_string(),
            rule,
            row: Some(row),
            source_line: Some(source.source_line),
            key,
            value,
            detail,
        });
    }
}

/// Ints and floats share one category when inferring a column's type
fn fold_numeric(category: ExpectedType) -> ExpectedType {
    match category {
        ExpectedType::Integer => ExpectedType::Float,
        other => other,
    }
}
