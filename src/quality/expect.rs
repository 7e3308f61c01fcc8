//! Structured expectations: per-column checks and row rules, reported as
//! pass/fail results with diagnostics.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use rustc_hash::FxBuildHasher;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{CellValue, Table};

use super::audit::{parses_with, ExpectedType};

/// Offending values quoted per diagnostic
const SAMPLE_LIMIT: usize = 5;

/// Regular expression that must match a whole value
#[derive(Debug, Clone)]
pub struct ValuePattern {
    text: String,
    regex: Regex,
}

impl ValuePattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            text: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// Checks applied to one column. Unset fields are not checked.
#[derive(Debug, Clone, Default)]
pub struct ColumnExpectation {
    pub name: String,
    /// Non-null values must not repeat
    pub unique: bool,
    pub dtype: Option<ExpectedType>,
    /// strftime layout for text values of a `datetime` column
    pub format: Option<String>,
    /// Accepted display forms of non-null values
    pub allowed_values: Option<IndexSet<String>>,
    pub pattern: Option<ValuePattern>,
    /// `Some(false)` forbids nulls
    pub allow_nulls: Option<bool>,
}

impl ColumnExpectation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.allow_nulls = Some(false);
        self
    }

    pub fn allow_nulls(mut self) -> Self {
        self.allow_nulls = Some(true);
        self
    }

    pub fn dtype(mut self, dtype: ExpectedType) -> Self {
        self.dtype = Some(dtype);
        self
    }

    /// Expect `datetime` values written in `format`
    pub fn datetime_format(mut self, format: impl Into<String>) -> Self {
        self.dtype = Some(ExpectedType::Datetime);
        self.format = Some(format.into());
        self
    }

    pub fn allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Require every non-null value to match `pattern` in full
    pub fn matching(mut self, pattern: &str) -> Result<Self> {
        self.pattern = Some(ValuePattern::new(pattern)?);
        Ok(self)
    }
}

/// Comparison operator of a row rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
        }
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Eq => ordering == Ordering::Equal,
            Comparison::Ne => ordering != Ordering::Equal,
            Comparison::Lt => ordering == Ordering::Less,
            Comparison::Le => ordering != Ordering::Greater,
            Comparison::Gt => ordering == Ordering::Greater,
            Comparison::Ge => ordering != Ordering::Less,
        }
    }
}

/// Two-character operators come first so `>=` is not read as `>`
const OPERATORS: [(&str, Comparison); 7] = [
    (">=", Comparison::Ge),
    ("<=", Comparison::Le),
    ("==", Comparison::Eq),
    ("!=", Comparison::Ne),
    (">", Comparison::Gt),
    ("<", Comparison::Lt),
    ("=", Comparison::Eq),
];

/// Right-hand side of a row rule
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Column(String),
    Value(CellValue),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Column(name) => write!(f, "{}", name),
            Operand::Value(CellValue::String(s)) => write!(f, "'{}'", s),
            Operand::Value(value) => write!(f, "{}", value),
        }
    }
}

/// Condition every row must satisfy, such as `amount >= 0` or `end >= start`.
///
/// A row fails when either side is null or the two sides cannot be ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct RowRule {
    pub description: String,
    pub column: String,
    pub comparison: Comparison,
    pub operand: Operand,
}

impl RowRule {
    pub fn new(column: impl Into<String>, comparison: Comparison, operand: Operand) -> Self {
        let column = column.into();
        let description = format!("{} {} {}", column, comparison.symbol(), operand);
        Self {
            description,
            column,
            comparison,
            operand,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl FromStr for RowRule {
    type Err = Error;

    /// Parse `COLUMN OP OPERAND`; the operand is a quoted string, a number,
    /// `true`/`false`, or otherwise the name of another column.
    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let invalid = || Error::InvalidRule(text.to_string());

        let (pos, op, comparison) = text
            .char_indices()
            .find_map(|(i, _)| {
                OPERATORS
                    .iter()
                    .find(|(op, _)| text[i..].starts_with(op))
                    .map(|&(op, comparison)| (i, op, comparison))
            })
            .ok_or_else(invalid)?;

        let column = text[..pos].trim();
        let operand = text[pos + op.len()..].trim();
        if column.is_empty() || operand.is_empty() {
            return Err(invalid());
        }

        Ok(RowRule::new(column, comparison, parse_operand(operand)).with_description(text))
    }
}

fn parse_operand(text: &str) -> Operand {
    for quote in ['\'', '"'] {
        if let Some(inner) = text.strip_prefix(quote).and_then(|t| t.strip_suffix(quote)) {
            return Operand::Value(inner.into());
        }
    }
    if let Ok(i) = text.parse::<i64>() {
        return Operand::Value(CellValue::Int(i));
    }
    if let Ok(f) = text.parse::<f64>() {
        return Operand::Value(CellValue::Float(f));
    }
    match text {
        "true" => Operand::Value(CellValue::Bool(true)),
        "false" => Operand::Value(CellValue::Bool(false)),
        _ => Operand::Column(text.to_string()),
    }
}

type RowCheck = Box<dyn Fn(&Table, usize) -> bool + Send + Sync>;

/// Caller-supplied predicate evaluated on every row
pub struct Validator {
    description: String,
    check: RowCheck,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl Validator {
    fn run(&self, table: &Table) -> RuleResult {
        let failing: Vec<usize> = (0..table.row_count())
            .filter(|&row| !(self.check)(table, row))
            .collect();
        let message = (!failing.is_empty()).then(|| {
            format!(
                "rows failing validator '{}': {}",
                self.description,
                row_list(&failing)
            )
        });
        RuleResult::new(self.description.clone(), failing, message)
    }
}

/// Everything one `expect_table` call checks
#[derive(Debug, Default)]
pub struct Expectations {
    pub columns: Vec<ColumnExpectation>,
    pub row_rules: Vec<RowRule>,
    validators: Vec<Validator>,
}

impl Expectations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, expectation: ColumnExpectation) -> Self {
        self.columns.push(expectation);
        self
    }

    pub fn row_rule(mut self, rule: RowRule) -> Self {
        self.row_rules.push(rule);
        self
    }

    /// Add a row predicate; rows for which `check` returns false fail it
    pub fn validator<F>(mut self, description: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Table, usize) -> bool + Send + Sync + 'static,
    {
        self.validators.push(Validator {
            description: description.into(),
            check: Box::new(check),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.row_rules.is_empty() && self.validators.is_empty()
    }
}

/// Outcome of one column expectation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnResult {
    pub column: String,
    pub passed: bool,
    pub diagnostics: Vec<String>,
}

/// Outcome of one row rule or validator; rows are 0-based positions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleResult {
    pub description: String,
    pub passed: bool,
    pub failing_rows: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RuleResult {
    fn new(description: String, failing_rows: Vec<usize>, message: Option<String>) -> Self {
        Self {
            description,
            passed: failing_rows.is_empty() && message.is_none(),
            failing_rows,
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpectationReport {
    pub passed: bool,
    pub column_results: Vec<ColumnResult>,
    pub row_results: Vec<RuleResult>,
    pub custom_results: Vec<RuleResult>,
}

impl ExpectationReport {
    /// First result recorded for `column`
    pub fn column(&self, column: &str) -> Option<&ColumnResult> {
        self.column_results.iter().find(|r| r.column == column)
    }
}

fn status(passed: bool) -> &'static str {
    if passed {
        "PASS"
    } else {
        "FAIL"
    }
}

impl fmt::Display for ExpectationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Expectation report: {}",
            if self.passed { "PASSED" } else { "FAILED" }
        )?;

        if !self.column_results.is_empty() {
            write!(f, "\nColumns:")?;
            for result in &self.column_results {
                write!(f, "\n- {}: {}", result.column, status(result.passed))?;
                if !result.diagnostics.is_empty() {
                    write!(f, " -> {}", result.diagnostics.join(" | "))?;
                }
            }
        }

        for (title, results) in [
            ("Row rules:", &self.row_results),
            ("Custom validators:", &self.custom_results),
        ] {
            if results.is_empty() {
                continue;
            }
            write!(f, "\n{}", title)?;
            for result in results {
                write!(f, "\n- {}: {}", result.description, status(result.passed))?;
                if let Some(message) = &result.message {
                    write!(f, " -> {}", message)?;
                }
            }
        }
        Ok(())
    }
}

/// Check `table` against `expectations`.
///
/// Missing columns fail their expectation (or rule) instead of raising an
/// error, so one report covers every check.
pub fn expect_table(table: &Table, expectations: &Expectations) -> ExpectationReport {
    let column_results: Vec<ColumnResult> = expectations
        .columns
        .iter()
        .map(|expectation| check_column(table, expectation))
        .collect();
    let row_results: Vec<RuleResult> = expectations
        .row_rules
        .iter()
        .map(|rule| check_rule(table, rule))
        .collect();
    let custom_results: Vec<RuleResult> = expectations
        .validators
        .iter()
        .map(|validator| validator.run(table))
        .collect();

    let passed = column_results.iter().all(|r| r.passed)
        && row_results.iter().chain(&custom_results).all(|r| r.passed);
    debug!(
        passed,
        columns = column_results.len(),
        rules = row_results.len() + custom_results.len(),
        "expectations checked"
    );

    ExpectationReport {
        passed,
        column_results,
        row_results,
        custom_results,
    }
}

fn check_column(table: &Table, expectation: &ColumnExpectation) -> ColumnResult {
    let Some(index) = table.column_index(&expectation.name) else {
        return ColumnResult {
            column: expectation.name.clone(),
            passed: false,
            diagnostics: vec!["column missing".to_string()],
        };
    };
    let values: Vec<&CellValue> = table.column_values(index).collect();
    let mut diagnostics = Vec::new();

    if expectation.allow_nulls == Some(false) {
        let rows = positions(&values, |v| v.is_null());
        if !rows.is_empty() {
            diagnostics.push(format!("nulls forbidden; rows {}", row_list(&rows)));
        }
    }

    if expectation.unique {
        let rows = duplicated_positions(&values);
        if !rows.is_empty() {
            diagnostics.push(format!(
                "expected unique values; duplicate rows {}; samples: {}",
                row_list(&rows),
                samples(&values, &rows)
            ));
        }
    }

    if let Some(dtype) = expectation.dtype {
        let format = expectation.format.as_deref();
        let rows = positions(&values, |v| !v.is_null() && !conforms(dtype, format, v));
        if !rows.is_empty() {
            let mut detail = format!(
                "expected {}; rows {}; samples: {}",
                dtype,
                row_list(&rows),
                samples(&values, &rows)
            );
            if let (ExpectedType::Datetime, Some(format)) = (dtype, format) {
                detail.push_str(&format!("; format={}", format));
            }
            diagnostics.push(detail);
        }
    }

    if let Some(allowed) = &expectation.allowed_values {
        let rows = positions(&values, |v| !v.is_null() && !allowed.contains(&*v.display()));
        if !rows.is_empty() {
            diagnostics.push(format!(
                "unexpected values; rows {}; samples: {}",
                row_list(&rows),
                samples(&values, &rows)
            ));
        }
    }

    if let Some(pattern) = &expectation.pattern {
        let rows = positions(&values, |v| !v.is_null() && !pattern.is_match(&v.display()));
        if !rows.is_empty() {
            diagnostics.push(format!(
                "regex mismatch /{}/; rows {}; samples: {}",
                pattern.as_str(),
                row_list(&rows),
                samples(&values, &rows)
            ));
        }
    }

    ColumnResult {
        column: expectation.name.clone(),
        passed: diagnostics.is_empty(),
        diagnostics,
    }
}

fn conforms(dtype: ExpectedType, format: Option<&str>, value: &CellValue) -> bool {
    match (dtype, format, value) {
        (ExpectedType::Datetime, Some(format), CellValue::String(s)) => parses_with(s.trim(), format),
        _ => dtype.accepts(value),
    }
}

fn positions(values: &[&CellValue], mut failing: impl FnMut(&CellValue) -> bool) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| failing(v))
        .map(|(i, _)| i)
        .collect()
}

/// Every position holding a non-null value that occurs more than once
fn duplicated_positions(values: &[&CellValue]) -> Vec<usize> {
    let mut counts: IndexMap<&CellValue, usize, FxBuildHasher> = IndexMap::default();
    for value in values.iter().filter(|v| !v.is_null()) {
        *counts.entry(*value).or_insert(0) += 1;
    }
    positions(values, |v| counts.get(v).is_some_and(|&n| n > 1))
}

fn row_list(rows: &[usize]) -> String {
    format!("{:?}", rows)
}

fn samples(values: &[&CellValue], rows: &[usize]) -> String {
    let quoted: Vec<String> = rows
        .iter()
        .take(SAMPLE_LIMIT)
        .map(|&i| values[i].display().into_owned())
        .collect();
    format!("[{}]", quoted.join(", "))
}

fn check_rule(table: &Table, rule: &RowRule) -> RuleResult {
    let unevaluable = |column: &str| {
        RuleResult::new(
            rule.description.clone(),
            (0..table.row_count()).collect(),
            Some(format!("failed to evaluate rule: column '{}' not found", column)),
        )
    };

    let Some(left) = table.column_index(&rule.column) else {
        return unevaluable(rule.column.as_str());
    };
    let right = match &rule.operand {
        Operand::Column(name) => match table.column_index(name) {
            Some(index) => Some(index),
            None => return unevaluable(name.as_str()),
        },
        Operand::Value(_) => None,
    };

    let failing: Vec<usize> = table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            let a = row.get(left).unwrap_or(&CellValue::Null);
            let b = match (&rule.operand, right) {
                (Operand::Value(value), _) => value,
                (Operand::Column(_), Some(index)) => row.get(index).unwrap_or(&CellValue::Null),
                (Operand::Column(_), None) => &CellValue::Null,
            };
            !compare_cells(a, b).is_some_and(|ordering| rule.comparison.holds(ordering))
        })
        .map(|(i, _)| i)
        .collect();

    let message = (!failing.is_empty())
        .then(|| format!("rows failing rule '{}': {}", rule.description, row_list(&failing)));
    RuleResult::new(rule.description.clone(), failing, message)
}

/// Order two cells of comparable kinds; `None` for nulls and mixed kinds
fn compare_cells(a: &CellValue, b: &CellValue) -> Option<Ordering> {
    match (a, b) {
        (CellValue::Null, _) | (_, CellValue::Null) => None,
        (CellValue::Int(x), CellValue::Int(y)) => Some(x.cmp(y)),
        (CellValue::Bool(x), CellValue::Bool(y)) => Some(x.cmp(y)),
        (CellValue::String(x), CellValue::String(y)) => Some(x.cmp(y)),
        (CellValue::Date(x), CellValue::Date(y)) => Some(x.cmp(y)),
        (CellValue::DateTime(x), CellValue::DateTime(y)) => Some(x.cmp(y)),
        (CellValue::Date(x), CellValue::DateTime(y)) => Some(x.and_hms_opt(0, 0, 0)?.cmp(y)),
        (CellValue::DateTime(_), CellValue::Date(_)) => compare_cells(b, a).map(Ordering::reverse),
        (CellValue::Date(_) | CellValue::DateTime(_), CellValue::String(s)) => {
            compare_cells(a, &parse_date_literal(s)?)
        }
        (CellValue::String(_), CellValue::Date(_) | CellValue::DateTime(_)) => {
            compare_cells(b, a).map(Ordering::reverse)
        }
        _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

fn parse_date_literal(text: &str) -> Option<CellValue> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .map(CellValue::DateTime)
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d").map(CellValue::Date))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customers() -> Table {
        Table::from_columns(vec![
            ("id", vec![1.into(), 1.into(), 2.into()]),
            ("age", vec![25.into(), "x".into(), CellValue::Null]),
            ("status", vec!["active".into(), "inactive".into(), "pending".into()]),
        ])
        .unwrap()
    }

    fn orders() -> Table {
        Table::from_columns(vec![
            ("order_id", vec![1.into(), 2.into(), 3.into()]),
            (
                "placed_at",
                vec!["2024-01-01".into(), "2024-01-02".into(), "2024-13-01".into()],
            ),
            ("code", vec!["AB12".into(), "ZZ99".into(), "bad".into()]),
            ("amount", vec![10.0.into(), 0.0.into(), (-5.0).into()]),
        ])
        .unwrap()
    }

    #[test]
    fn test_column_expectations() {
        let expectations = Expectations::new()
            .column(ColumnExpectation::new("id").unique().not_null())
            .column(ColumnExpectation::new("age").dtype(ExpectedType::Integer).allow_nulls())
            .column(ColumnExpectation::new("status").allowed_values(["active", "inactive"]));

        let report = expect_table(&customers(), &expectations);

        assert!(!report.passed);
        assert_eq!(report.column_results.len(), 3);

        let id = report.column("id").unwrap();
        assert!(!id.passed);
        assert_eq!(
            id.diagnostics,
            vec!["expected unique values; duplicate rows [0, 1]; samples: [1, 1]"]
        );

        let age = report.column("age").unwrap();
        assert!(!age.passed);
        assert!(age.diagnostics[0].contains("expected integer; rows [1]"));

        let status = report.column("status").unwrap();
        assert!(status.diagnostics[0].starts_with("unexpected values; rows [2]"));
    }

    #[test]
    fn test_formats_patterns_and_row_rules() {
        let expectations = Expectations::new()
            .column(ColumnExpectation::new("order_id").unique().not_null())
            .column(ColumnExpectation::new("placed_at").datetime_format("%Y-%m-%d"))
            .column(ColumnExpectation::new("code").matching(r"^[A-Z]{2}\d{2}$").unwrap())
            .column(ColumnExpectation::new("amount").dtype(ExpectedType::Float))
            .row_rule("amount >= 0".parse().unwrap());

        let report = expect_table(&orders(), &expectations);

        assert!(!report.passed);
        assert!(report.column("order_id").unwrap().passed);
        assert!(report.column("amount").unwrap().passed);

        let placed_at = report.column("placed_at").unwrap();
        assert!(!placed_at.passed);
        assert!(placed_at.diagnostics[0].contains("expected datetime"));
        assert!(placed_at.diagnostics[0].ends_with("format=%Y-%m-%d"));

        let code = report.column("code").unwrap();
        assert!(code.diagnostics[0].starts_with("regex mismatch"));
        assert!(code.diagnostics[0].contains("samples: [bad]"));

        let rule = &report.row_results[0];
        assert!(!rule.passed);
        assert_eq!(rule.failing_rows, vec![2]);
    }

    #[test]
    fn test_pattern_must_match_whole_value() {
        let table = Table::from_columns(vec![("sku", vec!["AB12".into(), "xAB12".into(), CellValue::Null])]).unwrap();
        let expectations = Expectations::new().column(ColumnExpectation::new("sku").matching("[A-Z]{2}[0-9]{2}").unwrap());

        let report = expect_table(&table, &expectations);

        assert!(report.column("sku").unwrap().diagnostics[0].contains("rows [1]"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            ColumnExpectation::new("c").matching("(unclosed"),
            Err(Error::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_missing_column_fails() {
        let expectations = Expectations::new()
            .column(ColumnExpectation::new("nope").unique())
            .row_rule("nope > 1".parse().unwrap());

        let report = expect_table(&customers(), &expectations);

        assert_eq!(report.column("nope").unwrap().diagnostics, vec!["column missing"]);
        assert_eq!(report.row_results[0].failing_rows, vec![0, 1, 2]);
        assert!(report.row_results[0].message.as_deref().unwrap().contains("'nope' not found"));
    }

    #[test]
    fn test_unique_ignores_nulls() {
        let table = Table::from_columns(vec![("v", vec![CellValue::Null, CellValue::Null, 1.into()])]).unwrap();
        let report = expect_table(&table, &Expectations::new().column(ColumnExpectation::new("v").unique()));

        assert!(report.passed);
    }

    #[test]
    fn test_parse_row_rule() {
        let rule: RowRule = "end >= start".parse().unwrap();
        assert_eq!(rule.column, "end");
        assert_eq!(rule.comparison, Comparison::Ge);
        assert_eq!(rule.operand, Operand::Column("start".into()));

        let rule: RowRule = "status != 'closed'".parse().unwrap();
        assert_eq!(rule.comparison, Comparison::Ne);
        assert_eq!(rule.operand, Operand::Value("closed".into()));

        assert!(matches!("amount".parse::<RowRule>(), Err(Error::InvalidRule(_))));
        assert!(matches!(">= 3".parse::<RowRule>(), Err(Error::InvalidRule(_))));
    }

    #[test]
    fn test_row_rule_between_columns() {
        let table = Table::from_columns(vec![
            ("start", vec![1.into(), 5.into(), 2.into()]),
            ("end", vec![3.into(), 4.into(), CellValue::Null]),
        ])
        .unwrap();
        let expectations = Expectations::new().row_rule(RowRule::new("end", Comparison::Ge, Operand::Column("start".into())));

        let report = expect_table(&table, &expectations);

        assert_eq!(report.row_results[0].description, "end >= start");
        assert_eq!(report.row_results[0].failing_rows, vec![1, 2]);
    }

    #[test]
    fn test_date_rule_against_literal() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let table = Table::from_columns(vec![("day", vec![CellValue::Date(day)])]).unwrap();

        let later = expect_table(&table, &Expectations::new().row_rule("day >= '2024-01-01'".parse().unwrap()));
        let earlier = expect_table(&table, &Expectations::new().row_rule("day < '2024-01-01'".parse().unwrap()));

        assert!(later.passed);
        assert!(!earlier.passed);
    }

    #[test]
    fn test_custom_validator() {
        let expectations = Expectations::new().validator("positive amount", |table, row| {
            table
                .cell(row, "amount")
                .and_then(CellValue::as_f64)
                .is_some_and(|v| v > 0.0)
        });

        let report = expect_table(&orders(), &expectations);

        assert_eq!(report.custom_results[0].failing_rows, vec![1, 2]);
        assert!(!report.passed);
    }

    #[test]
    fn test_human_readable_report() {
        let expectations = Expectations::new()
            .column(ColumnExpectation::new("order_id").unique())
            .row_rule("amount >= 0".parse().unwrap());

        let text = expect_table(&orders(), &expectations).to_string();

        assert_eq!(
            text,
            "Expectation report: FAILED\n\
             Columns:\n\
             - order_id: PASS\n\
             Row rules:\n\
             - amount >= 0: FAIL -> rows failing rule 'amount >= 0': [2]"
        );
    }
}
