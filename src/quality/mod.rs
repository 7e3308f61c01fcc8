//! Data-quality helpers: duplicate detection, whitespace trimming, auditing
//! and structured expectations

mod audit;
mod duplicates;
mod expect;
mod trim;

pub use audit::{audit_table, AuditConfig, AuditIssue, AuditRule, ExpectedType};
pub use expect::{
    expect_table, ColumnExpectation, ColumnResult, Comparison, ExpectationReport, Expectations, Operand, RowRule,
    RuleResult, ValuePattern,
};
pub use duplicates::{count_duplicates, duplicate_rows, find_duplicates};
pub use trim::trim_whitespace;
