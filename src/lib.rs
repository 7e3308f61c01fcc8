//! keydiff - Key-based diff and data-quality audit for tabular data
//!
//! Compares two tables aligned on key columns, reporting rows present on
//! only one side and per-column cell changes with numeric tolerance. Also
//! provides duplicate detection, whitespace trimming, a data-quality
//! audit and structured expectations, plus CSV/Excel readers and
//! terminal, JSON and HTML reports.
//!
//! ```
//! use keydiff::{Delta, Table};
//!
//! let a = Table::from_columns(vec![
//!     ("id", vec![1.into(), 2.into(), 3.into()]),
//!     ("price", vec![100.into(), 200.into(), 300.into()]),
//! ])?;
//! let b = Table::from_columns(vec![
//!     ("id", vec![2.into(), 3.into(), 4.into()]),
//!     ("price", vec![200.into(), 250.into(), 400.into()]),
//! ])?;
//!
//! let delta = Delta::new(&a, &b, &["id"])?;
//! assert_eq!(delta.unmatched_a().row_count(), 1);
//! assert_eq!(delta.changed("price")?.row_count(), 1);
//! # Ok::<(), keydiff::Error>(())
//! ```

pub mod config;
pub mod diff;
pub mod error;
pub mod logging;
pub mod model;
pub mod output;
pub mod parser;
pub mod quality;

pub use config::{Config, OutputFormat};
pub use diff::{Delta, DeltaOptions, DeltaStats, Tolerance};
pub use error::{Error, Result};
pub use model::{CellValue, Table};
pub use quality::{
    audit_table, count_duplicates, duplicate_rows, expect_table, find_duplicates, trim_whitespace, AuditConfig,
    AuditIssue, ColumnExpectation, ExpectationReport, Expectations, ExpectedType, RowRule,
};
