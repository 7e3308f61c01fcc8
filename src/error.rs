//! Error types for keydiff

use std::path::PathBuf;

use crate::model::Side;

/// Errors raised by the diff engine, the quality helpers and the I/O layer
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No key columns were given
    #[error("at least one key column is required")]
    EmptyKeySpec,

    /// A key column is absent from one of the tables
    #[error("key column '{column}' not found in table {side}")]
    MissingKeyColumn { column: String, side: Side },

    /// A compared column is absent from one of the tables
    #[error("column '{column}' not found in table {side}")]
    ColumnNotFound { column: String, side: Side },

    /// A column named for a single-table operation does not exist
    #[error("column '{0}' not found")]
    UnknownColumn(String),

    /// Tolerances must be finite and non-negative
    #[error("invalid tolerance: {name} must be a non-negative number, got {value}")]
    InvalidTolerance { name: &'static str, value: f64 },

    /// Column-wise construction with columns of differing lengths
    #[error("column '{column}' has {actual} values, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// A value pattern that is not a valid regular expression
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern { pattern: String, source: regex::Error },

    /// A row rule that is not of the form `COLUMN OP OPERAND`
    #[error("invalid row rule '{0}': expected COLUMN OP VALUE with OP one of == != < <= > >=")]
    InvalidRule(String),

    #[error("failed to read {}: {message}", .path.display())]
    UnreadableFile { path: PathBuf, message: String },

    #[error("unsupported file format: {}", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to write {}: {message}", .path.display())]
    UnwritableOutput { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("report template error: {0}")]
    Template(#[from] tera::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias for keydiff results.
pub type Result<T> = std::result::Result<T, Error>;
