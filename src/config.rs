//! Configuration handling for keydiff

use crate::diff::{DeltaOptions, Tolerance};
use crate::error::Result;

/// Output format for diff results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
    Html,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" | "text" => Ok(OutputFormat::Terminal),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Default number of rows shown per report section
pub const DEFAULT_ROW_LIMIT: usize = 50;

/// Configuration for diff operations
#[derive(Debug, Clone)]
pub struct Config {
    /// Columns to use as primary key for row matching
    pub key_columns: Vec<String>,
    /// Absolute tolerance for numeric comparisons
    pub abs_tol: f64,
    /// Relative tolerance for numeric comparisons
    pub rel_tol: f64,
    /// Strip leading/trailing whitespace from string cells before comparing
    pub trim_whitespace: bool,
    /// Output format
    pub output_format: OutputFormat,
    /// For Excel files: which sheet to read
    pub sheet_name: Option<String>,
    /// Maximum rows rendered per report section
    pub row_limit: usize,
    /// Report differences through the exit status
    pub fail_on_diff: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_columns: Vec::new(),
            abs_tol: 0.0,
            rel_tol: 0.0,
            trim_whitespace: true,
            output_format: OutputFormat::default(),
            sheet_name: None,
            row_limit: DEFAULT_ROW_LIMIT,
            fail_on_diff: false,
        }
    }
}

impl Config {
    /// Create a new Config keyed on the given columns
    pub fn new(key_columns: Vec<String>) -> Self {
        Self {
            key_columns,
            ..Default::default()
        }
    }

    /// Set absolute and relative numeric tolerance
    pub fn with_tolerance(mut self, abs_tol: f64, rel_tol: f64) -> Self {
        self.abs_tol = abs_tol;
        self.rel_tol = rel_tol;
        self
    }

    /// Enable or disable whitespace trimming
    pub fn with_trim_whitespace(mut self, trim: bool) -> Self {
        self.trim_whitespace = trim;
        self
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set Excel sheet name
    pub fn with_sheet_name(mut self, name: String) -> Self {
        self.sheet_name = Some(name);
        self
    }

    /// Set the per-section row limit of reports
    pub fn with_row_limit(mut self, limit: usize) -> Self {
        self.row_limit = limit;
        self
    }

    pub fn with_fail_on_diff(mut self, fail: bool) -> Self {
        self.fail_on_diff = fail;
        self
    }

    /// Validated options for building a `Delta`
    pub fn delta_options(&self) -> Result<DeltaOptions> {
        Ok(DeltaOptions {
            tolerance: Tolerance::new(self.abs_tol, self.rel_tol)?,
            trim_whitespace: self.trim_whitespace,
        })
    }
}
