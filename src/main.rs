//! keydiff - Key-based diff and data-quality audit for tabular data

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indexmap::IndexMap;
use tracing::info;

use keydiff::config::{Config, OutputFormat, DEFAULT_ROW_LIMIT};
use keydiff::diff::Delta;
use keydiff::output::{
    render_audit, render_expectations, render_table, render_to_stdout, AuditFormat, HtmlReport,
};
use keydiff::parser::{write_csv, ParserFactory};
use keydiff::quality::{
    audit_table, count_duplicates, duplicate_rows, expect_table, trim_whitespace, AuditConfig, ColumnExpectation,
    ExpectedType, Expectations, RowRule, ValuePattern,
};
use keydiff::{logging, Table};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Terminal,
    Json,
    Html,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Terminal => OutputFormat::Terminal,
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::Html => OutputFormat::Html,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliAuditFormat {
    Terminal,
    Json,
}

impl From<CliAuditFormat> for AuditFormat {
    fn from(f: CliAuditFormat) -> Self {
        match f {
            CliAuditFormat::Terminal => AuditFormat::Text,
            CliAuditFormat::Json => AuditFormat::Json,
        }
    }
}

/// Key-based diff and data-quality audit for tabular data (CSV, Excel)
#[derive(Parser, Debug)]
#[command(name = "keydiff")]
#[command(author, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); KEYDIFF_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare two files on key columns
    Diff {
        /// First file (side A)
        file_a: PathBuf,

        /// Second file (side B)
        file_b: PathBuf,

        /// Column(s) to use as primary key for row matching (comma-separated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        key: Vec<String>,

        /// Write an HTML report to this path instead of printing
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Absolute tolerance for numeric comparisons
        #[arg(long, default_value_t = 0.0)]
        abs_tol: f64,

        /// Relative tolerance for numeric comparisons (fraction of the larger magnitude)
        #[arg(long, default_value_t = 0.0)]
        rel_tol: f64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal", conflicts_with = "out")]
        format: CliOutputFormat,

        /// For Excel files: which sheet to compare
        #[arg(long)]
        sheet: Option<String>,

        /// Compare string values without trimming surrounding whitespace
        #[arg(long)]
        no_trim: bool,

        /// Maximum rows shown per report section
        #[arg(long, default_value_t = DEFAULT_ROW_LIMIT)]
        limit: usize,

        /// Exit with status 1 when differences are found
        #[arg(long)]
        exit_code: bool,
    },

    /// Check a file for nulls, type mismatches and malformed dates
    Audit {
        file: PathBuf,

        /// Column(s) that must not contain nulls (comma-separated)
        #[arg(long, value_delimiter = ',')]
        not_null: Vec<String>,

        /// Expected column type as COLUMN=TYPE (integer, float, string, boolean, datetime)
        #[arg(long, value_parser = parse_assignment)]
        expect: Vec<(String, String)>,

        /// Accepted date format as COLUMN=FORMAT (strftime, repeatable)
        #[arg(long, value_parser = parse_assignment)]
        date_format: Vec<(String, String)>,

        /// Column(s) identifying rows in the report (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        key: Vec<String>,

        /// Skip flagging values that differ from a column's predominant type
        #[arg(long)]
        no_infer: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: CliAuditFormat,

        /// For Excel files: which sheet to audit
        #[arg(long)]
        sheet: Option<String>,
    },

    /// Check a file against column expectations and row rules
    Expect {
        file: PathBuf,

        /// Column(s) whose non-null values must be unique (comma-separated)
        #[arg(long, value_delimiter = ',')]
        unique: Vec<String>,

        /// Column(s) that must not contain nulls (comma-separated)
        #[arg(long, value_delimiter = ',')]
        not_null: Vec<String>,

        /// Expected column type as COLUMN=TYPE (integer, float, string, boolean, datetime)
        #[arg(long = "type", value_parser = parse_assignment)]
        dtype: Vec<(String, String)>,

        /// Datetime layout as COLUMN=FORMAT (strftime); implies a datetime column
        #[arg(long, value_parser = parse_assignment)]
        date_format: Vec<(String, String)>,

        /// Allowed values as COLUMN=V1|V2|...
        #[arg(long, value_parser = parse_assignment)]
        allowed: Vec<(String, String)>,

        /// Regular expression every value must match in full, as COLUMN=PATTERN
        #[arg(long, value_parser = parse_assignment)]
        pattern: Vec<(String, String)>,

        /// Row rule such as "amount >= 0" or "end >= start" (repeatable)
        #[arg(long)]
        rule: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: CliAuditFormat,

        /// For Excel files: which sheet to check
        #[arg(long)]
        sheet: Option<String>,

        /// Exit with status 1 when an expectation fails
        #[arg(long)]
        exit_code: bool,
    },

    /// List values or rows that occur more than once
    Duplicates {
        file: PathBuf,

        /// Column(s) to check (comma-separated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        column: Vec<String>,

        /// Print each duplicated value with its number of occurrences
        #[arg(long)]
        counts: bool,

        /// For Excel files: which sheet to read
        #[arg(long)]
        sheet: Option<String>,
    },

    /// Strip surrounding whitespace from string cells and write CSV
    Trim {
        file: PathBuf,

        /// Output CSV path
        #[arg(short, long)]
        out: PathBuf,

        /// Column(s) to trim (comma-separated, default all)
        #[arg(short, long, value_delimiter = ',')]
        column: Vec<String>,

        /// For Excel files: which sheet to read
        #[arg(long)]
        sheet: Option<String>,
    },

    /// Print version information
    Version,
}

fn parse_assignment(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((column, value)) if !column.is_empty() && !value.is_empty() => {
            Ok((column.to_string(), value.to_string()))
        }
        _ => Err(format!("expected COLUMN=VALUE, got '{}'", s)),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli.command) {
        Ok(true) => ExitCode::from(1), // Differences found with --exit-code
        Ok(false) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Returns whether the process should report differences through its exit status
fn run(command: Command) -> Result<bool> {
    match command {
        Command::Diff {
            file_a,
            file_b,
            key,
            out,
            abs_tol,
            rel_tol,
            format,
            sheet,
            no_trim,
            limit,
            exit_code,
        } => {
            let mut config = Config::new(key)
                .with_tolerance(abs_tol, rel_tol)
                .with_trim_whitespace(!no_trim)
                .with_output_format(format.into())
                .with_row_limit(limit)
                .with_fail_on_diff(exit_code);
            if let Some(sheet) = sheet {
                config = config.with_sheet_name(sheet);
            }
            run_diff(&file_a, &file_b, out.as_deref(), &config)
        }
        Command::Audit {
            file,
            not_null,
            expect,
            date_format,
            key,
            no_infer,
            format,
            sheet,
        } => {
            let table = read_table(&file, sheet)?;
            let mut audit = AuditConfig::new().with_key_columns(key).with_infer_types(!no_infer);
            for column in not_null {
                audit = audit.forbid_nulls(column);
            }
            for (column, ty) in expect {
                let expected: ExpectedType = ty
                    .parse()
                    .map_err(|e: String| anyhow!(e))
                    .with_context(|| format!("invalid --expect for column '{}'", column))?;
                audit = audit.expect_type(column, expected);
            }
            for (column, fmt) in date_format {
                audit = audit.date_formats(column, [fmt]);
            }

            let issues = audit_table(&table, &audit)?;
            let mut stdout = std::io::stdout().lock();
            render_audit(&issues, format.into(), &mut stdout)?;
            Ok(false)
        }
        Command::Expect {
            file,
            unique,
            not_null,
            dtype,
            date_format,
            allowed,
            pattern,
            rule,
            format,
            sheet,
            exit_code,
        } => {
            let table = read_table(&file, sheet)?;

            let mut columns: IndexMap<String, ColumnExpectation> = IndexMap::new();
            for column in unique {
                expectation(&mut columns, &column).unique = true;
            }
            for column in not_null {
                expectation(&mut columns, &column).allow_nulls = Some(false);
            }
            for (column, ty) in dtype {
                let expected: ExpectedType = ty
                    .parse()
                    .map_err(|e: String| anyhow!(e))
                    .with_context(|| format!("invalid --type for column '{}'", column))?;
                expectation(&mut columns, &column).dtype = Some(expected);
            }
            for (column, fmt) in date_format {
                let entry = expectation(&mut columns, &column);
                entry.dtype.get_or_insert(ExpectedType::Datetime);
                entry.format = Some(fmt);
            }
            for (column, values) in allowed {
                expectation(&mut columns, &column).allowed_values =
                    Some(values.split('|').map(|v| v.trim().to_string()).collect());
            }
            for (column, regex) in pattern {
                expectation(&mut columns, &column).pattern = Some(ValuePattern::new(&regex)?);
            }

            let mut expectations = Expectations::new();
            for (_, column) in columns {
                expectations = expectations.column(column);
            }
            for text in rule {
                expectations = expectations.row_rule(text.parse::<RowRule>()?);
            }
            if expectations.is_empty() {
                bail!("no expectations given; use --unique, --not-null, --type, --allowed, --pattern or --rule");
            }

            let report = expect_table(&table, &expectations);
            let mut stdout = std::io::stdout().lock();
            render_expectations(&report, format.into(), &mut stdout)?;
            Ok(exit_code && !report.passed)
        }
        Command::Duplicates {
            file,
            column,
            counts,
            sheet,
        } => {
            let table = read_table(&file, sheet)?;
            let mut stdout = std::io::stdout().lock();
            if counts {
                let [column] = column.as_slice() else {
                    bail!("--counts takes exactly one column");
                };
                let counts = count_duplicates(&table, column)?;
                let mut result = Table::with_column_names([column.as_str(), "count"]);
                for (line, (value, n)) in counts.into_iter().enumerate() {
                    result.add_row(vec![value, (n as i64).into()], line + 1);
                }
                writeln!(stdout, "{}", render_table(&result))?;
            } else {
                let rows = duplicate_rows(&table, Some(column.as_slice()))?;
                if rows.is_empty() {
                    writeln!(stdout, "No duplicates found.")?;
                } else {
                    writeln!(stdout, "{}", render_table(&rows))?;
                    writeln!(stdout, "{} duplicate row(s)", rows.row_count())?;
                }
            }
            Ok(false)
        }
        Command::Trim {
            file,
            out,
            column,
            sheet,
        } => {
            let table = read_table(&file, sheet)?;
            let columns = (!column.is_empty()).then_some(column.as_slice());
            let trimmed = trim_whitespace(&table, columns)?;
            write_csv(&trimmed, &out)?;
            info!(rows = trimmed.row_count(), out = %out.display(), "wrote trimmed table");
            Ok(false)
        }
        Command::Version => {
            println!("keydiff {}", env!("CARGO_PKG_VERSION"));
            Ok(false)
        }
    }
}

fn run_diff(file_a: &Path, file_b: &Path, out: Option<&Path>, config: &Config) -> Result<bool> {
    let options = config.delta_options()?;
    let factory = ParserFactory::new();

    let table_a = factory
        .parse(file_a, config)
        .with_context(|| format!("Failed to parse file A: {}", file_a.display()))?;
    let table_b = factory
        .parse(file_b, config)
        .with_context(|| format!("Failed to parse file B: {}", file_b.display()))?;

    let delta = Delta::with_options(&table_a, &table_b, &config.key_columns, options)?;
    let label_a = file_a.display().to_string();
    let label_b = file_b.display().to_string();

    match out {
        Some(path) => {
            HtmlReport::new()
                .with_row_limit(config.row_limit)
                .write(&delta, &label_a, &label_b, path)?;
            let stats = delta.stats();
            println!(
                "Report written to {} ({} only in A, {} only in B, {} changed keys)",
                path.display(),
                stats.only_in_a,
                stats.only_in_b,
                stats.mismatched_keys
            );
        }
        None => render_to_stdout(&delta, &label_a, &label_b, config.output_format, config.row_limit)?,
    }

    Ok(config.fail_on_diff && delta.has_differences())
}

fn expectation<'a>(columns: &'a mut IndexMap<String, ColumnExpectation>, name: &str) -> &'a mut ColumnExpectation {
    columns
        .entry(name.to_string())
        .or_insert_with(|| ColumnExpectation::new(name))
}

fn read_table(path: &Path, sheet: Option<String>) -> Result<Table> {
    let config = Config {
        sheet_name: sheet,
        ..Default::default()
    };
    ParserFactory::new()
        .parse(path, &config)
        .with_context(|| format!("Failed to parse file: {}", path.display()))
}
