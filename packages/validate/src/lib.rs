#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone checker for the dashboard's CSV tables.
//!
//! The dashboard itself tolerates malformed tables. This crate is the
//! strict counterpart: it reads the three files and reports every
//! structural problem (missing file or columns, ragged rows, non-numeric
//! values, unknown severity buckets) as an error and every suspicious
//! value (empty cells, out-of-range numbers) as a warning.

use std::str::FromStr as _;

use console::style;
use noise_map_noise_models::SeverityCategory;
use noise_map_records::rows::columns::{
    AVERAGE_LAEQ_DBA, AVG_EXCESS_DBA, DAY_LIMIT_DBA, EXCEEDANCE_COUNT, EXCEEDANCE_PERCENTAGE,
    MAX_EXCESS_DBA, NIGHT_LIMIT_DBA, SEVERITY_CATEGORY, TOTAL_COUNT,
};
use noise_map_records::source::TableSource;
use noise_map_records::{CellValue, DataFile, RecordsError};
use strum_macros::{AsRefStr, Display};
use thiserror::Error;

/// Columns holding sound levels in dBA.
const LEVEL_COLUMNS: &[&str] = &[
    AVERAGE_LAEQ_DBA,
    DAY_LIMIT_DBA,
    NIGHT_LIMIT_DBA,
    AVG_EXCESS_DBA,
    MAX_EXCESS_DBA,
];

/// Plausible range for a level, in dBA.
const LEVEL_RANGE: (f64, f64) = (0.0, 200.0);

/// Valid range for a percentage.
const PERCENT_RANGE: (f64, f64) = (0.0, 100.0);

/// Errors that stop validation altogether.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A table exists but could not be read.
    #[error(transparent)]
    Records(#[from] RecordsError),
}

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, AsRefStr)]
pub enum Level {
    /// Suspicious but usable.
    #[strum(serialize = "WARN")]
    Warning,
    /// The table does not match the expected format.
    #[strum(serialize = "ERROR")]
    Error,
}

/// One problem found in a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Severity.
    pub level: Level,
    /// Table the problem is in.
    pub file: DataFile,
    /// 1-based line number, when the problem is tied to a line.
    pub line: Option<u64>,
    /// Description.
    pub message: String,
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{line}: {}", self.file.file_name(), self.message),
            None => write!(f, "{}: {}", self.file.file_name(), self.message),
        }
    }
}

/// Findings for one table.
#[derive(Debug, Default)]
struct FileChecker {
    findings: Vec<Finding>,
}

impl FileChecker {
    fn push(&mut self, level: Level, file: DataFile, line: Option<u64>, message: String) {
        self.findings.push(Finding {
            level,
            file,
            line,
            message,
        });
    }

    fn check_range(
        &mut self,
        file: DataFile,
        line: u64,
        column: &str,
        value: f64,
        (min, max): (f64, f64),
    ) {
        if !(min..=max).contains(&value) {
            self.push(
                Level::Warning,
                file,
                Some(line),
                format!("{column} = {value} is outside [{min}, {max}]"),
            );
        }
    }
}

/// Checks the raw text of one table.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn validate_text(file: DataFile, text: &str) -> Vec<Finding> {
    let mut checker = FileChecker::default();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = reader
        .records()
        .filter_map(Result::ok)
        .filter(|row| !(row.len() == 1 && row.get(0).is_some_and(str::is_empty)));

    let Some(header) = rows.next() else {
        checker.push(Level::Error, file, None, "file is empty".to_string());
        return checker.findings;
    };
    let headers: Vec<String> = header.iter().map(str::to_string).collect();
    let column_index = |name: &str| headers.iter().position(|h| h == name);

    for column in file.required_columns() {
        if column_index(column).is_none() {
            checker.push(
                Level::Error,
                file,
                Some(1),
                format!("missing required column {column}"),
            );
        }
    }

    let mut data_rows = 0_usize;
    for row in rows {
        data_rows += 1;
        let line = row.position().map_or(0, csv::Position::line);

        if row.len() != headers.len() {
            checker.push(
                Level::Error,
                file,
                Some(line),
                format!("expected {} columns, found {}", headers.len(), row.len()),
            );
        }

        for (column, raw) in headers.iter().zip(row.iter()) {
            if raw.is_empty() {
                checker.push(
                    Level::Warning,
                    file,
                    Some(line),
                    format!("empty value in column {column}"),
                );
            }
        }

        let number = |column: &str| -> Option<f64> {
            let raw = row.get(column_index(column)?)?;
            CellValue::coerce(raw).as_f64()
        };

        for column in file.numeric_columns() {
            let Some(raw) = column_index(column).and_then(|i| row.get(i)) else {
                continue;
            };
            if !raw.is_empty() && CellValue::coerce(raw).as_f64().is_none() {
                checker.push(
                    Level::Error,
                    file,
                    Some(line),
                    format!("{column} is not a number: '{raw}'"),
                );
            }
        }

        for column in LEVEL_COLUMNS {
            if let Some(value) = number(column) {
                checker.check_range(file, line, column, value, LEVEL_RANGE);
            }
        }
        if let Some(value) = number(EXCEEDANCE_PERCENTAGE) {
            checker.check_range(file, line, EXCEEDANCE_PERCENTAGE, value, PERCENT_RANGE);
        }
        for column in [EXCEEDANCE_COUNT, TOTAL_COUNT] {
            if let Some(value) = number(column)
                && value < 0.0
            {
                checker.push(
                    Level::Warning,
                    file,
                    Some(line),
                    format!("{column} = {value} is negative"),
                );
            }
        }
        if let (Some(over), Some(total)) = (number(EXCEEDANCE_COUNT), number(TOTAL_COUNT))
            && over > total
        {
            checker.push(
                Level::Warning,
                file,
                Some(line),
                format!("{EXCEEDANCE_COUNT} ({over}) exceeds {TOTAL_COUNT} ({total})"),
            );
        }

        if file == DataFile::Severity
            && let Some(raw) = column_index(SEVERITY_CATEGORY).and_then(|i| row.get(i))
            && !raw.is_empty()
            && SeverityCategory::from_str(raw).is_err()
        {
            checker.push(
                Level::Error,
                file,
                Some(line),
                format!(
                    "invalid {SEVERITY_CATEGORY} '{raw}' (expected one of {})",
                    SeverityCategory::all()
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            );
        }
    }

    if data_rows == 0 {
        checker.push(Level::Warning, file, None, "no data rows".to_string());
    }

    log::debug!(
        "Checked {} ({data_rows} rows): {} findings",
        file.file_name(),
        checker.findings.len()
    );
    checker.findings
}

/// Result of checking all three tables.
#[derive(Debug, Default)]
pub struct Report {
    /// Every finding, grouped by table in [`DataFile::all`] order.
    pub findings: Vec<Finding>,
}

impl Report {
    /// Number of findings at `level`.
    #[must_use]
    pub fn count(&self, level: Level) -> usize {
        self.findings.iter().filter(|f| f.level == level).count()
    }

    /// Returns `true` if any finding is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.count(Level::Error) > 0
    }

    /// Prints the itemised report with a summary line.
    pub fn print(&self) {
        for file in DataFile::all() {
            let findings: Vec<&Finding> =
                self.findings.iter().filter(|f| f.file == *file).collect();
            if findings.is_empty() {
                println!("  {}  {}", style("[OK]").green().bold(), file.file_name());
                continue;
            }
            for finding in findings {
                let tag = match finding.level {
                    Level::Error => style(format!("[{}]", finding.level)).red().bold(),
                    Level::Warning => style(format!("[{}]", finding.level)).yellow(),
                };
                println!("  {tag}  {finding}");
            }
        }

        let errors = self.count(Level::Error);
        let warnings = self.count(Level::Warning);
        println!();
        if errors == 0 {
            println!(
                "{} ({warnings} warnings)",
                style("Validation passed").green().bold()
            );
        } else {
            println!(
                "{} ({errors} errors, {warnings} warnings)",
                style("Validation failed").red().bold()
            );
        }
    }
}

/// Checks all three tables at `source`.
///
/// A missing table is reported as a finding, not an error.
///
/// # Errors
///
/// Returns [`ValidationError`] if a table exists but cannot be read.
pub async fn validate_source(source: &TableSource) -> Result<Report, ValidationError> {
    log::info!("Validating tables at {}", source.describe());
    let mut report = Report::default();

    for file in DataFile::all() {
        match source.load_text(*file).await {
            Ok(text) => report.findings.extend(validate_text(*file, &text)),
            Err(RecordsError::NotFound { file: path }) => report.findings.push(Finding {
                level: Level::Error,
                file: *file,
                line: None,
                message: format!("file not found ({path})"),
            }),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(report)
}
