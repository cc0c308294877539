#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record parser and table loaders for the noise dashboard.
//!
//! The dashboard tables are plain comma-separated text with a header row.
//! [`parse()`] turns that text into a [`Table`] of loosely typed
//! [`Record`]s (numbers are detected, everything else stays a string),
//! [`rows`] layers typed accessors for the three known tables on top, and
//! [`source`] reads the files from a directory or over HTTP.
//!
//! The format has no quoting or escaping: a field can never contain a comma.

pub mod parser;
pub mod rows;
pub mod sort;
pub mod source;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

pub use parser::parse;

/// Errors that can occur while loading a table.
#[derive(Debug, Error)]
pub enum RecordsError {
    /// Reading a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fetching a remote file failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The requested table does not exist at the source.
    #[error("Table not found: {file}")]
    NotFound {
        /// File name that was looked up.
        file: String,
    },
}

/// A single parsed cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// The trimmed text parsed as a finite number.
    Number(f64),
    /// Anything else, including the empty string.
    Text(String),
}

impl CellValue {
    /// Trims `raw` and coerces it to a number when it is non-empty and
    /// parses as a finite `f64`.
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        let trimmed = raw.trim();
        if !trimmed.is_empty()
            && let Ok(value) = trimmed.parse::<f64>()
            && value.is_finite()
        {
            return Self::Number(value);
        }
        Self::Text(trimmed.to_string())
    }

    /// Returns the numeric value, if this cell is a number.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    /// Returns the text value, if this cell is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One data row, keyed by header name.
///
/// A column is absent when its row was shorter than the header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub BTreeMap<String, CellValue>);

impl Record {
    /// Returns the cell for `column`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.0.get(column)
    }

    /// Returns the numeric value of `column`, if present and numeric.
    #[must_use]
    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(CellValue::as_f64)
    }

    /// Returns `column` rendered as text, whatever its type.
    ///
    /// Numbers are formatted with [`CellValue`]'s `Display` so that a
    /// numeric-looking location name (e.g. `"101"`) is still usable.
    #[must_use]
    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column).map(ToString::to_string)
    }

    /// Inserts a cell.
    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        self.0.insert(column.into(), value);
    }
}

/// A parsed table: the header plus every data row in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Column names, trimmed, in header order.
    pub headers: Vec<String>,
    /// Data rows in file order.
    pub records: Vec<Record>,
}

impl Table {
    /// Returns `true` if the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The three tables the dashboard reads.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DataFile {
    /// Stations ranked by average level, loudest first.
    Rankings,
    /// Per-station counts of readings above the limit.
    Exceedance,
    /// Per-station excess levels and severity bucket.
    Severity,
}

impl DataFile {
    /// Returns the file name of this table.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Rankings => "location_rankings.csv",
            Self::Exceedance => "exceedance_rates.csv",
            Self::Severity => "violation_severity.csv",
        }
    }

    /// Returns the columns this table must declare in its header.
    #[must_use]
    pub const fn required_columns(self) -> &'static [&'static str] {
        use rows::columns::{
            AVERAGE_LAEQ_DBA, AVG_EXCESS_DBA, DAY_LIMIT_DBA, EXCEEDANCE_COUNT,
            EXCEEDANCE_PERCENTAGE, LOCATION, MAX_EXCESS_DBA, NIGHT_LIMIT_DBA, SEVERITY_CATEGORY,
            TOTAL_COUNT, ZONE_TYPE,
        };

        match self {
            Self::Rankings => &[
                LOCATION,
                AVERAGE_LAEQ_DBA,
                ZONE_TYPE,
                DAY_LIMIT_DBA,
                NIGHT_LIMIT_DBA,
            ],
            Self::Exceedance => &[
                LOCATION,
                ZONE_TYPE,
                DAY_LIMIT_DBA,
                NIGHT_LIMIT_DBA,
                EXCEEDANCE_COUNT,
                TOTAL_COUNT,
                EXCEEDANCE_PERCENTAGE,
            ],
            Self::Severity => &[
                LOCATION,
                ZONE_TYPE,
                AVG_EXCESS_DBA,
                MAX_EXCESS_DBA,
                SEVERITY_CATEGORY,
            ],
        }
    }

    /// Returns the subset of [`Self::required_columns`] that must hold
    /// numbers.
    #[must_use]
    pub const fn numeric_columns(self) -> &'static [&'static str] {
        use rows::columns::{
            AVERAGE_LAEQ_DBA, AVG_EXCESS_DBA, DAY_LIMIT_DBA, EXCEEDANCE_COUNT,
            EXCEEDANCE_PERCENTAGE, MAX_EXCESS_DBA, NIGHT_LIMIT_DBA, TOTAL_COUNT,
        };

        match self {
            Self::Rankings => &[AVERAGE_LAEQ_DBA, DAY_LIMIT_DBA, NIGHT_LIMIT_DBA],
            Self::Exceedance => &[
                DAY_LIMIT_DBA,
                NIGHT_LIMIT_DBA,
                EXCEEDANCE_COUNT,
                TOTAL_COUNT,
                EXCEEDANCE_PERCENTAGE,
            ],
            Self::Severity => &[AVG_EXCESS_DBA, MAX_EXCESS_DBA],
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Rankings, Self::Exceedance, Self::Severity]
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn coerces_numbers_and_strings() {
        assert_eq!(CellValue::coerce(" 72.5 "), CellValue::Number(72.5));
        assert_eq!(CellValue::coerce("-3"), CellValue::Number(-3.0));
        assert_eq!(CellValue::coerce("ito"), CellValue::Text("ito".to_string()));
        assert_eq!(CellValue::coerce("   "), CellValue::Text(String::new()));
    }

    #[test]
    fn non_finite_numbers_stay_text() {
        assert_eq!(CellValue::coerce("inf"), CellValue::Text("inf".to_string()));
        assert_eq!(CellValue::coerce("NaN"), CellValue::Text("NaN".to_string()));
    }

    #[test]
    fn numeric_columns_are_required() {
        for file in DataFile::all() {
            for col in file.numeric_columns() {
                assert!(
                    file.required_columns().contains(col),
                    "{file:?} numeric column {col} not in required columns"
                );
            }
        }
    }

    #[test]
    fn data_file_parses_from_path_segment() {
        assert_eq!(DataFile::from_str("rankings").unwrap(), DataFile::Rankings);
        assert_eq!(DataFile::from_str("severity").unwrap(), DataFile::Severity);
        assert!(DataFile::from_str("charts").is_err());
    }

    #[test]
    fn cell_values_serialize_untagged() {
        let mut record = Record::default();
        record.insert("A", CellValue::Number(1.0));
        record.insert("B", CellValue::Text("x".to_string()));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({ "A": 1.0, "B": "x" }));
    }
}
