//! Typed views over the three dashboard tables.
//!
//! Every field is optional: the parser never rejects a row, so a missing or
//! non-numeric cell shows up here as `None` and is rendered as a
//! placeholder downstream.

use std::str::FromStr as _;

use noise_map_noise_models::{SeverityCategory, ZoneType};
use serde::{Deserialize, Serialize};

use crate::Record;

/// Column names used in the CSV headers.
pub mod columns {
    pub const LOCATION: &str = "Location";
    pub const AVERAGE_LAEQ_DBA: &str = "Average_LAeq_dBA";
    pub const ZONE_TYPE: &str = "Zone_Type";
    pub const DAY_LIMIT_DBA: &str = "Day_Limit_dBA";
    pub const NIGHT_LIMIT_DBA: &str = "Night_Limit_dBA";
    pub const EXCEEDANCE_COUNT: &str = "Exceedance_Count";
    pub const TOTAL_COUNT: &str = "Total_Count";
    pub const EXCEEDANCE_PERCENTAGE: &str = "Exceedance_Percentage";
    pub const AVG_EXCESS_DBA: &str = "Avg_Excess_dBA";
    pub const MAX_EXCESS_DBA: &str = "Max_Excess_dBA";
    pub const SEVERITY_CATEGORY: &str = "Severity_Category";
}

use columns::{
    AVERAGE_LAEQ_DBA, AVG_EXCESS_DBA, DAY_LIMIT_DBA, EXCEEDANCE_COUNT, EXCEEDANCE_PERCENTAGE,
    LOCATION, MAX_EXCESS_DBA, NIGHT_LIMIT_DBA, SEVERITY_CATEGORY, TOTAL_COUNT, ZONE_TYPE,
};

fn zone_of(record: &Record) -> Option<ZoneType> {
    record
        .get(ZONE_TYPE)
        .and_then(|v| v.as_str())
        .and_then(|s| ZoneType::from_str(s).ok())
}

/// A row of `location_rankings.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingRow {
    pub location: Option<String>,
    /// Energy-averaged level (`LAeq`) over the whole dataset.
    pub average_laeq_dba: Option<f64>,
    pub zone_type: Option<ZoneType>,
    pub day_limit_dba: Option<f64>,
    pub night_limit_dba: Option<f64>,
}

impl From<&Record> for RankingRow {
    fn from(record: &Record) -> Self {
        Self {
            location: record.text(LOCATION),
            average_laeq_dba: record.number(AVERAGE_LAEQ_DBA),
            zone_type: zone_of(record),
            day_limit_dba: record.number(DAY_LIMIT_DBA),
            night_limit_dba: record.number(NIGHT_LIMIT_DBA),
        }
    }
}

/// A row of `exceedance_rates.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceedanceRow {
    pub location: Option<String>,
    pub zone_type: Option<ZoneType>,
    pub day_limit_dba: Option<f64>,
    pub night_limit_dba: Option<f64>,
    /// Readings above the applicable limit.
    pub exceedance_count: Option<f64>,
    /// All readings.
    pub total_count: Option<f64>,
    /// `exceedance_count / total_count * 100`, as pre-computed upstream.
    pub exceedance_percentage: Option<f64>,
}

impl From<&Record> for ExceedanceRow {
    fn from(record: &Record) -> Self {
        Self {
            location: record.text(LOCATION),
            zone_type: zone_of(record),
            day_limit_dba: record.number(DAY_LIMIT_DBA),
            night_limit_dba: record.number(NIGHT_LIMIT_DBA),
            exceedance_count: record.number(EXCEEDANCE_COUNT),
            total_count: record.number(TOTAL_COUNT),
            exceedance_percentage: record.number(EXCEEDANCE_PERCENTAGE),
        }
    }
}

/// A row of `violation_severity.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityRow {
    pub location: Option<String>,
    pub zone_type: Option<ZoneType>,
    /// Mean amount by which violating readings exceed the limit.
    pub avg_excess_dba: Option<f64>,
    /// Largest single excess.
    pub max_excess_dba: Option<f64>,
    /// `None` when the cell is missing or not one of the five buckets.
    pub severity_category: Option<SeverityCategory>,
}

impl From<&Record> for SeverityRow {
    fn from(record: &Record) -> Self {
        Self {
            location: record.text(LOCATION),
            zone_type: zone_of(record),
            avg_excess_dba: record.number(AVG_EXCESS_DBA),
            max_excess_dba: record.number(MAX_EXCESS_DBA),
            severity_category: record
                .get(SEVERITY_CATEGORY)
                .and_then(|v| v.as_str())
                .and_then(|s| SeverityCategory::from_str(s).ok()),
        }
    }
}

/// Finds the first record whose `Location` column equals `location`.
#[must_use]
pub fn find_by_location<'a>(records: &'a [Record], location: &str) -> Option<&'a Record> {
    records
        .iter()
        .find(|r| r.text(LOCATION).as_deref() == Some(location))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn ranking_row_reads_all_columns() {
        let table = parse(
            "Location,Average_LAeq_dBA,Zone_Type,Day_Limit_dBA,Night_Limit_dBA\n\
             ito,76.2,Commercial,65,55",
        );
        let row = RankingRow::from(&table.records[0]);
        assert_eq!(row.location.as_deref(), Some("ito"));
        assert_eq!(row.average_laeq_dba, Some(76.2));
        assert_eq!(row.zone_type, Some(ZoneType::Commercial));
        assert_eq!(row.day_limit_dba, Some(65.0));
        assert_eq!(row.night_limit_dba, Some(55.0));
    }

    #[test]
    fn missing_and_malformed_cells_become_none() {
        let table = parse(
            "Location,Zone_Type,Avg_Excess_dBA,Max_Excess_dBA,Severity_Category\n\
             nsit,Silence Zone,abc",
        );
        let row = SeverityRow::from(&table.records[0]);
        assert_eq!(row.zone_type, Some(ZoneType::SilenceZone));
        assert_eq!(row.avg_excess_dba, None);
        assert_eq!(row.max_excess_dba, None);
        assert_eq!(row.severity_category, None);
    }

    #[test]
    fn severity_category_outside_set_is_none() {
        let table = parse(
            "Location,Zone_Type,Avg_Excess_dBA,Max_Excess_dBA,Severity_Category\n\
             ito,Commercial,3.5,12.1,Apocalyptic\n\
             isbt,Commercial,2.0,9.0,Severe",
        );
        let rows: Vec<SeverityRow> = table.records.iter().map(SeverityRow::from).collect();
        assert_eq!(rows[0].severity_category, None);
        assert_eq!(rows[1].severity_category, Some(SeverityCategory::Severe));
    }

    #[test]
    fn finds_record_by_location() {
        let table = parse("Location,Exceedance_Percentage\nito,80\nisbt,70");
        let record = find_by_location(&table.records, "isbt").unwrap();
        assert_eq!(record.number(EXCEEDANCE_PERCENTAGE), Some(70.0));
        assert!(find_by_location(&table.records, "nsit").is_none());
    }
}
