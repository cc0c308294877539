#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregated dashboard metrics and per-location statistics.
//!
//! These are the inputs to the overview cards and to the text-generation
//! prompts. They are derived from the parsed CSV tables and never
//! recomputed from raw measurements.

use noise_map_noise_models::{SeverityCategory, ZoneType};
use serde::{Deserialize, Serialize};

/// Label shown when no station could be ranked.
pub const PLACEHOLDER_STATION: &str = "N/A";

/// Headline numbers for the overview tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    /// Name of the first-ranked (loudest) station.
    pub loudest_station: String,
    /// That station's average level, in dBA.
    pub highest_avg_noise: f64,
    /// Unweighted mean of `Exceedance_Percentage` over all stations.
    pub avg_violation_rate: f64,
    /// Rows in the rankings table.
    #[serde(default)]
    pub station_count: usize,
}

impl DashboardMetrics {
    /// The `{ "N/A", 0, 0 }` result used when a source table is empty.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            loudest_station: PLACEHOLDER_STATION.to_string(),
            highest_avg_noise: 0.0,
            avg_violation_rate: 0.0,
            station_count: 0,
        }
    }

    /// Returns `true` if this is the empty-input placeholder.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.loudest_station == PLACEHOLDER_STATION
    }
}

impl Default for DashboardMetrics {
    fn default() -> Self {
        Self::placeholder()
    }
}

/// Everything the tables say about one station, joined by `Location`.
///
/// Any field can be missing when the station is absent from a table or a
/// cell failed to parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationStats {
    /// Station identifier.
    pub location: String,
    /// 1-based position in the rankings table.
    pub rank: Option<usize>,
    /// Rows in the rankings table.
    pub ranked_stations: usize,
    pub zone_type: Option<ZoneType>,
    pub average_laeq_dba: Option<f64>,
    pub day_limit_dba: Option<f64>,
    pub night_limit_dba: Option<f64>,
    pub exceedance_count: Option<f64>,
    pub total_count: Option<f64>,
    pub exceedance_percentage: Option<f64>,
    pub avg_excess_dba: Option<f64>,
    pub max_excess_dba: Option<f64>,
    pub severity_category: Option<SeverityCategory>,
}
