#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the noise map server.
//!
//! These types are serialized to JSON for the REST API. They are kept
//! separate from the domain models so the API contract can evolve on its
//! own.

use noise_map_analytics_models::DashboardMetrics;
use noise_map_noise_models::{Location, NoisePreset, PredictionInput, ZoneType};
use serde::{Deserialize, Deserializer, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Creates an error body from anything displayable.
    #[must_use]
    pub fn new(error: impl std::fmt::Display) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

/// Overview metrics plus the count-weighted violation rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMetrics {
    /// Unweighted overview metrics.
    #[serde(flatten)]
    pub metrics: DashboardMetrics,
    /// `Exceedance_Percentage` weighted by `Total_Count`, when computable.
    pub weighted_violation_rate: Option<f64>,
}

/// Query parameters for `GET /api/tables/{name}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableQueryParams {
    /// Column to sort by.
    pub sort: Option<String>,
    /// `asc` or `desc`; ascending when absent.
    pub order: Option<String>,
}

/// Query parameters for `GET /api/predictions` and `/api/predictions/map`.
///
/// Missing values fall back to the dashboard's default controls.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PredictionQueryParams {
    /// Hour of day, 0-23.
    pub hour: Option<u8>,
    /// Day of week, 0 = Monday.
    pub day: Option<u8>,
    /// Named prior-noise preset.
    pub preset: Option<NoisePreset>,
    /// Explicit prior noise in dBA; wins over `preset`.
    pub prior: Option<f64>,
}

/// Converts a JSON number to `u8` when it is a whole value in range.
///
/// Clients send `17` and `17.0` interchangeably; both mean hour 17.
#[must_use]
pub fn whole_u8(value: f64) -> Option<u8> {
    if value.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&value) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(value as u8)
}

fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = f64::deserialize(deserializer)?;
    whole_u8(value).ok_or_else(|| {
        serde::de::Error::custom(format!("expected a whole number in 0-255, got {value}"))
    })
}

/// Body of `POST /predict_map`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PredictMapRequest {
    /// Hour of day.
    #[serde(deserialize_with = "whole_number")]
    pub hour: u8,
    /// Day of week, 0 = Monday.
    #[serde(deserialize_with = "whole_number")]
    pub day_of_week: u8,
    /// Noise level an hour earlier, in dBA.
    pub noise_lag_1hr: f64,
}

impl Default for PredictMapRequest {
    fn default() -> Self {
        let input = PredictionInput::default();
        Self {
            hour: input.hour,
            day_of_week: input.day_of_week,
            noise_lag_1hr: input.prior_noise,
        }
    }
}

impl From<PredictMapRequest> for PredictionInput {
    fn from(req: PredictMapRequest) -> Self {
        Self {
            hour: req.hour,
            day_of_week: req.day_of_week,
            prior_noise: req.noise_lag_1hr,
        }
    }
}

/// Response of `POST /predict`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SinglePrediction {
    /// Predicted level in dBA, rounded to 2 decimals.
    pub prediction: f64,
}

/// A static chart image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiChart {
    /// Stable identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Path relative to the server root.
    pub path: String,
}

/// The pre-rendered chart images, as `(id, title, file name)`.
pub const CHART_ASSETS: [(&str, &str, &str); 8] = [
    (
        "hourly_profile",
        "Average noise by hour of day",
        "hourly_noise_profile.png",
    ),
    (
        "location_rankings",
        "Average noise by location",
        "location_rankings.png",
    ),
    (
        "exceedance_rates",
        "Share of readings above the limit",
        "exceedance_rates.png",
    ),
    (
        "violation_severity",
        "Excess over the limit by location",
        "violation_severity.png",
    ),
    (
        "day_night",
        "Day versus night levels",
        "day_night_comparison.png",
    ),
    (
        "weekday_weekend",
        "Weekday versus weekend levels",
        "weekday_weekend.png",
    ),
    (
        "zone_distribution",
        "Noise distribution by zone type",
        "zone_distribution.png",
    ),
    (
        "heatmap",
        "Hour by day noise heatmap",
        "noise_heatmap.png",
    ),
];

/// Lists the chart assets under the `/charts` mount.
#[must_use]
pub fn charts() -> Vec<ApiChart> {
    CHART_ASSETS
        .iter()
        .map(|(id, title, file)| ApiChart {
            id: (*id).to_string(),
            title: (*title).to_string(),
            path: format!("charts/{file}"),
        })
        .collect()
}

/// A monitoring station with its zone limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLocation {
    /// Station identifier.
    pub id: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Land-use zone.
    pub zone_type: ZoneType,
    /// Typical level in dBA.
    pub base_noise: f64,
    /// Daytime limit in dBA.
    pub day_limit: f64,
    /// Night-time limit in dBA.
    pub night_limit: f64,
}

impl From<&Location> for ApiLocation {
    fn from(loc: &Location) -> Self {
        let limits = loc.zone.limits();
        Self {
            id: loc.id.to_string(),
            latitude: loc.latitude,
            longitude: loc.longitude,
            zone_type: loc.zone,
            base_noise: loc.base_noise,
            day_limit: limits.day,
            night_limit: limits.night,
        }
    }
}

/// Generated text returned by the `/api/ai/*` endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiInsight {
    /// `summary`, `policy` or `location`.
    pub kind: String,
    /// Generated text.
    pub text: String,
}
