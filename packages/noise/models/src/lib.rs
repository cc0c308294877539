#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Monitoring locations, zone noise limits, and prediction record types.
//!
//! This crate defines the fixed set of noise monitoring stations, the
//! land-use zones they belong to, and the legal day/night limits for each
//! zone. Every other crate in the workspace builds on these types.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// First hour (inclusive) of the night-time limit window.
pub const NIGHT_START_HOUR: u8 = 22;

/// Hour at which the night-time limit window ends (exclusive).
pub const NIGHT_END_HOUR: u8 = 6;

/// Returns `true` if the night limit applies at `hour`.
#[must_use]
pub const fn is_night_hour(hour: u8) -> bool {
    hour >= NIGHT_START_HOUR || hour < NIGHT_END_HOUR
}

/// Returns `true` if `day_of_week` (0 = Monday) falls on a weekend.
#[must_use]
pub const fn is_weekend(day_of_week: u8) -> bool {
    day_of_week >= 5
}

/// Day names indexed by `day_of_week` (0 = Monday).
pub const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Land-use zone category of a monitoring location.
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
pub enum ZoneType {
    /// Factories, warehouses, heavy transport depots
    Industrial,
    /// Markets, offices, bus terminals
    Commercial,
    /// Housing
    Residential,
    /// Hospitals, schools, courts (100 m radius)
    #[serde(rename = "Silence Zone")]
    #[strum(serialize = "Silence Zone")]
    SilenceZone,
}

impl ZoneType {
    /// Returns the day and night limits for this zone.
    #[must_use]
    pub const fn limits(self) -> ZoneLimits {
        match self {
            Self::Industrial => ZoneLimits {
                day: 75.0,
                night: 70.0,
            },
            Self::Commercial => ZoneLimits {
                day: 65.0,
                night: 55.0,
            },
            Self::Residential => ZoneLimits {
                day: 55.0,
                night: 45.0,
            },
            Self::SilenceZone => ZoneLimits {
                day: 50.0,
                night: 40.0,
            },
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Industrial,
            Self::Commercial,
            Self::Residential,
            Self::SilenceZone,
        ]
    }
}

/// Permissible ambient noise levels for a zone, in dBA.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneLimits {
    /// Limit from 06:00 to 22:00.
    pub day: f64,
    /// Limit from 22:00 to 06:00.
    pub night: f64,
}

impl ZoneLimits {
    /// Selects the day or night limit for the given hour.
    #[must_use]
    pub const fn for_hour(self, hour: u8) -> f64 {
        if is_night_hour(hour) {
            self.night
        } else {
            self.day
        }
    }
}

/// A fixed noise monitoring station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Station identifier, as used in the CSV tables.
    pub id: &'static str,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Zone the station sits in.
    pub zone: ZoneType,
    /// Typical ambient level at the station, in dBA.
    pub base_noise: f64,
}

/// Base level used for stations that are not in [`LOCATIONS`].
pub const DEFAULT_BASE_NOISE: f64 = 65.0;

/// Zone used for stations that are not in [`LOCATIONS`].
pub const DEFAULT_ZONE: ZoneType = ZoneType::Residential;

/// The nine monitoring stations, in display order.
pub const LOCATIONS: [Location; 9] = [
    Location {
        id: "nsit",
        latitude: 28.61,
        longitude: 77.04,
        zone: ZoneType::SilenceZone,
        base_noise: 65.0,
    },
    Location {
        id: "ito",
        latitude: 28.631,
        longitude: 77.248,
        zone: ZoneType::Commercial,
        base_noise: 76.0,
    },
    Location {
        id: "punjabi",
        latitude: 28.66,
        longitude: 77.12,
        zone: ZoneType::Residential,
        base_noise: 72.0,
    },
    Location {
        id: "isbt",
        latitude: 28.667,
        longitude: 77.231,
        zone: ZoneType::Commercial,
        base_noise: 75.0,
    },
    Location {
        id: "mandir_marg",
        latitude: 28.628,
        longitude: 77.203,
        zone: ZoneType::Commercial,
        base_noise: 68.0,
    },
    Location {
        id: "civil_lines",
        latitude: 28.678,
        longitude: 77.222,
        zone: ZoneType::Residential,
        base_noise: 70.0,
    },
    Location {
        id: "CPCBHQ",
        latitude: 28.59,
        longitude: 77.25,
        zone: ZoneType::Commercial,
        base_noise: 66.0,
    },
    Location {
        id: "Dilshad",
        latitude: 28.68,
        longitude: 77.31,
        zone: ZoneType::Residential,
        base_noise: 64.0,
    },
    Location {
        id: "centralschool",
        latitude: 28.53,
        longitude: 77.25,
        zone: ZoneType::SilenceZone,
        base_noise: 62.0,
    },
];

/// Looks up a station by its identifier (exact match).
#[must_use]
pub fn find_location(id: &str) -> Option<&'static Location> {
    LOCATIONS.iter().find(|loc| loc.id == id)
}

/// "Previous hour" noise presets offered by the prediction controls.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NoisePreset {
    /// 55 dBA
    Quiet,
    /// 65 dBA
    #[default]
    Normal,
    /// 75 dBA
    Loud,
}

impl NoisePreset {
    /// Returns the preset's level in dBA.
    #[must_use]
    pub const fn level(self) -> f64 {
        match self {
            Self::Quiet => 55.0,
            Self::Normal => 65.0,
            Self::Loud => 75.0,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Quiet, Self::Normal, Self::Loud]
    }
}

/// Parameters for one prediction run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionInput {
    /// Hour of day, 0-23.
    pub hour: u8,
    /// Day of week, 0 (Monday) to 6 (Sunday).
    pub day_of_week: u8,
    /// Noise level during the previous hour, in dBA.
    pub prior_noise: f64,
}

impl PredictionInput {
    /// Creates an input from a [`NoisePreset`].
    #[must_use]
    pub const fn with_preset(hour: u8, day_of_week: u8, preset: NoisePreset) -> Self {
        Self {
            hour,
            day_of_week,
            prior_noise: preset.level(),
        }
    }
}

impl Default for PredictionInput {
    /// 15:00 on a Tuesday with a 68.5 dBA previous hour.
    fn default() -> Self {
        Self {
            hour: 15,
            day_of_week: 1,
            prior_noise: 68.5,
        }
    }
}

/// Predicted noise at one station.
///
/// Field names match the JSON consumed by the map frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutput {
    /// Station identifier.
    pub location: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Predicted level in dBA, rounded to two decimals.
    pub predicted_noise: f64,
    /// Zone of the station.
    pub zone_type: ZoneType,
    /// Limit in force at the requested hour.
    pub noise_limit: f64,
    /// `true` if `predicted_noise` is strictly above `noise_limit`.
    pub is_violation: bool,
    /// Display-only confidence score in `[0.75, 0.95)`.
    pub confidence: f64,
}

/// Severity bucket in the violation severity table.
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
pub enum SeverityCategory {
    /// Worst bucket
    Extreme,
    Severe,
    High,
    Moderate,
    /// Mildest bucket
    Low,
}

impl SeverityCategory {
    /// Returns all variants of this enum, most severe first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Extreme,
            Self::Severe,
            Self::High,
            Self::Moderate,
            Self::Low,
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn every_location_has_a_unique_id() {
        for (i, a) in LOCATIONS.iter().enumerate() {
            for b in &LOCATIONS[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn night_window_boundaries() {
        assert!(is_night_hour(0));
        assert!(is_night_hour(5));
        assert!(!is_night_hour(6));
        assert!(!is_night_hour(21));
        assert!(is_night_hour(22));
        assert!(is_night_hour(23));
    }

    #[test]
    fn limits_follow_hour() {
        let limits = ZoneType::Commercial.limits();
        assert!((limits.for_hour(12) - 65.0).abs() < f64::EPSILON);
        assert!((limits.for_hour(23) - 55.0).abs() < f64::EPSILON);
    }

    #[test]
    fn night_limit_never_exceeds_day_limit() {
        for zone in ZoneType::all() {
            let limits = zone.limits();
            assert!(limits.night <= limits.day, "{zone:?}");
        }
    }

    #[test]
    fn zone_type_parses_csv_spelling() {
        assert_eq!(
            ZoneType::from_str("Silence Zone").unwrap(),
            ZoneType::SilenceZone
        );
        assert_eq!(ZoneType::SilenceZone.to_string(), "Silence Zone");
        assert!(ZoneType::from_str("Agricultural").is_err());
    }

    #[test]
    fn zone_type_serializes_csv_spelling() {
        let json = serde_json::to_string(&ZoneType::SilenceZone).unwrap();
        assert_eq!(json, "\"Silence Zone\"");
    }

    #[test]
    fn presets_map_to_levels() {
        assert!((NoisePreset::Quiet.level() - 55.0).abs() < f64::EPSILON);
        assert!((NoisePreset::Normal.level() - 65.0).abs() < f64::EPSILON);
        assert!((NoisePreset::Loud.level() - 75.0).abs() < f64::EPSILON);
        assert_eq!(NoisePreset::from_str("loud").unwrap(), NoisePreset::Loud);
    }

    #[test]
    fn finds_locations_case_sensitively() {
        assert_eq!(find_location("ito").unwrap().zone, ZoneType::Commercial);
        assert!(find_location("CPCBHQ").is_some());
        assert!(find_location("cpcbhq").is_none());
    }
}
