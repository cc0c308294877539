#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Synthetic noise predictions for the fixed monitoring stations.
//!
//! There is no model behind this: the estimate for a station is a weighted
//! blend of the previous hour's level and the station's base level shifted
//! by time-of-day and weekend offsets, plus a little uniform jitter.
//!
//! ```text
//! env       = base + time_factor(hour) + day_factor(day)
//! predicted = round2(0.6 * prior + 0.4 * env + U[-1.5, 1.5))
//! ```
//!
//! The confidence score attached to each prediction is drawn independently
//! and is for display only.
//!
//! [`overlay`] turns a batch into the `GeoJSON` the map draws, and
//! [`progress`] holds the staged progress sequence shown while a batch is
//! being produced.

pub mod overlay;
pub mod progress;

use noise_map_noise_models::{
    DEFAULT_BASE_NOISE, LOCATIONS, Location, PredictionInput, PredictionOutput, find_location,
    is_weekend,
};
use rand::Rng;

/// Weight of the previous hour's level in the blend.
pub const PRIOR_WEIGHT: f64 = 0.6;

/// Weight of the environmental level in the blend.
pub const ENVIRONMENT_WEIGHT: f64 = 0.4;

/// Half-width of the uniform jitter added to every prediction.
pub const JITTER: f64 = 1.5;

/// Offset for hours 08-10.
pub const MORNING_RUSH_FACTOR: f64 = 4.5;

/// Offset for hours 17-20.
pub const EVENING_RUSH_FACTOR: f64 = 6.0;

/// Offset for hours 00-05.
pub const LATE_NIGHT_FACTOR: f64 = -8.0;

/// Offset for Saturday and Sunday.
pub const WEEKEND_FACTOR: f64 = -3.5;

/// Time-of-day offset in dBA. Ranges are inclusive.
#[must_use]
pub const fn time_factor(hour: u8) -> f64 {
    match hour {
        8..=10 => MORNING_RUSH_FACTOR,
        17..=20 => EVENING_RUSH_FACTOR,
        0..=5 => LATE_NIGHT_FACTOR,
        _ => 0.0,
    }
}

/// Day-of-week offset in dBA.
#[must_use]
pub const fn day_factor(day_of_week: u8) -> f64 {
    if is_weekend(day_of_week) {
        WEEKEND_FACTOR
    } else {
        0.0
    }
}

/// Base level shifted by the time and day offsets.
#[must_use]
pub fn environmental_noise(base_noise: f64, hour: u8, day_of_week: u8) -> f64 {
    base_noise + time_factor(hour) + day_factor(day_of_week)
}

/// The jitter-free prediction for a station with `base_noise`.
#[must_use]
pub fn predicted_center(input: &PredictionInput, base_noise: f64) -> f64 {
    PRIOR_WEIGHT.mul_add(
        input.prior_noise,
        ENVIRONMENT_WEIGHT * environmental_noise(base_noise, input.hour, input.day_of_week),
    )
}

/// Rounds to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Predicts the level for a station with `base_noise`, jitter included.
pub fn predict_noise<R: Rng + ?Sized>(rng: &mut R, input: &PredictionInput, base_noise: f64) -> f64 {
    let jitter = rng.random_range(-JITTER..JITTER);
    round2(predicted_center(input, base_noise) + jitter)
}

/// Draws a confidence score in `[0.75, 0.95)` at 0.01 resolution.
pub fn sample_confidence<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    f64::from(rng.random_range(75_u8..95)) / 100.0
}

/// Predicts one station.
pub fn predict_location<R: Rng + ?Sized>(
    rng: &mut R,
    input: &PredictionInput,
    location: &Location,
) -> PredictionOutput {
    let predicted_noise = predict_noise(rng, input, location.base_noise);
    let noise_limit = location.zone.limits().for_hour(input.hour);

    PredictionOutput {
        location: location.id.to_string(),
        latitude: location.latitude,
        longitude: location.longitude,
        predicted_noise,
        zone_type: location.zone,
        noise_limit,
        is_violation: predicted_noise > noise_limit,
        confidence: sample_confidence(rng),
    }
}

/// Predicts every station using `rng` for jitter and confidence.
///
/// Inputs are not range-checked.
pub fn predict_with_rng<R: Rng + ?Sized>(
    input: &PredictionInput,
    rng: &mut R,
) -> Vec<PredictionOutput> {
    LOCATIONS
        .iter()
        .map(|location| predict_location(rng, input, location))
        .collect()
}

/// Predicts every station using the thread-local RNG.
#[must_use]
pub fn predict(input: &PredictionInput) -> Vec<PredictionOutput> {
    let batch = predict_with_rng(input, &mut rand::rng());
    log::debug!(
        "Predicted {} locations for hour={} day={} prior={}: {} violations",
        batch.len(),
        input.hour,
        input.day_of_week,
        input.prior_noise,
        batch.iter().filter(|p| p.is_violation).count()
    );
    batch
}

/// Predicts the level for a station by identifier.
///
/// Unknown identifiers use [`DEFAULT_BASE_NOISE`].
pub fn predict_by_id<R: Rng + ?Sized>(rng: &mut R, input: &PredictionInput, location_id: &str) -> f64 {
    let base_noise = find_location(location_id).map_or_else(
        || {
            log::debug!("Unknown location '{location_id}', using default base level");
            DEFAULT_BASE_NOISE
        },
        |loc| loc.base_noise,
    );
    predict_noise(rng, input, base_noise)
}
