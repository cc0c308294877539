//! Map overlay for a prediction batch.
//!
//! Each prediction becomes a `GeoJSON` point feature whose properties carry
//! both the raw numbers and the marker styling the map applies verbatim:
//! red markers for stations over their limit, green otherwise, with the
//! radius growing with the predicted level.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value, feature::Id};
use noise_map_noise_models::PredictionOutput;
use serde_json::json;

/// Marker color for a station over its limit.
pub const VIOLATION_COLOR: &str = "#dc2626";

/// Marker color for a compliant station.
pub const COMPLIANT_COLOR: &str = "#16a34a";

/// Initial map center (latitude, longitude).
pub const MAP_CENTER: (f64, f64) = (28.6139, 77.209);

/// Initial map zoom level.
pub const MAP_ZOOM: u8 = 11;

const MIN_RADIUS: f64 = 8.0;
const MAX_RADIUS: f64 = 24.0;

/// Marker radius in pixels: 8 px at 50 dBA or below, +0.5 px per dBA above
/// that, capped at 24 px.
#[must_use]
pub fn marker_radius(predicted_noise: f64) -> f64 {
    0.5_f64
        .mul_add((predicted_noise - 50.0).max(0.0), MIN_RADIUS)
        .min(MAX_RADIUS)
}

/// Marker color for a prediction.
#[must_use]
pub const fn marker_color(prediction: &PredictionOutput) -> &'static str {
    if prediction.is_violation {
        VIOLATION_COLOR
    } else {
        COMPLIANT_COLOR
    }
}

/// Popup text shown when a marker is clicked.
#[must_use]
pub fn popup_text(prediction: &PredictionOutput) -> String {
    let status = if prediction.is_violation {
        "Violation"
    } else {
        "Within limit"
    };
    format!(
        "{}: {:.2} dBA (limit {:.0} dBA, {}) - {status}, confidence {:.0}%",
        prediction.location,
        prediction.predicted_noise,
        prediction.noise_limit,
        prediction.zone_type,
        prediction.confidence * 100.0
    )
}

/// Converts one prediction to a point feature.
#[must_use]
pub fn to_feature(prediction: &PredictionOutput) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("location".to_string(), json!(prediction.location));
    properties.insert(
        "predictedNoise".to_string(),
        json!(prediction.predicted_noise),
    );
    properties.insert("zoneType".to_string(), json!(prediction.zone_type));
    properties.insert("noiseLimit".to_string(), json!(prediction.noise_limit));
    properties.insert("isViolation".to_string(), json!(prediction.is_violation));
    properties.insert("confidence".to_string(), json!(prediction.confidence));
    properties.insert(
        "markerColor".to_string(),
        json!(marker_color(prediction)),
    );
    properties.insert(
        "markerRadius".to_string(),
        json!(marker_radius(prediction.predicted_noise)),
    );
    properties.insert("popup".to_string(), json!(popup_text(prediction)));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![
            prediction.longitude,
            prediction.latitude,
        ]))),
        id: Some(Id::String(prediction.location.clone())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Converts a batch to a feature collection, with the initial map view as
/// foreign members (`center` as `[lat, lon]`, `zoom`).
#[must_use]
pub fn to_feature_collection(batch: &[PredictionOutput]) -> FeatureCollection {
    let mut view = JsonObject::new();
    view.insert("center".to_string(), json!([MAP_CENTER.0, MAP_CENTER.1]));
    view.insert("zoom".to_string(), json!(MAP_ZOOM));

    FeatureCollection {
        bbox: None,
        features: batch.iter().map(to_feature).collect(),
        foreign_members: Some(view),
    }
}

#[cfg(test)]
mod tests {
    use noise_map_noise_models::ZoneType;

    use super::*;

    fn sample(noise: f64, limit: f64) -> PredictionOutput {
        PredictionOutput {
            location: "ito".to_string(),
            latitude: 28.631,
            longitude: 77.248,
            predicted_noise: noise,
            zone_type: ZoneType::Commercial,
            noise_limit: limit,
            is_violation: noise > limit,
            confidence: 0.87,
        }
    }

    #[test]
    fn radius_is_clamped() {
        assert!((marker_radius(40.0) - 8.0).abs() < 1e-9);
        assert!((marker_radius(60.0) - 13.0).abs() < 1e-9);
        assert!((marker_radius(120.0) - 24.0).abs() < 1e-9);
    }

    #[test]
    fn color_follows_violation() {
        assert_eq!(marker_color(&sample(71.8, 65.0)), VIOLATION_COLOR);
        assert_eq!(marker_color(&sample(65.0, 65.0)), COMPLIANT_COLOR);
    }

    #[test]
    fn feature_uses_lon_lat_order() {
        let feature = to_feature(&sample(71.8, 65.0));
        let geometry = feature.geometry.unwrap();
        match geometry.value {
            Value::Point(coords) => {
                assert!((coords[0] - 77.248).abs() < 1e-9);
                assert!((coords[1] - 28.631).abs() < 1e-9);
            }
            other => panic!("expected point, got {other:?}"),
        }
    }

    #[test]
    fn feature_properties_carry_styling() {
        let feature = to_feature(&sample(71.8, 65.0));
        let props = feature.properties.unwrap();
        assert_eq!(props["location"], "ito");
        assert_eq!(props["zoneType"], "Commercial");
        assert_eq!(props["isViolation"], true);
        assert_eq!(props["markerColor"], VIOLATION_COLOR);
        assert!(props["popup"].as_str().unwrap().contains("71.80 dBA"));
    }

    #[test]
    fn collection_has_one_feature_per_prediction() {
        let batch = vec![sample(71.8, 65.0), sample(50.0, 55.0)];
        let collection = to_feature_collection(&batch);
        assert_eq!(collection.features.len(), 2);
        let view = collection.foreign_members.unwrap();
        assert_eq!(view["zoom"], 11);
    }
}
