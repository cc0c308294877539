//! HTTP handler functions for the noise map API.

use std::str::FromStr as _;

use actix_web::error::JsonPayloadError;
use actix_web::{HttpResponse, web};
use noise_map_ai::{AiError, InsightRequest, generate_insight};
use noise_map_analytics::{aggregate, location_stats, weighted_violation_rate};
use noise_map_noise_models::{LOCATIONS, PredictionInput};
use noise_map_predict::overlay::to_feature_collection;
use noise_map_records::sort::sort_records;
use noise_map_records::{DataFile, RecordsError};
use noise_map_server_models::{
    ApiError, ApiHealth, ApiInsight, ApiLocation, ApiMetrics, PredictMapRequest,
    PredictionQueryParams, SinglePrediction, TableQueryParams, charts as chart_assets, whole_u8,
};
use serde_json::{Map, Value};

use crate::AppState;
use crate::dashboard::{DashboardState, TableSort};

/// Location used by `POST /predict` when the body names none.
const DEFAULT_SINGLE_LOCATION: &str = "nsit";

/// Prefix of the one-hot location keys accepted by `POST /predict`.
const ONE_HOT_PREFIX: &str = "loc_";

fn records_error(context: &str, e: &RecordsError) -> HttpResponse {
    log::error!("{context}: {e}");
    match e {
        RecordsError::NotFound { .. } => HttpResponse::NotFound().json(ApiError::new(e)),
        _ => HttpResponse::InternalServerError().json(ApiError::new(e)),
    }
}

fn ai_error(e: &AiError) -> HttpResponse {
    log::error!("Text generation failed: {e}");
    match e {
        AiError::Config { .. } => HttpResponse::ServiceUnavailable().json(ApiError::new(e)),
        _ => HttpResponse::BadGateway().json(ApiError::new(e)),
    }
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn load_metrics(state: &AppState) -> Result<ApiMetrics, RecordsError> {
    let (rankings, exceedance) = tokio::join!(
        state.source.load(DataFile::Rankings),
        state.source.load(DataFile::Exceedance)
    );
    let (rankings, exceedance) = (rankings?, exceedance?);

    Ok(ApiMetrics {
        metrics: aggregate(&rankings.records, &exceedance.records),
        weighted_violation_rate: weighted_violation_rate(&exceedance.records),
    })
}

/// `GET /api/metrics`
///
/// Overview metrics computed from the rankings and exceedance tables.
pub async fn metrics(state: web::Data<AppState>) -> HttpResponse {
    match load_metrics(&state).await {
        Ok(metrics) => HttpResponse::Ok().json(metrics),
        Err(e) => records_error("Failed to load metrics", &e),
    }
}

/// `GET /api/tables/{name}`
///
/// Returns one parsed table, optionally sorted by `?sort=<column>&order=`.
pub async fn table(
    state: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<TableQueryParams>,
) -> HttpResponse {
    let name = path.into_inner();
    let Ok(file) = DataFile::from_str(&name) else {
        return HttpResponse::NotFound().json(ApiError::new(format!("Unknown table '{name}'")));
    };

    let sort = match TableSort::from_query(&params) {
        Ok(sort) => sort,
        Err(message) => return HttpResponse::BadRequest().json(ApiError::new(message)),
    };

    let mut table = match state.source.load(file).await {
        Ok(table) => table,
        Err(e) => return records_error(&format!("Failed to load {file} table"), &e),
    };

    if let Some(column) = &sort.column {
        if !table.headers.iter().any(|h| h == column) {
            return HttpResponse::BadRequest()
                .json(ApiError::new(format!("Unknown column '{column}'")));
        }
        sort_records(&mut table.records, column, sort.order);
    }

    HttpResponse::Ok().json(table)
}

/// `GET /api/charts`
pub async fn charts() -> HttpResponse {
    HttpResponse::Ok().json(chart_assets())
}

/// `GET /api/locations`
pub async fn locations() -> HttpResponse {
    let locations: Vec<ApiLocation> = LOCATIONS.iter().map(ApiLocation::from).collect();
    HttpResponse::Ok().json(locations)
}

fn query_input(params: &PredictionQueryParams) -> PredictionInput {
    DashboardState::default().controls.input_for(params)
}

/// `GET /api/predictions`
///
/// A fresh prediction batch; parameters default to the dashboard controls.
pub async fn predictions(params: web::Query<PredictionQueryParams>) -> HttpResponse {
    let input = query_input(&params);
    HttpResponse::Ok().json(noise_map_predict::predict(&input))
}

/// `GET /api/predictions/map`
///
/// Same as [`predictions`], rendered as a `GeoJSON` overlay.
pub async fn predictions_map(params: web::Query<PredictionQueryParams>) -> HttpResponse {
    let input = query_input(&params);
    let batch = noise_map_predict::predict(&input);
    HttpResponse::Ok().json(to_feature_collection(&batch))
}

/// `POST /predict_map`
///
/// Accepts `{ hour, day_of_week, noise_lag_1hr }`. A request without a JSON
/// body uses the defaults; a JSON body that does not parse is rejected.
pub async fn predict_map(
    body: Result<web::Json<PredictMapRequest>, actix_web::Error>,
) -> HttpResponse {
    let request = match body {
        Ok(body) => body.into_inner(),
        Err(e)
            if matches!(
                e.as_error::<JsonPayloadError>(),
                Some(JsonPayloadError::ContentType)
            ) =>
        {
            PredictMapRequest::default()
        }
        Err(e) => {
            log::warn!("Rejected prediction map request: {e}");
            return HttpResponse::BadRequest().json(ApiError::new(e));
        }
    };
    let input = PredictionInput::from(request);
    HttpResponse::Ok().json(noise_map_predict::predict(&input))
}

/// `OPTIONS /predict_map`
pub async fn predict_map_preflight() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Picks the station for a single prediction: the first `loc_<id>` key set
/// to 1 in body order, otherwise the `location` string.
fn single_location(body: &Map<String, Value>) -> String {
    body.iter()
        .find_map(|(key, value)| {
            let id = key.strip_prefix(ONE_HOT_PREFIX)?;
            let set = value.as_f64() == Some(1.0) || value.as_bool() == Some(true);
            set.then(|| id.to_string())
        })
        .or_else(|| {
            body.get("location")
                .and_then(Value::as_str)
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| DEFAULT_SINGLE_LOCATION.to_string())
}

fn whole_field(body: &Map<String, Value>, key: &str) -> Option<u8> {
    body.get(key).and_then(Value::as_f64).and_then(whole_u8)
}

/// `POST /predict`
///
/// Predicts a single station. Unknown stations use the default base level.
pub async fn predict_single(body: Option<web::Json<Map<String, Value>>>) -> HttpResponse {
    let body = body.map(web::Json::into_inner).unwrap_or_default();
    let defaults = PredictionInput::default();

    let input = PredictionInput {
        hour: whole_field(&body, "hour").unwrap_or(defaults.hour),
        day_of_week: whole_field(&body, "day_of_week").unwrap_or(defaults.day_of_week),
        prior_noise: body
            .get("noise_lag_1hr")
            .and_then(Value::as_f64)
            .unwrap_or(defaults.prior_noise),
    };
    let location = single_location(&body);

    let prediction = noise_map_predict::predict_by_id(&mut rand::rng(), &input, &location);
    log::debug!("Single prediction for {location}: {prediction}");
    HttpResponse::Ok().json(SinglePrediction { prediction })
}

async fn generate(state: &AppState, request: &InsightRequest<'_>) -> HttpResponse {
    let Some(generator) = &state.generator else {
        return HttpResponse::ServiceUnavailable().json(ApiError::new(
            "Text generation is not configured (set GEMINI_API_KEY)",
        ));
    };

    match generate_insight(generator.as_ref(), request).await {
        Ok(text) => HttpResponse::Ok().json(ApiInsight {
            kind: request.kind().to_string(),
            text,
        }),
        Err(e) => ai_error(&e),
    }
}

/// `POST /api/ai/summary`
pub async fn ai_summary(state: web::Data<AppState>) -> HttpResponse {
    match load_metrics(&state).await {
        Ok(api) => generate(&state, &InsightRequest::Summary(&api.metrics)).await,
        Err(e) => records_error("Failed to load metrics", &e),
    }
}

/// `POST /api/ai/policy`
pub async fn ai_policy(state: web::Data<AppState>) -> HttpResponse {
    match load_metrics(&state).await {
        Ok(api) => generate(&state, &InsightRequest::Policy(&api.metrics)).await,
        Err(e) => records_error("Failed to load metrics", &e),
    }
}

/// `POST /api/ai/location/{id}`
///
/// Joins the three tables for one station and generates an analysis.
pub async fn ai_location(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let location = path.into_inner();

    let (rankings, exceedance, severity) = tokio::join!(
        state.source.load(DataFile::Rankings),
        state.source.load(DataFile::Exceedance),
        state.source.load(DataFile::Severity)
    );
    let tables = rankings.and_then(|r| Ok((r, exceedance?, severity?)));
    let (rankings, exceedance, severity) = match tables {
        Ok(tables) => tables,
        Err(e) => return records_error("Failed to load tables", &e),
    };

    let Some(stats) = location_stats(
        &rankings.records,
        &exceedance.records,
        &severity.records,
        &location,
    ) else {
        return HttpResponse::NotFound()
            .json(ApiError::new(format!("No data for location '{location}'")));
    };

    generate(&state, &InsightRequest::Location(&stats)).await
}
