#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the noise map dashboard.
//!
//! Serves the REST API (metrics, tables, chart listing, synthetic
//! predictions and AI insights), the CSV tables and chart images as static
//! files, and the frontend bundle. Nothing is cached: every request reads
//! the tables again, and every prediction request draws a fresh batch.

pub mod dashboard;
mod handlers;
pub mod interactive;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::http::Method;
use actix_web::{App, HttpServer, middleware, web};
use noise_map_ai::{TextGenerator, create_provider_from_env};
use noise_map_records::source::{DEFAULT_DATA_DIR, TableSource};

/// Default bind address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Default port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default directory holding the chart images.
pub const DEFAULT_CHARTS_DIR: &str = "charts";

/// Default directory holding the built frontend.
pub const DEFAULT_STATIC_DIR: &str = "app/dist";

/// Shared application state.
pub struct AppState {
    /// Where the CSV tables are read from.
    pub source: TableSource,
    /// Text-generation backend; `None` when `GEMINI_API_KEY` is not set.
    pub generator: Option<Arc<dyn TextGenerator>>,
}

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind_addr: String,
    /// Port to bind.
    pub port: u16,
    /// Directory with the CSV tables, also served under `/data`.
    pub data_dir: PathBuf,
    /// Directory with the chart images, served under `/charts`.
    pub charts_dir: PathBuf,
    /// Directory with the frontend bundle, served under `/`.
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            charts_dir: PathBuf::from(DEFAULT_CHARTS_DIR),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT`, `NOISE_DATA_DIR`, `NOISE_CHARTS_DIR` and
    /// `NOISE_STATIC_DIR`, falling back to the defaults for anything unset
    /// or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let path_var = |name: &str, default: PathBuf| {
            std::env::var(name).map_or(default, PathBuf::from)
        };

        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            data_dir: path_var("NOISE_DATA_DIR", defaults.data_dir),
            charts_dir: path_var("NOISE_CHARTS_DIR", defaults.charts_dir),
            static_dir: path_var("NOISE_STATIC_DIR", defaults.static_dir),
        }
    }
}

/// Registers the API routes and the prediction endpoints.
///
/// Static file mounts are added separately by [`run_server`] so tests can
/// mount just the handlers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/metrics", web::get().to(handlers::metrics))
            .route("/tables/{name}", web::get().to(handlers::table))
            .route("/charts", web::get().to(handlers::charts))
            .route("/locations", web::get().to(handlers::locations))
            .route("/predictions", web::get().to(handlers::predictions))
            .route("/predictions/map", web::get().to(handlers::predictions_map))
            .route("/ai/summary", web::post().to(handlers::ai_summary))
            .route("/ai/policy", web::post().to(handlers::ai_policy))
            .route("/ai/location/{id}", web::post().to(handlers::ai_location)),
    )
    .route("/predict", web::post().to(handlers::predict_single))
    .service(
        web::resource("/predict_map")
            .route(web::post().to(handlers::predict_map))
            .route(web::method(Method::OPTIONS).to(handlers::predict_map_preflight)),
    );
}

/// Builds the text-generation backend, logging why AI endpoints will be
/// unavailable when it cannot be created.
fn generator_from_env() -> Option<Arc<dyn TextGenerator>> {
    match create_provider_from_env() {
        Ok(provider) => Some(Arc::from(provider)),
        Err(e) => {
            log::warn!("AI insights disabled: {e}");
            None
        }
    }
}

/// Starts the noise map API server.
///
/// This is a regular async function; the caller provides the runtime
/// (e.g. via `#[actix_web::main]`) and initializes logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    let state = web::Data::new(AppState {
        source: TableSource::directory(&config.data_dir),
        generator: generator_from_env(),
    });

    log::info!(
        "Serving tables from {}, charts from {}, frontend from {}",
        config.data_dir.display(),
        config.charts_dir.display(),
        config.static_dir.display()
    );
    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    let ServerConfig {
        bind_addr,
        port,
        data_dir,
        charts_dir,
        static_dir,
    } = config;

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
            .service(Files::new("/charts", &charts_dir))
            .service(Files::new("/data", &data_dir))
            // Serve frontend static files (production)
            .service(Files::new("/", &static_dir).index_file("index.html"))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
