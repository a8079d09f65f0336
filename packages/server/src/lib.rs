#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the safety map application.
//!
//! Serves the REST API for submitting and querying incident reports,
//! heatmap and safety zone aggregation, risk prediction, SOS broadcast,
//! geocoding, and a server-sent-events alert stream. The static frontend
//! is served from the configured directory when it exists.

pub mod config;
pub mod events;
mod handlers;
mod route;

use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use safety_map_emergency::{EmergencyCoordinator, default_contacts};
use safety_map_geocoder::{GeocoderConfig, GeocoderService};
use safety_map_predict::{HeuristicRiskModel, RiskAssessor};
use safety_map_store::{InMemoryReportStore, ReportStore};

use crate::config::AppConfig;
use crate::events::EventBus;

/// Shared application state.
pub struct AppState {
    /// Report storage.
    pub store: Arc<dyn ReportStore>,
    /// Risk prediction facade.
    pub assessor: RiskAssessor,
    /// SOS event coordinator.
    pub coordinator: EmergencyCoordinator,
    /// Geocoding facade with bounded caches.
    pub geocoder: GeocoderService,
    /// Live event bus feeding the alert stream.
    pub events: EventBus,
    /// Server configuration.
    pub config: AppConfig,
}

/// Starts the safety map API server.
///
/// Reads configuration from the environment, builds the shared state
/// (in-memory report store, risk assessor, emergency coordinator,
/// geocoder, event bus), and starts the Actix-Web HTTP server. This is a
/// regular async function; the caller is responsible for providing the
/// async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the geocoder HTTP client cannot
/// be built, the server fails to bind, or it encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = AppConfig::from_env();
    let bind_addr = config.bind_addr.clone();
    let port = config.port;
    let static_dir = config.static_dir.clone();

    let serve_static = std::path::Path::new(&static_dir).is_dir();
    if !serve_static {
        log::info!("Static directory '{static_dir}' not found, serving the API only");
    }

    let geocoder = GeocoderService::new(GeocoderConfig {
        api_key: config.google_maps_api_key.clone(),
        timeout: config.external_timeout,
        cache_capacity: config.geocode_cache_capacity,
        cache_ttl: config.geocode_cache_ttl,
    })
    .map_err(|e| std::io::Error::other(format!("Failed to build geocoder: {e}")))?;

    let state = web::Data::new(AppState {
        store: Arc::new(InMemoryReportStore::new()),
        assessor: RiskAssessor::new(Arc::new(HeuristicRiskModel), config.external_timeout),
        coordinator: EmergencyCoordinator::new(default_contacts()),
        geocoder,
        events: EventBus::default(),
        config,
    });

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        let app = App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/incident-types", web::get().to(handlers::incident_types))
                    .route("/reports", web::post().to(handlers::submit_report))
                    .route("/reports/{id}", web::get().to(handlers::get_report))
                    .route("/reports/{id}/vote", web::post().to(handlers::vote_on_report))
                    .route("/heatmap", web::get().to(handlers::heatmap))
                    .route("/zone", web::get().to(handlers::zone))
                    .route("/risk", web::post().to(handlers::assess_risk))
                    .route("/emergency/sos", web::post().to(handlers::trigger_sos))
                    .route(
                        "/emergency/contacts",
                        web::get().to(handlers::emergency_contacts),
                    )
                    .route("/routes/safe", web::post().to(handlers::safe_route))
                    .route("/geocode/reverse", web::get().to(handlers::reverse_geocode))
                    .route("/geocode/forward", web::get().to(handlers::forward_geocode))
                    .route("/alerts/stream", web::get().to(handlers::alerts_stream)),
            );

        if serve_static {
            // Serve frontend static files (production)
            app.service(Files::new("/", static_dir.clone()).index_file("index.html"))
        } else {
            app
        }
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
