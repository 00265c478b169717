//! API handlers for Abacaxi REST endpoints

pub mod health;
pub mod openapi;
pub mod records;
pub mod target_services;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    http::{StatusCode, Uri},
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::AppState;

/// Plain-text 404 for unknown routes
async fn not_found(uri: Uri) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("{} not found\n", uri))
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let upload_limit = state.config.upload.max_size_bytes;
    let static_dir = state.config.server.static_dir.clone();

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Target services
        .route(
            "/target-services",
            get(target_services::list_target_services).post(target_services::create_target_service),
        )
        .route(
            "/target-services/:name",
            get(target_services::get_target_service)
                .put(target_services::update_target_service)
                .delete(target_services::delete_target_service),
        )
        .route(
            "/target-services/:name/toggle-active",
            post(target_services::toggle_target_service),
        )
        .route("/target-services/:name/csv-conf", get(target_services::get_csv_conf))
        .route(
            "/target-services/:name/upload",
            post(upload::upload_csv).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Records
        .route("/records", get(records::find_record))
        .route(
            "/records/:id",
            get(records::get_record).delete(records::delete_record),
        )
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    let mut app = Router::new().nest("/api/v1", api_v1).merge(openapi);

    if let Some(dir) = static_dir {
        app = app.nest_service("/static", ServeDir::new(dir));
    }

    app.fallback(not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
