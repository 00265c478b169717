//! Abacaxi Server - E-resources Metadata Hub
//!
//! REST API server for managing e-book packages and their records.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use abacaxi_server::{
    api,
    config::{AppConfig, LoggingConfig},
    repository::Repository,
    services::Services,
    AppState,
};

/// Console logging plus an optional log file.
/// The returned guard must live as long as the program to flush the file.
fn init_tracing(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("abacaxi_server={},tower_http=debug", logging.level).into());

    let json = logging.format == "json";

    let (file_layer, guard) = match logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let name = path.file_name().unwrap_or(path.as_os_str());
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    let _log_guard = init_tracing(&config.logging);

    tracing::info!("Starting Abacaxi Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("Database migrations completed");

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, config.upload.clone());

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
