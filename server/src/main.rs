use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use events_server::config::Config;
use events_server::db;
use events_server::geocoding::NominatimClient;
use events_server::routes::create_routes;
use events_server::storage::AttachmentStore;
use events_server::AppState;

const DEFAULT_LOG_FILTER: &str = "events_server=info,tower_http=info";

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::from_env().expect("Invalid configuration");

    let pool = db::connect(&config.database_url, config.database_max_connections)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Successfully connected to database");

    db::migrate(&pool).await.expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    let attachments = AttachmentStore::new(&config.upload_dir, config.max_upload_bytes);
    attachments
        .ensure_root()
        .await
        .expect("Failed to create upload directory");

    let geocoder =
        NominatimClient::new(&config.geocoder).expect("Failed to build geocoding client");
    tracing::info!(
        url = %config.geocoder.base_url,
        delay_ms = config.geocoder.delay.as_millis() as u64,
        "Geocoding client ready"
    );

    let state = AppState::new(pool.clone(), Arc::new(geocoder), attachments);
    let app = create_routes(state, config.cors_allowed_origins.as_deref());

    let listener = TcpListener::bind(config.server_addr)
        .await
        .expect("Failed to bind address");

    tracing::info!("🚀 Server running at http://{}", config.server_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");

    pool.close().await;
    tracing::info!("Server stopped, database pool closed");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
