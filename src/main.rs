//! traffic-geopoints server entry point.
//!
//! Starts the Axum HTTP server with the REST endpoints.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use traffic_geopoints::api;
use traffic_geopoints::app_state::AppState;
use traffic_geopoints::config::{LogFormat, ServiceConfig, StorageBackend};
use traffic_geopoints::persistence::{
    MemoryPointRepository, PointRepository, PostgresPointRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServiceConfig::from_env().context("invalid configuration")?;

    // Initialize tracing
    init_tracing(config.log_format);
    tracing::info!(
        addr = %config.listen_addr,
        backend = %config.storage_backend,
        "starting traffic-geopoints"
    );

    // Build persistence layer
    let repository: Arc<dyn PointRepository> = match config.storage_backend {
        StorageBackend::Postgres => Arc::new(
            PostgresPointRepository::connect(&config)
                .await
                .context("connecting to PostgreSQL")?,
        ),
        StorageBackend::Memory => {
            tracing::warn!("in-memory storage selected; points are lost on shutdown");
            let repository = MemoryPointRepository::new();
            for (id, display_name) in &config.memory_owners {
                repository.register_owner(*id, display_name.as_str()).await;
            }
            tracing::info!(owners = config.memory_owners.len(), "owner directory seeded");
            Arc::new(repository)
        }
    };

    // Build service layer and router
    let app_state = AppState::new(repository, config.search_limits);
    let app = api::build_app(app_state, Duration::from_secs(config.request_timeout_secs));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
