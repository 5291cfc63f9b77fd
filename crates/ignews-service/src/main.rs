//! ignews billing service - Stripe webhook receiver.

use std::sync::Arc;

use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ignews_service::{create_router, AppState, ServiceConfig};
use ignews_store::{MemoryStore, SubscriptionStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ignews=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting ignews billing service");

    let config = ServiceConfig::from_env();
    tracing::info!(config = ?config, "Service configuration loaded");

    let store = open_store(&config).await?;

    let state = AppState::with_store(config.clone(), store);
    let app = create_router(state);

    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Open the configured store, falling back to memory without `DATABASE_URL`.
async fn open_store(
    config: &ServiceConfig,
) -> Result<Arc<dyn SubscriptionStore>, Box<dyn std::error::Error>> {
    #[cfg(feature = "postgres")]
    if let Some(url) = &config.database_url {
        tracing::info!("Connecting to PostgreSQL");
        let store = ignews_store::PgStore::connect(url).await?;
        store.migrate().await?;
        return Ok(Arc::new(store));
    }

    #[cfg(not(feature = "postgres"))]
    if config.database_url.is_some() {
        tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
    }

    tracing::warn!("Using in-memory store - subscriptions are lost on restart");
    Ok(Arc::new(MemoryStore::new()))
}

/// Resolve when SIGINT or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT"),
        () = terminate => tracing::info!("Received SIGTERM"),
    }

    tracing::info!("Shutting down");
}
