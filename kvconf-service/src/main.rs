//! kvconf Config Service
//!
//! Serves the record held in the key-value store as JSON on `GET /`.
//!
//! Every request reads the three store keys concurrently. A key that cannot
//! be read is served as the `"ERROR"` sentinel; the endpoint itself always
//! answers 200, even when the store is completely down.

use anyhow::{Context, Result};
use kvconf_client::{KvStore, MemoryStore, RedisStore};
use kvconf_core::domain::profile::Profile;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod service;

use crate::api::AppState;
use crate::config::{Config, StoreBackend};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kvconf_service=info,kvconf_client=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting kvconf config service...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;

    let store = build_store(&config).await?;

    match &config.app_version {
        Some(version) => tracing::info!("Serving app version {}", version),
        None => tracing::info!("APP_VERSION not set, app-version will be null"),
    }

    let state = AppState::new(store, config.read_retry(), config.app_version.clone());
    let app = api::create_router(state);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Config service stopped");
    Ok(())
}

/// Builds the store client selected by the configuration
///
/// An unreachable store does not stop startup: the service serves degraded
/// records and the client dials again on the next request.
async fn build_store(config: &Config) -> Result<Arc<dyn KvStore>> {
    let store: Arc<dyn KvStore> = match config.backend {
        StoreBackend::Redis => Arc::new(
            RedisStore::new(config.store.clone()).context("Failed to create store client")?,
        ),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store seeded with defaults, values are not shared with the feeder");
            Arc::new(MemoryStore::seeded(&Profile::default()).await)
        }
    };

    tracing::info!("Connecting to store at {}...", store.address());

    match store.connect().await {
        Ok(()) => tracing::info!("Store connection established"),
        Err(e) => tracing::warn!("Store not reachable yet, serving degraded records: {}", e),
    }

    Ok(store)
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvconf_client::RetryPolicy;

    #[tokio::test]
    async fn test_memory_backend_serves_default_profile() {
        let config = Config {
            backend: StoreBackend::Memory,
            ..Config::default()
        };

        let store = build_store(&config).await.unwrap();
        let record = service::record_service::load_record(
            store.as_ref(),
            &RetryPolicy::none(),
            None,
        )
        .await;

        assert_eq!(record.first_name, "Beyond");
        assert_eq!(record.last_name, "Creation");
        assert_eq!(record.environment, "dev");
        assert!(!record.is_degraded());
    }
}
