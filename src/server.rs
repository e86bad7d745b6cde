//! HTTP server initialization and runtime setup.
//!
//! Handles storage backend selection, database connections, migrations and
//! the Axum server lifecycle.

use crate::config::{Config, StorageBackend};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::infrastructure::change_feed::log_changes;
use crate::infrastructure::persistence::{MemoryStore, PgClickRepository, PgLinkRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Connects a pool using the `DB_*` pool settings.
///
/// # Errors
///
/// Returns an error if the database URL is missing or the first connection fails.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required for the postgres storage backend")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    Ok(pool)
}

/// Builds the repositories for the configured backend.
///
/// For PostgreSQL this connects and applies pending migrations.
async fn build_repositories(
    config: &Config,
) -> Result<(Arc<dyn LinkRepository>, Arc<dyn ClickRepository>)> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = connect_pool(config).await?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to migrate")?;
            tracing::info!("Migrations applied");

            let pool = Arc::new(pool);
            Ok((
                Arc::new(PgLinkRepository::new(pool.clone())),
                Arc::new(PgClickRepository::new(pool)),
            ))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on restart");
            let store = Arc::new(MemoryStore::new());
            Ok((store.clone(), store))
        }
    }
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Storage backend (PostgreSQL pool and migrations, or in-memory)
/// - Service state and change feed logger
/// - Axum HTTP server with graceful shutdown on Ctrl+C
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (links, clicks) = build_repositories(&config).await?;

    let state = AppState::new(links, clicks, &config);
    tokio::spawn(log_changes(state.feed.subscribe()));

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
