//! Application initialization and resource setup.
//!
//! This module provides functions to initialize all shared resources:
//! - Logger
//! - SQLite-backed store (pool, WAL mode, migrations)
//! - Application state shared by the HTTP handlers

mod logger;

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::config::Config;
use crate::server::AppState;
use crate::storage::{init_db_pool_with_path, run_migrations, AssetSource, SqliteStore};

// Re-export public API
pub use logger::init_logger_with;

/// Opens the configured database and applies migrations.
pub async fn init_store(config: &Config) -> Result<Arc<SqliteStore>> {
    let pool = init_db_pool_with_path(&config.db_path)
        .await
        .context("Failed to initialize database pool")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    Ok(Arc::new(SqliteStore::new(pool)))
}

/// Builds the state shared by all request handlers.
pub async fn init_app_state(config: &Config) -> Result<AppState> {
    let store = init_store(config).await?;
    let source = AssetSource::parse(&config.source);
    info!("ZIP code source: {}", source);

    if !config.radius_is_valid() {
        warn!(
            "Configured radius {} km is not positive; reverse geocoding requests will be rejected",
            config.radius_km
        );
    }

    Ok(AppState::new(store, source, config.radius_km))
}
