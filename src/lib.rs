//! zip_geodata library: ZIP code directory and reverse geocoding service
//!
//! This library ingests a ZIP code CSV into a SQLite-backed key-value store and
//! serves it over HTTP: metadata lookup by ZIP code, and reverse geocoding of a
//! latitude/longitude pair to the nearest ZIP code within a bounded radius.
//!
//! # Example
//!
//! ```no_run
//! use zip_geodata::{run_service, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     db_path: std::path::PathBuf::from("./zips.db"),
//!     populate_on_start: true,
//!     ..Default::default()
//! };
//!
//! run_service(config).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod config;
pub mod dataset;
pub mod error_handling;
pub mod geocode;
pub mod ingest;
pub mod initialization;
pub mod server;
pub mod spatial;
pub mod storage;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use server::{build_router, AppState};

use anyhow::{Context, Result};
use log::{info, warn};

/// Opens the store, optionally ingests the source, and serves the HTTP API
/// until the process exits.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrated, or if the
/// server cannot bind its address. A failed ingestion on start is logged and
/// serving continues with whatever snapshot the store already holds.
pub async fn run_service(config: Config) -> Result<()> {
    let state = initialization::init_app_state(&config)
        .await
        .context("Failed to initialize application state")?;

    if config.populate_on_start {
        match state.builder.populate().await {
            Ok(report) => info!("{}", report.message()),
            Err(e) => warn!("Initial ingestion failed: {}. Serving existing data.", e),
        }
    }

    server::start_server(&config.bind, config.port, state).await
}
