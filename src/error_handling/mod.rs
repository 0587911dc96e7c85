//! Error handling.
//!
//! This module provides the error types of every layer:
//! - **Initialization**: logger setup
//! - **Storage**: SQLite, migrations, stored JSON values
//! - **Assets**: fetching the raw ZIP code CSV
//! - **Ingestion and queries**: CSV structure, spatial query arguments
//! - **Service operations**: reverse geocoding and dataset population
//!
//! Client-facing classification (input / not found / dependency) is exposed
//! through [`ErrorClass`] so the HTTP layer maps errors without matching on
//! every variant.

mod types;

// Re-export public API
pub use types::{
    AssetError, DatabaseError, ErrorClass, GeocodeError, IngestError, InitializationError,
    PopulateError, QueryError,
};
