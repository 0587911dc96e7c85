//! Error type definitions.
//!
//! This module defines all error types used throughout the application.

use log::SetLoggerError;
use thiserror::Error;

/// Broad category of a failure, as seen by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed client input; rejected before touching the store
    InvalidInput,
    /// The requested thing does not exist (never fatal)
    NotFound,
    /// A dependency (store, source asset) failed or returned nothing
    Upstream,
}

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Schema migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be encoded or decoded as JSON.
    #[error("Stored value for key '{key}' is not valid JSON: {source}")]
    ValueError {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Error types for fetching the raw ZIP code source.
#[derive(Error, Debug)]
pub enum AssetError {
    /// Local file could not be read.
    #[error("Failed to read source file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Remote source answered with a non-success status.
    #[error("Source {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// Remote source could not be reached or its body could not be read.
    #[error("Failed to fetch source {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Errors that prevent ingesting a CSV document as a whole.
///
/// Individual bad rows are not errors at this level; they are collected in
/// the ingest report.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The header row could not be read.
    #[error("Failed to read CSV header: {0}")]
    Header(#[from] csv::Error),

    /// A column every row depends on is absent from the header.
    #[error("CSV header is missing required column '{0}'")]
    MissingColumn(&'static str),
}

/// Errors raised by spatial index queries.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum QueryError {
    /// Radius is zero, negative, or not a number.
    #[error("Invalid radius value: {0}")]
    InvalidRadius(f64),

    /// Query coordinate is not a finite in-range latitude/longitude.
    #[error("Invalid coordinate: ({lat}, {long})")]
    InvalidCoordinate { lat: f64, long: f64 },
}

/// Errors raised while reverse-geocoding a coordinate.
#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("Invalid latitude or longitude")]
    InvalidCoordinates,

    #[error("Invalid radius value")]
    InvalidRadius,

    /// No snapshot has been published to the store.
    #[error("Failed to fetch ZIP code snapshot")]
    DatasetUnavailable,

    #[error("No ZIP codes available")]
    EmptyDataset,

    #[error("No ZIP code found for the given coordinates")]
    NoMatch,

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),

    /// The index build task panicked or was cancelled.
    #[error("Index build failed: {0}")]
    IndexBuild(String),
}

impl GeocodeError {
    /// Client-facing category of this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            GeocodeError::InvalidCoordinates | GeocodeError::InvalidRadius => {
                ErrorClass::InvalidInput
            }
            GeocodeError::EmptyDataset | GeocodeError::NoMatch => ErrorClass::NotFound,
            GeocodeError::DatasetUnavailable
            | GeocodeError::Storage(_)
            | GeocodeError::IndexBuild(_) => ErrorClass::Upstream,
        }
    }
}

impl From<QueryError> for GeocodeError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidRadius(_) => GeocodeError::InvalidRadius,
            QueryError::InvalidCoordinate { .. } => GeocodeError::InvalidCoordinates,
        }
    }
}

/// Errors raised while ingesting and publishing a new snapshot.
#[derive(Error, Debug)]
pub enum PopulateError {
    #[error("Failed to fetch CSV file: {0}")]
    Asset(#[from] AssetError),

    #[error("Failed to parse CSV file: {0}")]
    Ingest(#[from] IngestError),

    #[error("Failed to encode ZIP records: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to store snapshot: {0}")]
    Storage(#[from] DatabaseError),
}
