//! Configuration constants.
//!
//! This module defines the reserved store keys, defaults and limits used
//! throughout the service.

/// Store key holding the full record array of the current snapshot.
pub const MASTER_KEY: &str = "MASTER";

/// Store key holding the point projection of the current snapshot.
pub const LIST_KEY: &str = "LIST";

/// Store key holding the epoch of the current snapshot.
pub const EPOCH_KEY: &str = "EPOCH";

/// Keys that belong to the snapshot rather than to a single ZIP code.
pub const RESERVED_KEYS: &[&str] = &[MASTER_KEY, LIST_KEY, EPOCH_KEY];

/// Default SQLite database path
pub const DB_PATH: &str = "./zip_geodata.db";

/// Default location of the raw ZIP code CSV
pub const DEFAULT_SOURCE: &str = "./zip_code_database.csv";

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8787;

/// Default reverse-geocode search radius in kilometers
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

/// Page size used when listing store keys
pub const LIST_PAGE_LIMIT: usize = 1000;

/// Maximum number of rejected rows logged individually during ingestion.
/// The remainder are only counted.
pub const MAX_LOGGED_ROW_ERRORS: usize = 10;

/// Timeout for fetching the source asset over HTTP, in seconds
pub const ASSET_FETCH_TIMEOUT_SECS: u64 = 60;

/// Mean Earth radius in kilometers (IUGG)
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// City reported when a record has neither a primary nor an acceptable city
pub const UNKNOWN_CITY: &str = "Unknown";
