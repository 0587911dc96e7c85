//! Tabular ingestion of the raw ZIP code database.
//!
//! Converts comma-delimited text with a header row into typed [`ZipRecord`]s.
//! Every data row is validated on its own: rows that fail are reported in the
//! [`IngestReport`] and left out of the record sequence instead of leaking
//! invalid coordinates into the spatial index.

mod parse;
mod record;

// Re-export public API
pub use parse::{parse_zip_csv, IngestReport, RowError, RowErrorKind};
pub use record::{normalize_zip, Point, ZipRecord};
pub(crate) use record::is_valid_coordinate;
