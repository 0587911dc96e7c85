//! Dataset snapshots.
//!
//! One ingestion run produces one [`Snapshot`]: the master record collection,
//! its point projection in the same order, an epoch number, and one entry per
//! ZIP code. All of it is written to the store in a single transaction, so a
//! reader never pairs a point projection with a master collection from a
//! different run.

mod builder;
mod bulk;
mod snapshot;

// Re-export public API
pub use builder::{DatasetBuilder, PopulateReport};
pub use bulk::{bulk_entries, BulkEntry, BulkMetadata};
pub use snapshot::{load_snapshot, read_epoch, Snapshot};
