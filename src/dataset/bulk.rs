//! Bulk-load payload for per-ZIP entries.

use serde::Serialize;

use crate::ingest::ZipRecord;

/// Metadata attached to each per-ZIP entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkMetadata {
    pub zip: String,
    pub long: f64,
    pub latitude: f64,
}

impl From<&ZipRecord> for BulkMetadata {
    fn from(record: &ZipRecord) -> Self {
        Self {
            zip: record.zip.clone(),
            long: record.longitude,
            latitude: record.latitude,
        }
    }
}

/// One key of a bulk upload: the record serialized to a JSON string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkEntry {
    pub key: String,
    pub value: String,
    pub metadata: BulkMetadata,
}

/// Builds the bulk-load payload for `records`, one entry per record, in order.
pub fn bulk_entries(records: &[ZipRecord]) -> Result<Vec<BulkEntry>, serde_json::Error> {
    records
        .iter()
        .map(|record| {
            Ok(BulkEntry {
                key: record.zip.clone(),
                value: serde_json::to_string(record)?,
                metadata: BulkMetadata::from(record),
            })
        })
        .collect()
}
