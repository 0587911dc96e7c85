//! Snapshot assembly and loading.

use log::warn;
use serde_json::json;

use super::bulk::BulkMetadata;
use crate::config::{EPOCH_KEY, LIST_KEY, MASTER_KEY};
use crate::error_handling::DatabaseError;
use crate::ingest::{Point, ZipRecord};
use crate::storage::{decode_json, KvEntry, KvStore};

/// Master collection and point projection of one ingestion run.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Strictly increasing across ingestion runs; 0 for snapshots stored
    /// without an epoch marker
    pub epoch: u64,
    pub records: Vec<ZipRecord>,
    /// `points[i]` is the projection of `records[i]`
    pub points: Vec<Point>,
}

impl Snapshot {
    /// Derives the point projection of `records`, preserving order.
    pub fn from_records(records: Vec<ZipRecord>, epoch: u64) -> Self {
        let points = records.iter().map(ZipRecord::point).collect();
        Self {
            epoch,
            records,
            points,
        }
    }

    /// Store entries publishing this snapshot: MASTER, LIST, EPOCH and one
    /// entry per ZIP code.
    pub fn entries(&self) -> Result<Vec<KvEntry>, DatabaseError> {
        let mut entries = Vec::with_capacity(self.records.len() + 3);
        entries.push(
            KvEntry::json(MASTER_KEY, &self.records)?
                .with_metadata(json!({ "description": "List of all ZIP codes" })),
        );
        entries.push(KvEntry::json(LIST_KEY, &self.points)?.with_metadata(
            json!({ "description": "List of all ZIP codes with latitude and longitude" }),
        ));
        entries.push(KvEntry::new(EPOCH_KEY, self.epoch.to_string()));

        for record in &self.records {
            let metadata = serde_json::to_value(BulkMetadata::from(record)).map_err(|source| {
                DatabaseError::ValueError {
                    key: record.zip.clone(),
                    source,
                }
            })?;
            entries.push(KvEntry::json(record.zip.clone(), record)?.with_metadata(metadata));
        }
        Ok(entries)
    }
}

/// Reads the epoch of the published snapshot, if any.
pub async fn read_epoch(store: &dyn KvStore) -> Result<Option<u64>, DatabaseError> {
    match store.get(EPOCH_KEY).await? {
        Some(raw) => parse_epoch(&raw).map(Some),
        None => Ok(None),
    }
}

fn parse_epoch(raw: &str) -> Result<u64, DatabaseError> {
    decode_json(EPOCH_KEY, raw)
}

/// Loads the published snapshot with one consistent read.
///
/// Returns `None` when MASTER or LIST is absent.
pub async fn load_snapshot(store: &dyn KvStore) -> Result<Option<Snapshot>, DatabaseError> {
    let mut values = store.get_many(&[MASTER_KEY, LIST_KEY, EPOCH_KEY]).await?;
    let (Some(master), Some(list)) = (values.remove(MASTER_KEY), values.remove(LIST_KEY)) else {
        return Ok(None);
    };

    let records: Vec<ZipRecord> = decode_json(MASTER_KEY, &master)?;
    let points: Vec<Point> = decode_json(LIST_KEY, &list)?;
    let epoch = match values.remove(EPOCH_KEY) {
        Some(raw) => parse_epoch(&raw)?,
        None => 0,
    };

    if records.len() != points.len() {
        warn!(
            "Snapshot {} is inconsistent: {} records but {} points",
            epoch,
            records.len(),
            points.len()
        );
    }

    Ok(Some(Snapshot {
        epoch,
        records,
        points,
    }))
}
