//! Process-wide spatial index cache keyed by snapshot epoch.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};
use tokio::sync::{Mutex, RwLock};

use crate::dataset::{load_snapshot, Snapshot};
use crate::error_handling::GeocodeError;
use crate::ingest::ZipRecord;
use crate::spatial::SpatialIndex;
use crate::storage::KvStore;

/// A spatial index together with the master collection it was built from.
#[derive(Debug)]
pub struct IndexedSnapshot {
    pub epoch: u64,
    pub index: SpatialIndex,
    records: Vec<ZipRecord>,
    by_zip: HashMap<String, usize>,
}

impl IndexedSnapshot {
    pub fn build(snapshot: Snapshot) -> Self {
        let Snapshot {
            epoch,
            records,
            points,
        } = snapshot;

        let mut by_zip = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            by_zip.entry(record.zip.clone()).or_insert(position);
        }

        Self {
            epoch,
            index: SpatialIndex::build(points),
            records,
            by_zip,
        }
    }

    /// Resolves the indexed point at `ordinal` to its record.
    ///
    /// Points carrying a ZIP code resolve by key. Points without one resolve
    /// to the first record with exactly equal coordinates.
    pub fn resolve(&self, ordinal: usize) -> Option<&ZipRecord> {
        let point = self.index.point(ordinal)?;
        match &point.zip {
            Some(zip) => self.by_zip.get(zip).map(|&i| &self.records[i]),
            None => self
                .records
                .iter()
                .find(|r| r.latitude == point.latitude && r.longitude == point.longitude),
        }
    }
}

/// Holds the index for the most recent epoch seen.
///
/// Readers share the cached index through an `Arc`. A miss rebuilds under a
/// mutex, so concurrent misses for the same epoch build once.
#[derive(Debug, Default)]
pub struct IndexCache {
    slot: RwLock<Option<Arc<IndexedSnapshot>>>,
    rebuild: Mutex<()>,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    async fn cached(&self, epoch: u64) -> Option<Arc<IndexedSnapshot>> {
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|indexed| indexed.epoch >= epoch)
            .cloned()
    }

    /// Returns the index for `epoch` or a newer one, building it from the
    /// store on a miss.
    ///
    /// # Errors
    ///
    /// `GeocodeError::DatasetUnavailable` if no snapshot is published,
    /// `GeocodeError::Storage` if it cannot be read, and
    /// `GeocodeError::IndexBuild` if the build task fails.
    pub async fn get_or_build(
        &self,
        store: &dyn KvStore,
        epoch: u64,
    ) -> Result<Arc<IndexedSnapshot>, GeocodeError> {
        if let Some(indexed) = self.cached(epoch).await {
            return Ok(indexed);
        }

        let _guard = self.rebuild.lock().await;
        // Another request may have finished the build while we waited
        if let Some(indexed) = self.cached(epoch).await {
            debug!("Spatial index for epoch {} built by a concurrent request", epoch);
            return Ok(indexed);
        }

        let snapshot = load_snapshot(store)
            .await?
            .ok_or(GeocodeError::DatasetUnavailable)?;
        let loaded_epoch = snapshot.epoch;
        let count = snapshot.records.len();

        let indexed = tokio::task::spawn_blocking(move || IndexedSnapshot::build(snapshot))
            .await
            .map_err(|e| GeocodeError::IndexBuild(e.to_string()))?;
        let indexed = Arc::new(indexed);
        info!(
            "Built spatial index for epoch {} over {} ZIP codes",
            loaded_epoch, count
        );

        *self.slot.write().await = Some(indexed.clone());
        Ok(indexed)
    }
}
