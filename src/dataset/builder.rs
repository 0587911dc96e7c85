//! Ingestion runs: fetch, parse, publish.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::info;
use tokio::sync::Mutex;

use super::bulk::{bulk_entries, BulkEntry};
use super::snapshot::{read_epoch, Snapshot};
use crate::error_handling::PopulateError;
use crate::ingest::{parse_zip_csv, IngestReport, ZipRecord};
use crate::storage::{AssetSource, KvStore};

/// Outcome of one ingestion run.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulateReport {
    /// Records published
    pub records: usize,
    /// Source rows rejected by validation
    pub rejected: usize,
    pub epoch: u64,
    pub elapsed: Duration,
}

impl PopulateReport {
    /// Human-readable summary returned to the caller of `/populate`.
    pub fn message(&self) -> String {
        format!(
            "Finished uploading {} ZIP code datas in {:.2} seconds",
            self.records,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Turns the source asset into published snapshots.
pub struct DatasetBuilder {
    store: Arc<dyn KvStore>,
    source: AssetSource,
    /// Serializes publishes so two runs never allocate the same epoch
    publish_lock: Mutex<()>,
}

impl DatasetBuilder {
    pub fn new(store: Arc<dyn KvStore>, source: AssetSource) -> Self {
        Self {
            store,
            source,
            publish_lock: Mutex::new(()),
        }
    }

    /// Fetches and validates the source asset.
    async fn ingest(&self) -> Result<IngestReport, PopulateError> {
        let text = self.source.fetch_text().await?;
        let report = parse_zip_csv(&text)?;
        report.log_summary();
        Ok(report)
    }

    /// Fetches the source, ingests it and publishes the result as the next
    /// snapshot.
    pub async fn populate(&self) -> Result<PopulateReport, PopulateError> {
        let start = Instant::now();
        info!("Populating ZIP code data from {}", self.source);

        let report = self.ingest().await?;
        let rejected = report.errors.len();
        let records = report.records.len();
        let epoch = self.publish(report.records).await?;

        let report = PopulateReport {
            records,
            rejected,
            epoch,
            elapsed: start.elapsed(),
        };
        info!("{} (epoch {})", report.message(), epoch);
        Ok(report)
    }

    /// Publishes `records` as a new snapshot in one store transaction and
    /// returns its epoch. Per-ZIP entries from earlier snapshots that are
    /// not in `records` are removed in the same transaction.
    pub async fn publish(&self, records: Vec<ZipRecord>) -> Result<u64, PopulateError> {
        let _guard = self.publish_lock.lock().await;
        let epoch = read_epoch(self.store.as_ref()).await?.unwrap_or(0) + 1;
        let snapshot = Snapshot::from_records(records, epoch);
        self.store.replace_all(snapshot.entries()?).await?;
        Ok(epoch)
    }

    /// Fetches the source and returns the bulk-load payload without writing
    /// anything.
    pub async fn bulk(&self) -> Result<Vec<BulkEntry>, PopulateError> {
        let report = self.ingest().await?;
        Ok(bulk_entries(&report.records)?)
    }
}
