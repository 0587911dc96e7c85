//! Coordinate to nearest ZIP code resolution.

use std::sync::Arc;

use log::debug;
use serde::Serialize;

use super::cache::IndexCache;
use crate::dataset::read_epoch;
use crate::error_handling::GeocodeError;
use crate::ingest::{is_valid_coordinate, Point};
use crate::storage::KvStore;

/// Nearest ZIP code for a query coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseResult {
    pub lat: f64,
    pub long: f64,
    /// The matched indexed point
    pub result: Point,
    pub zip_code: String,
    pub city: String,
    pub distance_km: f64,
}

/// Resolves coordinates against the published snapshot.
pub struct ReverseGeocoder {
    store: Arc<dyn KvStore>,
    cache: IndexCache,
    radius_km: f64,
}

impl ReverseGeocoder {
    pub fn new(store: Arc<dyn KvStore>, radius_km: f64) -> Self {
        Self {
            store,
            cache: IndexCache::new(),
            radius_km,
        }
    }

    /// Finds the ZIP code nearest to `(lat, long)` within the configured radius.
    ///
    /// Input is validated before the store is touched. Equidistant matches
    /// resolve to the record that comes first in the master collection.
    pub async fn reverse(&self, lat: f64, long: f64) -> Result<ReverseResult, GeocodeError> {
        if !is_valid_coordinate(lat, long) {
            return Err(GeocodeError::InvalidCoordinates);
        }
        if !(self.radius_km.is_finite() && self.radius_km > 0.0) {
            return Err(GeocodeError::InvalidRadius);
        }

        // Snapshots written without an epoch marker count as epoch 0
        let epoch = read_epoch(self.store.as_ref()).await?.unwrap_or(0);
        let indexed = self.cache.get_or_build(self.store.as_ref(), epoch).await?;
        if indexed.index.is_empty() {
            return Err(GeocodeError::EmptyDataset);
        }

        let nearest = indexed
            .index
            .nearest(lat, long, 1, self.radius_km)?
            .into_iter()
            .next()
            .ok_or(GeocodeError::NoMatch)?;
        let record = indexed
            .resolve(nearest.ordinal)
            .ok_or(GeocodeError::NoMatch)?;
        let point = indexed
            .index
            .point(nearest.ordinal)
            .cloned()
            .unwrap_or_else(|| record.point());
        debug!(
            "Reverse geocoded ({}, {}) to {} at {:.3} km",
            lat, long, record.zip, nearest.distance_km
        );

        Ok(ReverseResult {
            lat,
            long,
            result: point,
            zip_code: record.zip.clone(),
            city: record.city().to_string(),
            distance_km: nearest.distance_km,
        })
    }
}
