//! Shared handler state.

use std::sync::Arc;

use crate::dataset::DatasetBuilder;
use crate::geocode::ReverseGeocoder;
use crate::storage::{AssetSource, KvStore};

/// State shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KvStore>,
    pub builder: Arc<DatasetBuilder>,
    pub geocoder: Arc<ReverseGeocoder>,
}

impl AppState {
    pub fn new(store: Arc<dyn KvStore>, source: AssetSource, radius_km: f64) -> Self {
        Self {
            builder: Arc::new(DatasetBuilder::new(store.clone(), source)),
            geocoder: Arc::new(ReverseGeocoder::new(store.clone(), radius_km)),
            store,
        }
    }
}
