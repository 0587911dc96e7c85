//! Dataset maintenance and bulk read handlers.

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use log::debug;

use super::super::error::ApiError;
use super::super::state::AppState;
use crate::config::{LIST_KEY, LIST_PAGE_LIMIT, MASTER_KEY, RESERVED_KEYS};
use crate::dataset::BulkEntry;
use crate::ingest::{Point, ZipRecord};
use crate::storage::{get_json, list_all_keys, KeyInfo};

/// `POST /populate`
pub async fn populate_handler(State(state): State<AppState>) -> Result<String, ApiError> {
    let report = state.builder.populate().await?;
    Ok(report.message())
}

/// `GET /bulk`
pub async fn bulk_handler(State(state): State<AppState>) -> Result<Json<Vec<BulkEntry>>, ApiError> {
    Ok(Json(state.builder.bulk().await?))
}

/// `GET /list`
pub async fn list_handler(State(state): State<AppState>) -> Result<Json<Vec<Point>>, ApiError> {
    let start = Instant::now();
    let list = get_json::<Vec<Point>>(state.store.as_ref(), LIST_KEY)
        .await?
        .ok_or_else(|| ApiError::internal("Failed to fetch ZIP code list"))?;
    debug!(
        "Fetched {} ZIP code points in {:.2} seconds",
        list.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(Json(list))
}

/// `GET /all`
pub async fn all_handler(State(state): State<AppState>) -> Result<Json<Vec<KeyInfo>>, ApiError> {
    let start = Instant::now();
    let keys = list_all_keys(state.store.as_ref(), LIST_PAGE_LIMIT, RESERVED_KEYS).await?;
    debug!(
        "Listed {} ZIP code keys in {:.2} seconds",
        keys.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(Json(keys))
}

/// `GET /master`
pub async fn master_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<ZipRecord>>, ApiError> {
    let start = Instant::now();
    let master = get_json::<Vec<ZipRecord>>(state.store.as_ref(), MASTER_KEY)
        .await?
        .ok_or_else(|| ApiError::internal("Failed to fetch master ZIP code data"))?;
    debug!(
        "Fetched {} ZIP code records in {:.2} seconds",
        master.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(Json(master))
}
