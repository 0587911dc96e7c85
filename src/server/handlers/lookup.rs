//! ZIP code lookup and reverse geocoding handlers.

use axum::extract::{Path, State};
use axum::Json;

use super::super::error::ApiError;
use super::super::state::AppState;
use crate::error_handling::GeocodeError;
use crate::geocode::ReverseResult;
use crate::ingest::ZipRecord;
use crate::storage::get_json;

/// True for exactly five ASCII digits.
fn is_zip_code(value: &str) -> bool {
    value.len() == 5 && value.bytes().all(|b| b.is_ascii_digit())
}

/// `GET /zipcode/{zip}`
pub async fn zipcode_handler(
    State(state): State<AppState>,
    Path(zip): Path<String>,
) -> Result<Json<ZipRecord>, ApiError> {
    if !is_zip_code(&zip) {
        return Err(ApiError::bad_request("Invalid ZIP code"));
    }
    get_json::<ZipRecord>(state.store.as_ref(), &zip)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("ZIP code not found"))
}

/// `GET /reverse/{lat}/{long}`
pub async fn reverse_handler(
    State(state): State<AppState>,
    Path((lat, long)): Path<(String, String)>,
) -> Result<Json<ReverseResult>, ApiError> {
    let (Ok(lat), Ok(long)) = (lat.trim().parse::<f64>(), long.trim().parse::<f64>()) else {
        return Err(GeocodeError::InvalidCoordinates.into());
    };
    Ok(Json(state.geocoder.reverse(lat, long).await?))
}
