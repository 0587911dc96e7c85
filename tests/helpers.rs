// Shared test helpers for store setup and HTTP requests.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::io::Write;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::NamedTempFile;
use tower::ServiceExt;

use zip_geodata::storage::{init_db_pool_in_memory, run_migrations, AssetSource, SqliteStore};
use zip_geodata::{build_router, AppState};

/// Three ZIP codes around Holtsville and New York, plus one in Samoa.
#[allow(dead_code)] // Used by other test files
pub const SAMPLE_CSV: &str = "\
zip,type,decommissioned,primary_city,acceptable_cities,unacceptable_cities,state,county,timezone,area_codes,world_region,country,latitude,longitude,irs_estimated_population
00501,UNIQUE,0,Holtsville,,I R S Service Center,NY,Suffolk County,America/New_York,631,,US,40.81,-73.04,562
10001,STANDARD,0,New York,,\"Empire State, G P O\",NY,New York County,America/New_York,\"718,917,347,646\",,US,40.75,-73.99,21200
96799,STANDARD,0,Pago Pago,,,AS,,Pacific/Pago_Pago,684,,US,-14.27,-170.70,0
";

/// Creates an in-memory store with migrations applied.
#[allow(dead_code)] // Used by other test files
pub async fn create_test_store() -> Arc<SqliteStore> {
    let pool = init_db_pool_in_memory()
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    Arc::new(SqliteStore::new(pool))
}

/// Writes `contents` to a temporary CSV file.
pub fn write_csv(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp CSV");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp CSV");
    file
}

/// A router over a fresh store whose source is `csv`.
///
/// The returned file must outlive the router.
#[allow(dead_code)] // Used by other test files
pub async fn test_app(csv: &str, radius_km: f64) -> (Router, NamedTempFile) {
    let file = write_csv(csv);
    let store = create_test_store().await;
    let state = AppState::new(store, AssetSource::File(file.path().to_path_buf()), radius_km);
    (build_router(state), file)
}

/// Sends one request and returns the status and body text.
#[allow(dead_code)] // Used by other test files
pub async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request");
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    (
        status,
        String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8"),
    )
}

/// Sends one request and parses the body as JSON.
#[allow(dead_code)] // Used by other test files
pub async fn send_json(app: &Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, body) = send(app, method, uri).await;
    let json = serde_json::from_str(&body)
        .unwrap_or_else(|e| panic!("Body is not JSON ({}): {}", e, body));
    (status, json)
}
