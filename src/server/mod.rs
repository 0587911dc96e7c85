//! HTTP API.
//!
//! Routes:
//! - `GET /zipcode/{zip}` - metadata for one ZIP code
//! - `GET /reverse/{lat}/{long}` - nearest ZIP code within the configured radius
//! - `POST /populate` - ingest the source CSV and publish a new snapshot
//! - `GET /bulk` - bulk-load payload built from the source CSV
//! - `GET /list` - point projection of the published snapshot
//! - `GET /all` - every per-ZIP key with its metadata
//! - `GET /master` - master collection of the published snapshot

mod error;
mod handlers;
mod state;

use std::any::Any;
use std::time::Instant;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;

use handlers::{
    all_handler, bulk_handler, list_handler, master_handler, populate_handler, reverse_handler,
    zipcode_handler,
};

pub use error::ApiError;
pub use state::AppState;

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/zipcode/:zip", get(zipcode_handler))
        .route("/reverse/:lat/:long", get(reverse_handler))
        .route("/populate", post(populate_handler))
        .route("/bulk", get(bulk_handler))
        .route("/list", get(list_handler))
        .route("/all", get(all_handler))
        .route("/master", get(master_handler))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Binds `bind:port` and serves the API until the process exits.
pub async fn start_server(bind: &str, port: u16, state: AppState) -> Result<(), anyhow::Error> {
    let app = build_router(state);
    let address = format!("{}:{}", bind, port);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind server to {}: {}", address, e))?;

    info!("ZIP code server listening on http://{}/", address);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    info!(
        "{} {} {} {:.1}ms",
        method,
        path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    response
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else {
        "unknown panic"
    };
    error!("Request handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal Server Error" })),
    )
        .into_response()
}
