//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde_json::json;

use crate::error_handling::{DatabaseError, ErrorClass, GeocodeError, PopulateError};

/// Body shape of an error response.
#[derive(Debug, Clone, PartialEq)]
enum Body {
    /// `text/plain` message
    Text(String),
    /// `{"error": message}`
    Json(String),
}

/// An error returned by a request handler.
///
/// Client errors and lookups that find nothing answer with a plain-text
/// message; dependency failures answer with a JSON `{"error": ...}` object.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    status: StatusCode,
    body: Body,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: Body::Text(message.into()),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: Body::Text(message.into()),
        }
    }

    /// 500 with a plain-text message.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: Body::Text(message.into()),
        }
    }

    /// 500 with a JSON `{"error": ...}` body.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: Body::Json(message.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.body {
            Body::Text(message) => (self.status, message).into_response(),
            Body::Json(message) => (self.status, Json(json!({ "error": message }))).into_response(),
        }
    }
}

impl From<GeocodeError> for ApiError {
    fn from(err: GeocodeError) -> Self {
        match (&err, err.class()) {
            (GeocodeError::DatasetUnavailable, _) => {
                Self::unavailable("Failed to fetch master ZIP code data")
            }
            (_, ErrorClass::InvalidInput) => Self::bad_request(err.to_string()),
            (_, ErrorClass::NotFound) => Self::not_found(err.to_string()),
            (_, ErrorClass::Upstream) => {
                error!("Reverse geocoding failed: {}", err);
                Self::internal("Failed to fetch master ZIP code data")
            }
        }
    }
}

impl From<PopulateError> for ApiError {
    fn from(err: PopulateError) -> Self {
        error!("{}", err);
        match err {
            PopulateError::Asset(_) => Self::internal("Failed to fetch CSV file"),
            PopulateError::Ingest(_) => Self::internal("Failed to parse CSV file"),
            PopulateError::Encode(_) | PopulateError::Storage(_) => {
                Self::internal("Failed to store ZIP code data")
            }
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        error!("Store error: {}", err);
        Self::internal("Internal Server Error")
    }
}
