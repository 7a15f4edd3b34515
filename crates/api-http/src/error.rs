//! HTTP Error Mapping
//!
//! Maps application errors to status codes with a `{"error": "..."}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use jetsite_core::error::AppError;
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Unauthorized,
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => msg,
            ApiError::Unauthorized => "Invalid API key",
            // Details stay in the log
            ApiError::Internal(_) => "Internal server error",
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation(msg) => ApiError::BadRequest(msg),
            AppError::Domain(e) => ApiError::BadRequest(e.to_string()),
            AppError::Serialization(e) => ApiError::BadRequest(e.to_string()),
            AppError::NotFound(msg) => ApiError::NotFound(msg),
            AppError::Io(e) => ApiError::Internal(e.to_string()),
            AppError::Config(msg) | AppError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            error!(error = %detail, "Request failed");
        }
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}
