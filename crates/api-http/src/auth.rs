//! API-key authentication middleware

use crate::error::ApiError;
use crate::handler::AppState;
use axum::extract::{Query, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Key values that leave the API open (local development)
pub const DEVELOPMENT_KEYS: [&str; 2] = ["your-secret-api-key", "dev-mode"];

#[derive(Debug, Default, Deserialize)]
struct KeyQuery {
    #[serde(rename = "apiKey")]
    api_key: Option<String>,
}

pub fn auth_disabled(configured: &str) -> bool {
    DEVELOPMENT_KEYS.contains(&configured)
}

/// Accept the request when the `X-API-Key` header or `apiKey` query
/// parameter equals the configured key
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if auth_disabled(&state.api_key) {
        return next.run(request).await;
    }

    let from_header = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let presented = from_header.or_else(|| {
        Query::<KeyQuery>::try_from_uri(request.uri())
            .ok()
            .and_then(|Query(q)| q.api_key)
    });

    if presented.as_deref() == Some(state.api_key.as_str()) {
        next.run(request).await
    } else {
        warn!(path = %request.uri().path(), "Rejected request with invalid API key");
        ApiError::Unauthorized.into_response()
    }
}
