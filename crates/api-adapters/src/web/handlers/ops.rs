//! Health, metrics and the catch-all 404.

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Json, Response};
use domains::DomainError;
use serde_json::{json, Value};

use crate::metrics::CONTENT_TYPE as OPENMETRICS;
use crate::web::error::ApiError;
use crate::web::AppState;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

pub async fn metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let text = state
        .metrics
        .encode()
        .map_err(|e| DomainError::internal(format!("metrics encoding: {e}")))?;
    Ok(([(CONTENT_TYPE, OPENMETRICS)], text).into_response())
}

pub async fn not_found() -> ApiError {
    ApiError(DomainError::not_found("route"))
}
