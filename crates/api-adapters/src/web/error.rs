//! Maps [`DomainError`] onto status codes and the client-facing error
//! bodies. Internal detail is logged, never returned.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use domains::{DomainError, FieldError};
use serde_json::{json, Map, Value};
use tracing::{error, warn};

#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

/// Malformed bodies are reported like any other validation failure.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(DomainError::invalid("body", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(DomainError::invalid("query", rejection.body_text()))
    }
}

fn plain(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "code": status.as_u16(), "message": message }))).into_response()
}

fn bad_request(message: String) -> Response {
    let body = json!({
        "statusCode": 400,
        "error": "Bad Request",
        "message": [message],
    });
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn unprocessable(errors: &[FieldError]) -> Response {
    let errors: Vec<Value> = errors
        .iter()
        .map(|e| {
            let mut entry = Map::new();
            entry.insert(e.field.clone(), Value::String(e.message.clone()));
            Value::Object(entry)
        })
        .collect();
    (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "errors": errors }))).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            DomainError::NotFound { .. } => plain(StatusCode::NOT_FOUND, "Not Found"),
            DomainError::AlreadyTaken { .. } | DomainError::Required { .. } => {
                warn!(error = %self.0, "constraint violation");
                bad_request(self.0.to_string())
            }
            DomainError::Validation(errors) => unprocessable(errors),
            DomainError::Unauthorized => plain(StatusCode::UNAUTHORIZED, "Unauthorized"),
            DomainError::Internal(detail) => {
                error!(%detail, "request failed");
                plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }
}
