//! The single place where graph values become JSON.
//!
//! Handlers return [`Native`], which parks its [`GraphValue`] in the
//! response extensions. [`to_native_response`] picks it up after the
//! handler ran and writes the converted body, using the visibility flags
//! from [`AppState`].

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use domains::{to_native, DomainError, GraphValue};

use super::error::ApiError;
use super::AppState;

#[derive(Debug, Clone)]
struct GraphPayload(GraphValue);

/// A handler result still in graph form.
#[derive(Debug)]
pub struct Native {
    status: StatusCode,
    value: GraphValue,
}

impl Native {
    pub fn new(status: StatusCode, value: GraphValue) -> Self {
        Self { status, value }
    }

    pub fn ok(value: GraphValue) -> Self {
        Self::new(StatusCode::OK, value)
    }

    pub fn created(value: GraphValue) -> Self {
        Self::new(StatusCode::CREATED, value)
    }

    pub fn accepted(value: GraphValue) -> Self {
        Self::new(StatusCode::ACCEPTED, value)
    }
}

/// `{key: value}`, the envelope every resource response uses.
pub fn envelope(key: &str, value: GraphValue) -> GraphValue {
    GraphValue::map([(key, value)])
}

impl IntoResponse for Native {
    fn into_response(self) -> Response {
        let mut response = self.status.into_response();
        response.extensions_mut().insert(GraphPayload(self.value));
        response
    }
}

pub async fn to_native_response(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let Some(GraphPayload(value)) = response.extensions_mut().remove::<GraphPayload>() else {
        return response;
    };

    let body = match serde_json::to_vec(&to_native(&value, state.disclosure)) {
        Ok(body) => body,
        Err(e) => {
            return ApiError(DomainError::internal(format!("response encoding: {e}")))
                .into_response()
        }
    };
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(CONTENT_LENGTH);
    parts
        .headers
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Response::from_parts(parts, Body::from(body))
}
