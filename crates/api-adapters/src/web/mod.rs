//! # Axum adapter
//!
//! Routes, shared state and the middleware stack. Route paths and status
//! codes follow the RealWorld API; everything below `api_prefix` speaks
//! JSON envelopes.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod marshal;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{MatchedPath, Request, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, post};
use axum::Router;
use domains::Disclosure;
use services::AppServices;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::metrics::Metrics;
use handlers::{articles, comments, ops, profiles, tags, users};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<AppServices>,
    /// Graph metadata exposed in responses.
    pub disclosure: Disclosure,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(services: AppServices, disclosure: Disclosure) -> Self {
        Self {
            services: Arc::new(services),
            disclosure,
            metrics: Arc::new(Metrics::new()),
        }
    }
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(users::register))
        .route("/users/login", post(users::login))
        .route("/user", get(users::current).put(users::update))
        .route("/profiles/{username}", get(profiles::get_profile))
        .route(
            "/profiles/{username}/follow",
            post(profiles::follow).delete(profiles::unfollow),
        )
        .route("/articles", get(articles::list).post(articles::create))
        .route("/articles/feed", get(articles::feed))
        .route(
            "/articles/{slug}",
            get(articles::get_article)
                .put(articles::update)
                .delete(articles::delete),
        )
        .route(
            "/articles/{slug}/favorite",
            post(articles::favorite).delete(articles::unfavorite),
        )
        .route(
            "/articles/{slug}/comments",
            get(comments::list).post(comments::add),
        )
        .route("/articles/{slug}/comments/{id}", delete(comments::delete))
        .route("/tags", get(tags::list))
}

/// Builds the application router. `api_prefix` of `""` or `"/"` mounts
/// the API at the root.
pub fn router(state: AppState, api_prefix: &str) -> Router {
    let api = match api_prefix.trim_end_matches('/') {
        "" => api_routes(),
        prefix => Router::new().nest(prefix, api_routes()),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    api.route("/health", get(ops::health))
        .route("/metrics", get(ops::metrics))
        .fallback(ops::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), marshal::to_native_response))
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(request).await;
    state
        .metrics
        .record(method.as_str(), &route, response.status().as_u16());
    response
}
