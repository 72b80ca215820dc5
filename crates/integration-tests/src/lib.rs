//! Shared fixtures for the cross-crate tests.
//!
//! [`ReplayGraph`] answers statements with canned driver rows and runs
//! them through the real Bolt decoder, so services and routes see exactly
//! what a Neo4j server would hand them.

use std::sync::Arc;

use api_adapters::{router, AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use domains::{
    Disclosure, GraphExecutor, PasswordHasher, ResultSet, Statement, StoreError, TokenIssuer,
};
use http_body_util::BodyExt;
use neo4rs::{BoltType, Row};
use serde_json::Value;
use services::AppServices;
use storage_adapters::neo4j::decode_rows;
use tower::ServiceExt;

/// Field names plus one value list per row, as the server streams them.
#[derive(Debug, Clone, Default)]
pub struct Replay {
    pub fields: Vec<String>,
    pub rows: Vec<Vec<BoltType>>,
}

impl Replay {
    pub fn new(fields: &[&str], rows: Vec<Vec<BoltType>>) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            rows,
        }
    }
}

/// An empty result.
pub fn no_rows() -> Replay {
    Replay::default()
}

type Responder = dyn Fn(&Statement) -> Replay + Send + Sync;

/// Graph executor that replays canned driver rows.
pub struct ReplayGraph {
    respond: Box<Responder>,
}

impl ReplayGraph {
    pub fn new(respond: impl Fn(&Statement) -> Replay + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
        }
    }

    fn replay(&self, statement: &Statement) -> Result<ResultSet, StoreError> {
        let Replay { fields, rows } = (self.respond)(statement);
        let names: Vec<BoltType> = fields.iter().map(|f| BoltType::from(f.as_str())).collect();
        let rows = rows
            .into_iter()
            .map(|values| Row::new(names.clone().into(), values.into()))
            .collect();
        decode_rows(rows)
    }
}

#[async_trait]
impl GraphExecutor for ReplayGraph {
    async fn read(&self, statement: Statement) -> Result<ResultSet, StoreError> {
        self.replay(&statement)
    }

    async fn write(&self, statement: Statement) -> Result<ResultSet, StoreError> {
        self.replay(&statement)
    }
}

/// Bolt value builders.
pub mod bolt {
    use chrono::{DateTime, NaiveDateTime};
    use neo4rs::{BoltInteger, BoltMap, BoltNode, BoltNull, BoltString, BoltType};

    pub fn string(value: &str) -> BoltType {
        BoltType::from(value)
    }

    pub fn integer(value: i64) -> BoltType {
        BoltType::from(value)
    }

    pub fn boolean(value: bool) -> BoltType {
        BoltType::from(value)
    }

    pub fn null() -> BoltType {
        BoltType::Null(BoltNull)
    }

    pub fn datetime(rfc3339: &str) -> BoltType {
        BoltType::from(DateTime::parse_from_rfc3339(rfc3339).expect("valid timestamp"))
    }

    /// Wall-clock time in a named zone, e.g. `("2024-01-01T09:00:00", "Europe/Paris")`.
    pub fn zoned(local: &str, zone: &str) -> BoltType {
        let local = NaiveDateTime::parse_from_str(local, "%Y-%m-%dT%H:%M:%S")
            .expect("valid local timestamp");
        BoltType::from((local, zone))
    }

    pub fn list(items: Vec<BoltType>) -> BoltType {
        BoltType::List(items.into())
    }

    pub fn map(entries: Vec<(&str, BoltType)>) -> BoltType {
        BoltType::Map(entries_of(entries))
    }

    fn entries_of(entries: Vec<(&str, BoltType)>) -> BoltMap {
        entries
            .into_iter()
            .map(|(key, value)| (BoltString::from(key), value))
            .collect()
    }

    pub fn node(id: i64, label: &str, properties: Vec<(&str, BoltType)>) -> BoltType {
        BoltType::Node(BoltNode::new(
            BoltInteger::new(id),
            vec![string(label)].into(),
            entries_of(properties),
        ))
    }

    /// A `User` node; `id` doubles as the node's identity.
    pub fn user(id: i64, username: &str, password_hash: &str) -> BoltType {
        node(
            id,
            "User",
            vec![
                ("id", string(&format!("id-{username}"))),
                ("username", string(username)),
                ("email", string(&format!("{username}@example.com"))),
                ("password", string(password_hash)),
                ("bio", null()),
                ("createdAt", datetime("2024-01-02T03:04:05Z")),
            ],
        )
    }
}

pub fn app(
    graph: impl GraphExecutor + 'static,
    hasher: impl PasswordHasher + 'static,
    tokens: impl TokenIssuer + 'static,
    disclosure: Disclosure,
) -> Router {
    let services = AppServices::new(Arc::new(graph), Arc::new(hasher), Arc::new(tokens));
    router(AppState::new(services, disclosure), "/api")
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
    }
    let body = match body {
        Some(body) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("valid request")
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("infallible router");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("readable body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, body)
}
