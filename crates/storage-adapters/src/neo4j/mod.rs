//! # Neo4j adapter
//!
//! Implements [`GraphExecutor`] over Bolt with the `neo4rs` driver.
//! Parameters and rows are translated by [`bolt`].

mod bolt;

use async_trait::async_trait;
use domains::{GraphExecutor, ResultSet, Statement, StoreError};
use neo4rs::{ConfigBuilder, Graph, Query};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};

pub use bolt::{decode_bolt, decode_rows, to_bolt};

/// Connection settings for [`Neo4jGraph`].
#[derive(Debug)]
pub struct Neo4jConfig {
    /// Bolt URI, e.g. `bolt://localhost:7687`.
    pub uri: String,
    pub username: String,
    pub password: SecretString,
    /// Default database for statements that do not name one.
    pub database: String,
    pub max_connections: usize,
    pub fetch_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
}

/// Graph executor backed by a Neo4j server. The driver pools
/// connections; share one instance behind an `Arc`.
pub struct Neo4jGraph {
    graph: Graph,
    database: String,
}

impl Neo4jGraph {
    pub async fn connect(config: Neo4jConfig) -> Result<Self, StoreError> {
        let driver_config = ConfigBuilder::new()
            .uri(config.uri.as_str())
            .user(config.username.as_str())
            .password(config.password.expose_secret())
            .db(config.database.as_str())
            .max_connections(config.max_connections)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(store_error)?;
        let graph = Graph::connect(driver_config).await.map_err(store_error)?;

        Ok(Self {
            graph,
            database: config.database,
        })
    }

    #[instrument(
        skip(self, statement),
        fields(mode = ?mode, database = %target_database(&statement, &self.database))
    )]
    async fn run(&self, statement: Statement, mode: AccessMode) -> Result<ResultSet, StoreError> {
        // Parameters may carry password hashes; only the text is logged.
        debug!(query = %statement.text, "running statement");
        let database = target_database(&statement, &self.database);

        let result = self.fetch(database, query(&statement)).await;
        if let Err(err) = &result {
            warn!(error = %err, "statement failed");
        }
        result
    }

    async fn fetch(&self, database: &str, query: Query) -> Result<ResultSet, StoreError> {
        let mut stream = self
            .graph
            .execute_on(database, query)
            .await
            .map_err(store_error)?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await.map_err(store_error)? {
            rows.push(row);
        }
        decode_rows(rows)
    }
}

#[async_trait]
impl GraphExecutor for Neo4jGraph {
    async fn read(&self, statement: Statement) -> Result<ResultSet, StoreError> {
        self.run(statement, AccessMode::Read).await
    }

    async fn write(&self, statement: Statement) -> Result<ResultSet, StoreError> {
        self.run(statement, AccessMode::Write).await
    }
}

/// The statement's own database wins over the configured default.
pub fn target_database<'a>(statement: &'a Statement, default: &'a str) -> &'a str {
    statement.database.as_deref().unwrap_or(default)
}

fn query(statement: &Statement) -> Query {
    Query::new(statement.text.clone()).params(
        statement
            .params
            .iter()
            .map(|(key, value)| (key.as_str(), bolt::to_bolt(value))),
    )
}

/// Server failures keep their status code so the domain layer can
/// classify them; everything else is a transport or decode problem.
fn store_error(err: neo4rs::Error) -> StoreError {
    match err {
        neo4rs::Error::Neo4j(e) => StoreError::Query {
            code: Some(e.code().to_string()),
            message: e.message().to_string(),
        },
        neo4rs::Error::DeserializationError(e) => StoreError::Decode(e.to_string()),
        neo4rs::Error::ConversionError => StoreError::Decode("conversion error".into()),
        other => StoreError::Transport(other.to_string()),
    }
}
