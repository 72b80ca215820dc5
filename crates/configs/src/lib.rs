//! conduit/crates/configs/src/lib.rs
//!
//! Layered settings: built-in defaults, then `config/default.toml`, then
//! `config/{CONDUIT_ENV}.toml`, then `CONDUIT__SECTION__KEY` environment
//! variables. A `.env` file is read into the environment first.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use tracing::debug;

fn secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Mount point of the API routes.
    pub api_prefix: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            api_prefix: "/api".into(),
        }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Neo4jSettings {
    /// Bolt URI of the server.
    pub url: String,
    pub username: String,
    #[serde(deserialize_with = "secret")]
    pub password: SecretString,
    pub database: String,
    pub max_connections: usize,
    /// Rows pulled per round trip.
    pub fetch_size: usize,
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            url: "bolt://localhost:7687".into(),
            username: "neo4j".into(),
            password: String::new().into(),
            database: "neo4j".into(),
            max_connections: 16,
            fetch_size: 200,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    #[serde(deserialize_with = "secret")]
    pub jwt_secret: SecretString,
    pub token_ttl_secs: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new().into(),
            token_ttl_secs: 86_400,
        }
    }
}

/// Which graph metadata responses reveal.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct MarshalSettings {
    /// Emit `_labels` on nodes and `_type` on relationships.
    pub reveal_labels: bool,
    /// Emit `_id` on nodes and relationships.
    pub reveal_identity: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: String,
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info,conduit=debug".into(),
            json: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub neo4j: Neo4jSettings,
    pub auth: AuthSettings,
    pub marshal: MarshalSettings,
    pub log: LogSettings,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        let env = std::env::var("CONDUIT_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                config::Environment::with_prefix("CONDUIT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );
        Self::build(builder)
    }

    /// Settings from a TOML document alone, defaults filling the gaps.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml));
        Self::build(builder)
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::Invalid("auth.jwt_secret must be set".into()));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must not be 0".into()));
        }
        if self.neo4j.database.trim().is_empty() {
            return Err(ConfigError::Invalid("neo4j.database must not be empty".into()));
        }
        if self.neo4j.max_connections == 0 {
            return Err(ConfigError::Invalid("neo4j.max_connections must be at least 1".into()));
        }
        if !self.server.api_prefix.is_empty() && !self.server.api_prefix.starts_with('/') {
            return Err(ConfigError::Invalid("server.api_prefix must start with '/'".into()));
        }
        Ok(())
    }
}
