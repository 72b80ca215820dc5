//! # Core Traits (Ports)
//!
//! Any adapter must implement these traits to be wired by the binary.

use async_trait::async_trait;

use crate::error::{DomainError, StoreError};
use crate::graph::{GraphValue, Params, ResultSet};
use crate::models::Claims;

/// A parameterized Cypher statement. User input only ever travels in
/// `params`, never in `text`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    pub text: String,
    pub params: Params,
    /// Target database; `None` runs on the executor's default.
    pub database: Option<String>,
}

impl Statement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Params::new(),
            database: None,
        }
    }

    pub fn database(mut self, name: impl Into<String>) -> Self {
        self.database = Some(name.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<GraphValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<GraphValue>) {
        self.params.insert(key.into(), value.into());
    }
}

/// Graph database execution contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait GraphExecutor: Send + Sync {
    /// Runs a statement in a read-only session.
    async fn read(&self, statement: Statement) -> Result<ResultSet, StoreError>;

    /// Runs a statement in a write session.
    async fn write(&self, statement: Statement) -> Result<ResultSet, StoreError>;
}

/// One-way password hashing.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, DomainError>;

    /// `false` for a mismatch and for an unparseable stored hash alike.
    fn verify(&self, plain: &str, hash: &str) -> bool;
}

/// Bearer token issuance and verification.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, claims: &Claims) -> Result<String, DomainError>;

    /// Returns the claims of a valid token, `Unauthorized` otherwise.
    fn verify(&self, token: &str) -> Result<Claims, DomainError>;
}
