//! # DomainError
//!
//! Centralized error handling for the publishing core.
//! Maps storage failures to actionable, client-safe error kinds.

use std::fmt;

use thiserror::Error;

/// One caller-supplied field that failed a shape check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// The primary error type for all core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// The targeted entity (article slug, comment id, username) does not exist,
    /// or the caller is not on the ownership path to it.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// A write hit a uniqueness constraint.
    #[error("{field} already taken")]
    AlreadyTaken { field: String },

    /// A write omitted a mandatory property.
    #[error("{field} should not be empty")]
    Required { field: String },

    /// Payload rejected before reaching the database.
    #[error("validation failed: {}", join(.0))]
    Validation(Vec<FieldError>),

    /// No identity, or credentials did not match.
    #[error("unauthorized")]
    Unauthorized,

    /// Anything else; the detail is for logs only.
    #[error("internal error: {0}")]
    Internal(String),
}

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl DomainError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// A specialized Result type for core logic.
pub type Result<T> = std::result::Result<T, DomainError>;

/// Failure reported by a graph executor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The database rejected the statement.
    #[error("query failed ({}): {message}", code.as_deref().unwrap_or("no code"))]
    Query {
        code: Option<String>,
        message: String,
    },

    /// Could not reach the database or read its response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response contained a shape the value model does not know.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Status code the database attaches to every constraint violation.
pub const CONSTRAINT_VIOLATION_CODE: &str = "Neo.ClientError.Schema.ConstraintValidationFailed";

const UNIQUE_MARKER: &str = "already exists with";
const REQUIRED_MARKER: &str = "must have the property";

/// Classification happens once, here. A structured status code decides
/// whether this is a constraint violation at all; when the database sent
/// none, the message text is the only signal. Which constraint was hit is
/// always read from the message, because the status code does not say.
impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        let StoreError::Query { code, message } = &err else {
            return DomainError::Internal(err.to_string());
        };

        if let Some(code) = code {
            if code != CONSTRAINT_VIOLATION_CODE {
                return DomainError::Internal(err.to_string());
            }
        }

        let field = offending_property(message);
        match field {
            Some(field) if message.contains(UNIQUE_MARKER) => DomainError::AlreadyTaken { field },
            Some(field) if message.contains(REQUIRED_MARKER) => DomainError::Required { field },
            _ => DomainError::Internal(err.to_string()),
        }
    }
}

/// The second back-quoted token: "Node(1) already exists with label `User`
/// and property `email` = 'a@b.c'" names the label first, then the property.
fn offending_property(message: &str) -> Option<String> {
    message
        .split('`')
        .skip(1)
        .step_by(2)
        .nth(1)
        .filter(|token| !token.is_empty() && token.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_string)
}
