//! conduit/crates/api-adapters/src/lib.rs
//!
//! HTTP surface of the publishing backend.

#[cfg(feature = "web-axum")]
pub mod web;

pub mod metrics;

#[cfg(feature = "web-axum")]
pub use web::{router, AppState};
