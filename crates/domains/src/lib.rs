//! conduit/crates/domains/src/lib.rs
//!
//! The pure core of the publishing backend: the raw graph value model,
//! native value conversion, view-models and the ports adapters implement.
//! Nothing in this crate performs I/O.

pub mod convert;
pub mod error;
pub mod graph;
pub mod models;
pub mod ports;
pub mod slug;

// Re-exporting for easier access in other crates
pub use convert::{to_native, Disclosure};
pub use error::{DomainError, FieldError, Result, StoreError};
pub use graph::{GraphValue, Node, Params, Properties, Record, Relationship, ResultSet};
pub use models::*;
pub use ports::*;
