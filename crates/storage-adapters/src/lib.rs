//! conduit/crates/storage-adapters/src/lib.rs
//!
//! Implementations of the storage ports defined in `domains`.

#[cfg(feature = "db-neo4j")]
pub mod neo4j;

#[cfg(feature = "db-neo4j")]
pub use neo4j::{Neo4jConfig, Neo4jGraph};
