//! Managed connection facade for Neo4j.
//!
//! Resolves connection settings once (explicit arguments, `NEO4J_*`
//! environment variables, defaults), owns a lazily-opened pooled handle
//! to the server, and exposes read, write, health check and close.

pub mod client;
pub mod config;
pub mod db;
pub mod error;

pub use client::GraphClient;
pub use config::{ConnectionConfig, PoolOptions};
pub use db::pool::{ConnectionPool, PoolError, PoolStats};
pub use error::{BridgeError, Result};

// Query building and row access happen through the driver's types.
pub use neo4rs::{Query, Row, query};
