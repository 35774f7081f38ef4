use crate::db::pool::PoolError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Error taxonomy of the facade.
///
/// `Configuration` is fatal and surfaces before any I/O. `Connection`
/// and `Query` propagate to the caller without retry; `Query` carries
/// the server's message unmodified. `Closed` marks use after `close`.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("connection error: {0}")]
    Connection(#[from] PoolError),

    #[error("query failed: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("client is closed")]
    Closed,
}
