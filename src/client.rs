//! Managed connection facade over the bolt driver.

use crate::config::ConnectionConfig;
use crate::db::manager::{SENTINEL_FIELD, SENTINEL_QUERY, SENTINEL_VALUE};
use crate::db::pool::{ConnectionPool, PoolStats};
use crate::error::{BridgeError, Result};
use arc_swap::ArcSwapOption;
use neo4rs::{Query, Row};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Facade over a pooled connection handle to one Neo4j database.
///
/// The client is either open or closed; [`GraphClient::close`] moves it
/// to closed, a terminal state. Construction performs no I/O —
/// connections are opened on first use, so network and auth failures
/// surface from the first operation as [`BridgeError::Connection`].
///
/// A shared reference can be used from any number of tasks without
/// external locking: the only mutable state is the swappable handle
/// slot. `close` does not wait for in-flight operations; they keep
/// their own reference to the pool and run to completion.
pub struct GraphClient {
    pool: ArcSwapOption<ConnectionPool>,
    uri: String,
    database: String,
}

impl fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphClient")
            .field("uri", &self.uri)
            .field("database", &self.database)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl GraphClient {
    /// Create a client from an already resolved configuration.
    ///
    /// Fails with [`BridgeError::Configuration`] when a required field
    /// is empty. Must be called from within a Tokio runtime.
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        info!(uri = %config.uri, database = %config.database, "creating graph client");

        let pool = ConnectionPool::new(&config);
        Ok(Self {
            pool: ArcSwapOption::from_pointee(pool),
            uri: config.uri,
            database: config.database,
        })
    }

    /// Create a client from `NEO4J_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ConnectionConfig::from_env()?)
    }

    fn handle(&self) -> Result<Arc<ConnectionPool>> {
        self.pool.load_full().ok_or(BridgeError::Closed)
    }

    /// Run a read query and materialize every record.
    ///
    /// Parameters travel on the query itself:
    /// `query("MATCH ...").param("name", value)`. The session returns
    /// to the pool on every exit path.
    #[instrument(skip(self, q), fields(database = %self.database))]
    pub async fn read(&self, q: Query) -> Result<Vec<Row>> {
        let pool = self.handle()?;
        let session = pool.get().await?;

        let mut stream = session.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        debug!(rows = rows.len(), "read complete");
        Ok(rows)
    }

    /// Run a mutating query, draining its result before returning.
    ///
    /// Draining forces server-side failures such as constraint
    /// violations to surface from this call rather than a later one.
    #[instrument(skip(self, q), fields(database = %self.database))]
    pub async fn write(&self, q: Query) -> Result<()> {
        let pool = self.handle()?;
        let session = pool.get().await?;

        let mut stream = session.execute(q).await?;
        while stream.next().await?.is_some() {}
        debug!("write complete");
        Ok(())
    }

    /// Round-trip the sentinel query.
    ///
    /// `true` iff a record came back carrying the expected sentinel
    /// value. Every failure, including use after `close`, is absorbed
    /// into `false`; this call never returns an error.
    #[instrument(skip(self), fields(database = %self.database))]
    pub async fn health_check(&self) -> bool {
        match self.sentinel_round_trip().await {
            Ok(healthy) => healthy,
            Err(e) => {
                warn!("health check failed: {e}");
                false
            }
        }
    }

    async fn sentinel_round_trip(&self) -> Result<bool> {
        let pool = self.handle()?;
        let session = pool.get().await?;

        let mut stream = session.execute(neo4rs::query(SENTINEL_QUERY)).await?;
        match stream.next().await? {
            Some(row) => Ok(row
                .get::<i64>(SENTINEL_FIELD)
                .map(|v| v == SENTINEL_VALUE)
                .unwrap_or(false)),
            None => Ok(false),
        }
    }

    /// Release the handle and all pooled connections.
    ///
    /// Idempotent. Subsequent `read`/`write` calls fail with
    /// [`BridgeError::Closed`]; `health_check` reports `false`.
    pub fn close(&self) {
        if self.pool.swap(None).is_some() {
            info!(uri = %self.uri, "graph client closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.pool.load().is_none()
    }

    /// Occupancy of the underlying pool, `None` once closed.
    pub fn pool_stats(&self) -> Option<PoolStats> {
        self.pool.load_full().map(|pool| pool.stats())
    }
}
