//! Connection pool backing the facade's handle.
//!
//! Thin wrapper over bb8. Construction performs no I/O; connections are
//! opened on first checkout and validated with the sentinel query
//! before use.

use crate::config::ConnectionConfig;
use crate::db::manager::{BoltConnectionManager, ManagerError};
use bb8::{Pool, PooledConnection, RunError};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("failed to acquire connection: {0}")]
    Acquire(#[from] ManagerError),

    #[error("timed out waiting for a pooled connection")]
    Timeout,
}

/// Snapshot of pool occupancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    pub connections: u32,
    pub idle: u32,
    pub in_use: u32,
    pub max_size: u32,
}

/// Pool of driver connections, all bound to one target database.
#[derive(Debug, Clone)]
pub struct ConnectionPool {
    pool: Pool<BoltConnectionManager>,
    max_size: u32,
}

impl ConnectionPool {
    /// Build the pool without opening any connection. Must be called
    /// from within a Tokio runtime.
    pub fn new(config: &ConnectionConfig) -> Self {
        let max_size = config.pool.max_size as u32;
        debug!(
            max_size,
            connection_timeout_secs = config.pool.connection_timeout_secs,
            "creating connection pool"
        );

        let manager = BoltConnectionManager::new(config);
        let pool = Pool::builder()
            .max_size(max_size)
            .connection_timeout(Duration::from_secs(config.pool.connection_timeout_secs))
            .idle_timeout(Some(Duration::from_secs(config.pool.idle_timeout_secs)))
            .max_lifetime(Some(Duration::from_secs(config.pool.max_lifetime_secs)))
            .test_on_check_out(true)
            .build_unchecked(manager);

        Self { pool, max_size }
    }

    /// Check out one connection. It returns to the pool when dropped,
    /// on every exit path.
    pub async fn get(&self) -> Result<PooledConnection<'_, BoltConnectionManager>, PoolError> {
        match self.pool.get().await {
            Ok(conn) => Ok(conn),
            Err(RunError::User(e)) => {
                warn!("connection checkout failed: {e}");
                Err(PoolError::Acquire(e))
            }
            Err(RunError::TimedOut) => {
                warn!("connection checkout timed out");
                Err(PoolError::Timeout)
            }
        }
    }

    pub fn stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections: state.connections,
            idle: state.idle_connections,
            in_use: state.connections - state.idle_connections,
            max_size: self.max_size,
        }
    }
}
