//! Connection manager for the bb8 pool.
//!
//! Opens individual driver connections bound to the configured database
//! and validates them with the sentinel query before they are handed
//! out.

use crate::config::ConnectionConfig;
use async_trait::async_trait;
use bb8::ManageConnection;
use neo4rs::{ConfigBuilder, Graph};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Trivial round trip used to verify connectivity and authentication,
/// independent of application data.
pub(crate) const SENTINEL_QUERY: &str = "RETURN 1 AS ok";
pub(crate) const SENTINEL_FIELD: &str = "ok";
pub(crate) const SENTINEL_VALUE: i64 = 1;

#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("failed to open bolt connection: {0}")]
    Connect(#[from] neo4rs::Error),

    #[error("connection validation failed: {0}")]
    Validation(String),
}

/// Opens, validates and recycles driver connections for the pool.
#[derive(Debug, Clone)]
pub struct BoltConnectionManager {
    uri: String,
    user: String,
    password: String,
    database: String,
    fetch_size: usize,
}

impl BoltConnectionManager {
    pub fn new(config: &ConnectionConfig) -> Self {
        debug!(uri = %config.uri, database = %config.database, "creating bolt connection manager");
        Self {
            uri: config.uri.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
            database: config.database.clone(),
            fetch_size: config.fetch_size,
        }
    }

    fn driver_config(&self) -> Result<neo4rs::Config, ManagerError> {
        ConfigBuilder::default()
            .uri(self.uri.as_str())
            .user(self.user.as_str())
            .password(self.password.as_str())
            .db(self.database.as_str())
            .fetch_size(self.fetch_size)
            .build()
            .map_err(ManagerError::Connect)
    }

    async fn validate(&self, conn: &Graph) -> bool {
        match conn.execute(neo4rs::query(SENTINEL_QUERY)).await {
            Ok(mut stream) => match stream.next().await {
                Ok(Some(_)) => true,
                Ok(None) => {
                    warn!("sentinel query returned no record");
                    false
                }
                Err(e) => {
                    warn!("sentinel query failed while streaming: {e}");
                    false
                }
            },
            Err(e) => {
                warn!("sentinel query failed: {e}");
                false
            }
        }
    }
}

#[async_trait]
impl ManageConnection for BoltConnectionManager {
    type Connection = Graph;
    type Error = ManagerError;

    async fn connect(&self) -> Result<Self::Connection, Self::Error> {
        debug!(uri = %self.uri, "opening bolt connection");
        let config = self.driver_config()?;
        Graph::connect(config).await.map_err(ManagerError::Connect)
    }

    async fn is_valid(&self, conn: &mut Self::Connection) -> Result<(), Self::Error> {
        if self.validate(conn).await {
            Ok(())
        } else {
            Err(ManagerError::Validation(
                "sentinel query failed".to_string(),
            ))
        }
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        // Broken connections are caught by is_valid on checkout.
        false
    }
}

impl fmt::Display for BoltConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BoltConnectionManager(uri={}, database={})",
            self.uri, self.database
        )
    }
}
