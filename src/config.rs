use crate::error::{BridgeError, Result};
use config::{Config as ConfigBuilder, ConfigError, File};
use serde::Deserialize;
use std::env;
use std::path::Path;

pub const DEFAULT_URI: &str = "bolt://localhost:7687";
pub const DEFAULT_USER: &str = "neo4j";
pub const DEFAULT_DATABASE: &str = "neo4j";

const DEFAULT_FETCH_SIZE: usize = 500;

/// Connection settings for the facade.
///
/// Resolution order per field: explicit value, then the `NEO4J_*`
/// environment variable, then an optional `config.toml`, then the
/// hardcoded default. The password has no default. All four string
/// fields must be non-empty before a handle is opened; `validate`
/// enforces this.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub fetch_size: usize,
    pub pool: PoolOptions,
}

/// Tunables for the connection pool backing the handle.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolOptions {
    pub max_size: usize,
    pub connection_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            user: DEFAULT_USER.to_string(),
            password: String::new(),
            database: DEFAULT_DATABASE.to_string(),
            fetch_size: DEFAULT_FETCH_SIZE,
            pool: PoolOptions::default(),
        }
    }
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_size: 10,
            connection_timeout_secs: 30,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
        }
    }
}

impl ConnectionConfig {
    /// Resolve a configuration from optional explicit values, falling
    /// back to environment variables and defaults per field.
    ///
    /// This is the one place resolution happens; the facade itself only
    /// ever sees the fully-populated result.
    pub fn resolve(
        uri: Option<String>,
        auth: Option<(String, String)>,
        database: Option<String>,
    ) -> Result<Self> {
        let mut cfg = Self::default();
        cfg.merge_env();
        if let Some(uri) = uri {
            cfg.uri = uri;
        }
        if let Some((user, password)) = auth {
            cfg.user = user;
            cfg.password = password;
        }
        if let Some(database) = database {
            cfg.database = database;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Resolve entirely from `NEO4J_*` environment variables, loading a
    /// `.env` file first when one is present.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::resolve(None, None, None)
    }

    /// Load from an optional `config.toml` in `dir` (its `[connection]`
    /// table), with environment variables taking precedence over the
    /// file.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        dotenv::dotenv().ok();

        let mut cfg = Self::default();
        let config_file = dir.join("config.toml");
        if config_file.exists() {
            let loaded = ConfigBuilder::builder()
                .add_source(File::from(config_file))
                .build()
                .map_err(|e| BridgeError::Configuration(format!("invalid config file: {e}")))?;
            match loaded.get::<ConnectionConfig>("connection") {
                Ok(section) => cfg = section,
                Err(ConfigError::NotFound(_)) => {}
                Err(e) => {
                    return Err(BridgeError::Configuration(format!(
                        "invalid [connection] table: {e}"
                    )));
                }
            }
        }

        cfg.merge_env();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Overlay `NEO4J_*` environment variables onto this configuration.
    fn merge_env(&mut self) {
        if let Ok(uri) = env::var("NEO4J_URI") {
            self.uri = uri;
        }
        if let Ok(user) = env::var("NEO4J_USER") {
            self.user = user;
        }
        if let Ok(password) = env::var("NEO4J_PASSWORD") {
            self.password = password;
        }
        if let Ok(database) = env::var("NEO4J_DATABASE") {
            self.database = database;
        }
        if let Ok(fetch_size) = env::var("NEO4J_FETCH_SIZE") {
            if let Ok(n) = fetch_size.parse() {
                self.fetch_size = n;
            }
        }
        if let Ok(max_connections) = env::var("NEO4J_MAX_CONNECTIONS") {
            if let Ok(n) = max_connections.parse() {
                self.pool.max_size = n;
            }
        }
    }

    /// Enforce the non-empty invariant on the required fields.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("uri", &self.uri, "NEO4J_URI"),
            ("user", &self.user, "NEO4J_USER"),
            ("password", &self.password, "NEO4J_PASSWORD"),
            ("database", &self.database, "NEO4J_DATABASE"),
        ];
        for (field, value, var) in fields {
            if value.is_empty() {
                return Err(BridgeError::Configuration(format!(
                    "missing required setting `{field}` (set {var})"
                )));
            }
        }
        Ok(())
    }

    /// Set the per-connection fetch size.
    pub fn with_fetch_size(mut self, size: usize) -> Self {
        self.fetch_size = size;
        self
    }

    /// Set the maximum number of pooled connections.
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.pool.max_size = max;
        self
    }
}
