//! Storage configuration read from the process environment.

use std::env;
use std::time::Duration;

use crate::error::{DatabaseError, Result};

/// Connection string used when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://./sql_app.db";

/// Default pool size for database connections.
pub const DEFAULT_POOL_SIZE: u32 = 20;

/// Default time to wait for a free pooled connection.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Backing store selected by a connection string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Embedded single-file (or in-memory) SQLite store.
    Sqlite,
}

impl Backend {
    /// Classify a connection string by its scheme.
    pub fn from_url(url: &str) -> Result<Self> {
        if url.starts_with("sqlite:") {
            Ok(Backend::Sqlite)
        } else {
            let scheme = url.split(':').next().unwrap_or(url);
            Err(DatabaseError::UnsupportedBackend(scheme.to_string()))
        }
    }
}

/// Connection settings for the shared pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Connection string, already normalized to the sqlx form.
    pub url: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
    /// How long a request waits for a connection before failing.
    pub acquire_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_POOL_SIZE,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }
}

impl DatabaseConfig {
    /// Build a config for `url` with default pool settings.
    pub fn new(url: &str) -> Self {
        Self {
            url: normalize_url(url),
            ..Self::default()
        }
    }

    /// Read `DATABASE_URL`, `DATABASE_POOL_SIZE` and
    /// `DATABASE_ACQUIRE_TIMEOUT_SECS`, falling back to the local file store.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup, applying the same defaults as
    /// [`DatabaseConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let max_connections = match lookup("DATABASE_POOL_SIZE") {
            Some(value) => parse_var("DATABASE_POOL_SIZE", &value)?,
            None => DEFAULT_POOL_SIZE,
        };

        let acquire_timeout = match lookup("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(parse_var("DATABASE_ACQUIRE_TIMEOUT_SECS", &value)?),
            None => DEFAULT_ACQUIRE_TIMEOUT,
        };

        Ok(Self {
            url: normalize_url(&url),
            max_connections,
            acquire_timeout,
        })
    }

    /// Backend the connection string points at.
    pub fn backend(&self) -> Result<Backend> {
        Backend::from_url(&self.url)
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| DatabaseError::InvalidConfig {
        key,
        value: value.to_string(),
    })
}

/// Rewrite `sqlite:///relative/path` (three slashes, relative path) into the
/// `sqlite://relative/path` form sqlx understands. Four slashes keep the
/// absolute path.
fn normalize_url(url: &str) -> String {
    let url = url.trim();
    match url.strip_prefix("sqlite:///") {
        Some(rest) => format!("sqlite://{}", rest),
        None => url.to_string(),
    }
}
