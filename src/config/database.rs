//! PostgreSQL pool settings

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use super::error::ValidationError;

const POOL_CAP: u32 = 100;

/// Connection pool for the board, task and user tables.
///
/// Every mutation holds one connection for the length of its
/// transaction, so `max_connections` bounds concurrent writers.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `postgres://` connection string. Required.
    pub url: String,
    /// Connections kept open while idle.
    pub min_connections: u32,
    pub max_connections: u32,
    /// How long a request waits for a free connection before failing.
    pub acquire_timeout_secs: u64,
    /// Idle connections above `min_connections` close after this long.
    pub idle_timeout_secs: u64,
    /// Apply `migrations/` at startup.
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            min_connections: 1,
            max_connections: 10,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 300,
            run_migrations: true,
        }
    }
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::Missing { key: "database.url" });
        }
        if !(self.url.starts_with("postgres://") || self.url.starts_with("postgresql://")) {
            return Err(ValidationError::malformed(
                "database.url",
                "expected a postgres:// or postgresql:// URL",
            ));
        }
        ValidationError::within(
            "database.max_connections",
            self.max_connections.into(),
            1,
            POOL_CAP.into(),
        )?;
        if self.min_connections > self.max_connections {
            return Err(ValidationError::PoolBounds {
                min: self.min_connections,
                max: self.max_connections,
            });
        }
        ValidationError::within("database.acquire_timeout_secs", self.acquire_timeout_secs, 1, 60)?;
        Ok(())
    }

    /// The URL with any password replaced, safe to log.
    pub fn redacted_url(&self) -> String {
        let Some((scheme, rest)) = self.url.split_once("://") else {
            return "<unparsed>".to_string();
        };
        match rest.split_once('@') {
            Some((credentials, host)) => {
                let user = credentials.split(':').next().unwrap_or_default();
                format!("{scheme}://{user}:***@{host}")
            }
            None => self.url.clone(),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.redacted_url())
            .field("min_connections", &self.min_connections)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}
