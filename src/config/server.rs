//! HTTP listener and process-level settings

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use tracing_subscriber::EnvFilter;

use super::error::ValidationError;

const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Where the taskboard listens and how the process logs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Literal IP address to bind.
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    /// `tracing` filter directive, used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Bound on one HTTP request. The `/ws` stream outlives it.
    pub request_timeout_secs: u64,
    /// Browser origins allowed by CORS, comma separated in the
    /// environment. Empty allows any origin.
    #[serde(deserialize_with = "comma_separated")]
    pub cors_origins: Vec<String>,
}

/// Deployment flavour. Production switches logs to JSON.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7000,
            environment: Environment::Development,
            log_level: "info,taskboard=debug".to_string(),
            request_timeout_secs: 30,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| ValidationError::malformed("server.host", "not an IP address"))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.socket_addr()?;
        ValidationError::within("server.port", self.port.into(), 1, u16::MAX.into())?;
        ValidationError::within(
            "server.request_timeout_secs",
            self.request_timeout_secs,
            1,
            MAX_REQUEST_TIMEOUT_SECS,
        )?;
        EnvFilter::try_new(&self.log_level)
            .map_err(|e| ValidationError::malformed("server.log_level", e.to_string()))?;
        if let Some(bad) = self
            .cors_origins
            .iter()
            .find(|o| !(o.starts_with("http://") || o.starts_with("https://")))
        {
            return Err(ValidationError::malformed(
                "server.cors_origins",
                format!("{bad:?} is not an http(s) origin"),
            ));
        }
        Ok(())
    }
}

fn comma_separated<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect())
}
