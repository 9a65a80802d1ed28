//! Taskboard settings, read from `TASKBOARD__*` environment variables.
//!
//! A double underscore separates nesting, so `TASKBOARD__SERVER__PORT`
//! becomes `server.port`. A `.env` file in the working directory is read
//! first when present. Only `TASKBOARD__DATABASE__URL` is required.
//!
//! ```no_run
//! use taskboard::config::AppConfig;
//!
//! let config = AppConfig::load()?;
//! config.validate()?;
//! # Ok::<(), taskboard::config::ConfigError>(())
//! ```

mod database;
mod error;
mod realtime;
mod security;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use realtime::RealtimeConfig;
pub use security::SecurityConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

const ENV_PREFIX: &str = "TASKBOARD";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// No default: the service cannot run without its tables.
    pub database: DatabaseConfig,
    #[serde(default)]
    pub realtime: RealtimeConfig,
    #[serde(default)]
    pub security: SecurityConfig,
}

impl AppConfig {
    /// Reads `.env`, then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env(None)
    }

    /// Reads settings from `vars` in place of the process environment.
    /// Keys keep their `TASKBOARD__` prefix.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: config::Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from_env(Some(map))
    }

    fn from_env(source: Option<config::Map<String, String>>) -> Result<Self, ConfigError> {
        let env = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .source(source);

        Ok(config::Config::builder()
            .add_source(env)
            .build()?
            .try_deserialize()?)
    }

    /// Checks every section; the first bad setting wins.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.realtime.validate()?;
        self.security.validate()
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DB: (&str, &str) = ("TASKBOARD__DATABASE__URL", "postgresql://board@db/taskboard");

    fn load(extra: &[(&str, &str)]) -> AppConfig {
        let vars = std::iter::once(DB).chain(extra.iter().copied());
        AppConfig::from_vars(vars).expect("config loads")
    }

    #[test]
    fn database_url_alone_is_enough() {
        let config = load(&[]);
        assert_eq!(config.database.url, "postgresql://board@db/taskboard");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.realtime.channel_capacity, 256);
        assert_eq!(config.security.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn nested_keys_override_defaults() {
        let config = load(&[
            ("TASKBOARD__SERVER__PORT", "3000"),
            ("TASKBOARD__SERVER__ENVIRONMENT", "production"),
            ("TASKBOARD__REALTIME__CHANNEL_CAPACITY", "512"),
            ("TASKBOARD__DATABASE__RUN_MIGRATIONS", "false"),
        ]);
        assert_eq!(config.server.port, 3000);
        assert!(config.is_production());
        assert_eq!(config.realtime.channel_capacity, 512);
        assert!(!config.database.run_migrations);
    }

    #[test]
    fn cors_origins_come_from_a_comma_list() {
        let config = load(&[(
            "TASKBOARD__SERVER__CORS_ORIGINS",
            "https://board.example.com,http://localhost:5173",
        )]);
        assert_eq!(
            config.server.cors_origins,
            vec!["https://board.example.com", "http://localhost:5173"]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_database_section_fails_to_load() {
        let result = AppConfig::from_vars([("TASKBOARD__SERVER__PORT", "3000")]);
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn unprefixed_variables_are_ignored() {
        let result = AppConfig::from_vars([("DATABASE__URL", "postgresql://board@db/taskboard")]);
        assert!(result.is_err());
    }

    #[test]
    fn bad_section_is_reported_by_key() {
        let config = load(&[("TASKBOARD__SECURITY__BCRYPT_COST", "2")]);
        assert!(matches!(
            config.validate(),
            Err(ValidationError::OutOfRange { key: "security.bcrypt_cost", value: 2, .. })
        ));
    }
}
