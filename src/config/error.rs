//! Configuration error types

use thiserror::Error;

/// Startup failure: either the environment could not be read into
/// [`AppConfig`](super::AppConfig) or a value was out of bounds.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// A loaded setting that the server refuses to start with.
///
/// `key` is the dotted path, e.g. `server.port`, matching
/// `TASKBOARD__SERVER__PORT` in the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{key} must be set")]
    Missing { key: &'static str },

    #[error("{key} = {value} is outside {min}..={max}")]
    OutOfRange {
        key: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("{key} is malformed: {reason}")]
    Malformed { key: &'static str, reason: String },

    #[error("database pool may not keep {min} idle connections with a cap of {max}")]
    PoolBounds { min: u32, max: u32 },
}

impl ValidationError {
    pub(super) fn malformed(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            key,
            reason: reason.into(),
        }
    }

    /// Checks `min <= value <= max`, reporting against `key`.
    pub(super) fn within(
        key: &'static str,
        value: u64,
        min: u64,
        max: u64,
    ) -> Result<(), Self> {
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(Self::OutOfRange {
                key,
                value,
                min,
                max,
            })
        }
    }
}
