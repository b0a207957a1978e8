//! Server configuration from environment variables.

use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tournaments not accessed for this long are removed.
    pub inactivity_timeout: Duration,
    pub cleanup_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            inactivity_timeout: Duration::from_secs(12 * 3600),
            cleanup_interval: Duration::from_secs(30 * 60),
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
    }
}

impl ServerConfig {
    /// Read `HOST`, `PORT`, `INACTIVITY_TIMEOUT_HOURS` and `CLEANUP_INTERVAL_MINUTES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = parse_or(&lookup, "PORT", defaults.port)?;
        let timeout_hours = parse_or(&lookup, "INACTIVITY_TIMEOUT_HOURS", 12u64)?;
        let cleanup_minutes = parse_or(&lookup, "CLEANUP_INTERVAL_MINUTES", 30u64)?;
        if cleanup_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "CLEANUP_INTERVAL_MINUTES",
                value: "0".to_string(),
            });
        }
        Ok(Self {
            host,
            port,
            inactivity_timeout: Duration::from_secs(timeout_hours * 3600),
            cleanup_interval: Duration::from_secs(cleanup_minutes * 60),
        })
    }
}
