//! Tests for reading the server configuration.

use court_planner::{ConfigError, ServerConfig};
use std::collections::HashMap;
use std::time::Duration;

fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ServerConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn defaults_when_unset() {
    assert_eq!(config(&[]), Ok(ServerConfig::default()));
    let defaults = ServerConfig::default();
    assert_eq!(defaults.port, 8080);
    assert_eq!(defaults.inactivity_timeout, Duration::from_secs(12 * 3600));
}

#[test]
fn reads_overrides() {
    let cfg = config(&[
        ("HOST", "127.0.0.1"),
        ("PORT", "9000"),
        ("INACTIVITY_TIMEOUT_HOURS", "2"),
        ("CLEANUP_INTERVAL_MINUTES", " 5 "),
    ])
    .unwrap();
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.inactivity_timeout, Duration::from_secs(2 * 3600));
    assert_eq!(cfg.cleanup_interval, Duration::from_secs(5 * 60));
}

#[test]
fn rejects_bad_values() {
    assert_eq!(
        config(&[("PORT", "eighty")]),
        Err(ConfigError::InvalidValue {
            key: "PORT",
            value: "eighty".to_string()
        })
    );
    assert!(config(&[("CLEANUP_INTERVAL_MINUTES", "0")]).is_err());
}
