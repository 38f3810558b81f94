//! Configuration module for Heartz Monitor.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::time::Duration;
use thiserror::Error;

/// Upper bound on `HEARTZ_ENDPOINT_COUNT`; every endpoint is fetched in sequence per page load.
pub const MAX_ENDPOINT_COUNT: u32 = 1024;

/// Configuration error types.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Monitor configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// HTTP port for the web server (default: 8080)
    pub http_port: u16,
    /// Overall health endpoint
    pub monitor_url: String,
    /// Lag endpoint prefix; the 1-based endpoint index is appended
    pub lag_base_url: String,
    /// Number of lag endpoints polled per cycle (default: 16)
    pub endpoint_count: u32,
    /// Dashboard password; `None` disables the login gate
    pub password: Option<String>,
    /// Per-request timeout; `None` waits indefinitely
    pub fetch_timeout: Option<Duration>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            monitor_url: "http://localhost:9000/monitor".to_string(),
            lag_base_url: "http://localhost:9000/kafka-lag/".to_string(),
            endpoint_count: 16,
            password: None,
            fetch_timeout: None,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `HEARTZ_HTTP_PORT`: HTTP port (default: 8080)
    /// - `HEARTZ_MONITOR_URL`: overall health endpoint
    /// - `HEARTZ_KAFKA_LAG_BASE_URL`: lag endpoint prefix
    /// - `HEARTZ_ENDPOINT_COUNT`: number of lag endpoints (default: 16, at most 1024)
    /// - `HEARTZ_PASSWORD`: dashboard password (default: unset, no login)
    /// - `HEARTZ_FETCH_TIMEOUT_SECS`: request timeout in seconds (default: unset)
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(port) = lookup("HEARTZ_HTTP_PORT") {
            cfg.http_port = parse_var("HEARTZ_HTTP_PORT", port)?;
        }

        if let Some(url) = lookup("HEARTZ_MONITOR_URL") {
            cfg.monitor_url = url;
        }

        if let Some(url) = lookup("HEARTZ_KAFKA_LAG_BASE_URL") {
            cfg.lag_base_url = url;
        }

        if let Some(count) = lookup("HEARTZ_ENDPOINT_COUNT") {
            let parsed: u32 = parse_var("HEARTZ_ENDPOINT_COUNT", count)?;
            if parsed > MAX_ENDPOINT_COUNT {
                return Err(ConfigError::Invalid {
                    name: "HEARTZ_ENDPOINT_COUNT",
                    value: parsed.to_string(),
                });
            }
            cfg.endpoint_count = parsed;
        }

        cfg.password = lookup("HEARTZ_PASSWORD").filter(|p| !p.is_empty());

        if let Some(secs) = lookup("HEARTZ_FETCH_TIMEOUT_SECS") {
            let secs: f64 = parse_var("HEARTZ_FETCH_TIMEOUT_SECS", secs)?;
            if !secs.is_finite() || secs <= 0.0 {
                return Err(ConfigError::Invalid {
                    name: "HEARTZ_FETCH_TIMEOUT_SECS",
                    value: secs.to_string(),
                });
            }
            cfg.fetch_timeout = Some(Duration::from_secs_f64(secs));
        }

        Ok(cfg)
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let cfg = MonitorConfig::default();
        assert_eq!(cfg.http_port, 8080);
        assert_eq!(cfg.endpoint_count, 16);
        assert!(cfg.password.is_none());
        assert!(cfg.fetch_timeout.is_none());
    }

    #[test]
    fn test_from_lookup() {
        let cfg = MonitorConfig::from_lookup(lookup_from(&[
            ("HEARTZ_HTTP_PORT", "9090"),
            ("HEARTZ_MONITOR_URL", "https://status.example/monitor"),
            ("HEARTZ_KAFKA_LAG_BASE_URL", "https://status.example/lag/"),
            ("HEARTZ_ENDPOINT_COUNT", "4"),
            ("HEARTZ_PASSWORD", "hunter2"),
            ("HEARTZ_FETCH_TIMEOUT_SECS", "2.5"),
        ]))
        .unwrap();

        assert_eq!(cfg.http_port, 9090);
        assert_eq!(cfg.monitor_url, "https://status.example/monitor");
        assert_eq!(cfg.lag_base_url, "https://status.example/lag/");
        assert_eq!(cfg.endpoint_count, 4);
        assert_eq!(cfg.password.as_deref(), Some("hunter2"));
        assert_eq!(cfg.fetch_timeout, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(MonitorConfig::from_lookup(lookup_from(&[("HEARTZ_HTTP_PORT", "http")])).is_err());
        assert!(MonitorConfig::from_lookup(lookup_from(&[("HEARTZ_ENDPOINT_COUNT", "-1")])).is_err());
        assert!(MonitorConfig::from_lookup(lookup_from(&[("HEARTZ_ENDPOINT_COUNT", "4000000000")])).is_err());
        assert!(MonitorConfig::from_lookup(lookup_from(&[("HEARTZ_FETCH_TIMEOUT_SECS", "0")])).is_err());
    }

    #[test]
    fn test_endpoint_count_bounds() {
        let cfg = MonitorConfig::from_lookup(lookup_from(&[("HEARTZ_ENDPOINT_COUNT", "1024")])).unwrap();
        assert_eq!(cfg.endpoint_count, MAX_ENDPOINT_COUNT);

        let cfg = MonitorConfig::from_lookup(lookup_from(&[("HEARTZ_ENDPOINT_COUNT", "0")])).unwrap();
        assert_eq!(cfg.endpoint_count, 0);

        assert!(MonitorConfig::from_lookup(lookup_from(&[("HEARTZ_ENDPOINT_COUNT", "1025")])).is_err());
    }

    #[test]
    fn test_empty_password_disables_gate() {
        let cfg = MonitorConfig::from_lookup(lookup_from(&[("HEARTZ_PASSWORD", "")])).unwrap();
        assert!(cfg.password.is_none());
    }
}
