//! Server configuration
//!
//! Settings come from the command line and environment variables:
//! - bind address: first CLI argument, else `CHAT_SERVER_ADDR`, else `127.0.0.1:8080`
//! - callback timeout: `CHAT_CALLBACK_TIMEOUT_MS`, else 5000 ms

use std::env;
use std::time::Duration;

use crate::error::ConfigError;

/// Default server address
pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Default per-recipient callback timeout in milliseconds
pub const DEFAULT_CALLBACK_TIMEOUT_MS: u64 = 5000;

/// Environment variable overriding the bind address
pub const ADDR_ENV: &str = "CHAT_SERVER_ADDR";

/// Environment variable overriding the callback timeout
pub const CALLBACK_TIMEOUT_ENV: &str = "CHAT_CALLBACK_TIMEOUT_MS";

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address the HTTP server binds to
    pub addr: String,
    /// Upper bound for a single callback delivery
    pub callback_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            callback_timeout: Duration::from_millis(DEFAULT_CALLBACK_TIMEOUT_MS),
        }
    }
}

impl Config {
    /// Load configuration from the process arguments and environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_sources(
            env::args().nth(1),
            env::var(ADDR_ENV).ok(),
            env::var(CALLBACK_TIMEOUT_ENV).ok(),
        )
    }

    /// Build configuration from already-read values
    ///
    /// A CLI address wins over the environment one.
    pub fn from_sources(
        arg_addr: Option<String>,
        env_addr: Option<String>,
        env_timeout_ms: Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(addr) = arg_addr.or(env_addr) {
            config.addr = addr;
        }

        if let Some(raw) = env_timeout_ms {
            config.callback_timeout = parse_timeout(&raw)?;
        }

        Ok(config)
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_sources(None, None, None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.addr, "127.0.0.1:8080");
        assert_eq!(config.callback_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_cli_addr_overrides_env() {
        let config = Config::from_sources(
            Some("0.0.0.0:9000".to_string()),
            Some("127.0.0.1:7000".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(config.addr, "0.0.0.0:9000");
    }

    #[test]
    fn test_env_addr() {
        let config = Config::from_sources(None, Some("127.0.0.1:7000".to_string()), None).unwrap();
        assert_eq!(config.addr, "127.0.0.1:7000");
    }

    #[test]
    fn test_timeout_from_env() {
        let config = Config::from_sources(None, None, Some("250".to_string())).unwrap();
        assert_eq!(config.callback_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_timeout() {
        for raw in ["0", "-5", "soon", ""] {
            let result = Config::from_sources(None, None, Some(raw.to_string()));
            assert!(
                matches!(result, Err(ConfigError::InvalidTimeout(_))),
                "{:?} should be rejected",
                raw
            );
        }
    }
}
