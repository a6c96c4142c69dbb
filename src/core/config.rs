//! Configuration management for the tool server.
//!
//! Configuration starts from defaults and is overridden from `TOOLHOST_*`
//! environment variables (a `.env` file is loaded first when present).

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::{Error, Result};
use super::transport::TransportConfig;
use super::transport::framing::DEFAULT_MAX_FRAME_BYTES;

/// Main configuration structure for the tool server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Per-channel dispatch limits.
    pub dispatch: DispatchConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server, used in logs.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// Limits applied to every channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Largest accepted frame, in bytes.
    pub max_frame_bytes: usize,

    /// Requests dispatched concurrently per channel. `1` is strictly
    /// sequential; responses are always written in arrival order.
    pub max_in_flight: usize,

    /// Per-call time limit. `None` waits for handlers indefinitely.
    #[serde(default)]
    pub call_timeout_ms: Option<u64>,
}

impl DispatchConfig {
    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            max_in_flight: 1,
            call_timeout_ms: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                with_timestamps: true,
            },
            transport: TransportConfig::default(),
            dispatch: DispatchConfig::default(),
        }
    }
}

/// Parse an environment variable, warning about and ignoring bad values.
fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid value '{}' for {}", raw, key);
            None
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables are prefixed with `TOOLHOST_`, for example
    /// `TOOLHOST_SERVER_NAME` or `TOOLHOST_MAX_IN_FLIGHT`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("TOOLHOST_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("TOOLHOST_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.transport = TransportConfig::from_env();

        if let Some(max) = env_parse("TOOLHOST_MAX_FRAME_BYTES") {
            config.dispatch.max_frame_bytes = max;
        }

        if let Some(max) = env_parse("TOOLHOST_MAX_IN_FLIGHT") {
            config.dispatch.max_in_flight = max;
        }

        if let Some(ms) = env_parse::<u64>("TOOLHOST_CALL_TIMEOUT_MS") {
            config.dispatch.call_timeout_ms = Some(ms);
            info!("Tool calls time out after {}ms", ms);
        }

        config
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.dispatch.max_in_flight == 0 {
            return Err(Error::config("max_in_flight must be at least 1"));
        }
        if self.dispatch.max_frame_bytes == 0 {
            return Err(Error::config("max_frame_bytes must be at least 1"));
        }
        if self.dispatch.call_timeout_ms == Some(0) {
            return Err(Error::config("call_timeout_ms must be at least 1 when set"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    const KEYS: [&str; 8] = [
        "TOOLHOST_SERVER_NAME",
        "TOOLHOST_LOG_LEVEL",
        "TOOLHOST_TRANSPORT",
        "TOOLHOST_TCP_HOST",
        "TOOLHOST_TCP_PORT",
        "TOOLHOST_MAX_FRAME_BYTES",
        "TOOLHOST_MAX_IN_FLIGHT",
        "TOOLHOST_CALL_TIMEOUT_MS",
    ];

    fn clear_env() {
        for key in KEYS {
            unsafe {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.dispatch.max_in_flight, 1);
        assert_eq!(config.dispatch.max_frame_bytes, DEFAULT_MAX_FRAME_BYTES);
        assert_eq!(config.dispatch.call_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_dispatch_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_env();
        unsafe {
            std::env::set_var("TOOLHOST_SERVER_NAME", "calendar-tools");
            std::env::set_var("TOOLHOST_MAX_IN_FLIGHT", "4");
            std::env::set_var("TOOLHOST_CALL_TIMEOUT_MS", "2500");
        }
        let config = Config::from_env();
        clear_env();

        assert_eq!(config.server.name, "calendar-tools");
        assert_eq!(config.dispatch.max_in_flight, 4);
        assert_eq!(
            config.dispatch.call_timeout(),
            Some(Duration::from_millis(2500))
        );
    }

    #[test]
    fn test_invalid_values_are_ignored() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_env();
        unsafe {
            std::env::set_var("TOOLHOST_MAX_IN_FLIGHT", "lots");
            std::env::set_var("TOOLHOST_MAX_FRAME_BYTES", "-1");
        }
        let config = Config::from_env();
        clear_env();

        assert_eq!(config.dispatch, DispatchConfig::default());
    }

    #[test]
    fn test_clear_env_resets_every_variable() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("TOOLHOST_LOG_LEVEL", "trace");
            std::env::set_var("TOOLHOST_TCP_HOST", "0.0.0.0");
            std::env::set_var("TOOLHOST_TCP_PORT", "9000");
        }
        assert_eq!(Config::from_env().logging.level, "trace");
        clear_env();

        for key in KEYS {
            assert!(std::env::var(key).is_err(), "{} still set", key);
        }
        assert_eq!(Config::from_env().logging.level, "info");
    }

    #[test]
    fn test_unknown_transport_falls_back_to_default() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_env();
        unsafe {
            std::env::set_var("TOOLHOST_TRANSPORT", "carrier-pigeon");
        }
        let config = Config::from_env();
        clear_env();

        assert_eq!(
            config.transport.description(),
            TransportConfig::default().description()
        );
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = Config::default();
        config.dispatch.max_in_flight = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.dispatch.max_frame_bytes = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.dispatch.call_timeout_ms = Some(0);
        assert!(config.validate().is_err());
    }
}
