//! Runtime configuration for hosts embedding the task workflow.
//!
//! Values come from defaults, optionally overridden by `TRACKBOARD_*`
//! environment variables:
//!
//! | Variable                         | Field                     |
//! |----------------------------------|---------------------------|
//! | `TRACKBOARD_DATABASE_URL`        | `database_url`            |
//! | `TRACKBOARD_DB_POOL_SIZE`        | `pool_max_size`           |
//! | `TRACKBOARD_DB_CONNECT_TIMEOUT`  | `connect_timeout_secs`    |
//! | `TRACKBOARD_LOG`                 | `log_filter`              |
//! | `TRACKBOARD_LOG_JSON`            | `log_json`                |

use std::time::Duration;
use thiserror::Error;

/// Prefix shared by all configuration variables.
pub const ENV_PREFIX: &str = "TRACKBOARD_";

/// Configuration for storage and logging.
///
/// # Examples
///
/// ```
/// use trackboard::config::TrackerConfig;
///
/// let config = TrackerConfig::from_lookup(|key| match key {
///     "TRACKBOARD_DB_POOL_SIZE" => Some("4".to_owned()),
///     _ => None,
/// })
/// .expect("valid configuration");
/// assert_eq!(config.pool_max_size, 4);
/// assert_eq!(config.log_filter, "trackboard=info,warn");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// `PostgreSQL` connection URL.
    pub database_url: String,
    /// Maximum number of pooled connections.
    pub pool_max_size: u32,
    /// Seconds to wait for a pooled connection.
    pub connect_timeout_secs: u64,
    /// `tracing` filter directive.
    pub log_filter: String,
    /// Emit JSON log lines instead of human-readable ones.
    pub log_json: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/trackboard".to_owned(),
            pool_max_size: 10,
            connect_timeout_secs: 30,
            log_filter: "trackboard=info,warn".to_owned(),
            log_json: false,
        }
    }
}

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable holds a value that cannot be parsed.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Offending value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl TrackerConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a numeric or boolean
    /// variable cannot be parsed, or the pool size is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a numeric or boolean
    /// variable cannot be parsed, or the pool size is zero.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        let pool_max_size = match var("DB_POOL_SIZE") {
            Some(raw) => parse_pool_size(&raw)?,
            None => defaults.pool_max_size,
        };
        let connect_timeout_secs = match var("DB_CONNECT_TIMEOUT") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|err| invalid("DB_CONNECT_TIMEOUT", &raw, &err.to_string()))?,
            None => defaults.connect_timeout_secs,
        };
        let log_json = match var("LOG_JSON") {
            Some(raw) => parse_flag("LOG_JSON", &raw)?,
            None => defaults.log_json,
        };

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or(defaults.database_url),
            pool_max_size,
            connect_timeout_secs,
            log_filter: var("LOG").unwrap_or(defaults.log_filter),
            log_json,
        })
    }

    /// Returns the connection timeout as a [`Duration`].
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn parse_pool_size(raw: &str) -> Result<u32, ConfigError> {
    let size = raw
        .trim()
        .parse::<u32>()
        .map_err(|err| invalid("DB_POOL_SIZE", raw, &err.to_string()))?;
    if size == 0 {
        return Err(invalid("DB_POOL_SIZE", raw, "must be at least 1"));
    }
    Ok(size)
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(name, raw, "expected a boolean")),
    }
}

fn invalid(name: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: format!("{ENV_PREFIX}{name}"),
        value: value.to_owned(),
        reason: reason.to_owned(),
    }
}
