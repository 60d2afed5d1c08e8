//! Configuration for broadcasters and failure logging.
//!
//! Values come from environment variables prefixed with
//! `FERROUS_LIFECYCLE_`, or from JSON when the `config` feature is enabled.

use std::env;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{LifecycleError, LifecycleResult};

/// Prefix shared by every environment variable read by [`LifecycleConfig::from_env`].
pub const ENV_PREFIX: &str = "FERROUS_LIFECYCLE";

const DEFAULT_LOG_PREFIX: &str = "[ferrous-lifecycle]";

/// Settings applied by [`SafeBroadcaster::from_config`](crate::SafeBroadcaster::from_config).
///
/// # Examples
///
/// ```
/// use ferrous_lifecycle::{FailureHub, LifecycleConfig, SafeBroadcaster};
///
/// let config = LifecycleConfig::from_lookup(|key| match key {
///     "FERROUS_LIFECYCLE_LOG_FAILURES" => Some("true".to_string()),
///     _ => None,
/// })
/// .unwrap();
///
/// assert!(config.catch_panics);
/// assert!(config.log_failures);
///
/// let broadcaster = SafeBroadcaster::from_config(&config, FailureHub::global());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct LifecycleConfig {
    /// Catch subscriber panics and report them instead of unwinding
    pub catch_panics: bool,
    /// Attach a logging observer to broadcasters built from this config
    pub log_failures: bool,
    /// Prefix for log lines written by the logging observer
    pub log_prefix: String,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            catch_panics: true,
            log_failures: false,
            log_prefix: DEFAULT_LOG_PREFIX.to_string(),
        }
    }
}

impl LifecycleConfig {
    /// Loads the configuration from the process environment.
    ///
    /// Reads `FERROUS_LIFECYCLE_CATCH_PANICS`, `FERROUS_LIFECYCLE_LOG_FAILURES`
    /// and `FERROUS_LIFECYCLE_LOG_PREFIX`; unset variables keep their defaults.
    pub fn from_env() -> LifecycleResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> LifecycleResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(&env_key("catch_panics")) {
            config.catch_panics = parse_bool("catch_panics", &value)?;
        }
        if let Some(value) = lookup(&env_key("log_failures")) {
            config.log_failures = parse_bool("log_failures", &value)?;
        }
        if let Some(value) = lookup(&env_key("log_prefix")) {
            config.log_prefix = value;
        }

        Ok(config)
    }

    /// Parses the configuration from JSON. Missing fields keep their defaults.
    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> LifecycleResult<Self> {
        serde_json::from_str(json).map_err(|e| LifecycleError::Config(e.to_string()))
    }

    /// Serializes the configuration to JSON.
    #[cfg(feature = "config")]
    pub fn to_json(&self) -> LifecycleResult<String> {
        serde_json::to_string(self).map_err(|e| LifecycleError::Config(e.to_string()))
    }
}

fn env_key(key: &str) -> String {
    format!("{}_{}", ENV_PREFIX, key.to_uppercase())
}

fn parse_bool(key: &str, value: &str) -> LifecycleResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(LifecycleError::Config(format!(
            "{} expects a boolean, got '{}'",
            env_key(key),
            other
        ))),
    }
}
