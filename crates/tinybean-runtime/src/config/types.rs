//! Configuration types.
//!
//! All types implement [`Default`] for compile-time fallback values.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tinybean_naming::DEFAULT_SCOPE_PREFIX;

/// Main configuration structure.
///
/// This is the unified configuration after merging all layers.
///
/// # Example
///
/// ```
/// use tinybean_runtime::config::{ContainerConfig, OverflowPolicy};
///
/// let config = ContainerConfig::default();
/// assert!(!config.debug);
/// assert_eq!(config.naming.scope_prefix, "java:comp/env");
/// assert_eq!(config.pool.max_size, 16);
/// assert_eq!(config.pool.overflow, OverflowPolicy::Block);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ContainerConfig {
    /// Raise the CLI log filter to `debug`.
    pub debug: bool,

    /// Naming configuration.
    pub naming: NamingConfig,

    /// Stateless pool configuration.
    pub pool: PoolConfig,
}

impl ContainerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes to TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserializes from TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Merges another config into this one.
    ///
    /// Values from `other` override values in `self` only if they
    /// differ from the default. This enables layered configuration.
    pub fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.debug != default.debug {
            self.debug = other.debug;
        }

        self.naming.merge(&other.naming);
        self.pool.merge(&other.pool);
    }

    /// Checks ranges that TOML types cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero pool size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool.max_size == 0 {
            return Err(ConfigError::invalid("pool.max_size", "must be at least 1"));
        }
        Ok(())
    }
}

/// Naming configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NamingConfig {
    /// Prefix for conventional binding paths. Empty means none.
    pub scope_prefix: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            scope_prefix: DEFAULT_SCOPE_PREFIX.into(),
        }
    }
}

impl NamingConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.scope_prefix != default.scope_prefix {
            self.scope_prefix = other.scope_prefix.clone();
        }
    }
}

/// What a stateless dispatch does when every pooled instance is busy and
/// the pool is at `max_size`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Wait up to `acquire_timeout_ms` for an instance.
    #[default]
    Block,
    /// Fail immediately.
    Fail,
}

impl FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "block" => Ok(Self::Block),
            "fail" => Ok(Self::Fail),
            other => Err(format!("expected 'block' or 'fail', got '{other}'")),
        }
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Block => "block",
            Self::Fail => "fail",
        })
    }
}

/// Stateless instance pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PoolConfig {
    /// Upper bound of live instances per stateless component.
    pub max_size: usize,

    /// Behaviour at capacity.
    pub overflow: OverflowPolicy,

    /// How long a blocked dispatch waits (milliseconds).
    pub acquire_timeout_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: 16,
            overflow: OverflowPolicy::Block,
            acquire_timeout_ms: 5000,
        }
    }
}

impl PoolConfig {
    /// Returns the acquire timeout as a [`Duration`].
    #[must_use]
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.max_size != default.max_size {
            self.max_size = other.max_size;
        }
        if other.overflow != default.overflow {
            self.overflow = other.overflow;
        }
        if other.acquire_timeout_ms != default.acquire_timeout_ms {
            self.acquire_timeout_ms = other.acquire_timeout_ms;
        }
    }
}
