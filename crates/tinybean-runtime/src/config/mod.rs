//! Container configuration with hierarchical layering.
//!
//! # Architecture
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌──────────────────────────────────────────────┐
//! │  1. Environment Variables (TINYBEAN_*)       │  Runtime override
//! ├──────────────────────────────────────────────┤
//! │  2. Project Config (.tinybean/config.toml)   │  Project-specific
//! ├──────────────────────────────────────────────┤
//! │  3. Global Config (~/.tinybean/config.toml)  │  User defaults
//! ├──────────────────────────────────────────────┤
//! │  4. Default Values (compile-time)            │  Fallback
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `TINYBEAN_DEBUG` | `debug` | bool |
//! | `TINYBEAN_SCOPE_PREFIX` | `naming.scope_prefix` | String |
//! | `TINYBEAN_POOL_MAX` | `pool.max_size` | usize |
//! | `TINYBEAN_POOL_OVERFLOW` | `pool.overflow` | `block` \| `fail` |
//! | `TINYBEAN_POOL_TIMEOUT_MS` | `pool.acquire_timeout_ms` | u64 |
//!
//! # Example Configuration
//!
//! ```toml
//! # ~/.tinybean/config.toml
//! debug = false
//!
//! [naming]
//! scope_prefix = "java:comp/env"
//!
//! [pool]
//! max_size = 16
//! overflow = "block"
//! acquire_timeout_ms = 5000
//! ```

mod error;
mod loader;
mod resolver;
mod types;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use resolver::{ConfigResolver, NoOpResolver};
pub use types::{ContainerConfig, NamingConfig, OverflowPolicy, PoolConfig};

/// Default global config directory.
pub fn default_config_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".tinybean")
}

/// Default global config file path.
pub fn default_config_path() -> std::path::PathBuf {
    default_config_dir().join("config.toml")
}

/// Project config directory name.
pub const PROJECT_CONFIG_DIR: &str = ".tinybean";

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "config.toml";
