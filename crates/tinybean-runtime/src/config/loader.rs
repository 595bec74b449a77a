//! Configuration loader with hierarchical merging.
//!
//! # Load Order
//!
//! 1. Default values (compile-time)
//! 2. Global config (`~/.tinybean/config.toml`)
//! 3. Project config (`<project>/.tinybean/config.toml`)
//! 4. Environment variables (`TINYBEAN_*`)
//!
//! Each layer overrides the previous. The merged result is validated
//! before it is returned.

use super::{
    default_config_path, ConfigError, ContainerConfig, OverflowPolicy, PROJECT_CONFIG_DIR,
    PROJECT_CONFIG_FILE,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Helper macro for parsing boolean environment variables.
macro_rules! parse_env_bool {
    ($field:expr, $var:literal) => {
        if let Ok(val) = std::env::var($var) {
            $field = parse_bool(&val)
                .ok_or_else(|| ConfigError::invalid_env_var($var, "expected bool"))?;
        }
    };
}

/// Helper macro for environment variables parsed through `FromStr`.
macro_rules! parse_env {
    ($field:expr, $var:literal, $ty:ty, $expected:literal) => {
        if let Ok(val) = std::env::var($var) {
            $field = val
                .trim()
                .parse::<$ty>()
                .map_err(|_| ConfigError::invalid_env_var($var, $expected))?;
        }
    };
}

/// Configuration loader with builder pattern.
///
/// # Example
///
/// ```no_run
/// use tinybean_runtime::config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_project_root("/path/to/project")
///     .skip_env_vars()
///     .load()?;
/// # Ok::<(), tinybean_runtime::config::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Global config file path (defaults to ~/.tinybean/config.toml).
    global_config_path: Option<PathBuf>,

    /// Project root directory.
    project_root: Option<PathBuf>,

    skip_env: bool,
    skip_global: bool,
    skip_project: bool,
}

impl ConfigLoader {
    /// Creates a new loader with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom global config path.
    #[must_use]
    pub fn with_global_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Sets the project root directory.
    ///
    /// Project config will be loaded from `<project_root>/.tinybean/config.toml`.
    #[must_use]
    pub fn with_project_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_root = Some(path.into());
        self
    }

    /// Skips environment variable loading.
    ///
    /// Useful for testing with deterministic config.
    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Skips global config loading.
    #[must_use]
    pub fn skip_global_config(mut self) -> Self {
        self.skip_global = true;
        self
    }

    /// Skips project config loading.
    #[must_use]
    pub fn skip_project_config(mut self) -> Self {
        self.skip_project = true;
        self
    }

    /// Loads, merges and validates configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any config file exists but cannot be
    /// parsed, an environment variable is malformed, or the merged
    /// result is out of range. Missing config files are silently ignored.
    pub fn load(&self) -> Result<ContainerConfig, ConfigError> {
        let mut config = ContainerConfig::default();

        // Layer 1: Global config
        if !self.skip_global {
            let global_path = self
                .global_config_path
                .clone()
                .unwrap_or_else(default_config_path);

            if let Some(global_config) = self.load_file(&global_path)? {
                debug!(path = %global_path.display(), "Loaded global config");
                config.merge(&global_config);
            }
        }

        // Layer 2: Project config
        if !self.skip_project {
            if let Some(ref project_root) = self.project_root {
                let project_config_path = project_root
                    .join(PROJECT_CONFIG_DIR)
                    .join(PROJECT_CONFIG_FILE);

                if let Some(project_config) = self.load_file(&project_config_path)? {
                    debug!(
                        path = %project_config_path.display(),
                        project = %project_root.display(),
                        "Loaded project config"
                    );
                    config.merge(&project_config);
                }
            }
        }

        // Layer 3: Environment variables
        if !self.skip_env {
            self.apply_env_vars(&mut config)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reads one layer; a missing file is an empty layer.
    fn load_file(&self, path: &Path) -> Result<Option<ContainerConfig>, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ConfigError::read_file(path, e)),
        };
        ContainerConfig::from_toml(&content)
            .map(Some)
            .map_err(|e| ConfigError::parse_toml(path, e))
    }

    /// Applies environment variable overrides.
    fn apply_env_vars(&self, config: &mut ContainerConfig) -> Result<(), ConfigError> {
        parse_env_bool!(config.debug, "TINYBEAN_DEBUG");

        if let Ok(val) = std::env::var("TINYBEAN_SCOPE_PREFIX") {
            config.naming.scope_prefix = val;
        }

        parse_env!(config.pool.max_size, "TINYBEAN_POOL_MAX", usize, "expected integer");
        parse_env!(
            config.pool.overflow,
            "TINYBEAN_POOL_OVERFLOW",
            OverflowPolicy,
            "expected 'block' or 'fail'"
        );
        parse_env!(
            config.pool.acquire_timeout_ms,
            "TINYBEAN_POOL_TIMEOUT_MS",
            u64,
            "expected integer"
        );

        Ok(())
    }
}

/// Case-insensitive `true/false`, `1/0`, `yes/no`, `on/off`.
fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
