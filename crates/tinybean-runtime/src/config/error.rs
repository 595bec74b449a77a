//! Configuration errors.
//!
//! | Variant | Code | Recoverable |
//! |---------|------|-------------|
//! | `ReadFile` | `CONFIG_READ_FILE` | yes |
//! | `ParseToml` | `CONFIG_PARSE_TOML` | no |
//! | `InvalidEnvVar` | `CONFIG_INVALID_ENV_VAR` | no |
//! | `Invalid` | `CONFIG_INVALID` | no |
//!
//! Only an I/O failure is worth retrying; the other variants need the
//! file or the environment fixed first.

use std::path::PathBuf;
use thiserror::Error;
use tinybean_types::ErrorCode;

/// Failure while assembling a [`ContainerConfig`](super::ContainerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{path}' is not valid TOML: {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A `TINYBEAN_*` variable holds a value of the wrong shape.
    #[error("{name}: {message}")]
    InvalidEnvVar { name: String, message: String },

    /// The merged value is out of range.
    #[error("invalid config value '{field}': {message}")]
    Invalid { field: &'static str, message: String },
}

impl ConfigError {
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    pub fn parse_toml(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::ParseToml {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_env_var(name: &str, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::ReadFile { .. } => "CONFIG_READ_FILE",
            Self::ParseToml { .. } => "CONFIG_PARSE_TOML",
            Self::InvalidEnvVar { .. } => "CONFIG_INVALID_ENV_VAR",
            Self::Invalid { .. } => "CONFIG_INVALID",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::ReadFile { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinybean_types::assert_error_codes;

    fn all_variants() -> Vec<ConfigError> {
        let toml_error = toml::from_str::<toml::Value>("= 1").expect_err("invalid toml");
        vec![
            ConfigError::read_file(
                "/etc/tinybean.toml",
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            ),
            ConfigError::parse_toml("/etc/tinybean.toml", toml_error),
            ConfigError::invalid_env_var("TINYBEAN_POOL_MAX", "expected integer"),
            ConfigError::invalid("pool.max_size", "must be at least 1"),
        ]
    }

    #[test]
    fn all_error_codes_valid() {
        assert_error_codes(&all_variants(), "CONFIG_");
    }

    #[test]
    fn only_io_is_recoverable() {
        let recoverable: Vec<_> = all_variants()
            .iter()
            .filter(|e| e.is_recoverable())
            .map(ErrorCode::code)
            .collect();
        assert_eq!(recoverable, vec!["CONFIG_READ_FILE"]);
    }

    #[test]
    fn display_names_the_culprit() {
        let err = ConfigError::invalid_env_var("TINYBEAN_POOL_MAX", "expected integer");
        assert_eq!(err.to_string(), "TINYBEAN_POOL_MAX: expected integer");

        let err = ConfigError::invalid("pool.max_size", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid config value 'pool.max_size': must be at least 1"
        );
    }
}
