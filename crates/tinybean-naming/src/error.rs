//! Naming registry errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tinybean_types::ErrorCode;

/// Registry misuse.
///
/// | Variant | Raised by |
/// |---------|-----------|
/// | `NameNotFound` | `lookup` of an unbound path, or through a leaf |
/// | `DuplicateBinding` | `bind` onto an occupied path |
/// | `NotAContext` | `bind` below an existing leaf |
/// | `NotABinding` | `lookup_bound` of a context |
/// | `InvalidName` | `bind` of a path without segments |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum NamingError {
    #[error("name not found: {path}")]
    NameNotFound { path: String },

    #[error("name already bound: {path}")]
    DuplicateBinding { path: String },

    #[error("cannot bind {path}: segment '{segment}' is bound to a value, not a context")]
    NotAContext { path: String, segment: String },

    #[error("{path} names a context, not a bound value")]
    NotABinding { path: String },

    #[error("invalid name: '{path}'")]
    InvalidName { path: String },
}

impl NamingError {
    /// The path the failing operation was given.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::NameNotFound { path }
            | Self::DuplicateBinding { path }
            | Self::NotAContext { path, .. }
            | Self::NotABinding { path }
            | Self::InvalidName { path } => path,
        }
    }
}

impl ErrorCode for NamingError {
    fn code(&self) -> &'static str {
        match self {
            Self::NameNotFound { .. } => "NAMING_NAME_NOT_FOUND",
            Self::DuplicateBinding { .. } => "NAMING_DUPLICATE_BINDING",
            Self::NotAContext { .. } => "NAMING_NOT_A_CONTEXT",
            Self::NotABinding { .. } => "NAMING_NOT_A_BINDING",
            Self::InvalidName { .. } => "NAMING_INVALID_NAME",
        }
    }

    fn is_recoverable(&self) -> bool {
        // A name may appear once a deployment completes.
        matches!(self, Self::NameNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinybean_types::assert_error_codes;

    #[test]
    fn all_error_codes_valid() {
        let p = || "a/b".to_string();
        assert_error_codes(
            &[
                NamingError::NameNotFound { path: p() },
                NamingError::DuplicateBinding { path: p() },
                NamingError::NotAContext {
                    path: p(),
                    segment: "a".into(),
                },
                NamingError::NotABinding { path: p() },
                NamingError::InvalidName { path: p() },
            ],
            "NAMING_",
        );
    }

    #[test]
    fn path_accessor() {
        let err = NamingError::DuplicateBinding {
            path: "ejb/Cart".into(),
        };
        assert_eq!(err.path(), "ejb/Cart");
        assert!(err.to_string().contains("ejb/Cart"));
        assert!(!err.is_recoverable());
    }
}
