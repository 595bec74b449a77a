//! Machine-readable error codes shared by every TinyBean crate.
//!
//! Each crate defines its own `thiserror` enum and implements
//! [`ErrorCode`] on it, so callers can branch on a stable code
//! without matching on crate-specific variants.
//!
//! # Prefixes
//!
//! | Crate | Error type | Prefix |
//! |-------|------------|--------|
//! | `tinybean-descriptor` | `ParseError` | `PARSE_` |
//! | `tinybean-naming` | `NamingError` | `NAMING_` |
//! | `tinybean-runtime` | `LifecycleError` | `LIFECYCLE_` |
//! | `tinybean-runtime` | `TransactionError` | `TX_` |
//! | `tinybean-runtime` | `ProxyError` | `PROXY_` |
//! | `tinybean-runtime` | `InvocationError` | `INVOKE_` |
//! | `tinybean-runtime` | `DeploymentError` | `DEPLOY_` |
//! | `tinybean-runtime` | `ConfigError` | `CONFIG_` |
//!
//! # Example
//!
//! ```
//! use tinybean_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum PoolError {
//!     Exhausted,
//!     Closed,
//! }
//!
//! impl ErrorCode for PoolError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Exhausted => "POOL_EXHAUSTED",
//!             Self::Closed => "POOL_CLOSED",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Exhausted)
//!     }
//! }
//!
//! assert_eq!(PoolError::Exhausted.code(), "POOL_EXHAUSTED");
//! assert!(!PoolError::Closed.is_recoverable());
//! ```

/// Stable error code interface.
///
/// # Code Format
///
/// - `UPPER_SNAKE_CASE`
/// - Prefixed with the owning layer (`NAMING_`, `LIFECYCLE_`, ...)
/// - Never renamed once published
///
/// # Recoverability
///
/// An error is recoverable when retrying the same call may succeed
/// (an exhausted pool, a transaction manager hiccup). Misuse such as
/// a stale conversation handle or a malformed descriptor is not.
pub trait ErrorCode {
    /// Returns the machine-readable code.
    fn code(&self) -> &'static str;

    /// Returns whether retrying may succeed.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code is well formed and carries the prefix.
///
/// # Panics
///
/// Panics with a descriptive message when the code is empty, lacks
/// `expected_prefix`, or is not `UPPER_SNAKE_CASE`.
///
/// # Example
///
/// ```
/// use tinybean_types::{assert_error_code, ErrorCode};
///
/// struct Stale;
///
/// impl ErrorCode for Stale {
///     fn code(&self) -> &'static str { "LIFECYCLE_STALE" }
///     fn is_recoverable(&self) -> bool { false }
/// }
///
/// assert_error_code(&Stale, "LIFECYCLE_");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "Error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "Error code '{}' must start with prefix '{}'",
        code,
        expected_prefix
    );
    assert!(
        is_upper_snake_case(code),
        "Error code '{}' must be UPPER_SNAKE_CASE",
        code
    );
}

/// Runs [`assert_error_code`] over every error in `errors`.
///
/// Intended for exhaustive variant lists in unit tests.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }

    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
