//! Business errors raised by bean code.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A failure raised by bean code.
///
/// The container never inspects, wraps or rewrites a `BusinessError`:
/// whatever a business method returns reaches the client unchanged, so
/// clients can tell their own failures from container failures.
///
/// # Example
///
/// ```
/// use tinybean_bean::BusinessError;
/// use serde_json::json;
///
/// let err = BusinessError::new("CART_EMPTY", "cart has no items")
///     .with_detail(json!({"customer": "Alice"}));
///
/// assert_eq!(err.code, "CART_EMPTY");
/// assert_eq!(err.to_string(), "CART_EMPTY: cart has no items");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct BusinessError {
    /// Application-defined code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Optional structured payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl BusinessError {
    /// Creates an error with a code and message.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            detail: None,
        }
    }

    /// Attaches a structured payload.
    #[must_use]
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Error for an argument that failed to deserialize.
    #[must_use]
    pub fn bad_argument(index: usize, reason: impl std::fmt::Display) -> Self {
        Self::new("BAD_ARGUMENT", format!("argument {index}: {reason}"))
    }
}
