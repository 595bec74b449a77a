//! Typed access to positional invocation arguments.

use crate::error::BusinessError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserializes the argument at `index`.
///
/// # Errors
///
/// Returns a `BAD_ARGUMENT` [`BusinessError`] if the argument is missing
/// or has the wrong shape.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use tinybean_bean::arg;
///
/// let args = [json!("Alice"), json!(3)];
/// let name: String = arg(&args, 0)?;
/// let qty: u32 = arg(&args, 1)?;
/// assert_eq!((name.as_str(), qty), ("Alice", 3));
/// assert!(arg::<u32>(&args, 2).is_err());
/// # Ok::<(), tinybean_bean::BusinessError>(())
/// ```
pub fn arg<T: DeserializeOwned>(args: &[Value], index: usize) -> Result<T, BusinessError> {
    let value = args
        .get(index)
        .ok_or_else(|| BusinessError::bad_argument(index, "missing"))?;
    serde_json::from_value(value.clone()).map_err(|e| BusinessError::bad_argument(index, e))
}
