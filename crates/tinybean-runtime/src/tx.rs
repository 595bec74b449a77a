//! Transaction demarcation.
//!
//! The container does not manage transactions itself. A host injects a
//! [`TransactionCoordinator`]; the lifecycle manager calls it around
//! business methods whose dispatch entry is marked transactional.
//!
//! ```text
//! dispatch(sig) ──► marked? ──no──► call bean
//!                      │
//!                     yes
//!                      ▼
//!                  begin() ──Err──► InvocationError::Transaction
//!                      │
//!                  call bean ──Err──► rollback() ──► original error
//!                      │
//!                  commit() ──Err──► InvocationError::Transaction
//! ```
//!
//! Rollback failures are logged and never replace the error that caused
//! the rollback.

use crate::error::InvocationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tinybean_types::ErrorCode;
use tracing::{debug, error};

/// Identifier of a transaction issued by a coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId(u64);

impl TransactionId {
    #[must_use]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx-{}", self.0)
    }
}

/// Transaction manager failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("failed to begin transaction: {reason}")]
    Begin { reason: String },

    #[error("failed to commit {id}: {reason}")]
    Commit { id: TransactionId, reason: String },

    #[error("failed to roll back {id}: {reason}")]
    Rollback { id: TransactionId, reason: String },

    /// The coordinator does not know the transaction.
    #[error("unknown transaction {id}")]
    Unknown { id: TransactionId },
}

impl ErrorCode for TransactionError {
    fn code(&self) -> &'static str {
        match self {
            Self::Begin { .. } => "TX_BEGIN",
            Self::Commit { .. } => "TX_COMMIT",
            Self::Rollback { .. } => "TX_ROLLBACK",
            Self::Unknown { .. } => "TX_UNKNOWN",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Begin { .. })
    }
}

/// Injected transaction capability.
///
/// Implementations must be thread-safe; concurrent business calls
/// each get their own transaction.
pub trait TransactionCoordinator: Send + Sync {
    /// Starts a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError`] if no transaction can be started.
    fn begin(&self) -> Result<TransactionId, TransactionError>;

    /// Commits `id`.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError`] if the commit fails.
    fn commit(&self, id: TransactionId) -> Result<(), TransactionError>;

    /// Rolls back `id`.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError`] if the rollback fails.
    fn rollback(&self, id: TransactionId) -> Result<(), TransactionError>;
}

/// Coordinator that hands out ids and does nothing else.
///
/// Used when a host does not inject a real coordinator.
#[derive(Debug, Default)]
pub struct NoopCoordinator {
    next: AtomicU64,
}

impl NoopCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionCoordinator for NoopCoordinator {
    fn begin(&self) -> Result<TransactionId, TransactionError> {
        Ok(TransactionId(self.next.fetch_add(1, Ordering::Relaxed) + 1))
    }

    fn commit(&self, _id: TransactionId) -> Result<(), TransactionError> {
        Ok(())
    }

    fn rollback(&self, _id: TransactionId) -> Result<(), TransactionError> {
        Ok(())
    }
}

/// Runs `call` inside a fresh transaction.
pub(crate) fn within_transaction<F>(
    coordinator: &dyn TransactionCoordinator,
    method: &str,
    call: F,
) -> Result<Value, InvocationError>
where
    F: FnOnce() -> Result<Value, InvocationError>,
{
    let id = coordinator.begin()?;
    debug!(tx = %id, method, "transaction started");

    match call() {
        Ok(value) => {
            coordinator.commit(id)?;
            debug!(tx = %id, method, "transaction committed");
            Ok(value)
        }
        Err(err) => {
            match coordinator.rollback(id) {
                Ok(()) => debug!(tx = %id, method, "transaction rolled back"),
                Err(rollback) => {
                    error!(tx = %id, method, error = %rollback, "rollback failed");
                }
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingCoordinator, TxEvent};
    use serde_json::json;
    use tinybean_bean::BusinessError;
    use tinybean_types::assert_error_codes;

    #[test]
    fn all_error_codes_valid() {
        let id = TransactionId::new(1);
        assert_error_codes(
            &[
                TransactionError::Begin { reason: "x".into() },
                TransactionError::Commit {
                    id,
                    reason: "x".into(),
                },
                TransactionError::Rollback {
                    id,
                    reason: "x".into(),
                },
                TransactionError::Unknown { id },
            ],
            "TX_",
        );
    }

    #[test]
    fn noop_ids_are_distinct() {
        let tx = NoopCoordinator::new();
        let a = tx.begin().expect("begin");
        let b = tx.begin().expect("begin");
        assert_ne!(a, b);
        assert!(tx.commit(a).is_ok());
        assert!(tx.rollback(b).is_ok());
    }

    #[test]
    fn success_commits() {
        let tx = RecordingCoordinator::new();
        let out = within_transaction(&tx, "checkout", || Ok(json!(1))).expect("call");
        assert_eq!(out, json!(1));
        assert_eq!(
            tx.events(),
            vec![TxEvent::Begin(TransactionId::new(1)), TxEvent::Commit(TransactionId::new(1))]
        );
    }

    #[test]
    fn failure_rolls_back_and_keeps_error() {
        let tx = RecordingCoordinator::new();
        let err = within_transaction(&tx, "checkout", || {
            Err(BusinessError::new("CART_EMPTY", "no items").into())
        })
        .expect_err("business failure");
        assert_eq!(err.as_business().map(|b| b.code.as_str()), Some("CART_EMPTY"));
        assert_eq!(
            tx.events(),
            vec![TxEvent::Begin(TransactionId::new(1)), TxEvent::Rollback(TransactionId::new(1))]
        );
    }

    #[test]
    fn rollback_failure_does_not_mask_error() {
        let tx = RecordingCoordinator::new().fail_rollback();
        let err = within_transaction(&tx, "m", || Err(BusinessError::new("B", "b").into()))
            .expect_err("business failure");
        assert!(err.as_business().is_some());
    }

    #[test]
    fn begin_failure_skips_call() {
        let tx = RecordingCoordinator::new().fail_begin();
        let mut called = false;
        let err = within_transaction(&tx, "m", || {
            called = true;
            Ok(Value::Null)
        })
        .expect_err("begin fails");
        assert!(!called);
        assert!(matches!(err, InvocationError::Transaction(TransactionError::Begin { .. })));
    }

    #[test]
    fn commit_failure_surfaces() {
        let tx = RecordingCoordinator::new().fail_commit();
        let err = within_transaction(&tx, "m", || Ok(Value::Null)).expect_err("commit fails");
        assert!(matches!(err, InvocationError::Transaction(TransactionError::Commit { .. })));
    }
}
