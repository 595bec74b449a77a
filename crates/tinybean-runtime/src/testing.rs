//! Test doubles for the runtime.

use crate::tx::{TransactionCoordinator, TransactionError, TransactionId};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// One call observed by a [`RecordingCoordinator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxEvent {
    Begin(TransactionId),
    Commit(TransactionId),
    Rollback(TransactionId),
}

/// Coordinator that records every call and can be told to fail.
///
/// Ids start at 1 and increase per `begin`. A failing `begin` records
/// nothing; failing `commit`/`rollback` calls are still recorded.
///
/// # Example
///
/// ```
/// use tinybean_runtime::testing::{RecordingCoordinator, TxEvent};
/// use tinybean_runtime::{TransactionCoordinator, TransactionId};
///
/// let tx = RecordingCoordinator::new().fail_commit();
/// let id = tx.begin().expect("begin");
/// assert!(tx.commit(id).is_err());
/// assert_eq!(tx.events(), vec![TxEvent::Begin(id), TxEvent::Commit(id)]);
/// assert_eq!(id, TransactionId::new(1));
/// ```
#[derive(Debug, Default)]
pub struct RecordingCoordinator {
    next: AtomicU64,
    events: Mutex<Vec<TxEvent>>,
    fail_begin: bool,
    fail_commit: bool,
    fail_rollback: bool,
}

impl RecordingCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every `begin` fail.
    #[must_use]
    pub fn fail_begin(mut self) -> Self {
        self.fail_begin = true;
        self
    }

    /// Makes every `commit` fail.
    #[must_use]
    pub fn fail_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    /// Makes every `rollback` fail.
    #[must_use]
    pub fn fail_rollback(mut self) -> Self {
        self.fail_rollback = true;
        self
    }

    /// Snapshot of recorded calls, in order.
    #[must_use]
    pub fn events(&self) -> Vec<TxEvent> {
        self.events.lock().clone()
    }

    #[must_use]
    pub fn commits(&self) -> usize {
        self.count(|e| matches!(e, TxEvent::Commit(_)))
    }

    #[must_use]
    pub fn rollbacks(&self) -> usize {
        self.count(|e| matches!(e, TxEvent::Rollback(_)))
    }

    fn count(&self, pred: impl Fn(&TxEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }
}

impl TransactionCoordinator for RecordingCoordinator {
    fn begin(&self) -> Result<TransactionId, TransactionError> {
        if self.fail_begin {
            return Err(TransactionError::Begin {
                reason: "begin disabled".into(),
            });
        }
        let id = TransactionId::new(self.next.fetch_add(1, Ordering::SeqCst) + 1);
        self.events.lock().push(TxEvent::Begin(id));
        Ok(id)
    }

    fn commit(&self, id: TransactionId) -> Result<(), TransactionError> {
        self.events.lock().push(TxEvent::Commit(id));
        if self.fail_commit {
            return Err(TransactionError::Commit {
                id,
                reason: "commit disabled".into(),
            });
        }
        Ok(())
    }

    fn rollback(&self, id: TransactionId) -> Result<(), TransactionError> {
        self.events.lock().push(TxEvent::Rollback(id));
        if self.fail_rollback {
            return Err(TransactionError::Rollback {
                id,
                reason: "rollback disabled".into(),
            });
        }
        Ok(())
    }
}
