//! Identifier types.
//!
//! Handles carry the identity of the container that issued them, so a
//! handle leaking from one container can never address an instance in
//! another.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of one container instance.
///
/// A fresh random UUID (v4) per [`ContainerId::new`] call.
///
/// # Example
///
/// ```
/// use tinybean_types::ContainerId;
///
/// let a = ContainerId::new();
/// let b = ContainerId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerId(Uuid);

impl ContainerId {
    /// Creates a new random container identity.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ContainerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier binding a stateful instance to its client conversation.
///
/// The sequence number is allocated monotonically by the issuing
/// container and is never reused, even after the instance is removed.
/// Two handles are equal only if both the container and the sequence
/// match.
///
/// # Example
///
/// ```
/// use tinybean_types::{ContainerId, ConversationHandle};
///
/// let container = ContainerId::new();
/// let h1 = ConversationHandle::new(container, 1);
/// let h2 = ConversationHandle::new(container, 2);
///
/// assert_ne!(h1, h2);
/// assert_eq!(h1.container(), h2.container());
/// assert!(h1.to_string().starts_with("conv-1@"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversationHandle {
    container: ContainerId,
    seq: u64,
}

impl ConversationHandle {
    /// Creates a handle. Only containers should mint handles.
    #[must_use]
    pub fn new(container: ContainerId, seq: u64) -> Self {
        Self { container, seq }
    }

    /// Returns the issuing container.
    #[must_use]
    pub fn container(&self) -> ContainerId {
        self.container
    }

    /// Returns the per-container sequence number.
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl fmt::Display for ConversationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = self.container.0.simple().to_string();
        write!(f, "conv-{}@{}", self.seq, &short[..8])
    }
}
