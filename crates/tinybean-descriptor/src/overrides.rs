//! Naming overrides from a vendor descriptor.

use crate::InterfaceKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Explicit registry paths for one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingOverride {
    pub component: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_path: Option<String>,
}

impl NamingOverride {
    /// Creates an override with no paths set.
    #[must_use]
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            local_path: None,
            remote_path: None,
        }
    }

    /// Sets the path of the local home.
    #[must_use]
    pub fn local(mut self, path: impl Into<String>) -> Self {
        self.local_path = Some(path.into());
        self
    }

    /// Sets the path of the remote home.
    #[must_use]
    pub fn remote(mut self, path: impl Into<String>) -> Self {
        self.remote_path = Some(path.into());
        self
    }

    /// Returns the override for `kind`, if any.
    #[must_use]
    pub fn path(&self, kind: InterfaceKind) -> Option<&str> {
        match kind {
            InterfaceKind::Local => self.local_path.as_deref(),
            InterfaceKind::Remote => self.remote_path.as_deref(),
        }
    }
}

/// Set of [`NamingOverride`]s keyed by component name.
///
/// Ordered by name so iteration (and anything printed from it) is
/// deterministic.
///
/// # Example
///
/// ```
/// use tinybean_descriptor::{InterfaceKind, NamingOverride, NamingOverrides};
///
/// let mut overrides = NamingOverrides::default();
/// overrides.insert(NamingOverride::new("Cart").local("ejb/CartLocalHome"));
///
/// assert_eq!(
///     overrides.path("Cart", InterfaceKind::Local),
///     Some("ejb/CartLocalHome")
/// );
/// assert_eq!(overrides.path("Cart", InterfaceKind::Remote), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamingOverrides {
    entries: BTreeMap<String, NamingOverride>,
}

impl NamingOverrides {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an override, returning the one it replaced.
    pub fn insert(&mut self, entry: NamingOverride) -> Option<NamingOverride> {
        self.entries.insert(entry.component.clone(), entry)
    }

    /// Returns the override for a component.
    #[must_use]
    pub fn get(&self, component: &str) -> Option<&NamingOverride> {
        self.entries.get(component)
    }

    /// Returns the overridden path for a component's home of `kind`.
    #[must_use]
    pub fn path(&self, component: &str, kind: InterfaceKind) -> Option<&str> {
        self.get(component).and_then(|o| o.path(kind))
    }

    /// Returns a copy of `self` where paths in `top` win per component
    /// and per kind.
    #[must_use]
    pub fn overlay(&self, top: &NamingOverrides) -> NamingOverrides {
        let mut merged = self.clone();
        for entry in top.iter() {
            let slot = merged
                .entries
                .entry(entry.component.clone())
                .or_insert_with(|| NamingOverride::new(entry.component.clone()));
            if entry.local_path.is_some() {
                slot.local_path = entry.local_path.clone();
            }
            if entry.remote_path.is_some() {
                slot.remote_path = entry.remote_path.clone();
            }
        }
        merged
    }

    /// Iterates overrides ordered by component name.
    pub fn iter(&self) -> impl Iterator<Item = &NamingOverride> {
        self.entries.values()
    }

    /// Number of components with an override.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no overrides are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<NamingOverride> for NamingOverrides {
    fn from_iter<I: IntoIterator<Item = NamingOverride>>(iter: I) -> Self {
        let mut set = Self::new();
        for entry in iter {
            set.insert(entry);
        }
        set
    }
}
