//! Method signatures and interface declarations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A method identified by name and argument count.
///
/// Arity is part of the identity, so `create/0` and `create/1` are
/// distinct methods.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    pub arity: usize,
}

impl MethodSignature {
    /// Creates a signature.
    #[must_use]
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }

    /// Returns `true` for home factory methods (`create`, `createFor...`).
    #[must_use]
    pub fn is_create(&self) -> bool {
        self.name.starts_with("create")
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// A named set of method signatures a client view exposes.
///
/// Home interfaces declare `create*` methods; component interfaces
/// declare business methods.
///
/// # Example
///
/// ```
/// use tinybean_bean::{InterfaceDef, MethodSignature};
///
/// let local = InterfaceDef::new("demo.CartLocal")
///     .method("addItem", 1)
///     .method("getTotalAmount", 0);
///
/// assert!(local.declares(&MethodSignature::new("addItem", 1)));
/// assert!(!local.declares(&MethodSignature::new("addItem", 2)));
/// assert_eq!(local.find("getTotalAmount", 0).map(|m| m.arity), Some(0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDef {
    pub name: String,
    pub methods: Vec<MethodSignature>,
}

impl InterfaceDef {
    /// Creates an interface with no methods.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    /// Adds a method; duplicates are ignored.
    #[must_use]
    pub fn method(mut self, name: impl Into<String>, arity: usize) -> Self {
        let sig = MethodSignature::new(name, arity);
        if !self.methods.contains(&sig) {
            self.methods.push(sig);
        }
        self
    }

    /// Returns `true` if the interface declares `sig`.
    #[must_use]
    pub fn declares(&self, sig: &MethodSignature) -> bool {
        self.methods.contains(sig)
    }

    /// Finds a declared method by name and arity.
    #[must_use]
    pub fn find(&self, name: &str, arity: usize) -> Option<&MethodSignature> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.arity == arity)
    }
}
