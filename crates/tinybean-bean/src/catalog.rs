//! Registry of interface declarations and implementation classes.
//!
//! Descriptors name interfaces and classes by identifier; the catalog is
//! where the container turns those identifiers into something it can
//! dispatch on. Entries are shared as `Arc` so a deployment can hold on
//! to exactly the definitions it was built from.

use crate::class::BeanClass;
use crate::interface::InterfaceDef;
use std::collections::HashMap;
use std::sync::Arc;

/// Interfaces and classes known to a container, keyed by identifier.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    interfaces: HashMap<String, Arc<InterfaceDef>>,
    classes: HashMap<String, Arc<BeanClass>>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an interface, replacing any previous one with that name.
    pub fn register_interface(&mut self, interface: InterfaceDef) {
        self.interfaces
            .insert(interface.name.clone(), Arc::new(interface));
    }

    /// Registers a class, replacing any previous one with that name.
    pub fn register_class(&mut self, class: BeanClass) {
        self.classes
            .insert(class.name().to_string(), Arc::new(class));
    }

    /// Builder form of [`register_interface`](Self::register_interface).
    #[must_use]
    pub fn with_interface(mut self, interface: InterfaceDef) -> Self {
        self.register_interface(interface);
        self
    }

    /// Builder form of [`register_class`](Self::register_class).
    #[must_use]
    pub fn with_class(mut self, class: BeanClass) -> Self {
        self.register_class(class);
        self
    }

    #[must_use]
    pub fn interface(&self, name: &str) -> Option<Arc<InterfaceDef>> {
        self.interfaces.get(name).cloned()
    }

    #[must_use]
    pub fn class(&self, name: &str) -> Option<Arc<BeanClass>> {
        self.classes.get(name).cloned()
    }

    /// Number of registered interfaces and classes.
    #[must_use]
    pub fn len(&self) -> (usize, usize) {
        (self.interfaces.len(), self.classes.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty() && self.classes.is_empty()
    }
}
