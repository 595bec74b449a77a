//! Naming for TinyBean: where home proxies live and how their names are
//! chosen.
//!
//! - [`NamingRegistry`]: hierarchical bind/lookup/unbind store owned by a
//!   container (there is no process-global registry).
//! - [`NameResolver`]: pluggable strategy mapping a component to the
//!   paths of its homes. [`ConventionResolver`] is the default;
//!   [`VendorResolver`] reads explicit paths from a vendor descriptor.

mod error;
mod registry;
mod resolver;

pub use error::NamingError;
pub use registry::{canonical, EntryKind, ListEntry, Lookup, NamingRegistry, RegistryView};
pub use resolver::{
    simple_name, ConventionResolver, HomeBinding, NameResolver, VendorResolver,
    DEFAULT_SCOPE_PREFIX,
};
