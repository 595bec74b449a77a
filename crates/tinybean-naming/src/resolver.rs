//! Name resolution: component metadata → registry paths.
//!
//! # Architecture
//!
//! ```text
//! ComponentDescriptor ─┐
//!                      ├──► NameResolver.resolve() ──► [HomeBinding { Local, path },
//! NamingOverrides ─────┘                                HomeBinding { Remote, path }]
//! ```
//!
//! Resolution is pure: same inputs, same paths, in the same order
//! (local before remote).

use crate::registry::canonical;
use serde::{Deserialize, Serialize};
use std::io::Read;
use tinybean_descriptor::{
    parse_vendor, ComponentDescriptor, InterfaceKind, NamingOverrides, ParseError,
};

/// Scope prefix used when none is configured.
pub const DEFAULT_SCOPE_PREFIX: &str = "java:comp/env";

/// Where one home proxy of a component is bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HomeBinding {
    pub kind: InterfaceKind,
    pub path: String,
}

/// Strategy deriving registry paths for a component's homes.
///
/// Implementations must be deterministic: the container relies on
/// resolving twice to the same paths when it unbinds.
///
/// # Example
///
/// ```
/// use tinybean_descriptor::{ComponentDescriptor, NamingOverrides, SessionType};
/// use tinybean_naming::{NameResolver, HomeBinding};
///
/// /// Binds every home under `beans/<component>/<kind>`.
/// struct FlatResolver;
///
/// impl NameResolver for FlatResolver {
///     fn resolve(&self, d: &ComponentDescriptor, _: &NamingOverrides) -> Vec<HomeBinding> {
///         d.kinds()
///             .into_iter()
///             .map(|kind| HomeBinding { kind, path: format!("beans/{}/{}", d.name, kind) })
///             .collect()
///     }
/// }
///
/// let cart = ComponentDescriptor::new("Cart", SessionType::Stateful, "demo.CartBean")
///     .with_local("demo.CartLocalHome", "demo.CartLocal");
/// let paths = FlatResolver.resolve(&cart, &NamingOverrides::default());
/// assert_eq!(paths[0].path, "beans/Cart/local");
/// ```
pub trait NameResolver: Send + Sync {
    /// Returns one binding per declared home, local first.
    fn resolve(
        &self,
        descriptor: &ComponentDescriptor,
        overrides: &NamingOverrides,
    ) -> Vec<HomeBinding>;

    /// Offers the container's configured scope prefix.
    ///
    /// Strategies that fall back to the convention adopt it unless their
    /// prefix was set explicitly. The default ignores it.
    fn inherit_scope_prefix(&mut self, _scope_prefix: &str) {}
}

/// Default strategy: `{scope_prefix}/ejb/{simple_name(home)}`, unless an
/// override names the path for that kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionResolver {
    scope_prefix: String,
}

impl ConventionResolver {
    /// Creates a resolver with the given scope prefix.
    ///
    /// An empty prefix yields `ejb/{name}`.
    #[must_use]
    pub fn new(scope_prefix: impl Into<String>) -> Self {
        Self {
            scope_prefix: canonical(&scope_prefix.into()),
        }
    }

    /// The scope prefix in canonical form.
    #[must_use]
    pub fn scope_prefix(&self) -> &str {
        &self.scope_prefix
    }

    /// Conventional path for a home interface identifier.
    ///
    /// ```
    /// use tinybean_naming::ConventionResolver;
    ///
    /// let r = ConventionResolver::default();
    /// assert_eq!(r.default_path("demo.cart.CartHome"), "java:comp/env/ejb/CartHome");
    /// assert_eq!(ConventionResolver::new("").default_path("CartHome"), "ejb/CartHome");
    /// ```
    #[must_use]
    pub fn default_path(&self, home_interface: &str) -> String {
        let name = simple_name(home_interface);
        if self.scope_prefix.is_empty() {
            format!("ejb/{name}")
        } else {
            format!("{}/ejb/{name}", self.scope_prefix)
        }
    }
}

impl Default for ConventionResolver {
    fn default() -> Self {
        Self::new(DEFAULT_SCOPE_PREFIX)
    }
}

impl NameResolver for ConventionResolver {
    fn resolve(
        &self,
        descriptor: &ComponentDescriptor,
        overrides: &NamingOverrides,
    ) -> Vec<HomeBinding> {
        InterfaceKind::ALL
            .into_iter()
            .filter_map(|kind| {
                let home = descriptor.home(kind)?;
                let path = match overrides.path(&descriptor.name, kind) {
                    Some(explicit) => canonical(explicit),
                    None => self.default_path(home),
                };
                Some(HomeBinding { kind, path })
            })
            .collect()
    }
}

/// Strategy backed by a vendor naming descriptor.
///
/// Its own overrides win over those passed to `resolve`; anything
/// neither set names falls back to the convention.
///
/// # Example
///
/// ```
/// use tinybean_descriptor::{ComponentDescriptor, NamingOverrides, SessionType};
/// use tinybean_naming::{NameResolver, VendorResolver};
///
/// let vendor = r#"<jboss><enterprise-beans><session>
///     <ejb-name>Cart</ejb-name>
///     <local-jndi-name>ejb/CartLocalHome</local-jndi-name>
/// </session></enterprise-beans></jboss>"#;
/// let resolver = VendorResolver::from_descriptor(vendor.as_bytes())?;
///
/// let cart = ComponentDescriptor::new("Cart", SessionType::Stateful, "demo.CartBean")
///     .with_local("demo.CartLocalHome", "demo.CartLocal");
/// let paths = resolver.resolve(&cart, &NamingOverrides::default());
/// assert_eq!(paths[0].path, "ejb/CartLocalHome");
/// # Ok::<(), tinybean_descriptor::ParseError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorResolver {
    overrides: NamingOverrides,
    fallback: ConventionResolver,
    /// Set by [`with_scope_prefix`](Self::with_scope_prefix).
    pinned_prefix: bool,
}

impl VendorResolver {
    /// Creates a resolver from already-parsed overrides.
    #[must_use]
    pub fn from_overrides(overrides: NamingOverrides) -> Self {
        Self {
            overrides,
            fallback: ConventionResolver::default(),
            pinned_prefix: false,
        }
    }

    /// Parses a vendor descriptor and builds a resolver from it.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the descriptor is malformed.
    pub fn from_descriptor<R: Read>(reader: R) -> Result<Self, ParseError> {
        Ok(Self::from_overrides(parse_vendor(reader)?))
    }

    /// Replaces the fallback convention's scope prefix.
    ///
    /// A prefix set here is kept when the resolver is installed in a
    /// container with a different configured prefix.
    #[must_use]
    pub fn with_scope_prefix(mut self, scope_prefix: impl Into<String>) -> Self {
        self.fallback = ConventionResolver::new(scope_prefix);
        self.pinned_prefix = true;
        self
    }

    /// Scope prefix of the fallback convention.
    #[must_use]
    pub fn scope_prefix(&self) -> &str {
        self.fallback.scope_prefix()
    }

    /// Overrides owned by this resolver.
    #[must_use]
    pub fn overrides(&self) -> &NamingOverrides {
        &self.overrides
    }
}

impl NameResolver for VendorResolver {
    fn resolve(
        &self,
        descriptor: &ComponentDescriptor,
        overrides: &NamingOverrides,
    ) -> Vec<HomeBinding> {
        let merged = overrides.overlay(&self.overrides);
        self.fallback.resolve(descriptor, &merged)
    }

    fn inherit_scope_prefix(&mut self, scope_prefix: &str) {
        if !self.pinned_prefix {
            self.fallback = ConventionResolver::new(scope_prefix);
        }
    }
}

/// Last segment of a dotted (`a.b.C`) or path-style (`a::b::C`) identifier.
#[must_use]
pub fn simple_name(identifier: &str) -> &str {
    let identifier = identifier.trim();
    let after_colons = identifier.rsplit("::").next().unwrap_or(identifier);
    after_colons.rsplit('.').next().unwrap_or(after_colons)
}
