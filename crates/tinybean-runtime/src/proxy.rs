//! Client-facing proxies and the dispatch tables behind them.
//!
//! # Architecture
//!
//! ```text
//!            deploy time                              call time
//! ┌──────────────────────────────┐     ┌──────────────────────────────────┐
//! │ ComponentDescriptor          │     │ HomeProxy.create(args)           │
//! │ + Catalog (interfaces,class) │     │   └─► LifecycleManager.create    │
//! │ + method transaction attrs   │     │         └─► InstanceProxy        │
//! │          │                   │     │                                  │
//! │          ▼                   │     │ InstanceProxy.invoke(m, args)    │
//! │   DispatchTable (Arc)  ──────┼────►│   └─► LifecycleManager.dispatch  │
//! └──────────────────────────────┘     └──────────────────────────────────┘
//! ```
//!
//! A [`DispatchTable`] is built once per component. It checks that every
//! declared method has an implementation, so a broken component fails
//! the deployment instead of the first call. Proxies carry no business
//! logic; they resolve the method against the table and forward.
//!
//! Proxies hold only a [`Weak`] reference to the lifecycle manager. Once
//! the container is undeployed every call fails with
//! [`LifecycleError::Undeployed`].

use crate::error::{InvocationError, LifecycleError, ProxyError};
use crate::lifecycle::LifecycleManager;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::{Arc, Weak};
use tinybean_bean::{BeanClass, Catalog, InterfaceDef, MethodSignature};
use tinybean_descriptor::{
    ComponentDescriptor, Deployment, InterfaceKind, SessionType, TransactionType,
};
use tinybean_types::ConversationHandle;

/// Home and component interface of one client view.
#[derive(Debug, Clone)]
struct View {
    home: Arc<InterfaceDef>,
    component: Arc<InterfaceDef>,
}

/// Static per-component dispatch information.
#[derive(Debug)]
pub struct DispatchTable {
    descriptor: Arc<ComponentDescriptor>,
    class: Arc<BeanClass>,
    views: BTreeMap<InterfaceKind, View>,
    transactional: HashSet<String>,
}

impl DispatchTable {
    /// Builds and verifies the table for `descriptor`.
    ///
    /// # Errors
    ///
    /// - [`ProxyError::UnknownClass`] / [`ProxyError::UnknownInterface`]
    ///   if the catalog lacks an identifier the descriptor names
    /// - [`ProxyError::MissingMethod`] if a declared business method or
    ///   `create*` variant has no implementation
    /// - [`ProxyError::InvalidHomeMethod`] if a home declares a
    ///   non-`create*` method, or a stateless home declares anything
    ///   but `create/0`
    pub fn build(
        descriptor: Arc<ComponentDescriptor>,
        deployment: &Deployment,
        catalog: &Catalog,
    ) -> Result<Self, ProxyError> {
        let component = descriptor.name.clone();
        let class =
            catalog
                .class(&descriptor.implementation)
                .ok_or_else(|| ProxyError::UnknownClass {
                    component: component.clone(),
                    class: descriptor.implementation.clone(),
                })?;

        let interface = |name: &str| {
            catalog
                .interface(name)
                .ok_or_else(|| ProxyError::UnknownInterface {
                    component: component.clone(),
                    interface: name.to_string(),
                })
        };

        let mut views = BTreeMap::new();
        for kind in descriptor.kinds() {
            let (Some(home_name), Some(component_name)) =
                (descriptor.home(kind), descriptor.component_interface(kind))
            else {
                continue;
            };
            let view = View {
                home: interface(home_name)?,
                component: interface(component_name)?,
            };
            verify_home(&descriptor, &class, &view.home)?;
            verify_component(&descriptor, &class, &view.component)?;
            views.insert(kind, view);
        }

        let transactional = match descriptor.transaction_type {
            TransactionType::Bean => HashSet::new(),
            TransactionType::Container => views
                .values()
                .flat_map(|v| v.component.methods.iter())
                .filter(|m| {
                    deployment
                        .trans_attribute(&component, &m.name)
                        .is_some_and(|a| a.demands_transaction())
                })
                .map(|m| m.name.clone())
                .collect(),
        };

        Ok(Self {
            descriptor,
            class,
            views,
            transactional,
        })
    }

    #[must_use]
    pub fn component(&self) -> &str {
        &self.descriptor.name
    }

    #[must_use]
    pub fn descriptor(&self) -> &Arc<ComponentDescriptor> {
        &self.descriptor
    }

    #[must_use]
    pub fn session_type(&self) -> SessionType {
        self.descriptor.session_type
    }

    #[must_use]
    pub fn class(&self) -> &Arc<BeanClass> {
        &self.class
    }

    /// Views this component exposes, local first.
    #[must_use]
    pub fn kinds(&self) -> Vec<InterfaceKind> {
        self.views.keys().copied().collect()
    }

    #[must_use]
    pub fn home_interface(&self, kind: InterfaceKind) -> Option<&InterfaceDef> {
        self.views.get(&kind).map(|v| v.home.as_ref())
    }

    #[must_use]
    pub fn component_interface(&self, kind: InterfaceKind) -> Option<&InterfaceDef> {
        self.views.get(&kind).map(|v| v.component.as_ref())
    }

    /// Whether calls to `method` run inside a container transaction.
    #[must_use]
    pub fn is_transactional(&self, method: &str) -> bool {
        self.transactional.contains(method)
    }

    /// Resolves a business call against the `kind` component interface.
    ///
    /// # Errors
    ///
    /// [`InvocationError::NoSuchMethod`] if the interface does not
    /// declare `method` with `arity` arguments.
    pub fn business_method(
        &self,
        kind: InterfaceKind,
        method: &str,
        arity: usize,
    ) -> Result<MethodSignature, InvocationError> {
        self.component_interface(kind)
            .and_then(|i| i.find(method, arity))
            .cloned()
            .ok_or_else(|| self.no_such_method(kind, method, arity))
    }

    /// Resolves a `create*` call against the `kind` home interface.
    ///
    /// # Errors
    ///
    /// [`InvocationError::NoSuchMethod`] if the home does not declare it.
    pub fn create_method(
        &self,
        kind: InterfaceKind,
        method: &str,
        arity: usize,
    ) -> Result<MethodSignature, InvocationError> {
        self.home_interface(kind)
            .and_then(|i| i.find(method, arity))
            .filter(|sig| sig.is_create())
            .cloned()
            .ok_or_else(|| self.no_such_method(kind, method, arity))
    }

    fn no_such_method(&self, kind: InterfaceKind, method: &str, arity: usize) -> InvocationError {
        InvocationError::NoSuchMethod {
            component: self.descriptor.name.clone(),
            kind,
            method: MethodSignature::new(method, arity).to_string(),
        }
    }
}

fn verify_home(
    descriptor: &ComponentDescriptor,
    class: &BeanClass,
    home: &InterfaceDef,
) -> Result<(), ProxyError> {
    for sig in &home.methods {
        let stateless_extra =
            !descriptor.is_stateful() && !(sig.name == "create" && sig.arity == 0);
        if !sig.is_create() || stateless_extra {
            return Err(ProxyError::InvalidHomeMethod {
                component: descriptor.name.clone(),
                interface: home.name.clone(),
                method: sig.to_string(),
            });
        }
        if !class.accepts_create(sig) {
            return Err(ProxyError::MissingMethod {
                component: descriptor.name.clone(),
                interface: home.name.clone(),
                method: sig.to_string(),
            });
        }
    }
    Ok(())
}

fn verify_component(
    descriptor: &ComponentDescriptor,
    class: &BeanClass,
    component: &InterfaceDef,
) -> Result<(), ProxyError> {
    match component.methods.iter().find(|sig| !class.has_method(sig)) {
        Some(sig) => Err(ProxyError::MissingMethod {
            component: descriptor.name.clone(),
            interface: component.name.clone(),
            method: sig.to_string(),
        }),
        None => Ok(()),
    }
}

/// Builds proxies bound to one lifecycle manager.
#[derive(Debug, Clone)]
pub struct ProxyFactory {
    manager: Weak<LifecycleManager>,
}

impl ProxyFactory {
    #[must_use]
    pub fn new(manager: &Arc<LifecycleManager>) -> Self {
        Self {
            manager: Arc::downgrade(manager),
        }
    }

    /// Builds the home proxy for one view of `table`.
    ///
    /// # Errors
    ///
    /// [`ProxyError::NoSuchView`] if the component has no `kind` view.
    pub fn build_home(
        &self,
        table: &Arc<DispatchTable>,
        kind: InterfaceKind,
    ) -> Result<HomeProxy, ProxyError> {
        if !table.views.contains_key(&kind) {
            return Err(ProxyError::NoSuchView {
                component: table.component().to_string(),
                kind,
            });
        }
        Ok(HomeProxy {
            table: Arc::clone(table),
            kind,
            factory: self.clone(),
        })
    }

    /// Builds an instance proxy. `handle` is `None` for stateless
    /// components.
    #[must_use]
    pub fn build_instance(
        &self,
        table: &Arc<DispatchTable>,
        kind: InterfaceKind,
        handle: Option<ConversationHandle>,
    ) -> InstanceProxy {
        InstanceProxy {
            table: Arc::clone(table),
            kind,
            handle,
            manager: self.manager.clone(),
        }
    }

    fn manager(&self) -> Result<Arc<LifecycleManager>, LifecycleError> {
        self.manager.upgrade().ok_or(LifecycleError::Undeployed)
    }
}

/// Factory for component instances, bound in the naming registry.
///
/// Cheap to clone.
///
/// # Example
///
/// ```ignore
/// let home = container.lookup_home("ejb/CartLocalHome")?;
/// let cart = home.create(&[json!("Alice")])?;
/// cart.invoke("addItem", &[json!({"sku": "A-1", "qty": 2, "price": 3.5})])?;
/// cart.remove()?;
/// ```
#[derive(Clone)]
pub struct HomeProxy {
    table: Arc<DispatchTable>,
    kind: InterfaceKind,
    factory: ProxyFactory,
}

impl HomeProxy {
    #[must_use]
    pub fn component(&self) -> &str {
        self.table.component()
    }

    #[must_use]
    pub fn kind(&self) -> InterfaceKind {
        self.kind
    }

    #[must_use]
    pub fn session_type(&self) -> SessionType {
        self.table.session_type()
    }

    /// Home interface this proxy exposes.
    #[must_use]
    pub fn interface(&self) -> Option<&InterfaceDef> {
        self.table.home_interface(self.kind)
    }

    /// Calls `create` with `args`.
    ///
    /// # Errors
    ///
    /// See [`create_with`](Self::create_with).
    pub fn create(&self, args: &[Value]) -> Result<InstanceProxy, InvocationError> {
        self.create_with("create", args)
    }

    /// Calls the `create*` variant `method` with `args`.
    ///
    /// Stateful components get a fresh instance and handle. Stateless
    /// components get a handle-less proxy; instances come from the pool
    /// on each call.
    ///
    /// # Errors
    ///
    /// - [`InvocationError::NoSuchMethod`] if the home does not declare it
    /// - [`LifecycleError::Instantiation`] if the initializer fails
    /// - [`LifecycleError::Undeployed`] after undeploy
    pub fn create_with(
        &self,
        method: &str,
        args: &[Value],
    ) -> Result<InstanceProxy, InvocationError> {
        let sig = self.table.create_method(self.kind, method, args.len())?;
        let manager = self.factory.manager()?;
        let handle = match self.table.session_type() {
            SessionType::Stateful => Some(manager.create(&self.table, &sig, args)?),
            SessionType::Stateless => {
                manager.ensure_open()?;
                None
            }
        };
        Ok(self.factory.build_instance(&self.table, self.kind, handle))
    }
}

impl fmt::Debug for HomeProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HomeProxy")
            .field("component", &self.component())
            .field("kind", &self.kind)
            .finish()
    }
}

/// Client reference to one component instance (stateful) or to the
/// component's pool (stateless).
#[derive(Clone)]
pub struct InstanceProxy {
    table: Arc<DispatchTable>,
    kind: InterfaceKind,
    handle: Option<ConversationHandle>,
    manager: Weak<LifecycleManager>,
}

impl InstanceProxy {
    #[must_use]
    pub fn component(&self) -> &str {
        self.table.component()
    }

    #[must_use]
    pub fn kind(&self) -> InterfaceKind {
        self.kind
    }

    /// Conversation handle; `None` for stateless components.
    #[must_use]
    pub fn handle(&self) -> Option<ConversationHandle> {
        self.handle
    }

    /// Invokes a business method declared on this view.
    ///
    /// # Errors
    ///
    /// - [`InvocationError::NoSuchMethod`] for undeclared methods
    /// - [`InvocationError::Business`] carrying the bean's error unchanged
    /// - [`InvocationError::Lifecycle`] for removed instances, pool
    ///   exhaustion or undeploy
    /// - [`InvocationError::Transaction`] if demarcation fails
    pub fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, InvocationError> {
        let sig = self.table.business_method(self.kind, method, args.len())?;
        let manager = self.manager()?;
        match self.handle {
            Some(handle) => manager.dispatch(&handle, &sig, args),
            None => manager.dispatch_stateless(&self.table, &sig, args),
        }
    }

    /// Ends the conversation.
    ///
    /// For stateless components this only checks the container is live.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::AlreadyRemoved`] on a second remove
    /// - [`InvocationError::Business`] if the destroy callback fails; the
    ///   instance is discarded regardless
    pub fn remove(&self) -> Result<(), InvocationError> {
        let manager = self.manager()?;
        match self.handle {
            Some(handle) => manager.remove(&handle),
            None => Ok(manager.ensure_open()?),
        }
    }

    fn manager(&self) -> Result<Arc<LifecycleManager>, LifecycleError> {
        self.manager.upgrade().ok_or(LifecycleError::Undeployed)
    }
}

impl fmt::Debug for InstanceProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceProxy")
            .field("component", &self.component())
            .field("kind", &self.kind)
            .field("handle", &self.handle)
            .finish()
    }
}
