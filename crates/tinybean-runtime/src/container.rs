//! Deployment orchestration.
//!
//! # Deploy
//!
//! ```text
//! ejb-jar.xml ──► parse ──┐
//! jboss.xml ───► parse ───┴──► Deployment
//!                                  │
//!                     per component│
//!                                  ▼
//!              DispatchTable::build (verifies against Catalog)
//!                                  │
//!              NameResolver.resolve ──► [(path, HomeProxy)]
//!                                  │
//!              NamingRegistry.bind_all (all or nothing)
//! ```
//!
//! Any failure before `bind_all` leaves the registry untouched;
//! `bind_all` rolls back its own partial work. So a failed deploy never
//! leaves bindings behind.
//!
//! # Undeploy
//!
//! Instances are torn down first (destroy callbacks best-effort), then
//! every path this deployment bound is unbound and the deployment is
//! dropped. Outstanding proxies then fail with
//! [`LifecycleError::Undeployed`](crate::LifecycleError::Undeployed).

use crate::config::ContainerConfig;
use crate::error::DeploymentError;
use crate::lifecycle::LifecycleManager;
use crate::proxy::{DispatchTable, HomeProxy, ProxyFactory};
use crate::tx::{NoopCoordinator, TransactionCoordinator};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::io::Read;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tinybean_bean::Catalog;
use tinybean_descriptor::{
    parse_ejb_jar, parse_vendor, ComponentDescriptor, Deployment, InterfaceKind, NamingOverrides,
    SessionType,
};
use tinybean_naming::{
    canonical, ConventionResolver, Lookup, NameResolver, NamingError, NamingRegistry,
    RegistryView,
};
use tinybean_types::ContainerId;
use tracing::{debug, info};

/// One home bound in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub path: String,
    pub component: String,
    pub kind: InterfaceKind,
    pub session_type: SessionType,
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  ->  {} ({} home, {})",
            self.path, self.component, self.kind, self.session_type
        )
    }
}

/// Bindings `resolver` would produce for one component.
#[must_use]
pub fn component_bindings(
    descriptor: &ComponentDescriptor,
    overrides: &NamingOverrides,
    resolver: &dyn NameResolver,
) -> Vec<Binding> {
    resolver
        .resolve(descriptor, overrides)
        .into_iter()
        .map(|home| Binding {
            path: canonical(&home.path),
            component: descriptor.name.clone(),
            kind: home.kind,
            session_type: descriptor.session_type,
        })
        .collect()
}

/// Bindings a deployment would produce, in declaration order.
///
/// Pure: nothing is instantiated or bound.
#[must_use]
pub fn plan_bindings(deployment: &Deployment, resolver: &dyn NameResolver) -> Vec<Binding> {
    deployment
        .components()
        .iter()
        .flat_map(|d| component_bindings(d, deployment.overrides(), resolver))
        .collect()
}

struct Active {
    deployment: Arc<Deployment>,
    manager: Arc<LifecycleManager>,
    bindings: Vec<Binding>,
}

/// Hosts one deployment at a time.
///
/// The container owns its naming registry; there is no process-wide
/// one. Dropping the container undeploys.
pub struct Container {
    id: ContainerId,
    config: ContainerConfig,
    catalog: Catalog,
    coordinator: Arc<dyn TransactionCoordinator>,
    resolver: Box<dyn NameResolver>,
    registry: NamingRegistry<HomeProxy>,
    sequence: Arc<AtomicU64>,
    active: Mutex<Option<Active>>,
}

impl Container {
    /// Creates an empty container.
    ///
    /// Names resolve by convention under `config.naming.scope_prefix`
    /// until [`set_resolver`](Self::set_resolver) installs another
    /// strategy.
    #[must_use]
    pub fn new(
        config: ContainerConfig,
        catalog: Catalog,
        coordinator: Arc<dyn TransactionCoordinator>,
    ) -> Self {
        let resolver = ConventionResolver::new(config.naming.scope_prefix.clone());
        let id = ContainerId::new();
        debug!(container = %id, "container created");
        Self {
            id,
            config,
            catalog,
            coordinator,
            resolver: Box::new(resolver),
            registry: NamingRegistry::new(),
            sequence: Arc::new(AtomicU64::new(0)),
            active: Mutex::new(None),
        }
    }

    /// Container with default config and [`NoopCoordinator`].
    #[must_use]
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self::new(
            ContainerConfig::default(),
            catalog,
            Arc::new(NoopCoordinator::new()),
        )
    }

    /// Replaces the naming strategy used by later deploys.
    ///
    /// The strategy is offered `config.naming.scope_prefix` for its
    /// conventional fallback; see [`NameResolver::inherit_scope_prefix`].
    pub fn set_resolver(&mut self, mut resolver: impl NameResolver + 'static) {
        resolver.inherit_scope_prefix(&self.config.naming.scope_prefix);
        self.resolver = Box::new(resolver);
    }

    #[must_use]
    pub fn id(&self) -> ContainerId {
        self.id
    }

    #[must_use]
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Parses descriptors and deploys them.
    ///
    /// Returns the number of homes bound.
    ///
    /// # Errors
    ///
    /// See [`deploy_deployment`](Self::deploy_deployment); additionally
    /// [`DeploymentError::Parse`] for malformed descriptors.
    pub fn deploy(
        &self,
        descriptor: impl Read,
        vendor: Option<&mut dyn Read>,
    ) -> Result<usize, DeploymentError> {
        let mut deployment = parse_ejb_jar(descriptor)?;
        if let Some(vendor) = vendor {
            deployment = deployment.with_overrides(parse_vendor(vendor)?);
        }
        self.deploy_deployment(deployment)
    }

    /// Deploys an already-parsed deployment.
    ///
    /// Returns the number of homes bound.
    ///
    /// # Errors
    ///
    /// - [`DeploymentError::AlreadyDeployed`] if a deployment is active
    /// - [`DeploymentError::Proxy`] if a component does not match the catalog
    /// - [`DeploymentError::Naming`] if a resolved path is taken or invalid
    ///
    /// On error nothing is bound.
    pub fn deploy_deployment(&self, deployment: Deployment) -> Result<usize, DeploymentError> {
        let mut active = self.active.lock();
        if active.is_some() {
            return Err(DeploymentError::AlreadyDeployed);
        }

        let tables = deployment
            .components()
            .iter()
            .map(|d| {
                DispatchTable::build(Arc::new(d.clone()), &deployment, &self.catalog).map(Arc::new)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let manager = Arc::new(LifecycleManager::new(
            self.id,
            Arc::clone(&self.sequence),
            Arc::clone(&self.coordinator),
            &self.config.pool,
            &tables,
        ));
        let factory = ProxyFactory::new(&manager);

        let mut entries = Vec::new();
        let mut bindings = Vec::new();
        for table in &tables {
            for binding in
                component_bindings(table.descriptor(), deployment.overrides(), self.resolver.as_ref())
            {
                entries.push((binding.path.clone(), factory.build_home(table, binding.kind)?));
                bindings.push(binding);
            }
        }

        let bound = self.registry.bind_all(entries)?;
        for binding in &bindings {
            debug!(component = %binding.component, path = %binding.path, kind = %binding.kind, "home bound");
        }
        info!(
            container = %self.id,
            components = deployment.len(),
            bindings = bound,
            "deployed"
        );

        *active = Some(Active {
            deployment: Arc::new(deployment),
            manager,
            bindings,
        });
        Ok(bound)
    }

    /// Tears down the active deployment.
    ///
    /// Returns `false` if nothing was deployed.
    pub fn undeploy(&self) -> bool {
        let Some(active) = self.active.lock().take() else {
            return false;
        };

        let destroyed = active.manager.shutdown();
        let unbound = self
            .registry
            .unbind_all(active.bindings.iter().map(|b| b.path.as_str()));
        info!(
            container = %self.id,
            components = active.deployment.len(),
            destroyed,
            unbound,
            "undeployed"
        );
        true
    }

    #[must_use]
    pub fn is_deployed(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Looks up a path: a home proxy, or the listing of a context.
    ///
    /// # Errors
    ///
    /// [`NamingError::NameNotFound`] / [`NamingError::NotAContext`].
    pub fn lookup(&self, path: &str) -> Result<Lookup<HomeProxy>, NamingError> {
        self.registry.lookup(path)
    }

    /// Looks up a home proxy.
    ///
    /// # Errors
    ///
    /// As [`lookup`](Self::lookup), plus [`NamingError::NotABinding`] for
    /// contexts.
    pub fn lookup_home(&self, path: &str) -> Result<HomeProxy, NamingError> {
        self.registry.lookup_bound(path)
    }

    /// Homes bound by the active deployment.
    #[must_use]
    pub fn bindings(&self) -> Vec<Binding> {
        self.active
            .lock()
            .as_ref()
            .map(|a| a.bindings.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn deployment(&self) -> Option<Arc<Deployment>> {
        self.active.lock().as_ref().map(|a| Arc::clone(&a.deployment))
    }

    /// Lifecycle manager of the active deployment, for diagnostics.
    #[must_use]
    pub fn lifecycle(&self) -> Option<Arc<LifecycleManager>> {
        self.active.lock().as_ref().map(|a| Arc::clone(&a.manager))
    }

    /// Read-only view of the naming registry; only deploy and undeploy
    /// bind or unbind.
    #[must_use]
    pub fn registry(&self) -> RegistryView<'_, HomeProxy> {
        self.registry.view()
    }
}

impl Drop for Container {
    fn drop(&mut self) {
        self.undeploy();
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.id)
            .field("deployed", &self.is_deployed())
            .field("registry", &self.registry)
            .finish()
    }
}
