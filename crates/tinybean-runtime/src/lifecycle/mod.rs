//! Component lifecycle management.
//!
//! # Stateful instances
//!
//! ```text
//!  create(sig, args)          dispatch(...)            remove()
//! ──────────────────► Active ◄────────────► Active ──────────────► Removed
//!  (Uninitialized                                                  (terminal;
//!   until the initializer                                           handle never
//!   returns)                                                        reused)
//! ```
//!
//! Each instance lives in its own slot behind a `Mutex`, so concurrent
//! calls on one handle are serialised while calls on different handles
//! run in parallel. Handles carry a container id and a sequence number
//! that only ever grows.
//!
//! # Stateless instances
//!
//! One [`InstancePool`] per stateless component; see [`pool`](self::pool).
//!
//! # Locking
//!
//! | Lock | Taken by | Mode |
//! |------|----------|------|
//! | closing flag | create / dispatch / remove | checked before the gate |
//! | gate | create / dispatch / remove | shared (recursive) |
//! | gate | shutdown | exclusive |
//! | instance map | create / remove | exclusive, briefly |
//! | instance map | dispatch | shared, briefly |
//! | slot | dispatch / remove | exclusive |
//!
//! The gate is taken recursively so a bean may call another bean of the
//! same container. Recursive reads do not queue behind a waiting writer,
//! so shutdown raises the closing flag first: new calls are refused and
//! the writer only waits for calls already inside. Calling back into the
//! *same* stateful instance deadlocks, as it would on any non-reentrant
//! component.

mod pool;

pub use pool::{InstancePool, PoolStats, PooledInstance};

use crate::config::PoolConfig;
use crate::error::{InvocationError, LifecycleError};
use crate::proxy::DispatchTable;
use crate::tx::{within_transaction, TransactionCoordinator};
use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tinybean_bean::{BeanInstance, MethodSignature};
use tinybean_descriptor::SessionType;
use tinybean_types::{ContainerId, ConversationHandle};
use tracing::{debug, info, warn};

/// Observable state of a stateful instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InstanceState {
    Active,
    Removed,
}

struct Slot {
    table: Arc<DispatchTable>,
    /// `None` once removed.
    instance: Mutex<Option<BeanInstance>>,
}

/// Owns every live instance of one deployment.
pub struct LifecycleManager {
    container: ContainerId,
    coordinator: Arc<dyn TransactionCoordinator>,
    /// Raised as soon as shutdown starts.
    closing: AtomicBool,
    /// `false` after shutdown.
    gate: RwLock<bool>,
    sequence: Arc<AtomicU64>,
    first_seq: u64,
    instances: RwLock<HashMap<ConversationHandle, Arc<Slot>>>,
    pools: HashMap<String, InstancePool>,
}

impl LifecycleManager {
    /// Creates a manager for `tables`, with one pool per stateless
    /// component.
    ///
    /// `sequence` is shared across a container's deployments so handles
    /// stay unique after a redeploy.
    #[must_use]
    pub fn new(
        container: ContainerId,
        sequence: Arc<AtomicU64>,
        coordinator: Arc<dyn TransactionCoordinator>,
        pool_config: &PoolConfig,
        tables: &[Arc<DispatchTable>],
    ) -> Self {
        let pools = tables
            .iter()
            .filter(|t| t.session_type() == SessionType::Stateless)
            .map(|t| {
                let pool = InstancePool::new(t.component(), Arc::clone(t.class()), pool_config);
                (t.component().to_string(), pool)
            })
            .collect();
        let first_seq = sequence.load(Ordering::SeqCst);

        Self {
            container,
            coordinator,
            closing: AtomicBool::new(false),
            gate: RwLock::new(true),
            sequence,
            first_seq,
            instances: RwLock::new(HashMap::new()),
            pools,
        }
    }

    /// Fails once the manager has been shut down.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::Undeployed`] after [`shutdown`](Self::shutdown).
    pub fn ensure_open(&self) -> Result<(), LifecycleError> {
        self.enter().map(drop)
    }

    /// Shared hold on the gate for one call.
    fn enter(&self) -> Result<RwLockReadGuard<'_, bool>, LifecycleError> {
        if self.closing.load(Ordering::SeqCst) {
            return Err(LifecycleError::Undeployed);
        }
        let gate = self.gate.read_recursive();
        if *gate {
            Ok(gate)
        } else {
            Err(LifecycleError::Undeployed)
        }
    }

    /// Instantiates a stateful component and runs the initializer for
    /// `create_sig`.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::Instantiation`] if the initializer fails; the
    ///   instance is discarded without its destroy callback
    /// - [`LifecycleError::Undeployed`] after shutdown
    pub fn create(
        &self,
        table: &Arc<DispatchTable>,
        create_sig: &MethodSignature,
        args: &[Value],
    ) -> Result<ConversationHandle, LifecycleError> {
        let _gate = self.enter()?;

        let class = table.class();
        let mut instance = class.instantiate();
        class
            .initialize(&mut instance, create_sig, args)
            .map_err(|source| LifecycleError::Instantiation {
                component: table.component().to_string(),
                source,
            })?;

        let handle = ConversationHandle::new(
            self.container,
            self.sequence.fetch_add(1, Ordering::SeqCst),
        );
        let slot = Slot {
            table: Arc::clone(table),
            instance: Mutex::new(Some(instance)),
        };
        self.instances.write().insert(handle, Arc::new(slot));

        debug!(component = %table.component(), handle = %handle, via = %create_sig, "instance created");
        Ok(handle)
    }

    /// Invokes `sig` on the stateful instance behind `handle`.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::NoSuchInstance`] for unknown or removed handles
    /// - [`InvocationError::Business`] unchanged from the bean
    /// - [`InvocationError::Transaction`] if demarcation fails
    pub fn dispatch(
        &self,
        handle: &ConversationHandle,
        sig: &MethodSignature,
        args: &[Value],
    ) -> Result<Value, InvocationError> {
        let _gate = self.enter()?;

        let slot = self
            .instances
            .read()
            .get(handle)
            .cloned()
            .ok_or(LifecycleError::NoSuchInstance { handle: *handle })?;

        let mut guard = slot.instance.lock();
        let instance = guard
            .as_mut()
            .ok_or(LifecycleError::NoSuchInstance { handle: *handle })?;
        self.call(&slot.table, instance, sig, args)
    }

    /// Invokes `sig` on a pooled instance of a stateless component.
    ///
    /// The instance goes back to the pool whether the call succeeds or
    /// not.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::PoolExhausted`] at capacity
    /// - [`LifecycleError::Instantiation`] if a new instance fails `create/0`
    /// - [`InvocationError::Business`] unchanged from the bean
    pub fn dispatch_stateless(
        &self,
        table: &DispatchTable,
        sig: &MethodSignature,
        args: &[Value],
    ) -> Result<Value, InvocationError> {
        let _gate = self.enter()?;

        let pool = self
            .pools
            .get(table.component())
            .ok_or(LifecycleError::Undeployed)?;
        let mut instance = pool.acquire()?;
        self.call(table, &mut instance, sig, args)
    }

    /// Removes the instance behind `handle` and runs its destroy callback.
    ///
    /// The instance is discarded even if the callback fails.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::AlreadyRemoved`] if the handle was removed before
    /// - [`LifecycleError::NoSuchInstance`] if this manager never issued it
    /// - [`InvocationError::Business`] if the destroy callback fails
    pub fn remove(&self, handle: &ConversationHandle) -> Result<(), InvocationError> {
        let _gate = self.enter()?;

        let Some(slot) = self.instances.write().remove(handle) else {
            return Err(self.missing(handle).into());
        };
        let Some(mut instance) = slot.instance.lock().take() else {
            return Err(LifecycleError::AlreadyRemoved { handle: *handle }.into());
        };

        debug!(component = %slot.table.component(), handle = %handle, "instance removed");
        slot.table
            .class()
            .destroy(&mut instance)
            .map_err(InvocationError::Business)
    }

    /// State of the instance behind `handle`; `None` if this manager
    /// never issued it.
    #[must_use]
    pub fn state(&self, handle: &ConversationHandle) -> Option<InstanceState> {
        let slot = self.instances.read().get(handle).cloned();
        match slot {
            Some(slot) if slot.instance.lock().is_some() => Some(InstanceState::Active),
            Some(_) => Some(InstanceState::Removed),
            None => self.issued(handle).then_some(InstanceState::Removed),
        }
    }

    /// Number of live stateful instances.
    #[must_use]
    pub fn active_instances(&self) -> usize {
        self.instances.read().len()
    }

    /// Pool counters for a stateless component.
    #[must_use]
    pub fn pool_stats(&self, component: &str) -> Option<PoolStats> {
        self.pools.get(component).map(InstancePool::stats)
    }

    /// Destroys every instance and closes the pools.
    ///
    /// Waits for in-flight calls, then runs destroy callbacks best-effort:
    /// failures are logged, never returned. Idempotent; returns the number
    /// of instances destroyed by this call.
    pub fn shutdown(&self) -> usize {
        self.closing.store(true, Ordering::SeqCst);
        let mut gate = self.gate.write();
        if !*gate {
            return 0;
        }
        *gate = false;

        let slots: Vec<_> = self.instances.write().drain().collect();
        let mut destroyed = 0;
        for (handle, slot) in slots {
            let Some(mut instance) = slot.instance.lock().take() else {
                continue;
            };
            destroyed += 1;
            if let Err(e) = slot.table.class().destroy(&mut instance) {
                warn!(
                    component = %slot.table.component(),
                    handle = %handle,
                    error = %e,
                    "destroy callback failed during shutdown"
                );
            }
        }
        for pool in self.pools.values() {
            destroyed += pool.close();
        }

        info!(container = %self.container, destroyed, "lifecycle manager shut down");
        destroyed
    }

    fn call(
        &self,
        table: &DispatchTable,
        instance: &mut BeanInstance,
        sig: &MethodSignature,
        args: &[Value],
    ) -> Result<Value, InvocationError> {
        let class = table.class();
        if table.is_transactional(&sig.name) {
            within_transaction(self.coordinator.as_ref(), &sig.name, || {
                Ok(class.invoke(instance, sig, args)?)
            })
        } else {
            Ok(class.invoke(instance, sig, args)?)
        }
    }

    fn issued(&self, handle: &ConversationHandle) -> bool {
        handle.container() == self.container
            && handle.seq() >= self.first_seq
            && handle.seq() < self.sequence.load(Ordering::SeqCst)
    }

    fn missing(&self, handle: &ConversationHandle) -> LifecycleError {
        if self.issued(handle) {
            LifecycleError::AlreadyRemoved { handle: *handle }
        } else {
            LifecycleError::NoSuchInstance { handle: *handle }
        }
    }
}

impl std::fmt::Debug for LifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("container", &self.container)
            .field("open", &!self.closing.load(Ordering::SeqCst))
            .field("active_instances", &self.active_instances())
            .field("pools", &self.pools.keys().collect::<Vec<_>>())
            .finish()
    }
}
