//! Bounded pool of interchangeable stateless instances.
//!
//! ```text
//! acquire() ─► idle instance? ──yes──► PooledInstance ──drop──► back to idle
//!                  │ no
//!                  ▼
//!             live < max? ──yes──► construct + create/0
//!                  │ no
//!                  ▼
//!      Fail  ─► PoolExhausted
//!      Block ─► wait on Condvar until returned or timed out
//! ```
//!
//! Instances are returned without any reset. After [`InstancePool::close`]
//! idle instances are destroyed immediately and borrowed ones when they
//! come back.

use crate::config::{OverflowPolicy, PoolConfig};
use crate::error::LifecycleError;
use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tinybean_bean::{BeanClass, BeanInstance, MethodSignature};
use tracing::{debug, warn};

/// Snapshot of a pool's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Instances alive (idle + borrowed).
    pub live: usize,
    pub idle: usize,
    /// Highest `live` ever observed.
    pub peak: usize,
    pub max_size: usize,
}

impl PoolStats {
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.live - self.idle
    }
}

#[derive(Default)]
struct PoolState {
    idle: Vec<BeanInstance>,
    live: usize,
    peak: usize,
    closed: bool,
}

pub struct InstancePool {
    component: String,
    class: Arc<BeanClass>,
    max_size: usize,
    overflow: OverflowPolicy,
    timeout: Duration,
    state: Mutex<PoolState>,
    returned: Condvar,
}

impl InstancePool {
    #[must_use]
    pub fn new(component: impl Into<String>, class: Arc<BeanClass>, config: &PoolConfig) -> Self {
        Self {
            component: component.into(),
            class,
            max_size: config.max_size.max(1),
            overflow: config.overflow,
            timeout: config.acquire_timeout(),
            state: Mutex::new(PoolState::default()),
            returned: Condvar::new(),
        }
    }

    /// Borrows an instance, creating one if the pool may still grow.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::PoolExhausted`] at capacity (immediately for
    ///   [`OverflowPolicy::Fail`], after the timeout for `Block`)
    /// - [`LifecycleError::Instantiation`] if `create/0` fails
    /// - [`LifecycleError::Undeployed`] once closed
    pub fn acquire(&self) -> Result<PooledInstance<'_>, LifecycleError> {
        let deadline = Instant::now() + self.timeout;
        let mut state = self.state.lock();
        let mut timed_out = false;

        loop {
            if state.closed {
                return Err(LifecycleError::Undeployed);
            }
            if let Some(instance) = state.idle.pop() {
                return Ok(PooledInstance::new(self, instance));
            }
            if state.live < self.max_size {
                state.live += 1;
                state.peak = state.peak.max(state.live);
                drop(state);
                return self.grow();
            }
            if timed_out || self.overflow == OverflowPolicy::Fail {
                return Err(LifecycleError::PoolExhausted {
                    component: self.component.clone(),
                    max_size: self.max_size,
                });
            }
            timed_out = self.returned.wait_until(&mut state, deadline).timed_out();
        }
    }

    /// Constructs a new instance; the slot was already reserved.
    fn grow(&self) -> Result<PooledInstance<'_>, LifecycleError> {
        let mut instance = self.class.instantiate();
        let create = MethodSignature::new("create", 0);
        if let Err(source) = self.class.initialize(&mut instance, &create, &[]) {
            self.state.lock().live -= 1;
            self.returned.notify_one();
            return Err(LifecycleError::Instantiation {
                component: self.component.clone(),
                source,
            });
        }
        debug!(component = %self.component, "pooled instance created");
        Ok(PooledInstance::new(self, instance))
    }

    fn release(&self, instance: BeanInstance) {
        let mut state = self.state.lock();
        if state.closed {
            state.live -= 1;
            drop(state);
            self.destroy(instance);
        } else {
            state.idle.push(instance);
            drop(state);
            self.returned.notify_one();
        }
    }

    /// Closes the pool and destroys idle instances. Returns how many
    /// were destroyed now.
    pub fn close(&self) -> usize {
        let idle = {
            let mut state = self.state.lock();
            state.closed = true;
            state.live -= state.idle.len();
            std::mem::take(&mut state.idle)
        };
        self.returned.notify_all();

        let count = idle.len();
        for instance in idle {
            self.destroy(instance);
        }
        count
    }

    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let state = self.state.lock();
        PoolStats {
            live: state.live,
            idle: state.idle.len(),
            peak: state.peak,
            max_size: self.max_size,
        }
    }

    fn destroy(&self, mut instance: BeanInstance) {
        if let Err(e) = self.class.destroy(&mut instance) {
            warn!(component = %self.component, error = %e, "destroy callback failed");
        }
    }
}

impl std::fmt::Debug for InstancePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstancePool")
            .field("component", &self.component)
            .field("overflow", &self.overflow)
            .field("stats", &self.stats())
            .finish()
    }
}

/// An instance borrowed from a pool; returned on drop.
#[derive(Debug)]
pub struct PooledInstance<'a> {
    pool: &'a InstancePool,
    instance: BeanInstance,
}

impl<'a> PooledInstance<'a> {
    fn new(pool: &'a InstancePool, instance: BeanInstance) -> Self {
        Self { pool, instance }
    }
}

impl Deref for PooledInstance<'_> {
    type Target = BeanInstance;

    fn deref(&self) -> &Self::Target {
        &self.instance
    }
}

impl DerefMut for PooledInstance<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.instance
    }
}

impl Drop for PooledInstance<'_> {
    fn drop(&mut self) {
        // Box<()> does not allocate.
        let instance = std::mem::replace(&mut self.instance, Box::new(()));
        self.pool.release(instance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use tinybean_bean::BusinessError;

    fn class(destroyed: Arc<AtomicUsize>) -> Arc<BeanClass> {
        Arc::new(
            BeanClass::builder("demo.Echo", || 0_u32)
                .method("echo", 1, |_, args| Ok(args[0].clone()))
                .on_remove(move |_| {
                    destroyed.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .build(),
        )
    }

    fn config(max_size: usize, overflow: OverflowPolicy, timeout_ms: u64) -> PoolConfig {
        PoolConfig {
            max_size,
            overflow,
            acquire_timeout_ms: timeout_ms,
        }
    }

    #[test]
    fn reuses_returned_instance() {
        let pool = InstancePool::new(
            "Echo",
            class(Arc::new(AtomicUsize::new(0))),
            &config(2, OverflowPolicy::Fail, 0),
        );

        drop(pool.acquire().expect("first"));
        drop(pool.acquire().expect("second"));

        let stats = pool.stats();
        assert_eq!(stats.live, 1);
        assert_eq!(stats.idle, 1);
        assert_eq!(stats.peak, 1);
    }

    #[test]
    fn fail_policy_rejects_at_capacity() {
        let pool = InstancePool::new(
            "Echo",
            class(Arc::new(AtomicUsize::new(0))),
            &config(1, OverflowPolicy::Fail, 0),
        );

        let held = pool.acquire().expect("first");
        let err = pool.acquire().expect_err("pool is full");
        assert!(matches!(err, LifecycleError::PoolExhausted { max_size: 1, .. }));
        assert_eq!(pool.stats().in_use(), 1);
        drop(held);
        assert!(pool.acquire().is_ok());
    }

    #[test]
    fn block_policy_times_out() {
        let pool = InstancePool::new(
            "Echo",
            class(Arc::new(AtomicUsize::new(0))),
            &config(1, OverflowPolicy::Block, 20),
        );

        let _held = pool.acquire().expect("first");
        let started = Instant::now();
        let err = pool.acquire().expect_err("nobody returns");
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert!(matches!(err, LifecycleError::PoolExhausted { .. }));
    }

    #[test]
    fn block_policy_waits_for_return() {
        let pool = Arc::new(InstancePool::new(
            "Echo",
            class(Arc::new(AtomicUsize::new(0))),
            &config(1, OverflowPolicy::Block, 5_000),
        ));

        let held = pool.acquire().expect("first");
        let waiter = {
            let pool = Arc::clone(&pool);
            thread::spawn(move || pool.acquire().map(|_| ()).is_ok())
        };
        thread::sleep(Duration::from_millis(20));
        drop(held);

        assert!(waiter.join().expect("waiter thread"));
        assert_eq!(pool.stats().peak, 1);
    }

    #[test]
    fn failed_init_releases_slot() {
        let class = Arc::new(
            BeanClass::builder("demo.Broken", || ())
                .init("create", 0, |_, _| Err(BusinessError::new("NO_DB", "database down")))
                .build(),
        );
        let pool = InstancePool::new("Broken", class, &config(1, OverflowPolicy::Fail, 0));

        for _ in 0..2 {
            let err = pool.acquire().expect_err("init fails");
            assert!(matches!(err, LifecycleError::Instantiation { .. }));
        }
        assert_eq!(pool.stats().live, 0);
    }

    #[test]
    fn close_destroys_idle_and_late_returns() {
        let destroyed = Arc::new(AtomicUsize::new(0));
        let pool = InstancePool::new(
            "Echo",
            class(Arc::clone(&destroyed)),
            &config(2, OverflowPolicy::Fail, 0),
        );

        let a = pool.acquire().expect("a");
        drop(pool.acquire().expect("b"));

        assert_eq!(pool.close(), 1);
        assert_eq!(destroyed.load(Ordering::SeqCst), 1);
        assert!(matches!(pool.acquire(), Err(LifecycleError::Undeployed)));

        drop(a);
        assert_eq!(destroyed.load(Ordering::SeqCst), 2);
        assert_eq!(pool.stats().live, 0);
    }

    #[test]
    fn instances_are_not_reset() {
        let class = Arc::new(
            BeanClass::builder("demo.Tally", || 0_u32)
                .method("bump", 0, |n, _| {
                    *n += 1;
                    Ok(json!(*n))
                })
                .build(),
        );
        let pool = InstancePool::new("Tally", Arc::clone(&class), &config(1, OverflowPolicy::Fail, 0));
        let bump = MethodSignature::new("bump", 0);

        for expected in 1..=3 {
            let mut instance = pool.acquire().expect("acquire");
            let out = class.invoke(&mut instance, &bump, &[]).expect("bump");
            assert_eq!(out, json!(expected));
        }
    }
}
