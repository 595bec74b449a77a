//! TinyBean runtime: a container for session components.
//!
//! # Layers
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Container           deploy / undeploy / lookup           │
//! ├──────────────────────────────────────────────────────────┤
//! │ HomeProxy ─ InstanceProxy     (proxy)                    │
//! ├──────────────────────────────────────────────────────────┤
//! │ LifecycleManager ─ InstancePool   (lifecycle)            │
//! │ TransactionCoordinator            (tx, injected)         │
//! ├──────────────────────────────────────────────────────────┤
//! │ tinybean-naming   tinybean-descriptor   tinybean-bean    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use tinybean_bean::{arg, BeanClass, Catalog, InterfaceDef};
//! use tinybean_runtime::Container;
//!
//! #[derive(Default)]
//! struct Counter(i64);
//!
//! let catalog = Catalog::new()
//!     .with_interface(InterfaceDef::new("demo.CounterHome").method("create", 0))
//!     .with_interface(InterfaceDef::new("demo.Counter").method("add", 1))
//!     .with_class(
//!         BeanClass::builder("demo.CounterBean", Counter::default)
//!             .method("add", 1, |c, args| {
//!                 c.0 += arg::<i64>(args, 0)?;
//!                 Ok(json!(c.0))
//!             })
//!             .build(),
//!     );
//!
//! let jar = r#"<ejb-jar><enterprise-beans><session>
//!     <ejb-name>Counter</ejb-name>
//!     <local-home>demo.CounterHome</local-home>
//!     <local>demo.Counter</local>
//!     <ejb-class>demo.CounterBean</ejb-class>
//!     <session-type>Stateful</session-type>
//! </session></enterprise-beans></ejb-jar>"#;
//!
//! let container = Container::with_catalog(catalog);
//! container.deploy(jar.as_bytes(), None)?;
//!
//! let home = container.lookup_home("java:comp/env/ejb/CounterHome")?;
//! let counter = home.create(&[])?;
//! counter.invoke("add", &[json!(2)])?;
//! assert_eq!(counter.invoke("add", &[json!(3)])?, json!(5));
//! counter.remove()?;
//!
//! assert!(container.undeploy());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
mod container;
mod error;
pub mod lifecycle;
mod proxy;
mod tx;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use container::{component_bindings, plan_bindings, Binding, Container};
pub use error::{DeploymentError, InvocationError, LifecycleError, ProxyError};
pub use lifecycle::{InstanceState, LifecycleManager, PoolStats};
pub use proxy::{DispatchTable, HomeProxy, InstanceProxy, ProxyFactory};
pub use tx::{NoopCoordinator, TransactionCoordinator, TransactionError, TransactionId};
