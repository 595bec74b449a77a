//! Bean authoring for TinyBean.
//!
//! Bean code never touches the container directly. It describes itself
//! through three pieces:
//!
//! | Piece | Purpose |
//! |-------|---------|
//! | [`InterfaceDef`] | Methods a home or component view exposes |
//! | [`BeanClass`] | Constructor, `create*` initializers, business methods, destroy callback |
//! | [`Catalog`] | Lookup of both by the identifiers a descriptor uses |
//!
//! Arguments and results travel as [`serde_json::Value`]; use [`arg`] to
//! pull typed arguments out. Failures are [`BusinessError`]s, which the
//! container hands back to clients untouched.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use tinybean_bean::{arg, BeanClass, Catalog, InterfaceDef, MethodSignature};
//!
//! #[derive(Default)]
//! struct Greeter {
//!     greeting: String,
//! }
//!
//! let catalog = Catalog::new()
//!     .with_interface(InterfaceDef::new("demo.GreeterLocal").method("greet", 1))
//!     .with_class(
//!         BeanClass::builder("demo.GreeterBean", Greeter::default)
//!             .init("create", 1, |g, args| {
//!                 g.greeting = arg(args, 0)?;
//!                 Ok(())
//!             })
//!             .method("greet", 1, |g, args| {
//!                 let who: String = arg(args, 0)?;
//!                 Ok(json!(format!("{}, {who}", g.greeting)))
//!             })
//!             .build(),
//!     );
//!
//! let class = catalog.class("demo.GreeterBean").expect("registered");
//! let mut bean = class.instantiate();
//! class.initialize(&mut bean, &MethodSignature::new("create", 1), &[json!("Hello")])?;
//! let out = class.invoke(&mut bean, &MethodSignature::new("greet", 1), &[json!("Bob")])?;
//! assert_eq!(out, json!("Hello, Bob"));
//! # Ok::<(), tinybean_bean::BusinessError>(())
//! ```

mod args;
mod catalog;
mod class;
mod error;
mod interface;

pub use args::arg;
pub use catalog::Catalog;
pub use class::{BeanClass, BeanClassBuilder, BeanInstance, NO_HANDLER, TYPE_MISMATCH};
pub use error::BusinessError;
pub use interface::{InterfaceDef, MethodSignature};
