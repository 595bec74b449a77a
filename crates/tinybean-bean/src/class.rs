//! Type-erased bean implementations.
//!
//! # Architecture
//!
//! ```text
//!   BeanClass::builder::<CartBean>("demo.CartBean", CartBean::default)
//!       .init("create", 1, |bean, args| ...)        // home create*
//!       .method("addItem", 1, |bean, args| ...)     // business method
//!       .on_remove(|bean| ...)                      // destroy callback
//!       .build()
//!            │
//!            ▼
//!   BeanClass ── instantiate() ──► BeanInstance (Box<dyn Any + Send>)
//!             ── initialize(instance, create/N, args)
//!             ── invoke(instance, method/N, args) ──► Value
//!             ── destroy(instance)
//! ```
//!
//! The container only ever sees [`BeanInstance`]; handlers registered on
//! the builder downcast back to the concrete type.

use crate::error::BusinessError;
use crate::interface::MethodSignature;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A live bean instance, owned by the container.
pub type BeanInstance = Box<dyn Any + Send>;

type Constructor = Box<dyn Fn() -> BeanInstance + Send + Sync>;
type Handler =
    Arc<dyn Fn(&mut (dyn Any + Send), &[Value]) -> Result<Value, BusinessError> + Send + Sync>;
type Initializer =
    Arc<dyn Fn(&mut (dyn Any + Send), &[Value]) -> Result<(), BusinessError> + Send + Sync>;
type Destructor = Box<dyn Fn(&mut (dyn Any + Send)) -> Result<(), BusinessError> + Send + Sync>;

/// Error code returned when a handler receives an instance of another class.
pub const TYPE_MISMATCH: &str = "INTERNAL_TYPE_MISMATCH";

/// Error code returned when a class has no handler for a signature.
pub const NO_HANDLER: &str = "NO_HANDLER";

fn downcast<'a, T: Any>(
    instance: &'a mut (dyn Any + Send),
    class: &str,
) -> Result<&'a mut T, BusinessError> {
    instance.downcast_mut::<T>().ok_or_else(|| {
        BusinessError::new(
            TYPE_MISMATCH,
            format!("instance is not of bean class {class}"),
        )
    })
}

/// An implementation class: constructor, initializers, business methods
/// and an optional destroy callback.
pub struct BeanClass {
    name: String,
    constructor: Constructor,
    initializers: HashMap<MethodSignature, Initializer>,
    methods: HashMap<MethodSignature, Handler>,
    destructor: Option<Destructor>,
}

impl BeanClass {
    /// Starts building a class whose instances are `T`.
    #[must_use]
    pub fn builder<T, C>(name: impl Into<String>, constructor: C) -> BeanClassBuilder<T>
    where
        T: Any + Send,
        C: Fn() -> T + Send + Sync + 'static,
    {
        BeanClassBuilder {
            class: Self {
                name: name.into(),
                constructor: Box::new(move || Box::new(constructor()) as BeanInstance),
                initializers: HashMap::new(),
                methods: HashMap::new(),
                destructor: None,
            },
            _marker: PhantomData,
        }
    }

    /// Implementation class identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a fresh, uninitialized instance.
    #[must_use]
    pub fn instantiate(&self) -> BeanInstance {
        (self.constructor)()
    }

    /// Returns `true` if a business method with this signature exists.
    #[must_use]
    pub fn has_method(&self, sig: &MethodSignature) -> bool {
        self.methods.contains_key(sig)
    }

    /// Returns `true` if an initializer with this signature exists.
    #[must_use]
    pub fn has_initializer(&self, sig: &MethodSignature) -> bool {
        self.initializers.contains_key(sig)
    }

    /// Whether `sig` can be used to initialize a fresh instance.
    ///
    /// `create/0` is always accepted; without a registered initializer it
    /// leaves the constructed state untouched.
    #[must_use]
    pub fn accepts_create(&self, sig: &MethodSignature) -> bool {
        self.has_initializer(sig) || (sig.name == "create" && sig.arity == 0)
    }

    /// Business method signatures, sorted.
    #[must_use]
    pub fn methods(&self) -> Vec<&MethodSignature> {
        let mut sigs: Vec<_> = self.methods.keys().collect();
        sigs.sort();
        sigs
    }

    /// Runs the initializer for `sig`.
    ///
    /// # Errors
    ///
    /// Propagates the initializer's error. Returns a [`NO_HANDLER`] error
    /// if the class does not accept `sig`.
    pub fn initialize(
        &self,
        instance: &mut BeanInstance,
        sig: &MethodSignature,
        args: &[Value],
    ) -> Result<(), BusinessError> {
        match self.initializers.get(sig) {
            Some(init) => init(instance.as_mut(), args),
            None if self.accepts_create(sig) => Ok(()),
            None => Err(self.no_handler(sig)),
        }
    }

    /// Runs the business method `sig`.
    ///
    /// # Errors
    ///
    /// Propagates the method's error unchanged. Returns a [`NO_HANDLER`]
    /// error if the class has no such method.
    pub fn invoke(
        &self,
        instance: &mut BeanInstance,
        sig: &MethodSignature,
        args: &[Value],
    ) -> Result<Value, BusinessError> {
        let handler = self.methods.get(sig).ok_or_else(|| self.no_handler(sig))?;
        handler(instance.as_mut(), args)
    }

    /// Runs the destroy callback, if any.
    ///
    /// # Errors
    ///
    /// Propagates the callback's error.
    pub fn destroy(&self, instance: &mut BeanInstance) -> Result<(), BusinessError> {
        match &self.destructor {
            Some(destroy) => destroy(instance.as_mut()),
            None => Ok(()),
        }
    }

    fn no_handler(&self, sig: &MethodSignature) -> BusinessError {
        BusinessError::new(NO_HANDLER, format!("{} has no handler for {sig}", self.name))
    }
}

impl fmt::Debug for BeanClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut inits: Vec<_> = self.initializers.keys().map(ToString::to_string).collect();
        inits.sort();
        f.debug_struct("BeanClass")
            .field("name", &self.name)
            .field("initializers", &inits)
            .field(
                "methods",
                &self
                    .methods()
                    .into_iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>(),
            )
            .field("has_destructor", &self.destructor.is_some())
            .finish()
    }
}

/// Builder for [`BeanClass`], typed on the instance type.
pub struct BeanClassBuilder<T> {
    class: BeanClass,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send> BeanClassBuilder<T> {
    /// Registers a home initializer (`create`, `createFor...`).
    #[must_use]
    pub fn init<F>(mut self, name: impl Into<String>, arity: usize, f: F) -> Self
    where
        F: Fn(&mut T, &[Value]) -> Result<(), BusinessError> + Send + Sync + 'static,
    {
        let class = self.class.name.clone();
        let init: Initializer = Arc::new(move |instance: &mut (dyn Any + Send), args: &[Value]| {
            f(downcast::<T>(instance, &class)?, args)
        });
        self.class
            .initializers
            .insert(MethodSignature::new(name, arity), init);
        self
    }

    /// Registers a business method.
    #[must_use]
    pub fn method<F>(mut self, name: impl Into<String>, arity: usize, f: F) -> Self
    where
        F: Fn(&mut T, &[Value]) -> Result<Value, BusinessError> + Send + Sync + 'static,
    {
        let class = self.class.name.clone();
        let handler: Handler = Arc::new(move |instance: &mut (dyn Any + Send), args: &[Value]| {
            f(downcast::<T>(instance, &class)?, args)
        });
        self.class
            .methods
            .insert(MethodSignature::new(name, arity), handler);
        self
    }

    /// Registers the destroy callback run when an instance is discarded.
    #[must_use]
    pub fn on_remove<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut T) -> Result<(), BusinessError> + Send + Sync + 'static,
    {
        let class = self.class.name.clone();
        self.class.destructor = Some(Box::new(move |instance: &mut (dyn Any + Send)| {
            f(downcast::<T>(instance, &class)?)
        }));
        self
    }

    /// Finishes the class.
    #[must_use]
    pub fn build(self) -> BeanClass {
        self.class
    }
}
