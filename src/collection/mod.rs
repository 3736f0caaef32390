//! Constructor collection: registers executables and builds an injector.

use std::sync::Arc;

use crate::adapter::{DefaultAdapter, InvocationAdapter};
use crate::config::InjectorOptions;
use crate::executable::{Constructor, Executable};
use crate::injector::Injector;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::observer::{BuildObserver, Observers};
use crate::registration::Registry;

/// Collects the constructors an [`Injector`] may invoke.
///
/// Registration only records an [`Executable`] per key; nothing is
/// constructed or even checked until a key is first demanded.
pub struct ConstructorCollection {
    registry: Registry,
    observers: Observers,
    options: InjectorOptions,
    adapter: Option<Arc<dyn InvocationAdapter>>,
}

impl ConstructorCollection {
    /// Creates an empty collection with default options.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            observers: Observers::new(),
            options: InjectorOptions::default(),
            adapter: None,
        }
    }

    // ----- Typed constructors -----

    /// Registers a constructor invoked on every request.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrous_injector::{ConstructorCollection, Resolver};
    /// use std::sync::Arc;
    ///
    /// struct Request { id: u32 }
    ///
    /// let mut services = ConstructorCollection::new();
    /// services.add_transient::<Request, _, _>(|| Request { id: 1 });
    ///
    /// let injector = services.build();
    /// let a = injector.get_required::<Request>();
    /// let b = injector.get_required::<Request>();
    /// assert!(!Arc::ptr_eq(&a, &b));
    /// assert_eq!(a.id, b.id);
    /// ```
    pub fn add_transient<T, P, C>(&mut self, constructor: C) -> &mut Self
    where
        T: Send + Sync + 'static,
        C: Constructor<T, P>,
    {
        self.add_constructor(Key::of::<T>(), Lifetime::Transient, constructor)
    }

    /// Registers a constructor invoked once, on first request.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrous_injector::{ConstructorCollection, Resolver};
    /// use std::sync::Arc;
    ///
    /// struct Pool;
    ///
    /// let mut services = ConstructorCollection::new();
    /// services.add_singleton::<Pool, _, _>(|| Pool);
    ///
    /// let injector = services.build();
    /// assert!(Arc::ptr_eq(&injector.get_required::<Pool>(), &injector.get_required::<Pool>()));
    /// ```
    pub fn add_singleton<T, P, C>(&mut self, constructor: C) -> &mut Self
    where
        T: Send + Sync + 'static,
        C: Constructor<T, P>,
    {
        self.add_constructor(Key::of::<T>(), Lifetime::SINGLETON, constructor)
    }

    /// Registers a constructor invoked once, as soon as its key is bound.
    pub fn add_eager_singleton<T, P, C>(&mut self, constructor: C) -> &mut Self
    where
        T: Send + Sync + 'static,
        C: Constructor<T, P>,
    {
        self.add_constructor(Key::of::<T>(), Lifetime::EAGER_SINGLETON, constructor)
    }

    // ----- Qualified constructors -----

    pub fn add_named_transient<T, P, C>(&mut self, qualifier: &'static str, constructor: C) -> &mut Self
    where
        T: Send + Sync + 'static,
        C: Constructor<T, P>,
    {
        self.add_constructor(Key::named::<T>(qualifier), Lifetime::Transient, constructor)
    }

    /// Registers a singleton under a qualifier.
    ///
    /// Qualified keys are distinct from the plain key of the same type and
    /// are requested with [`Qualified`](crate::Qualified) parameters or
    /// [`Resolver::get_named`](crate::Resolver::get_named).
    pub fn add_named_singleton<T, P, C>(&mut self, qualifier: &'static str, constructor: C) -> &mut Self
    where
        T: Send + Sync + 'static,
        C: Constructor<T, P>,
    {
        self.add_constructor(Key::named::<T>(qualifier), Lifetime::SINGLETON, constructor)
    }

    pub fn add_named_eager_singleton<T, P, C>(&mut self, qualifier: &'static str, constructor: C) -> &mut Self
    where
        T: Send + Sync + 'static,
        C: Constructor<T, P>,
    {
        self.add_constructor(Key::named::<T>(qualifier), Lifetime::EAGER_SINGLETON, constructor)
    }

    // ----- Explicit keys -----

    /// Registers a typed constructor for an explicit key.
    ///
    /// `key` must be a key of `T`; a mismatch surfaces as
    /// [`InjectError::TypeMismatch`](crate::InjectError::TypeMismatch) when
    /// the key is resolved through the typed API.
    pub fn add_constructor<T, P, C>(&mut self, key: Key, lifetime: Lifetime, constructor: C) -> &mut Self
    where
        T: Send + Sync + 'static,
        C: Constructor<T, P>,
    {
        self.add_executable(key, Executable::from_constructor::<T, P, C>(constructor, lifetime))
    }

    /// Registers a prepared executable, replacing any earlier registration
    /// for the same key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrous_injector::{ConstructorCollection, Executable, Key, Lifetime, Resolver};
    /// use std::sync::Arc;
    ///
    /// let mut services = ConstructorCollection::new();
    /// services.add_singleton::<u32, _, _>(|| 20u32);
    /// services.add_executable(
    ///     Key::of::<u64>(),
    ///     Executable::dynamic::<u64, _>(vec![Key::of::<u32>()], Lifetime::Transient, |mut args| {
    ///         Ok(*args.next::<Arc<u32>>()? as u64 * 2)
    ///     }),
    /// );
    ///
    /// let injector = services.build();
    /// assert_eq!(*injector.get_required::<u64>(), 40);
    /// ```
    pub fn add_executable(&mut self, key: Key, executable: Executable) -> &mut Self {
        self.registry.insert(key, executable);
        self
    }

    // ----- Injector configuration -----

    /// Adds a build observer.
    pub fn add_observer(&mut self, observer: Arc<dyn BuildObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    pub fn with_options(&mut self, options: InjectorOptions) -> &mut Self {
        self.options = options;
        self
    }

    /// Replaces the default invocation adapter.
    ///
    /// A custom adapter ignores [`InjectorOptions::max_arity`]; it enforces
    /// its own limits in [`InvocationAdapter::validate`].
    pub fn with_adapter(&mut self, adapter: Arc<dyn InvocationAdapter>) -> &mut Self {
        self.adapter = Some(adapter);
        self
    }

    /// Number of registered executables.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    /// Freezes the collection into an [`Injector`].
    pub fn build(self) -> Injector {
        let adapter = self
            .adapter
            .unwrap_or_else(|| Arc::new(DefaultAdapter::new(self.options.max_arity)));
        Injector::new(self.registry, adapter, self.options, self.observers)
    }
}

impl Default for ConstructorCollection {
    fn default() -> Self {
        Self::new()
    }
}
