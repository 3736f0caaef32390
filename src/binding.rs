//! Declarative bindings produced by modules.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::executable::{AnyArc, AnySupplier, Constructor, Executable};
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::supplier::Supplier;

/// What a binding binds its key to.
#[derive(Clone)]
pub enum BindingTarget {
    /// The registered constructor of another key
    Constructor(Key),
    /// A producer supplied by the module itself
    Producer(Executable),
    /// A ready-made instance
    Instance(AnyArc),
    /// A ready-made supplier
    Supplier(AnySupplier),
}

/// Declared intent to satisfy a key, consumed once by
/// [`Injector::configure`](crate::Injector::configure).
#[derive(Clone)]
pub struct Binding {
    key: Key,
    target: BindingTarget,
    lifetime: Lifetime,
}

impl Binding {
    pub fn new(key: Key, target: BindingTarget, lifetime: Lifetime) -> Self {
        Self {
            key: key.direct(),
            target,
            lifetime,
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn target(&self) -> &BindingTarget {
        &self.target
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Instances and suppliers need no construction.
    pub fn is_resolved(&self) -> bool {
        matches!(self.target, BindingTarget::Instance(_) | BindingTarget::Supplier(_))
    }

    pub fn is_singleton(&self) -> bool {
        self.lifetime.is_singleton()
    }

    pub fn is_eager(&self) -> bool {
        self.lifetime.is_eager()
    }

    pub(crate) fn into_parts(self) -> (Key, BindingTarget, Lifetime) {
        (self.key, self.target, self.lifetime)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match &self.target {
            BindingTarget::Constructor(key) => format!("Constructor({})", key),
            BindingTarget::Producer(executable) => format!("Producer({})", executable.name()),
            BindingTarget::Instance(_) => "Instance".to_string(),
            BindingTarget::Supplier(_) => "Supplier".to_string(),
        };
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("target", &target)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

/// Convenience constructors for [`Binding`].
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{Bindings, Key, Lifetime};
///
/// struct Cache;
///
/// let class = Bindings::class(Key::named::<Cache>("hot"), Key::of::<Cache>(), true, false);
/// assert!(class.is_singleton() && !class.is_eager() && !class.is_resolved());
///
/// let instance = Bindings::instance(Key::of::<u16>(), 8080u16);
/// assert!(instance.is_resolved() && instance.is_eager());
///
/// let producer = Bindings::producer::<String, _, _>(Key::of::<String>(), || "produced".to_string(), Lifetime::Transient);
/// assert!(!producer.is_singleton());
/// ```
pub struct Bindings;

impl Bindings {
    /// Binds `key` to the registered constructor of `implementation`.
    pub fn class(key: Key, implementation: Key, singleton: bool, eager: bool) -> Binding {
        let lifetime = if singleton {
            Lifetime::Singleton { eager }
        } else {
            Lifetime::Transient
        };
        Binding::new(key, BindingTarget::Constructor(implementation.direct()), lifetime)
    }

    /// Binds `key` to an existing instance.
    pub fn instance<T: Send + Sync + 'static>(key: Key, instance: T) -> Binding {
        Self::shared(key, Arc::new(instance))
    }

    /// Binds `key` to an already shared instance.
    pub fn shared<T: Send + Sync + 'static>(key: Key, instance: Arc<T>) -> Binding {
        Binding::new(key, BindingTarget::Instance(instance as Arc<dyn Any + Send + Sync>), Lifetime::EAGER_SINGLETON)
    }

    /// Binds `key` to a supplier called on every `get`.
    pub fn supplier<T, F>(key: Key, supplier: F) -> Binding
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let supplier = Supplier::new(move || Ok(Arc::new(supplier()) as AnyArc));
        Binding::new(key, BindingTarget::Supplier(supplier), Lifetime::Transient)
    }

    /// Binds `key` to a producer with its own dependencies.
    pub fn producer<T, P, C>(key: Key, producer: C, lifetime: Lifetime) -> Binding
    where
        T: Send + Sync + 'static,
        C: Constructor<T, P>,
    {
        Binding::new(key, BindingTarget::Producer(Executable::from_constructor::<T, P, C>(producer, lifetime)), lifetime)
    }
}
