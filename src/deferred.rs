//! Deferred (supplier-of-T) handles.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{InjectError, InjectResult};
use crate::executable::{AnyArc, AnySupplier};
use crate::inject::Inject;
use crate::key::Key;
use crate::store::WeakStore;
use crate::supplier::{enhancing_after, Supplier};

/// Untyped deferred handle as stored behind a deferred key.
pub(crate) struct DeferredHandle {
    key: Key,
    resolve: Supplier<InjectResult<AnySupplier>>,
}

impl DeferredHandle {
    /// Handle resolving the direct form of `key` from `store`.
    ///
    /// The first `enhance_after` calls look the key up in the store; after
    /// that the looked-up supplier is kept (weakly) and called directly.
    pub(crate) fn new(key: Key, store: WeakStore, enhance_after: usize) -> Self {
        let key = key.direct();
        let lookup = move || -> InjectResult<AnySupplier> {
            match store.get(&key) {
                Some(Some(supplier)) => Ok(supplier),
                Some(None) => Err(InjectError::UnresolvedDependency(key.type_name())),
                None => Err(InjectError::InjectorDropped(key.type_name())),
            }
        };

        let initial = lookup.clone();
        let resolve = enhancing_after(enhance_after, initial, move || match lookup() {
            Ok(supplier) => {
                let weak = supplier.downgrade();
                Supplier::new(move || {
                    weak.upgrade()
                        .ok_or(InjectError::InjectorDropped(key.type_name()))
                })
            }
            // Not bound yet, keep looking it up
            Err(_) => Supplier::new(lookup.clone()),
        });

        Self { key, resolve }
    }

    pub(crate) fn get(&self) -> InjectResult<AnyArc> {
        self.resolve.get()?.get()
    }
}

/// Lazily resolved dependency on `T`.
///
/// Asking for `Deferred<T>` instead of `Arc<T>` defers the lookup until
/// [`get`](Deferred::get) is called, after the whole graph has been built.
/// This is the only way to express a circular dependency.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{ConstructorCollection, Deferred, Resolver};
/// use std::sync::Arc;
///
/// struct Parent { child: Arc<Child> }
/// struct Child { parent: Deferred<Parent> }
///
/// let mut services = ConstructorCollection::new();
/// services.add_singleton::<Parent, _, _>(|child: Arc<Child>| Parent { child });
/// services.add_singleton::<Child, _, _>(|parent: Deferred<Parent>| Child { parent });
///
/// let injector = services.build();
/// let parent = injector.get_required::<Parent>();
/// assert!(Arc::ptr_eq(&parent.child.parent.get_required(), &parent));
/// ```
pub struct Deferred<T> {
    handle: Arc<DeferredHandle>,
    _type: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Deferred<T> {
    /// Resolves the dependency.
    pub fn get(&self) -> InjectResult<Arc<T>> {
        self.handle
            .get()?
            .downcast::<T>()
            .map_err(|_| InjectError::TypeMismatch(self.handle.key.type_name()))
    }

    /// Resolves the dependency, panicking on failure.
    ///
    /// # Panics
    ///
    /// If the injector has been dropped or construction of `T` failed.
    pub fn get_required(&self) -> Arc<T> {
        self.get()
            .unwrap_or_else(|e| panic!("Failed to resolve deferred {}: {:?}", std::any::type_name::<T>(), e))
    }
}

impl<T> Deferred<T> {
    /// Direct key this handle resolves.
    pub fn key(&self) -> Key {
        self.handle.key
    }
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            _type: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Deferred").field(&self.handle.key).finish()
    }
}

impl<T: Send + Sync + 'static> Inject for Deferred<T> {
    fn key() -> Key {
        Key::of::<T>().deferred()
    }

    fn from_value(key: &Key, value: AnyArc) -> InjectResult<Self> {
        value
            .downcast::<DeferredHandle>()
            .map(|handle| Self {
                handle,
                _type: PhantomData,
            })
            .map_err(|_| InjectError::TypeMismatch(key.type_name()))
    }
}
