//! Typed view over a type-erased supplier.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{InjectError, InjectResult};
use crate::executable::AnySupplier;
use crate::key::Key;

/// Supplier of `Arc<T>` as returned by [`Resolver::supplier`](crate::Resolver::supplier).
///
/// It wraps the very supplier held in the binding store, so two typed
/// suppliers for the same key are [`ptr_eq`](TypedSupplier::ptr_eq).
pub struct TypedSupplier<T> {
    key: Key,
    inner: AnySupplier,
    _type: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> TypedSupplier<T> {
    pub(crate) fn new(key: Key, inner: AnySupplier) -> Self {
        Self {
            key,
            inner,
            _type: PhantomData,
        }
    }

    /// Produces an instance.
    pub fn get(&self) -> InjectResult<Arc<T>> {
        self.inner
            .get()?
            .downcast::<T>()
            .map_err(|_| InjectError::TypeMismatch(self.key.type_name()))
    }

    /// Produces an instance, panicking on failure.
    pub fn get_required(&self) -> Arc<T> {
        self.get()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {:?}", std::any::type_name::<T>(), e))
    }
}

impl<T> TypedSupplier<T> {
    /// Key this supplier is bound under.
    pub fn key(&self) -> Key {
        self.key
    }

    /// The underlying store supplier.
    pub fn as_any(&self) -> &AnySupplier {
        &self.inner
    }

    /// Returns `true` when both wrap the same store supplier.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        crate::supplier::Supplier::ptr_eq(&this.inner, &other.inner)
    }
}

impl<T> Clone for TypedSupplier<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            inner: self.inner.clone(),
            _type: PhantomData,
        }
    }
}

impl<T> fmt::Debug for TypedSupplier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedSupplier")
            .field("key", &self.key)
            .field("inner", &self.inner)
            .finish()
    }
}
