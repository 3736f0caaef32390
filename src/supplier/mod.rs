//! Suppliers: repeatable, zero-argument factories for values.
//!
//! Every binding in the injector ends up as a [`Supplier`]. The
//! [`combinators`] module holds the memoization strategies used to build
//! them, and they are usable on their own.

use std::fmt;
use std::sync::{Arc, Weak};

pub mod combinators;
mod typed;

pub use combinators::{enhancing, enhancing_after, factory_lazy, lazy, singleton, DEFAULT_ENHANCE_AFTER};
pub use typed::TypedSupplier;

/// Cloneable, thread-safe handle to a zero-argument factory.
///
/// Clones share the underlying closure, so [`Supplier::ptr_eq`] can be used
/// to check that two handles are the same cached supplier.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::Supplier;
///
/// let answer = Supplier::new(|| 42);
/// let alias = answer.clone();
///
/// assert_eq!(answer.get(), 42);
/// assert!(Supplier::ptr_eq(&answer, &alias));
/// assert!(!Supplier::ptr_eq(&answer, &Supplier::constant(42)));
/// ```
pub struct Supplier<T>(Arc<dyn Fn() -> T + Send + Sync>);

impl<T: 'static> Supplier<T> {
    /// Wraps `f` into a supplier.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Produces a value.
    #[inline]
    pub fn get(&self) -> T {
        (self.0)()
    }

    /// Returns `true` when both handles point at the same supplier.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&this.0), Arc::as_ptr(&other.0))
    }

    pub(crate) fn downgrade(&self) -> WeakSupplier<T> {
        WeakSupplier(Arc::downgrade(&self.0))
    }
}

impl<T: Clone + Send + Sync + 'static> Supplier<T> {
    /// Supplier returning clones of `value`.
    pub fn constant(value: T) -> Self {
        Self::new(move || value.clone())
    }
}

impl<T> Clone for Supplier<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> fmt::Debug for Supplier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Supplier")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// Non-owning supplier handle.
pub(crate) struct WeakSupplier<T>(Weak<dyn Fn() -> T + Send + Sync>);

impl<T> WeakSupplier<T> {
    pub(crate) fn upgrade(&self) -> Option<Supplier<T>> {
        self.0.upgrade().map(Supplier)
    }
}
