//! Resolver traits for key resolution.

use std::sync::Arc;

use crate::deferred::Deferred;
use crate::error::{InjectError, InjectResult};
use crate::executable::{AnyArc, AnySupplier};
use crate::inject::Inject;
use crate::key::Key;
use crate::supplier::TypedSupplier;

/// Core resolver trait for object-safe key resolution.
///
/// This trait works on type-erased keys and suppliers and can be used as a
/// trait object. Arguments are optional so that callers holding a possibly
/// absent key get [`InjectError::NullArgument`] instead of a panic.
///
/// Most users should use the [`Resolver`] trait instead, which provides
/// typed generic methods built on top of this trait.
pub trait ResolverCore: Send + Sync {
    /// Returns the supplier bound to `key`, building and binding the key's
    /// dependency graph first if it is not bound yet.
    ///
    /// Repeated calls for the same key return the same supplier.
    ///
    /// # Returns
    ///
    /// * `Ok(AnySupplier)` - The supplier held in the binding store
    /// * `Err(InjectError)` - `NullArgument`, `CycleDetected`,
    ///   `UnresolvedDependency` or `ArityExceeded`
    fn supplier_any(&self, key: Option<&Key>) -> InjectResult<AnySupplier>;

    /// Resolves `key` and produces one instance.
    fn resolve_any(&self, key: Option<&Key>) -> InjectResult<AnyArc> {
        self.supplier_any(key)?.get()
    }
}

/// Typed resolution interface.
///
/// Implemented for every [`ResolverCore`], including
/// [`Injector`](crate::Injector).
///
/// # Examples
///
/// ```
/// use ferrous_injector::{ConstructorCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Config { url: &'static str }
/// struct Repository { config: Arc<Config> }
///
/// let mut services = ConstructorCollection::new();
/// services.add_singleton::<Config, _, _>(|| Config { url: "postgres://localhost" });
/// services.add_transient::<Repository, _, _>(|config: Arc<Config>| Repository { config });
///
/// let injector = services.build();
///
/// let first = injector.get_required::<Repository>();
/// let second = injector.get_required::<Repository>();
/// assert!(!Arc::ptr_eq(&first, &second));
/// assert!(Arc::ptr_eq(&first.config, &second.config));
/// assert_eq!(first.config.url, "postgres://localhost");
/// ```
pub trait Resolver: ResolverCore {
    /// Typed supplier for `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_injector::{ConstructorCollection, Resolver, TypedSupplier};
    ///
    /// let mut services = ConstructorCollection::new();
    /// services.add_transient::<String, _, _>(|| "fresh".to_string());
    ///
    /// let injector = services.build();
    /// let supplier = injector.supplier::<String>().unwrap();
    /// assert_eq!(*supplier.get().unwrap(), "fresh");
    /// assert!(TypedSupplier::ptr_eq(&supplier, &injector.supplier::<String>().unwrap()));
    /// ```
    fn supplier<T: Send + Sync + 'static>(&self) -> InjectResult<TypedSupplier<T>> {
        self.supplier_key::<T>(&Key::of::<T>())
    }

    /// Typed supplier for an explicit key of type `T`.
    ///
    /// Fails with [`InjectError::TypeMismatch`] if `key` is not a direct key
    /// of `T`.
    fn supplier_key<T: Send + Sync + 'static>(&self, key: &Key) -> InjectResult<TypedSupplier<T>> {
        if key.type_id() != std::any::TypeId::of::<T>() || key.is_deferred() {
            return Err(InjectError::TypeMismatch(key.type_name()));
        }
        let inner = self.supplier_any(Some(key))?;
        Ok(TypedSupplier::new(*key, inner))
    }

    /// Resolves an instance of `T`.
    fn get<T: Send + Sync + 'static>(&self) -> InjectResult<Arc<T>> {
        self.get_key::<T>(&Key::of::<T>())
    }

    /// Resolves an instance of `T` bound under an explicit key.
    fn get_key<T: Send + Sync + 'static>(&self, key: &Key) -> InjectResult<Arc<T>> {
        self.resolve_any(Some(key))?
            .downcast::<T>()
            .map_err(|_| InjectError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves an instance of `T` bound under `qualifier`.
    fn get_named<T: Send + Sync + 'static>(&self, qualifier: &'static str) -> InjectResult<Arc<T>> {
        self.get_key::<T>(&Key::named::<T>(qualifier))
    }

    /// Resolves an instance of `T`, panicking on failure.
    fn get_required<T: Send + Sync + 'static>(&self) -> Arc<T> {
        self.get::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {:?}", std::any::type_name::<T>(), e))
    }

    /// Resolves a named instance of `T`, panicking on failure.
    fn get_named_required<T: Send + Sync + 'static>(&self, qualifier: &'static str) -> Arc<T> {
        self.get_named::<T>(qualifier).unwrap_or_else(|e| {
            panic!("Failed to resolve named {} ({}): {:?}", std::any::type_name::<T>(), qualifier, e)
        })
    }

    /// Deferred handle to `T`; nothing is constructed until it is used.
    fn deferred<T: Send + Sync + 'static>(&self) -> InjectResult<Deferred<T>> {
        let key = <Deferred<T> as Inject>::key();
        let handle = self.resolve_any(Some(&key))?;
        Deferred::from_value(&key, handle)
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
