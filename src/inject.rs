//! Parameter types a constructor can ask for.

use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use crate::error::{InjectError, InjectResult};
use crate::executable::AnyArc;
use crate::key::Key;

/// A value that can be injected as a constructor parameter.
///
/// Implemented for `Arc<T>` (direct dependency), [`Deferred<T>`](crate::Deferred)
/// (supplier-of-T, the only way to break a cycle) and [`Qualified<T, Q>`].
pub trait Inject: Sized + 'static {
    /// Key this parameter is resolved by.
    fn key() -> Key;

    /// Converts the resolved value for `key` into the parameter.
    fn from_value(key: &Key, value: AnyArc) -> InjectResult<Self>;
}

impl<T: Send + Sync + 'static> Inject for Arc<T> {
    fn key() -> Key {
        Key::of::<T>()
    }

    fn from_value(key: &Key, value: AnyArc) -> InjectResult<Self> {
        value
            .downcast::<T>()
            .map_err(|_| InjectError::TypeMismatch(key.type_name()))
    }
}

/// Names the qualifier of a [`Qualified`] parameter.
///
/// ```rust
/// use ferrous_injector::Qualifier;
///
/// struct Primary;
/// impl Qualifier for Primary {
///     const NAME: &'static str = "primary";
/// }
/// ```
pub trait Qualifier: 'static {
    const NAME: &'static str;
}

/// Direct dependency on the `Q`-qualified binding of `T`.
///
/// ```rust
/// use ferrous_injector::{ConstructorCollection, Qualified, Qualifier, Resolver};
/// use std::sync::Arc;
///
/// struct Replica;
/// impl Qualifier for Replica {
///     const NAME: &'static str = "replica";
/// }
///
/// struct Pool(&'static str);
/// struct Reports { pool: Qualified<Pool, Replica> }
///
/// let mut services = ConstructorCollection::new();
/// services.add_named_singleton::<Pool, _, _>("replica", || Pool("replica-db"));
/// services.add_transient::<Reports, _, _>(|pool: Qualified<Pool, Replica>| Reports { pool });
///
/// let injector = services.build();
/// assert_eq!(injector.get_required::<Reports>().pool.0, "replica-db");
/// ```
pub struct Qualified<T, Q> {
    value: Arc<T>,
    _qualifier: PhantomData<fn() -> Q>,
}

impl<T, Q> Qualified<T, Q> {
    pub fn into_inner(self) -> Arc<T> {
        self.value
    }
}

impl<T, Q> Deref for Qualified<T, Q> {
    type Target = Arc<T>;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T, Q> Clone for Qualified<T, Q> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _qualifier: PhantomData,
        }
    }
}

impl<T: Send + Sync + 'static, Q: Qualifier> Inject for Qualified<T, Q> {
    fn key() -> Key {
        Key::named::<T>(Q::NAME)
    }

    fn from_value(key: &Key, value: AnyArc) -> InjectResult<Self> {
        Ok(Self {
            value: <Arc<T> as Inject>::from_value(key, value)?,
            _qualifier: PhantomData,
        })
    }
}
