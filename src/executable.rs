//! Executables: explicitly registered constructors and producers.
//!
//! An [`Executable`] replaces run-time introspection. It records the ordered
//! dependency keys of a constructor together with a type-erased invoker that
//! receives the resolved values positionally.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::{InjectError, InjectResult};
use crate::inject::Inject;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::module::{Module, ModuleRef};
use crate::supplier::Supplier;

/// Type-erased shared instance.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Type-erased supplier as kept in the binding store.
pub type AnySupplier = Supplier<InjectResult<AnyArc>>;

type Invoker = Arc<dyn Fn(Args) -> InjectResult<AnyArc> + Send + Sync>;
type PostConstruct = Arc<dyn Fn(&AnyArc) -> InjectResult<()> + Send + Sync>;

/// Positional arguments handed to an executable.
///
/// Values arrive in the order of [`Executable::dependencies`]. Typed
/// constructors consume them through [`Args::next`]; dynamic executables do
/// the same by hand.
pub struct Args {
    values: std::vec::IntoIter<(Key, AnyArc)>,
}

impl Args {
    pub(crate) fn new(values: Vec<(Key, AnyArc)>) -> Self {
        Self {
            values: values.into_iter(),
        }
    }

    /// Takes the next positional argument as `P`.
    pub fn next<P: Inject>(&mut self) -> InjectResult<P> {
        let (key, value) = self
            .values
            .next()
            .ok_or(InjectError::UnresolvedDependency(std::any::type_name::<P>()))?;
        P::from_value(&key, value)
    }

    /// Number of arguments not consumed yet.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

/// Closures usable as constructors, for up to ten parameters.
///
/// Implemented for every `Fn(P1, .., Pn) -> T` whose parameters implement
/// [`Inject`]. The parameter order is the dependency order.
pub trait Constructor<T, Params>: Send + Sync + 'static {
    /// Dependency keys, in parameter order.
    fn dependencies() -> Vec<Key>;

    /// Calls the constructor with positional arguments.
    fn construct(&self, args: &mut Args) -> InjectResult<T>;
}

macro_rules! impl_constructor {
    ($($param:ident),*) => {
        impl<T, F, $($param,)*> Constructor<T, ($($param,)*)> for F
        where
            F: Fn($($param),*) -> T + Send + Sync + 'static,
            $($param: Inject,)*
        {
            fn dependencies() -> Vec<Key> {
                vec![$(<$param as Inject>::key()),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn construct(&self, args: &mut Args) -> InjectResult<T> {
                $(let $param = args.next::<$param>()?;)*
                Ok((self)($($param),*))
            }
        }
    };
}

impl_constructor!();
impl_constructor!(P1);
impl_constructor!(P1, P2);
impl_constructor!(P1, P2, P3);
impl_constructor!(P1, P2, P3, P4);
impl_constructor!(P1, P2, P3, P4, P5);
impl_constructor!(P1, P2, P3, P4, P5, P6);
impl_constructor!(P1, P2, P3, P4, P5, P6, P7);
impl_constructor!(P1, P2, P3, P4, P5, P6, P7, P8);
impl_constructor!(P1, P2, P3, P4, P5, P6, P7, P8, P9);
impl_constructor!(P1, P2, P3, P4, P5, P6, P7, P8, P9, P10);

/// A constructor or producer together with its ordered dependencies.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{Executable, Key, Lifetime};
/// use std::sync::Arc;
///
/// struct Config { port: u16 }
/// struct Server { port: u16 }
///
/// let typed = Executable::from_constructor::<Server, _, _>(
///     |config: Arc<Config>| Server { port: config.port },
///     Lifetime::Transient,
/// );
/// assert_eq!(typed.dependencies(), &[Key::of::<Config>()]);
///
/// let dynamic = Executable::dynamic::<Server, _>(
///     vec![Key::of::<Config>()],
///     Lifetime::SINGLETON,
///     |mut args| {
///         let config = args.next::<Arc<Config>>()?;
///         Ok(Server { port: config.port })
///     },
/// );
/// assert_eq!(dynamic.arity(), 1);
/// assert!(dynamic.lifetime().is_singleton());
/// ```
#[derive(Clone)]
pub struct Executable {
    name: &'static str,
    produces: TypeId,
    dependencies: SmallVec<[Key; 4]>,
    lifetime: Lifetime,
    invoker: Invoker,
    post_construct: Option<PostConstruct>,
    module: Option<ModuleRef>,
}

impl Executable {
    /// Wraps a typed constructor of up to ten parameters.
    pub fn from_constructor<T, P, C>(constructor: C, lifetime: Lifetime) -> Self
    where
        T: Send + Sync + 'static,
        C: Constructor<T, P>,
    {
        Self {
            name: std::any::type_name::<T>(),
            produces: TypeId::of::<T>(),
            dependencies: C::dependencies().into(),
            lifetime,
            invoker: Arc::new(move |mut args: Args| {
                constructor
                    .construct(&mut args)
                    .map(|value| Arc::new(value) as AnyArc)
            }),
            post_construct: None,
            module: None,
        }
    }

    /// Executable with an explicit dependency list of any length.
    ///
    /// The invoker receives one argument per dependency key. The invocation
    /// adapter rejects executables with more parameters than it supports.
    pub fn dynamic<T, F>(dependencies: Vec<Key>, lifetime: Lifetime, invoker: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(Args) -> InjectResult<T> + Send + Sync + 'static,
    {
        Self {
            name: std::any::type_name::<T>(),
            produces: TypeId::of::<T>(),
            dependencies: dependencies.into(),
            lifetime,
            invoker: Arc::new(move |args: Args| invoker(args).map(|value| Arc::new(value) as AnyArc)),
            post_construct: None,
            module: None,
        }
    }

    /// Same executable with a different lifetime.
    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Runs `hook` on every value this executable constructs, before the
    /// value is cached or handed out.
    ///
    /// `T` must be the produced type; otherwise construction fails with
    /// `TypeMismatch`.
    pub fn with_post_construct<T, F>(mut self, hook: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let name = self.name;
        self.post_construct = Some(Arc::new(move |value: &AnyArc| {
            let value = value.downcast_ref::<T>().ok_or(InjectError::TypeMismatch(name))?;
            hook(value);
            Ok(())
        }));
        self
    }

    /// Configures `module` on the injector the first time a key bound to
    /// this executable is expanded. Bindings the module declares take
    /// precedence over the executable itself.
    pub fn configured_by<M: Module>(mut self, module: M) -> Self {
        self.module = Some(ModuleRef::new(module));
        self
    }

    /// Module configured before this executable is first expanded.
    pub fn module(&self) -> Option<&ModuleRef> {
        self.module.as_ref()
    }

    /// Name of the produced type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `TypeId` of the produced type.
    pub fn produces(&self) -> TypeId {
        self.produces
    }

    /// Dependency keys, in parameter order.
    pub fn dependencies(&self) -> &[Key] {
        &self.dependencies
    }

    /// Number of positional parameters.
    pub fn arity(&self) -> usize {
        self.dependencies.len()
    }

    /// Caching the invocation adapter applies to constructed values.
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Runs the executable with already resolved arguments.
    pub fn invoke(&self, args: Args) -> InjectResult<AnyArc> {
        (self.invoker)(args)
    }

    /// Runs the post-construct hook, if any, on a value this executable produced.
    pub fn post_construct(&self, value: &AnyArc) -> InjectResult<()> {
        match &self.post_construct {
            Some(hook) => hook(value),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Executable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executable")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("lifetime", &self.lifetime)
            .field("post_construct", &self.post_construct.is_some())
            .field("module", &self.module)
            .finish()
    }
}
