//! Modules: declarative sources of bindings.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use crate::binding::Binding;

/// A source of [`Binding`]s.
///
/// Modules are handed to [`Injector::configure`](crate::Injector::configure),
/// which processes each module type at most once.
///
/// # Example
///
/// ```rust
/// use ferrous_injector::{Bindings, ConstructorCollection, Key, Module, Resolver};
/// use std::sync::Arc;
///
/// struct Settings { url: &'static str }
/// struct Client { url: &'static str }
///
/// struct ClientModule;
///
/// impl Module for ClientModule {
///     fn collect_bindings(&self) -> Vec<ferrous_injector::Binding> {
///         vec![
///             Bindings::instance(Key::of::<Settings>(), Settings { url: "https://api" }),
///             Bindings::class(Key::of::<Client>(), Key::of::<Client>(), true, false),
///         ]
///     }
/// }
///
/// let mut services = ConstructorCollection::new();
/// services.add_transient::<Client, _, _>(|settings: Arc<Settings>| Client { url: settings.url });
///
/// let injector = services.build();
/// injector.configure_module(ClientModule).unwrap();
///
/// let client = injector.get_required::<Client>();
/// assert_eq!(client.url, "https://api");
/// assert!(Arc::ptr_eq(&client, &injector.get_required::<Client>()));
/// ```
pub trait Module: Send + Sync + 'static {
    /// Bindings declared by this module, in processing order.
    fn collect_bindings(&self) -> Vec<Binding>;
}

/// A module together with the identity of its type.
#[derive(Clone)]
pub struct ModuleRef {
    id: TypeId,
    name: &'static str,
    module: Arc<dyn Module>,
}

impl ModuleRef {
    pub fn new<M: Module>(module: M) -> Self {
        Self {
            id: TypeId::of::<M>(),
            name: std::any::type_name::<M>(),
            module: Arc::new(module),
        }
    }

    /// `TypeId` of the module type; configuration is idempotent per id.
    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn collect_bindings(&self) -> Vec<Binding> {
        self.module.collect_bindings()
    }
}

impl<M: Module> From<M> for ModuleRef {
    fn from(module: M) -> Self {
        Self::new(module)
    }
}

impl fmt::Debug for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModuleRef").field(&self.name).finish()
    }
}
