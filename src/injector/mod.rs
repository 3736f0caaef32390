//! The injector: resolver façade over the binding store.

use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Instant;

use parking_lot::{Mutex, ReentrantMutex};

use crate::adapter::InvocationAdapter;
use crate::binding::{Binding, BindingTarget};
use crate::config::InjectorOptions;
use crate::deferred::DeferredHandle;
use crate::error::{InjectError, InjectResult};
use crate::executable::{AnyArc, AnySupplier, Executable};
use crate::graph::{GraphBuilder, Node, NodeKind};
use crate::key::Key;
use crate::module::{Module, ModuleRef};
use crate::observer::Observers;
use crate::registration::Registry;
use crate::store::{BindingStore, WeakStore};
use crate::supplier::{factory_lazy, Supplier};
use crate::traits::ResolverCore;

/// Dependency injector.
///
/// Resolution has two paths. The fast path is a shared-lock lookup in the
/// binding store and never blocks other readers. On a miss the slow path
/// takes the injector's build lock, checks the store again, expands the
/// missing key's dependency graph and binds every discovered node. Once
/// [`supplier_any`](ResolverCore::supplier_any) returns, the key and every
/// key reachable from it are bound.
///
/// Bound suppliers are never replaced. Registering or configuring a
/// binding for a key that is already bound has no effect.
///
/// The injector binds itself under `Key::of::<Injector>()`, so constructors
/// may take `Arc<Injector>` or `Deferred<Injector>`. The bound supplier holds
/// the injector weakly; a singleton keeping an `Arc<Injector>` keeps the
/// injector alive, while a `Deferred<Injector>` does not.
///
/// # Thread Safety
///
/// `Injector` is cheap to clone and can be shared across threads. Two
/// threads missing the same key build its graph once.
///
/// # Examples
///
/// ```
/// use ferrous_injector::{ConstructorCollection, Deferred, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: &'static str }
/// struct Users { db: Arc<Database>, audit: Deferred<Audit> }
/// struct Audit { users: Deferred<Users> }
///
/// let mut services = ConstructorCollection::new();
/// services.add_singleton::<Database, _, _>(|| Database { url: "postgres://localhost" });
/// services.add_singleton::<Users, _, _>(|db: Arc<Database>, audit: Deferred<Audit>| Users { db, audit });
/// services.add_singleton::<Audit, _, _>(|users: Deferred<Users>| Audit { users });
///
/// let injector = services.build();
/// let users = injector.get_required::<Users>();
/// assert_eq!(users.db.url, "postgres://localhost");
///
/// let audit = users.audit.get_required();
/// assert!(Arc::ptr_eq(&audit.users.get_required(), &users));
/// ```
#[derive(Clone)]
pub struct Injector {
    inner: Arc<InjectorInner>,
}

struct InjectorInner {
    store: BindingStore,
    registry: Registry,
    adapter: Arc<dyn InvocationAdapter>,
    options: InjectorOptions,
    observers: Observers,
    modules: Mutex<HashSet<TypeId>>,
    // Re-entrant so eager singletons may resolve further keys while being bound
    build_lock: ReentrantMutex<()>,
}

impl Injector {
    pub(crate) fn new(
        registry: Registry,
        adapter: Arc<dyn InvocationAdapter>,
        options: InjectorOptions,
        observers: Observers,
    ) -> Self {
        Self {
            inner: Arc::new_cyclic(|inner| {
                let store = BindingStore::new();
                store.put_if_absent(Key::of::<Injector>(), self_supplier(inner.clone()));
                InjectorInner {
                    store,
                    registry,
                    adapter,
                    options,
                    observers,
                    modules: Mutex::new(HashSet::new()),
                    build_lock: ReentrantMutex::new(()),
                }
            }),
        }
    }

    /// Options this injector was built with.
    pub fn options(&self) -> &InjectorOptions {
        &self.inner.options
    }

    /// Keys bound so far, sorted by type name. The injector's own key is
    /// left out.
    pub fn bound_keys(&self) -> Vec<Key> {
        let own = Key::of::<Injector>();
        let mut keys: Vec<Key> = self.inner.store.keys().into_iter().filter(|key| *key != own).collect();
        keys.sort();
        keys
    }

    /// Returns `true` if `key` already has a supplier.
    pub fn is_bound(&self, key: &Key) -> bool {
        self.inner.store.contains(key)
    }

    /// Processes the bindings of every module not configured yet.
    ///
    /// Each module type is processed at most once per injector. Resolved
    /// bindings go straight into the binding store. Class and producer
    /// bindings get their dependency graph built and bound first; eager
    /// singletons are constructed before this returns and their failures are
    /// returned from here.
    ///
    /// A module whose configuration fails may be configured again. Bindings
    /// it published before failing stay bound; an eager singleton that failed
    /// to construct is not published and is constructed again on retry.
    ///
    /// # Errors
    ///
    /// * `NullArgument` if `modules` is `None`
    /// * `MissingBinding` for a class binding whose implementation has no
    ///   registered constructor
    /// * any error raised while building a binding's dependency graph or
    ///   constructing an eager singleton
    pub fn configure(&self, modules: Option<&[ModuleRef]>) -> InjectResult<&Self> {
        let modules = modules.ok_or(InjectError::NullArgument("modules"))?;
        let _guard = self.inner.build_lock.lock();

        for module in modules {
            if !self.inner.modules.lock().insert(module.id()) {
                tracing::debug!(module = module.name(), "module already configured");
                continue;
            }

            let bindings = module.collect_bindings();
            tracing::debug!(module = module.name(), bindings = bindings.len(), "configuring module");

            for binding in bindings {
                if let Err(error) = self.bind(binding) {
                    self.inner.modules.lock().remove(&module.id());
                    return Err(error);
                }
            }
        }

        Ok(self)
    }

    /// Configures a single module.
    pub fn configure_module<M: Module>(&self, module: M) -> InjectResult<&Self> {
        let modules = [ModuleRef::new(module)];
        self.configure(Some(&modules[..]))
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Injector Debug ===\n");
        s.push_str("Bound Keys:\n");
        for key in self.bound_keys() {
            s.push_str(&format!("  {}\n", key));
        }
        s
    }

    fn bind(&self, binding: Binding) -> InjectResult<()> {
        let (key, target, lifetime) = binding.into_parts();
        let store = &self.inner.store;

        if store.contains(&key) {
            tracing::warn!(key = %key, "ignoring binding for already bound key");
            return Ok(());
        }

        match target {
            BindingTarget::Instance(instance) => {
                let value: &dyn Any = &*instance;
                if value.type_id() != key.type_id() {
                    return Err(InjectError::TypeMismatch(key.type_name()));
                }
                store.put_if_absent(key, Supplier::constant(Ok(instance)));
            }
            BindingTarget::Supplier(supplier) => {
                store.put_if_absent(key, supplier);
            }
            BindingTarget::Constructor(implementation) => {
                let executable = self
                    .inner
                    .registry
                    .get(&implementation)
                    .cloned()
                    .ok_or(InjectError::MissingBinding(implementation.type_name()))?;
                self.bind_executable(key, executable.with_lifetime(lifetime))?;
            }
            BindingTarget::Producer(executable) => {
                self.bind_executable(key, executable.with_lifetime(lifetime))?;
            }
        }

        tracing::trace!(key = %key, "binding configured");
        Ok(())
    }

    /// Binds an executable that lives outside the registry under `key`.
    fn bind_executable(&self, key: Key, executable: Executable) -> InjectResult<()> {
        if executable.produces() != key.type_id() {
            return Err(InjectError::TypeMismatch(key.type_name()));
        }
        self.inner.adapter.validate(&executable)?;

        let configure = self.configure_hook();
        let nodes = GraphBuilder::new(&self.inner.store, &self.inner.registry, self.inner.adapter.as_ref())
            .with_configure(&configure)
            .build_dependencies(key, executable.dependencies())?;
        self.bind_nodes(nodes);

        let parameters = parameters(&self.inner.store.downgrade(), &executable, self.inner.options.enhance_after)?;
        let supplier = self.inner.adapter.create(&executable, parameters);

        // A failed eager singleton stays unpublished so a retry constructs it again
        if executable.lifetime().is_eager() {
            supplier.get()?;
        }
        self.inner.store.put_if_absent(key, supplier);
        Ok(())
    }

    /// Slow path: build and bind the graph of `key` under the build lock.
    fn build(&self, key: Key) -> InjectResult<AnySupplier> {
        let _guard = self.inner.build_lock.lock();

        // Another thread may have bound it while we waited
        if let Some(supplier) = self.inner.store.get(&key) {
            return Ok(supplier);
        }

        let observing = self.inner.observers.has_observers();
        if observing {
            self.inner.observers.building(&key);
        }
        let start = Instant::now();

        let configure = self.configure_hook();
        let bound = GraphBuilder::new(&self.inner.store, &self.inner.registry, self.inner.adapter.as_ref())
            .with_configure(&configure)
            .build_tree(key)
            .map(|nodes| self.bind_nodes(nodes));

        match bound {
            Ok(count) => {
                let duration = start.elapsed();
                tracing::debug!(key = %key, nodes = count, ?duration, "dependency graph bound");
                if observing {
                    self.inner.observers.built(&key, count, duration);
                }
            }
            Err(error) => {
                tracing::debug!(key = %key, %error, "dependency graph build failed");
                if observing {
                    self.inner.observers.build_failed(&key, &error);
                }
                return Err(error);
            }
        }

        self.inner
            .store
            .get(&key)
            .ok_or(InjectError::UnresolvedDependency(key.type_name()))
    }

    /// Configures the module an executable names, while its graph is expanded.
    fn configure_hook(&self) -> impl Fn(&ModuleRef) -> InjectResult<()> + '_ {
        move |module: &ModuleRef| self.configure(Some(std::slice::from_ref(module))).map(|_| ())
    }

    /// Binds nodes in order, returning how many were newly bound.
    fn bind_nodes(&self, nodes: Vec<Node>) -> usize {
        let enhance_after = self.inner.options.enhance_after;
        let mut count = 0;
        for node in nodes {
            if self.inner.store.contains(&node.key) {
                continue;
            }

            let supplier = match node.kind {
                NodeKind::Defer => deferred_supplier(&self.inner.store.downgrade(), node.key, enhance_after),
                NodeKind::Construct(executable) => {
                    // Direct dependencies still on the path get bound after this node,
                    // so parameters are collected on first demand
                    let store = self.inner.store.downgrade();
                    let adapter = self.inner.adapter.clone();
                    factory_lazy(move || match parameters(&store, &executable, enhance_after) {
                        Ok(parameters) => adapter.create(&executable, parameters),
                        Err(error) => Supplier::constant(Err(error)),
                    })
                }
            };

            tracing::trace!(key = %node.key, "binding node");
            self.inner.store.put_if_absent(node.key, supplier);
            count += 1;
        }
        count
    }
}

/// Parameter suppliers of `executable`, in dependency order.
fn parameters(store: &WeakStore, executable: &Executable, enhance_after: usize) -> InjectResult<Vec<(Key, AnySupplier)>> {
    executable
        .dependencies()
        .iter()
        .map(|key| {
            let supplier = if key.is_deferred() {
                deferred_supplier(store, *key, enhance_after)
            } else {
                store
                    .get(key)
                    .ok_or(InjectError::InjectorDropped(key.type_name()))?
                    .ok_or(InjectError::UnresolvedDependency(key.type_name()))?
            };
            Ok((*key, supplier))
        })
        .collect()
}

fn self_supplier(inner: Weak<InjectorInner>) -> AnySupplier {
    Supplier::new(move || {
        inner
            .upgrade()
            .map(|inner| Arc::new(Injector { inner }) as AnyArc)
            .ok_or(InjectError::InjectorDropped(std::any::type_name::<Injector>()))
    })
}

fn deferred_supplier(store: &WeakStore, key: Key, enhance_after: usize) -> AnySupplier {
    let handle = DeferredHandle::new(key, store.clone(), enhance_after);
    Supplier::constant(Ok(Arc::new(handle) as AnyArc))
}

impl ResolverCore for Injector {
    fn supplier_any(&self, key: Option<&Key>) -> InjectResult<AnySupplier> {
        let key = *key.ok_or(InjectError::NullArgument("key"))?;

        if let Some(supplier) = self.inner.store.get(&key) {
            return Ok(supplier);
        }
        self.build(key)
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("registered", &self.inner.registry.len())
            .field("bound", &self.inner.store.len())
            .field("options", &self.inner.options)
            .finish()
    }
}
