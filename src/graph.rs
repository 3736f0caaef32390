//! Dependency graph construction and cycle detection.
//!
//! A build pass expands a root key depth-first into the nodes that still
//! need binding. The keys currently being expanded form an explicit path;
//! every node discovered during the pass lives in a flat arena indexed by
//! key. Repeating a key on the path is a cycle unless the repeated key is
//! deferred or a deferred key sits on the path between the two occurrences.
//!
//! A node finished in one branch is not expanded again. Instead it records
//! the keys on the path that its subtree reached through direct edges, and a
//! later branch reaching the node re-checks those keys against its own path.

use std::collections::HashMap;

use smallvec::{smallvec, SmallVec};

use crate::adapter::InvocationAdapter;
use crate::error::{InjectError, InjectResult};
use crate::executable::Executable;
use crate::key::Key;
use crate::module::ModuleRef;
use crate::registration::Registry;
use crate::store::BindingStore;

/// How a node's supplier is produced.
pub(crate) enum NodeKind {
    /// Invoke an executable with the node's dependencies
    Construct(Executable),
    /// Hand out a deferred handle to the direct key
    Defer,
}

/// One vertex of the dependency graph.
pub(crate) struct Node {
    pub(crate) key: Key,
    pub(crate) dependencies: SmallVec<[Key; 4]>,
    pub(crate) kind: NodeKind,
}

impl Node {
    fn locate(key: Key, registry: &Registry, adapter: &dyn InvocationAdapter) -> InjectResult<Node> {
        if key.is_deferred() {
            return Ok(Node {
                key,
                dependencies: smallvec![key.direct()],
                kind: NodeKind::Defer,
            });
        }

        let executable = registry
            .get(&key)
            .ok_or(InjectError::UnresolvedDependency(key.type_name()))?;
        adapter.validate(executable)?;

        Ok(Node {
            key,
            dependencies: executable.dependencies().iter().copied().collect(),
            kind: NodeKind::Construct(executable.clone()),
        })
    }
}

/// Configures a module on behalf of the graph builder.
pub(crate) type ConfigureHook<'a> = &'a dyn Fn(&ModuleRef) -> InjectResult<()>;

/// Single build pass over the graph reachable from one or more keys.
pub(crate) struct GraphBuilder<'a> {
    store: &'a BindingStore,
    registry: &'a Registry,
    adapter: &'a dyn InvocationAdapter,
    configure: Option<ConfigureHook<'a>>,
    arena: Vec<Node>,
    // Per arena slot: path keys its subtree reached without a deferred edge
    reaches: Vec<SmallVec<[Key; 4]>>,
    index: HashMap<Key, usize>,
    path: SmallVec<[Key; 16]>,
    finished: Vec<usize>,
}

impl<'a> GraphBuilder<'a> {
    pub(crate) fn new(store: &'a BindingStore, registry: &'a Registry, adapter: &'a dyn InvocationAdapter) -> Self {
        Self {
            store,
            registry,
            adapter,
            configure: None,
            arena: Vec::new(),
            reaches: Vec::new(),
            index: HashMap::new(),
            path: SmallVec::new(),
            finished: Vec::new(),
        }
    }

    /// Runs `configure` for the module of every executable expanded for the
    /// first time in this pass.
    pub(crate) fn with_configure(mut self, configure: ConfigureHook<'a>) -> Self {
        self.configure = Some(configure);
        self
    }

    /// Expands `root` and everything it needs that is not bound yet.
    pub(crate) fn build_tree(mut self, root: Key) -> InjectResult<Vec<Node>> {
        self.expand(root)?;
        Ok(self.into_bind_order())
    }

    /// Expands the dependencies of `owner`, an executable bound outside the
    /// registry, with `owner` treated as being on the path.
    pub(crate) fn build_dependencies(mut self, owner: Key, dependencies: &[Key]) -> InjectResult<Vec<Node>> {
        self.path.push(owner);
        for dependency in dependencies {
            self.expand(*dependency)?;
        }
        self.path.pop();
        Ok(self.into_bind_order())
    }

    /// Expands `key`, returning the keys on the current path that it reaches
    /// through direct edges only.
    fn expand(&mut self, key: Key) -> InjectResult<SmallVec<[Key; 4]>> {
        if self.store.contains(&key) {
            return Ok(SmallVec::new());
        }

        if let Some(pos) = self.position(&key) {
            if key.is_deferred() {
                return Ok(SmallVec::new());
            }
            self.check_back_edge(pos, key, None)?;
            return Ok(smallvec![key]);
        }

        // Finished in a sibling branch
        if let Some(&slot) = self.index.get(&key) {
            let mut live = SmallVec::new();
            for target in self.reaches[slot].clone() {
                if let Some(pos) = self.position(&target) {
                    self.check_back_edge(pos, target, Some(key))?;
                    live.push(target);
                }
            }
            return Ok(live);
        }

        if !key.is_deferred() {
            let module = self.registry.get(&key).and_then(Executable::module);
            if let (Some(module), Some(configure)) = (module, self.configure) {
                configure(module)?;
                // The module may have bound the key itself
                if self.store.contains(&key) {
                    return Ok(SmallVec::new());
                }
            }
        }

        let node = Node::locate(key, self.registry, self.adapter)?;
        let dependencies = node.dependencies.clone();
        let slot = self.arena.len();
        self.arena.push(node);
        self.reaches.push(SmallVec::new());
        self.index.insert(key, slot);

        self.path.push(key);
        let mut reached: SmallVec<[Key; 4]> = SmallVec::new();
        for dependency in dependencies {
            let below = self.expand(dependency)?;
            // Anything reached through a defer node is cut by it
            if !key.is_deferred() {
                for target in below {
                    if !reached.contains(&target) {
                        reached.push(target);
                    }
                }
            }
        }
        self.path.pop();

        reached.retain(|target| self.path.contains(target));
        self.reaches[slot] = reached.clone();
        self.finished.push(slot);
        Ok(reached)
    }

    fn position(&self, key: &Key) -> Option<usize> {
        self.path.iter().position(|k| k == key)
    }

    /// Accepts an edge back to `path[pos]` only if a deferred key lies on
    /// the path after it.
    fn check_back_edge(&self, pos: usize, target: Key, via: Option<Key>) -> InjectResult<()> {
        if self.path[pos + 1..].iter().any(Key::is_deferred) {
            return Ok(());
        }
        let mut cycle: Vec<&'static str> = self.path.iter().chain(via.iter()).map(|k| k.type_name()).collect();
        cycle.push(target.type_name());
        Err(InjectError::CycleDetected(cycle))
    }

    /// Nodes in post-order: direct dependencies come before their dependents.
    fn into_bind_order(self) -> Vec<Node> {
        let mut slots: Vec<Option<Node>> = self.arena.into_iter().map(Some).collect();
        self.finished
            .into_iter()
            .filter_map(|slot| slots[slot].take())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::DefaultAdapter;
    use crate::lifetime::Lifetime;

    struct A;
    struct B;
    struct C;
    struct D;

    fn node(dependencies: Vec<Key>) -> Executable {
        Executable::dynamic::<(), _>(dependencies, Lifetime::Transient, |_| Ok(()))
    }

    fn registry(entries: Vec<(Key, Vec<Key>)>) -> Registry {
        let mut registry = Registry::new();
        for (key, dependencies) in entries {
            registry.insert(key, node(dependencies));
        }
        registry
    }

    fn build(registry: &Registry, root: Key) -> InjectResult<Vec<Key>> {
        let store = BindingStore::new();
        let adapter = DefaultAdapter::default();
        GraphBuilder::new(&store, registry, &adapter)
            .build_tree(root)
            .map(|nodes| nodes.into_iter().map(|n| n.key).collect())
    }

    #[test]
    fn direct_cycle_is_rejected_with_path() {
        let registry = registry(vec![
            (Key::of::<A>(), vec![Key::of::<B>()]),
            (Key::of::<B>(), vec![Key::of::<A>()]),
        ]);

        match build(&registry, Key::of::<A>()) {
            Err(InjectError::CycleDetected(path)) => {
                assert_eq!(path.len(), 3);
                assert!(path[0].ends_with("::A"));
                assert!(path[1].ends_with("::B"));
                assert!(path[2].ends_with("::A"));
            }
            other => panic!("expected cycle, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn deferred_edge_breaks_cycle() {
        let registry = registry(vec![
            (Key::of::<A>(), vec![Key::of::<B>()]),
            (Key::of::<B>(), vec![Key::of::<A>().deferred()]),
        ]);

        let order = build(&registry, Key::of::<A>()).unwrap();
        assert_eq!(order, vec![Key::of::<A>().deferred(), Key::of::<B>(), Key::of::<A>()]);
    }

    #[test]
    fn direct_cycle_below_deferral_is_still_rejected() {
        let registry = registry(vec![
            (Key::of::<C>(), vec![Key::of::<A>().deferred()]),
            (Key::of::<A>(), vec![Key::of::<B>()]),
            (Key::of::<B>(), vec![Key::of::<A>()]),
        ]);

        assert!(matches!(
            build(&registry, Key::of::<C>()),
            Err(InjectError::CycleDetected(_))
        ));
    }

    #[test]
    fn cycle_through_deferral_from_direct_end_is_allowed() {
        let registry = registry(vec![
            (Key::of::<A>(), vec![Key::of::<B>()]),
            (Key::of::<B>(), vec![Key::of::<A>().deferred()]),
        ]);

        let order = build(&registry, Key::of::<B>()).unwrap();
        assert_eq!(order, vec![Key::of::<A>(), Key::of::<A>().deferred(), Key::of::<B>()]);
    }

    #[test]
    fn direct_edge_to_node_finished_under_deferral_is_rejected() {
        let registry = registry(vec![
            (Key::of::<A>(), vec![Key::of::<B>().deferred(), Key::of::<B>()]),
            (Key::of::<B>(), vec![Key::of::<A>()]),
        ]);

        match build(&registry, Key::of::<A>()) {
            Err(InjectError::CycleDetected(path)) => {
                assert_eq!(path.len(), 3);
                assert!(path[0].ends_with("::A"));
                assert!(path[1].ends_with("::B"));
                assert!(path[2].ends_with("::A"));
            }
            other => panic!("expected cycle, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn deferral_reached_later_still_breaks_cycle() {
        let registry = registry(vec![
            (Key::of::<A>(), vec![Key::of::<B>().deferred(), Key::of::<C>()]),
            (Key::of::<B>(), vec![Key::of::<A>()]),
            (Key::of::<C>(), vec![Key::of::<B>().deferred()]),
        ]);

        let order = build(&registry, Key::of::<A>()).unwrap();
        assert_eq!(
            order,
            vec![Key::of::<B>(), Key::of::<B>().deferred(), Key::of::<C>(), Key::of::<A>()]
        );
    }

    #[test]
    fn diamond_is_expanded_once() {
        let registry = registry(vec![
            (Key::of::<A>(), vec![Key::of::<B>(), Key::of::<C>()]),
            (Key::of::<B>(), vec![Key::of::<D>()]),
            (Key::of::<C>(), vec![Key::of::<D>()]),
            (Key::of::<D>(), vec![]),
        ]);

        let order = build(&registry, Key::of::<A>()).unwrap();
        assert_eq!(order, vec![Key::of::<D>(), Key::of::<B>(), Key::of::<C>(), Key::of::<A>()]);
    }

    #[test]
    fn unregistered_key_is_unresolved() {
        let registry = registry(vec![(Key::of::<A>(), vec![Key::of::<B>()])]);
        assert_eq!(
            build(&registry, Key::of::<A>()),
            Err(InjectError::UnresolvedDependency(std::any::type_name::<B>()))
        );
    }

    #[test]
    fn configure_hook_runs_for_executables_with_a_module() {
        use crate::binding::Binding;
        use crate::module::Module;
        use std::cell::RefCell;

        struct Wiring;
        impl Module for Wiring {
            fn collect_bindings(&self) -> Vec<Binding> {
                Vec::new()
            }
        }

        let mut registry = registry(vec![(Key::of::<B>(), vec![])]);
        registry.insert(
            Key::of::<A>(),
            node(vec![Key::of::<B>()]).configured_by(Wiring),
        );
        let store = BindingStore::new();
        let adapter = DefaultAdapter::default();
        let configured = RefCell::new(Vec::new());
        let configure = |module: &ModuleRef| -> InjectResult<()> {
            configured.borrow_mut().push(module.name());
            Ok(())
        };

        let nodes = GraphBuilder::new(&store, &registry, &adapter)
            .with_configure(&configure)
            .build_tree(Key::of::<A>())
            .unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(*configured.borrow(), vec![std::any::type_name::<Wiring>()]);
    }

    #[test]
    fn bound_keys_stop_expansion() {
        let registry = registry(vec![(Key::of::<A>(), vec![Key::of::<B>()])]);
        let store = BindingStore::new();
        store.put_if_absent(Key::of::<B>(), crate::supplier::Supplier::new(|| Err(InjectError::MissingBinding("B"))));
        let adapter = DefaultAdapter::default();

        let nodes = GraphBuilder::new(&store, &registry, &adapter)
            .build_tree(Key::of::<A>())
            .unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].key, Key::of::<A>());
    }
}
