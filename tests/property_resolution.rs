/// Property-based tests for graph resolution
///
/// These tests build random dependency chains and check that resolution
/// behaves the same regardless of chain length, lifetimes or which edges are
/// deferred.

use ferrous_injector::{
    ConstructorCollection, Deferred, Executable, InjectError, Key, Lifetime, Qualified, Qualifier, Resolver,
};
use proptest::prelude::*;
use std::sync::Arc;

struct Node(usize);

struct Slot<const N: usize>;

// Chains are built from dynamic executables over qualified keys of `Node`,
// one qualifier per position.
const NAMES: [&str; 12] = ["n0", "n1", "n2", "n3", "n4", "n5", "n6", "n7", "n8", "n9", "n10", "n11"];

fn key(i: usize) -> Key {
    Key::named::<Node>(NAMES[i])
}

/// Chain n0 -> n1 -> ... -> n{len-1}, optionally closing back to n0.
fn chain(len: usize, singletons: &[bool], close: Option<bool>) -> ConstructorCollection {
    let mut sc = ConstructorCollection::new();
    for i in 0..len {
        let lifetime = if singletons[i] { Lifetime::SINGLETON } else { Lifetime::Transient };
        let next = if i + 1 < len {
            Some(key(i + 1))
        } else {
            close.map(|deferred| if deferred { key(0).deferred() } else { key(0) })
        };

        let dependencies: Vec<Key> = next.into_iter().collect();
        sc.add_executable(
            key(i),
            Executable::dynamic::<Node, _>(dependencies, lifetime, move |mut args| {
                if args.remaining() == 0 {
                    return Ok(Node(i));
                }
                if i + 1 < len {
                    let next = args.next::<Arc<Node>>()?;
                    Ok(Node(i + next.0))
                } else {
                    let _back = args.next::<Deferred<Node>>()?;
                    Ok(Node(i))
                }
            }),
        );
    }
    sc
}

proptest! {
    #[test]
    fn open_chains_always_resolve(singletons in prop::collection::vec(any::<bool>(), 1..12)) {
        let len = singletons.len();
        let injector = chain(len, &singletons, None).build();

        let root = injector.get_key::<Node>(&key(0)).unwrap();
        prop_assert_eq!(root.0, (0..len).sum::<usize>());
        prop_assert_eq!(injector.bound_keys().len(), len);
    }

    #[test]
    fn closed_direct_chains_always_cycle(len in 1usize..12) {
        let injector = chain(len, &vec![false; len], Some(false)).build();

        match injector.get_key::<Node>(&key(0)) {
            Err(InjectError::CycleDetected(path)) => prop_assert_eq!(path.len(), len + 1),
            other => prop_assert!(false, "expected a cycle, got {:?}", other.map(|_| ())),
        }
        prop_assert!(injector.bound_keys().is_empty());
    }

    #[test]
    fn closed_deferred_chains_resolve_from_any_entry(len in 1usize..12, entry in 0usize..12) {
        let entry = entry % len;
        let injector = chain(len, &vec![true; len], Some(true)).build();

        let node = injector.get_key::<Node>(&key(entry)).unwrap();
        prop_assert_eq!(node.0, (entry..len).sum::<usize>());

        // Every chain key plus the deferred key closing the loop
        prop_assert_eq!(injector.bound_keys().len(), len + 1);
    }

    #[test]
    fn singleton_resolution_is_consistent(value in "\\PC{0,50}") {
        let mut services = ConstructorCollection::new();
        let captured = value.clone();
        services.add_singleton::<String, _, _>(move || captured.clone());

        let injector = services.build();
        let first = injector.get_required::<String>();
        let second = injector.get_required::<String>();

        prop_assert!(Arc::ptr_eq(&first, &second));
        prop_assert_eq!(&*first, &value);
    }
}

#[test]
fn qualified_parameters_follow_chain_keys() {
    struct First;
    impl Qualifier for First {
        const NAME: &'static str = "n0";
    }

    let mut sc = chain(3, &[true, true, true], None);
    sc.add_transient::<Slot<0>, _, _>(|node: Qualified<Node, First>| {
        assert_eq!(node.0, 3);
        Slot::<0>
    });

    let injector = sc.build();
    injector.get_required::<Slot<0>>();
}
