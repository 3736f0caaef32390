/// Concurrent access integration tests
///
/// These tests verify that the injector behaves correctly when many threads
/// miss the binding store at once: graphs are built once, singletons are
/// constructed once and every thread sees the same supplier.

use ferrous_injector::{
    BuildObserver, ConstructorCollection, Deferred, InjectError, Injector, Key, Resolver, TypedSupplier,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

// ===== Test Services =====

pub struct Database {
    id: usize,
}

pub struct Repository {
    db: Arc<Database>,
}

pub struct Service {
    repository: Arc<Repository>,
    notifier: Deferred<Notifier>,
}

pub struct Notifier {
    service: Deferred<Service>,
}

#[derive(Default)]
struct BuildCounter {
    builds: Mutex<Vec<String>>,
}

impl BuildObserver for BuildCounter {
    fn building(&self, _key: &Key) {}

    fn built(&self, key: &Key, _nodes: usize, _duration: Duration) {
        self.builds.lock().unwrap().push(key.to_string());
    }

    fn build_failed(&self, _key: &Key, _error: &InjectError) {}
}

fn injector(observer: Arc<BuildCounter>, constructed: Arc<AtomicUsize>) -> Injector {
    let mut sc = ConstructorCollection::new();
    sc.add_singleton::<Database, _, _>(move || {
        // Slow construction widens the race window
        thread::sleep(Duration::from_millis(10));
        Database {
            id: constructed.fetch_add(1, Ordering::SeqCst),
        }
    });
    sc.add_transient::<Repository, _, _>(|db: Arc<Database>| Repository { db });
    sc.add_singleton::<Service, _, _>(|repository: Arc<Repository>, notifier: Deferred<Notifier>| Service {
        repository,
        notifier,
    });
    sc.add_singleton::<Notifier, _, _>(|service: Deferred<Service>| Notifier { service });
    sc.add_observer(observer);
    sc.build()
}

// ===== Tests =====

#[test]
fn test_concurrent_first_resolution_builds_once() {
    let observer = Arc::new(BuildCounter::default());
    let constructed = Arc::new(AtomicUsize::new(0));
    let injector = injector(observer.clone(), constructed.clone());

    let threads = 12;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let injector = injector.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                injector.get_required::<Service>()
            })
        })
        .collect();

    let services: Vec<Arc<Service>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for service in &services {
        assert!(Arc::ptr_eq(service, &services[0]));
        assert_eq!(service.repository.db.id, services[0].repository.db.id);
    }
    assert_eq!(constructed.load(Ordering::SeqCst), 1);

    let builds = observer.builds.lock().unwrap();
    assert_eq!(builds.len(), 1, "graph built more than once: {:?}", *builds);
}

#[test]
fn test_suppliers_are_identical_across_threads() {
    let injector = injector(Arc::new(BuildCounter::default()), Arc::new(AtomicUsize::new(0)));

    let suppliers: Vec<TypedSupplier<Repository>> = crossbeam_utils::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|_| injector.supplier::<Repository>().unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    for supplier in &suppliers {
        assert!(TypedSupplier::ptr_eq(supplier, &suppliers[0]));
    }
}

#[test]
fn test_deferred_handles_resolve_concurrently() {
    let injector = injector(Arc::new(BuildCounter::default()), Arc::new(AtomicUsize::new(0)));
    let service = injector.get_required::<Service>();

    crossbeam_utils::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|_| {
                for _ in 0..50 {
                    let notifier = service.notifier.get_required();
                    assert!(Arc::ptr_eq(&notifier.service.get_required(), &service));
                }
            });
        }
    })
    .unwrap();
}

#[test]
fn test_unrelated_keys_resolve_in_parallel() {
    let mut sc = ConstructorCollection::new();
    sc.add_singleton::<u8, _, _>(|| 1u8);
    sc.add_singleton::<u16, _, _>(|| 2u16);
    sc.add_singleton::<u32, _, _>(|| 3u32);
    sc.add_singleton::<u64, _, _>(|| 4u64);
    let injector = sc.build();

    crossbeam_utils::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|_| {
                assert_eq!(*injector.get_required::<u8>(), 1);
                assert_eq!(*injector.get_required::<u16>(), 2);
                assert_eq!(*injector.get_required::<u32>(), 3);
                assert_eq!(*injector.get_required::<u64>(), 4);
            });
        }
    })
    .unwrap();

    assert_eq!(injector.bound_keys().len(), 4);
}
