//! Observers for graph build events.
//!
//! Observers see every slow-path build: the root key, how many nodes were
//! bound and how long it took, or the error that aborted it. Keep
//! implementations cheap; they run while the build lock is held.

use std::sync::Arc;
use std::time::Duration;

use crate::error::InjectError;
use crate::key::Key;

/// Observer trait for build events.
///
/// # Examples
///
/// ```
/// use ferrous_injector::{BuildObserver, ConstructorCollection, InjectError, Key, Resolver};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Recorder {
///     built: Mutex<Vec<(String, usize)>>,
/// }
///
/// impl BuildObserver for Recorder {
///     fn building(&self, _key: &Key) {}
///
///     fn built(&self, key: &Key, nodes: usize, _duration: Duration) {
///         self.built.lock().unwrap().push((key.to_string(), nodes));
///     }
///
///     fn build_failed(&self, _key: &Key, _error: &InjectError) {}
/// }
///
/// let recorder = Arc::new(Recorder::default());
/// let mut services = ConstructorCollection::new();
/// services.add_transient::<u32, _, _>(|| 7u32);
/// services.add_observer(recorder.clone());
///
/// let injector = services.build();
/// injector.get_required::<u32>();
/// injector.get_required::<u32>();
///
/// assert_eq!(*recorder.built.lock().unwrap(), vec![("u32".to_string(), 1)]);
/// ```
pub trait BuildObserver: Send + Sync {
    /// A key missed the binding store and its graph is about to be built.
    fn building(&self, key: &Key);

    /// The graph for `key` was built and `nodes` keys were bound.
    fn built(&self, key: &Key, nodes: usize, duration: Duration);

    /// Building the graph for `key` failed; nothing was bound.
    fn build_failed(&self, key: &Key, error: &InjectError);
}

/// Observer forwarding build events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl BuildObserver for TracingObserver {
    fn building(&self, key: &Key) {
        tracing::info!(key = %key, "building dependency graph");
    }

    fn built(&self, key: &Key, nodes: usize, duration: Duration) {
        tracing::info!(key = %key, nodes, ?duration, "dependency graph bound");
    }

    fn build_failed(&self, key: &Key, error: &InjectError) {
        tracing::warn!(key = %key, %error, "dependency graph build failed");
    }
}

/// Container for registered observers.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn BuildObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn BuildObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn building(&self, key: &Key) {
        for observer in &self.observers {
            observer.building(key);
        }
    }

    pub(crate) fn built(&self, key: &Key, nodes: usize, duration: Duration) {
        for observer in &self.observers {
            observer.built(key, nodes, duration);
        }
    }

    pub(crate) fn build_failed(&self, key: &Key, error: &InjectError) {
        for observer in &self.observers {
            observer.build_failed(key, error);
        }
    }
}
