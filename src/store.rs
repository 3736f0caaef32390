//! Concurrent binding store: the single source of truth for resolved keys.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::executable::AnySupplier;
use crate::key::Key;

#[cfg(feature = "ahash")]
type StoreMap = std::collections::HashMap<Key, AnySupplier, ahash::RandomState>;
#[cfg(not(feature = "ahash"))]
type StoreMap = std::collections::HashMap<Key, AnySupplier>;

/// Append-only map from [`Key`] to its resolved supplier.
///
/// At most one supplier is ever stored per key: inserts are "put if absent"
/// and nothing is removed for the lifetime of the store. Readers take a
/// shared lock only, so they never block each other.
#[derive(Clone, Default)]
pub(crate) struct BindingStore {
    map: Arc<RwLock<StoreMap>>,
}

/// Non-owning handle to a [`BindingStore`], held by deferred handles so that
/// suppliers never keep their own store alive.
#[derive(Clone)]
pub(crate) struct WeakStore {
    map: Weak<RwLock<StoreMap>>,
}

impl BindingStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn get(&self, key: &Key) -> Option<AnySupplier> {
        self.map.read().get(key).cloned()
    }

    #[inline]
    pub(crate) fn contains(&self, key: &Key) -> bool {
        self.map.read().contains_key(key)
    }

    /// Inserts `supplier` unless `key` is already bound. Returns the supplier
    /// that ended up in the store.
    pub(crate) fn put_if_absent(&self, key: Key, supplier: AnySupplier) -> AnySupplier {
        self.map.write().entry(key).or_insert(supplier).clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.map.read().len()
    }

    pub(crate) fn keys(&self) -> Vec<Key> {
        self.map.read().keys().copied().collect()
    }

    pub(crate) fn downgrade(&self) -> WeakStore {
        WeakStore {
            map: Arc::downgrade(&self.map),
        }
    }
}

impl WeakStore {
    /// Looks `key` up if the store is still alive.
    pub(crate) fn get(&self, key: &Key) -> Option<Option<AnySupplier>> {
        self.map.upgrade().map(|map| map.read().get(key).cloned())
    }
}
