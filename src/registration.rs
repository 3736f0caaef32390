//! Executable registry.

use std::collections::HashMap;

use crate::executable::Executable;
use crate::key::Key;

/// Registry of explicitly registered executables, keyed by the direct key
/// they satisfy. Immutable once the injector is built.
pub(crate) struct Registry {
    /// Fast Vec lookup for first N registrations (cache-friendly)
    one_small: Vec<(Key, Executable)>,
    /// HashMap fallback for remaining registrations
    one_large: HashMap<Key, Executable>,
    small_threshold: usize,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            one_small: Vec::new(),
            one_large: HashMap::new(),
            small_threshold: 16,
        }
    }

    /// Inserts an executable, replacing an earlier one for the same key.
    pub(crate) fn insert(&mut self, key: Key, executable: Executable) {
        let key = key.direct();
        if let Some(pos) = self.one_small.iter().position(|(k, _)| k == &key) {
            self.one_small[pos] = (key, executable);
        } else if self.one_small.len() < self.small_threshold {
            self.one_small.push((key, executable));
        } else {
            self.one_large.insert(key, executable);
        }
    }

    #[inline(always)]
    pub(crate) fn get(&self, key: &Key) -> Option<&Executable> {
        for (k, executable) in &self.one_small {
            if k == key {
                return Some(executable);
            }
        }
        self.one_large.get(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.one_small.len() + self.one_large.len()
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Key, &Executable)> {
        self.one_small
            .iter()
            .map(|(k, e)| (k, e))
            .chain(self.one_large.iter())
    }
}
