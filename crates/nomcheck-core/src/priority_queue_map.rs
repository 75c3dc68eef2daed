//! A map where keys hold multiple prioritized values.
//!
//! Reading a key returns every value tied for the highest priority, so a
//! key can be deliberately ambiguous (two values at the same priority) and
//! removing the top binding reveals whatever was underneath it.

use rustc_hash::FxHashMap;
use std::hash::Hash;

/// A value tagged with the priority it was bound at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding<V> {
    pub value: V,
    pub priority: u32,
}

/// Maps a key to a priority queue of values.
///
/// `bindings`/`values` return `None` for a key with no bindings at all,
/// which callers treat as "not bound" — distinct from a key that was never
/// seen only in that unbinding the last value also yields `None`.
#[derive(Debug, Default)]
pub struct PriorityQueueMap<K, V> {
    map: FxHashMap<K, Vec<Binding<V>>>,
}

impl<K: Eq + Hash, V: PartialEq> PriorityQueueMap<K, V> {
    pub fn new() -> Self {
        Self {
            map: FxHashMap::default(),
        }
    }

    /// Adds a value at the given priority to the key's queue. Duplicate
    /// (value, priority) pairs are kept; each `unbind` removes one.
    pub fn bind(&mut self, key: K, value: V, priority: u32) {
        self.map.entry(key).or_default().push(Binding { value, priority });
    }

    /// Removes one binding matching both the value and the priority, if
    /// any exists.
    pub fn unbind(&mut self, key: &K, value: &V, priority: u32) {
        if let Some(bindings) = self.map.get_mut(key) {
            if let Some(index) = bindings
                .iter()
                .position(|b| b.value == *value && b.priority == priority)
            {
                bindings.remove(index);
            }
        }
    }

    /// Returns every binding tied for the key's highest priority, or `None`
    /// if the key is not bound.
    pub fn bindings(&self, key: &K) -> Option<Vec<&Binding<V>>> {
        let bindings = self.map.get(key)?;
        let top = bindings.iter().map(|b| b.priority).max()?;
        Some(bindings.iter().filter(|b| b.priority == top).collect())
    }

    /// Returns every value tied for the key's highest priority, or `None`
    /// if the key is not bound.
    pub fn values(&self, key: &K) -> Option<Vec<&V>> {
        self.bindings(key)
            .map(|bindings| bindings.into_iter().map(|b| &b.value).collect())
    }

    /// The priority of the key's active bindings, or `None` if unbound.
    pub fn top_priority(&self, key: &K) -> Option<u32> {
        self.map.get(key)?.iter().map(|b| b.priority).max()
    }

    /// Returns true if the key has at least one binding.
    pub fn is_bound(&self, key: &K) -> bool {
        self.map.get(key).is_some_and(|b| !b.is_empty())
    }
}

#[cfg(test)]
#[path = "tests/priority_queue_map_tests.rs"]
mod tests;
