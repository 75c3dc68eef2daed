//! Per-node bindings of generic type names to explicit types.
//!
//! Each node in the host graph gets its own binding context: the generic
//! `t` on node A is unrelated to `t` on node B unless a dependency links
//! them. Bindings carry a priority; reads return the highest-priority
//! value(s). A binding derived from another node's binding (created with
//! [`GenericMap::bind_to_generic`]) is tracked in a depender index so that
//! when the dependency's value changes or disappears, the derived bindings
//! are re-derived or removed transitively.
//!
//! The depender graph is expected to stay acyclic; the host creates one
//! edge per connection and a connection has one producing side.

use crate::error::SolverError;
use nomcheck_core::PriorityQueueMap;
use rustc_hash::FxHashMap;
use tracing::trace;

/// A derived binding's owner: who to update when a dependency changes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DependerInfo {
    node_id: String,
    generic: String,
    priority: u32,
}

/// Bindings of generic type names to explicit types, per node context.
#[derive(Debug, Default)]
pub struct GenericMap {
    /// Node id -> that node's generic bindings.
    bindings: FxHashMap<String, PriorityQueueMap<String, String>>,
    /// (dependency node id, dependency generic) -> derived bindings to
    /// maintain. Every entry corresponds to a binding created through
    /// `bind_to_generic`.
    dependers: FxHashMap<(String, String), Vec<DependerInfo>>,
}

impl GenericMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The explicit type currently bound to the generic in the node's
    /// context, or `None` if unbound. When several bindings tie at the top
    /// priority, the earliest-bound one is returned; see
    /// [`GenericMap::explicit_types`] for the full ambiguous set.
    pub fn explicit_type(&self, node_id: &str, generic: &str) -> Option<String> {
        let generic = generic.to_lowercase();
        let values = self.bindings.get(node_id)?.values(&generic)?;
        values.first().map(|v| (*v).clone())
    }

    /// Every explicit type tied for the top priority, or empty if unbound.
    pub fn explicit_types(&self, node_id: &str, generic: &str) -> Vec<String> {
        let generic = generic.to_lowercase();
        self.bindings
            .get(node_id)
            .and_then(|map| map.values(&generic))
            .map(|values| values.into_iter().cloned().collect())
            .unwrap_or_default()
    }

    /// The priority of the active binding(s), or `None` if unbound.
    pub fn top_priority(&self, node_id: &str, generic: &str) -> Option<u32> {
        self.bindings
            .get(node_id)?
            .top_priority(&generic.to_lowercase())
    }

    /// Binds the generic to an explicit type at the given priority in the
    /// node's context, and propagates the change to any dependers.
    pub fn bind_explicit(&mut self, node_id: &str, generic: &str, explicit: &str, priority: u32) {
        let generic = generic.to_lowercase();
        let explicit = explicit.to_lowercase();
        let old = self.explicit_type(node_id, &generic);
        self.bindings
            .entry(node_id.to_string())
            .or_default()
            .bind(generic.clone(), explicit.clone(), priority);
        trace!(node_id, %generic, %explicit, priority, "bound explicit type");
        let new = self.explicit_type(node_id, &generic);
        self.propagate(node_id, &generic, old, new);
    }

    /// Removes one binding matching the explicit type and priority, and
    /// propagates the change: dependers fall back to the node's
    /// next-highest binding or become unbound with it.
    pub fn unbind_explicit(&mut self, node_id: &str, generic: &str, explicit: &str, priority: u32) {
        let generic = generic.to_lowercase();
        let explicit = explicit.to_lowercase();
        let old = self.explicit_type(node_id, &generic);
        if let Some(map) = self.bindings.get_mut(node_id) {
            map.unbind(&generic, &explicit, priority);
        }
        trace!(node_id, %generic, %explicit, priority, "unbound explicit type");
        let new = self.explicit_type(node_id, &generic);
        self.propagate(node_id, &generic, old, new);
    }

    /// Derives a binding for the depender's generic from the dependency's
    /// current explicit type, and records the relationship so the derived
    /// binding follows the dependency's future transitions.
    ///
    /// The dependency must already be bound.
    pub fn bind_to_generic(
        &mut self,
        depender_node: &str,
        depender_generic: &str,
        dependency_node: &str,
        dependency_generic: &str,
        priority: u32,
    ) -> Result<(), SolverError> {
        let depender_generic = depender_generic.to_lowercase();
        let dependency_generic = dependency_generic.to_lowercase();
        let explicit = self
            .explicit_type(dependency_node, &dependency_generic)
            .ok_or_else(|| SolverError::UnboundDependency {
                node_id: dependency_node.to_string(),
                generic: dependency_generic.clone(),
            })?;
        self.bind_explicit(depender_node, &depender_generic, &explicit, priority);
        self.dependers
            .entry((dependency_node.to_string(), dependency_generic))
            .or_default()
            .push(DependerInfo {
                node_id: depender_node.to_string(),
                generic: depender_generic,
                priority,
            });
        Ok(())
    }

    /// Removes a derived binding and its dependency record. A no-op if no
    /// matching record exists.
    pub fn unbind_from_generic(
        &mut self,
        depender_node: &str,
        depender_generic: &str,
        dependency_node: &str,
        dependency_generic: &str,
        priority: u32,
    ) {
        let depender_generic = depender_generic.to_lowercase();
        let dependency_generic = dependency_generic.to_lowercase();
        let key = (dependency_node.to_string(), dependency_generic.clone());
        let Some(list) = self.dependers.get_mut(&key) else {
            return;
        };
        let Some(index) = list.iter().position(|d| {
            d.node_id == depender_node && d.generic == depender_generic && d.priority == priority
        }) else {
            return;
        };
        list.remove(index);
        if list.is_empty() {
            self.dependers.remove(&key);
        }
        if let Some(explicit) = self.explicit_type(dependency_node, &dependency_generic) {
            self.unbind_explicit(depender_node, &depender_generic, &explicit, priority);
        }
    }

    /// Pushes a dependency's transition through its dependers. A change of
    /// active value re-derives every derived binding; a transition to
    /// unbound removes them, transitively, before the index entry itself is
    /// dropped.
    fn propagate(
        &mut self,
        node_id: &str,
        generic: &str,
        old: Option<String>,
        new: Option<String>,
    ) {
        if old == new {
            return;
        }
        let key = (node_id.to_string(), generic.to_string());
        let Some(dependers) = self.dependers.get(&key).cloned() else {
            return;
        };
        trace!(
            node_id,
            generic,
            dependers = dependers.len(),
            "propagating binding transition"
        );
        // Bind before unbind so a value change never routes a depender
        // through an unbound state, which would sever its own dependers.
        for d in &dependers {
            if let Some(new_value) = &new {
                self.bind_explicit(&d.node_id, &d.generic, new_value, d.priority);
            }
            if let Some(old_value) = &old {
                self.unbind_explicit(&d.node_id, &d.generic, old_value, d.priority);
            }
        }
        if new.is_none() {
            self.dependers.remove(&key);
        }
    }
}

#[cfg(test)]
#[path = "tests/generic_map_tests.rs"]
mod tests;
