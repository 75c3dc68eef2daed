//! Connection checking over the host graph's ports.
//!
//! The host owns nodes and ports and decides which side of a candidate
//! connection is structurally superior (the parent); this module decides
//! whether the connection is type-compatible and keeps the generic
//! bindings in step with connect/disconnect events.

use crate::error::{ConnectionCheckError, SolverError};
use crate::generic_map::GenericMap;
use crate::hierarchy::TypeHierarchy;
use nomcheck_core::{INPUT_PRIORITY, OUTPUT_PRIORITY, TypeStructure, is_explicit, type_structure};
use tracing::debug;

/// The structural role of a port in a candidate pair, as assigned by the
/// host graph. The parent is the accepting side, the child the producing
/// side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortRole {
    Parent,
    Child,
}

/// A typed connection point on a node, as described by the host.
#[derive(Debug, Clone)]
pub struct Port {
    /// Stable identifier of the owning node.
    pub node_id: String,
    /// The port's declared check: an explicit type reference or a
    /// single-character generic. An empty check means "untyped".
    pub check: String,
    pub role: PortRole,
}

impl Port {
    pub fn new(node_id: impl Into<String>, check: impl Into<String>, role: PortRole) -> Self {
        Self {
            node_id: node_id.into(),
            check: check.into(),
            role,
        }
    }
}

/// Orchestrates the hierarchy and the binding map to answer connection
/// queries and track connect/disconnect events.
pub struct ConnectionChecker {
    hierarchy: TypeHierarchy,
    generics: GenericMap,
}

impl ConnectionChecker {
    pub fn new(hierarchy: TypeHierarchy) -> Self {
        Self {
            hierarchy,
            generics: GenericMap::new(),
        }
    }

    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    pub fn generics(&self) -> &GenericMap {
        &self.generics
    }

    /// Direct access to the binding map, for hosts that bind generics from
    /// context of their own (e.g. a variable declared elsewhere).
    pub fn generics_mut(&mut self) -> &mut GenericMap {
        &mut self.generics
    }

    /// Returns true if the two ports may be connected. Never fails for
    /// merely incompatible types; only malformed checks are errors.
    pub fn can_connect(&self, a: &Port, b: &Port) -> Result<bool, ConnectionCheckError> {
        let (parent, child) = orient(a, b);
        let allowed = self
            .can_connect_inner(parent, child)
            .map_err(|source| wrap(parent, child, source))?;
        debug!(
            parent = %parent.node_id,
            child = %child.node_id,
            parent_check = %parent.check,
            child_check = %child.check,
            allowed,
            "connection check"
        );
        Ok(allowed)
    }

    fn can_connect_inner(&self, parent: &Port, child: &Port) -> Result<bool, SolverError> {
        let parent_types = self.resolved_types(parent)?;
        let child_types = self.resolved_types(child)?;

        // An unbound generic (or untyped port) is compatible with anything.
        if parent_types.is_empty() || child_types.is_empty() {
            return Ok(true);
        }

        // A parent generic bound only through the parent's own input ports
        // has not committed to a producer yet: accept anything that shares
        // a join with one of the candidates.
        if self.parent_bound_via_inputs_only(parent) {
            for c in &child_types {
                for p in &parent_types {
                    let joins = self
                        .hierarchy
                        .nearest_common_parents(&[c.clone(), p.clone()])?;
                    if !joins.is_empty() {
                        return Ok(true);
                    }
                }
            }
            return Ok(false);
        }

        // Strict compatibility: some child candidate fulfills some parent
        // candidate.
        for c in &child_types {
            for p in &parent_types {
                if self.hierarchy.type_fulfills_type(c, p)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Applies the binding updates for a connection that was made.
    ///
    /// The resolved side feeds the unresolved side: a generic parent learns
    /// its type from the child at input priority, a generic child from the
    /// parent at output priority. Priorities are named for the port of the
    /// node that OWNS the generic, not for the feeding side: a generic
    /// output port is the owner's output, so it binds at
    /// [`OUTPUT_PRIORITY`] and outranks bindings the owner collected
    /// through its input ports. When both sides are generic the binding
    /// is derived, so it follows the other node's future transitions.
    pub fn on_connect(&mut self, a: &Port, b: &Port) -> Result<(), ConnectionCheckError> {
        let (parent, child) = orient(a, b);
        self.on_connect_inner(parent, child)
            .map_err(|source| wrap(parent, child, source))
    }

    fn on_connect_inner(&mut self, parent: &Port, child: &Port) -> Result<(), SolverError> {
        let parent_generic = port_generic(parent);
        let child_generic = port_generic(child);

        match (parent_generic, child_generic) {
            (Some(pg), None) => {
                if let Some(explicit) = self.port_explicit(child)? {
                    self.generics
                        .bind_explicit(&parent.node_id, pg, &explicit, INPUT_PRIORITY);
                }
            }
            (None, Some(cg)) => {
                if let Some(explicit) = self.port_explicit(parent)? {
                    self.generics
                        .bind_explicit(&child.node_id, cg, &explicit, OUTPUT_PRIORITY);
                }
            }
            (Some(pg), Some(cg)) => {
                let parent_bound = self.generics.explicit_type(&parent.node_id, pg).is_some();
                let child_bound = self.generics.explicit_type(&child.node_id, cg).is_some();
                if child_bound && !parent_bound {
                    self.generics.bind_to_generic(
                        &parent.node_id,
                        pg,
                        &child.node_id,
                        cg,
                        INPUT_PRIORITY,
                    )?;
                } else if parent_bound && !child_bound {
                    self.generics.bind_to_generic(
                        &child.node_id,
                        cg,
                        &parent.node_id,
                        pg,
                        OUTPUT_PRIORITY,
                    )?;
                }
                // Both bound or both unbound: nothing to derive.
            }
            (None, None) => {}
        }
        Ok(())
    }

    /// Reverses the binding updates of [`ConnectionChecker::on_connect`].
    /// Dependents fall back to their next-highest binding or become
    /// unbound.
    pub fn on_disconnect(&mut self, a: &Port, b: &Port) -> Result<(), ConnectionCheckError> {
        let (parent, child) = orient(a, b);
        self.on_disconnect_inner(parent, child)
            .map_err(|source| wrap(parent, child, source))
    }

    fn on_disconnect_inner(&mut self, parent: &Port, child: &Port) -> Result<(), SolverError> {
        let parent_generic = port_generic(parent);
        let child_generic = port_generic(child);

        match (parent_generic, child_generic) {
            (Some(pg), None) => {
                if let Some(explicit) = self.port_explicit(child)? {
                    self.generics
                        .unbind_explicit(&parent.node_id, pg, &explicit, INPUT_PRIORITY);
                }
            }
            (None, Some(cg)) => {
                if let Some(explicit) = self.port_explicit(parent)? {
                    self.generics
                        .unbind_explicit(&child.node_id, cg, &explicit, OUTPUT_PRIORITY);
                }
            }
            (Some(pg), Some(cg)) => {
                // Only one direction was derived on connect; the other call
                // is a no-op.
                self.generics.unbind_from_generic(
                    &parent.node_id,
                    pg,
                    &child.node_id,
                    cg,
                    INPUT_PRIORITY,
                );
                self.generics.unbind_from_generic(
                    &child.node_id,
                    cg,
                    &parent.node_id,
                    pg,
                    OUTPUT_PRIORITY,
                );
            }
            (None, None) => {}
        }
        Ok(())
    }

    /// The explicit type names a port currently resolves to, for display.
    /// Empty means the port is untyped or an unbound generic.
    pub fn explicit_types_of(&self, port: &Port) -> Result<Vec<String>, ConnectionCheckError> {
        self.resolved_types(port)
            .map(|types| types.iter().map(|t| t.to_string()).collect())
            .map_err(|source| wrap(port, port, source))
    }

    /// The set of explicit type structures a port resolves to right now.
    fn resolved_types(&self, port: &Port) -> Result<Vec<TypeStructure>, SolverError> {
        if port.check.is_empty() {
            return Ok(Vec::new());
        }
        if is_explicit(&port.check) {
            return Ok(vec![type_structure::parse(&port.check)?]);
        }
        let mut resolved = Vec::new();
        for name in self.generics.explicit_types(&port.node_id, &port.check) {
            resolved.push(type_structure::parse(&name)?);
        }
        Ok(resolved)
    }

    /// True when the port is a generic whose active binding came from an
    /// input port of its own node, with nothing higher (no output-side or
    /// external binding) committed yet.
    fn parent_bound_via_inputs_only(&self, parent: &Port) -> bool {
        if is_explicit(&parent.check) || parent.check.is_empty() {
            return false;
        }
        match self.generics.top_priority(&parent.node_id, &parent.check) {
            Some(priority) => priority <= INPUT_PRIORITY,
            None => false,
        }
    }

    /// Resolves the explicit type of a port whose check is explicit.
    /// Generic checks resolve through the binding map; `None` if unbound.
    fn port_explicit(&self, port: &Port) -> Result<Option<String>, SolverError> {
        if port.check.is_empty() {
            return Ok(None);
        }
        if is_explicit(&port.check) {
            // Normalize through the parser so bindings store canonical text.
            return Ok(Some(type_structure::parse(&port.check)?.to_string()));
        }
        Ok(self.generics.explicit_type(&port.node_id, &port.check))
    }
}

/// Assigns the pair to parent and child by the host-provided role.
fn orient<'a>(a: &'a Port, b: &'a Port) -> (&'a Port, &'a Port) {
    if a.role == PortRole::Parent {
        (a, b)
    } else {
        (b, a)
    }
}

fn port_generic(port: &Port) -> Option<&str> {
    if nomcheck_core::is_generic(&port.check) {
        Some(&port.check)
    } else {
        None
    }
}

fn wrap(parent: &Port, child: &Port, source: SolverError) -> ConnectionCheckError {
    ConnectionCheckError {
        parent_node: parent.node_id.clone(),
        parent_check: parent.check.clone(),
        child_node: child.node_id.clone(),
        child_check: child.check.clone(),
        source,
    }
}

#[cfg(test)]
#[path = "tests/checker_tests.rs"]
mod tests;
