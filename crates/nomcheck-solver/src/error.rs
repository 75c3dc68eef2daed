//! Error types for the engine's run-time operations.
//!
//! Two taxonomies are kept separate on purpose: authoring defects in a
//! hierarchy definition are *collected* by [`crate::validation`], while the
//! errors here are returned from individual operations on an already
//! constructed hierarchy or binding map. Merely incompatible types are never
//! an error; only malformed input is.

use nomcheck_core::TypeParseError;
use std::fmt;

/// A variance string that is not one of the accepted spellings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarianceError {
    pub value: String,
}

impl fmt::Display for VarianceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The variance {:?} is not valid; expected \"co\", \"contra\", or \"inv\"",
            self.value
        )
    }
}

impl std::error::Error for VarianceError {}

/// An error from a query or binding operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// A type reference carried the wrong number of parameters for its
    /// declaration. Discovered lazily at query time.
    ActualParamsCount {
        type_name: String,
        expected: usize,
        actual: usize,
    },
    /// A referenced type is not declared in the hierarchy.
    TypeNotFound { name: String },
    /// An invalid variance string reached the engine.
    Variance(VarianceError),
    /// `bind_to_generic` was called before its dependency was bound.
    UnboundDependency { node_id: String, generic: String },
    /// A type string failed to parse.
    Parse(TypeParseError),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::ActualParamsCount {
                type_name,
                expected,
                actual,
            } => write!(
                f,
                "The type {type_name} expects {expected} parameter(s), but was given {actual}"
            ),
            SolverError::TypeNotFound { name } => {
                write!(f, "The type {name} is not defined in the hierarchy")
            }
            SolverError::Variance(err) => err.fmt(f),
            SolverError::UnboundDependency { node_id, generic } => write!(
                f,
                "The type {generic} on node {node_id} is not bound to an explicit type. \
                 The generic type must be bound before another generic type can bind to it"
            ),
            SolverError::Parse(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for SolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolverError::Variance(err) => Some(err),
            SolverError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TypeParseError> for SolverError {
    fn from(err: TypeParseError) -> Self {
        SolverError::Parse(err)
    }
}

impl From<VarianceError> for SolverError {
    fn from(err: VarianceError) -> Self {
        SolverError::Variance(err)
    }
}

/// An error constructing a `TypeHierarchy` from a definition.
///
/// These are the defects that would break preprocessing outright. The
/// validator reports the same problems (and more) in human terms; this type
/// exists so that construction fails fast instead of looping forever on a
/// cyclic definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    /// A `fulfills` entry names a type that is not declared.
    UndefinedSupertype { type_name: String, super_name: String },
    /// The declared super graph contains a cycle. The path runs from the
    /// first repeated type back to itself.
    CyclicDefinition { path: Vec<String> },
    /// A `fulfills` entry is not a parsable type reference.
    MalformedSuperReference {
        type_name: String,
        error: TypeParseError,
    },
    /// A `fulfills` entry's parameter count disagrees with the supertype's
    /// declared parameter count.
    SuperParamsCount {
        type_name: String,
        super_name: String,
        expected: usize,
        actual: usize,
    },
    /// A declared parameter has an invalid variance string.
    Variance {
        type_name: String,
        param: String,
        error: VarianceError,
    },
}

impl fmt::Display for HierarchyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HierarchyError::UndefinedSupertype {
                type_name,
                super_name,
            } => write!(
                f,
                "The type {type_name} says it fulfills the type {super_name}, \
                 but that type is not defined"
            ),
            HierarchyError::CyclicDefinition { path } => {
                write!(f, "The type {} creates a circular dependency: ", path[0])?;
                f.write_str(&path.join(" fulfills "))
            }
            HierarchyError::MalformedSuperReference { type_name, error } => {
                write!(f, "The type {type_name} has a malformed fulfills entry: {error}")
            }
            HierarchyError::SuperParamsCount {
                type_name,
                super_name,
                expected,
                actual,
            } => write!(
                f,
                "The type {type_name} fulfills {super_name} with {actual} parameter(s), \
                 but {super_name} declares {expected}"
            ),
            HierarchyError::Variance {
                type_name,
                param,
                error,
            } => write!(f, "The parameter {param} of type {type_name}: {error}"),
        }
    }
}

impl std::error::Error for HierarchyError {}

/// Wraps a lower-level error with the two ports involved in a connection
/// check, for diagnosability at the host boundary.
#[derive(Debug, Clone)]
pub struct ConnectionCheckError {
    pub parent_node: String,
    pub parent_check: String,
    pub child_node: String,
    pub child_check: String,
    pub source: SolverError,
}

impl fmt::Display for ConnectionCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Checking the connection between {} on node {} and {} on node {} failed: {}",
            self.parent_check, self.parent_node, self.child_check, self.child_node, self.source
        )
    }
}

impl std::error::Error for ConnectionCheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
