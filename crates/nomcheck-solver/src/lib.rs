//! Nominal type-hierarchy and generic-binding engine.
//!
//! The engine answers one question for a host graph editor: may these two
//! typed ports be connected? It does so with:
//!
//! - A declared hierarchy of nominal types with multi-parent subtyping and
//!   variance-annotated type parameters (`TypeHierarchy`)
//! - Per-node bindings of generic placeholders to explicit types, with
//!   cross-node dependency tracking (`GenericMap`)
//! - A thin orchestration layer driven by connect/disconnect events
//!   (`ConnectionChecker`)
//!
//! A hierarchy definition should be run through [`validate_hierarchy`]
//! before construction; `TypeHierarchy::new` fails fast on the defects that
//! would otherwise break its preprocessing (cycles, undefined supertypes),
//! but the validator is the path that explains every defect at once.
//!
//! The engine is single-threaded and synchronous. `TypeHierarchy` is
//! immutable after construction and freely shareable; `GenericMap` is
//! session state and must be confined to one logical owner.

pub mod checker;
pub mod definition;
pub mod error;
pub mod generic_map;
pub mod hierarchy;
pub mod validation;

pub use checker::{ConnectionChecker, Port, PortRole};
pub use definition::{HierarchyDef, ParamSpec, TypeSpec, Variance};
pub use error::{ConnectionCheckError, HierarchyError, SolverError, VarianceError};
pub use generic_map::GenericMap;
pub use hierarchy::TypeHierarchy;
pub use validation::{ValidationIssue, validate_hierarchy};
