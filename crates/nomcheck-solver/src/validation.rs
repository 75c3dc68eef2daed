//! Static validation of a hierarchy definition.
//!
//! Validation collects every structural defect it can find instead of
//! stopping at the first, so an author sees the whole picture in one run.
//! Nothing here throws; the result is a list of findings, each rendering to
//! a single diagnostic line.

use crate::definition::{HierarchyDef, Variance};
use nomcheck_core::{TypeParseError, TypeStructure, is_generic, type_structure};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

/// One defect found in a hierarchy definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// Two or more declared names collide case-insensitively.
    ConflictingTypes { name: String, conflicts: Vec<String> },
    /// A `fulfills` entry names an undeclared type.
    UndefinedSupertype { type_name: String, super_name: String },
    /// A type fulfills itself directly.
    SelfFulfillment { type_name: String },
    /// The same supertype is fulfilled more than once.
    DuplicateFulfillment { type_name: String, super_name: String },
    /// A chain of fulfillments loops. The path runs from the first repeated
    /// type back to itself, in declaration case.
    CircularDependency { path: Vec<String> },
    /// A declared type name is a single character and would act like a
    /// generic at use sites.
    GenericTypeName { name: String },
    /// A declared type name contains a character reserved by the type
    /// grammar.
    ReservedCharacters { name: String },
    /// A `fulfills` entry is not a parsable type reference.
    MalformedSuperReference {
        type_name: String,
        super_ref: String,
        error: TypeParseError,
    },
    /// A parameter's variance string is not a recognized spelling.
    InvalidVariance {
        type_name: String,
        param: String,
        value: String,
    },
    /// A parameterized `fulfills` entry disagrees with the supertype's
    /// declared parameter count.
    SuperParamsCountMismatch {
        type_name: String,
        super_name: String,
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::ConflictingTypes { name, conflicts } => write!(
                f,
                "The type name '{name}' conflicts with the type name(s) {conflicts:?}"
            ),
            ValidationIssue::UndefinedSupertype {
                type_name,
                super_name,
            } => write!(
                f,
                "The type {type_name} says it fulfills the type {super_name}, \
                 but that type is not defined"
            ),
            ValidationIssue::SelfFulfillment { type_name } => {
                write!(f, "The type {type_name} fulfills itself")
            }
            ValidationIssue::DuplicateFulfillment {
                type_name,
                super_name,
            } => write!(
                f,
                "The type {type_name} fulfills the type {super_name} more than once"
            ),
            ValidationIssue::CircularDependency { path } => {
                write!(f, "The type {} creates a circular dependency: ", path[0])?;
                f.write_str(&path.join(" fulfills "))
            }
            ValidationIssue::GenericTypeName { name } => write!(
                f,
                "The type {name} will act like a generic type if used as a check, \
                 because it is a single character"
            ),
            ValidationIssue::ReservedCharacters { name } => write!(
                f,
                "The type name '{name}' contains a character reserved by the type grammar \
                 (comma, space, or bracket)"
            ),
            ValidationIssue::MalformedSuperReference {
                type_name,
                super_ref,
                error,
            } => write!(
                f,
                "The type {type_name} has an unparsable fulfills entry '{super_ref}': {error}"
            ),
            ValidationIssue::InvalidVariance {
                type_name,
                param,
                value,
            } => write!(
                f,
                "The parameter {param} of type {type_name} has an invalid variance \"{value}\"; \
                 expected \"co\", \"contra\", or \"inv\""
            ),
            ValidationIssue::SuperParamsCountMismatch {
                type_name,
                super_name,
                expected,
                actual,
            } => write!(
                f,
                "The type {type_name} fulfills {super_name} with {actual} parameter(s), \
                 but {super_name} declares {expected}"
            ),
        }
    }
}

/// Checks a hierarchy definition for structural defects, returning every
/// finding. An empty result means the definition is safe to hand to
/// [`crate::TypeHierarchy::new`].
pub fn validate_hierarchy(def: &HierarchyDef) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    check_conflicting_types(def, &mut issues);
    check_names(def, &mut issues);
    check_params(def, &mut issues);
    check_fulfillments(def, &mut issues);
    check_circular_dependencies(def, &mut issues);
    issues
}

fn check_conflicting_types(def: &HierarchyDef, issues: &mut Vec<ValidationIssue>) {
    // Caseless name -> first declaration seen.
    let mut defined: FxHashMap<String, &String> = FxHashMap::default();
    let mut conflicts: FxHashMap<&String, Vec<String>> = FxHashMap::default();
    for name in def.keys() {
        let caseless = name.to_lowercase();
        match defined.get(&caseless) {
            Some(original) => conflicts.entry(original).or_default().push(name.clone()),
            None => {
                defined.insert(caseless, name);
            }
        }
    }
    // Report in declaration order.
    for name in def.keys() {
        if let Some(found) = conflicts.remove(name) {
            issues.push(ValidationIssue::ConflictingTypes {
                name: name.clone(),
                conflicts: found,
            });
        }
    }
}

fn check_names(def: &HierarchyDef, issues: &mut Vec<ValidationIssue>) {
    for name in def.keys() {
        if name.contains([',', ' ', '[', ']']) {
            issues.push(ValidationIssue::ReservedCharacters { name: name.clone() });
        } else if is_generic(name) {
            issues.push(ValidationIssue::GenericTypeName { name: name.clone() });
        }
    }
}

fn check_params(def: &HierarchyDef, issues: &mut Vec<ValidationIssue>) {
    for (name, spec) in def {
        for param in &spec.params {
            if param.variance.parse::<Variance>().is_err() {
                issues.push(ValidationIssue::InvalidVariance {
                    type_name: name.clone(),
                    param: param.name.clone(),
                    value: param.variance.clone(),
                });
            }
        }
    }
}

fn check_fulfillments(def: &HierarchyDef, issues: &mut Vec<ValidationIssue>) {
    let declared: FxHashMap<String, &crate::definition::TypeSpec> = def
        .iter()
        .map(|(name, spec)| (name.to_lowercase(), spec))
        .collect();

    for (name, spec) in def {
        let caseless = name.to_lowercase();
        let mut fulfilled: FxHashSet<String> = FxHashSet::default();
        for super_ref in &spec.fulfills {
            let parsed = match type_structure::parse(super_ref) {
                Ok(parsed) => parsed,
                Err(error) => {
                    issues.push(ValidationIssue::MalformedSuperReference {
                        type_name: name.clone(),
                        super_ref: super_ref.clone(),
                        error,
                    });
                    continue;
                }
            };
            if !fulfilled.insert(parsed.name.clone()) {
                issues.push(ValidationIssue::DuplicateFulfillment {
                    type_name: name.clone(),
                    super_name: parsed.name.clone(),
                });
            }
            if parsed.name == caseless {
                issues.push(ValidationIssue::SelfFulfillment {
                    type_name: name.clone(),
                });
                continue;
            }
            let Some(super_spec) = declared.get(&parsed.name) else {
                issues.push(ValidationIssue::UndefinedSupertype {
                    type_name: name.clone(),
                    super_name: parsed.name.clone(),
                });
                continue;
            };
            if parsed.params.len() != super_spec.params.len() {
                issues.push(ValidationIssue::SuperParamsCountMismatch {
                    type_name: name.clone(),
                    super_name: parsed.name.clone(),
                    expected: super_spec.params.len(),
                    actual: parsed.params.len(),
                });
            }
        }
    }
}

fn check_circular_dependencies(def: &HierarchyDef, issues: &mut Vec<ValidationIssue>) {
    // Caseless name -> (declaration-case name, parsed super names).
    let mut graph: FxHashMap<String, (String, Vec<String>)> = FxHashMap::default();
    for (name, spec) in def {
        let supers = spec
            .fulfills
            .iter()
            .filter_map(|s| type_structure::parse(s).ok())
            .map(|t: TypeStructure| t.name)
            .collect();
        graph.insert(name.to_lowercase(), (name.clone(), supers));
    }

    fn search(
        caseless: &str,
        graph: &FxHashMap<String, (String, Vec<String>)>,
        visited: &mut FxHashSet<String>,
        on_path: &mut FxHashSet<String>,
        path: &mut Vec<String>,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let Some((display, supers)) = graph.get(caseless) else {
            return;
        };
        visited.insert(caseless.to_string());
        if on_path.contains(caseless) {
            if let Some(start) = path
                .iter()
                .position(|p| p.to_lowercase() == caseless.to_lowercase())
            {
                let mut cycle = path[start..].to_vec();
                cycle.push(display.clone());
                issues.push(ValidationIssue::CircularDependency { path: cycle });
            }
            return;
        }
        on_path.insert(caseless.to_string());
        path.push(display.clone());
        for sup in supers {
            search(sup, graph, visited, on_path, path, issues);
        }
        on_path.remove(caseless);
        path.pop();
    }

    let mut visited = FxHashSet::default();
    for name in def.keys() {
        let caseless = name.to_lowercase();
        if !visited.contains(&caseless) {
            let mut on_path = FxHashSet::default();
            let mut path = Vec::new();
            search(
                &caseless,
                &graph,
                &mut visited,
                &mut on_path,
                &mut path,
                issues,
            );
        }
    }
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
