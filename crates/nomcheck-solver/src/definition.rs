//! The hierarchy definition format.
//!
//! A definition maps type names to their declared parameters and the
//! supertypes they fulfill. Deserialized straight from JSON:
//!
//! ```json
//! {
//!   "List": {
//!     "params": [{ "name": "A", "variance": "co" }],
//!     "fulfills": ["Collection[A]"]
//!   },
//!   "Collection": {
//!     "params": [{ "name": "A", "variance": "co" }]
//!   }
//! }
//! ```
//!
//! Declaration order is preserved so that validation output is
//! deterministic.

use crate::error::VarianceError;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// A full hierarchy definition, in declaration order.
pub type HierarchyDef = IndexMap<String, TypeSpec>;

/// The declaration of one nominal type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TypeSpec {
    /// Declared type parameters, in order.
    #[serde(default)]
    pub params: Vec<ParamSpec>,
    /// Supertype references, each in the `Name` / `Name[Param, ...]`
    /// grammar. Parameters are this type's own formal names or explicit
    /// types.
    #[serde(default)]
    pub fulfills: Vec<String>,
}

/// A declared type parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    /// Kept as the raw string so the validator can report a bad spelling
    /// instead of failing deserialization. Parsed via [`Variance::from_str`].
    pub variance: String,
}

/// How a type parameter's subtyping relates to its enclosing type's
/// subtyping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variance {
    Covariant,
    Contravariant,
    Invariant,
}

impl FromStr for Variance {
    type Err = VarianceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "co" | "covariant" => Ok(Variance::Covariant),
            "contra" | "contravariant" => Ok(Variance::Contravariant),
            "inv" | "invariant" => Ok(Variance::Invariant),
            _ => Err(VarianceError {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Variance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variance::Covariant => f.write_str("co"),
            Variance::Contravariant => f.write_str("contra"),
            Variance::Invariant => f.write_str("inv"),
        }
    }
}
