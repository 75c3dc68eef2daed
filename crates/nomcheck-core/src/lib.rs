//! Foundational types for the nomcheck connection engine.
//!
//! This crate provides the pieces the solver is built on:
//! - Type references (`TypeStructure`) and their parser
//! - Priority-ordered multi-bindings (`PriorityQueueMap`)
//! - The generic/explicit classification rule for check strings

pub mod priority_queue_map;
pub mod type_structure;

pub use priority_queue_map::{Binding, PriorityQueueMap};
pub use type_structure::{TypeParseError, TypeStructure};

/// Priority for a binding derived from an input port of the node that owns
/// the generic.
pub const INPUT_PRIORITY: u32 = 100;

/// Priority for a binding derived from the output port of the node that owns
/// the generic. Outputs win ties against inputs.
pub const OUTPUT_PRIORITY: u32 = 200;

/// The lowest priority a caller should pass.
pub const MIN_PRIORITY: u32 = 0;

/// The highest priority a caller should pass.
pub const MAX_PRIORITY: u32 = u32::MAX;

/// Returns true if the name denotes a generic placeholder.
///
/// A name is generic iff it is exactly one character long. Explicit type
/// names are required to be longer; the validator rejects single-character
/// declared types for exactly this reason.
pub fn is_generic(name: &str) -> bool {
    name.chars().count() == 1
}

/// Returns true if the name denotes an explicit (declared) type.
pub fn is_explicit(name: &str) -> bool {
    name.chars().count() > 1
}
