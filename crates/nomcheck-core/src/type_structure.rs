//! Type references and their textual form.
//!
//! A type reference is a name plus an ordered list of parameter references,
//! written `Name[Param1, Param2]`. Identity is case-insensitive throughout
//! the engine; the parser lowercases by default and offers a case-preserving
//! mode for display purposes.

use std::fmt;

/// The structure of a type reference, e.g. `Map[K, List[V]]`.
///
/// Single-character names are generic placeholders, anything longer refers
/// to a declared type. Parameter-count agreement with the declaration is
/// checked lazily by the hierarchy, not here.
#[derive(Debug, Clone)]
pub struct TypeStructure {
    /// The name of the type. Lowercased unless produced by the
    /// case-preserving parse mode.
    pub name: String,
    /// The parameters of the type, in declaration order.
    pub params: Vec<TypeStructure>,
}

impl TypeStructure {
    /// Creates a parameterless reference to `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Creates a reference to `name` with the given parameters.
    pub fn with_params(name: impl Into<String>, params: Vec<TypeStructure>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Returns true if this reference is a generic placeholder.
    pub fn is_generic(&self) -> bool {
        crate::is_generic(&self.name)
    }

    /// Returns a copy with every name lowercased, giving the canonical form
    /// used for identity by the rest of the engine.
    pub fn to_caseless(&self) -> TypeStructure {
        TypeStructure {
            name: self.name.to_lowercase(),
            params: self.params.iter().map(|p| p.to_caseless()).collect(),
        }
    }
}

/// Case-insensitive name comparison.
fn caseless_eq(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

impl PartialEq for TypeStructure {
    fn eq(&self, other: &Self) -> bool {
        caseless_eq(&self.name, &other.name)
            && self.params.len() == other.params.len()
            && self.params.iter().zip(&other.params).all(|(a, b)| a == b)
    }
}

impl Eq for TypeStructure {}

impl fmt::Display for TypeStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.params.is_empty() {
            f.write_str("[")?;
            for (i, param) in self.params.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{param}")?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

/// An error in parsing a type string. Each variant carries the offending
/// string and the character index where the problem was detected; `Display`
/// renders a caret under that position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeParseError {
    /// A parameter list was opened without a preceding type name.
    MissingTypeName { text: String, index: usize },
    /// A `[` was never closed.
    UnmatchedLeftBracket { text: String, index: usize },
    /// A `]` appeared with no matching `[`.
    UnmatchedRightBracket { text: String, index: usize },
    /// Characters followed the closing bracket of the parameter list.
    ExtraCharacters { text: String, index: usize },
}

impl TypeParseError {
    fn parts(&self) -> (&str, usize, String) {
        match self {
            TypeParseError::MissingTypeName { text, index } => (
                text,
                *index,
                format!("Parameterized type {text} does not include a type name."),
            ),
            TypeParseError::UnmatchedLeftBracket { text, index } => (
                text,
                *index,
                format!("The type {text} has an unmatched left bracket."),
            ),
            TypeParseError::UnmatchedRightBracket { text, index } => (
                text,
                *index,
                format!("The type {text} has an unmatched right bracket."),
            ),
            TypeParseError::ExtraCharacters { text, index } => (
                text,
                *index,
                format!("The type {text} has extra characters after the parameter list."),
            ),
        }
    }

    /// The character index the error points at.
    pub fn index(&self) -> usize {
        self.parts().1
    }
}

impl fmt::Display for TypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (text, index, message) = self.parts();
        write!(f, "{message}\n    {text}\n    {}^", " ".repeat(index))
    }
}

impl std::error::Error for TypeParseError {}

/// Parses a type string into its structure, lowercasing all names.
pub fn parse(text: &str) -> Result<TypeStructure, TypeParseError> {
    parse_impl(text, true)
}

/// Parses a type string without altering the case of names. Used for
/// display; identity-sensitive code should go through [`parse`].
pub fn parse_preserving_case(text: &str) -> Result<TypeStructure, TypeParseError> {
    parse_impl(text, false)
}

fn parse_impl(text: &str, caseless: bool) -> Result<TypeStructure, TypeParseError> {
    // Parse in the original case so error diagnostics echo the caller's
    // text; canonicalize the result afterwards.
    let chars: Vec<char> = text.chars().collect();
    validate_brackets(text, &chars)?;
    let parsed = parse_structure(text, &chars, 0)?;
    Ok(if caseless { parsed.to_caseless() } else { parsed })
}

/// Checks that the string's brackets describe a parsable type before any
/// recursive work happens. Mirrors the error classification callers rely on
/// for diagnostics: a surplus `]`, characters after a closed parameter list,
/// and a `[` that never closes are distinct defects.
fn validate_brackets(text: &str, chars: &[char]) -> Result<(), TypeParseError> {
    let mut left = 0usize;
    let mut right = 0usize;

    for (i, &c) in chars.iter().enumerate() {
        if c == '[' {
            left += 1;
        } else if c == ']' {
            right += 1;
        }
        if right > left {
            return Err(TypeParseError::UnmatchedRightBracket {
                text: text.to_string(),
                index: i,
            });
        }
        if right != 0 && right == left && i != chars.len() - 1 {
            return Err(TypeParseError::ExtraCharacters {
                text: text.to_string(),
                index: i + 1,
            });
        }
    }

    if left > right {
        let index = chars.iter().position(|&c| c == '[').unwrap_or(0);
        return Err(TypeParseError::UnmatchedLeftBracket {
            text: text.to_string(),
            index,
        });
    }
    Ok(())
}

/// Parses a bracket-validated slice. `offset` is the slice's character
/// position within the full string, so errors point into the original text.
fn parse_structure(
    text: &str,
    chars: &[char],
    offset: usize,
) -> Result<TypeStructure, TypeParseError> {
    if chars.is_empty() || chars[0] == '[' {
        return Err(TypeParseError::MissingTypeName {
            text: text.to_string(),
            index: offset,
        });
    }

    let open = chars.iter().position(|&c| c == '[');
    let Some(open) = open else {
        return Ok(TypeStructure::new(chars.iter().collect::<String>()));
    };

    // Bracket validation guarantees the final character closes this list.
    let name: String = chars[..open].iter().collect();
    let inner = &chars[open + 1..chars.len() - 1];
    let params = parse_params(text, inner, offset + open + 1)?;
    Ok(TypeStructure::with_params(name, params))
}

/// Splits a parameter list on top-level commas and spaces, parsing each
/// segment recursively.
fn parse_params(
    text: &str,
    chars: &[char],
    offset: usize,
) -> Result<Vec<TypeStructure>, TypeParseError> {
    let mut params = Vec::new();
    let mut start: Option<usize> = None;
    let mut depth = 0usize;

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '[' => {
                depth += 1;
                if start.is_none() {
                    start = Some(i);
                }
            }
            ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if let Some(s) = start.take() {
                        params.push(parse_structure(text, &chars[s..=i], offset + s)?);
                    }
                }
            }
            ',' | ' ' => {
                if depth == 0 {
                    if let Some(s) = start.take() {
                        params.push(parse_structure(text, &chars[s..i], offset + s)?);
                    }
                }
            }
            _ => {
                if start.is_none() {
                    start = Some(i);
                }
            }
        }
    }
    if let Some(s) = start {
        params.push(parse_structure(text, &chars[s..], offset + s)?);
    }
    Ok(params)
}

#[cfg(test)]
#[path = "tests/type_structure_tests.rs"]
mod tests;
