//! Builtin function vocabulary.
//!
//! This module defines the canonical set of builtin functions available to executed code.
//! Callers should use the stable identifier [`BuiltinFnId`] for identity and query spellings and other metadata
//! through [`BuiltinFnInfo`] / [`BUILTIN_FUNCTIONS`].
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - Builtins live in their own scope. They are visible to executed code but are never part of the
//!   global namespace handed back to the caller.
//!
//! ## Examples
//! ```rust
//! use scriptbox_core::lang::builtins::{self, BuiltinFnId};
//!
//! assert_eq!(builtins::from_str("print"), Some(BuiltinFnId::Print));
//! assert_eq!(builtins::as_str(BuiltinFnId::Globals), "globals");
//! ```

use super::registry::{LangItemInfo, Since, Stability};

/// Stable identifier for a builtin function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFnId {
    Print,
    Globals,
    Len,
    Str,
    Repr,
    Int,
    Float,
    Bool,
    List,
    Dict,
    Tuple,
    Range,
    Enumerate,
    Zip,
    Sorted,
    Reversed,
    Min,
    Max,
    Sum,
    Abs,
    Round,
    Any,
    All,
    Isinstance,
    Type,
}

/// Metadata for a builtin function.
pub type BuiltinFnInfo = LangItemInfo<BuiltinFnId>;

/// Registry of all builtin functions.
pub const BUILTIN_FUNCTIONS: &[BuiltinFnInfo] = &[
    info(
        BuiltinFnId::Print,
        "print",
        "Write values to the captured output buffer (`sep` and `end` keywords supported).",
    ),
    info(
        BuiltinFnId::Globals,
        "globals",
        "Return the live global namespace as a dict.",
    ),
    info(
        BuiltinFnId::Len,
        "len",
        "Return the length of a string or collection.",
    ),
    info(BuiltinFnId::Str, "str", "Convert a value to its display string."),
    info(BuiltinFnId::Repr, "repr", "Return the canonical representation of a value."),
    info(BuiltinFnId::Int, "int", "Convert a value to an integer."),
    info(BuiltinFnId::Float, "float", "Convert a value to a float."),
    info(BuiltinFnId::Bool, "bool", "Return the truthiness of a value."),
    info(BuiltinFnId::List, "list", "Build a list from an iterable."),
    info(
        BuiltinFnId::Dict,
        "dict",
        "Build a dict from pairs and/or keyword arguments.",
    ),
    info(BuiltinFnId::Tuple, "tuple", "Build a tuple from an iterable."),
    info(BuiltinFnId::Range, "range", "Create a range of integers."),
    info(
        BuiltinFnId::Enumerate,
        "enumerate",
        "Enumerate an iterable into (index, value) pairs.",
    ),
    info(
        BuiltinFnId::Zip,
        "zip",
        "Zip iterables element-wise into tuples.",
    ),
    info(
        BuiltinFnId::Sorted,
        "sorted",
        "Return a sorted list (`key` and `reverse` keywords supported).",
    ),
    info(
        BuiltinFnId::Reversed,
        "reversed",
        "Return the elements of a sequence in reverse order.",
    ),
    info(BuiltinFnId::Min, "min", "Return the smallest item."),
    info(BuiltinFnId::Max, "max", "Return the largest item."),
    info(BuiltinFnId::Sum, "sum", "Sum a numeric iterable."),
    info(BuiltinFnId::Abs, "abs", "Absolute value (numeric)."),
    info(
        BuiltinFnId::Round,
        "round",
        "Round a number (half to even), optionally to a number of digits.",
    ),
    info(BuiltinFnId::Any, "any", "Return `True` if any element is truthy."),
    info(BuiltinFnId::All, "all", "Return `True` if every element is truthy."),
    info(
        BuiltinFnId::Isinstance,
        "isinstance",
        "Check a value against a type or exception class (or a tuple of them).",
    ),
    info(BuiltinFnId::Type, "type", "Return the type of a value."),
];

/// Return the canonical spelling for a builtin function.
///
/// ## Parameters
/// - `id`: Builtin function identifier.
///
/// ## Returns
/// - The canonical spelling (e.g. `"print"`).
pub fn as_str(id: BuiltinFnId) -> &'static str {
    info_for(id).canonical
}

/// Return the user-facing description for a builtin function.
pub fn description(id: BuiltinFnId) -> &'static str {
    info_for(id).description
}

/// Return the full metadata entry for a builtin function.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: BuiltinFnId) -> &'static BuiltinFnInfo {
    BUILTIN_FUNCTIONS
        .iter()
        .find(|b| b.id == id)
        .expect("builtin info missing")
}

/// Resolve a spelling to a builtin function identifier.
///
/// ## Returns
/// - `Some(BuiltinFnId)` if `name` matches a canonical spelling or alias.
/// - `None` otherwise.
pub fn from_str(name: &str) -> Option<BuiltinFnId> {
    if let Some(b) = BUILTIN_FUNCTIONS.iter().find(|b| b.canonical == name) {
        return Some(b.id);
    }
    BUILTIN_FUNCTIONS
        .iter()
        .find(|b| {
            let aliases: &[&str] = b.aliases;
            aliases.contains(&name)
        })
        .map(|b| b.id)
}

const fn info(id: BuiltinFnId, canonical: &'static str, description: &'static str) -> BuiltinFnInfo {
    LangItemInfo {
        id,
        canonical,
        aliases: &[],
        description,
        since: Since(0, 1),
        stability: Stability::Stable,
        examples: &[],
    }
}
