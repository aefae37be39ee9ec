//! Scriptbox language vocabulary registries.
//!
//! This module is the “front door” for language-level vocabulary: reserved keywords, operators,
//! punctuation, builtin functions, and builtin exception kinds.
//!
//! The design goal is to avoid stringly-typed checks scattered across the parser and interpreter.
//! Instead, callers work with **stable IDs** (e.g. `KeywordId`, `OperatorId`) and look up
//! spellings/metadata via registry tables.
//!
//! ## Notes
//! - Registries are **pure**: no AST types, no IO, no side effects.
//! - The lexer/parser enforce syntax; registries provide spellings and metadata for shared use (diagnostics,
//!   binding-name validation, failure classification).
//!
//! ## Examples
//! ```rust
//! use scriptbox_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("if"), Some(KeywordId::If));
//! assert_eq!(keywords::as_str(KeywordId::If), "if");
//! ```

pub mod builtins;
pub mod errors;
pub mod keywords;
pub mod operators;
pub mod punctuation;
pub mod registry;
