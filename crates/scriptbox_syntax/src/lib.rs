//! Shared syntax frontend for the scriptbox language: lexer, parser, AST, diagnostics.
//!
//! ## Notes
//! - This crate is “syntax-only”: it does not resolve names or evaluate anything.
//! - Vocabulary identity (keywords/operators/punctuation) comes from `scriptbox_core::lang` registries.
//!
//! ## Examples
//! ```rust
//! use scriptbox_syntax::{lexer, parser};
//!
//! let tokens = lexer::lex("pass\n").unwrap();
//! let program = parser::parse(&tokens).unwrap();
//! assert_eq!(program.body.len(), 1);
//! ```
//!
//! ## See also
//! - `scriptbox_core::lang` for registry-backed language vocabulary (keywords/operators/punctuation/etc.).

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod token_helpers;

use diagnostics::CompileError;

/// Lex and parse `source` in one step.
///
/// ## Errors
/// Returns every lexer error if lexing fails, otherwise every parser error.
pub fn parse_source(source: &str) -> Result<ast::Program, Vec<CompileError>> {
    let tokens = lexer::lex(source)?;
    parser::parse(&tokens)
}
