//! Parser for the scriptbox language
//!
//! Converts a token stream into an AST using recursive descent over the Python-shaped grammar the
//! interpreter supports.
//!
//! ## Examples
//!
//! ```rust
//! use scriptbox_syntax::{lexer, parser};
//!
//! let source = "def foo():\n    return 42\n";
//! let tokens = lexer::lex(source).unwrap();
//! let ast = parser::parse(&tokens).unwrap();
//! assert_eq!(ast.body.len(), 1);
//! ```

use crate::ast::*;
use crate::diagnostics::CompileError;
use crate::lexer::{self, FStringPart as LexFStringPart, Token, TokenKind};
use scriptbox_core::lang::keywords::KeywordId;
use scriptbox_core::lang::operators::OperatorId;
use scriptbox_core::lang::punctuation::PunctuationId;

// NOTE: This module is split across multiple files using `include!` to keep all parser
// methods in the same Rust module (preserving privacy + call patterns) while avoiding
// a single large source file.

include!("parser/core.rs");
include!("parser/helpers.rs");
include!("parser/stmts.rs");
include!("parser/expr.rs");
include!("parser/util.rs");
include!("parser/api.rs");
include!("parser/tests.rs");
