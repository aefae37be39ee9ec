#![forbid(unsafe_code)]
//! scriptbox: run script code against injected globals and inspect what it did.
//!
//! A caller builds a [`Namespace`] of named [`Value`]s, hands it to the [`Engine`] together with code text, and
//! gets back an [`ExecutionResult`]: the captured output, the final globals, and a classified [`Failure`] if the
//! code did not run to completion. The executed language is a Python-compatible subset; see the `scriptbox_syntax`
//! crate for the grammar.
//!
//! ## Examples
//! ```rust
//! use scriptbox::{Namespace, Value, execute};
//!
//! let ns = Namespace::build([("greeting", Value::from("hi"))]).unwrap();
//! let result = execute("print(greeting.upper())\nshout = True", &ns);
//! assert!(result.is_success());
//! assert_eq!(result.stdout, "HI\n");
//! assert_eq!(result.namespace.get("shout"), Some(&Value::from(true)));
//! ```
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. Failures inside executed code
//!   are values ([`Failure`]), never panics.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents an interpreter bug (logic error), use `.expect("INVARIANT: reason")`
//!   with a clear explanation. The engine still contains such a panic and reports it as `InternalError`.

pub mod config;
pub mod engine;
pub mod namespace;
mod runtime;
pub mod value;
pub mod version;

pub use config::{ExecConfig, UnrepresentablePolicy};
pub use engine::{CancelToken, Engine, ExecutionRequest, ExecutionResult, ExecutionState, Failure, FailureKind};
pub use namespace::{InvalidBindingError, Namespace, NamespaceBuilder};
pub use value::{Number, Value};

/// Execute `code` against `initial` with the default [`ExecConfig`].
pub fn execute(code: &str, initial: &Namespace) -> ExecutionResult {
    Engine::default().execute(code, initial)
}
