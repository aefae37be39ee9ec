//! Tree-walking interpreter for executed code.
//!
//! One [`Interpreter`] runs one program. It owns the global dict, the captured output buffer and the
//! bookkeeping for the engine's limits; nothing it allocates outlives [`run`].
//!
//! ## Notes
//!
//! - Statements live in `exec.rs`, expressions and calls in `eval.rs`, builtin functions in `builtins.rs` and
//!   methods of builtin types in `methods.rs`.
//! - Interrupts are checked by [`Interpreter::tick`] before every statement and loop iteration.

mod builtins;
mod convert;
mod dict;
mod eval;
mod exceptions;
mod exec;
mod methods;
mod object;
mod ops;
mod repr;
mod scope;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use indexmap::IndexMap;
use scriptbox_core::errors::{ErrorKind, RECURSION_LIMIT_MSG};
use scriptbox_core::lang::{builtins as builtin_registry, errors as exc_registry};
use scriptbox_syntax::ast::{Program, Span};

use crate::config::ExecConfig;
use crate::namespace::Namespace;
use crate::value::Value;

use exceptions::{EvalResult, Exc, Flow, Interrupt, Unwind, fail};
use object::{DictRef, Object};
use scope::{Env, Resolved};

/// An exception that escaped the program, or the interrupt that stopped it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RaisedError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Option<Span>,
    /// Set for engine interrupts, which are reported as such regardless of `kind`.
    pub interrupted: bool,
}

/// Everything an execution produced.
#[derive(Debug)]
pub(crate) struct RunOutcome {
    pub stdout: String,
    pub globals: IndexMap<String, Value>,
    pub error: Option<RaisedError>,
}

/// Run `program` against a fresh global scope seeded from `initial`.
///
/// A panic inside the interpreter is contained here so that the output and globals produced so far can still be
/// returned; it is reported as `InternalError`.
pub(crate) fn run(program: &Program, initial: &Namespace, config: &ExecConfig, cancel: Option<&AtomicBool>) -> RunOutcome {
    let mut interp = Interpreter::new(initial, config, cancel);
    let result = panic::catch_unwind(AssertUnwindSafe(|| interp.exec_program(program)));
    let error = match result {
        Ok(Ok(())) => None,
        Ok(Err(unwind)) => Some(interp.describe(unwind)),
        Err(payload) => Some(RaisedError {
            kind: ErrorKind::InternalError,
            message: panic_message(payload.as_ref()),
            span: None,
            interrupted: false,
        }),
    };
    let globals = convert::read_back(&interp.globals, config.unrepresentable);
    // Drop every global now so cycles through the global dict are freed.
    interp.globals.borrow_mut().clear();
    RunOutcome {
        stdout: interp.stdout,
        globals,
        error,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("interpreter panicked: {detail}")
}

/// Worker stack reserved for each nested statement or expression evaluation.
const STACK_BYTES_PER_LEVEL: usize = 32 * 1024;

pub(crate) struct Interpreter<'a> {
    globals: DictRef,
    stdout: String,
    config: &'a ExecConfig,
    cancel: Option<&'a AtomicBool>,
    started: Instant,
    steps: u64,
    /// Active user-function calls.
    depth: usize,
    /// Statements and expressions currently being evaluated, innermost included.
    nesting: usize,
    /// Deepest `nesting` the worker stack can hold (see [`STACK_BYTES_PER_LEVEL`]).
    max_nesting: usize,
    /// Exceptions being handled by enclosing `except` blocks, innermost last (for bare `raise`).
    handling: Vec<Exc>,
    /// Innermost function scope; `None` at module level.
    env: Option<Rc<Env>>,
}

impl<'a> Interpreter<'a> {
    fn new(initial: &Namespace, config: &'a ExecConfig, cancel: Option<&'a AtomicBool>) -> Self {
        let globals = Rc::new(std::cell::RefCell::new(convert::globals_from(initial)));
        Self {
            globals,
            stdout: String::new(),
            config,
            cancel,
            started: Instant::now(),
            steps: 0,
            depth: 0,
            nesting: 0,
            max_nesting: config.stack_size / STACK_BYTES_PER_LEVEL,
            handling: Vec::new(),
            env: None,
        }
    }

    fn exec_program(&mut self, program: &Program) -> EvalResult<()> {
        match self.exec_block(&program.body)? {
            Flow::Normal => Ok(()),
            // The parser rejects `break`/`continue`/`return` outside their blocks.
            other => fail(
                ErrorKind::InternalError,
                format!("control flow escaped the module: {other:?}"),
            ),
        }
    }

    /// Run `f` one evaluator level deeper, raising `RecursionError` before the worker stack runs out.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> EvalResult<T>) -> EvalResult<T> {
        if self.nesting >= self.max_nesting {
            return fail(ErrorKind::RecursionError, RECURSION_LIMIT_MSG);
        }
        self.nesting += 1;
        let result = f(self);
        self.nesting -= 1;
        result
    }

    /// Count one unit of work and stop if the engine's limits say so.
    fn tick(&mut self) -> EvalResult<()> {
        self.steps += 1;
        if self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return Err(Unwind::Interrupt(Interrupt::Cancelled, None));
        }
        if self.config.max_steps.is_some_and(|max| self.steps > max) {
            return Err(Unwind::Interrupt(Interrupt::StepBudget, None));
        }
        if self.config.deadline.is_some_and(|deadline| self.started.elapsed() > deadline) {
            return Err(Unwind::Interrupt(Interrupt::Deadline, None));
        }
        Ok(())
    }

    fn describe(&self, unwind: Unwind) -> RaisedError {
        match unwind {
            Unwind::Raise(exc) => RaisedError {
                kind: exc.kind,
                message: exc.message(),
                span: exc.span.get(),
                interrupted: false,
            },
            Unwind::Interrupt(why, span) => {
                let (kind, message) = match why {
                    Interrupt::Deadline => (
                        ErrorKind::TimeoutError,
                        format!(
                            "execution exceeded its deadline of {} ms",
                            self.config.deadline.map_or(0, |d| d.as_millis())
                        ),
                    ),
                    Interrupt::StepBudget => (
                        ErrorKind::TimeoutError,
                        format!(
                            "execution exceeded its budget of {} steps",
                            self.config.max_steps.unwrap_or(0)
                        ),
                    ),
                    Interrupt::Cancelled => (ErrorKind::KeyboardInterrupt, "execution was cancelled".to_string()),
                };
                RaisedError {
                    kind,
                    message,
                    span,
                    interrupted: true,
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Names
    // ------------------------------------------------------------------

    /// Resolve a name: function scopes, then globals, then builtins.
    fn lookup(&self, name: &str) -> EvalResult {
        if let Some(env) = &self.env {
            match scope::resolve(env, name) {
                Resolved::Found(v) => return Ok(v),
                Resolved::UnboundLocal => {
                    return fail(
                        ErrorKind::NameError,
                        format!("cannot access local variable '{name}' where it is not associated with a value"),
                    );
                }
                Resolved::UnboundFree => {
                    return fail(
                        ErrorKind::NameError,
                        format!(
                            "cannot access free variable '{name}' where it is not associated with a value in enclosing scope"
                        ),
                    );
                }
                Resolved::Global => {}
            }
        }
        if let Some(v) = self.globals.borrow().get_str(name) {
            return Ok(v.clone());
        }
        builtin_named(name).map_or_else(
            || fail(ErrorKind::NameError, format!("name '{name}' is not defined")),
            Ok,
        )
    }

    fn binds_globally(&self, name: &str) -> Option<&Rc<Env>> {
        self.env.as_ref().filter(|env| !env.globals_declared.contains(name))
    }

    fn assign_name(&mut self, name: &str, value: Object) {
        match self.binds_globally(name) {
            Some(env) => env.set(name, value),
            None => self.globals.borrow_mut().insert_str(name, value),
        }
    }

    fn delete_name(&mut self, name: &str) -> EvalResult<()> {
        let removed = match self.binds_globally(name) {
            Some(env) => env.remove(name),
            None => self.globals.borrow_mut().remove(&dict::DictKey::Str(Rc::from(name))),
        };
        match removed {
            Some(_) => Ok(()),
            None => fail(ErrorKind::NameError, format!("name '{name}' is not defined")),
        }
    }

    fn write_stdout(&mut self, text: &str) {
        self.stdout.push_str(text);
    }
}

/// Builtin functions and exception classes visible from every scope.
fn builtin_named(name: &str) -> Option<Object> {
    builtin_registry::from_str(name)
        .map(Object::Builtin)
        .or_else(|| exc_registry::from_str(name).map(Object::ExceptionType))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn run_code(code: &str, initial: &Namespace, config: &ExecConfig) -> RunOutcome {
        let program = scriptbox_syntax::parse_source(code).unwrap();
        run(&program, initial, config, None)
    }

    fn run_default(code: &str) -> RunOutcome {
        run_code(code, &Namespace::new(), &ExecConfig::default())
    }

    #[test]
    fn globals_are_seeded_and_read_back() {
        let initial = Namespace::build([("x", Value::from(2))]).unwrap();
        let out = run_code("y = x * 21\n", &initial, &ExecConfig::default());
        assert_eq!(out.error, None);
        assert_eq!(out.globals.get("x"), Some(&Value::from(2)));
        assert_eq!(out.globals.get("y"), Some(&Value::from(42)));
    }

    #[test]
    fn uncaught_exception_keeps_partial_state() {
        let out = run_default("a = 1\nprint('before')\nb = missing\nc = 3\n");
        let err = out.error.unwrap();
        assert_eq!(err.kind, ErrorKind::NameError);
        assert_eq!(err.message, "name 'missing' is not defined");
        assert_eq!(err.span, Some(Span::new(26, 33)));
        assert_eq!(out.stdout, "before\n");
        assert!(out.globals.contains_key("a"));
        assert!(!out.globals.contains_key("c"));
    }

    #[test]
    fn step_budget_interrupts() {
        let config = ExecConfig::default().with_max_steps(50);
        let out = run_code("while True:\n    pass\n", &Namespace::new(), &config);
        let err = out.error.unwrap();
        assert!(err.interrupted);
        assert_eq!(err.kind, ErrorKind::TimeoutError);
        assert_eq!(err.message, "execution exceeded its budget of 50 steps");
    }

    #[test]
    fn cancellation_is_observed() {
        let flag = AtomicBool::new(true);
        let program = scriptbox_syntax::parse_source("x = 1\n").unwrap();
        let out = run(&program, &Namespace::new(), &ExecConfig::default(), Some(&flag));
        let err = out.error.unwrap();
        assert_eq!(err.kind, ErrorKind::KeyboardInterrupt);
        assert!(err.interrupted);
        assert!(!out.globals.contains_key("x"));
    }

    #[test]
    fn builtins_are_not_globals() {
        let out = run_default("n = len([1, 2])\n");
        assert_eq!(out.globals.len(), 1);
        assert_eq!(out.globals.get("n"), Some(&Value::from(2)));
    }
}
