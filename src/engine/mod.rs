//! Execution Engine: run code against a namespace and report what happened.
//!
//! Every execution gets its own interpreter, global scope and output buffer on a dedicated worker thread. The
//! engine itself only holds configuration, so one [`Engine`] can serve concurrent callers.
//!
//! ## Examples
//! ```rust
//! use scriptbox::{Engine, ExecConfig, FailureKind, Namespace};
//!
//! let engine = Engine::new(ExecConfig::default());
//! let ns = Namespace::build([("x", 41)]).unwrap();
//!
//! let ok = engine.execute("x += 1\nprint(x)", &ns);
//! assert_eq!(ok.stdout, "42\n");
//!
//! let failed = engine.execute("assert x == 42, 'x is off'", &ns);
//! assert_eq!(failed.failure.unwrap().kind, FailureKind::Assertion);
//! ```

mod result;

pub use result::{ExecutionRequest, ExecutionResult, ExecutionState, Failure, FailureKind};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use scriptbox_core::errors::ErrorKind;
use scriptbox_syntax::diagnostics::{CompileError, line_col};
use tracing::debug;

use crate::config::ExecConfig;
use crate::namespace::Namespace;
use crate::runtime::{self, RaisedError, RunOutcome};

/// Cooperative cancellation for a running execution.
///
/// Cloning shares the flag; cancelling any clone stops the execution at its next statement or loop iteration.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Runs code. Holds only immutable configuration.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: ExecConfig,
}

impl Engine {
    pub fn new(config: ExecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExecConfig {
        &self.config
    }

    /// Execute `code` with `initial` as its only globals.
    ///
    /// Never panics and never returns early: every failure is folded into the returned [`ExecutionResult`].
    pub fn execute(&self, code: &str, initial: &Namespace) -> ExecutionResult {
        self.execute_inner(code, initial, None)
    }

    pub fn run(&self, request: &ExecutionRequest) -> ExecutionResult {
        self.execute(request.code(), request.namespace())
    }

    /// Like [`Engine::execute`], stopping with `KeyboardInterrupt` once `token` is cancelled.
    pub fn execute_with_cancel(&self, code: &str, initial: &Namespace, token: &CancelToken) -> ExecutionResult {
        self.execute_inner(code, initial, Some(&token.cancelled))
    }

    /// Parse and run on the worker thread, so neither step can exhaust the caller's stack.
    #[tracing::instrument(name = "execute", skip_all, fields(code_len = code.len(), binding_count = initial.len()))]
    fn execute_inner(&self, code: &str, initial: &Namespace, cancel: Option<&AtomicBool>) -> ExecutionResult {
        let mut state = ExecutionState::Idle;
        let outcome = thread::scope(|scope| {
            let worker = thread::Builder::new()
                .name("scriptbox-exec".to_string())
                .stack_size(self.config.stack_size)
                .spawn_scoped(scope, || -> Result<RunOutcome, Vec<CompileError>> {
                    let program = scriptbox_syntax::parse_source(code)?;
                    Ok(runtime::run(&program, initial, &self.config, cancel))
                });
            match worker {
                Ok(handle) => handle
                    .join()
                    .unwrap_or_else(|_| Ok(lost_worker(initial, "execution thread panicked"))),
                Err(err) => Ok(lost_worker(initial, &format!("could not start execution thread: {err}"))),
            }
        });

        let RunOutcome { stdout, globals, error } = match outcome {
            Ok(outcome) => outcome,
            Err(errors) => {
                let failure = syntax_failure(code, &errors);
                debug!(from = %state, to = %ExecutionState::Failed, failure = %failure, "syntax failure");
                return ExecutionResult {
                    stdout: String::new(),
                    namespace: initial.clone(),
                    failure: Some(failure),
                    state: ExecutionState::Failed,
                };
            }
        };

        state = transition(state, ExecutionState::Running);
        let failure = error.map(|raised| runtime_failure(code, raised));
        let next = if failure.is_some() {
            ExecutionState::Failed
        } else {
            ExecutionState::Completed
        };
        state = transition(state, next);
        if let Some(failure) = &failure {
            debug!(kind = ?failure.kind, exception = %failure.exception, "execution failed");
        }
        ExecutionResult {
            stdout,
            namespace: Namespace::from_entries(globals),
            failure,
            state,
        }
    }
}

fn transition(from: ExecutionState, to: ExecutionState) -> ExecutionState {
    debug!(%from, %to, "execution state");
    from.advance(to).unwrap_or(to)
}

/// Outcome used when the worker thread itself is gone; the interpreter's partial state is lost with it.
fn lost_worker(initial: &Namespace, detail: &str) -> RunOutcome {
    RunOutcome {
        stdout: String::new(),
        globals: initial.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        error: Some(RaisedError {
            kind: ErrorKind::InternalError,
            message: detail.to_string(),
            span: None,
            interrupted: false,
        }),
    }
}

fn syntax_failure(code: &str, errors: &[CompileError]) -> Failure {
    match errors.first() {
        Some(first) => {
            let kind = if first.is_indentation() {
                ErrorKind::IndentationError
            } else {
                ErrorKind::SyntaxError
            };
            Failure::from_exception(kind, first.message.clone(), Some(line_col(code, first.span.start)))
        }
        None => Failure::from_exception(ErrorKind::SyntaxError, "invalid syntax".to_string(), None),
    }
}

fn runtime_failure(code: &str, raised: RaisedError) -> Failure {
    let position = raised.span.map(|span| line_col(code, span.start));
    if raised.interrupted {
        Failure::classified(FailureKind::Interrupted, raised.kind, raised.message, position)
    } else {
        Failure::from_exception(raised.kind, raised.message, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use std::time::Duration;

    fn ns(pairs: &[(&str, Value)]) -> Namespace {
        Namespace::build(pairs.iter().cloned()).unwrap()
    }

    #[test]
    fn syntax_failure_keeps_initial_namespace() {
        let initial = ns(&[("a", Value::from(1))]);
        let result = Engine::default().execute("print((1)\n", &initial);
        assert_eq!(result.state, ExecutionState::Failed);
        assert_eq!(result.namespace, initial);
        assert!(result.stdout.is_empty());
        let failure = result.failure.unwrap();
        assert_eq!(failure.kind, FailureKind::Syntax);
        assert_eq!(failure.exception, "SyntaxError");
        assert!(failure.line.is_some());
    }

    #[test]
    fn indentation_failure_is_named() {
        let result = Engine::default().execute("x = 1\n    y = 2\n", &Namespace::new());
        let failure = result.failure.unwrap();
        assert_eq!(failure.kind, FailureKind::Syntax);
        assert_eq!(failure.exception, "IndentationError");
    }

    #[test]
    fn runtime_failure_reports_position() {
        let result = Engine::default().execute("x = 1\ny = x + missing\n", &Namespace::new());
        let failure = result.failure.unwrap();
        assert_eq!(failure.kind, FailureKind::Runtime);
        assert_eq!(failure.exception, "NameError");
        assert_eq!((failure.line, failure.column), (Some(2), Some(9)));
        assert_eq!(result.namespace.get("x"), Some(&Value::from(1)));
    }

    #[test]
    fn deadline_interrupts() {
        let engine = Engine::new(ExecConfig::default().with_deadline(Duration::from_millis(20)));
        let result = engine.execute("while True:\n    pass\n", &Namespace::new());
        let failure = result.failure.unwrap();
        assert_eq!(failure.kind, FailureKind::Interrupted);
        assert_eq!(failure.exception, "TimeoutError");
    }

    #[test]
    fn cancelled_token_interrupts() {
        let token = CancelToken::new();
        token.cancel();
        let result = Engine::default().execute_with_cancel("x = 1\n", &Namespace::new(), &token);
        let failure = result.failure.unwrap();
        assert_eq!(failure.kind, FailureKind::Interrupted);
        assert_eq!(failure.exception, "KeyboardInterrupt");
        assert!(result.namespace.get("x").is_none());
    }

    #[test]
    fn run_uses_request() {
        let request = ExecutionRequest::new("y = x * 2", ns(&[("x", Value::from(21))]));
        let result = Engine::default().run(&request);
        assert!(result.is_success());
        assert_eq!(result.namespace.get("y"), Some(&Value::from(42)));
        assert_eq!(request.namespace().get("y"), None);
    }
}
