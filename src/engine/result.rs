//! Requests, results and failure classification.

use std::fmt;

use scriptbox_core::errors::{ErrorKind, FailureClass};
use scriptbox_core::lang::errors as exc_registry;
use serde::Serialize;

use crate::namespace::Namespace;

/// Code text plus the namespace it starts from. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    code: String,
    namespace: Namespace,
}

impl ExecutionRequest {
    pub fn new(code: impl Into<String>, namespace: Namespace) -> Self {
        Self {
            code: code.into(),
            namespace,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }
}

/// Lifecycle of a single execution: `Idle → Running → {Completed | Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExecutionState {
    Idle,
    Running,
    Completed,
    Failed,
}

impl ExecutionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ExecutionState::Completed | ExecutionState::Failed)
    }

    /// Advance to `next`, or `None` for a transition the lifecycle does not allow.
    pub fn advance(self, next: ExecutionState) -> Option<ExecutionState> {
        use ExecutionState::*;
        match (self, next) {
            (Idle, Running) | (Idle, Failed) | (Running, Completed) | (Running, Failed) => Some(next),
            _ => None,
        }
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionState::Idle => "idle",
            ExecutionState::Running => "running",
            ExecutionState::Completed => "completed",
            ExecutionState::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// Coarse category of a [`Failure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    Syntax,
    Assertion,
    Runtime,
    Interrupted,
}

impl From<FailureClass> for FailureKind {
    fn from(class: FailureClass) -> Self {
        match class {
            FailureClass::Syntax => FailureKind::Syntax,
            FailureClass::Assertion => FailureKind::Assertion,
            FailureClass::Runtime => FailureKind::Runtime,
            FailureClass::Interrupted => FailureKind::Interrupted,
        }
    }
}

/// An uncaught failure, classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    /// Language-level exception name, e.g. `NameError`.
    pub exception: String,
    pub message: String,
    /// 1-based source position, when known.
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl Failure {
    /// Classify an exception kind through the registry.
    pub(crate) fn from_exception(kind: ErrorKind, message: String, position: Option<(usize, usize)>) -> Self {
        Self::classified(exc_registry::failure_class(kind).into(), kind, message, position)
    }

    /// A failure with an explicit category (engine interrupts are always `Interrupted`).
    pub(crate) fn classified(
        kind: FailureKind,
        exception: ErrorKind,
        message: String,
        position: Option<(usize, usize)>,
    ) -> Self {
        Self {
            kind,
            exception: exc_registry::as_str(exception).to_string(),
            message,
            line: position.map(|(line, _)| line),
            column: position.map(|(_, column)| column),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.exception)?;
        } else {
            write!(f, "{}: {}", self.exception, self.message)?;
        }
        match (self.line, self.column) {
            (Some(line), Some(column)) => write!(f, " (line {line}, column {column})"),
            (Some(line), None) => write!(f, " (line {line})"),
            _ => Ok(()),
        }
    }
}

impl std::error::Error for Failure {}

/// Everything one execution produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    /// Captured `print` output, verbatim.
    pub stdout: String,
    /// Globals after the run (or at the point of failure).
    pub namespace: Namespace,
    pub failure: Option<Failure>,
    pub state: ExecutionState,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.state == ExecutionState::Completed
    }

    /// Convert into a `Result`, keeping only the failure on error.
    pub fn into_result(self) -> Result<(String, Namespace), Failure> {
        match self.failure {
            Some(failure) => Err(failure),
            None => Ok((self.stdout, self.namespace)),
        }
    }
}
