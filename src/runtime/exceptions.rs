//! Exceptions and non-local control flow.
//!
//! Evaluation returns `Result<_, Unwind>`. A [`Unwind::Raise`] is an ordinary exception that `try/except` can
//! catch; a [`Unwind::Interrupt`] comes from the engine (deadline, step budget, cancellation) and unwinds through
//! `except` and `finally` without running them.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use scriptbox_core::errors::ErrorKind;
use scriptbox_syntax::ast::Span;

use super::object::Object;
use super::repr;

/// An exception instance.
#[derive(Debug)]
pub(crate) struct ExceptionObj {
    pub kind: ErrorKind,
    pub args: Vec<Object>,
    /// Where the exception was first raised; filled in by the innermost node that sees it.
    pub span: Cell<Option<Span>>,
    /// `raise ... from cause`
    pub cause: RefCell<Option<Object>>,
}

impl ExceptionObj {
    pub fn new(kind: ErrorKind, args: Vec<Object>) -> Self {
        Self {
            kind,
            args,
            span: Cell::new(None),
            cause: RefCell::new(None),
        }
    }

    /// `str(exc)`: the single argument's `str`, `''` without arguments, otherwise the args tuple.
    ///
    /// `KeyError` renders its key with `repr`, matching what users see for missing keys.
    pub fn message(&self) -> String {
        match self.args.as_slice() {
            [] => String::new(),
            [arg] if self.kind == ErrorKind::KeyError => repr::repr(arg),
            [arg] => repr::to_str(arg),
            args => repr::repr(&Object::tuple(args.to_vec())),
        }
    }
}

pub(crate) type Exc = Rc<ExceptionObj>;

/// Why the engine stopped an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interrupt {
    Deadline,
    StepBudget,
    Cancelled,
}

/// Non-local exit from evaluation.
#[derive(Debug, Clone)]
pub(crate) enum Unwind {
    Raise(Exc),
    Interrupt(Interrupt, Option<Span>),
}

impl Unwind {
    /// Attach `span` if no more precise location is known yet.
    pub fn at(self, span: Span) -> Unwind {
        match self {
            Unwind::Raise(exc) => {
                if exc.span.get().is_none() {
                    exc.span.set(Some(span));
                }
                Unwind::Raise(exc)
            }
            Unwind::Interrupt(kind, None) => Unwind::Interrupt(kind, Some(span)),
            other => other,
        }
    }
}

/// Statement completion.
#[derive(Debug)]
pub(crate) enum Flow {
    Normal,
    Break,
    Continue,
    Return(Object),
}

pub(crate) type EvalResult<T = Object> = Result<T, Unwind>;

/// Build a raise of `kind` with a message argument.
pub(crate) fn raise(kind: ErrorKind, message: impl Into<String>) -> Unwind {
    Unwind::Raise(Rc::new(ExceptionObj::new(kind, vec![Object::string(message.into())])))
}

/// `Err(raise(...))` shorthand.
pub(crate) fn fail<T>(kind: ErrorKind, message: impl Into<String>) -> EvalResult<T> {
    Err(raise(kind, message))
}

pub(crate) fn type_error<T>(message: impl Into<String>) -> EvalResult<T> {
    fail(ErrorKind::TypeError, message)
}

pub(crate) fn value_error<T>(message: impl Into<String>) -> EvalResult<T> {
    fail(ErrorKind::ValueError, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_follows_argument_count() {
        let none = ExceptionObj::new(ErrorKind::ValueError, vec![]);
        assert_eq!(none.message(), "");
        let one = ExceptionObj::new(ErrorKind::ValueError, vec![Object::str("bad")]);
        assert_eq!(one.message(), "bad");
        let key = ExceptionObj::new(ErrorKind::KeyError, vec![Object::str("b")]);
        assert_eq!(key.message(), "'b'");
        let two = ExceptionObj::new(ErrorKind::ValueError, vec![Object::Int(1), Object::str("x")]);
        assert_eq!(two.message(), "(1, 'x')");
    }

    #[test]
    fn innermost_span_wins() {
        let unwind = raise(ErrorKind::NameError, "x").at(Span::new(4, 5)).at(Span::new(0, 10));
        match unwind {
            Unwind::Raise(exc) => assert_eq!(exc.span.get(), Some(Span::new(4, 5))),
            other => panic!("expected raise, got {other:?}"),
        }
    }
}
