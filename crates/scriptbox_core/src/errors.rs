//! Shared exception kinds and user-facing error messages used across the parser and the runtime.
//!
//! The metadata for each kind (spelling, parent, failure class) lives in [`crate::lang::errors`].

pub use crate::indexing::{INDEX_OUT_OF_RANGE_MSG, SLICE_STEP_ZERO_MSG};

/// Message used when a value is divided by integer zero.
pub const INT_DIVISION_BY_ZERO_MSG: &str = "integer division or modulo by zero";
/// Message used when an integer is true-divided (`/`) by zero.
pub const TRUE_DIVISION_BY_ZERO_MSG: &str = "division by zero";
/// Message used when a value is divided by float zero.
pub const FLOAT_DIVISION_BY_ZERO_MSG: &str = "float division by zero";
/// Message used when an integer operation leaves the `i64` range.
pub const INT_OVERFLOW_MSG: &str = "integer result too large to represent";
/// Message used when the call depth limit is exceeded.
pub const RECURSION_LIMIT_MSG: &str = "maximum recursion depth exceeded";

/// Builtin exception kinds known to the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BaseException,
    Exception,
    KeyboardInterrupt,
    AssertionError,
    ArithmeticError,
    ZeroDivisionError,
    OverflowError,
    LookupError,
    KeyError,
    IndexError,
    ValueError,
    TypeError,
    NameError,
    AttributeError,
    ImportError,
    RuntimeError,
    RecursionError,
    NotImplementedError,
    TimeoutError,
    SyntaxError,
    IndentationError,
    InternalError,
}

/// Coarse outcome class a kind maps to when it escapes executed code uncaught.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    Syntax,
    Assertion,
    Runtime,
    Interrupted,
}
