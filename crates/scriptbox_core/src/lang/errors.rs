//! Builtin exception vocabulary (Python-like).
//!
//! This registry makes builtin exception names part of the language vocabulary, like keywords/operators/builtins.
//! Each entry also records its parent kind (for `except` matching and `isinstance`) and the
//! [`FailureClass`] an uncaught instance is reported as.
//!
//! ## Examples
//! ```rust
//! use scriptbox_core::errors::{ErrorKind, FailureClass};
//! use scriptbox_core::lang::errors;
//!
//! assert_eq!(errors::from_str("KeyError"), Some(ErrorKind::KeyError));
//! assert!(errors::is_subclass(ErrorKind::KeyError, ErrorKind::LookupError));
//! assert_eq!(errors::failure_class(ErrorKind::AssertionError), FailureClass::Assertion);
//! ```

use crate::errors::{ErrorKind, FailureClass};

use super::registry::{Example, Since, Stability};

/// Metadata for a builtin exception kind.
#[derive(Debug, Clone, Copy)]
pub struct ExceptionInfo {
    pub id: ErrorKind,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub parent: Option<ErrorKind>,
    pub class: FailureClass,
    /// `false` for kinds that executed code can never name (they only arise inside the engine).
    pub user_visible: bool,
    pub description: &'static str,
    pub since: Since,
    pub stability: Stability,
    pub examples: &'static [Example],
}

use ErrorKind as K;
use FailureClass as C;

/// Registry of builtin exception kinds.
pub const EXCEPTIONS: &[ExceptionInfo] = &[
    info(K::BaseException, "BaseException", None, C::Runtime, "Root of the exception hierarchy."),
    info(
        K::Exception,
        "Exception",
        Some(K::BaseException),
        C::Runtime,
        "Base class for all ordinary errors.",
    ),
    info(
        K::KeyboardInterrupt,
        "KeyboardInterrupt",
        Some(K::BaseException),
        C::Interrupted,
        "Raised when the caller cancels an execution.",
    ),
    ExceptionInfo {
        examples: &[Example {
            code: "assert 1 == 2, \"numbers differ\"",
            note: Some("Fails with `AssertionError: numbers differ`."),
        }],
        ..info(
            K::AssertionError,
            "AssertionError",
            Some(K::Exception),
            C::Assertion,
            "Raised when an `assert` condition is falsy.",
        )
    },
    info(
        K::ArithmeticError,
        "ArithmeticError",
        Some(K::Exception),
        C::Runtime,
        "Base class for arithmetic errors.",
    ),
    ExceptionInfo {
        examples: &[Example {
            code: "print(1 / 0)",
            note: Some("Fails with `ZeroDivisionError: division by zero`."),
        }],
        ..info(
            K::ZeroDivisionError,
            "ZeroDivisionError",
            Some(K::ArithmeticError),
            C::Runtime,
            "Raised when dividing or taking modulo by zero.",
        )
    },
    info(
        K::OverflowError,
        "OverflowError",
        Some(K::ArithmeticError),
        C::Runtime,
        "Raised when an integer result leaves the 64-bit range.",
    ),
    info(
        K::LookupError,
        "LookupError",
        Some(K::Exception),
        C::Runtime,
        "Base class for key and index errors.",
    ),
    ExceptionInfo {
        examples: &[Example {
            code: "d = {\"a\": 1}\nd[\"b\"]",
            note: Some("Fails with `KeyError: 'b'`."),
        }],
        ..info(
            K::KeyError,
            "KeyError",
            Some(K::LookupError),
            C::Runtime,
            "Raised when a dict key is missing.",
        )
    },
    info(
        K::IndexError,
        "IndexError",
        Some(K::LookupError),
        C::Runtime,
        "Raised when a sequence index is out of range.",
    ),
    info(
        K::ValueError,
        "ValueError",
        Some(K::Exception),
        C::Runtime,
        "Raised when an operation receives a value of the right type but an invalid value.",
    ),
    info(
        K::TypeError,
        "TypeError",
        Some(K::Exception),
        C::Runtime,
        "Raised when an operation receives a value of an inappropriate type.",
    ),
    ExceptionInfo {
        examples: &[Example {
            code: "print(missing)",
            note: Some("Fails with `NameError: name 'missing' is not defined`."),
        }],
        ..info(
            K::NameError,
            "NameError",
            Some(K::Exception),
            C::Runtime,
            "Raised when a name is not bound in any visible scope.",
        )
    },
    info(
        K::AttributeError,
        "AttributeError",
        Some(K::Exception),
        C::Runtime,
        "Raised when a value has no such method or attribute.",
    ),
    info(
        K::ImportError,
        "ImportError",
        Some(K::Exception),
        C::Runtime,
        "Raised by every `import` statement; executed code cannot load modules.",
    ),
    info(
        K::RuntimeError,
        "RuntimeError",
        Some(K::Exception),
        C::Runtime,
        "Generic runtime error.",
    ),
    info(
        K::RecursionError,
        "RecursionError",
        Some(K::RuntimeError),
        C::Runtime,
        "Raised when the call depth limit is exceeded.",
    ),
    info(
        K::NotImplementedError,
        "NotImplementedError",
        Some(K::RuntimeError),
        C::Runtime,
        "Raised to mark unfinished code paths.",
    ),
    info(
        K::TimeoutError,
        "TimeoutError",
        Some(K::Exception),
        C::Runtime,
        "Raised when a time or step budget runs out.",
    ),
    info(
        K::SyntaxError,
        "SyntaxError",
        Some(K::Exception),
        C::Syntax,
        "Raised when code cannot be parsed.",
    ),
    info(
        K::IndentationError,
        "IndentationError",
        Some(K::SyntaxError),
        C::Syntax,
        "Raised when indentation is inconsistent.",
    ),
    ExceptionInfo {
        user_visible: false,
        ..info(
            K::InternalError,
            "InternalError",
            Some(K::BaseException),
            C::Runtime,
            "Reported when the interpreter itself fails.",
        )
    },
];

/// Return the canonical spelling for an exception kind (e.g. `"ValueError"`).
#[inline]
pub fn as_str(kind: ErrorKind) -> &'static str {
    info_for(kind).canonical
}

/// Return the user-facing description for an exception kind.
#[inline]
pub fn description(kind: ErrorKind) -> &'static str {
    info_for(kind).description
}

/// Return the direct parent of an exception kind (`None` for `BaseException`).
#[inline]
pub fn parent(kind: ErrorKind) -> Option<ErrorKind> {
    info_for(kind).parent
}

/// Return the failure class an uncaught exception of this kind is reported as.
#[inline]
pub fn failure_class(kind: ErrorKind) -> FailureClass {
    info_for(kind).class
}

/// Return `true` if `kind` is `ancestor` or inherits from it.
pub fn is_subclass(kind: ErrorKind, ancestor: ErrorKind) -> bool {
    let mut cur = Some(kind);
    while let Some(k) = cur {
        if k == ancestor {
            return true;
        }
        cur = parent(k);
    }
    false
}

/// Resolve a spelling to an exception kind.
///
/// Matching is case-sensitive. Kinds that executed code cannot name are never returned.
pub fn from_str(name: &str) -> Option<ErrorKind> {
    EXCEPTIONS
        .iter()
        .filter(|e| e.user_visible)
        .find(|e| {
            let aliases: &[&str] = e.aliases;
            e.canonical == name || aliases.contains(&name)
        })
        .map(|e| e.id)
}

/// Return full metadata for an exception kind.
///
/// ## Panics
/// - If the registry is missing an entry for `kind` (programming error).
pub fn info_for(kind: ErrorKind) -> &'static ExceptionInfo {
    EXCEPTIONS
        .iter()
        .find(|e| e.id == kind)
        .expect("exception info missing")
}

const fn info(
    id: ErrorKind,
    canonical: &'static str,
    parent: Option<ErrorKind>,
    class: FailureClass,
    description: &'static str,
) -> ExceptionInfo {
    ExceptionInfo {
        id,
        canonical,
        aliases: &[],
        parent,
        class,
        user_visible: true,
        description,
        since: Since(0, 1),
        stability: Stability::Stable,
        examples: &[],
    }
}
