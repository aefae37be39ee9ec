//! Runtime objects.
//!
//! Objects are reference-counted and single-threaded: an interpreter and everything it allocates live on one
//! worker thread and are dropped when the execution ends.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use scriptbox_core::errors::ErrorKind;
use scriptbox_core::lang::builtins::BuiltinFnId;
use scriptbox_core::lang::errors as exc_registry;
use scriptbox_syntax::ast::{Expr, Spanned, Statement};

use super::dict::Dict;
use super::exceptions::ExceptionObj;
use super::scope::Env;

pub(crate) type ListRef = Rc<RefCell<Vec<Object>>>;
pub(crate) type DictRef = Rc<RefCell<Dict>>;

#[derive(Clone)]
pub(crate) enum Object {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(ListRef),
    Tuple(Rc<[Object]>),
    Dict(DictRef),
    Range(RangeObj),
    Function(Rc<Function>),
    Builtin(BuiltinFnId),
    /// A method looked up with `obj.name` but not called yet.
    BoundMethod(Rc<(Object, Rc<str>)>),
    Type(TypeTag),
    ExceptionType(ErrorKind),
    Exception(Rc<ExceptionObj>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RangeObj {
    pub start: i64,
    pub stop: i64,
    pub step: i64,
}

impl RangeObj {
    pub fn len(&self) -> usize {
        let span = if self.step > 0 {
            self.stop.saturating_sub(self.start)
        } else {
            self.start.saturating_sub(self.stop)
        };
        if span <= 0 {
            return 0;
        }
        let step = self.step.unsigned_abs();
        ((span as u64).div_ceil(step)) as usize
    }

    pub fn get(&self, idx: usize) -> i64 {
        self.start.wrapping_add(self.step.wrapping_mul(idx as i64))
    }

    pub fn contains(&self, v: i64) -> bool {
        let in_bounds = if self.step > 0 {
            v >= self.start && v < self.stop
        } else {
            v <= self.start && v > self.stop
        };
        in_bounds && (i128::from(v) - i128::from(self.start)) % i128::from(self.step) == 0
    }
}

/// Types that are not callable builtins: `type(None)`, `type(f)`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeTag {
    NoneType,
    Bool,
    Int,
    Float,
    Str,
    List,
    Tuple,
    Dict,
    Range,
    Function,
    BuiltinFunction,
    Method,
    Type,
}

impl TypeTag {
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::NoneType => "NoneType",
            TypeTag::Bool => "bool",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Str => "str",
            TypeTag::List => "list",
            TypeTag::Tuple => "tuple",
            TypeTag::Dict => "dict",
            TypeTag::Range => "range",
            TypeTag::Function => "function",
            TypeTag::BuiltinFunction => "builtin_function_or_method",
            TypeTag::Method => "method",
            TypeTag::Type => "type",
        }
    }

    /// The builtin constructor that doubles as this type (`int`, `str`, ...).
    pub fn from_builtin(id: BuiltinFnId) -> Option<TypeTag> {
        Some(match id {
            BuiltinFnId::Bool => TypeTag::Bool,
            BuiltinFnId::Int => TypeTag::Int,
            BuiltinFnId::Float => TypeTag::Float,
            BuiltinFnId::Str => TypeTag::Str,
            BuiltinFnId::List => TypeTag::List,
            BuiltinFnId::Tuple => TypeTag::Tuple,
            BuiltinFnId::Dict => TypeTag::Dict,
            BuiltinFnId::Range => TypeTag::Range,
            BuiltinFnId::Type => TypeTag::Type,
            _ => return None,
        })
    }

    /// Inverse of [`TypeTag::from_builtin`]: types are reported as their constructor when one exists.
    pub fn into_object(self) -> Object {
        let builtin = match self {
            TypeTag::Bool => BuiltinFnId::Bool,
            TypeTag::Int => BuiltinFnId::Int,
            TypeTag::Float => BuiltinFnId::Float,
            TypeTag::Str => BuiltinFnId::Str,
            TypeTag::List => BuiltinFnId::List,
            TypeTag::Tuple => BuiltinFnId::Tuple,
            TypeTag::Dict => BuiltinFnId::Dict,
            TypeTag::Range => BuiltinFnId::Range,
            TypeTag::Type => BuiltinFnId::Type,
            other => return Object::Type(other),
        };
        Object::Builtin(builtin)
    }
}

/// Code of a user function: a `def` body or a lambda expression.
pub(crate) enum FunctionBody {
    Block(Rc<[Spanned<Statement>]>),
    Lambda(Rc<Spanned<Expr>>),
}

pub(crate) struct Function {
    pub name: Rc<str>,
    /// Parameter names with their default values (evaluated once, at definition time).
    pub params: Vec<(Rc<str>, Option<Object>)>,
    pub body: FunctionBody,
    /// Names assigned anywhere in the body (minus `global` declarations).
    pub locals: Rc<HashSet<String>>,
    pub globals_declared: Rc<HashSet<String>>,
    /// Scope of the enclosing function, for closures.
    pub closure: Option<Rc<Env>>,
}

impl Object {
    pub fn str(s: &str) -> Object {
        Object::Str(Rc::from(s))
    }

    pub fn string(s: String) -> Object {
        Object::Str(Rc::from(s))
    }

    pub fn list(items: Vec<Object>) -> Object {
        Object::List(Rc::new(RefCell::new(items)))
    }

    pub fn tuple(items: Vec<Object>) -> Object {
        Object::Tuple(Rc::from(items))
    }

    pub fn dict(dict: Dict) -> Object {
        Object::Dict(Rc::new(RefCell::new(dict)))
    }

    pub fn type_tag(&self) -> TypeTag {
        match self {
            Object::None => TypeTag::NoneType,
            Object::Bool(_) => TypeTag::Bool,
            Object::Int(_) => TypeTag::Int,
            Object::Float(_) => TypeTag::Float,
            Object::Str(_) => TypeTag::Str,
            Object::List(_) => TypeTag::List,
            Object::Tuple(_) => TypeTag::Tuple,
            Object::Dict(_) => TypeTag::Dict,
            Object::Range(_) => TypeTag::Range,
            Object::Function(_) => TypeTag::Function,
            Object::Builtin(id) => match TypeTag::from_builtin(*id) {
                Some(_) => TypeTag::Type,
                None => TypeTag::BuiltinFunction,
            },
            Object::BoundMethod(_) => TypeTag::Method,
            Object::Type(_) | Object::ExceptionType(_) => TypeTag::Type,
            // Exceptions report their own class name through `type_name`.
            Object::Exception(_) => TypeTag::Type,
        }
    }

    /// Language-level type name, as `type(x).__name__` would print it.
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Exception(e) => exc_registry::as_str(e.kind),
            other => other.type_tag().name(),
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Object::None => false,
            Object::Bool(b) => *b,
            Object::Int(i) => *i != 0,
            Object::Float(f) => *f != 0.0,
            Object::Str(s) => !s.is_empty(),
            Object::List(items) => !items.borrow().is_empty(),
            Object::Tuple(items) => !items.is_empty(),
            Object::Dict(d) => !d.borrow().is_empty(),
            Object::Range(r) => r.len() > 0,
            _ => true,
        }
    }

    /// Identity (`is`): same allocation for containers, same value for immutable scalars.
    pub fn is_same(&self, other: &Object) -> bool {
        match (self, other) {
            (Object::None, Object::None) => true,
            (Object::Bool(a), Object::Bool(b)) => a == b,
            (Object::Int(a), Object::Int(b)) => a == b,
            (Object::Float(a), Object::Float(b)) => a.to_bits() == b.to_bits(),
            (Object::Str(a), Object::Str(b)) => Rc::ptr_eq(a, b) || a == b,
            (Object::List(a), Object::List(b)) => Rc::ptr_eq(a, b),
            (Object::Tuple(a), Object::Tuple(b)) => Rc::ptr_eq(a, b),
            (Object::Dict(a), Object::Dict(b)) => Rc::ptr_eq(a, b),
            (Object::Range(a), Object::Range(b)) => a == b,
            (Object::Function(a), Object::Function(b)) => Rc::ptr_eq(a, b),
            (Object::Builtin(a), Object::Builtin(b)) => a == b,
            (Object::BoundMethod(a), Object::BoundMethod(b)) => Rc::ptr_eq(a, b),
            (Object::Type(a), Object::Type(b)) => a == b,
            (Object::ExceptionType(a), Object::ExceptionType(b)) => a == b,
            (Object::Exception(a), Object::Exception(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", super::repr::repr(self))
    }
}
