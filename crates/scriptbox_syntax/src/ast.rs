//! Abstract Syntax Tree definitions for scriptbox.
//!
//! The tree mirrors the statement/expression subset the interpreter evaluates. Nodes carry byte spans so
//! runtime failures can be reported with a line and column.

use std::fmt;

/// Source location span (byte offsets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Shift both offsets by `by` bytes (used for expressions parsed out of f-string parts).
    pub fn offset(self, by: usize) -> Span {
        Span {
            start: self.start + by,
            end: self.end + by,
        }
    }
}

/// A node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

pub type Ident = String;

/// A program is a sequence of top-level statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub body: Vec<Spanned<Statement>>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Expression statement
    Expr(Spanned<Expr>),
    /// `x = value`, `a = b = value`, `a, b = value`, `xs[i] = value`
    Assign(AssignStmt),
    /// `x += value`, `xs[i] -= value`, ...
    AugAssign(AugAssignStmt),
    /// `if expr: ... [elif expr: ...] [else: ...]`
    If(IfStmt),
    /// `while expr: ... [else: ...]`
    While(WhileStmt),
    /// `for target in expr: ... [else: ...]`
    For(ForStmt),
    /// `pass`, `...`, or a bare annotation `x: int`
    Pass,
    Break,
    Continue,
    /// `def name(params): ...`
    FunctionDef(FunctionDef),
    /// `return [expr]`
    Return(Option<Spanned<Expr>>),
    /// `global a, b`
    Global(Vec<Ident>),
    /// `assert test[, msg]`
    Assert(AssertStmt),
    /// `raise [expr [from cause]]`
    Raise(RaiseStmt),
    /// `try: ... except ...: ... else: ... finally: ...`
    Try(TryStmt),
    /// `del target, ...`
    Del(Vec<Spanned<Target>>),
    /// `import a.b` / `from a import b`; always fails at run time.
    Import(ImportStmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    /// One entry per `=`; `a = b = 1` has two targets.
    pub targets: Vec<Spanned<Target>>,
    pub value: Spanned<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AugAssignStmt {
    pub target: Spanned<Target>,
    pub op: BinaryOp,
    pub value: Spanned<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Spanned<Expr>,
    pub then_body: Vec<Spanned<Statement>>,
    pub elif_branches: Vec<(Spanned<Expr>, Vec<Spanned<Statement>>)>,
    pub else_body: Option<Vec<Spanned<Statement>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Spanned<Expr>,
    pub body: Vec<Spanned<Statement>>,
    pub else_body: Option<Vec<Spanned<Statement>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub target: Spanned<Target>,
    pub iter: Spanned<Expr>,
    pub body: Vec<Spanned<Statement>>,
    pub else_body: Option<Vec<Spanned<Statement>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: Ident,
    pub params: Vec<Spanned<Param>>,
    pub body: Vec<Spanned<Statement>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub default: Option<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssertStmt {
    pub test: Spanned<Expr>,
    pub msg: Option<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RaiseStmt {
    /// `None` for a bare `raise` (re-raise the active exception).
    pub exc: Option<Spanned<Expr>>,
    pub cause: Option<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryStmt {
    pub body: Vec<Spanned<Statement>>,
    pub handlers: Vec<Spanned<ExceptHandler>>,
    pub else_body: Option<Vec<Spanned<Statement>>>,
    pub finally_body: Option<Vec<Spanned<Statement>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptHandler {
    /// `None` for a bare `except:`.
    pub exc_type: Option<Spanned<Expr>>,
    pub name: Option<Ident>,
    pub body: Vec<Spanned<Statement>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportStmt {
    /// Dotted module path as written.
    pub module: String,
}

/// Assignment / deletion / loop target.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Name(Ident),
    Index(Box<Spanned<Expr>>, Box<Spanned<Expr>>),
    /// `a, b` / `(a, b)` / `[a, b]`
    Tuple(Vec<Spanned<Target>>),
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Identifier
    Ident(Ident),
    /// Literal
    Literal(Literal),
    /// Arithmetic and short-circuit boolean operators: `a + b`, `a and b`
    Binary(Box<Spanned<Expr>>, BinaryOp, Box<Spanned<Expr>>),
    /// Unary operation: `-x`, `+x`, `not x`
    Unary(UnaryOp, Box<Spanned<Expr>>),
    /// Comparison chain: `a < b <= c` holds the first operand plus `(op, operand)` links.
    Compare(Box<Spanned<Expr>>, Vec<(CompareOp, Spanned<Expr>)>),
    /// Function call: `f(a, b=1)`
    Call(Box<Spanned<Expr>>, Vec<CallArg>),
    /// Method call: `x.method(args)`
    MethodCall(Box<Spanned<Expr>>, Ident, Vec<CallArg>),
    /// Attribute access: `x.field`
    Field(Box<Spanned<Expr>>, Ident),
    /// Index: `x[i]`
    Index(Box<Spanned<Expr>>, Box<Spanned<Expr>>),
    /// Slice: `x[start:end:step]`
    Slice(Box<Spanned<Expr>>, SliceExpr),
    /// Conditional expression: `then if condition else otherwise`
    IfExp(Box<IfExp>),
    /// `lambda params: body`
    Lambda(Vec<Spanned<Param>>, Box<Spanned<Expr>>),
    /// Tuple: `(a, b)`
    Tuple(Vec<Spanned<Expr>>),
    /// List literal: `[a, b, c]`
    List(Vec<Spanned<Expr>>),
    /// Dict literal: `{k: v, ...}`
    Dict(Vec<(Spanned<Expr>, Spanned<Expr>)>),
    /// List comprehension (also used for generator expressions, which evaluate eagerly).
    ListComp(Box<ListComp>),
    /// Dict comprehension: `{k: v for x in iter if cond}`
    DictComp(Box<DictComp>),
    /// Parenthesized expression
    Paren(Box<Spanned<Expr>>),
    /// f-string: `f"Hello {name!r:>10}"`
    FString(Vec<FStringPart>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FStringPart {
    Literal(String),
    Expr(FStringField),
}

/// A replacement field inside an f-string.
#[derive(Debug, Clone, PartialEq)]
pub struct FStringField {
    pub expr: Spanned<Expr>,
    /// `!r` / `!s` / `!a`
    pub conversion: Option<char>,
    /// Text after `:`.
    pub spec: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    And,
    Or,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::FloorDiv => write!(f, "//"),
            BinaryOp::Mod => write!(f, "%"),
            BinaryOp::Pow => write!(f, "**"),
            BinaryOp::And => write!(f, "and"),
            BinaryOp::Or => write!(f, "or"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    In,
    NotIn,
    Is,
    IsNot,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::NotEq => write!(f, "!="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::LtEq => write!(f, "<="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::GtEq => write!(f, ">="),
            CompareOp::In => write!(f, "in"),
            CompareOp::NotIn => write!(f, "not in"),
            CompareOp::Is => write!(f, "is"),
            CompareOp::IsNot => write!(f, "is not"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallArg {
    /// Positional argument
    Positional(Spanned<Expr>),
    /// Named argument: `name=value`
    Named(Ident, Spanned<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliceExpr {
    pub start: Option<Box<Spanned<Expr>>>,
    pub end: Option<Box<Spanned<Expr>>>,
    pub step: Option<Box<Spanned<Expr>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfExp {
    pub then: Spanned<Expr>,
    pub condition: Spanned<Expr>,
    pub otherwise: Spanned<Expr>,
}

/// `for target in iter [if filter]...` clause shared by comprehensions.
#[derive(Debug, Clone, PartialEq)]
pub struct CompClause {
    pub target: Spanned<Target>,
    pub iter: Spanned<Expr>,
    pub filters: Vec<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListComp {
    pub expr: Spanned<Expr>,
    pub clause: CompClause,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DictComp {
    pub key: Spanned<Expr>,
    pub value: Spanned<Expr>,
    pub clause: CompClause,
}
