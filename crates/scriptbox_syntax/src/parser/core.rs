/// Parser core types and entrypoint.
///
/// This chunk defines the [`Parser`] type and its top-level `parse()` entrypoint.
/// It also contains a few small internal helper types shared across the other
/// parser chunks.
///
/// ## Notes
/// - This file is `include!`'d into `crate::parser` to keep all parser methods in a
///   single module while avoiding a single “god file”.

/// Result of parsing `[...]` postfix syntax: either a single index or a slice.
enum IndexOrSlice {
    Index(Spanned<Expr>),
    Slice(SliceExpr),
}

/// Parser state.
///
/// ## Notes
/// - The parser is single-pass and recovers from errors where possible by synchronizing at
///   statement boundaries, so one run can report several problems.
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    errors: Vec<CompileError>,
    /// Enclosing `while`/`for` bodies in the current function.
    loop_depth: usize,
    in_function: bool,
    /// Current expression recursion depth (see [`MAX_EXPR_NESTING`]).
    nesting: usize,
}

/// Deepest expression nesting (brackets, prefix operators, operator and postfix chains) the parser accepts.
const MAX_EXPR_NESTING: usize = 200;

impl<'a> Parser<'a> {
    /// Create a new parser for a token stream.
    ///
    /// ## Parameters
    /// - `tokens`: Token stream produced by `scriptbox_syntax::lexer`; must end with `Eof`.
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            loop_depth: 0,
            in_function: false,
            nesting: 0,
        }
    }

    /// Parse the entire token stream into a [`Program`].
    ///
    /// ## Errors
    /// Returns a list of [`CompileError`]s if parsing fails, in source order.
    pub fn parse(mut self) -> Result<Program, Vec<CompileError>> {
        let mut body = Vec::new();
        if self.tokens.is_empty() {
            return Ok(Program { body });
        }

        self.skip_newlines();
        self.skip_dedents();

        while !self.is_at_end() {
            match self.statement() {
                Ok(stmts) => body.extend(stmts),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
            self.skip_newlines();
            // Recovery can leave us on the DEDENT that closes a stray indented region.
            self.skip_dedents();
        }

        if self.errors.is_empty() {
            Ok(Program { body })
        } else {
            Err(self.errors)
        }
    }
}
