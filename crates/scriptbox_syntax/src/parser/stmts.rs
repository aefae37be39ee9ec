/// Statement parsing methods.
///
/// This chunk parses compound statements (`if`, `while`, `for`, `def`, `try`), simple
/// statements separated by `;`, assignments, and indentation-based suites.
///
/// ## Notes
/// - Block parsing relies on `Indent` / `Dedent` layout tokens produced by the lexer.
impl<'a> Parser<'a> {
    // ========================================================================
    // Blocks
    // ========================================================================

    /// Parse statements until the DEDENT closing the current block.
    fn block(&mut self) -> Result<Vec<Spanned<Statement>>, CompileError> {
        let mut stmts = Vec::new();
        self.skip_newlines();
        while !self.check(&TokenKind::Dedent) && !self.is_at_end() {
            stmts.extend(self.statement()?);
            self.skip_newlines();
        }
        Ok(stmts)
    }

    /// Parse `: NEWLINE INDENT block DEDENT` or `: simple_stmt; ...` after a compound header.
    fn suite(&mut self, header: &str) -> Result<Vec<Spanned<Statement>>, CompileError> {
        self.expect_punct(PunctuationId::Colon, &format!("expected ':' after {header}"))?;

        if !self.match_token(&TokenKind::Newline) && !self.is_at_end() {
            return self.simple_line();
        }
        if !self.match_token(&TokenKind::Indent) {
            return Err(CompileError::indentation(
                format!("expected an indented block after {header}"),
                self.current_span(),
            ));
        }
        let body = self.block()?;
        if !self.match_token(&TokenKind::Dedent) && !self.is_at_end() {
            return Err(self.error_here("expected end of indented block"));
        }
        Ok(body)
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Parse one compound statement or one line of simple statements.
    fn statement(&mut self) -> Result<Vec<Spanned<Statement>>, CompileError> {
        let start = self.current_span().start;

        let stmt = match self.peek().kind {
            TokenKind::Indent => {
                return Err(CompileError::indentation(
                    "unexpected indent".to_string(),
                    self.current_span(),
                ));
            }
            TokenKind::Keyword(KeywordId::If) => self.if_stmt()?,
            TokenKind::Keyword(KeywordId::While) => self.while_stmt()?,
            TokenKind::Keyword(KeywordId::For) => self.for_stmt()?,
            TokenKind::Keyword(KeywordId::Def) => self.function_def()?,
            TokenKind::Keyword(KeywordId::Try) => self.try_stmt()?,
            _ => return self.simple_line(),
        };

        Ok(vec![Spanned::new(stmt, self.span_from(start))])
    }

    /// Parse `simple_stmt (';' simple_stmt)* [';'] NEWLINE`.
    fn simple_line(&mut self) -> Result<Vec<Spanned<Statement>>, CompileError> {
        let mut stmts = Vec::new();
        loop {
            let start = self.current_span().start;
            let stmt = self.simple_statement()?;
            stmts.push(Spanned::new(stmt, self.span_from(start)));

            if !self.match_punct(PunctuationId::Semicolon) || self.at_statement_end() {
                break;
            }
        }

        match self.peek().kind {
            TokenKind::Newline => {
                self.advance();
                Ok(stmts)
            }
            // A block's last line is closed by DEDENT, the file's by EOF.
            TokenKind::Eof | TokenKind::Dedent => Ok(stmts),
            _ => Err(self.error_here("invalid syntax: expected end of statement")),
        }
    }

    fn simple_statement(&mut self) -> Result<Statement, CompileError> {
        match self.peek().kind {
            TokenKind::Keyword(KeywordId::Pass) => {
                self.advance();
                Ok(Statement::Pass)
            }
            TokenKind::Keyword(KeywordId::Break) => {
                if self.loop_depth == 0 {
                    return Err(CompileError::syntax("'break' outside loop".to_string(), self.current_span()));
                }
                self.advance();
                Ok(Statement::Break)
            }
            TokenKind::Keyword(KeywordId::Continue) => {
                if self.loop_depth == 0 {
                    return Err(CompileError::syntax(
                        "'continue' not properly in loop".to_string(),
                        self.current_span(),
                    ));
                }
                self.advance();
                Ok(Statement::Continue)
            }
            // `...` is equivalent to pass (Python-style placeholder)
            TokenKind::Punctuation(PunctuationId::Ellipsis) => {
                self.advance();
                Ok(Statement::Pass)
            }
            TokenKind::Keyword(KeywordId::Return) => self.return_stmt(),
            TokenKind::Keyword(KeywordId::Global) => {
                self.advance();
                Ok(Statement::Global(self.identifier_list()?))
            }
            TokenKind::Keyword(KeywordId::Del) => self.del_stmt(),
            TokenKind::Keyword(KeywordId::Assert) => self.assert_stmt(),
            TokenKind::Keyword(KeywordId::Raise) => self.raise_stmt(),
            TokenKind::Keyword(KeywordId::Import) | TokenKind::Keyword(KeywordId::From) => self.import_stmt(),
            TokenKind::Keyword(
                kw @ (KeywordId::Elif | KeywordId::Else | KeywordId::Except | KeywordId::Finally),
            ) => Err(CompileError::syntax(
                format!("invalid syntax: '{}' without a matching statement", keyword_spelling(kw)),
                self.current_span(),
            )),
            _ => self.assignment_or_expr_stmt(),
        }
    }

    fn return_stmt(&mut self) -> Result<Statement, CompileError> {
        if !self.in_function {
            return Err(CompileError::syntax("'return' outside function".to_string(), self.current_span()));
        }
        self.expect_keyword(KeywordId::Return, "expected 'return'")?;
        let expr = if self.at_statement_end() {
            None
        } else {
            Some(self.expression_list()?)
        };
        Ok(Statement::Return(expr))
    }

    fn del_stmt(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(KeywordId::Del, "expected 'del'")?;
        let mut targets = Vec::new();
        loop {
            let expr = self.or_test()?;
            targets.push(self.to_target(expr, "delete")?);
            if !self.match_punct(PunctuationId::Comma) || self.at_statement_end() {
                break;
            }
        }
        Ok(Statement::Del(targets))
    }

    fn assert_stmt(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(KeywordId::Assert, "expected 'assert'")?;
        let test = self.expression()?;
        let msg = if self.match_punct(PunctuationId::Comma) {
            Some(self.expression()?)
        } else {
            None
        };
        Ok(Statement::Assert(AssertStmt { test, msg }))
    }

    fn raise_stmt(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(KeywordId::Raise, "expected 'raise'")?;
        if self.at_statement_end() {
            return Ok(Statement::Raise(RaiseStmt { exc: None, cause: None }));
        }
        let exc = self.expression()?;
        let cause = if self.match_keyword(KeywordId::From) {
            Some(self.expression()?)
        } else {
            None
        };
        Ok(Statement::Raise(RaiseStmt { exc: Some(exc), cause }))
    }

    /// `import a.b [as c], ...` and `from a.b import x [as y], ...` both record the first module path.
    fn import_stmt(&mut self) -> Result<Statement, CompileError> {
        if self.match_keyword(KeywordId::From) {
            let module = self.dotted_name()?;
            self.expect_keyword(KeywordId::Import, "expected 'import' after module name")?;
            if !self.match_op(OperatorId::Star) {
                let parenthesized = self.match_punct(PunctuationId::LParen);
                loop {
                    self.identifier()?;
                    if self.match_keyword(KeywordId::As) {
                        self.identifier()?;
                    }
                    if !self.match_punct(PunctuationId::Comma) {
                        break;
                    }
                    if parenthesized && self.check_punct(PunctuationId::RParen) {
                        break;
                    }
                }
                if parenthesized {
                    self.expect_punct(PunctuationId::RParen, "expected ')' after imported names")?;
                }
            }
            return Ok(Statement::Import(ImportStmt { module }));
        }

        self.expect_keyword(KeywordId::Import, "expected 'import'")?;
        let module = self.dotted_name()?;
        if self.match_keyword(KeywordId::As) {
            self.identifier()?;
        }
        while self.match_punct(PunctuationId::Comma) {
            self.dotted_name()?;
            if self.match_keyword(KeywordId::As) {
                self.identifier()?;
            }
        }
        Ok(Statement::Import(ImportStmt { module }))
    }

    fn if_stmt(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(KeywordId::If, "expected 'if'")?;
        let condition = self.expression()?;
        let then_body = self.suite("'if' statement")?;

        let mut elif_branches = vec![];
        while self.match_keyword(KeywordId::Elif) {
            let elif_condition = self.expression()?;
            let elif_body = self.suite("'elif' statement")?;
            elif_branches.push((elif_condition, elif_body));
        }

        let else_body = if self.match_keyword(KeywordId::Else) {
            Some(self.suite("'else' statement")?)
        } else {
            None
        };

        Ok(Statement::If(IfStmt {
            condition,
            then_body,
            elif_branches,
            else_body,
        }))
    }

    fn while_stmt(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(KeywordId::While, "expected 'while'")?;
        let condition = self.expression()?;
        let body = self.loop_body("'while' statement")?;
        let else_body = if self.match_keyword(KeywordId::Else) {
            Some(self.suite("'else' statement")?)
        } else {
            None
        };

        Ok(Statement::While(WhileStmt {
            condition,
            body,
            else_body,
        }))
    }

    fn for_stmt(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(KeywordId::For, "expected 'for'")?;
        let target = self.target_list()?;
        self.expect_keyword(KeywordId::In, "expected 'in' after for target")?;
        let iter = self.expression_list()?;
        let body = self.loop_body("'for' statement")?;
        let else_body = if self.match_keyword(KeywordId::Else) {
            Some(self.suite("'else' statement")?)
        } else {
            None
        };

        Ok(Statement::For(ForStmt {
            target,
            iter,
            body,
            else_body,
        }))
    }

    fn function_def(&mut self) -> Result<Statement, CompileError> {
        self.expect_keyword(KeywordId::Def, "expected 'def'")?;
        let name = self.identifier()?;
        self.expect_punct(PunctuationId::LParen, "expected '(' after function name")?;
        let params = self.params(PunctuationId::RParen, true)?;
        self.expect_punct(PunctuationId::RParen, "expected ')' after parameters")?;

        // Return annotations are accepted and ignored.
        if self.match_punct(PunctuationId::Arrow) {
            self.expression()?;
        }

        let outer = (self.loop_depth, self.in_function);
        self.loop_depth = 0;
        self.in_function = true;
        let body = self.suite("function definition");
        (self.loop_depth, self.in_function) = outer;
        Ok(Statement::FunctionDef(FunctionDef { name, params, body: body? }))
    }

    /// A loop body, where `break` and `continue` are allowed.
    fn loop_body(&mut self, header: &str) -> Result<Vec<Spanned<Statement>>, CompileError> {
        self.loop_depth += 1;
        let body = self.suite(header);
        self.loop_depth -= 1;
        body
    }

    fn try_stmt(&mut self) -> Result<Statement, CompileError> {
        let try_span = self.current_span();
        self.expect_keyword(KeywordId::Try, "expected 'try'")?;
        let body = self.suite("'try' statement")?;

        let mut handlers: Vec<Spanned<ExceptHandler>> = Vec::new();
        while self.check_keyword(KeywordId::Except) {
            let start = self.current_span().start;
            if handlers.last().is_some_and(|h| h.node.exc_type.is_none()) {
                return Err(CompileError::syntax(
                    "default 'except:' must be last".to_string(),
                    self.current_span(),
                ));
            }
            self.advance();

            let exc_type = if self.check_punct(PunctuationId::Colon) {
                None
            } else {
                Some(self.expression()?)
            };
            let name = if self.match_keyword(KeywordId::As) {
                Some(self.identifier()?)
            } else {
                None
            };
            let handler_body = self.suite("'except' statement")?;
            handlers.push(Spanned::new(
                ExceptHandler {
                    exc_type,
                    name,
                    body: handler_body,
                },
                self.span_from(start),
            ));
        }

        let else_body = if !handlers.is_empty() && self.match_keyword(KeywordId::Else) {
            Some(self.suite("'else' statement")?)
        } else {
            None
        };

        let finally_body = if self.match_keyword(KeywordId::Finally) {
            Some(self.suite("'finally' statement")?)
        } else {
            None
        };

        if handlers.is_empty() && finally_body.is_none() {
            return Err(CompileError::syntax(
                "expected 'except' or 'finally' block".to_string(),
                try_span,
            ));
        }

        Ok(Statement::Try(TryStmt {
            body,
            handlers,
            else_body,
            finally_body,
        }))
    }

    // ========================================================================
    // Assignment
    // ========================================================================

    fn assignment_or_expr_stmt(&mut self) -> Result<Statement, CompileError> {
        let first = self.expression_list()?;

        // Annotated names: `x: int = 1` assigns, a bare `x: int` does nothing.
        if self.check_punct(PunctuationId::Colon)
            && matches!(first.node, Expr::Ident(_) | Expr::Index(..) | Expr::Field(..))
        {
            self.advance();
            self.expression()?;
            if self.match_op(OperatorId::Eq) {
                let target = self.to_target(first, "assign to")?;
                let value = self.expression_list()?;
                return Ok(Statement::Assign(AssignStmt {
                    targets: vec![target],
                    value,
                }));
            }
            return Ok(Statement::Pass);
        }

        if self.peek().kind.is_operator(OperatorId::Eq) {
            let mut targets = vec![self.to_target(first, "assign to").map_err(suggest_equality)?];
            let value = loop {
                self.advance(); // '='
                let rhs = self.expression_list()?;
                if self.peek().kind.is_operator(OperatorId::Eq) {
                    targets.push(self.to_target(rhs, "assign to").map_err(suggest_equality)?);
                } else {
                    break rhs;
                }
            };
            return Ok(Statement::Assign(AssignStmt { targets, value }));
        }

        if let Some(op) = self.peek().operator_id().and_then(augmented_op) {
            if matches!(first.node, Expr::Tuple(_) | Expr::List(_)) {
                return Err(CompileError::syntax(
                    "illegal expression for augmented assignment".to_string(),
                    first.span,
                ));
            }
            let target = self.to_target(first, "assign to")?;
            self.advance();
            let value = self.expression_list()?;
            return Ok(Statement::AugAssign(AugAssignStmt { target, op, value }));
        }

        Ok(Statement::Expr(first))
    }

    /// Parse a `for`/comprehension target: postfix expressions separated by commas, stopping at `in`.
    fn target_list(&mut self) -> Result<Spanned<Target>, CompileError> {
        let start = self.current_span().start;
        let mut items = vec![self.postfix()?];
        let mut trailing_comma = false;
        while self.match_punct(PunctuationId::Comma) {
            trailing_comma = true;
            if self.check_keyword(KeywordId::In) {
                break;
            }
            items.push(self.postfix()?);
            trailing_comma = false;
        }

        if items.len() == 1 && !trailing_comma {
            if let Some(item) = items.pop() {
                return self.to_target(item, "assign to");
            }
        }
        let span = self.span_from(start);
        let targets = items
            .into_iter()
            .map(|item| self.to_target(item, "assign to"))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Spanned::new(Target::Tuple(targets), span))
    }

    /// Convert a parsed expression into an assignment/deletion target.
    fn to_target(&self, expr: Spanned<Expr>, action: &str) -> Result<Spanned<Target>, CompileError> {
        let span = expr.span;
        let target = match expr.node {
            Expr::Ident(name) => Target::Name(name),
            Expr::Index(object, index) => Target::Index(object, index),
            Expr::Paren(inner) => return self.to_target(*inner, action),
            Expr::Tuple(items) | Expr::List(items) => Target::Tuple(
                items
                    .into_iter()
                    .map(|item| self.to_target(item, action))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            other => {
                return Err(CompileError::syntax(
                    format!("cannot {action} {}", describe_expr(&other)),
                    span,
                ));
            }
        };
        Ok(Spanned::new(target, span))
    }
}

fn suggest_equality(err: CompileError) -> CompileError {
    err.with_hint("maybe you meant '==' instead of '='?")
}

/// Map an augmented-assignment operator to the binary operator it applies.
fn augmented_op(id: OperatorId) -> Option<BinaryOp> {
    match id {
        OperatorId::PlusEq => Some(BinaryOp::Add),
        OperatorId::MinusEq => Some(BinaryOp::Sub),
        OperatorId::StarEq => Some(BinaryOp::Mul),
        OperatorId::SlashEq => Some(BinaryOp::Div),
        OperatorId::SlashSlashEq => Some(BinaryOp::FloorDiv),
        OperatorId::PercentEq => Some(BinaryOp::Mod),
        _ => None,
    }
}

/// Name an expression form the way target errors mention it.
fn describe_expr(expr: &Expr) -> &'static str {
    match expr {
        Expr::Literal(_) | Expr::FString(_) => "literal",
        Expr::Call(..) | Expr::MethodCall(..) => "function call",
        Expr::Field(..) => "attribute",
        Expr::Slice(..) => "slice",
        Expr::Lambda(..) => "lambda",
        Expr::Compare(..) => "comparison",
        Expr::IfExp(_) => "conditional expression",
        Expr::Dict(_) => "dict literal",
        Expr::ListComp(_) | Expr::DictComp(_) => "comprehension",
        _ => "expression",
    }
}
