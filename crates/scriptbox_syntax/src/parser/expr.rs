/// Expression parsing methods.
///
/// This chunk implements the expression grammar using a precedence ladder:
/// `lambda` / conditional → `or` → `and` → `not` → comparison → additive → multiplicative →
/// unary → power → postfix → primary.
///
/// ## Notes
/// - Operator identities are carried by [`TokenKind::Operator`] / [`OperatorId`] rather than string spellings.
/// - Unary minus binds looser than `**`, so `-2 ** 2` is `-(2 ** 2)`.
/// - Generator expressions are parsed into [`Expr::ListComp`] and evaluate eagerly.
impl<'a> Parser<'a> {
    // ========================================================================
    // Expressions
    // ========================================================================

    /// Parse `expr (',' expr)* [',']`; more than one element (or a trailing comma) builds a tuple.
    fn expression_list(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let first = self.expression()?;
        if !self.check_punct(PunctuationId::Comma) {
            return Ok(first);
        }

        let start = first.span.start;
        let mut items = vec![first];
        while self.match_punct(PunctuationId::Comma) {
            if !self.is_at_expr_start() {
                break;
            }
            items.push(self.expression()?);
        }
        Ok(Spanned::new(Expr::Tuple(items), self.span_from(start)))
    }

    fn expression(&mut self) -> Result<Spanned<Expr>, CompileError> {
        self.nested(Self::conditional)
    }

    fn conditional(&mut self) -> Result<Spanned<Expr>, CompileError> {
        if self.check_keyword(KeywordId::Lambda) {
            return self.lambda_expr();
        }

        let then = self.or_test()?;
        if !self.match_keyword(KeywordId::If) {
            return Ok(then);
        }
        let condition = self.or_test()?;
        self.expect_keyword(KeywordId::Else, "expected 'else' after conditional expression")?;
        let otherwise = self.expression()?;
        let span = then.span.merge(otherwise.span);
        Ok(Spanned::new(
            Expr::IfExp(Box::new(IfExp {
                then,
                condition,
                otherwise,
            })),
            span,
        ))
    }

    fn lambda_expr(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let start = self.current_span().start;
        self.expect_keyword(KeywordId::Lambda, "expected 'lambda'")?;
        let params = self.params(PunctuationId::Colon, false)?;
        self.expect_punct(PunctuationId::Colon, "expected ':' after lambda parameters")?;
        let body = self.expression()?;
        let span = Span::new(start, body.span.end);
        Ok(Spanned::new(Expr::Lambda(params, Box::new(body)), span))
    }

    fn or_test(&mut self) -> Result<Spanned<Expr>, CompileError> {
        self.chain(|p| {
            let mut left = p.and_test()?;
            while p.match_keyword(KeywordId::Or) {
                p.deepen()?;
                let right = p.and_test()?;
                let span = left.span.merge(right.span);
                left = Spanned::new(Expr::Binary(Box::new(left), BinaryOp::Or, Box::new(right)), span);
            }
            Ok(left)
        })
    }

    fn and_test(&mut self) -> Result<Spanned<Expr>, CompileError> {
        self.chain(|p| {
            let mut left = p.not_test()?;
            while p.match_keyword(KeywordId::And) {
                p.deepen()?;
                let right = p.not_test()?;
                let span = left.span.merge(right.span);
                left = Spanned::new(Expr::Binary(Box::new(left), BinaryOp::And, Box::new(right)), span);
            }
            Ok(left)
        })
    }

    fn not_test(&mut self) -> Result<Spanned<Expr>, CompileError> {
        if self.match_keyword(KeywordId::Not) {
            let start = self.tokens[self.pos - 1].span.start;
            let expr = self.nested(Self::not_test)?;
            let span = Span::new(start, expr.span.end);
            Ok(Spanned::new(Expr::Unary(UnaryOp::Not, Box::new(expr)), span))
        } else {
            self.comparison()
        }
    }

    /// Parse a comparison chain into a single [`Expr::Compare`] node.
    fn comparison(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let left = self.additive()?;

        let mut links = Vec::new();
        while let Some(op) = self.comparison_op() {
            links.push((op, self.additive()?));
        }

        match links.last() {
            None => Ok(left),
            Some((_, last)) => {
                let span = left.span.merge(last.span);
                Ok(Spanned::new(Expr::Compare(Box::new(left), links), span))
            }
        }
    }

    /// Consume a comparison operator (including `not in` / `is not`), if one is next.
    fn comparison_op(&mut self) -> Option<CompareOp> {
        let (op, width) = match (&self.peek().kind, &self.peek_next().kind) {
            (TokenKind::Operator(OperatorId::EqEq), _) => (CompareOp::Eq, 1),
            (TokenKind::Operator(OperatorId::NotEq), _) => (CompareOp::NotEq, 1),
            (TokenKind::Operator(OperatorId::Lt), _) => (CompareOp::Lt, 1),
            (TokenKind::Operator(OperatorId::LtEq), _) => (CompareOp::LtEq, 1),
            (TokenKind::Operator(OperatorId::Gt), _) => (CompareOp::Gt, 1),
            (TokenKind::Operator(OperatorId::GtEq), _) => (CompareOp::GtEq, 1),
            (TokenKind::Keyword(KeywordId::In), _) => (CompareOp::In, 1),
            (TokenKind::Keyword(KeywordId::Not), TokenKind::Keyword(KeywordId::In)) => (CompareOp::NotIn, 2),
            (TokenKind::Keyword(KeywordId::Is), TokenKind::Keyword(KeywordId::Not)) => (CompareOp::IsNot, 2),
            (TokenKind::Keyword(KeywordId::Is), _) => (CompareOp::Is, 1),
            _ => return None,
        };
        for _ in 0..width {
            self.advance();
        }
        Some(op)
    }

    fn additive(&mut self) -> Result<Spanned<Expr>, CompileError> {
        self.chain(|p| {
            let mut left = p.multiplicative()?;

            loop {
                let op = if p.match_op(OperatorId::Plus) {
                    BinaryOp::Add
                } else if p.match_op(OperatorId::Minus) {
                    BinaryOp::Sub
                } else {
                    break;
                };

                p.deepen()?;
                let right = p.multiplicative()?;
                let span = left.span.merge(right.span);
                left = Spanned::new(Expr::Binary(Box::new(left), op, Box::new(right)), span);
            }

            Ok(left)
        })
    }

    fn multiplicative(&mut self) -> Result<Spanned<Expr>, CompileError> {
        self.chain(|p| {
            let mut left = p.unary()?;

            loop {
                let op = if p.match_op(OperatorId::Star) {
                    BinaryOp::Mul
                } else if p.match_op(OperatorId::SlashSlash) {
                    BinaryOp::FloorDiv
                } else if p.match_op(OperatorId::Slash) {
                    BinaryOp::Div
                } else if p.match_op(OperatorId::Percent) {
                    BinaryOp::Mod
                } else {
                    break;
                };

                p.deepen()?;
                let right = p.unary()?;
                let span = left.span.merge(right.span);
                left = Spanned::new(Expr::Binary(Box::new(left), op, Box::new(right)), span);
            }

            Ok(left)
        })
    }

    fn unary(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let op = if self.match_op(OperatorId::Minus) {
            UnaryOp::Neg
        } else if self.match_op(OperatorId::Plus) {
            UnaryOp::Pos
        } else {
            return self.power();
        };
        let start = self.tokens[self.pos - 1].span.start;
        let expr = self.nested(Self::unary)?;
        let span = Span::new(start, expr.span.end);
        Ok(Spanned::new(Expr::Unary(op, Box::new(expr)), span))
    }

    fn power(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let base = self.postfix()?;

        // Right-associative: 2**3**2 = 2**(3**2); the exponent may carry a sign.
        if self.match_op(OperatorId::StarStar) {
            let exponent = self.nested(Self::unary)?;
            let span = base.span.merge(exponent.span);
            return Ok(Spanned::new(
                Expr::Binary(Box::new(base), BinaryOp::Pow, Box::new(exponent)),
                span,
            ));
        }

        Ok(base)
    }

    fn postfix(&mut self) -> Result<Spanned<Expr>, CompileError> {
        self.chain(|p| {
            let mut expr = p.primary()?;

            loop {
                if p.match_punct(PunctuationId::Dot) {
                    p.deepen()?;
                    let name = p.identifier()?;
                    if p.match_punct(PunctuationId::LParen) {
                        let args = p.call_args()?;
                        p.expect_punct(PunctuationId::RParen, "expected ')' after arguments")?;
                        let span = p.span_from(expr.span.start);
                        expr = Spanned::new(Expr::MethodCall(Box::new(expr), name, args), span);
                    } else {
                        let span = p.span_from(expr.span.start);
                        expr = Spanned::new(Expr::Field(Box::new(expr), name), span);
                    }
                } else if p.match_punct(PunctuationId::LBracket) {
                    p.deepen()?;
                    let result = p.index_or_slice()?;
                    p.expect_punct(PunctuationId::RBracket, "expected ']' after index/slice")?;
                    let span = p.span_from(expr.span.start);
                    expr = match result {
                        IndexOrSlice::Index(index) => Spanned::new(Expr::Index(Box::new(expr), Box::new(index)), span),
                        IndexOrSlice::Slice(slice) => Spanned::new(Expr::Slice(Box::new(expr), slice), span),
                    };
                } else if p.match_punct(PunctuationId::LParen) {
                    p.deepen()?;
                    let args = p.call_args()?;
                    p.expect_punct(PunctuationId::RParen, "expected ')' after arguments")?;
                    let span = p.span_from(expr.span.start);
                    expr = Spanned::new(Expr::Call(Box::new(expr), args), span);
                } else {
                    break;
                }
            }

            Ok(expr)
        })
    }

    /// Parse index or slice expression inside brackets
    /// Handles: [expr], [a, b], [start:end], [start:end:step], [:end], [start:], [::step]
    fn index_or_slice(&mut self) -> Result<IndexOrSlice, CompileError> {
        if self.check_punct(PunctuationId::Colon) {
            return self.parse_slice(None);
        }

        if self.check_punct(PunctuationId::RBracket) {
            return Err(CompileError::syntax(
                "empty subscript is not allowed".to_string(),
                self.current_span(),
            ));
        }

        let first = self.expression_list()?;

        if self.check_punct(PunctuationId::Colon) {
            return self.parse_slice(Some(first));
        }

        Ok(IndexOrSlice::Index(first))
    }

    /// Parse slice syntax after optional start expression
    /// start is already parsed, now parse [:end[:step]]
    fn parse_slice(&mut self, start: Option<Spanned<Expr>>) -> Result<IndexOrSlice, CompileError> {
        self.expect_punct(PunctuationId::Colon, "expected ':' in slice")?;

        let end = if !self.check_punct(PunctuationId::RBracket) && !self.check_punct(PunctuationId::Colon) {
            Some(Box::new(self.expression()?))
        } else {
            None
        };

        let step = if self.match_punct(PunctuationId::Colon) {
            if !self.check_punct(PunctuationId::RBracket) {
                Some(Box::new(self.expression()?))
            } else {
                None
            }
        } else {
            None
        };

        Ok(IndexOrSlice::Slice(SliceExpr {
            start: start.map(Box::new),
            end,
            step,
        }))
    }

    fn primary(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let start = self.current_span().start;

        // Literals
        if let Some(lit) = self.try_literal() {
            return Ok(Spanned::new(Expr::Literal(lit), self.span_from(start)));
        }

        // Strings and f-strings (adjacent literals concatenate)
        if matches!(self.peek().kind, TokenKind::String(_) | TokenKind::FString(_)) {
            return self.string_run(start);
        }

        if self.match_punct(PunctuationId::LBracket) {
            return self.list_or_comp(start);
        }

        if self.match_punct(PunctuationId::LBrace) {
            return self.dict_or_comp(start);
        }

        if self.match_punct(PunctuationId::LParen) {
            return self.paren_or_tuple(start);
        }

        if self.check_keyword(KeywordId::Lambda) {
            return self.lambda_expr();
        }

        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            return Ok(Spanned::new(Expr::Ident(name), self.span_from(start)));
        }

        Err(self.error_here("invalid syntax: expected expression"))
    }

    fn try_literal(&mut self) -> Option<Literal> {
        let lit = match &self.peek().kind {
            TokenKind::Int(n) => Literal::Int(*n),
            TokenKind::Float(f) => Literal::Float(*f),
            TokenKind::Keyword(KeywordId::True) => Literal::Bool(true),
            TokenKind::Keyword(KeywordId::False) => Literal::Bool(false),
            TokenKind::Keyword(KeywordId::None) => Literal::None,
            _ => return None,
        };
        self.advance();
        Some(lit)
    }

    /// Parse a run of adjacent string / f-string tokens into one literal or f-string.
    fn string_run(&mut self, start: usize) -> Result<Spanned<Expr>, CompileError> {
        let mut parts: Vec<FStringPart> = Vec::new();
        let mut is_fstring = false;

        loop {
            match &self.peek().kind {
                TokenKind::String(s) => {
                    let s = s.clone();
                    self.advance();
                    push_literal_part(&mut parts, s);
                }
                TokenKind::FString(lex_parts) => {
                    let lex_parts = lex_parts.clone();
                    self.advance();
                    is_fstring = true;
                    for part in self.convert_fstring_parts(lex_parts)? {
                        match part {
                            FStringPart::Literal(s) => push_literal_part(&mut parts, s),
                            field => parts.push(field),
                        }
                    }
                }
                _ => break,
            }
        }

        let span = self.span_from(start);
        if is_fstring {
            return Ok(Spanned::new(Expr::FString(parts), span));
        }
        let text: String = parts
            .into_iter()
            .map(|part| match part {
                FStringPart::Literal(s) => s,
                FStringPart::Expr(_) => String::new(),
            })
            .collect();
        Ok(Spanned::new(Expr::Literal(Literal::String(text)), span))
    }

    fn convert_fstring_parts(&self, parts: Vec<LexFStringPart>) -> Result<Vec<FStringPart>, CompileError> {
        parts
            .into_iter()
            .map(|part| match part {
                LexFStringPart::Literal(s) => Ok(FStringPart::Literal(s)),
                LexFStringPart::Expr {
                    source,
                    offset,
                    conversion,
                    spec,
                } => Ok(FStringPart::Expr(FStringField {
                    expr: self.parse_fstring_field(&source, offset)?,
                    conversion,
                    spec,
                })),
            })
            .collect()
    }

    /// Lex and parse one replacement-field expression, keeping spans relative to the whole program.
    fn parse_fstring_field(&self, source: &str, offset: usize) -> Result<Spanned<Expr>, CompileError> {
        let text = source.trim();
        let base = offset + (source.len() - source.trim_start().len());
        if text.is_empty() {
            return Err(CompileError::syntax(
                "f-string: empty expression not allowed".to_string(),
                Span::new(offset.saturating_sub(1), offset + source.len() + 1),
            ));
        }

        let mut tokens = match lexer::lex(text) {
            Ok(tokens) => tokens,
            Err(errors) => {
                let mut first = errors.into_iter().next().unwrap_or_else(|| {
                    CompileError::syntax("f-string: invalid expression".to_string(), Span::new(0, text.len()))
                });
                first.span = first.span.offset(base);
                return Err(first);
            }
        };
        for token in &mut tokens {
            token.span = token.span.offset(base);
        }

        let mut parser = Parser::new(&tokens);
        parser.nesting = self.nesting;
        let expr = parser.expression_list()?;
        parser.skip_newlines();
        if !parser.is_at_end() {
            return Err(parser.error_here("f-string: expecting '}'"));
        }
        Ok(expr)
    }

    fn list_or_comp(&mut self, start: usize) -> Result<Spanned<Expr>, CompileError> {
        if self.match_punct(PunctuationId::RBracket) {
            return Ok(Spanned::new(Expr::List(Vec::new()), self.span_from(start)));
        }

        let first = self.expression()?;

        if self.check_keyword(KeywordId::For) {
            let clause = self.comp_clause()?;
            self.expect_punct(PunctuationId::RBracket, "expected ']' after comprehension")?;
            return Ok(Spanned::new(
                Expr::ListComp(Box::new(ListComp { expr: first, clause })),
                self.span_from(start),
            ));
        }

        let mut elements = vec![first];
        while self.match_punct(PunctuationId::Comma) {
            if self.check_punct(PunctuationId::RBracket) {
                break;
            }
            elements.push(self.expression()?);
        }
        self.expect_punct(PunctuationId::RBracket, "invalid syntax: expected ',' or ']'")?;
        Ok(Spanned::new(Expr::List(elements), self.span_from(start)))
    }

    fn dict_or_comp(&mut self, start: usize) -> Result<Spanned<Expr>, CompileError> {
        if self.match_punct(PunctuationId::RBrace) {
            return Ok(Spanned::new(Expr::Dict(Vec::new()), self.span_from(start)));
        }

        let first = self.expression()?;
        if !self.match_punct(PunctuationId::Colon) {
            return Err(CompileError::syntax(
                "set displays are not supported".to_string(),
                Span::new(start, first.span.end),
            ));
        }
        let first_value = self.expression()?;

        if self.check_keyword(KeywordId::For) {
            let clause = self.comp_clause()?;
            self.expect_punct(PunctuationId::RBrace, "expected '}' after comprehension")?;
            return Ok(Spanned::new(
                Expr::DictComp(Box::new(DictComp {
                    key: first,
                    value: first_value,
                    clause,
                })),
                self.span_from(start),
            ));
        }

        let mut entries = vec![(first, first_value)];
        while self.match_punct(PunctuationId::Comma) {
            if self.check_punct(PunctuationId::RBrace) {
                break;
            }
            let key = self.expression()?;
            self.expect_punct(PunctuationId::Colon, "expected ':' in dict entry")?;
            let value = self.expression()?;
            entries.push((key, value));
        }
        self.expect_punct(PunctuationId::RBrace, "invalid syntax: expected ',' or '}'")?;
        Ok(Spanned::new(Expr::Dict(entries), self.span_from(start)))
    }

    fn paren_or_tuple(&mut self, start: usize) -> Result<Spanned<Expr>, CompileError> {
        if self.match_punct(PunctuationId::RParen) {
            return Ok(Spanned::new(Expr::Tuple(Vec::new()), self.span_from(start)));
        }

        let first = self.expression()?;

        // Generator expression, evaluated eagerly.
        if self.check_keyword(KeywordId::For) {
            let clause = self.comp_clause()?;
            self.expect_punct(PunctuationId::RParen, "expected ')' after generator expression")?;
            return Ok(Spanned::new(
                Expr::ListComp(Box::new(ListComp { expr: first, clause })),
                self.span_from(start),
            ));
        }

        if self.match_punct(PunctuationId::Comma) {
            let mut elements = vec![first];
            while !self.check_punct(PunctuationId::RParen) {
                elements.push(self.expression()?);
                if !self.match_punct(PunctuationId::Comma) {
                    break;
                }
            }
            self.expect_punct(PunctuationId::RParen, "invalid syntax: expected ',' or ')'")?;
            return Ok(Spanned::new(Expr::Tuple(elements), self.span_from(start)));
        }

        self.expect_punct(PunctuationId::RParen, "invalid syntax: expected ')'")?;
        Ok(Spanned::new(Expr::Paren(Box::new(first)), self.span_from(start)))
    }

    /// Parse `for target in iter [if cond]...` after a comprehension element.
    fn comp_clause(&mut self) -> Result<CompClause, CompileError> {
        self.expect_keyword(KeywordId::For, "expected 'for'")?;
        let target = self.target_list()?;
        self.expect_keyword(KeywordId::In, "expected 'in' in comprehension")?;
        let iter = self.or_test()?;

        let mut filters = Vec::new();
        while self.match_keyword(KeywordId::If) {
            filters.push(self.or_test()?);
        }

        if self.check_keyword(KeywordId::For) {
            return Err(CompileError::syntax(
                "comprehensions support a single 'for' clause".to_string(),
                self.current_span(),
            ));
        }

        Ok(CompClause { target, iter, filters })
    }

    /// Parse parameters up to (not including) `close`: `name [: annotation] [= default], ...`.
    fn params(&mut self, close: PunctuationId, annotations: bool) -> Result<Vec<Spanned<Param>>, CompileError> {
        let mut params: Vec<Spanned<Param>> = Vec::new();
        while !self.check_punct(close) {
            let start = self.current_span().start;
            if self.peek().kind.is_operator(OperatorId::Star) || self.peek().kind.is_operator(OperatorId::StarStar) {
                return Err(CompileError::syntax(
                    "variadic parameters are not supported".to_string(),
                    self.current_span(),
                ));
            }

            let name = self.identifier()?;
            if params.iter().any(|p| p.node.name == name) {
                return Err(CompileError::syntax(
                    format!("duplicate argument '{name}' in function definition"),
                    self.span_from(start),
                ));
            }
            if annotations && self.match_punct(PunctuationId::Colon) {
                self.expression()?;
            }

            let default = if self.match_op(OperatorId::Eq) {
                Some(self.expression()?)
            } else {
                None
            };
            if default.is_none() && params.iter().any(|p| p.node.default.is_some()) {
                return Err(CompileError::syntax(
                    "non-default argument follows default argument".to_string(),
                    self.span_from(start),
                ));
            }

            params.push(Spanned::new(Param { name, default }, self.span_from(start)));
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        Ok(params)
    }

    fn call_args(&mut self) -> Result<Vec<CallArg>, CompileError> {
        let mut args = Vec::new();
        while !self.check_punct(PunctuationId::RParen) {
            if self.peek().kind.is_operator(OperatorId::Star) || self.peek().kind.is_operator(OperatorId::StarStar) {
                return Err(CompileError::syntax(
                    "argument unpacking is not supported".to_string(),
                    self.current_span(),
                ));
            }

            // Named argument
            let named = match &self.peek().kind {
                TokenKind::Ident(name) if self.peek_next().kind.is_operator(OperatorId::Eq) => Some(name.clone()),
                _ => None,
            };
            if let Some(name) = named {
                let name_span = self.current_span();
                self.advance(); // name
                self.advance(); // =
                if args.iter().any(|a| matches!(a, CallArg::Named(n, _) if *n == name)) {
                    return Err(CompileError::syntax(
                        format!("keyword argument repeated: {name}"),
                        name_span,
                    ));
                }
                let value = self.expression()?;
                args.push(CallArg::Named(name, value));
            } else {
                let start = self.current_span().start;
                if args.iter().any(|a| matches!(a, CallArg::Named(..))) {
                    return Err(CompileError::syntax(
                        "positional argument follows keyword argument".to_string(),
                        self.current_span(),
                    ));
                }
                let mut expr = self.expression()?;
                if self.check_keyword(KeywordId::For) {
                    // `f(x for x in xs)`: a bare generator must be the only argument.
                    let clause = self.comp_clause()?;
                    if !args.is_empty() || !self.check_punct(PunctuationId::RParen) {
                        return Err(CompileError::syntax(
                            "generator expression must be parenthesized".to_string(),
                            self.span_from(start),
                        ));
                    }
                    expr = Spanned::new(Expr::ListComp(Box::new(ListComp { expr, clause })), self.span_from(start));
                }
                args.push(CallArg::Positional(expr));
            }

            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        Ok(args)
    }
}

/// Append literal text, merging with a preceding literal part.
fn push_literal_part(parts: &mut Vec<FStringPart>, text: String) {
    if let Some(FStringPart::Literal(prev)) = parts.last_mut() {
        prev.push_str(&text);
    } else {
        parts.push(FStringPart::Literal(text));
    }
}
