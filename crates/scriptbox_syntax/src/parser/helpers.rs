/// Token-stream helpers and error recovery.
///
/// This chunk contains the low-level primitives used throughout parsing:
/// - Peeking/consuming tokens (`peek`, `advance`)
/// - Matching / expecting keywords, operators, and punctuation
/// - Layout handling (`skip_newlines`, `skip_dedents`, `at_statement_end`)
/// - Error recovery (`synchronize`)
impl<'a> Parser<'a> {
    // ========================================================================
    // Helpers
    // ========================================================================

    /// Return `true` if the current token is [`TokenKind::Eof`].
    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    /// Return the current token without consuming it.
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// Return the token after the current token without consuming it.
    fn peek_next(&self) -> &Token {
        if self.pos + 1 < self.tokens.len() {
            &self.tokens[self.pos + 1]
        } else {
            &self.tokens[self.tokens.len() - 1]
        }
    }

    /// Advance to the next token and return the token we just consumed.
    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.pos += 1;
        }
        &self.tokens[self.pos.saturating_sub(1)]
    }

    /// Return `true` if the current token “matches” `kind`.
    ///
    /// ## Notes
    /// - For ID-carrying tokens (keywords/operators/punctuation), the IDs must match.
    /// - For data-bearing tokens (identifiers/literals), the variant is compared and the
    ///   payload value is ignored.
    fn check(&self, kind: &TokenKind) -> bool {
        match (kind, &self.peek().kind) {
            (TokenKind::Keyword(k1), TokenKind::Keyword(k2)) => k1 == k2,
            (TokenKind::Operator(o1), TokenKind::Operator(o2)) => o1 == o2,
            (TokenKind::Punctuation(p1), TokenKind::Punctuation(p2)) => p1 == p2,
            _ => std::mem::discriminant(kind) == std::mem::discriminant(&self.peek().kind),
        }
    }

    /// Return `true` if the current token is the given keyword.
    fn check_keyword(&self, id: KeywordId) -> bool {
        self.peek().kind.is_keyword(id)
    }

    /// Return `true` if the current token is the given punctuation.
    fn check_punct(&self, id: PunctuationId) -> bool {
        self.peek().kind.is_punctuation(id)
    }

    /// If the current token matches `kind`, consume it and return `true`.
    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_keyword(&mut self, id: KeywordId) -> bool {
        if self.check_keyword(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_punct(&mut self, id: PunctuationId) -> bool {
        if self.check_punct(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_op(&mut self, id: OperatorId) -> bool {
        if self.peek().kind.is_operator(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, id: KeywordId, msg: &str) -> Result<&Token, CompileError> {
        if self.check_keyword(id) {
            Ok(self.advance())
        } else {
            Err(self.error_here(msg))
        }
    }

    fn expect_punct(&mut self, id: PunctuationId, msg: &str) -> Result<&Token, CompileError> {
        if self.check_punct(id) {
            Ok(self.advance())
        } else {
            Err(self.error_here(msg))
        }
    }

    /// Build a syntax error at the current token: `"{msg}, found {token}"`.
    fn error_here(&self, msg: &str) -> CompileError {
        CompileError::syntax(format!("{msg}, found {}", self.peek().kind), self.current_span())
    }

    fn skip_newlines(&mut self) {
        while self.match_token(&TokenKind::Newline) {}
    }

    /// Skip stray DEDENT tokens at the current position.
    ///
    /// These should not normally appear at module level, but can show up after error recovery.
    fn skip_dedents(&mut self) {
        while self.match_token(&TokenKind::Dedent) {}
    }

    /// `true` when the current token ends a simple statement.
    fn at_statement_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Newline | TokenKind::Eof | TokenKind::Dedent)
            || self.check_punct(PunctuationId::Semicolon)
    }

    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if matches!(self.peek().kind, TokenKind::Newline) {
                self.advance();
                return;
            }
            if [KeywordId::Def, KeywordId::If, KeywordId::While, KeywordId::For, KeywordId::Try]
                .into_iter()
                .any(|kw| self.check_keyword(kw))
            {
                return;
            }
            self.advance();
        }
    }

    fn current_span(&self) -> Span {
        self.peek().span
    }

    /// Run `parse` one nesting level deeper, failing past [`MAX_EXPR_NESTING`].
    fn nested(
        &mut self,
        parse: fn(&mut Self) -> Result<Spanned<Expr>, CompileError>,
    ) -> Result<Spanned<Expr>, CompileError> {
        self.deepen()?;
        let result = parse(self);
        self.nesting -= 1;
        result
    }

    /// Parse a left-associative chain (`a + b + c`, `a.b(c)[d]`), releasing the depth its links claimed once
    /// the chain is built.
    ///
    /// ## Notes
    /// - Every link nests the tree built so far one level deeper, so `parse` calls [`Parser::deepen`] per link
    ///   and long flat chains hit the same [`MAX_EXPR_NESTING`] limit as brackets.
    fn chain(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<Spanned<Expr>, CompileError>,
    ) -> Result<Spanned<Expr>, CompileError> {
        let mark = self.nesting;
        let result = parse(self);
        self.nesting = mark;
        result
    }

    fn deepen(&mut self) -> Result<(), CompileError> {
        if self.nesting >= MAX_EXPR_NESTING {
            return Err(CompileError::syntax(
                "expression is too deeply nested".to_string(),
                self.current_span(),
            ));
        }
        self.nesting += 1;
        Ok(())
    }

    /// Span from `start` through the end of the most recently consumed token.
    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.tokens[self.pos.saturating_sub(1)].span.end)
    }

    /// Check if the current token can start an expression
    fn is_at_expr_start(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Ident(_)
                | TokenKind::Int(_)
                | TokenKind::Float(_)
                | TokenKind::String(_)
                | TokenKind::FString(_)
        ) || [
            KeywordId::True,
            KeywordId::False,
            KeywordId::None,
            KeywordId::Not,
            KeywordId::Lambda,
        ]
        .into_iter()
        .any(|kw| self.check_keyword(kw))
            || self.check_punct(PunctuationId::LParen)
            || self.check_punct(PunctuationId::LBracket)
            || self.check_punct(PunctuationId::LBrace)
            || self.peek().kind.is_operator(OperatorId::Minus)
            || self.peek().kind.is_operator(OperatorId::Plus)
    }
}
