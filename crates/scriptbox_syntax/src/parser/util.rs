/// Miscellaneous parser utilities.
///
/// This chunk contains small shared parsing helpers that don’t cleanly fit into
/// “stmt” or “expr” (identifier lists, dotted module names).
impl<'a> Parser<'a> {
    // ========================================================================
    // Utilities
    // ========================================================================

    fn identifier(&mut self) -> Result<Ident, CompileError> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            TokenKind::Keyword(id) => Err(CompileError::syntax(
                format!("invalid syntax: '{}' is a reserved word", keyword_spelling(*id)),
                self.current_span(),
            )),
            _ => Err(self.error_here("expected identifier")),
        }
    }

    fn identifier_list(&mut self) -> Result<Vec<Ident>, CompileError> {
        let mut idents = vec![self.identifier()?];
        while self.match_punct(PunctuationId::Comma) {
            idents.push(self.identifier()?);
        }
        Ok(idents)
    }

    /// Parse `a.b.c` and return it joined with dots.
    fn dotted_name(&mut self) -> Result<String, CompileError> {
        let mut name = self.identifier()?;
        while self.match_punct(PunctuationId::Dot) {
            name.push('.');
            name.push_str(&self.identifier()?);
        }
        Ok(name)
    }
}

fn keyword_spelling(id: KeywordId) -> &'static str {
    scriptbox_core::lang::keywords::as_str(id)
}
