//! String scanning for the scriptbox lexer
//!
//! Handles regular strings, raw strings, and f-strings, each in single- or triple-quoted form.

use super::Lexer;
use super::tokens::{FStringPart, Token, TokenKind};
use crate::ast::Span;
use crate::diagnostics::CompileError;

// ============================================================================
// Escape sequence handling
// ============================================================================

/// Result of processing an escape sequence
pub enum EscapeResult {
    /// Successfully parsed escape character
    Char(char),
    /// Backslash-newline: the line break is dropped
    LineContinuation,
    /// Unknown escape - preserve as-is (backslash + char)
    Unknown(char),
    /// Malformed `\x` / `\u` escape
    Invalid(String),
    /// End of input during escape
    Eof,
}

impl<'a> Lexer<'a> {
    /// Process a text escape sequence. Called after consuming the backslash.
    fn scan_text_escape(&mut self) -> EscapeResult {
        match self.advance() {
            Some('n') => EscapeResult::Char('\n'),
            Some('t') => EscapeResult::Char('\t'),
            Some('r') => EscapeResult::Char('\r'),
            Some('0') => EscapeResult::Char('\0'),
            Some('\\') => EscapeResult::Char('\\'),
            Some('\'') => EscapeResult::Char('\''),
            Some('"') => EscapeResult::Char('"'),
            Some('\n') => EscapeResult::LineContinuation,
            Some('\r') => {
                self.match_char('\n');
                EscapeResult::LineContinuation
            }
            Some('x') => self.scan_hex_escape('x', 2),
            Some('u') => self.scan_hex_escape('u', 4),
            Some(c) => EscapeResult::Unknown(c),
            None => EscapeResult::Eof,
        }
    }

    fn scan_hex_escape(&mut self, marker: char, width: usize) -> EscapeResult {
        let mut hex = String::new();
        for _ in 0..width {
            match self.peek() {
                Some(c) if c.is_ascii_hexdigit() => {
                    hex.push(c);
                    self.advance();
                }
                _ => break,
            }
        }
        match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
            Some(c) if hex.len() == width => EscapeResult::Char(c),
            _ => EscapeResult::Invalid(format!("\\{marker}{hex}")),
        }
    }

    /// Append the text an escape produces to `out`; returns `false` if scanning must stop.
    fn push_escape(&mut self, out: &mut String, start: usize) -> bool {
        match self.scan_text_escape() {
            EscapeResult::Char(c) => out.push(c),
            EscapeResult::LineContinuation => {}
            EscapeResult::Unknown(c) => {
                out.push('\\');
                out.push(c);
            }
            EscapeResult::Invalid(text) => {
                self.errors.push(CompileError::new(
                    format!("invalid escape sequence '{text}'"),
                    Span::new(start, self.current_pos),
                ));
            }
            EscapeResult::Eof => {
                self.errors.push(CompileError::new(
                    "unterminated escape sequence".to_string(),
                    Span::new(start, self.current_pos),
                ));
                return false;
            }
        }
        true
    }

    /// Consume the second and third quote of a triple-quoted opener, if present.
    fn open_triple(&mut self, quote: char) -> bool {
        if self.peek() == Some(quote) && self.peek_next() == Some(quote) {
            self.advance();
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume the closing delimiter if the input is positioned on it.
    fn close_quote(&mut self, quote: char, triple: bool) -> bool {
        if triple {
            let closing: String = std::iter::repeat_n(quote, 3).collect();
            if !self.source[self.current_pos..].starts_with(&closing) {
                return false;
            }
            for _ in 0..3 {
                self.advance();
            }
            true
        } else {
            self.match_char(quote)
        }
    }
}

// ============================================================================
// String scanning
// ============================================================================

impl<'a> Lexer<'a> {
    pub(super) fn scan_string(&mut self, start: usize, quote: char, raw: bool) {
        let triple = self.open_triple(quote);
        let mut value = String::new();

        loop {
            if self.close_quote(quote, triple) {
                break;
            }
            match self.peek() {
                None => {
                    self.errors.push(CompileError::syntax(
                        unterminated_message("string literal", triple),
                        Span::new(start, self.current_pos),
                    ));
                    break;
                }
                Some('\n') if !triple => {
                    self.errors.push(CompileError::syntax(
                        unterminated_message("string literal", triple),
                        Span::new(start, self.current_pos),
                    ));
                    break;
                }
                Some('\\') if raw => {
                    // Raw strings keep the backslash and never end on an escaped quote.
                    self.advance();
                    value.push('\\');
                    if let Some(c) = self.advance() {
                        value.push(c);
                    }
                }
                Some('\\') => {
                    self.advance();
                    if !self.push_escape(&mut value, start) {
                        break;
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        self.tokens.push(Token::new(
            TokenKind::String(value),
            Span::new(start, self.current_pos),
        ));
    }

    pub(super) fn scan_fstring(&mut self, start: usize, quote: char, raw: bool) {
        let triple = self.open_triple(quote);
        let mut parts = Vec::new();
        let mut literal = String::new();

        loop {
            if self.close_quote(quote, triple) {
                break;
            }
            match self.peek() {
                None => {
                    self.errors.push(CompileError::syntax(
                        unterminated_message("f-string", triple),
                        Span::new(start, self.current_pos),
                    ));
                    break;
                }
                Some('\n') if !triple => {
                    self.errors.push(CompileError::syntax(
                        unterminated_message("f-string", triple),
                        Span::new(start, self.current_pos),
                    ));
                    break;
                }
                Some('{') => {
                    self.advance();
                    if self.match_char('{') {
                        literal.push('{');
                    } else {
                        if !literal.is_empty() {
                            parts.push(FStringPart::Literal(std::mem::take(&mut literal)));
                        }
                        match self.scan_fstring_field(quote, triple) {
                            Some(part) => parts.push(part),
                            None => break,
                        }
                    }
                }
                Some('}') => {
                    self.advance();
                    if self.match_char('}') {
                        literal.push('}');
                    } else {
                        self.errors.push(CompileError::syntax(
                            "f-string: single '}' is not allowed".to_string(),
                            Span::new(self.current_pos - 1, self.current_pos),
                        ));
                    }
                }
                Some('\\') if raw => {
                    self.advance();
                    literal.push('\\');
                    if let Some(c) = self.advance() {
                        literal.push(c);
                    }
                }
                Some('\\') => {
                    self.advance();
                    if !self.push_escape(&mut literal, start) {
                        break;
                    }
                }
                Some(c) => {
                    literal.push(c);
                    self.advance();
                }
            }
        }

        if !literal.is_empty() {
            parts.push(FStringPart::Literal(literal));
        }

        self.tokens.push(Token::new(
            TokenKind::FString(parts),
            Span::new(start, self.current_pos),
        ));
    }

    /// Scan a replacement field after its opening `{`, through the closing `}`.
    ///
    /// The expression text is returned unparsed together with its byte offset; `!r`/`!s`/`!a`
    /// and a `:spec` suffix are split off here.
    fn scan_fstring_field(&mut self, quote: char, triple: bool) -> Option<FStringPart> {
        let offset = self.current_pos;
        let mut expr = String::new();
        let mut depth = 0usize;
        let mut conversion = None;
        let mut spec = None;

        loop {
            let Some(c) = self.peek() else {
                return self.fstring_field_error(offset);
            };
            if (c == quote && !triple) || (c == '\n' && !triple) {
                return self.fstring_field_error(offset);
            }
            match c {
                '[' | '(' | '{' => depth += 1,
                ']' | ')' => depth = depth.saturating_sub(1),
                '}' if depth > 0 => depth -= 1,
                '}' => {
                    self.advance();
                    break;
                }
                '!' if depth == 0 && self.peek_next() != Some('=') => {
                    self.advance();
                    conversion = self.advance();
                    if !matches!(conversion, Some('r' | 's' | 'a')) {
                        self.errors.push(CompileError::syntax(
                            "f-string: invalid conversion character: expected 's', 'r', or 'a'".to_string(),
                            Span::new(self.current_pos.saturating_sub(1), self.current_pos),
                        ));
                    }
                    match self.peek() {
                        Some(':') => continue,
                        Some('}') => {
                            self.advance();
                            break;
                        }
                        _ => return self.fstring_field_error(offset),
                    }
                }
                ':' if depth == 0 => {
                    self.advance();
                    let mut text = String::new();
                    loop {
                        match self.peek() {
                            Some('}') => {
                                self.advance();
                                break;
                            }
                            Some(c) if !(c == quote && !triple) && c != '\n' => {
                                text.push(c);
                                self.advance();
                            }
                            _ => return self.fstring_field_error(offset),
                        }
                    }
                    spec = Some(text);
                    break;
                }
                '\'' | '"' => {
                    // Nested string literal inside the expression.
                    self.advance();
                    expr.push(c);
                    while let Some(inner) = self.peek() {
                        if inner == '\n' {
                            break;
                        }
                        self.advance();
                        expr.push(inner);
                        if inner == c {
                            break;
                        }
                    }
                    continue;
                }
                _ => {}
            }
            expr.push(c);
            self.advance();
        }

        Some(FStringPart::Expr {
            source: expr,
            offset,
            conversion,
            spec,
        })
    }

    fn fstring_field_error(&mut self, offset: usize) -> Option<FStringPart> {
        self.errors.push(CompileError::syntax(
            "f-string: expecting '}'".to_string(),
            Span::new(offset.saturating_sub(1), self.current_pos),
        ));
        None
    }
}

fn unterminated_message(what: &str, triple: bool) -> String {
    if triple {
        format!("unterminated triple-quoted {what}")
    } else {
        format!("unterminated {what}")
    }
}
