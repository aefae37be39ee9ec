//! Number scanning for the scriptbox lexer
//!
//! Handles integer (decimal, `0x`, `0o`, `0b`) and floating-point literals. Underscore separators are accepted
//! between digits.

use super::Lexer;
use super::tokens::TokenKind;
use crate::ast::Span;
use crate::diagnostics::CompileError;

impl<'a> Lexer<'a> {
    pub(super) fn scan_number(&mut self, start: usize, first: char) {
        if first == '0' {
            let radix = match self.peek() {
                Some('x' | 'X') => Some(16),
                Some('o' | 'O') => Some(8),
                Some('b' | 'B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.advance();
                self.scan_radix_int(start, radix);
                return;
            }
        }

        let mut value = String::new();
        let mut is_float = false;
        if first == '.' {
            is_float = true;
            value.push('0');
        }
        value.push(first);
        self.scan_digits(&mut value);

        // Decimal part: `1.5` and `1.` are floats, `1.real`-style attribute access is not.
        if !is_float
            && self.peek() == Some('.')
            && !self.peek_next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        {
            is_float = true;
            value.push('.');
            self.advance();
            self.scan_digits(&mut value);
        }

        // Exponent part
        if matches!(self.peek(), Some('e' | 'E'))
            && self
                .peek_next()
                .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-')
        {
            is_float = true;
            value.push('e');
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                value.push(sign);
                self.advance();
            }
            self.scan_digits(&mut value);
        }

        if is_float {
            match value.parse::<f64>() {
                Ok(f) => self.add_token(TokenKind::Float(f), start),
                Err(_) => self.errors.push(CompileError::new(
                    format!("invalid float literal: {value}"),
                    Span::new(start, self.current_pos),
                )),
            }
        } else {
            match value.parse::<i64>() {
                Ok(i) => self.add_token(TokenKind::Int(i), start),
                Err(_) => self.errors.push(
                    CompileError::new(
                        format!("integer literal too large: {value}"),
                        Span::new(start, self.current_pos),
                    )
                    .with_note("integers are 64-bit"),
                ),
            }
        }
    }

    fn scan_digits(&mut self, value: &mut String) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                value.push(c);
                self.advance();
            } else if c == '_' && self.peek_next().is_some_and(|n| n.is_ascii_digit()) {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn scan_radix_int(&mut self, start: usize, radix: u32) {
        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if c.is_digit(radix) {
                digits.push(c);
                self.advance();
            } else if c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        match i64::from_str_radix(&digits, radix) {
            Ok(i) => self.add_token(TokenKind::Int(i), start),
            Err(_) => self.errors.push(CompileError::new(
                format!("invalid integer literal: {}", &self.source[start..self.current_pos]),
                Span::new(start, self.current_pos),
            )),
        }
    }
}
