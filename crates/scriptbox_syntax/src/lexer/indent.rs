//! Indentation handling for the scriptbox lexer
//!
//! Implements Python-style INDENT/DEDENT tokens.

use super::Lexer;
use super::tokens::{Token, TokenKind};
use crate::ast::Span;
use crate::diagnostics::CompileError;

/// Columns a tab advances the indentation counter by.
const TAB_WIDTH: usize = 4;
/// Deepest block nesting the lexer accepts.
const MAX_INDENT_LEVELS: usize = 100;

impl<'a> Lexer<'a> {
    pub(super) fn handle_indentation(&mut self) {
        let start = self.current_pos;
        let mut indent = 0;

        // Count leading spaces/tabs
        while let Some(c) = self.peek() {
            match c {
                ' ' => {
                    indent += 1;
                    self.advance();
                }
                '\t' => {
                    indent += TAB_WIDTH;
                    self.advance();
                }
                '\x0c' | '\r' => {
                    self.advance();
                }
                '#' => {
                    // Comment line - skip to end
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                    if self.peek() == Some('\n') {
                        self.advance();
                    }
                    return; // Stay at line start
                }
                '\n' => {
                    // Blank line - skip
                    self.advance();
                    return; // Stay at line start
                }
                '\\' if self.continues_line() => {
                    // A blank line that ends in a continuation joins the next physical line.
                    self.advance();
                    self.skip_line_break();
                }
                _ => break,
            }
        }

        // At end of file?
        if self.is_at_end() {
            self.at_line_start = false;
            return;
        }

        let current_indent = self.indent_stack.last().copied().unwrap_or(0);

        if indent > current_indent {
            if self.indent_stack.len() > MAX_INDENT_LEVELS {
                self.errors.push(CompileError::indentation(
                    "too many levels of indentation".to_string(),
                    Span::new(start, self.current_pos),
                ));
            }
            self.indent_stack.push(indent);
            self.tokens
                .push(Token::new(TokenKind::Indent, Span::new(start, self.current_pos)));
        } else if indent < current_indent {
            // Count how many dedents we need BEFORE modifying the stack
            let count = self
                .indent_stack
                .iter()
                .rev()
                .take_while(|&&level| indent < level)
                .count();

            // Pop indent levels
            while let Some(&top) = self.indent_stack.last() {
                if indent >= top {
                    break;
                }
                self.indent_stack.pop();
                if self.indent_stack.is_empty() {
                    self.indent_stack.push(0);
                    break;
                }
            }

            // Verify we landed on a valid indent level
            let final_indent = self.indent_stack.last().copied().unwrap_or(0);
            if indent != final_indent {
                self.errors.push(
                    CompileError::indentation(
                        "unindent does not match any outer indentation level".to_string(),
                        Span::new(start, self.current_pos),
                    )
                    .with_note(format!("expected {final_indent} columns, got {indent}")),
                );
            }

            // Emit dedent tokens
            if count > 0 {
                self.tokens
                    .push(Token::new(TokenKind::Dedent, Span::new(start, self.current_pos)));
                if count > 1 {
                    self.pending_dedents = count - 1;
                }
            }
        }

        self.at_line_start = false;
    }
}
