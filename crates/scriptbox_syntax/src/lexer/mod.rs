//! Lexer for scriptbox source text
//!
//! Handles tokenization including:
//! - Keywords (def, lambda, try, global, etc.)
//! - Identifiers and literals (int, float, string, raw string, f-string)
//! - Operators and punctuation
//! - Indentation-based blocks (INDENT/DEDENT tokens)
//!
//! ## Module Structure
//!
//! - `tokens` - Token types (TokenKind, Token, FStringPart)
//! - `strings` - String/raw-string/f-string scanning
//! - `numbers` - Numeric literal scanning
//! - `indent` - INDENT/DEDENT handling

mod indent;
mod numbers;
mod strings;
pub mod tokens;

pub use tokens::{FStringPart, Token, TokenKind, keyword_id};

use crate::ast::Span;
use crate::diagnostics::CompileError;
use scriptbox_core::lang::operators::OperatorId;
use scriptbox_core::lang::punctuation::PunctuationId;

// ============================================================================
// LEXER STATE
// ----------------------------------------------------------------------------
// Lexer state diagram (simplified):
//
// [Start of line] → count spaces → [Inside code]
//                                       ↓
//                                      see '(' → [push bracket]
//                                       ↓
//                                      see '\n' or '\' '\n' → skip (continuation)
//                                       ↓
//                                      see ')' → [pop bracket]
// ============================================================================

/// Lexer for scriptbox source code.
///
/// Converts source text into a stream of tokens, handling:
/// - Keywords and identifiers
/// - Numeric and string literals (including raw strings and f-strings)
/// - Operators and punctuation
/// - Python-style indentation (INDENT/DEDENT tokens)
/// - Implicit line continuation inside brackets, explicit continuation with `\`
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    indent_stack: Vec<usize>,
    pending_dedents: usize,
    at_line_start: bool,
    /// Open brackets with their offsets; non-empty means newlines are continuation.
    brackets: Vec<(char, usize)>,
    tokens: Vec<Token>,
    errors: Vec<CompileError>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            indent_stack: vec![0],
            pending_dedents: 0,
            at_line_start: true,
            brackets: Vec::new(),
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire source code.
    ///
    /// Returns a vector of tokens on success, or a vector of errors on failure.
    /// The token stream always ends with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Vec<CompileError>> {
        while !self.is_at_end() {
            self.scan_token();
        }

        if let Some(&(open, pos)) = self.brackets.first() {
            self.errors.push(CompileError::syntax(
                format!("'{open}' was never closed"),
                Span::new(pos, pos + 1),
            ));
        }

        // Emit remaining dedents at EOF
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.tokens.push(Token::new(
                TokenKind::Dedent,
                Span::new(self.current_pos, self.current_pos),
            ));
        }

        self.tokens.push(Token::new(
            TokenKind::Eof,
            Span::new(self.current_pos, self.current_pos),
        ));

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.source[self.current_pos..].char_indices();
        iter.next(); // skip current
        iter.next().map(|(_, c)| c)
    }

    fn advance(&mut self) -> Option<char> {
        if let Some((pos, c)) = self.chars.next() {
            self.current_pos = pos + c.len_utf8();
            Some(c)
        } else {
            None
        }
    }

    /// `true` when the next characters are a backslash followed by a line break.
    fn continues_line(&self) -> bool {
        let rest = &self.source[self.current_pos..];
        rest.starts_with("\\\n") || rest.starts_with("\\\r\n")
    }

    /// `true` when the next characters are a line break.
    fn at_line_break(&self) -> bool {
        let rest = &self.source[self.current_pos..];
        rest.starts_with('\n') || rest.starts_with("\r\n")
    }

    /// Consume one `\n` or `\r\n`.
    fn skip_line_break(&mut self) {
        self.match_char('\r');
        self.match_char('\n');
    }

    // ========================================================================
    // Main scanning dispatch
    // ========================================================================

    fn scan_token(&mut self) {
        // Handle pending dedents first
        if self.pending_dedents > 0 {
            self.pending_dedents -= 1;
            self.tokens.push(Token::new(
                TokenKind::Dedent,
                Span::new(self.current_pos, self.current_pos),
            ));
            return;
        }

        // Handle indentation at line start
        if self.at_line_start {
            self.handle_indentation();
            return;
        }

        // Skip whitespace (but not newlines)
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' || c == '\x0c' {
                self.advance();
            } else {
                break;
            }
        }

        let start = self.current_pos;

        let Some(c) = self.advance() else {
            return;
        };

        match c {
            // Comments
            '#' => {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            }

            // Newlines
            '\n' => {
                // Implicit line continuation: skip newlines inside brackets
                if !self.brackets.is_empty() {
                    return;
                }
                self.tokens
                    .push(Token::new(TokenKind::Newline, Span::new(start, self.current_pos)));
                self.at_line_start = true;
            }

            // Skip carriage return
            '\r' => {}

            // Explicit line continuation
            '\\' => {
                if self.at_line_break() {
                    self.skip_line_break();
                } else {
                    self.errors.push(CompileError::syntax(
                        "unexpected character after line continuation character".to_string(),
                        Span::new(start, self.current_pos),
                    ));
                }
            }

            // Operators and punctuation
            '+' => self.operator(start, OperatorId::Plus, &[('=', OperatorId::PlusEq)]),
            '-' => {
                if self.match_char('>') {
                    self.add_punct(PunctuationId::Arrow, start);
                } else if self.match_char('=') {
                    self.add_op(OperatorId::MinusEq, start);
                } else {
                    self.add_op(OperatorId::Minus, start);
                }
            }
            '*' => self.operator(
                start,
                OperatorId::Star,
                &[('*', OperatorId::StarStar), ('=', OperatorId::StarEq)],
            ),
            '/' => self.scan_slash(start),
            '%' => self.operator(start, OperatorId::Percent, &[('=', OperatorId::PercentEq)]),
            ',' => self.add_punct(PunctuationId::Comma, start),
            ';' => self.add_punct(PunctuationId::Semicolon, start),
            ':' => self.add_punct(PunctuationId::Colon, start),
            '(' => self.open_bracket(PunctuationId::LParen, '(', start),
            ')' => self.close_bracket(PunctuationId::RParen, ')', start),
            '[' => self.open_bracket(PunctuationId::LBracket, '[', start),
            ']' => self.close_bracket(PunctuationId::RBracket, ']', start),
            '{' => self.open_bracket(PunctuationId::LBrace, '{', start),
            '}' => self.close_bracket(PunctuationId::RBrace, '}', start),
            '=' => self.operator(start, OperatorId::Eq, &[('=', OperatorId::EqEq)]),
            '!' => {
                if self.match_char('=') {
                    self.add_op(OperatorId::NotEq, start);
                } else {
                    self.errors.push(CompileError::syntax(
                        "invalid syntax '!'".to_string(),
                        Span::new(start, self.current_pos),
                    ));
                }
            }
            '<' => self.operator(start, OperatorId::Lt, &[('=', OperatorId::LtEq)]),
            '>' => self.operator(start, OperatorId::Gt, &[('=', OperatorId::GtEq)]),
            '.' => {
                if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.scan_number(start, c);
                } else if self.source[self.current_pos..].starts_with("..") {
                    self.advance();
                    self.advance();
                    self.add_punct(PunctuationId::Ellipsis, start);
                } else {
                    self.add_punct(PunctuationId::Dot, start);
                }
            }

            // Strings
            '"' | '\'' => self.scan_string(start, c, false),

            // Numbers
            '0'..='9' => self.scan_number(start, c),

            // Identifiers, keywords, and prefixed strings (`f"..."`, `r'...'`, `rf"..."`)
            _ if is_ident_start(c) => {
                if !self.scan_prefixed_string(start, c) {
                    self.scan_identifier(start, c);
                }
            }

            _ => {
                self.errors.push(CompileError::new(
                    format!("invalid character '{c}' (U+{:04X})", c as u32),
                    Span::new(start, self.current_pos),
                ));
            }
        }
    }

    // ========================================================================
    // Operator helpers
    // ========================================================================

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn add_token(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token::new(kind, Span::new(start, self.current_pos)));
    }

    fn add_op(&mut self, id: OperatorId, start: usize) {
        self.add_token(TokenKind::Operator(id), start);
    }

    fn add_punct(&mut self, id: PunctuationId, start: usize) {
        self.add_token(TokenKind::Punctuation(id), start);
    }

    /// Try to match compound operator, fallback to simple.
    fn operator(&mut self, start: usize, simple: OperatorId, compounds: &[(char, OperatorId)]) {
        for (c, id) in compounds {
            if self.match_char(*c) {
                self.add_op(*id, start);
                return;
            }
        }
        self.add_op(simple, start);
    }

    /// Scan slash operators: `/`, `/=`, `//`, `//=`.
    fn scan_slash(&mut self, start: usize) {
        if self.match_char('/') {
            if self.match_char('=') {
                self.add_op(OperatorId::SlashSlashEq, start);
            } else {
                self.add_op(OperatorId::SlashSlash, start);
            }
        } else if self.match_char('=') {
            self.add_op(OperatorId::SlashEq, start);
        } else {
            self.add_op(OperatorId::Slash, start);
        }
    }

    fn open_bracket(&mut self, kind: PunctuationId, open: char, start: usize) {
        self.brackets.push((open, start));
        self.add_punct(kind, start);
    }

    /// Emit a closing bracket token, checking it pairs with the innermost open bracket.
    fn close_bracket(&mut self, kind: PunctuationId, close: char, start: usize) {
        match self.brackets.pop() {
            None => {
                self.errors.push(CompileError::syntax(
                    format!("unmatched '{close}'"),
                    Span::new(start, self.current_pos),
                ));
            }
            Some((open, _)) if closing_for(open) != close => {
                self.errors.push(CompileError::syntax(
                    format!("closing parenthesis '{close}' does not match opening parenthesis '{open}'"),
                    Span::new(start, self.current_pos),
                ));
            }
            Some(_) => {}
        }
        self.add_punct(kind, start);
    }

    // ========================================================================
    // Identifier scanning
    // ========================================================================

    /// Scan a string whose prefix starts with `first`; returns `false` if this is a plain identifier.
    fn scan_prefixed_string(&mut self, start: usize, first: char) -> bool {
        let is_quote = |c: Option<char>| matches!(c, Some('"' | '\''));
        let lower = first.to_ascii_lowercase();
        if !matches!(lower, 'f' | 'r') {
            return false;
        }

        let (fstring, raw) = if is_quote(self.peek()) {
            (lower == 'f', lower == 'r')
        } else {
            let second = self.peek().map(|c| c.to_ascii_lowercase());
            let pair = matches!((lower, second), ('f', Some('r')) | ('r', Some('f')));
            if !(pair && is_quote(self.peek_next())) {
                return false;
            }
            self.advance();
            (true, true)
        };

        let Some(quote) = self.advance() else {
            return false;
        };
        if fstring {
            self.scan_fstring(start, quote, raw);
        } else {
            self.scan_string(start, quote, raw);
        }
        true
    }

    fn scan_identifier(&mut self, start: usize, _first: char) {
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                self.advance();
            } else {
                break;
            }
        }

        let spelling = &self.source[start..self.current_pos];

        // Look up identifier spelling in the reserved-word registry (no allocation for keywords).
        if let Some(id) = keyword_id(spelling) {
            self.add_token(TokenKind::Keyword(id), start);
        } else {
            self.add_token(TokenKind::Ident(spelling.to_string()), start);
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Check if a character can start an identifier (ASCII-only).
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Check if a character can continue an identifier (ASCII-only).
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn closing_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// Convenience function to lex a source string.
///
/// This is a shorthand for `Lexer::new(source).tokenize()`.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str) -> Result<Vec<Token>, Vec<CompileError>> {
    Lexer::new(source).tokenize()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use scriptbox_core::lang::keywords::KeywordId;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_punctuation_registry_parity() {
        use scriptbox_core::lang::punctuation;

        for p in punctuation::PUNCTUATION {
            let source = match p.id {
                // Closing delimiters error when unmatched; use a matching pair.
                PunctuationId::LParen | PunctuationId::RParen => "()",
                PunctuationId::LBracket | PunctuationId::RBracket => "[]",
                PunctuationId::LBrace | PunctuationId::RBrace => "{}",
                _ => p.canonical,
            };
            let tokens = lex(source).unwrap_or_else(|errs| panic!("lex({source:?}) failed: {errs:?}"));
            assert!(
                tokens.iter().any(|t| t.kind.is_punctuation(p.id)),
                "lex({source:?}) did not produce {:?}: {tokens:?}",
                p.id
            );
        }
    }

    #[test]
    fn test_keyword_registry_parity() {
        use scriptbox_core::lang::keywords;

        for k in keywords::KEYWORDS {
            let tokens = lex(k.canonical).unwrap_or_else(|errs| panic!("lex({:?}) failed: {:?}", k.canonical, errs));
            assert!(matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)));

            let tokens = &tokens[..tokens.len() - 1];
            assert_eq!(
                tokens.len(),
                1,
                "expected single non-EOF token for keyword {:?}, got {:?}",
                k.id,
                tokens
            );
            assert!(tokens[0].kind.is_keyword(k.id));
        }
    }

    #[test]
    fn test_operator_registry_parity() {
        use scriptbox_core::lang::operators;

        for o in operators::OPERATORS {
            for &sp in o.spellings {
                let tokens = lex(sp).unwrap_or_else(|errs| panic!("lex({:?}) failed: {:?}", sp, errs));
                let tokens = &tokens[..tokens.len() - 1];
                assert_eq!(
                    tokens.len(),
                    1,
                    "expected single non-EOF token for operator spelling {:?}, got {:?}",
                    sp,
                    tokens
                );

                if o.is_keyword_spelling {
                    // Word operators are lexed as keywords.
                    let expected_kw = match o.id {
                        OperatorId::And => KeywordId::And,
                        OperatorId::Or => KeywordId::Or,
                        OperatorId::Not => KeywordId::Not,
                        OperatorId::In => KeywordId::In,
                        OperatorId::Is => KeywordId::Is,
                        _ => panic!("unexpected keyword-spelling operator {:?}", o.id),
                    };
                    assert!(tokens[0].kind.is_keyword(expected_kw));
                } else {
                    assert!(tokens[0].kind.is_operator(o.id));
                }
            }
        }
    }

    #[test]
    fn test_keywords() {
        let tokens = kinds("def lambda global try except finally");
        assert!(tokens[0].is_keyword(KeywordId::Def));
        assert!(tokens[1].is_keyword(KeywordId::Lambda));
        assert!(tokens[2].is_keyword(KeywordId::Global));
        assert!(tokens[3].is_keyword(KeywordId::Try));
        assert!(tokens[4].is_keyword(KeywordId::Except));
        assert!(tokens[5].is_keyword(KeywordId::Finally));
    }

    #[test]
    fn test_operators() {
        let tokens = kinds("+ - * / // % ** -> == != ; ...");
        assert!(tokens[0].is_operator(OperatorId::Plus));
        assert!(tokens[1].is_operator(OperatorId::Minus));
        assert!(tokens[2].is_operator(OperatorId::Star));
        assert!(tokens[3].is_operator(OperatorId::Slash));
        assert!(tokens[4].is_operator(OperatorId::SlashSlash));
        assert!(tokens[5].is_operator(OperatorId::Percent));
        assert!(tokens[6].is_operator(OperatorId::StarStar));
        assert!(tokens[7].is_punctuation(PunctuationId::Arrow));
        assert!(tokens[8].is_operator(OperatorId::EqEq));
        assert!(tokens[9].is_operator(OperatorId::NotEq));
        assert!(tokens[10].is_punctuation(PunctuationId::Semicolon));
        assert!(tokens[11].is_punctuation(PunctuationId::Ellipsis));
    }

    #[test]
    #[allow(clippy::approx_constant)]
    fn test_numbers() {
        let tokens = kinds("42 3.14 1_000_000 1e10 0x1F 0b101 .5 2.");
        assert!(matches!(tokens[0], TokenKind::Int(42)));
        assert!(matches!(tokens[1], TokenKind::Float(f) if (f - 3.14).abs() < 0.001));
        assert!(matches!(tokens[2], TokenKind::Int(1000000)));
        assert!(matches!(tokens[3], TokenKind::Float(f) if f == 1e10));
        assert!(matches!(tokens[4], TokenKind::Int(31)));
        assert!(matches!(tokens[5], TokenKind::Int(5)));
        assert!(matches!(tokens[6], TokenKind::Float(f) if f == 0.5));
        assert!(matches!(tokens[7], TokenKind::Float(f) if f == 2.0));
    }

    #[test]
    fn test_int_method_is_not_float() {
        let tokens = kinds("1.real");
        assert!(matches!(tokens[0], TokenKind::Int(1)));
        assert!(tokens[1].is_punctuation(PunctuationId::Dot));
    }

    #[test]
    fn test_integer_overflow() {
        let errors = lex("99999999999999999999").unwrap_err();
        assert!(errors[0].message.contains("integer literal too large"));
    }

    #[test]
    fn test_strings() {
        let tokens = kinds(r#""hello" 'world' "a\nb" r"a\nb" '''x'y'''"#);
        assert!(matches!(&tokens[0], TokenKind::String(s) if s == "hello"));
        assert!(matches!(&tokens[1], TokenKind::String(s) if s == "world"));
        assert!(matches!(&tokens[2], TokenKind::String(s) if s == "a\nb"));
        assert!(matches!(&tokens[3], TokenKind::String(s) if s == "a\\nb"));
        assert!(matches!(&tokens[4], TokenKind::String(s) if s == "x'y"));
    }

    #[test]
    fn test_indentation() {
        let source = "def foo():\n  x = 1\n  y = 2\nx = 3";
        let tokens = kinds(source);

        let indent_count = tokens.iter().filter(|t| matches!(t, TokenKind::Indent)).count();
        let dedent_count = tokens.iter().filter(|t| matches!(t, TokenKind::Dedent)).count();

        assert_eq!(indent_count, 1, "Should have 1 INDENT token");
        assert_eq!(dedent_count, 1, "Should have 1 DEDENT token");
    }

    #[test]
    fn test_bad_dedent_is_indentation_error() {
        let errors = lex("if x:\n    a = 1\n  b = 2\n").unwrap_err();
        assert!(errors[0].is_indentation());
        assert!(errors[0].message.contains("unindent does not match"));
    }

    #[test]
    fn test_fstring() {
        let tokens = kinds(r#"f"Hello {name}!""#);
        match &tokens[0] {
            TokenKind::FString(parts) => {
                assert_eq!(parts.len(), 3);
                assert!(matches!(&parts[0], FStringPart::Literal(s) if s == "Hello "));
                assert!(matches!(&parts[1], FStringPart::Expr { source, offset: 9, .. } if source == "name"));
                assert!(matches!(&parts[2], FStringPart::Literal(s) if s == "!"));
            }
            _ => panic!("Expected FString token"),
        }
    }

    #[test]
    fn test_fstring_conversion_and_spec() {
        let tokens = kinds(r#"f"{x!r:>8} {a != b} {{lit}} {d['k']}""#);
        let TokenKind::FString(parts) = &tokens[0] else {
            panic!("Expected FString token");
        };
        assert_eq!(
            parts[0],
            FStringPart::Expr {
                source: "x".to_string(),
                offset: 3,
                conversion: Some('r'),
                spec: Some(">8".to_string()),
            }
        );
        assert!(matches!(&parts[2], FStringPart::Expr { source, conversion: None, .. } if source == "a != b"));
        assert!(matches!(&parts[3], FStringPart::Literal(s) if s == " {lit} "));
        assert!(matches!(&parts[4], FStringPart::Expr { source, .. } if source == "d['k']"));
    }

    #[test]
    fn test_unterminated_fstring_field() {
        let errors = lex(r#"f"{x""#).unwrap_err();
        assert!(errors[0].message.contains("expecting '}'"));
    }

    #[test]
    fn test_unicode_identifier_rejected() {
        // Unicode characters should not be valid identifiers (ASCII-only)
        let errors = lex("π = 1").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("invalid character"));
    }

    #[test]
    fn test_unmatched_closing_bracket() {
        for (source, msg) in [(")", "unmatched ')'"), ("]", "unmatched ']'"), ("}", "unmatched '}'")] {
            let errors = lex(source).unwrap_err();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].message, msg);
        }
    }

    #[test]
    fn test_mismatched_bracket() {
        let errors = lex("(]").unwrap_err();
        assert!(errors[0].message.contains("does not match"));
    }

    #[test]
    fn test_unclosed_bracket_points_at_opener() {
        let errors = lex("x = 1\nprint(1,\n").unwrap_err();
        assert_eq!(errors[0].message, "'(' was never closed");
        assert_eq!(errors[0].span, Span::new(11, 12));
    }

    #[test]
    fn test_multiple_dedents() {
        let source = "def foo():\n  if True:\n    x = 1\ny = 2";
        let tokens = kinds(source);

        let indent_count = tokens.iter().filter(|t| matches!(t, TokenKind::Indent)).count();
        let dedent_count = tokens.iter().filter(|t| matches!(t, TokenKind::Dedent)).count();

        assert_eq!(indent_count, 2, "Should have 2 INDENT tokens");
        assert_eq!(dedent_count, 2, "Should have 2 DEDENT tokens");
    }

    #[test]
    fn test_newlines_inside_brackets() {
        // Newlines inside brackets should NOT emit Newline tokens (implicit continuation)
        let tokens = kinds("foo(\n  x,\n  y\n)");
        let newline_count = tokens.iter().filter(|t| matches!(t, TokenKind::Newline)).count();
        assert_eq!(newline_count, 0, "No Newline tokens inside brackets");
    }

    #[test]
    fn test_backslash_continuation() {
        let tokens = kinds("x = 1 + \\\n    2\n");
        let newline_count = tokens.iter().filter(|t| matches!(t, TokenKind::Newline)).count();
        assert_eq!(newline_count, 1);
        assert!(!tokens.iter().any(|t| matches!(t, TokenKind::Indent)));
    }

    #[test]
    fn test_comments_and_blank_lines_are_skipped() {
        let tokens = kinds("# header\n\nx = 1  # trailing\n\n   # indented comment\ny = 2\n");
        let idents = tokens.iter().filter(|t| matches!(t, TokenKind::Ident(_))).count();
        assert_eq!(idents, 2);
        assert!(!tokens.iter().any(|t| matches!(t, TokenKind::Indent)));
    }
}
