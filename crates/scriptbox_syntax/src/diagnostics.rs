//! Diagnostics and error reporting for scriptbox syntax.
//!
//! Errors carry byte spans; callers that report to users convert them with [`line_col`].

use std::fmt;

use crate::ast::Span;

/// A syntax error with location information
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct CompileError {
    pub message: String,
    pub span: Span,
    pub kind: ErrorKind,
    pub notes: Vec<String>,
    pub hints: Vec<String>,
}

impl CompileError {
    pub fn new(message: String, span: Span) -> Self {
        Self {
            message,
            span,
            kind: ErrorKind::Error,
            notes: Vec::new(),
            hints: Vec::new(),
        }
    }

    pub fn syntax(message: String, span: Span) -> Self {
        Self {
            kind: ErrorKind::Syntax,
            ..Self::new(message, span)
        }
    }

    pub fn indentation(message: String, span: Span) -> Self {
        Self {
            kind: ErrorKind::Indentation,
            ..Self::new(message, span)
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// Return `true` for layout errors (reported as `IndentationError`).
    pub fn is_indentation(&self) -> bool {
        self.kind == ErrorKind::Indentation
    }
}

impl miette::Diagnostic for CompileError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.kind {
            ErrorKind::Error => "scriptbox::lex",
            ErrorKind::Syntax => "scriptbox::syntax",
            ErrorKind::Indentation => "scriptbox::indentation",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        if self.hints.is_empty() {
            None
        } else {
            Some(Box::new(self.hints.join("\n")))
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        let len = self.span.end.saturating_sub(self.span.start);
        Some(Box::new(std::iter::once(miette::LabeledSpan::new(
            Some(self.message.clone()),
            self.span.start,
            len,
        ))))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Lexical errors (bad characters, unterminated literals).
    Error,
    Syntax,
    Indentation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Error => write!(f, "error"),
            ErrorKind::Syntax => write!(f, "syntax error"),
            ErrorKind::Indentation => write!(f, "indentation error"),
        }
    }
}

/// Convert a byte offset into a 1-based `(line, column)` pair.
///
/// Columns count Unicode scalars, so a caret under a non-ASCII line still lines up.
///
/// ## Examples
/// ```rust
/// use scriptbox_syntax::diagnostics::line_col;
///
/// assert_eq!(line_col("a = 1\nb = (", 10), (2, 5));
/// ```
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let col = source[line_start..offset].chars().count() + 1;
    (line, col)
}

/// Render an error with a source excerpt and caret, in the compiler-diagnostic layout.
pub fn render(file_name: &str, source: &str, error: &CompileError) -> String {
    let (line_num, col_num) = line_col(source, error.span.start);
    let line_text = source.lines().nth(line_num - 1).unwrap_or("");
    let width = line_num.to_string().len();

    let mut out = format!("{}: {}\n", error.kind, error.message);
    out.push_str(&format!("{:>width$}--> {file_name}:{line_num}:{col_num}\n", ""));
    out.push_str(&format!("{:>width$} |\n", ""));
    out.push_str(&format!("{line_num:>width$} | {line_text}\n"));
    out.push_str(&format!("{:>width$} | {}^\n", "", " ".repeat(col_num - 1)));
    for note in &error.notes {
        out.push_str(&format!("{:>width$} = note: {note}\n", ""));
    }
    for hint in &error.hints {
        out.push_str(&format!("{:>width$} = hint: {hint}\n", ""));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_counts_from_one() {
        assert_eq!(line_col("abc", 0), (1, 1));
        assert_eq!(line_col("abc\ndef", 4), (2, 1));
        assert_eq!(line_col("abc", 99), (1, 4));
    }

    #[test]
    fn line_col_counts_scalars() {
        assert_eq!(line_col("é = x", 3), (1, 3));
    }

    #[test]
    fn render_points_at_the_column() {
        let err = CompileError::syntax("'(' was never closed".to_string(), Span::new(6, 7))
            .with_hint("add the missing ')'");
        insta::assert_snapshot!(render("<exec>", "x = 1\nprint(", &err), @r"
        syntax error: '(' was never closed
         --> <exec>:2:1
          |
        2 | print(
          | ^
          = hint: add the missing ')'
        ");
    }
}
