//! Define the reserved keyword vocabulary for the scriptbox language.
//!
//! This module is the single source of truth for reserved words: a stable identifier
//! ([`KeywordId`]) plus a const metadata table ([`KEYWORDS`]) that records canonical spellings,
//! and categories.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - This registry is intentionally **pure** (no AST/IO/side effects).
//! - Some reserved words are also “word operators” (e.g. `and`). If you need operator precedence/fixity, use
//!   [`crate::lang::operators`].
//! - Reserved words can never be used as binding names, which is why the namespace builder consults this table.
//!
//! ## Examples
//! ```rust
//! use scriptbox_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("if"), Some(KeywordId::If));
//! assert_eq!(keywords::as_str(KeywordId::If), "if");
//! ```

use super::registry::{Example, Since, Stability};

/// Stable identifier for every reserved keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordId {
    // Control flow / statements
    If,
    Elif,
    Else,
    While,
    For,
    Break,
    Continue,
    Return,
    Pass,

    // Definitions / scoping
    Def,
    Lambda,
    Global,
    Del,

    // Error handling
    Assert,
    Raise,
    Try,
    Except,
    Finally,

    // Imports
    Import,
    From,
    As,

    // Literals
    True,
    False,
    None,

    // Word operators
    And,
    Or,
    Not,
    In,
    Is,
}

/// High-level grouping for documentation and tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    ControlFlow,
    Definition,
    ErrorHandling,
    Import,
    Literal,
    Operator,
}

/// Metadata for a keyword.
#[derive(Debug, Clone, Copy)]
pub struct KeywordInfo {
    pub id: KeywordId,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub category: KeywordCategory,
    pub since: Since,
    pub stability: Stability,
    pub examples: &'static [Example],
}

/// Registry of all keywords.
///
/// ## Notes
/// - The ordering is not semantically meaningful, but is grouped for readability.
pub const KEYWORDS: &[KeywordInfo] = &[
    // Control flow / statements
    info(KeywordId::If, "if", KeywordCategory::ControlFlow),
    info(KeywordId::Elif, "elif", KeywordCategory::ControlFlow),
    info(KeywordId::Else, "else", KeywordCategory::ControlFlow),
    info(KeywordId::While, "while", KeywordCategory::ControlFlow),
    info(KeywordId::For, "for", KeywordCategory::ControlFlow),
    info(KeywordId::Break, "break", KeywordCategory::ControlFlow),
    info(KeywordId::Continue, "continue", KeywordCategory::ControlFlow),
    info(KeywordId::Return, "return", KeywordCategory::ControlFlow),
    info(KeywordId::Pass, "pass", KeywordCategory::ControlFlow),
    // Definitions / scoping
    info(KeywordId::Def, "def", KeywordCategory::Definition),
    info(KeywordId::Lambda, "lambda", KeywordCategory::Definition),
    info(KeywordId::Global, "global", KeywordCategory::Definition),
    info(KeywordId::Del, "del", KeywordCategory::Definition),
    // Error handling
    info(KeywordId::Assert, "assert", KeywordCategory::ErrorHandling),
    info(KeywordId::Raise, "raise", KeywordCategory::ErrorHandling),
    info(KeywordId::Try, "try", KeywordCategory::ErrorHandling),
    info(KeywordId::Except, "except", KeywordCategory::ErrorHandling),
    info(KeywordId::Finally, "finally", KeywordCategory::ErrorHandling),
    // Imports
    info(KeywordId::Import, "import", KeywordCategory::Import),
    info(KeywordId::From, "from", KeywordCategory::Import),
    info(KeywordId::As, "as", KeywordCategory::Import),
    // Literals
    info(KeywordId::True, "True", KeywordCategory::Literal),
    info(KeywordId::False, "False", KeywordCategory::Literal),
    info(KeywordId::None, "None", KeywordCategory::Literal),
    // Word operators
    info(KeywordId::And, "and", KeywordCategory::Operator),
    info(KeywordId::Or, "or", KeywordCategory::Operator),
    info(KeywordId::Not, "not", KeywordCategory::Operator),
    info(KeywordId::In, "in", KeywordCategory::Operator),
    info(KeywordId::Is, "is", KeywordCategory::Operator),
];

/// Canonical spelling.
///
/// ## Parameters
/// - `id`: Keyword identifier.
///
/// ## Returns
/// - The canonical spelling (e.g. `"def"`).
pub fn as_str(id: KeywordId) -> &'static str {
    info_for(id).canonical
}

/// Category.
pub fn category(id: KeywordId) -> KeywordCategory {
    info_for(id).category
}

/// Full metadata.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: KeywordId) -> &'static KeywordInfo {
    KEYWORDS.iter().find(|k| k.id == id).expect("keyword info missing")
}

/// Lookup by spelling (canonical or alias).
///
/// ## Returns
/// - `Some(KeywordId)` if the spelling matches this registry.
/// - `None` otherwise.
pub fn from_str(s: &str) -> Option<KeywordId> {
    if let Some(k) = KEYWORDS.iter().find(|k| k.canonical == s) {
        return Some(k.id);
    }
    KEYWORDS
        .iter()
        .find(|k| {
            let aliases: &[&str] = k.aliases;
            aliases.contains(&s)
        })
        .map(|k| k.id)
}

/// Return `true` if `s` is a reserved word and therefore cannot name a binding.
pub fn is_reserved(s: &str) -> bool {
    from_str(s).is_some()
}

/// Return `true` if `s` has identifier shape: ASCII letter or `_` first, ASCII alphanumerics or `_` after.
///
/// This is the same rule the lexer applies to names; it does not check [`is_reserved`].
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        _ => false,
    }
}

// --- helpers -----------------------------------------------------------------

const fn info(
    id: KeywordId,
    canonical: &'static str,
    category: KeywordCategory,
) -> KeywordInfo {
    KeywordInfo {
        id,
        canonical,
        aliases: &[],
        category,
        since: Since(0, 1),
        stability: Stability::Stable,
        examples: &[],
    }
}
