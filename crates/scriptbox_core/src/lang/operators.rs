//! Operator vocabulary.
//!
//! This module defines the canonical operator set (symbol operators like `+` and word operators
//! like `and`) along with basic metadata such as precedence, associativity, and fixity.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - Some operators are spelled using reserved words (e.g. `"and"`). Those entries have
//!   [`OperatorInfo::is_keyword_spelling`] set to `true`; the lexer emits them as keywords.
//!
//! ## Examples
//! ```rust
//! use scriptbox_core::lang::operators::{self, OperatorId};
//!
//! assert_eq!(operators::from_str("+"), Some(OperatorId::Plus));
//! assert_eq!(operators::info_for(OperatorId::Plus).precedence, 50);
//! ```

use super::registry::{Since, Stability};

/// Define how operators associate when chained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
    /// Comparisons chain (`a < b < c`) rather than associate.
    Chain,
    None,
}

/// Define whether an operator is infix (binary) or prefix (unary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    Infix,
    Prefix,
}

/// Stable identifier for every operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorId {
    // Arithmetic
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    SlashSlash,
    Percent,

    // Comparison
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Assignment
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    SlashSlashEq,
    PercentEq,

    // Word operators
    And,
    Or,
    Not,
    In,
    Is,
}

/// Metadata for an operator.
///
/// ## Notes
/// - `precedence` is a relative ordering where higher binds tighter. The absolute scale is an implementation detail,
///   but must be consistent with the parser's precedence ladder.
#[derive(Debug, Clone, Copy)]
pub struct OperatorInfo {
    pub id: OperatorId,
    pub spellings: &'static [&'static str],
    pub precedence: u8,
    pub associativity: Associativity,
    pub fixity: Fixity,
    pub is_keyword_spelling: bool,
    pub since: Since,
    pub stability: Stability,
}

/// Registry of all operators.
pub const OPERATORS: &[OperatorInfo] = &[
    // Arithmetic
    op(OperatorId::Plus, &["+"], 50, Associativity::Left, Fixity::Infix, false),
    op(OperatorId::Minus, &["-"], 50, Associativity::Left, Fixity::Infix, false),
    op(OperatorId::Star, &["*"], 60, Associativity::Left, Fixity::Infix, false),
    op(OperatorId::StarStar, &["**"], 70, Associativity::Right, Fixity::Infix, false),
    op(OperatorId::Slash, &["/"], 60, Associativity::Left, Fixity::Infix, false),
    op(OperatorId::SlashSlash, &["//"], 60, Associativity::Left, Fixity::Infix, false),
    op(OperatorId::Percent, &["%"], 60, Associativity::Left, Fixity::Infix, false),
    // Comparison
    op(OperatorId::EqEq, &["=="], 35, Associativity::Chain, Fixity::Infix, false),
    op(OperatorId::NotEq, &["!="], 35, Associativity::Chain, Fixity::Infix, false),
    op(OperatorId::Lt, &["<"], 35, Associativity::Chain, Fixity::Infix, false),
    op(OperatorId::LtEq, &["<="], 35, Associativity::Chain, Fixity::Infix, false),
    op(OperatorId::Gt, &[">"], 35, Associativity::Chain, Fixity::Infix, false),
    op(OperatorId::GtEq, &[">="], 35, Associativity::Chain, Fixity::Infix, false),
    // Assignment
    op(OperatorId::Eq, &["="], 1, Associativity::Right, Fixity::Infix, false),
    op(OperatorId::PlusEq, &["+="], 1, Associativity::Right, Fixity::Infix, false),
    op(OperatorId::MinusEq, &["-="], 1, Associativity::Right, Fixity::Infix, false),
    op(OperatorId::StarEq, &["*="], 1, Associativity::Right, Fixity::Infix, false),
    op(OperatorId::SlashEq, &["/="], 1, Associativity::Right, Fixity::Infix, false),
    op(OperatorId::SlashSlashEq, &["//="], 1, Associativity::Right, Fixity::Infix, false),
    op(OperatorId::PercentEq, &["%="], 1, Associativity::Right, Fixity::Infix, false),
    // Word operators
    op(OperatorId::And, &["and"], 20, Associativity::Left, Fixity::Infix, true),
    op(OperatorId::Or, &["or"], 10, Associativity::Left, Fixity::Infix, true),
    op(OperatorId::Not, &["not"], 30, Associativity::Right, Fixity::Prefix, true),
    op(OperatorId::In, &["in"], 35, Associativity::Chain, Fixity::Infix, true),
    op(OperatorId::Is, &["is"], 35, Associativity::Chain, Fixity::Infix, true),
];

/// Return the full metadata entry for an operator.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: OperatorId) -> &'static OperatorInfo {
    OPERATORS.iter().find(|o| o.id == id).expect("operator info missing")
}

/// Return the canonical (first) spelling for an operator.
pub fn as_str(id: OperatorId) -> &'static str {
    info_for(id).spellings[0]
}

/// Resolve an operator spelling to its identifier.
///
/// ## Returns
/// - `Some(OperatorId)` if the spelling exists in [`OPERATORS`].
/// - `None` otherwise.
pub fn from_str(spelling: &str) -> Option<OperatorId> {
    OPERATORS
        .iter()
        .find(|o| {
            let spellings: &[&str] = o.spellings;
            spellings.contains(&spelling)
        })
        .map(|o| o.id)
}

// --- helpers -----------------------------------------------------------------

const fn op(
    id: OperatorId,
    spellings: &'static [&'static str],
    precedence: u8,
    associativity: Associativity,
    fixity: Fixity,
    is_keyword_spelling: bool,
) -> OperatorInfo {
    OperatorInfo {
        id,
        spellings,
        precedence,
        associativity,
        fixity,
        is_keyword_spelling,
        since: Since(0, 1),
        stability: Stability::Stable,
    }
}
