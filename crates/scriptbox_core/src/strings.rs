//! Define shared string semantics (policy + pure helpers).
//!
//! ## Notes
//! - **Indexing model**: Unicode scalar indexing (Rust `char`), not bytes or grapheme clusters.
//! - Positions returned by search helpers ([`str_find`]) are scalar offsets, matching indexing.
//! - Whitespace follows Rust's `char::is_whitespace`, which agrees with Python for ASCII.

use crate::indexing::{self, AccessError};

/// Return the string length in Unicode scalars (Rust `char`).
pub fn str_len(s: &str) -> usize {
    s.chars().count()
}

/// Index a string by Unicode scalar index.
///
/// ## Parameters
/// - `s`: String to index.
/// - `idx`: Index (supports negative indices; Python-style).
///
/// ## Returns
/// - `Ok(String)`: Single-character string (one Unicode scalar).
/// - `Err(AccessError)`: If the index is out of range.
pub fn str_char_at(s: &str, idx: i64) -> Result<String, AccessError> {
    let pos = indexing::normalize_index(str_len(s), idx)?;
    s.chars()
        .nth(pos)
        .map(|ch| ch.to_string())
        .ok_or(AccessError::IndexOutOfRange)
}

/// Slice a string over Unicode scalars (Python-like semantics).
///
/// ## Returns
/// - `Ok(String)`: Sliced string.
/// - `Err(AccessError)`: If `step == 0`.
pub fn str_slice(s: &str, start: Option<i64>, end: Option<i64>, step: Option<i64>) -> Result<String, AccessError> {
    let chars: Vec<char> = s.chars().collect();
    let picks = indexing::slice_indices(chars.len(), start, end, step)?;
    Ok(picks.into_iter().filter_map(|i| chars.get(i)).collect())
}

/// Split a string (Python `str.split`).
///
/// ## Parameters
/// - `sep`: `None` splits on runs of whitespace and drops empty parts; `Some(sep)` splits on the exact
///   separator and keeps empty parts.
/// - `maxsplit`: Maximum number of splits (`None` or negative for unlimited).
///
/// ## Returns
/// - `None` for an empty separator (Python raises `ValueError: empty separator`).
pub fn str_split(s: &str, sep: Option<&str>, maxsplit: Option<i64>) -> Option<Vec<String>> {
    let limit = maxsplit.filter(|m| *m >= 0).map(|m| m as usize);
    match sep {
        Some("") => None,
        Some(sep) => Some(match limit {
            Some(n) => s.splitn(n + 1, sep).map(str::to_string).collect(),
            None => s.split(sep).map(str::to_string).collect(),
        }),
        None => {
            let mut out = Vec::new();
            let mut rest = s.trim_start();
            while !rest.is_empty() {
                if limit.is_some_and(|n| out.len() == n) {
                    out.push(rest.to_string());
                    break;
                }
                match rest.find(char::is_whitespace) {
                    Some(end) => {
                        out.push(rest[..end].to_string());
                        rest = rest[end..].trim_start();
                    }
                    None => {
                        out.push(rest.to_string());
                        break;
                    }
                }
            }
            Some(out)
        }
    }
}

/// Strip characters from both ends (Python `str.strip`).
///
/// `chars = None` strips whitespace; otherwise every character in `chars` is stripped.
pub fn str_strip(s: &str, chars: Option<&str>) -> String {
    match chars {
        None => s.trim().to_string(),
        Some(set) => s.trim_matches(|c| set.contains(c)).to_string(),
    }
}

/// Strip characters from the start (Python `str.lstrip`).
pub fn str_lstrip(s: &str, chars: Option<&str>) -> String {
    match chars {
        None => s.trim_start().to_string(),
        Some(set) => s.trim_start_matches(|c| set.contains(c)).to_string(),
    }
}

/// Strip characters from the end (Python `str.rstrip`).
pub fn str_rstrip(s: &str, chars: Option<&str>) -> String {
    match chars {
        None => s.trim_end().to_string(),
        Some(set) => s.trim_end_matches(|c| set.contains(c)).to_string(),
    }
}

/// Find the first occurrence of `needle` (Python `str.find`).
///
/// ## Returns
/// - The scalar offset of the first match, or `-1` if absent.
pub fn str_find(s: &str, needle: &str) -> i64 {
    match s.find(needle) {
        Some(byte) => s[..byte].chars().count() as i64,
        None => -1,
    }
}

/// Count non-overlapping occurrences of `needle` (Python `str.count`).
///
/// An empty needle matches between every scalar, giving `len + 1`.
pub fn str_count(s: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return str_len(s) + 1;
    }
    s.matches(needle).count()
}

/// Return `true` if the string is non-empty and all scalars are decimal digits.
pub fn str_isdigit(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Return `true` if the string is non-empty and all scalars are alphabetic.
pub fn str_isalpha(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_alphabetic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_split_drops_empty_parts() {
        assert_eq!(
            str_split("  a  b\tc \n", None, None),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
        assert_eq!(str_split("   ", None, None), Some(vec![]));
    }

    #[test]
    fn separator_split_keeps_empty_parts() {
        assert_eq!(
            str_split("a,,b", Some(","), None),
            Some(vec!["a".to_string(), String::new(), "b".to_string()])
        );
        assert_eq!(
            str_split("a,b,c", Some(","), Some(1)),
            Some(vec!["a".to_string(), "b,c".to_string()])
        );
        assert_eq!(str_split("abc", Some(""), None), None);
    }

    #[test]
    fn whitespace_split_honours_maxsplit() {
        assert_eq!(
            str_split("a b  c", None, Some(1)),
            Some(vec!["a".to_string(), "b  c".to_string()])
        );
    }

    #[test]
    fn find_reports_scalar_offsets() {
        assert_eq!(str_find("héllo", "l"), 2);
        assert_eq!(str_find("abc", "z"), -1);
    }

    #[test]
    fn char_at_and_slice_use_scalars() {
        assert_eq!(str_char_at("héllo", 1), Ok("é".to_string()));
        assert_eq!(str_char_at("abc", -4), Err(AccessError::IndexOutOfRange));
        assert_eq!(str_slice("abcdef", Some(1), Some(-1), Some(2)), Ok("bd".to_string()));
    }

    #[test]
    fn strip_with_character_set() {
        assert_eq!(str_strip("xxhixx", Some("x")), "hi");
        assert_eq!(str_lstrip("  hi ", None), "hi ");
        assert_eq!(str_rstrip("  hi ", None), "  hi");
    }
}
