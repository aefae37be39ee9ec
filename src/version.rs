//! scriptbox version information.
//!
//! This module exposes the engine version as a single constant so the banner, diagnostics and callers agree on
//! the same value.
//!
//! ## Notes
//!
//! - The value is taken from Cargo metadata (`CARGO_PKG_VERSION`) at compile time.

/// The scriptbox version string (for example, `0.1.0`).
pub const SCRIPTBOX_VERSION: &str = env!("CARGO_PKG_VERSION");

/// One-line description of the execution engine, in the style of an interpreter start-up banner.
///
/// ## Examples
/// ```rust
/// assert!(scriptbox::version::banner().starts_with("scriptbox "));
/// ```
pub fn banner() -> String {
    format!("scriptbox {SCRIPTBOX_VERSION} (tree-walking interpreter, Python-compatible subset)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_carries_version() {
        assert!(banner().contains(SCRIPTBOX_VERSION));
    }
}
