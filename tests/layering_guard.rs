//! Layering guardrails for the workspace.
//!
//! `scriptbox_core` is pure vocabulary and must stay dependency-free; `scriptbox_syntax` may depend on
//! `scriptbox_core` but never on the root crate. These tests scan the member manifests' `[dependencies]` tables.

fn dependency_names(manifest: &str) -> Vec<String> {
    let mut in_dependencies = false;
    let mut names = Vec::new();

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }
        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }
        // Strip inline comments for robustness.
        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        if let Some((name, _)) = line_no_comment.split_once('=') {
            names.push(name.trim().to_string());
        }
    }
    names
}

#[test]
fn core_has_no_dependencies() {
    let deps = dependency_names(include_str!("../crates/scriptbox_core/Cargo.toml"));
    assert!(deps.is_empty(), "scriptbox_core must stay dependency-free, found {deps:?}");
}

#[test]
fn syntax_does_not_depend_on_root_crate() {
    let deps = dependency_names(include_str!("../crates/scriptbox_syntax/Cargo.toml"));
    assert!(deps.iter().any(|d| d == "scriptbox_core"));
    assert!(
        !deps.iter().any(|d| d == "scriptbox"),
        "`scriptbox_syntax` must not depend on the root crate"
    );
}

#[test]
fn root_crate_depends_on_both_members() {
    let deps = dependency_names(include_str!("../Cargo.toml"));
    for member in ["scriptbox_core", "scriptbox_syntax"] {
        assert!(deps.iter().any(|d| d == member), "missing {member} in [dependencies]");
    }
}
