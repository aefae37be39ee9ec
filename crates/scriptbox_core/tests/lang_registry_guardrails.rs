use std::collections::HashMap;
use std::path::{Path, PathBuf};

use scriptbox_core::errors::ErrorKind;
use scriptbox_core::lang::builtins;
use scriptbox_core::lang::errors;
use scriptbox_core::lang::keywords;
use scriptbox_core::lang::operators;
use scriptbox_core::lang::punctuation;

#[test]
fn keywords_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, keywords::KeywordId> = HashMap::new();

    for info in keywords::KEYWORDS {
        assert_eq!(
            keywords::from_str(info.canonical),
            Some(info.id),
            "keyword canonical spelling not resolvable: {}",
            info.canonical
        );
        assert_eq!(
            keywords::as_str(info.id),
            info.canonical,
            "keyword as_str mismatch for {:?}",
            info.id
        );

        if let Some(prev) = seen.insert(info.canonical, info.id) {
            panic!(
                "duplicate keyword spelling {:?}: {:?} and {:?}",
                info.canonical, prev, info.id
            );
        }
        assert!(
            keywords::is_identifier(info.canonical),
            "keyword is not identifier-shaped: {}",
            info.canonical
        );
    }
}

#[test]
fn builtins_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, builtins::BuiltinFnId> = HashMap::new();

    for info in builtins::BUILTIN_FUNCTIONS {
        assert_eq!(
            builtins::from_str(info.canonical),
            Some(info.id),
            "builtin canonical spelling not resolvable: {}",
            info.canonical
        );
        assert_eq!(
            builtins::as_str(info.id),
            info.canonical,
            "builtin as_str mismatch for {:?}",
            info.id
        );
        assert!(
            !keywords::is_reserved(info.canonical),
            "builtin shadows a keyword: {}",
            info.canonical
        );

        if let Some(prev) = seen.insert(info.canonical, info.id) {
            panic!(
                "duplicate builtin spelling {:?}: {:?} and {:?}",
                info.canonical, prev, info.id
            );
        }
    }
}

#[test]
fn exceptions_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, ErrorKind> = HashMap::new();

    for info in errors::EXCEPTIONS {
        if info.user_visible {
            assert_eq!(
                errors::from_str(info.canonical),
                Some(info.id),
                "exception canonical spelling not resolvable: {}",
                info.canonical
            );
        }
        assert_eq!(
            errors::as_str(info.id),
            info.canonical,
            "exception as_str mismatch for {:?}",
            info.id
        );
        assert!(
            builtins::from_str(info.canonical).is_none(),
            "exception collides with a builtin function: {}",
            info.canonical
        );

        if let Some(prev) = seen.insert(info.canonical, info.id) {
            panic!(
                "duplicate exception spelling {:?}: {:?} and {:?}",
                info.canonical, prev, info.id
            );
        }
    }
}

#[test]
fn operators_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, operators::OperatorId> = HashMap::new();

    for info in operators::OPERATORS {
        for &sp in info.spellings {
            assert_eq!(
                operators::from_str(sp),
                Some(info.id),
                "operator spelling not resolvable: {}",
                sp
            );
            if let Some(prev) = seen.insert(sp, info.id) {
                panic!("duplicate operator spelling {:?}: {:?} and {:?}", sp, prev, info.id);
            }
            assert_eq!(
                info.is_keyword_spelling,
                keywords::is_reserved(sp),
                "operator keyword flag out of sync for {:?}",
                sp
            );
        }
    }
}

#[test]
fn punctuation_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, punctuation::PunctuationId> = HashMap::new();

    for info in punctuation::PUNCTUATION {
        assert_eq!(
            punctuation::from_str(info.canonical),
            Some(info.id),
            "punctuation canonical spelling not resolvable: {}",
            info.canonical
        );
        assert_eq!(
            punctuation::as_str(info.id),
            info.canonical,
            "punctuation as_str mismatch for {:?}",
            info.id
        );
        assert!(
            operators::from_str(info.canonical).is_none(),
            "punctuation collides with an operator: {}",
            info.canonical
        );

        if let Some(prev) = seen.insert(info.canonical, info.id) {
            panic!(
                "duplicate punctuation spelling {:?}: {:?} and {:?}",
                info.canonical, prev, info.id
            );
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Drift guardrails for closed-set vocabulary (string literals).
// -------------------------------------------------------------------------------------------------

fn repo_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("repo root missing")
        .to_path_buf()
}

fn collect_rs_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

fn find_string_literals(paths: &[PathBuf], literals: &[&str]) -> Vec<String> {
    fn is_comment_line(line: &str) -> bool {
        line.trim_start().starts_with("//")
    }

    let mut hits: Vec<String> = Vec::new();
    for path in paths {
        let Ok(content) = std::fs::read_to_string(path) else {
            continue;
        };
        // Unit tests may spell exception names when asserting on rendered output.
        let body = content.split("#[cfg(test)]").next().unwrap_or("");
        for (idx, line) in body.lines().enumerate() {
            if is_comment_line(line) {
                continue;
            }
            for &literal in literals {
                let needle = format!("\"{literal}\"");
                if line.contains(&needle) {
                    hits.push(format!("{}:{}: {}", path.display(), idx + 1, line.trim()));
                }
            }
        }
    }
    hits
}

#[test]
fn no_exception_name_string_literals_in_runtime_layers() {
    let root = repo_root();
    let mut files = Vec::new();
    for dir in [root.join("src/runtime"), root.join("src/engine")] {
        files.extend(collect_rs_files(&dir));
    }

    let names: Vec<&str> = errors::EXCEPTIONS.iter().map(|e| e.canonical).collect();
    let hits = find_string_literals(&files, &names);
    assert!(
        hits.is_empty(),
        "exception spellings must come from scriptbox_core::lang::errors; found:\n{}",
        hits.join("\n")
    );
}
