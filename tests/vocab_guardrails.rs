use std::fs;
use std::path::{Path, PathBuf};

use scriptbox_core::lang::errors;

/// Guardrail against stringly-typed exception names in the interpreter.
///
/// The runtime and engine must go through `ErrorKind` and `scriptbox_core::lang::errors` instead of spelling
/// exception names as string literals. Lines after a `#[cfg(test)]` marker are ignored, so unit tests may
/// compare against spellings directly.
#[test]
fn no_exception_name_literals_in_runtime_or_engine() {
    let root = repo_root();
    let spellings: Vec<String> = errors::EXCEPTIONS
        .iter()
        .map(|info| format!("\"{}\"", info.canonical))
        .collect();
    let mut offenders: Vec<(PathBuf, usize, String)> = Vec::new();

    for dir in [root.join("src/runtime"), root.join("src/engine")] {
        scan_dir(&dir, &spellings, &mut offenders);
    }

    if !offenders.is_empty() {
        let mut msg = String::new();
        msg.push_str("Found exception names spelled as string literals. Use ErrorKind and the errors registry.\n\n");
        for (path, line_no, line) in offenders.into_iter().take(80) {
            msg.push_str(&format!(
                "- {}:{}: {}\n",
                path.strip_prefix(&root).unwrap_or(&path).display(),
                line_no,
                line.trim()
            ));
        }
        panic!("{msg}");
    }
}

#[test]
fn scanner_flags_literals_outside_tests_only() {
    let spellings = vec!["\"KeyError\"".to_string()];
    let source = "fn f() { raise(\"KeyError\") }\n#[cfg(test)]\nmod tests { const X: &str = \"KeyError\"; }\n";
    assert_eq!(suspicious_lines(source, &spellings), vec![(1, "fn f() { raise(\"KeyError\") }".to_string())]);
}

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn scan_dir(dir: &Path, spellings: &[String], offenders: &mut Vec<(PathBuf, usize, String)>) {
    let Ok(entries) = fs::read_dir(dir) else { return };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            scan_dir(&path, spellings, offenders);
            continue;
        }
        if path.extension().is_none_or(|ext| ext != "rs") {
            continue;
        }
        let Ok(contents) = fs::read_to_string(&path) else {
            continue;
        };
        for (line_no, line) in suspicious_lines(&contents, spellings) {
            offenders.push((path.clone(), line_no, line));
        }
    }
}

fn suspicious_lines(contents: &str, spellings: &[String]) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("#[cfg(test)]") {
            break;
        }
        // Avoid false positives in comments/docstrings.
        if trimmed.starts_with("//") {
            continue;
        }
        if spellings.iter().any(|s| line.contains(s.as_str())) {
            out.push((idx + 1, line.to_string()));
        }
    }
    out
}
