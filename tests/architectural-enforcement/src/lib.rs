//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - The core crate performs no network I/O and pulls in no UI or HTTP crates
//! - The stream processor is lock-free (single consumer, no shared state)
//! - Production code propagates errors instead of panicking
//!
//! The helpers below scan source files; the rules live in `tests/`.

use std::fs;
use std::path::{Path, PathBuf};

/// Root of the workspace (two levels above this crate)
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// All `.rs` files below `dir` (relative to the workspace root), sorted
#[must_use]
pub fn rust_sources(dir: &str) -> Vec<PathBuf> {
    let path = workspace_root().join(dir);
    if !path.exists() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Production code lines of a source file as `(line_number, code)`
///
/// Stops at the first `#[cfg(test)]`, drops comment-only lines and strips
/// trailing `//` comments.
#[must_use]
pub fn production_lines(content: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with("#[cfg(test)]") {
            break;
        }
        if trimmed.starts_with("//") {
            continue;
        }
        let code = line.split("//").next().unwrap_or(line);
        if !code.trim().is_empty() {
            lines.push((idx + 1, code.to_string()));
        }
    }
    lines
}

/// Scan production code under `dir` for any of `patterns`
///
/// Returns one `path:line - pattern: code` entry per hit.
#[must_use]
pub fn find_violations(dir: &str, patterns: &[&str]) -> Vec<String> {
    let mut violations = Vec::new();
    for path in rust_sources(dir) {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        for (line_number, code) in production_lines(&content) {
            for pattern in patterns {
                if code.contains(pattern) {
                    violations.push(format!(
                        "{}:{} - {}: {}",
                        path.display(),
                        line_number,
                        pattern,
                        code.trim()
                    ));
                }
            }
        }
    }
    violations
}

/// Print violations and fail the calling test if there are any
pub fn report(violations: &[String], rule: &str, hint: &str) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ {rule}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    eprintln!("\n✅ {hint}");

    panic!("\nFound {} violation(s): {rule}", violations.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_tests() {
        let source = "fn a() {}\n// comment\nlet x = 1; // trailing\n#[cfg(test)]\nfn b() {}\n";
        let lines = production_lines(source);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], (1, "fn a() {}".to_string()));
        assert_eq!(lines[1].0, 3);
        assert_eq!(lines[1].1.trim(), "let x = 1;");
    }

    #[test]
    fn test_workspace_sources_found() {
        assert!(!rust_sources("investigator/core/src").is_empty());
    }
}
