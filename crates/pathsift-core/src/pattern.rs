//! Compilation helpers shared by config validation and the exclusion set.

use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobBuilder};
use regex::Regex;

use crate::error::{PatternKind, Result, SiftError};

/// Compile a glob so that it matches at any depth below a root.
///
/// `*.log` behaves like a recursive glob: it matches `a.log`, `x/a.log` and
/// `x/y/a.log` when tested against root-relative paths. `*` never crosses
/// a path separator.
pub fn recursive_glob(pattern: &str) -> Result<Glob> {
    let trimmed = pattern.trim_start_matches("./");
    let anchored = if trimmed.starts_with("**/") {
        trimmed.to_string()
    } else {
        format!("**/{trimmed}")
    };

    GlobBuilder::new(&anchored)
        .literal_separator(true)
        .build()
        .map_err(|e| SiftError::invalid_pattern(PatternKind::Glob, pattern, e.kind()))
}

/// Compile a regex used for unanchored search.
pub fn search_regex(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| SiftError::invalid_pattern(PatternKind::Regex, pattern, e))
}

/// Normalize a literal exclusion fragment the way a path would print.
///
/// Redundant separators, trailing separators and `.` components are dropped;
/// an empty fragment normalizes to `.`.
pub fn normalize_fragment(fragment: &Path) -> String {
    let normalized: PathBuf = fragment
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    if normalized.as_os_str().is_empty() {
        ".".to_string()
    } else {
        normalized.to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recursive_glob_matches_any_depth() {
        let matcher = recursive_glob("*.me").unwrap().compile_matcher();
        assert!(matcher.is_match("exclude.me"));
        assert!(matcher.is_match("sub/exclude.me"));
        assert!(matcher.is_match("sub/deep/exclude.me"));
        assert!(!matcher.is_match("sub/exclude.txt"));
    }

    #[test]
    fn test_recursive_glob_with_directory_component() {
        let matcher = recursive_glob("sub/*.txt").unwrap().compile_matcher();
        assert!(matcher.is_match("sub/b.txt"));
        assert!(matcher.is_match("x/sub/b.txt"));
        assert!(!matcher.is_match("sub/deep/c.txt"));
        assert!(!matcher.is_match("b.txt"));
    }

    #[test]
    fn test_invalid_glob() {
        let err = recursive_glob("a[").unwrap_err();
        assert!(matches!(
            err,
            SiftError::InvalidPattern {
                kind: PatternKind::Glob,
                ..
            }
        ));
    }

    #[test]
    fn test_search_regex_is_unanchored() {
        let re = search_regex(r"\.cache").unwrap();
        assert!(re.is_match("/home/user/.cache/file"));
        assert!(search_regex("(").is_err());
    }

    #[test]
    fn test_normalize_fragment() {
        assert_eq!(normalize_fragment(Path::new("./build/")), "build");
        assert_eq!(normalize_fragment(Path::new("a//b/./c")), "a/b/c");
        assert_eq!(normalize_fragment(Path::new("")), ".");
        assert_eq!(normalize_fragment(Path::new("node_modules")), "node_modules");
    }
}
