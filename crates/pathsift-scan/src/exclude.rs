//! Union of the three exclusion mechanisms.

use std::path::{Path, PathBuf};

use globset::{GlobSet, GlobSetBuilder};
use regex::RegexSet;

use pathsift_core::pattern::{normalize_fragment, recursive_glob, search_regex};
use pathsift_core::{DiscoverConfig, PatternKind, Result, SiftError};

/// Why a candidate was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// Matched a glob relative to its traversal root.
    Glob,
    /// Contained a literal path fragment.
    Fragment,
    /// Matched a regular expression.
    Regex,
}

/// Compiled exclusion rules.
///
/// A path is excluded when it matches any entry of any collection.
#[derive(Debug, Clone)]
pub struct ExclusionSet {
    fragments: Vec<String>,
    regexes: RegexSet,
    globs: GlobSet,
}

impl ExclusionSet {
    /// Compile the exclusion rules of a discovery config.
    pub fn new(config: &DiscoverConfig) -> Result<Self> {
        let fragments = config
            .exclude_paths
            .iter()
            .map(|fragment| normalize_fragment(fragment))
            .collect();

        for pattern in &config.exclude_regexes {
            search_regex(pattern)?;
        }
        let regexes = RegexSet::new(&config.exclude_regexes).map_err(|e| {
            SiftError::invalid_pattern(PatternKind::Regex, config.exclude_regexes.join(", "), e)
        })?;

        let mut builder = GlobSetBuilder::new();
        for pattern in &config.exclude_globs {
            builder.add(recursive_glob(pattern)?);
        }
        let globs = builder.build().map_err(|e| {
            SiftError::invalid_pattern(PatternKind::Glob, config.exclude_globs.join(", "), e)
        })?;

        Ok(Self {
            fragments,
            regexes,
            globs,
        })
    }

    /// Whether the path contains any literal fragment.
    pub fn matches_fragment(&self, path: &Path) -> bool {
        if self.fragments.is_empty() {
            return false;
        }
        let path = path.to_string_lossy();
        self.fragments
            .iter()
            .any(|fragment| path.contains(fragment.as_str()))
    }

    /// Whether any regex finds a match anywhere in the resolved path.
    pub fn matches_regex(&self, path: &Path) -> bool {
        !self.regexes.is_empty() && self.regexes.is_match(&path.to_string_lossy())
    }

    /// Whether any glob matches the path relative to its traversal root.
    pub fn matches_glob(&self, relative: &Path) -> bool {
        !self.globs.is_empty() && self.globs.is_match(relative)
    }

    /// Check a directly-named file. Globs do not apply.
    pub fn check_file(&self, path: &Path) -> Option<Exclusion> {
        if self.matches_fragment(path) {
            Some(Exclusion::Fragment)
        } else if self.matches_regex(path) {
            Some(Exclusion::Regex)
        } else {
            None
        }
    }

    /// Check a file found below `root`.
    ///
    /// Globs see the root-relative path and fragments the path as walked.
    /// Regexes see the symlink-free form, which `resolve` is only asked for
    /// when a regex is configured and no cheaper rule matched.
    pub fn check_descendant<E>(
        &self,
        root: &Path,
        path: &Path,
        resolve: impl FnOnce(&Path) -> std::result::Result<PathBuf, E>,
    ) -> std::result::Result<Option<Exclusion>, E> {
        let relative = path.strip_prefix(root).unwrap_or(path);
        if self.matches_glob(relative) {
            return Ok(Some(Exclusion::Glob));
        }
        if self.matches_fragment(path) {
            return Ok(Some(Exclusion::Fragment));
        }
        if self.regexes.is_empty() {
            return Ok(None);
        }
        let resolved = resolve(path)?;
        Ok(self.matches_regex(&resolved).then_some(Exclusion::Regex))
    }
}
