//! Discovery configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::pattern::{recursive_glob, search_regex};

/// Configuration for path discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct DiscoverConfig {
    /// Maximum directory levels below a root to descend into (None = unlimited).
    #[builder(default)]
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Literal path fragments; any discovered absolute path containing one is excluded.
    #[builder(default)]
    #[serde(default)]
    pub exclude_paths: Vec<PathBuf>,

    /// Regular expressions searched against the resolved path.
    #[builder(default)]
    #[serde(default)]
    pub exclude_regexes: Vec<String>,

    /// Glob patterns evaluated relative to each directory root.
    #[builder(default)]
    #[serde(default)]
    pub exclude_globs: Vec<String>,

    /// Fail on input paths that do not exist instead of skipping them.
    #[builder(default = "false")]
    #[serde(default)]
    pub strict_inputs: bool,

    /// Skip symlinks that lead back to a directory already being walked
    /// instead of failing on them.
    #[builder(default = "false")]
    #[serde(default)]
    pub guard_symlink_cycles: bool,
}

impl DiscoverConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref regexes) = self.exclude_regexes {
            for pattern in regexes {
                search_regex(pattern).map_err(|e| e.to_string())?;
            }
        }
        if let Some(ref globs) = self.exclude_globs {
            for pattern in globs {
                recursive_glob(pattern).map_err(|e| e.to_string())?;
            }
        }
        Ok(())
    }
}

impl DiscoverConfig {
    /// Create a new discovery config builder.
    pub fn builder() -> DiscoverConfigBuilder {
        DiscoverConfigBuilder::default()
    }

    /// Unbounded, unfiltered discovery.
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = DiscoverConfig::builder()
            .max_depth(2usize)
            .exclude_globs(vec!["*.log".to_string()])
            .exclude_paths(vec![PathBuf::from("node_modules")])
            .build()
            .unwrap();

        assert_eq!(config.max_depth, Some(2));
        assert_eq!(config.exclude_globs, vec!["*.log".to_string()]);
        assert!(!config.strict_inputs);
        assert!(!config.guard_symlink_cycles);
    }

    #[test]
    fn test_config_default_is_unbounded() {
        let config = DiscoverConfig::new();
        assert_eq!(config.max_depth, None);
        assert!(config.exclude_paths.is_empty());
        assert!(config.exclude_regexes.is_empty());
        assert!(config.exclude_globs.is_empty());
    }

    #[test]
    fn test_builder_rejects_bad_regex() {
        let err = DiscoverConfig::builder()
            .exclude_regexes(vec!["(unclosed".to_string()])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("regex"));
    }

    #[test]
    fn test_builder_rejects_bad_glob() {
        let err = DiscoverConfig::builder()
            .exclude_globs(vec!["[".to_string()])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("glob"));
    }
}
