//! Error types for discovery and filtering.

use std::path::PathBuf;

use strum::Display;
use thiserror::Error;

/// Which exclusion mechanism a pattern belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PatternKind {
    /// Regular expression, searched against the absolute path.
    #[strum(to_string = "regex")]
    Regex,
    /// Glob, matched against the path relative to a directory root.
    #[strum(to_string = "glob")]
    Glob,
}

/// Errors surfaced by the discovery and filter iterators.
#[derive(Debug, Error)]
pub enum SiftError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A followed symlink leads back to a directory already being walked.
    #[error("Symlink loop: {path} points back to {ancestor}")]
    SymlinkLoop { path: PathBuf, ancestor: PathBuf },

    /// An exclusion pattern failed to compile.
    #[error("Invalid {kind} pattern `{pattern}`: {message}")]
    InvalidPattern {
        kind: PatternKind,
        pattern: String,
        message: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl SiftError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create an invalid pattern error.
    pub fn invalid_pattern(
        kind: PatternKind,
        pattern: impl Into<String>,
        message: impl ToString,
    ) -> Self {
        Self::InvalidPattern {
            kind,
            pattern: pattern.into(),
            message: message.to_string(),
        }
    }

}

/// Result alias used across pathsift.
pub type Result<T, E = SiftError> = std::result::Result<T, E>;
