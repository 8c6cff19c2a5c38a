//! Creation timestamp resolution.
//!
//! Platforms disagree on what "creation time" means. Windows reports it in
//! the change-time slot; elsewhere a true birth time may or may not exist.
//! The strategy is picked once, when a filter is built, instead of being
//! re-decided for every file.

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use pathsift_core::FileStat;

/// Resolves a file's creation timestamp from its metadata.
pub trait CreationTimeSource: fmt::Debug + Send + Sync {
    /// The timestamp to treat as the file's creation time. Never fails.
    fn creation_time(&self, stat: &FileStat) -> SystemTime;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Uses the change-time field as the creation time.
///
/// Falls back to the modification time if the field is missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeTimeSource;

impl CreationTimeSource for ChangeTimeSource {
    fn creation_time(&self, stat: &FileStat) -> SystemTime {
        stat.changed.unwrap_or(stat.modified)
    }

    fn name(&self) -> &'static str {
        "change-time"
    }
}

/// Uses the true birth time, or the modification time when the platform
/// or filesystem does not report one.
#[derive(Debug, Clone, Copy, Default)]
pub struct BirthTimeSource;

impl CreationTimeSource for BirthTimeSource {
    fn creation_time(&self, stat: &FileStat) -> SystemTime {
        stat.created.unwrap_or(stat.modified)
    }

    fn name(&self) -> &'static str {
        "birth-time"
    }
}

/// The strategy for the platform this binary was built for.
pub fn platform_source() -> Arc<dyn CreationTimeSource> {
    if cfg!(windows) {
        Arc::new(ChangeTimeSource)
    } else {
        Arc::new(BirthTimeSource)
    }
}
