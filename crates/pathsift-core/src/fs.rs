//! Read-only filesystem seam used by the discovery and filter engines.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;
use walkdir::WalkDir;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

/// Type of a filesystem entry after following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Anything else (sockets, devices, fifos).
    Other,
}

/// The subset of file metadata the engines consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Entry type.
    pub kind: FileKind,
    /// Last modification time.
    pub modified: SystemTime,
    /// True birth time, when the platform and filesystem report one.
    pub created: Option<SystemTime>,
    /// The platform's change-time field (unix `ctime`; on Windows the
    /// creation time reported in that slot).
    pub changed: Option<SystemTime>,
}

impl FileStat {
    /// Stat for a regular file with only a modification time.
    pub fn file(modified: SystemTime) -> Self {
        Self {
            kind: FileKind::File,
            modified,
            created: None,
            changed: None,
        }
    }

    /// Stat for a directory.
    pub fn directory(modified: SystemTime) -> Self {
        Self {
            kind: FileKind::Directory,
            ..Self::file(modified)
        }
    }

    /// Set the birth time.
    pub fn with_created(mut self, created: SystemTime) -> Self {
        self.created = Some(created);
        self
    }

    /// Set the change time.
    pub fn with_changed(mut self, changed: SystemTime) -> Self {
        self.changed = Some(changed);
        self
    }

    /// Check if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }
}

/// An entry found below a walk root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// The root joined with the entry's relative path.
    pub path: PathBuf,
    /// Levels between the root and the entry's parent directory.
    pub depth: usize,
    /// Entry type after following symlinks.
    pub kind: FileKind,
}

/// Why a walk could not produce an entry.
#[derive(Debug, Error)]
pub enum WalkError {
    /// A directory below the root could not be listed.
    #[error("cannot list {}: {source}", .path.display())]
    Unreadable { path: PathBuf, source: io::Error },

    /// The root could not be listed, or an entry could not be inspected.
    #[error("cannot read {}: {source}", .path.display())]
    Entry { path: PathBuf, source: io::Error },

    /// A followed symlink leads back to one of its ancestors.
    #[error("{} points back to {}", .path.display(), .ancestor.display())]
    Loop { path: PathBuf, ancestor: PathBuf },
}

/// Read-only filesystem operations.
pub trait FileSystem {
    /// Lazy recursive walk below one root.
    type Walk: Iterator<Item = Result<WalkEntry, WalkError>>;

    /// Resolve a path to its absolute, symlink-free form.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// Read metadata, following symlinks.
    fn stat(&self, path: &Path) -> io::Result<FileStat>;

    /// Walk everything below `root`, following symlinks, without yielding
    /// the root itself. Directories deeper than `max_depth` levels are not
    /// listed. Nothing is read until the walk is polled.
    fn walk(&self, root: &Path, max_depth: Option<usize>) -> Self::Walk;
}

impl<F: FileSystem + ?Sized> FileSystem for &F {
    type Walk = F::Walk;

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        (**self).canonicalize(path)
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        (**self).stat(path)
    }

    fn walk(&self, root: &Path, max_depth: Option<usize>) -> Self::Walk {
        (**self).walk(root, max_depth)
    }
}

/// The host filesystem via `std::fs` and `walkdir`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    type Walk = StdWalk;

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let metadata = std::fs::metadata(path)?;
        Ok(FileStat {
            kind: kind_of(metadata.file_type()),
            modified: metadata.modified()?,
            created: metadata.created().ok(),
            changed: change_time(&metadata),
        })
    }

    fn walk(&self, root: &Path, max_depth: Option<usize>) -> Self::Walk {
        let mut walker = WalkDir::new(root).min_depth(1).follow_links(true);
        if let Some(max) = max_depth {
            // walkdir counts the root as depth 0 and its children as depth 1.
            walker = walker.max_depth(max.saturating_add(1));
        }
        StdWalk {
            inner: walker.into_iter(),
            last_dir: None,
        }
    }
}

/// Walk over the host filesystem.
pub struct StdWalk {
    inner: walkdir::IntoIter,
    /// The most recently yielded directory. walkdir reports a failure to
    /// list it as the very next error, carrying the same path.
    last_dir: Option<PathBuf>,
}

impl StdWalk {
    fn classify(&mut self, err: walkdir::Error) -> WalkError {
        let path = err.path().map(Path::to_path_buf).unwrap_or_default();
        if let Some(ancestor) = err.loop_ancestor() {
            return WalkError::Loop {
                ancestor: ancestor.to_path_buf(),
                path,
            };
        }

        let unreadable = self.last_dir.take().is_some_and(|dir| dir == path);
        let source = err
            .into_io_error()
            .unwrap_or_else(|| io::Error::other("walk failed"));
        if unreadable {
            WalkError::Unreadable { path, source }
        } else {
            WalkError::Entry { path, source }
        }
    }
}

impl Iterator for StdWalk {
    type Item = Result<WalkEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.next()? {
            Ok(entry) => {
                let depth = entry.depth().saturating_sub(1);
                let kind = kind_of(entry.file_type());
                let path = entry.into_path();
                if kind == FileKind::Directory {
                    self.last_dir = Some(path.clone());
                }
                Some(Ok(WalkEntry { path, depth, kind }))
            }
            Err(err) => Some(Err(self.classify(err))),
        }
    }
}

fn kind_of(file_type: std::fs::FileType) -> FileKind {
    if file_type.is_file() {
        FileKind::File
    } else if file_type.is_dir() {
        FileKind::Directory
    } else {
        FileKind::Other
    }
}

// Cross-platform change-time helpers

/// Get the inode change time from metadata.
#[cfg(unix)]
fn change_time(metadata: &std::fs::Metadata) -> Option<SystemTime> {
    from_unix_parts(metadata.ctime(), metadata.ctime_nsec())
}

/// Windows reports creation time in the change-time slot.
#[cfg(windows)]
fn change_time(metadata: &std::fs::Metadata) -> Option<SystemTime> {
    metadata.created().ok()
}

#[cfg(not(any(unix, windows)))]
fn change_time(_metadata: &std::fs::Metadata) -> Option<SystemTime> {
    None
}

/// Build a `SystemTime` from seconds and nanoseconds relative to the epoch.
#[cfg(unix)]
fn from_unix_parts(secs: i64, nanos: i64) -> Option<SystemTime> {
    use std::time::{Duration, UNIX_EPOCH};

    let nanos = u32::try_from(nanos).ok()?;
    if secs >= 0 {
        UNIX_EPOCH.checked_add(Duration::new(secs.unsigned_abs(), nanos))
    } else {
        UNIX_EPOCH
            .checked_sub(Duration::from_secs(secs.unsigned_abs()))?
            .checked_add(Duration::from_nanos(u64::from(nanos)))
    }
}
