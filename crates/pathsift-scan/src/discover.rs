//! Expansion of file and directory inputs into a lazy sequence of files.

use std::io::ErrorKind;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pathsift_core::{
    DiscoverConfig, FileKind, FileSystem, PathInput, Result, SiftError, StdFileSystem, WalkEntry,
    WalkError,
};

use crate::exclude::ExclusionSet;

/// Path discovery engine.
///
/// Holds a validated configuration, the compiled exclusion rules and the
/// filesystem handle. Each call to [`PathDiscovery::discover`] starts a
/// fresh, independent walk.
#[derive(Debug, Clone)]
pub struct PathDiscovery<F = StdFileSystem> {
    config: Arc<DiscoverConfig>,
    exclusions: Arc<ExclusionSet>,
    fs: F,
}

impl PathDiscovery {
    /// Create an engine over the host filesystem.
    pub fn new(config: DiscoverConfig) -> Result<Self> {
        Self::with_filesystem(config, StdFileSystem)
    }
}

impl<F: FileSystem + Clone> PathDiscovery<F> {
    /// Create an engine over a custom filesystem.
    pub fn with_filesystem(config: DiscoverConfig, fs: F) -> Result<Self> {
        let exclusions = ExclusionSet::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            exclusions: Arc::new(exclusions),
            fs,
        })
    }

    /// Start discovering files under `paths`.
    ///
    /// Nothing touches the filesystem until the returned iterator is polled.
    pub fn discover<P: PathInput>(&self, paths: P) -> Discover<P::Iter, F> {
        Discover {
            inputs: paths.into_path_iter(),
            fs: self.fs.clone(),
            config: Arc::clone(&self.config),
            exclusions: Arc::clone(&self.exclusions),
            current: None,
            done: false,
        }
    }
}

/// Discover files on the host filesystem.
///
/// ```no_run
/// use pathsift_core::DiscoverConfig;
///
/// let config = DiscoverConfig::builder()
///     .max_depth(1usize)
///     .exclude_globs(vec!["*.me".to_string()])
///     .build()
///     .unwrap();
///
/// for path in pathsift_scan::discover("root", config).unwrap() {
///     println!("{}", path.unwrap().display());
/// }
/// ```
pub fn discover<P: PathInput>(
    paths: P,
    config: DiscoverConfig,
) -> Result<Discover<P::Iter, StdFileSystem>> {
    Ok(PathDiscovery::new(config)?.discover(paths))
}

/// A directory input being walked.
struct RootWalk<W> {
    root: PathBuf,
    entries: W,
}

/// What an input path turned out to be.
enum Opened<W> {
    File(PathBuf),
    Root(RootWalk<W>),
}

/// Lazy, single-pass sequence of discovered files.
///
/// Yields absolute paths. The first error ends the sequence.
pub struct Discover<I, F: FileSystem> {
    inputs: I,
    fs: F,
    config: Arc<DiscoverConfig>,
    exclusions: Arc<ExclusionSet>,
    current: Option<RootWalk<F::Walk>>,
    done: bool,
}

impl<I, F> Discover<I, F>
where
    I: Iterator<Item = Result<PathBuf>>,
    F: FileSystem,
{
    fn fail(&mut self, error: SiftError) -> Option<Result<PathBuf>> {
        self.done = true;
        self.current = None;
        Some(Err(error))
    }

    /// Resolve one input and decide whether it is a file, a root or nothing.
    fn open_input(&self, raw: PathBuf) -> Result<Option<Opened<F::Walk>>> {
        let path = match self.fs.canonicalize(&raw) {
            Ok(path) => path,
            Err(e) if e.kind() == ErrorKind::NotFound && !self.config.strict_inputs => {
                tracing::trace!(path = %raw.display(), "skipping missing input");
                return Ok(None);
            }
            Err(e) => return Err(SiftError::io(raw, e)),
        };

        let stat = self.fs.stat(&path).map_err(|e| SiftError::io(&path, e))?;
        match stat.kind {
            FileKind::File => match self.exclusions.check_file(&path) {
                Some(reason) => {
                    tracing::trace!(path = %path.display(), ?reason, "excluded input file");
                    Ok(None)
                }
                None => Ok(Some(Opened::File(path))),
            },
            FileKind::Directory => {
                tracing::debug!(
                    root = %path.display(),
                    max_depth = ?self.config.max_depth,
                    "opening traversal root"
                );
                let entries = self.fs.walk(&path, self.config.max_depth);
                Ok(Some(Opened::Root(RootWalk {
                    root: path,
                    entries,
                })))
            }
            FileKind::Other => Ok(None),
        }
    }

    /// Turn a walk failure into an error, or `None` when the walk may go on.
    fn walk_error(&self, error: WalkError) -> Option<SiftError> {
        match error {
            WalkError::Unreadable { path, source }
                if source.kind() == ErrorKind::PermissionDenied =>
            {
                tracing::debug!(path = %path.display(), "skipping unreadable directory");
                None
            }
            WalkError::Loop { path, ancestor } if self.config.guard_symlink_cycles => {
                tracing::trace!(
                    path = %path.display(),
                    target = %ancestor.display(),
                    "skipping directory cycle"
                );
                None
            }
            WalkError::Loop { path, ancestor } => Some(SiftError::SymlinkLoop { path, ancestor }),
            WalkError::Unreadable { path, source } | WalkError::Entry { path, source } => {
                Some(SiftError::io(path, source))
            }
        }
    }
}

/// Decide whether a walked entry is yielded.
fn screen<F: FileSystem>(
    fs: &F,
    exclusions: &ExclusionSet,
    root: &Path,
    entry: WalkEntry,
) -> Result<Option<PathBuf>> {
    if entry.kind != FileKind::File {
        if entry.kind == FileKind::Other {
            tracing::trace!(path = %entry.path.display(), "skipping non-regular entry");
        }
        return Ok(None);
    }

    let excluded = exclusions.check_descendant(root, &entry.path, |path| {
        fs.canonicalize(path).map_err(|e| SiftError::io(path, e))
    })?;
    match excluded {
        Some(reason) => {
            tracing::trace!(
                path = %entry.path.display(),
                depth = entry.depth,
                ?reason,
                "excluded file"
            );
            Ok(None)
        }
        None => Ok(Some(entry.path)),
    }
}

impl<I, F> Iterator for Discover<I, F>
where
    I: Iterator<Item = Result<PathBuf>>,
    F: FileSystem,
{
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if let Some(walk) = self.current.as_mut() {
                match walk.entries.next() {
                    Some(Ok(entry)) => {
                        match screen(&self.fs, &self.exclusions, &walk.root, entry) {
                            Ok(Some(path)) => return Some(Ok(path)),
                            Ok(None) => {}
                            Err(e) => return self.fail(e),
                        }
                    }
                    Some(Err(e)) => {
                        if let Some(error) = self.walk_error(e) {
                            return self.fail(error);
                        }
                    }
                    None => self.current = None,
                }
                continue;
            }

            let raw = match self.inputs.next() {
                Some(Ok(raw)) => raw,
                Some(Err(e)) => return self.fail(e),
                None => {
                    self.done = true;
                    return None;
                }
            };

            match self.open_input(raw) {
                Ok(Some(Opened::File(path))) => return Some(Ok(path)),
                Ok(Some(Opened::Root(walk))) => self.current = Some(walk),
                Ok(None) => {}
                Err(e) => return self.fail(e),
            }
        }
    }
}

impl<I, F> FusedIterator for Discover<I, F>
where
    I: Iterator<Item = Result<PathBuf>>,
    F: FileSystem,
{
}

impl<I, F> PathInput for Discover<I, F>
where
    I: Iterator<Item = Result<PathBuf>>,
    F: FileSystem,
{
    type Iter = Self;

    fn into_path_iter(self) -> Self::Iter {
        self
    }
}
