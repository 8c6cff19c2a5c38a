//! In-memory filesystem with operation counters.
//!
//! Useful for tests that need deterministic timestamps, a filesystem without
//! birth-time support, unreadable directories, or proof that an iterator did
//! not touch entries it never yielded.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::fs::{FileStat, FileSystem, WalkEntry, WalkError};

/// Symlink resolution limit, matching common kernel limits.
const MAX_SYMLINK_HOPS: usize = 40;

#[derive(Debug, Clone)]
enum Node {
    Entry(FileStat),
    Symlink(PathBuf),
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: BTreeMap<PathBuf, Node>,
    unreadable: BTreeSet<PathBuf>,
}

#[derive(Debug, Default)]
struct Counters {
    stat: AtomicUsize,
    list: AtomicUsize,
    canonicalize: AtomicUsize,
}

/// An in-memory tree rooted at `/`.
///
/// Clones share counters. Walks see the tree as it was when they started.
#[derive(Debug, Clone)]
pub struct MemoryFileSystem {
    tree: Arc<Tree>,
    counters: Arc<Counters>,
}

impl MemoryFileSystem {
    /// Create an empty filesystem containing only `/`.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            PathBuf::from("/"),
            Node::Entry(FileStat::directory(UNIX_EPOCH)),
        );
        Self {
            tree: Arc::new(Tree {
                nodes,
                unreadable: BTreeSet::new(),
            }),
            counters: Arc::default(),
        }
    }

    /// Add a directory and any missing parents.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) -> &mut Self {
        let path = absolute(path.as_ref());
        let tree = self.tree_mut(&path);
        tree.nodes
            .entry(path)
            .or_insert(Node::Entry(FileStat::directory(UNIX_EPOCH)));
        self
    }

    /// Add a directory whose entries cannot be listed.
    pub fn add_unreadable_dir(&mut self, path: impl AsRef<Path>) -> &mut Self {
        let path = absolute(path.as_ref());
        self.add_dir(&path);
        Arc::make_mut(&mut self.tree).unreadable.insert(path);
        self
    }

    /// Add a regular file whose timestamps are all the epoch.
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.add_file_with(path, FileStat::file(UNIX_EPOCH))
    }

    /// Add an entry with explicit metadata.
    pub fn add_file_with(&mut self, path: impl AsRef<Path>, stat: FileStat) -> &mut Self {
        let path = absolute(path.as_ref());
        self.tree_mut(&path).nodes.insert(path, Node::Entry(stat));
        self
    }

    /// Add a symlink pointing at `target` (absolute, or relative to the link's parent).
    pub fn add_symlink(
        &mut self,
        path: impl AsRef<Path>,
        target: impl Into<PathBuf>,
    ) -> &mut Self {
        let path = absolute(path.as_ref());
        self.tree_mut(&path)
            .nodes
            .insert(path, Node::Symlink(target.into()));
        self
    }

    /// Number of `stat` calls so far, including those made by walks.
    pub fn stat_calls(&self) -> usize {
        self.counters.stat.load(Ordering::Relaxed)
    }

    /// Number of directory listings so far.
    pub fn read_dir_calls(&self) -> usize {
        self.counters.list.load(Ordering::Relaxed)
    }

    /// Number of `canonicalize` calls so far.
    pub fn canonicalize_calls(&self) -> usize {
        self.counters.canonicalize.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero.
    pub fn reset_counters(&self) {
        self.counters.stat.store(0, Ordering::Relaxed);
        self.counters.list.store(0, Ordering::Relaxed);
        self.counters.canonicalize.store(0, Ordering::Relaxed);
    }

    /// Mutable tree access with every parent of `path` present.
    fn tree_mut(&mut self, path: &Path) -> &mut Tree {
        let tree = Arc::make_mut(&mut self.tree);
        for ancestor in path.ancestors().skip(1) {
            tree.nodes
                .entry(ancestor.to_path_buf())
                .or_insert(Node::Entry(FileStat::directory(UNIX_EPOCH)));
        }
        tree
    }
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    fn resolve(&self, path: &Path, hops: &mut usize) -> io::Result<PathBuf> {
        let mut current = PathBuf::from("/");
        for component in path.components() {
            match component {
                Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
                Component::ParentDir => {
                    current.pop();
                }
                Component::Normal(name) => {
                    current.push(name);
                    match self.nodes.get(&current) {
                        None => return Err(not_found(path)),
                        Some(Node::Symlink(target)) => {
                            *hops += 1;
                            if *hops > MAX_SYMLINK_HOPS {
                                return Err(io::Error::other(format!(
                                    "too many levels of symbolic links: {}",
                                    path.display()
                                )));
                            }
                            let target = match current.parent() {
                                Some(parent) => parent.join(target),
                                None => target.clone(),
                            };
                            current = self.resolve(&target, hops)?;
                        }
                        Some(Node::Entry(_)) => {}
                    }
                }
            }
        }
        Ok(current)
    }

    fn lookup(&self, path: &Path) -> io::Result<(PathBuf, FileStat)> {
        let resolved = self.resolve(path, &mut 0)?;
        match self.nodes.get(&resolved) {
            Some(Node::Entry(stat)) => Ok((resolved, *stat)),
            _ => Err(not_found(path)),
        }
    }

    /// Children of `resolved`, joined onto the path they were requested by.
    fn list(&self, path: &Path, resolved: &Path) -> io::Result<Vec<PathBuf>> {
        if self.unreadable.contains(resolved) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {}", path.display()),
            ));
        }
        Ok(self
            .nodes
            .keys()
            .filter(|candidate| candidate.parent() == Some(resolved))
            .filter_map(|candidate| candidate.file_name())
            .map(|name| path.join(name))
            .collect())
    }
}

impl FileSystem for MemoryFileSystem {
    type Walk = MemoryWalk;

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        self.counters.canonicalize.fetch_add(1, Ordering::Relaxed);
        self.tree.lookup(path).map(|(resolved, _)| resolved)
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        self.counters.stat.fetch_add(1, Ordering::Relaxed);
        self.tree.lookup(path).map(|(_, stat)| stat)
    }

    fn walk(&self, root: &Path, max_depth: Option<usize>) -> Self::Walk {
        MemoryWalk {
            tree: Arc::clone(&self.tree),
            counters: Arc::clone(&self.counters),
            root: Some(root.to_path_buf()),
            max_depth,
            stack: Vec::new(),
        }
    }
}

struct Frame {
    entries: std::vec::IntoIter<PathBuf>,
    /// Depth of the entries' parent below the root.
    depth: usize,
    resolved: PathBuf,
}

/// Depth-first walk over a [`MemoryFileSystem`]: one listing per directory
/// entered, one stat per entry.
pub struct MemoryWalk {
    tree: Arc<Tree>,
    counters: Arc<Counters>,
    /// Not yet listed.
    root: Option<PathBuf>,
    max_depth: Option<usize>,
    stack: Vec<Frame>,
}

impl MemoryWalk {
    fn open(&mut self, path: &Path, resolved: PathBuf, depth: usize) -> io::Result<()> {
        self.counters.list.fetch_add(1, Ordering::Relaxed);
        let entries = self.tree.list(path, &resolved)?;
        self.stack.push(Frame {
            entries: entries.into_iter(),
            depth,
            resolved,
        });
        Ok(())
    }

    fn open_root(&mut self, root: PathBuf) -> Result<(), WalkError> {
        let opened = self
            .tree
            .lookup(&root)
            .and_then(|(resolved, _)| self.open(&root, resolved, 0));
        opened.map_err(|source| WalkError::Entry { path: root, source })
    }

    /// List `path` when entries inside it are still within the depth bound.
    fn descend(&mut self, path: &Path, depth: usize) -> Result<(), WalkError> {
        if self.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }
        let resolved = self
            .tree
            .resolve(path, &mut 0)
            .map_err(|source| WalkError::Entry {
                path: path.to_path_buf(),
                source,
            })?;
        if let Some(frame) = self.stack.iter().find(|frame| frame.resolved == resolved) {
            return Err(WalkError::Loop {
                path: path.to_path_buf(),
                ancestor: frame.resolved.clone(),
            });
        }
        self.open(path, resolved, depth)
            .map_err(|source| WalkError::Unreadable {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl Iterator for MemoryWalk {
    type Item = Result<WalkEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            if let Err(e) = self.open_root(root) {
                return Some(Err(e));
            }
        }

        loop {
            let frame = self.stack.last_mut()?;
            let depth = frame.depth;
            let Some(path) = frame.entries.next() else {
                self.stack.pop();
                continue;
            };

            self.counters.stat.fetch_add(1, Ordering::Relaxed);
            let stat = match self.tree.lookup(&path) {
                Ok((_, stat)) => stat,
                Err(source) => return Some(Err(WalkError::Entry { path, source })),
            };

            if stat.is_dir() {
                if let Err(e) = self.descend(&path, depth + 1) {
                    return Some(Err(e));
                }
            }
            return Some(Ok(WalkEntry {
                path,
                depth,
                kind: stat.kind,
            }));
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    Path::new("/").join(path)
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file or directory: {}", path.display()),
    )
}

/// Convenience for building timestamps in tests: `secs` after the epoch.
pub fn epoch_secs(secs: u64) -> SystemTime {
    UNIX_EPOCH + std::time::Duration::from_secs(secs)
}
