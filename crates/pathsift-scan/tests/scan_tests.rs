use pathsift_core::MemoryFileSystem;
use pathsift_scan::{DiscoverConfig, PathDiscovery, SiftError, discover};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// root/a.txt (0), sub/b.txt (1), sub/deep/c.txt (2), sub/deep/deeper/d.txt (3),
/// sub/exclude.me (1)
fn create_test_tree() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let root = temp.path().canonicalize().unwrap();

    fs::create_dir_all(root.join("sub/deep/deeper")).unwrap();
    fs::write(root.join("a.txt"), "a").unwrap();
    fs::write(root.join("sub/b.txt"), "b").unwrap();
    fs::write(root.join("sub/exclude.me"), "x").unwrap();
    fs::write(root.join("sub/deep/c.txt"), "c").unwrap();
    fs::write(root.join("sub/deep/deeper/d.txt"), "d").unwrap();

    (temp, root)
}

fn relative_sorted(root: &Path, config: DiscoverConfig) -> Vec<String> {
    let mut paths: Vec<String> = discover(root, config)
        .unwrap()
        .map(|p| {
            p.unwrap()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    paths.sort();
    paths
}

#[test]
fn test_end_to_end_depth_and_glob() {
    let (_temp, root) = create_test_tree();
    let config = DiscoverConfig::builder()
        .max_depth(1usize)
        .exclude_globs(vec!["*.me".to_string()])
        .build()
        .unwrap();

    assert_eq!(relative_sorted(&root, config), vec!["a.txt", "sub/b.txt"]);
}

#[test]
fn test_depth_bounding_for_every_level() {
    let (_temp, root) = create_test_tree();
    let expected: [&[&str]; 4] = [
        &["a.txt"],
        &["a.txt", "sub/b.txt", "sub/exclude.me"],
        &["a.txt", "sub/b.txt", "sub/deep/c.txt", "sub/exclude.me"],
        &[
            "a.txt",
            "sub/b.txt",
            "sub/deep/c.txt",
            "sub/deep/deeper/d.txt",
            "sub/exclude.me",
        ],
    ];

    for (depth, want) in expected.iter().enumerate() {
        let config = DiscoverConfig::builder().max_depth(depth).build().unwrap();
        assert_eq!(relative_sorted(&root, config), *want, "max_depth = {depth}");
    }

    assert_eq!(
        relative_sorted(&root, DiscoverConfig::new()),
        expected[3].to_vec()
    );
}

#[test]
fn test_exclusion_is_a_union() {
    let (_temp, root) = create_test_tree();
    let config = DiscoverConfig::builder()
        .exclude_paths(vec![PathBuf::from("deeper")])
        .exclude_regexes(vec![r"c\.txt$".to_string()])
        .exclude_globs(vec!["*.me".to_string()])
        .build()
        .unwrap();

    assert_eq!(relative_sorted(&root, config), vec!["a.txt", "sub/b.txt"]);
}

#[test]
fn test_relative_fragment_matches_resolved_path() {
    let (_temp, root) = create_test_tree();
    let config = DiscoverConfig::builder()
        .exclude_paths(vec![PathBuf::from("./sub/deep/")])
        .build()
        .unwrap();

    assert_eq!(
        relative_sorted(&root, config),
        vec!["a.txt", "sub/b.txt", "sub/exclude.me"]
    );
}

#[test]
fn test_directories_are_never_yielded() {
    let (_temp, root) = create_test_tree();
    for path in discover(&root, DiscoverConfig::new()).unwrap() {
        assert!(path.unwrap().is_file());
    }
}

#[test]
fn test_scalar_promotion() {
    let (_temp, root) = create_test_tree();

    let mut single: Vec<PathBuf> = discover(&root, DiscoverConfig::new())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    let mut wrapped: Vec<PathBuf> = discover(vec![root.clone()], DiscoverConfig::new())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    single.sort();
    wrapped.sort();

    assert_eq!(single, wrapped);
    assert_eq!(single.len(), 5);
}

#[test]
fn test_relative_input_is_resolved() {
    let (_temp, root) = create_test_tree();
    let file = root.join("sub/b.txt");
    let relative = file.strip_prefix(std::env::current_dir().unwrap().canonicalize().unwrap());

    // Only meaningful when the temp dir happens to be below the cwd.
    if let Ok(relative) = relative {
        let found: Vec<PathBuf> = discover(relative, DiscoverConfig::new())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(found, vec![file]);
    }

    let dotted = root.join("sub/../a.txt");
    let found: Vec<PathBuf> = discover(&dotted, DiscoverConfig::new())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(found, vec![root.join("a.txt")]);
}

#[test]
fn test_nonexistent_input_is_silent() {
    let (_temp, root) = create_test_tree();
    let paths = vec![root.join("missing"), root.join("a.txt")];
    let found: Vec<PathBuf> = discover(paths, DiscoverConfig::new())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(found, vec![root.join("a.txt")]);
}

#[test]
fn test_invalid_pattern_fails_fast() {
    let config = DiscoverConfig {
        exclude_regexes: vec!["(".to_string()],
        ..DiscoverConfig::default()
    };
    assert!(matches!(
        discover(".", config),
        Err(SiftError::InvalidPattern { .. })
    ));
}

#[test]
fn test_fresh_walk_per_call() {
    let (_temp, root) = create_test_tree();
    let engine = PathDiscovery::new(DiscoverConfig::new()).unwrap();

    let mut first = engine.discover(&root);
    assert!(first.next().is_some());

    // A new call starts over regardless of the first iterator's progress.
    assert_eq!(engine.discover(&root).count(), 5);
    assert_eq!(first.count(), 4);
}

#[test]
fn test_partial_consumption_stops_filesystem_work() {
    let mut memory = MemoryFileSystem::new();
    for i in 0..50 {
        memory.add_file(format!("/root/file{i:02}.txt"));
    }
    for i in 0..50 {
        memory.add_file(format!("/root/nested/file{i:02}.txt"));
    }

    let engine = PathDiscovery::with_filesystem(DiscoverConfig::new(), &memory).unwrap();
    let taken: Vec<PathBuf> = engine
        .discover("/root")
        .take(3)
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(taken.len(), 3);
    // One stat for the root itself plus one per candidate pulled.
    assert_eq!(memory.stat_calls(), 4);
    assert_eq!(memory.read_dir_calls(), 1);
    assert_eq!(memory.canonicalize_calls(), 1);
}

#[test]
fn test_unreadable_subdirectory_is_skipped() {
    let mut memory = MemoryFileSystem::new();
    memory
        .add_file("/root/private/x.txt")
        .add_file("/root/z.txt")
        .add_unreadable_dir("/root/private");

    let engine = PathDiscovery::with_filesystem(DiscoverConfig::new(), &memory).unwrap();
    let found: Vec<PathBuf> = engine
        .discover("/root")
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(found, vec![PathBuf::from("/root/z.txt")]);
}

#[test]
fn test_unreadable_root_is_an_error() {
    let mut memory = MemoryFileSystem::new();
    memory.add_file("/locked/x.txt").add_unreadable_dir("/locked");

    let engine = PathDiscovery::with_filesystem(DiscoverConfig::new(), &memory).unwrap();
    let mut results = engine.discover("/locked");
    assert!(matches!(
        results.next(),
        Some(Err(SiftError::PermissionDenied { path })) if path == Path::new("/locked")
    ));
    assert!(results.next().is_none());
}

#[test]
fn test_regex_matches_symlink_target() {
    let mut memory = MemoryFileSystem::new();
    memory
        .add_file("/outside/secret/data.txt")
        .add_file("/root/keep.txt")
        .add_symlink("/root/link.txt", "/outside/secret/data.txt");

    let config = DiscoverConfig::builder()
        .exclude_regexes(vec!["secret".to_string()])
        .build()
        .unwrap();
    let engine = PathDiscovery::with_filesystem(config, &memory).unwrap();
    let found: Vec<PathBuf> = engine
        .discover("/root")
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(found, vec![PathBuf::from("/root/keep.txt")]);
}

#[cfg(unix)]
#[test]
fn test_regex_matches_real_symlink_target() {
    let temp = TempDir::new().unwrap();
    let base = temp.path().canonicalize().unwrap();
    fs::create_dir_all(base.join("outside/secret")).unwrap();
    fs::create_dir(base.join("root")).unwrap();
    fs::write(base.join("outside/secret/data.txt"), "s").unwrap();
    fs::write(base.join("root/keep.txt"), "k").unwrap();
    std::os::unix::fs::symlink(
        base.join("outside/secret/data.txt"),
        base.join("root/link.txt"),
    )
    .unwrap();

    let root = base.join("root");
    let config = DiscoverConfig::builder()
        .exclude_regexes(vec!["secret".to_string()])
        .build()
        .unwrap();
    assert_eq!(relative_sorted(&root, config), vec!["keep.txt"]);

    // Fragments still see the path as walked.
    let config = DiscoverConfig::builder()
        .exclude_paths(vec![PathBuf::from("secret")])
        .build()
        .unwrap();
    assert_eq!(relative_sorted(&root, config), vec!["keep.txt", "link.txt"]);
}

#[cfg(unix)]
#[test]
fn test_symlink_cycle_guard() {
    let (_temp, root) = create_test_tree();
    std::os::unix::fs::symlink(&root, root.join("sub/loop")).unwrap();

    let config = DiscoverConfig::builder()
        .guard_symlink_cycles(true)
        .build()
        .unwrap();
    assert_eq!(relative_sorted(&root, config).len(), 5);

    // Without the guard the loop ends the sequence.
    let results: Vec<Result<PathBuf, SiftError>> =
        discover(&root, DiscoverConfig::new()).unwrap().collect();
    assert!(matches!(
        results.last(),
        Some(Err(SiftError::SymlinkLoop { ancestor, .. })) if *ancestor == root
    ));
}
