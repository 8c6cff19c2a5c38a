//! Path discovery engine for pathsift.
//!
//! This crate expands a mix of file and directory paths into a lazy
//! sequence of absolute file paths.
//!
//! # Overview
//!
//! - **Lazy traversal** over `walkdir`: each poll does only the filesystem
//!   work needed to produce or reject one candidate
//! - **Depth bounds** relative to each directory root
//! - **Exclusions** by literal path fragment, regex search or root-relative
//!   glob; matching any one rule excludes a file
//!
//! # Example
//!
//! ```rust,no_run
//! use pathsift_scan::{DiscoverConfig, PathDiscovery};
//!
//! let config = DiscoverConfig::builder()
//!     .max_depth(2usize)
//!     .exclude_regexes(vec![r"\.git/".to_string()])
//!     .build()
//!     .unwrap();
//!
//! let engine = PathDiscovery::new(config).unwrap();
//! let first_ten: Vec<_> = engine.discover(["src", "Cargo.toml"]).take(10).collect();
//! println!("{} paths", first_ten.len());
//! ```
//!
//! Directory order is whatever the OS reports; sort the output if you need
//! determinism.

mod discover;
mod exclude;

pub use discover::{Discover, PathDiscovery, discover};
pub use exclude::{Exclusion, ExclusionSet};

// Re-export core types for convenience
pub use pathsift_core::{
    DiscoverConfig, DiscoverConfigBuilder, FileSystem, PathInput, Result, SiftError,
    StdFileSystem,
};
