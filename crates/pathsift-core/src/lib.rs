//! Core types and traits for pathsift.
//!
//! This crate provides the vocabulary shared by the discovery and filter
//! engines: input normalization, the filesystem seam, discovery
//! configuration, periods and the error type.

mod config;
mod error;
pub mod fs;
mod input;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod pattern;
mod period;

pub use config::{DiscoverConfig, DiscoverConfigBuilder};
pub use error::{PatternKind, Result, SiftError};
pub use fs::{FileKind, FileStat, FileSystem, StdFileSystem, StdWalk, WalkEntry, WalkError};
pub use input::{PathInput, PathStream, Single, collect_paths};
#[cfg(any(test, feature = "testing"))]
pub use memory::{MemoryFileSystem, MemoryWalk};
pub use period::{Instant, Period, TimeWindow, to_instant};
