//! Normalization of path inputs into a sequence.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Anything the engines accept as their primary input.
///
/// A single path-like value becomes a one-element sequence; sequences keep
/// their order. The engines' own iterators also implement this trait so the
/// discovery output can be piped straight into the date filter.
pub trait PathInput {
    /// Iterator produced by [`PathInput::into_path_iter`].
    type Iter: Iterator<Item = Result<PathBuf>>;

    /// Normalize into an ordered sequence of paths.
    fn into_path_iter(self) -> Self::Iter;
}

/// A single already-normalized path.
pub type Single = std::iter::Once<Result<PathBuf>>;

macro_rules! scalar_input {
    ($($ty:ty),* $(,)?) => {
        $(
            impl PathInput for $ty {
                type Iter = Single;

                fn into_path_iter(self) -> Self::Iter {
                    std::iter::once(Ok(PathBuf::from(self)))
                }
            }
        )*
    };
}

scalar_input!(&str, String, &String, &Path, PathBuf, &PathBuf);

impl<P: Into<PathBuf>> PathInput for Vec<P> {
    type Iter = std::iter::Map<std::vec::IntoIter<P>, fn(P) -> Result<PathBuf>>;

    fn into_path_iter(self) -> Self::Iter {
        self.into_iter().map(owned_path::<P> as fn(P) -> Result<PathBuf>)
    }
}

impl<P: Into<PathBuf>, const N: usize> PathInput for [P; N] {
    type Iter = std::iter::Map<std::array::IntoIter<P, N>, fn(P) -> Result<PathBuf>>;

    fn into_path_iter(self) -> Self::Iter {
        self.into_iter().map(owned_path::<P> as fn(P) -> Result<PathBuf>)
    }
}

impl<'a, P: AsRef<Path>> PathInput for &'a [P] {
    type Iter = std::iter::Map<std::slice::Iter<'a, P>, fn(&'a P) -> Result<PathBuf>>;

    fn into_path_iter(self) -> Self::Iter {
        self.iter().map(borrowed_path::<P> as fn(&'a P) -> Result<PathBuf>)
    }
}

fn owned_path<P: Into<PathBuf>>(path: P) -> Result<PathBuf> {
    Ok(path.into())
}

fn borrowed_path<P: AsRef<Path>>(path: &P) -> Result<PathBuf> {
    Ok(path.as_ref().to_path_buf())
}

/// Adapter for any iterator of already-fallible paths.
///
/// ```
/// use std::path::PathBuf;
/// use pathsift_core::{PathInput, PathStream};
///
/// let upstream = vec![Ok(PathBuf::from("a")), Ok(PathBuf::from("b"))];
/// let paths: Vec<_> = PathStream(upstream.into_iter())
///     .into_path_iter()
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(paths, vec![PathBuf::from("a"), PathBuf::from("b")]);
/// ```
#[derive(Debug, Clone)]
pub struct PathStream<I>(pub I);

impl<I> PathInput for PathStream<I>
where
    I: Iterator<Item = Result<PathBuf>>,
{
    type Iter = I;

    fn into_path_iter(self) -> Self::Iter {
        self.0
    }
}

/// Collect an input into a vector, failing on the first error.
pub fn collect_paths(input: impl PathInput) -> Result<Vec<PathBuf>> {
    input.into_path_iter().collect()
}
