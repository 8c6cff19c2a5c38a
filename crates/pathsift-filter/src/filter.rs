//! Narrowing a path sequence by creation and modification time.

use std::fmt;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pathsift_core::{
    FileStat, FileSystem, Instant, PathInput, Period, Result, SiftError, StdFileSystem,
    to_instant,
};

use crate::creation::{CreationTimeSource, platform_source};
use crate::predicate::{PeriodSlot, SharedPeriod, TimePredicate, TimestampField};

/// Filter keeping files whose timestamps fall inside every supplied period.
///
/// Periods are supplied through eight optional slots. Setting a slot twice
/// replaces the earlier period.
#[derive(Clone)]
pub struct DateFilter<F = StdFileSystem> {
    predicates: Vec<TimePredicate>,
    source: Arc<dyn CreationTimeSource>,
    fs: F,
}

macro_rules! period_setters {
    ($($(#[$doc:meta])* $name:ident => $field:ident, $slot:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(self, period: impl Period + Send + Sync + 'static) -> Self {
                self.with_predicate(TimestampField::$field, PeriodSlot::$slot, Arc::new(period))
            }
        )*
    };
}

impl DateFilter {
    /// An empty filter over the host filesystem using the platform's
    /// creation-time strategy.
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
            source: platform_source(),
            fs: StdFileSystem,
        }
    }
}

impl Default for DateFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FileSystem + Clone> DateFilter<F> {
    /// Read metadata through a different filesystem.
    pub fn with_filesystem<G: FileSystem + Clone>(self, fs: G) -> DateFilter<G> {
        DateFilter {
            predicates: self.predicates,
            source: self.source,
            fs,
        }
    }

    /// Override the creation-time strategy.
    pub fn with_creation_source(mut self, source: impl CreationTimeSource + 'static) -> Self {
        self.source = Arc::new(source);
        self
    }

    period_setters! {
        /// Created inside `period`.
        created_in => Created, In;
        /// Created on `period` (typically a calendar day).
        created_on => Created, On;
        /// Created before `period`.
        created_before => Created, Before;
        /// Created after `period`.
        created_after => Created, After;
        /// Modified inside `period`.
        modified_in => Modified, In;
        /// Modified on `period` (typically a calendar day).
        modified_on => Modified, On;
        /// Modified before `period`.
        modified_before => Modified, Before;
        /// Modified after `period`.
        modified_after => Modified, After;
    }

    /// Set a slot from an already shared period.
    pub fn with_predicate(
        mut self,
        field: TimestampField,
        slot: PeriodSlot,
        period: SharedPeriod,
    ) -> Self {
        self.predicates.retain(|p| p.key() != (field, slot));
        self.predicates.push(TimePredicate::new(field, slot, period));
        self.predicates.sort_by_key(TimePredicate::key);
        self
    }

    /// Predicates in evaluation order.
    pub fn predicates(&self) -> &[TimePredicate] {
        &self.predicates
    }

    /// Whether a file with this metadata satisfies every predicate.
    pub fn accepts(&self, stat: &FileStat) -> bool {
        accepts(&self.predicates, self.source.as_ref(), stat, None)
    }

    /// Lazily narrow `paths`.
    pub fn apply<P: PathInput>(&self, paths: P) -> DateFiltered<P::Iter, F> {
        tracing::debug!(
            predicates = self.predicates.len(),
            creation_source = self.source.name(),
            "date filter started"
        );

        DateFiltered {
            inputs: paths.into_path_iter(),
            fs: self.fs.clone(),
            predicates: self.predicates.clone().into(),
            source: Arc::clone(&self.source),
            done: false,
        }
    }
}

impl<F> fmt::Debug for DateFilter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateFilter")
            .field("predicates", &self.predicates)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Narrow paths on the host filesystem.
///
/// ```no_run
/// use chrono::{TimeZone, Utc};
/// use pathsift_core::TimeWindow;
/// use pathsift_filter::{DateFilter, filter_by_dates};
///
/// let cutoff = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let filter = DateFilter::new().modified_after(TimeWindow::After(cutoff));
///
/// for path in filter_by_dates(vec!["a.txt", "b.txt"], &filter) {
///     println!("{}", path.unwrap().display());
/// }
/// ```
pub fn filter_by_dates<P, F>(paths: P, filter: &DateFilter<F>) -> DateFiltered<P::Iter, F>
where
    P: PathInput,
    F: FileSystem + Clone,
{
    filter.apply(paths)
}

fn accepts(
    predicates: &[TimePredicate],
    source: &dyn CreationTimeSource,
    stat: &FileStat,
    path: Option<&Path>,
) -> bool {
    let modified = to_instant(stat.modified);
    let mut created: Option<Instant> = None;

    predicates.iter().all(|predicate| {
        let instant = match predicate.field {
            TimestampField::Created => {
                *created.get_or_insert_with(|| to_instant(source.creation_time(stat)))
            }
            TimestampField::Modified => modified,
        };

        let matched = predicate.matches(&instant);
        if !matched {
            if let Some(path) = path {
                tracing::trace!(
                    path = %path.display(),
                    %predicate,
                    %instant,
                    "rejected by time predicate"
                );
            }
        }
        matched
    })
}

/// Lazy, single-pass sequence of paths that passed a [`DateFilter`].
///
/// The first error ends the sequence.
pub struct DateFiltered<I, F> {
    inputs: I,
    fs: F,
    predicates: Arc<[TimePredicate]>,
    source: Arc<dyn CreationTimeSource>,
    done: bool,
}

impl<I, F> DateFiltered<I, F> {
    fn fail(&mut self, error: SiftError) -> Option<Result<PathBuf>> {
        self.done = true;
        Some(Err(error))
    }
}

impl<I, F> Iterator for DateFiltered<I, F>
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
            let path = match self.inputs.next() {
                Some(Ok(path)) => path,
                Some(Err(e)) => return self.fail(e),
                None => {
                    self.done = true;
                    return None;
                }
            };

            if self.predicates.is_empty() {
                return Some(Ok(path));
            }

            let stat = match self.fs.stat(&path) {
                Ok(stat) => stat,
                Err(e) => return self.fail(SiftError::io(path, e)),
            };

            if accepts(&self.predicates, self.source.as_ref(), &stat, Some(&path)) {
                return Some(Ok(path));
            }
        }
    }
}

impl<I, F> FusedIterator for DateFiltered<I, F>
where
    I: Iterator<Item = Result<PathBuf>>,
    F: FileSystem,
{
}

impl<I, F> PathInput for DateFiltered<I, F>
where
    I: Iterator<Item = Result<PathBuf>>,
    F: FileSystem,
{
    type Iter = Self;

    fn into_path_iter(self) -> Self::Iter {
        self
    }
}
