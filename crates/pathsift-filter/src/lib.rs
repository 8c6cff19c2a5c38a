//! Temporal filtering for pathsift.
//!
//! Narrows any sequence of file paths by creation and modification time.
//! Each supplied period becomes a [`TimePredicate`]; a path survives only if
//! every predicate holds (logical AND), and evaluation short-circuits on the
//! first failure.
//!
//! # Creation time
//!
//! "Creation time" is resolved by a [`CreationTimeSource`] chosen once per
//! filter:
//!
//! - On Windows, the change-time field ([`ChangeTimeSource`])
//! - Elsewhere, the true birth time, falling back to the modification time
//!   when the filesystem does not record one ([`BirthTimeSource`])
//!
//! # Example
//!
//! ```rust,ignore
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use pathsift_core::{DiscoverConfig, TimeWindow};
//! use pathsift_filter::DateFilter;
//!
//! let files = pathsift_scan::discover("/var/log", DiscoverConfig::new()).unwrap();
//!
//! let filter = DateFilter::new()
//!     .created_after(TimeWindow::After(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()))
//!     .modified_on(TimeWindow::Day(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));
//!
//! for path in filter.apply(files) {
//!     println!("{}", path.unwrap().display());
//! }
//! ```

mod creation;
mod filter;
mod predicate;

pub use creation::{BirthTimeSource, ChangeTimeSource, CreationTimeSource, platform_source};
pub use filter::{DateFilter, DateFiltered, filter_by_dates};
pub use predicate::{PeriodSlot, SharedPeriod, TimePredicate, TimestampField};

// Re-export core types
pub use pathsift_core::{Instant, Period, TimeWindow, to_instant};
