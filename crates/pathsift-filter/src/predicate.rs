//! Timestamp predicates evaluated conjunctively by the date filter.

use std::fmt;
use std::sync::Arc;

use strum::Display;

use pathsift_core::{Instant, Period};

/// Which file timestamp a predicate tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TimestampField {
    /// Resolved creation time.
    Created,
    /// Last modification time.
    Modified,
}

/// The parameter slot a period was supplied through.
///
/// Declaration order is evaluation order within a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PeriodSlot {
    In,
    On,
    Before,
    After,
}

/// Shared, thread-safe period.
pub type SharedPeriod = Arc<dyn Period + Send + Sync>;

/// One containment test against one timestamp.
#[derive(Clone)]
pub struct TimePredicate {
    /// Timestamp under test.
    pub field: TimestampField,
    /// Slot the period came from.
    pub slot: PeriodSlot,
    period: SharedPeriod,
}

impl TimePredicate {
    /// Create a predicate.
    pub fn new(field: TimestampField, slot: PeriodSlot, period: SharedPeriod) -> Self {
        Self {
            field,
            slot,
            period,
        }
    }

    /// Sort key: created before modified, then in/on/before/after.
    pub fn key(&self) -> (TimestampField, PeriodSlot) {
        (self.field, self.slot)
    }

    /// Whether `instant` falls inside this predicate's period.
    pub fn matches(&self, instant: &Instant) -> bool {
        self.period.contains(instant)
    }
}

impl fmt::Debug for TimePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimePredicate")
            .field("field", &self.field)
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for TimePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.field, self.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pathsift_core::TimeWindow;

    #[test]
    fn test_ordering() {
        let mut keys = vec![
            (TimestampField::Modified, PeriodSlot::In),
            (TimestampField::Created, PeriodSlot::After),
            (TimestampField::Created, PeriodSlot::In),
            (TimestampField::Created, PeriodSlot::Before),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                (TimestampField::Created, PeriodSlot::In),
                (TimestampField::Created, PeriodSlot::Before),
                (TimestampField::Created, PeriodSlot::After),
                (TimestampField::Modified, PeriodSlot::In),
            ]
        );
    }

    #[test]
    fn test_matches_and_display() {
        let limit = Utc.timestamp_opt(100, 0).unwrap();
        let predicate = TimePredicate::new(
            TimestampField::Modified,
            PeriodSlot::Before,
            Arc::new(TimeWindow::Before(limit)),
        );

        assert!(predicate.matches(&Utc.timestamp_opt(99, 0).unwrap()));
        assert!(!predicate.matches(&limit));
        assert_eq!(predicate.to_string(), "modified_before");
    }
}
