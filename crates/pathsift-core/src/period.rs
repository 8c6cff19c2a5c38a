//! Time windows tested against file timestamps.

use std::time::SystemTime;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The instant representation timestamps are converted to before testing.
pub type Instant = DateTime<Utc>;

/// Convert a raw metadata timestamp into an [`Instant`].
pub fn to_instant(time: SystemTime) -> Instant {
    DateTime::<Utc>::from(time)
}

/// A time range or instant comparison with a containment test.
///
/// The engines never construct periods; callers supply them. Closures over
/// an [`Instant`] and [`TimeWindow`] both qualify.
pub trait Period {
    /// Whether `instant` falls inside this period.
    fn contains(&self, instant: &Instant) -> bool;
}

impl<F> Period for F
where
    F: Fn(&Instant) -> bool,
{
    fn contains(&self, instant: &Instant) -> bool {
        self(instant)
    }
}

/// Ready-made periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    /// Strictly earlier than the instant.
    Before(Instant),
    /// Strictly later than the instant.
    After(Instant),
    /// Between two instants, both ends included.
    Between { start: Instant, end: Instant },
    /// The whole UTC calendar day.
    Day(NaiveDate),
}

impl TimeWindow {
    /// Window between two instants, reordering them if needed.
    pub fn between(a: Instant, b: Instant) -> Self {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        Self::Between { start, end }
    }
}

impl Period for TimeWindow {
    fn contains(&self, instant: &Instant) -> bool {
        match self {
            Self::Before(limit) => instant < limit,
            Self::After(limit) => instant > limit,
            Self::Between { start, end } => start <= instant && instant <= end,
            Self::Day(date) => instant.date_naive() == *date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::{Duration, UNIX_EPOCH};

    fn at(secs: i64) -> Instant {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_to_instant_is_exact() {
        let time = UNIX_EPOCH + Duration::new(1_700_000_000, 123_456_789);
        let instant = to_instant(time);
        assert_eq!(instant.timestamp(), 1_700_000_000);
        assert_eq!(instant.timestamp_subsec_nanos(), 123_456_789);
    }

    #[test]
    fn test_to_instant_before_epoch() {
        let instant = to_instant(UNIX_EPOCH - Duration::from_secs(60));
        assert_eq!(instant.timestamp(), -60);
    }

    #[test]
    fn test_before_and_after_are_strict() {
        assert!(TimeWindow::Before(at(10)).contains(&at(9)));
        assert!(!TimeWindow::Before(at(10)).contains(&at(10)));
        assert!(TimeWindow::After(at(10)).contains(&at(11)));
        assert!(!TimeWindow::After(at(10)).contains(&at(10)));
    }

    #[test]
    fn test_between_is_inclusive() {
        let window = TimeWindow::between(at(20), at(10));
        assert_eq!(window, TimeWindow::Between { start: at(10), end: at(20) });
        assert!(window.contains(&at(10)));
        assert!(window.contains(&at(20)));
        assert!(!window.contains(&at(21)));
    }

    #[test]
    fn test_day() {
        let day = TimeWindow::Day(NaiveDate::from_ymd_opt(1970, 1, 2).unwrap());
        assert!(day.contains(&at(86_400)));
        assert!(day.contains(&at(2 * 86_400 - 1)));
        assert!(!day.contains(&at(86_399)));
    }

    #[test]
    fn test_closures_are_periods() {
        let even = |instant: &Instant| instant.timestamp() % 2 == 0;
        assert!(Period::contains(&even, &at(4)));
        assert!(!Period::contains(&even, &at(5)));

        let range = at(0)..at(10);
        let half_open = move |instant: &Instant| range.contains(instant);
        assert!(Period::contains(&half_open, &at(0)));
        assert!(!Period::contains(&half_open, &at(10)));
    }
}
