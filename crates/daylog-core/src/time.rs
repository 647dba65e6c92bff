//! Calendar-day arithmetic for event times.
//!
//! The backend stores all-day events as an inclusive range of whole days:
//! midnight of the first day through `23:59:59.999` of the last day. The
//! calendar grid works with exclusive end boundaries instead. This module
//! provides the day-boundary helpers both directions build on, and
//! [`DayRange`] for inclusive ranges of calendar days.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

/// Returns the time of day used as the inclusive end of an all-day event.
pub fn end_of_day_time() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).expect("valid time")
}

/// Returns midnight at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Returns `23:59:59.999` on `date`.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(end_of_day_time())
}

/// Returns the calendar day after `date`.
///
/// Saturates at the last representable date.
pub fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}

/// Returns the calendar day before `date`.
///
/// Saturates at the first representable date.
pub fn previous_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(date)
}

/// Returns true if `dt` sits on the inclusive end-of-day sentinel.
///
/// Only hour, minute and second are compared; the millisecond part is not
/// significant because the backend may truncate it.
pub fn is_end_of_day_sentinel(dt: NaiveDateTime) -> bool {
    dt.hour() == 23 && dt.minute() == 59 && dt.second() == 59
}

/// Returns true if `dt` is exactly midnight.
pub fn is_midnight(dt: NaiveDateTime) -> bool {
    dt.time() == NaiveTime::MIN
}

/// Adds one hour to `dt`, saturating at the end of the representable range.
pub fn plus_one_hour(dt: NaiveDateTime) -> NaiveDateTime {
    dt.checked_add_signed(TimeDelta::hours(1)).unwrap_or(dt)
}

/// An inclusive range of calendar days.
///
/// `first <= last` always holds; constructors reorder or clamp inputs rather
/// than building an inverted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DayRange {
    /// First day of the range (inclusive).
    pub first: NaiveDate,
    /// Last day of the range (inclusive).
    pub last: NaiveDate,
}

impl DayRange {
    /// Creates a range covering `first..=last`.
    ///
    /// If `last` precedes `first` the range collapses to the single day `first`.
    pub fn new(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            first,
            last: last.max(first),
        }
    }

    /// Creates a range covering a single day.
    pub fn single(date: NaiveDate) -> Self {
        Self {
            first: date,
            last: date,
        }
    }

    /// Creates a range from a start day and an exclusive end day, as reported
    /// by the calendar grid for drag selections.
    pub fn from_exclusive(start: NaiveDate, end_exclusive: NaiveDate) -> Self {
        Self::new(start, previous_day(end_exclusive))
    }

    /// Returns true if `date` falls within the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }

    /// Returns the number of days covered.
    pub fn len_days(&self) -> i64 {
        (self.last - self.first).num_days() + 1
    }

    /// Returns the stored timestamps for this range: midnight of the first day
    /// and `23:59:59.999` of the last day.
    pub fn to_stored(&self) -> (NaiveDateTime, NaiveDateTime) {
        (start_of_day(self.first), end_of_day(self.last))
    }

    /// Returns the exclusive end boundary: midnight after the last day.
    pub fn exclusive_end(&self) -> NaiveDateTime {
        start_of_day(next_day(self.last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, s).unwrap()
    }

    mod boundaries {
        use super::*;

        #[test]
        fn start_and_end_of_day() {
            let d = date(2024, 3, 10);
            assert_eq!(start_of_day(d), dt(2024, 3, 10, 0, 0, 0));
            assert_eq!(
                end_of_day(d),
                date(2024, 3, 10).and_hms_milli_opt(23, 59, 59, 999).unwrap()
            );
        }

        #[test]
        fn sentinel_ignores_milliseconds() {
            assert!(is_end_of_day_sentinel(dt(2024, 3, 12, 23, 59, 59)));
            assert!(is_end_of_day_sentinel(end_of_day(date(2024, 3, 12))));
            assert!(!is_end_of_day_sentinel(dt(2024, 3, 12, 23, 59, 0)));
            assert!(!is_end_of_day_sentinel(dt(2024, 3, 12, 0, 0, 0)));
        }

        #[test]
        fn day_steps_cross_months_and_years() {
            assert_eq!(next_day(date(2024, 2, 29)), date(2024, 3, 1));
            assert_eq!(next_day(date(2024, 12, 31)), date(2025, 1, 1));
            assert_eq!(previous_day(date(2024, 3, 1)), date(2024, 2, 29));
        }

        #[test]
        fn day_steps_saturate() {
            assert_eq!(next_day(NaiveDate::MAX), NaiveDate::MAX);
            assert_eq!(previous_day(NaiveDate::MIN), NaiveDate::MIN);
        }

        #[test]
        fn one_hour_later() {
            assert_eq!(
                plus_one_hour(dt(2024, 3, 10, 23, 30, 0)),
                dt(2024, 3, 11, 0, 30, 0)
            );
        }
    }

    mod day_range {
        use super::*;

        #[test]
        fn inverted_input_collapses() {
            let range = DayRange::new(date(2024, 3, 10), date(2024, 3, 8));
            assert_eq!(range, DayRange::single(date(2024, 3, 10)));
            assert_eq!(range.len_days(), 1);
        }

        #[test]
        fn from_exclusive_end() {
            let range = DayRange::from_exclusive(date(2024, 3, 10), date(2024, 3, 13));
            assert_eq!(range.first, date(2024, 3, 10));
            assert_eq!(range.last, date(2024, 3, 12));
            assert_eq!(range.len_days(), 3);
        }

        #[test]
        fn from_exclusive_end_equal_to_start() {
            let range = DayRange::from_exclusive(date(2024, 3, 10), date(2024, 3, 10));
            assert_eq!(range, DayRange::single(date(2024, 3, 10)));
        }

        #[test]
        fn contains_is_inclusive() {
            let range = DayRange::new(date(2024, 3, 10), date(2024, 3, 12));
            assert!(!range.contains(date(2024, 3, 9)));
            assert!(range.contains(date(2024, 3, 10)));
            assert!(range.contains(date(2024, 3, 11)));
            assert!(range.contains(date(2024, 3, 12)));
            assert!(!range.contains(date(2024, 3, 13)));
        }

        #[test]
        fn stored_and_exclusive_forms() {
            let range = DayRange::new(date(2024, 3, 10), date(2024, 3, 12));
            let (start, end) = range.to_stored();
            assert_eq!(start, dt(2024, 3, 10, 0, 0, 0));
            assert_eq!(end, end_of_day(date(2024, 3, 12)));
            assert_eq!(range.exclusive_end(), dt(2024, 3, 13, 0, 0, 0));
        }

        #[test]
        fn serde_roundtrip() {
            let range = DayRange::new(date(2024, 3, 10), date(2024, 3, 12));
            let json = serde_json::to_string(&range).unwrap();
            let parsed: DayRange = serde_json::from_str(&json).unwrap();
            assert_eq!(range, parsed);
        }
    }
}
