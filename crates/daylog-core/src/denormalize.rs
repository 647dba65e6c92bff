//! User selection to storage form.
//!
//! Calendar interactions come in three shapes (a clicked day, a dragged
//! range with an exclusive end, explicit picker values). Each is turned into
//! the inclusive [`EventTimes`] the backend persists. [`EventDraft`] holds the
//! event form state and applies the edit and all-day toggle rules.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event::{Event, EventTimes};
use crate::time::{self, DayRange};

/// A calendar interaction that yields event times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Selection {
    /// A single clicked day (also the "new event" default).
    Day { date: NaiveDate },
    /// A dragged range; `end_exclusive` is the first day not selected.
    Range {
        start: NaiveDate,
        end_exclusive: NaiveDate,
    },
    /// Explicit date-times from the pickers.
    Explicit {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// Converts a selection into persistable times.
pub fn denormalize(selection: &Selection) -> EventTimes {
    match *selection {
        Selection::Day { date } => EventTimes::all_day(DayRange::single(date)),
        Selection::Range {
            start,
            end_exclusive,
        } => EventTimes::all_day(DayRange::from_exclusive(start, end_exclusive)),
        Selection::Explicit { start, end } => EventTimes::timed(start, clamp_end(start, end)),
    }
}

/// Returns `end`, or `start + 1h` if `end` precedes `start`.
pub fn clamp_end(start: NaiveDateTime, end: NaiveDateTime) -> NaiveDateTime {
    if end < start {
        debug!(%start, %end, "end precedes start; clamping to one hour after start");
        time::plus_one_hour(start)
    } else {
        end
    }
}

/// Hour of day a newly timed event starts at: the next full hour after `now`.
///
/// Hour 0 is shown as 12 on the 12-hour clock the form uses, so a start that
/// would land on midnight is placed at noon instead.
pub fn next_full_hour(now: NaiveDateTime) -> u32 {
    match (now.hour() + 1) % 24 {
        0 => 12,
        hour => hour,
    }
}

/// One-hour slot on `day` starting at the next full hour after `now`.
///
/// A slot starting at 23:00 ends at midnight of the following day.
fn timed_slot(day: NaiveDate, now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let hour = next_full_hour(now);
    let start = day.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN));
    let end = if hour >= 23 {
        time::start_of_day(time::next_day(day))
    } else {
        time::plus_one_hour(start)
    };
    (start, end)
}

/// Editable event form state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    start: NaiveDateTime,
    end: NaiveDateTime,
    all_day: bool,
}

impl EventDraft {
    /// Creates a draft from a calendar selection.
    pub fn from_selection(selection: &Selection) -> Self {
        Self::from_times(denormalize(selection))
    }

    /// Creates a draft for editing an existing event.
    pub fn from_event(event: &Event) -> Self {
        Self::from_times(event.times())
    }

    fn from_times(times: EventTimes) -> Self {
        Self {
            start: times.start_time,
            end: times.end_time,
            all_day: times.all_day,
        }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn is_all_day(&self) -> bool {
        self.all_day
    }

    /// Sets the start.
    ///
    /// In all-day mode only the day is kept. If the new start passes the
    /// current end, the end moves to keep the range ordered.
    pub fn set_start(&mut self, start: NaiveDateTime) {
        if self.all_day {
            self.start = time::start_of_day(start.date());
            if self.end.date() < start.date() {
                self.end = time::end_of_day(start.date());
            }
        } else {
            self.start = start;
            self.end = clamp_end(self.start, self.end);
        }
    }

    /// Sets the end, clamping an end before the start to `start + 1h`.
    ///
    /// In all-day mode only the day is kept, and a day before the start day
    /// collapses to the start day.
    pub fn set_end(&mut self, end: NaiveDateTime) {
        if self.all_day {
            self.end = time::end_of_day(end.date().max(self.start.date()));
        } else {
            self.end = clamp_end(self.start, end);
        }
    }

    /// Switches between all-day and timed mode.
    ///
    /// Timed to all-day snaps the start day to midnight and the end day to
    /// `23:59:59.999`. An end exactly on midnight counts as the day before.
    /// All-day to timed places a one-hour slot on the start day at the next
    /// full hour after `now`. Setting the current mode is a no-op.
    pub fn set_all_day(&mut self, all_day: bool, now: NaiveDateTime) {
        if all_day == self.all_day {
            return;
        }
        if all_day {
            // A timed end on midnight closes the previous day.
            let last = if time::is_midnight(self.end) && self.end > self.start {
                time::previous_day(self.end.date())
            } else {
                self.end.date()
            };
            let (start, end) = DayRange::new(self.start.date(), last).to_stored();
            self.start = start;
            self.end = end;
        } else {
            let (start, end) = timed_slot(self.start.date(), now);
            self.start = start;
            self.end = end;
        }
        self.all_day = all_day;
    }

    /// Returns the persistable times.
    pub fn times(&self) -> EventTimes {
        EventTimes {
            start_time: self.start,
            end_time: self.end,
            all_day: self.all_day,
        }
    }
}
