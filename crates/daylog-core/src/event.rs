//! Event types for calendar events.
//!
//! This module provides core types for representing calendar events:
//! - [`Event`]: An event as persisted by the backend (inclusive all-day end)
//! - [`EventTimes`]: The persistable time triple produced from user input
//! - [`DisplayEvent`]: A display-ready event with an exclusive end boundary

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::category::CategoryRef;
use crate::time::{self, DayRange};

/// The start/end/all-day triple as the backend persists it.
///
/// For all-day values `start_time` is midnight of the first day and
/// `end_time` is `23:59:59.999` of the last day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTimes {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub all_day: bool,
}

impl EventTimes {
    /// Creates all-day times spanning `range`.
    pub fn all_day(range: DayRange) -> Self {
        let (start_time, end_time) = range.to_stored();
        Self {
            start_time,
            end_time,
            all_day: true,
        }
    }

    /// Creates timed values.
    pub fn timed(start_time: NaiveDateTime, end_time: NaiveDateTime) -> Self {
        Self {
            start_time,
            end_time,
            all_day: false,
        }
    }
}

/// A calendar event as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Server-assigned identifier.
    pub id: i64,
    /// The event title.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// When the event starts.
    pub start_time: NaiveDateTime,
    /// When the event ends (inclusive `23:59:59.999` for all-day events).
    pub end_time: NaiveDateTime,
    /// Whether this is an all-day event.
    pub all_day: bool,
    /// The category this event is tagged with.
    pub category: Option<CategoryRef>,
    /// Explicit color override.
    pub color: Option<String>,
}

impl Event {
    /// Creates a new event from persisted times.
    pub fn new(id: i64, title: impl Into<String>, times: EventTimes) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            start_time: times.start_time,
            end_time: times.end_time,
            all_day: times.all_day,
            category: None,
            color: None,
        }
    }

    /// Returns the persisted time triple.
    pub fn times(&self) -> EventTimes {
        EventTimes {
            start_time: self.start_time,
            end_time: self.end_time,
            all_day: self.all_day,
        }
    }

    /// Returns the calendar day the event starts on.
    pub fn start_date(&self) -> NaiveDate {
        self.start_time.date()
    }

    /// Returns the inclusive range of days an all-day event covers.
    ///
    /// Timed events occupy only their start day.
    pub fn day_range(&self) -> DayRange {
        if self.all_day {
            DayRange::new(self.start_time.date(), self.end_time.date())
        } else {
            DayRange::single(self.start_time.date())
        }
    }

    /// Returns true if the event is on `date`.
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.day_range().contains(date)
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to set the category.
    pub fn with_category(mut self, category: CategoryRef) -> Self {
        self.category = Some(category);
        self
    }

    /// Builder method to set the color override.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// A display-ready event for a calendar grid.
///
/// `display_end` is an exclusive boundary: the event covers
/// `display_start..display_end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayEvent {
    /// The event ID.
    pub id: i64,
    /// The event title.
    pub title: String,
    /// Start of the display range (inclusive).
    pub display_start: NaiveDateTime,
    /// End of the display range (exclusive).
    pub display_end: NaiveDateTime,
    /// Whether this is an all-day event.
    pub all_day: bool,
    /// Resolved display color.
    pub display_color: String,
    /// Category ID, if tagged.
    pub category_id: Option<i64>,
    /// The event description, if available.
    pub description: Option<String>,
}

impl DisplayEvent {
    /// Converts the display range back to persisted times.
    ///
    /// An all-day event whose exclusive end sits on midnight is trimmed to
    /// `23:59:59.999` of the previous day. Anything else passes through.
    pub fn to_stored_times(&self) -> EventTimes {
        if self.all_day && time::is_midnight(self.display_end) {
            EventTimes::all_day(DayRange::from_exclusive(
                self.display_start.date(),
                self.display_end.date(),
            ))
        } else {
            EventTimes {
                start_time: self.display_start,
                end_time: self.display_end,
                all_day: self.all_day,
            }
        }
    }

    /// Returns the duration of the display range in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.display_end - self.display_start).num_minutes()
    }
}
