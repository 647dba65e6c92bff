//! Todo items, progress and list ordering.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::category::CategoryRef;

/// Completion progress in percent, always within `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct Progress(u8);

impl Progress {
    /// Fully complete.
    pub const COMPLETE: Progress = Progress(100);

    /// Creates a progress value, clamping into `0..=100`.
    pub fn new(value: i64) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    /// Returns the percentage.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Returns true at 100%.
    pub fn is_complete(self) -> bool {
        self.0 == 100
    }
}

impl From<i64> for Progress {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<Progress> for i64 {
    fn from(progress: Progress) -> Self {
        i64::from(progress.0)
    }
}

/// A todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Server-assigned identifier.
    pub id: i64,
    /// The todo title.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Completion progress.
    pub progress: Progress,
    /// When the todo is due.
    pub due_date: Option<NaiveDateTime>,
    /// Whether the todo is shown on the calendar on its due day.
    pub show_in_calendar: bool,
    /// The category this todo is tagged with.
    pub category: Option<CategoryRef>,
    /// Explicit color override.
    pub color: Option<String>,
    /// When the todo was created, if known.
    pub created_at: Option<NaiveDateTime>,
}

impl Todo {
    /// Creates a todo with no due date and zero progress.
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            progress: Progress::default(),
            due_date: None,
            show_in_calendar: false,
            category: None,
            color: None,
            created_at: None,
        }
    }

    /// Returns true if progress is 100%.
    pub fn is_complete(&self) -> bool {
        self.progress.is_complete()
    }

    /// Returns true if the todo should appear on the calendar on `date`.
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.show_in_calendar && self.due_date.is_some_and(|due| due.date() == date)
    }

    /// Builder method to set the due date and calendar flag.
    pub fn with_due(mut self, due: NaiveDateTime, show_in_calendar: bool) -> Self {
        self.due_date = Some(due);
        self.show_in_calendar = show_in_calendar;
        self
    }

    /// Builder method to set progress (clamped).
    pub fn with_progress(mut self, progress: i64) -> Self {
        self.progress = Progress::new(progress);
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

/// A display-ready todo for a day bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoView {
    pub id: i64,
    pub title: String,
    pub due_date: NaiveDateTime,
    pub progress: u8,
    /// Render with "complete" styling.
    pub complete: bool,
    pub display_color: String,
    pub category_id: Option<i64>,
}

/// Ordering used by todo lists: incomplete first, then todos with a due
/// date before those without, then by ascending due date.
pub fn list_order(a: &Todo, b: &Todo) -> Ordering {
    a.is_complete()
        .cmp(&b.is_complete())
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// Sorts todos in list order. The sort is stable.
pub fn sort_for_list(todos: &mut [Todo]) {
    todos.sort_by(list_order);
}
