//! Diary entries and their links to events and todos.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A diary entry.
///
/// A diary belongs to the calendar day of its `date` and may point at any
/// number of events and todos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diary {
    /// Server-assigned identifier.
    pub id: i64,
    pub title: String,
    pub content: String,
    /// When the entry was written for.
    pub date: NaiveDateTime,
    /// Ids of linked events.
    pub related_events: Vec<i64>,
    /// Ids of linked todos.
    pub related_todos: Vec<i64>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Diary {
    pub fn new(id: i64, title: impl Into<String>, date: NaiveDateTime) -> Self {
        Self {
            id,
            title: title.into(),
            content: String::new(),
            date,
            related_events: Vec::new(),
            related_todos: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    #[must_use]
    pub fn with_related_event(mut self, id: i64) -> Self {
        self.related_events.push(id);
        self
    }

    #[must_use]
    pub fn with_related_todo(mut self, id: i64) -> Self {
        self.related_todos.push(id);
        self
    }

    /// Returns true if the entry was written for `date`.
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.date.date() == date
    }

    /// Returns true if the entry has no links.
    pub fn is_standalone(&self) -> bool {
        self.related_events.is_empty() && self.related_todos.is_empty()
    }
}

/// Diary list order: newest first, ties by descending id.
pub fn newest_first(a: &Diary, b: &Diary) -> Ordering {
    b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id))
}

/// Sorts diaries newest first.
pub fn sort_diaries(diaries: &mut [Diary]) {
    diaries.sort_by(newest_first);
}

/// Entries written for `date`, earliest first.
pub fn diaries_on(date: NaiveDate, diaries: &[Diary]) -> Vec<&Diary> {
    let mut on_day: Vec<&Diary> = diaries.iter().filter(|d| d.occurs_on(date)).collect();
    on_day.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
    on_day
}
