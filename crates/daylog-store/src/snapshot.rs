//! An immutable view of everything fetched from the backend.

use chrono::{DateTime, NaiveDate, Utc};
use daylog_core::{
    Category, DayItem, Diary, DisplayEvent, Event, Todo, bucket, diaries_on, normalize,
};

/// Events, todos, diaries and categories as of one fetch.
///
/// Categories carry merged visibility. Todos are kept in list order and
/// diaries newest first.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub events: Vec<Event>,
    pub todos: Vec<Todo>,
    pub diaries: Vec<Diary>,
    pub categories: Vec<Category>,
    /// When the data was fetched. `None` until the first fetch lands.
    pub fetched_at: Option<DateTime<Utc>>,
    /// Ticket generation of the fetch that produced this snapshot.
    pub generation: u64,
}

impl Snapshot {
    /// True until the first fetch has been applied.
    pub fn is_empty_initial(&self) -> bool {
        self.fetched_at.is_none()
    }

    /// Items on `date`: visible events first, then visible todos.
    pub fn day(&self, date: NaiveDate) -> Vec<DayItem> {
        bucket(date, &self.events, &self.todos, &self.categories)
    }

    pub fn event(&self, id: i64) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// The display form of one event.
    pub fn display_event(&self, id: i64) -> Option<DisplayEvent> {
        self.event(id).map(|e| normalize(e, &self.categories))
    }

    pub fn todo(&self, id: i64) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    pub fn category(&self, id: i64) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn diary(&self, id: i64) -> Option<&Diary> {
        self.diaries.iter().find(|d| d.id == id)
    }

    /// Diary entries written for `date`, earliest first. Category
    /// visibility does not apply to diaries.
    pub fn diaries_on(&self, date: NaiveDate) -> Vec<&Diary> {
        diaries_on(date, &self.diaries)
    }
}
