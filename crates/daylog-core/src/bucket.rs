//! Day buckets: the events and todos active on one calendar day.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::category::{Category, CategoryIndex};
use crate::event::{DisplayEvent, Event};
use crate::normalize::normalize_with;
use crate::todo::{Todo, TodoView};

/// One renderable entry of a day bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DayItem {
    Event(DisplayEvent),
    Todo(TodoView),
}

impl DayItem {
    /// Returns the item ID.
    pub fn id(&self) -> i64 {
        match self {
            Self::Event(e) => e.id,
            Self::Todo(t) => t.id,
        }
    }

    /// Returns the item title.
    pub fn title(&self) -> &str {
        match self {
            Self::Event(e) => &e.title,
            Self::Todo(t) => &t.title,
        }
    }

    /// Returns the resolved display color.
    pub fn display_color(&self) -> &str {
        match self {
            Self::Event(e) => &e.display_color,
            Self::Todo(t) => &t.display_color,
        }
    }

    pub fn is_event(&self) -> bool {
        matches!(self, Self::Event(_))
    }

    pub fn is_todo(&self) -> bool {
        matches!(self, Self::Todo(_))
    }
}

/// Returns the items on `date`.
///
/// Items tagged with a hidden category are dropped first. Events come before
/// todos. Events are ordered all-day first, then by start, then by id; todos
/// by due date, then by id.
pub fn bucket(
    date: NaiveDate,
    events: &[Event],
    todos: &[Todo],
    categories: &[Category],
) -> Vec<DayItem> {
    let index = CategoryIndex::new(categories);

    let mut day_events: Vec<&Event> = events
        .iter()
        .filter(|e| index.is_visible(e.category.as_ref()))
        .filter(|e| e.occurs_on(date))
        .collect();
    day_events.sort_by(|a, b| event_order(a, b));

    let mut day_todos: Vec<(&Todo, NaiveDateTime)> = todos
        .iter()
        .filter(|t| index.is_visible(t.category.as_ref()))
        .filter(|t| t.occurs_on(date))
        .filter_map(|t| t.due_date.map(|due| (t, due)))
        .collect();
    day_todos.sort_by(|(a, a_due), (b, b_due)| a_due.cmp(b_due).then(a.id.cmp(&b.id)));

    let mut items = Vec::with_capacity(day_events.len() + day_todos.len());
    items.extend(
        day_events
            .into_iter()
            .map(|e| DayItem::Event(normalize_with(e, &index))),
    );
    items.extend(day_todos.into_iter().map(|(t, due)| {
        DayItem::Todo(TodoView {
            id: t.id,
            title: t.title.clone(),
            due_date: due,
            progress: t.progress.value(),
            complete: t.is_complete(),
            display_color: index.resolve_color(t.color.as_deref(), t.category.as_ref()),
            category_id: t.category.as_ref().map(|c| c.id),
        })
    }));
    items
}

fn event_order(a: &Event, b: &Event) -> Ordering {
    b.all_day
        .cmp(&a.all_day)
        .then(a.start_time.cmp(&b.start_time))
        .then(a.id.cmp(&b.id))
}
