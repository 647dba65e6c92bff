//! JSON bodies exchanged with the daylog REST backend.
//!
//! Field names follow the backend's camelCase convention. Incoming bodies
//! are lenient: nullable columns map to `Option` and are defaulted when
//! converted into core types.

use chrono::NaiveDateTime;
use daylog_core::{
    Category, CategoryRef, Diary, Event, EventDraft, EventTimes, Progress, Todo, VisibilityRecord,
};
use serde::{Deserialize, Serialize};

use crate::datetime;
use crate::error::{ProtocolError, ProtocolResult};

/// A category as embedded in events and todos, and as listed by
/// `GET /api/categories`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CategoryDto {
    /// A reference carrying only the id, as sent in outgoing payloads.
    pub fn reference(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Converts into a listed category. Visibility starts out true and is
    /// merged later from the visibility records.
    pub fn into_category(self) -> ProtocolResult<Category> {
        let id = self.id.ok_or(ProtocolError::missing("category", "id"))?;
        let mut category = Category::new(id, self.name.unwrap_or_default());
        category.color = self.color;
        Ok(category)
    }

    /// Converts an embedded category into a reference. Embedded categories
    /// without an id are dropped.
    pub fn into_ref(self) -> Option<CategoryRef> {
        let id = self.id?;
        Some(CategoryRef {
            id,
            name: self.name,
            color: self.color,
        })
    }
}

impl From<&Category> for CategoryDto {
    fn from(category: &Category) -> Self {
        Self {
            id: Some(category.id),
            name: Some(category.name.clone()),
            color: category.color.clone(),
        }
    }
}

/// A calendar event body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "datetime")]
    pub start_time: NaiveDateTime,
    #[serde(with = "datetime")]
    pub end_time: NaiveDateTime,
    #[serde(default)]
    pub all_day: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryDto>,
    #[serde(
        default,
        with = "datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<NaiveDateTime>,
    #[serde(
        default,
        with = "datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<NaiveDateTime>,
}

impl EventDto {
    /// Builds an outgoing payload from an edited draft.
    ///
    /// The draft already holds stored-form times, so they are sent as-is.
    pub fn from_draft(draft: &EventDraft, title: impl Into<String>) -> Self {
        Self::from_times(title.into(), draft.times())
    }

    /// Builds an outgoing payload from an existing event. The category is
    /// reduced to its id.
    pub fn from_event(event: &Event) -> Self {
        Self {
            id: Some(event.id),
            description: event.description.clone(),
            color: event.color.clone(),
            category: event.category.as_ref().map(|c| CategoryDto::reference(c.id)),
            ..Self::from_times(event.title.clone(), event.times())
        }
    }

    fn from_times(title: String, times: EventTimes) -> Self {
        Self {
            id: None,
            title,
            description: None,
            start_time: times.start_time,
            end_time: times.end_time,
            all_day: Some(times.all_day),
            color: None,
            category: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_category_id(mut self, id: i64) -> Self {
        self.category = Some(CategoryDto::reference(id));
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Converts a backend event into the core model.
    pub fn into_event(self) -> ProtocolResult<Event> {
        let id = self.id.ok_or(ProtocolError::missing("event", "id"))?;
        Ok(Event {
            id,
            title: self.title,
            description: self.description,
            start_time: self.start_time,
            end_time: self.end_time,
            all_day: self.all_day.unwrap_or(false),
            category: self.category.and_then(CategoryDto::into_ref),
            color: self.color,
        })
    }
}

/// A todo body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub progress: Option<i64>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub show_in_calendar: Option<bool>,
    #[serde(
        default,
        with = "datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryDto>,
    #[serde(
        default,
        with = "datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<NaiveDateTime>,
    #[serde(
        default,
        with = "datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<NaiveDateTime>,
}

impl TodoDto {
    /// An outgoing create body with only a title set.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: None,
            progress: None,
            completed: None,
            show_in_calendar: None,
            due_date: None,
            color: None,
            category: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Builds a full update body from an existing todo. The category is
    /// reduced to its id.
    pub fn from_todo(todo: &Todo) -> Self {
        Self {
            id: Some(todo.id),
            description: todo.description.clone(),
            progress: Some(i64::from(todo.progress)),
            completed: Some(todo.is_complete()),
            show_in_calendar: Some(todo.show_in_calendar),
            due_date: todo.due_date,
            color: todo.color.clone(),
            category: todo.category.as_ref().map(|c| CategoryDto::reference(c.id)),
            ..Self::new(todo.title.clone())
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_due_date(mut self, due: NaiveDateTime) -> Self {
        self.due_date = Some(due);
        self
    }

    #[must_use]
    pub fn with_show_in_calendar(mut self, show: bool) -> Self {
        self.show_in_calendar = Some(show);
        self
    }

    #[must_use]
    pub fn with_category_id(mut self, id: i64) -> Self {
        self.category = Some(CategoryDto::reference(id));
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Merges an update body the way the backend does on `PUT`: fields
    /// present in `update` overwrite, absent ones are kept. An empty title
    /// counts as absent.
    pub fn merge(&mut self, update: TodoDto) {
        if !update.title.is_empty() {
            self.title = update.title;
        }
        if update.description.is_some() {
            self.description = update.description;
        }
        if update.show_in_calendar.is_some() {
            self.show_in_calendar = update.show_in_calendar;
        }
        if update.due_date.is_some() {
            self.due_date = update.due_date;
        }
        if let Some(progress) = update.progress {
            self.apply_progress(progress);
        }
        if update.category.as_ref().is_some_and(|c| c.id.is_some()) {
            self.category = update.category;
        }
        if update.color.is_some() {
            self.color = update.color;
        }
    }

    /// Applies a progress update the way the backend does: clamp to
    /// `0..=100` and derive the completed flag.
    pub fn apply_progress(&mut self, progress: i64) {
        let progress = Progress::new(progress);
        self.progress = Some(i64::from(progress.value()));
        self.completed = Some(progress.is_complete());
    }

    /// Converts a backend todo into the core model.
    ///
    /// Progress is clamped. A todo flagged completed with no progress
    /// reads as fully done.
    pub fn into_todo(self) -> ProtocolResult<Todo> {
        let id = self.id.ok_or(ProtocolError::missing("todo", "id"))?;
        let progress = match (self.progress, self.completed) {
            (Some(p), _) => Progress::new(p),
            (None, Some(true)) => Progress::COMPLETE,
            (None, _) => Progress::default(),
        };
        Ok(Todo {
            id,
            title: self.title,
            description: self.description,
            progress,
            due_date: self.due_date,
            show_in_calendar: self.show_in_calendar.unwrap_or(false),
            category: self.category.and_then(CategoryDto::into_ref),
            color: self.color,
            created_at: self.created_at,
        })
    }
}

/// A diary body as returned by `GET /api/diaries`.
///
/// Related events and todos arrive embedded; only their ids are kept when
/// converting. The image fields are not read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, with = "datetime::option")]
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub related_events: Vec<EventDto>,
    #[serde(default)]
    pub related_todos: Vec<TodoDto>,
    #[serde(
        default,
        with = "datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<NaiveDateTime>,
    #[serde(
        default,
        with = "datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<NaiveDateTime>,
}

impl DiaryDto {
    /// Ids of the embedded related events.
    pub fn related_event_ids(&self) -> Vec<i64> {
        self.related_events.iter().filter_map(|e| e.id).collect()
    }

    /// Ids of the embedded related todos.
    pub fn related_todo_ids(&self) -> Vec<i64> {
        self.related_todos.iter().filter_map(|t| t.id).collect()
    }

    /// Converts a backend diary into the core model.
    pub fn into_diary(self) -> ProtocolResult<Diary> {
        let id = self.id.ok_or(ProtocolError::missing("diary", "id"))?;
        let date = self.date.ok_or(ProtocolError::missing("diary", "date"))?;
        Ok(Diary {
            id,
            related_events: self.related_event_ids(),
            related_todos: self.related_todo_ids(),
            title: self.title,
            content: self.content,
            date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// A diary create or update request.
///
/// The backend takes these as `multipart/form-data`, see
/// [`DiaryRequest::form_fields`]. An absent date means now, on update too.
/// Related ids replace the existing links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(
        default,
        with = "datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub related_events: Vec<i64>,
    #[serde(default)]
    pub related_todos: Vec<i64>,
}

impl DiaryRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// A request that keeps every field of `diary`.
    pub fn from_diary(diary: &Diary) -> Self {
        Self {
            title: diary.title.clone(),
            content: diary.content.clone(),
            date: Some(diary.date),
            related_events: diary.related_events.clone(),
            related_todos: diary.related_todos.clone(),
        }
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    #[must_use]
    pub fn with_date(mut self, date: NaiveDateTime) -> Self {
        self.date = Some(date);
        self
    }

    /// Form fields in send order. List fields repeat their name once per id.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("title", self.title.clone()), ("content", self.content.clone())];
        if let Some(date) = &self.date {
            fields.push(("date", datetime::format(date)));
        }
        fields.extend(self.related_events.iter().map(|id| ("relatedEvents", id.to_string())));
        fields.extend(self.related_todos.iter().map(|id| ("relatedTodos", id.to_string())));
        fields
    }
}

/// A per-user visibility record from `GET /api/categories/visibility`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryVisibilityDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub category_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    /// A null flag reads as visible.
    #[serde(default)]
    pub visible: Option<bool>,
}

impl CategoryVisibilityDto {
    pub fn new(category_id: i64, visible: bool) -> Self {
        Self {
            id: None,
            category_id,
            category_name: None,
            visible: Some(visible),
        }
    }
}

impl From<CategoryVisibilityDto> for VisibilityRecord {
    fn from(dto: CategoryVisibilityDto) -> Self {
        Self {
            category_id: dto.category_id,
            visible: dto.visible.unwrap_or(true),
        }
    }
}

/// Body of `PUT /api/todos/{id}/progress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub progress: i64,
}

/// Body of `PUT /api/categories/{id}/visibility`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityUpdate {
    pub visible: bool,
}

/// A single field validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// The backend's error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub status_code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Formatted `yyyy-MM-dd HH:mm:ss` by the backend; kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl ApiErrorResponse {
    /// The message followed by any field errors, for display.
    pub fn summary(&self) -> String {
        if self.errors.is_empty() {
            return self.message.clone();
        }
        let fields: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        format!("{} ({})", self.message, fields.join(", "))
    }
}

/// Every collection the client reads, in one document.
///
/// This is the on-disk format of the file backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub events: Vec<EventDto>,
    #[serde(default)]
    pub todos: Vec<TodoDto>,
    #[serde(default)]
    pub categories: Vec<CategoryDto>,
    #[serde(default)]
    pub visibility: Vec<CategoryVisibilityDto>,
    #[serde(default)]
    pub diaries: Vec<DiaryDto>,
}

impl Snapshot {
    /// The next free event id.
    pub fn next_event_id(&self) -> i64 {
        next_id(self.events.iter().map(|e| e.id))
    }

    /// The next free todo id.
    pub fn next_todo_id(&self) -> i64 {
        next_id(self.todos.iter().map(|t| t.id))
    }

    /// The next free diary id.
    pub fn next_diary_id(&self) -> i64 {
        next_id(self.diaries.iter().map(|d| d.id))
    }
}

fn next_id(ids: impl Iterator<Item = Option<i64>>) -> i64 {
    ids.flatten().max().unwrap_or(0) + 1
}
