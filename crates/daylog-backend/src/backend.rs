//! Backend trait definition.
//!
//! A [`Backend`] is where events, todos, diaries and categories live. The REST
//! backend talks to the daylog server; the file backend keeps the same
//! collections in a local JSON document.

use std::future::Future;
use std::pin::Pin;

use daylog_core::{Category, Diary, Event, Todo, VisibilityRecord};
use daylog_protocol::{DiaryRequest, EventDto, TodoDto};

use crate::error::{BackendError, BackendResult};

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe so callers can hold a
/// `&dyn Backend`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Storage for the user's calendar data.
///
/// Reads return core types; incoming bodies are converted and validated
/// by the implementation. Mutations return the stored result so callers
/// can update their snapshot without a full refetch.
pub trait Backend: Send + Sync {
    /// Returns the backend name ("rest", "file").
    fn name(&self) -> &str;

    fn fetch_events(&self) -> BoxFuture<'_, BackendResult<Vec<Event>>>;

    fn fetch_todos(&self) -> BoxFuture<'_, BackendResult<Vec<Todo>>>;

    /// Lists categories. Visibility is not applied here; see
    /// [`Backend::fetch_visibility`].
    fn fetch_categories(&self) -> BoxFuture<'_, BackendResult<Vec<Category>>>;

    /// Lists the per-user visibility records.
    fn fetch_visibility(&self) -> BoxFuture<'_, BackendResult<Vec<VisibilityRecord>>>;

    /// Creates an event (`id` is `None`) or replaces an existing one.
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` error when updating an id that does not exist.
    fn save_event(&self, id: Option<i64>, event: EventDto)
    -> BoxFuture<'_, BackendResult<Event>>;

    fn delete_event(&self, id: i64) -> BoxFuture<'_, BackendResult<()>>;

    /// Creates a todo (`id` is `None`) or merges `todo` into an existing
    /// one. Absent fields are left unchanged on update.
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` error for an unknown todo or category id.
    fn save_todo(&self, id: Option<i64>, todo: TodoDto) -> BoxFuture<'_, BackendResult<Todo>>;

    fn delete_todo(&self, id: i64) -> BoxFuture<'_, BackendResult<()>>;

    /// Sets a todo's progress. The backend clamps it to `0..=100` and
    /// derives completion.
    fn update_todo_progress(&self, id: i64, progress: i64) -> BoxFuture<'_, BackendResult<Todo>>;

    fn set_category_visibility(
        &self,
        category_id: i64,
        visible: bool,
    ) -> BoxFuture<'_, BackendResult<VisibilityRecord>>;

    /// Lists diaries, newest first.
    fn fetch_diaries(&self) -> BoxFuture<'_, BackendResult<Vec<Diary>>>;

    /// Creates a diary or replaces an existing one. The related ids in the
    /// request replace the stored links.
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` error for an unknown diary, event or todo id.
    fn save_diary(
        &self,
        id: Option<i64>,
        diary: DiaryRequest,
    ) -> BoxFuture<'_, BackendResult<Diary>>;

    fn delete_diary(&self, id: i64) -> BoxFuture<'_, BackendResult<()>>;
}

/// A backend that always returns an error.
///
/// Stands in for a backend that failed to initialize, so the failure is
/// reported on first use.
#[derive(Debug)]
pub struct ErrorBackend {
    name: String,
    error: BackendError,
}

impl ErrorBackend {
    pub fn new(name: impl Into<String>, error: BackendError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }

    fn fail<T: Send + 'static>(&self) -> BoxFuture<'_, BackendResult<T>> {
        let error =
            BackendError::new(self.error.code(), self.error.message()).with_backend(&self.name);
        Box::pin(async move { Err(error) })
    }
}

impl Backend for ErrorBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_events(&self) -> BoxFuture<'_, BackendResult<Vec<Event>>> {
        self.fail()
    }

    fn fetch_todos(&self) -> BoxFuture<'_, BackendResult<Vec<Todo>>> {
        self.fail()
    }

    fn fetch_categories(&self) -> BoxFuture<'_, BackendResult<Vec<Category>>> {
        self.fail()
    }

    fn fetch_visibility(&self) -> BoxFuture<'_, BackendResult<Vec<VisibilityRecord>>> {
        self.fail()
    }

    fn save_event(
        &self,
        _id: Option<i64>,
        _event: EventDto,
    ) -> BoxFuture<'_, BackendResult<Event>> {
        self.fail()
    }

    fn delete_event(&self, _id: i64) -> BoxFuture<'_, BackendResult<()>> {
        self.fail()
    }

    fn save_todo(&self, _id: Option<i64>, _todo: TodoDto) -> BoxFuture<'_, BackendResult<Todo>> {
        self.fail()
    }

    fn delete_todo(&self, _id: i64) -> BoxFuture<'_, BackendResult<()>> {
        self.fail()
    }

    fn update_todo_progress(
        &self,
        _id: i64,
        _progress: i64,
    ) -> BoxFuture<'_, BackendResult<Todo>> {
        self.fail()
    }

    fn set_category_visibility(
        &self,
        _category_id: i64,
        _visible: bool,
    ) -> BoxFuture<'_, BackendResult<VisibilityRecord>> {
        self.fail()
    }

    fn fetch_diaries(&self) -> BoxFuture<'_, BackendResult<Vec<Diary>>> {
        self.fail()
    }

    fn save_diary(
        &self,
        _id: Option<i64>,
        _diary: DiaryRequest,
    ) -> BoxFuture<'_, BackendResult<Diary>> {
        self.fail()
    }

    fn delete_diary(&self, _id: i64) -> BoxFuture<'_, BackendResult<()>> {
        self.fail()
    }
}
