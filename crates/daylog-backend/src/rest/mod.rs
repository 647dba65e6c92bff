//! REST backend for the daylog server.
//!
//! ```ignore
//! use daylog_backend::rest::{RestBackend, RestConfig};
//!
//! let config = RestConfig::new("http://localhost:8080")?.with_token(token);
//! let backend = RestBackend::new(config)?;
//! let events = backend.fetch_events().await?;
//! ```

mod client;
mod config;

pub use client::RestClient;
pub use config::RestConfig;

use daylog_core::{Category, Diary, Event, Todo, VisibilityRecord, sort_diaries};
use daylog_protocol::{
    CategoryDto, CategoryVisibilityDto, DiaryDto, DiaryRequest, EventDto, ProgressUpdate,
    ProtocolResult, TodoDto, VisibilityUpdate, paths,
};
use reqwest::Method;
use tracing::{debug, info};

use crate::backend::{Backend, BoxFuture};
use crate::error::{BackendError, BackendResult};

const NAME: &str = "rest";

/// Backend that talks to the daylog server over HTTP.
pub struct RestBackend {
    client: RestClient,
}

impl RestBackend {
    pub fn new(config: RestConfig) -> BackendResult<Self> {
        Ok(Self {
            client: RestClient::new(config)?,
        })
    }
}

fn tag<T>(result: BackendResult<T>) -> BackendResult<T> {
    result.map_err(|e| e.with_backend(NAME))
}

/// Converts every element, failing on the first invalid one.
fn convert_all<D, T>(items: Vec<D>, f: impl Fn(D) -> ProtocolResult<T>) -> BackendResult<Vec<T>> {
    items
        .into_iter()
        .map(|item| f(item).map_err(BackendError::from))
        .collect()
}

impl Backend for RestBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn fetch_events(&self) -> BoxFuture<'_, BackendResult<Vec<Event>>> {
        Box::pin(async move {
            let dtos: Vec<EventDto> = tag(self.client.get(paths::EVENTS).await)?;
            debug!(count = dtos.len(), "Fetched events");
            tag(convert_all(dtos, EventDto::into_event))
        })
    }

    fn fetch_todos(&self) -> BoxFuture<'_, BackendResult<Vec<Todo>>> {
        Box::pin(async move {
            let dtos: Vec<TodoDto> = tag(self.client.get(paths::TODOS).await)?;
            debug!(count = dtos.len(), "Fetched todos");
            tag(convert_all(dtos, TodoDto::into_todo))
        })
    }

    fn fetch_categories(&self) -> BoxFuture<'_, BackendResult<Vec<Category>>> {
        Box::pin(async move {
            let dtos: Vec<CategoryDto> = tag(self.client.get(paths::CATEGORIES).await)?;
            tag(convert_all(dtos, CategoryDto::into_category))
        })
    }

    fn fetch_visibility(&self) -> BoxFuture<'_, BackendResult<Vec<VisibilityRecord>>> {
        Box::pin(async move {
            let dtos: Vec<CategoryVisibilityDto> =
                tag(self.client.get(paths::CATEGORY_VISIBILITY).await)?;
            Ok(dtos.into_iter().map(VisibilityRecord::from).collect())
        })
    }

    fn save_event(
        &self,
        id: Option<i64>,
        mut event: EventDto,
    ) -> BoxFuture<'_, BackendResult<Event>> {
        Box::pin(async move {
            event.id = id;
            let saved: EventDto = match id {
                Some(id) => tag(self.client.send(Method::PUT, &paths::event(id), &event).await)?,
                None => tag(self.client.send(Method::POST, paths::EVENTS, &event).await)?,
            };
            let saved = tag(saved.into_event().map_err(BackendError::from))?;
            info!(id = saved.id, created = id.is_none(), "Saved event");
            Ok(saved)
        })
    }

    fn delete_event(&self, id: i64) -> BoxFuture<'_, BackendResult<()>> {
        Box::pin(async move {
            tag(self.client.delete(&paths::event(id)).await)?;
            info!(id, "Deleted event");
            Ok(())
        })
    }

    fn save_todo(&self, id: Option<i64>, mut todo: TodoDto) -> BoxFuture<'_, BackendResult<Todo>> {
        Box::pin(async move {
            todo.id = id;
            let saved: TodoDto = match id {
                Some(id) => tag(self.client.send(Method::PUT, &paths::todo(id), &todo).await)?,
                None => tag(self.client.send(Method::POST, paths::TODOS, &todo).await)?,
            };
            let saved = tag(saved.into_todo().map_err(BackendError::from))?;
            info!(id = saved.id, created = id.is_none(), "Saved todo");
            Ok(saved)
        })
    }

    fn delete_todo(&self, id: i64) -> BoxFuture<'_, BackendResult<()>> {
        Box::pin(async move {
            tag(self.client.delete(&paths::todo(id)).await)?;
            info!(id, "Deleted todo");
            Ok(())
        })
    }

    fn update_todo_progress(&self, id: i64, progress: i64) -> BoxFuture<'_, BackendResult<Todo>> {
        Box::pin(async move {
            let body = ProgressUpdate { progress };
            let dto: TodoDto = tag(
                self.client
                    .send(Method::PUT, &paths::todo_progress(id), &body)
                    .await,
            )?;
            let todo = tag(dto.into_todo().map_err(BackendError::from))?;
            info!(id, progress = todo.progress.value(), "Updated todo progress");
            Ok(todo)
        })
    }

    fn set_category_visibility(
        &self,
        category_id: i64,
        visible: bool,
    ) -> BoxFuture<'_, BackendResult<VisibilityRecord>> {
        Box::pin(async move {
            let body = VisibilityUpdate { visible };
            let dto: CategoryVisibilityDto = tag(
                self.client
                    .send(Method::PUT, &paths::category_visibility(category_id), &body)
                    .await,
            )?;
            info!(category_id, visible, "Updated category visibility");
            Ok(VisibilityRecord::from(dto))
        })
    }

    fn fetch_diaries(&self) -> BoxFuture<'_, BackendResult<Vec<Diary>>> {
        Box::pin(async move {
            let dtos: Vec<DiaryDto> = tag(self.client.get(paths::DIARIES).await)?;
            debug!(count = dtos.len(), "Fetched diaries");
            let mut diaries = tag(convert_all(dtos, DiaryDto::into_diary))?;
            sort_diaries(&mut diaries);
            Ok(diaries)
        })
    }

    fn save_diary(
        &self,
        id: Option<i64>,
        diary: DiaryRequest,
    ) -> BoxFuture<'_, BackendResult<Diary>> {
        Box::pin(async move {
            let fields = diary.form_fields();
            let saved: DiaryDto = match id {
                Some(id) => tag(
                    self.client
                        .send_form(Method::PUT, &paths::diary(id), fields)
                        .await,
                )?,
                None => tag(self.client.send_form(Method::POST, paths::DIARIES, fields).await)?,
            };
            let saved = tag(saved.into_diary().map_err(BackendError::from))?;
            info!(id = saved.id, created = id.is_none(), "Saved diary");
            Ok(saved)
        })
    }

    fn delete_diary(&self, id: i64) -> BoxFuture<'_, BackendResult<()>> {
        Box::pin(async move {
            tag(self.client.delete(&paths::diary(id)).await)?;
            info!(id, "Deleted diary");
            Ok(())
        })
    }
}
