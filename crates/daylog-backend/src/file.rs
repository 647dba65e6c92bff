//! Backend that keeps every collection in one local JSON file.
//!
//! The document has the [`Snapshot`] layout. A missing file reads as
//! empty and is created on the first mutation. Mutations follow the
//! server's rules: new items get `max id + 1`, progress is clamped and
//! completion derived, unknown ids are `NotFound`. Deleting an event or
//! todo also unlinks it from every diary.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use daylog_core::{Category, Diary, Event, Todo, VisibilityRecord, sort_diaries};
use daylog_protocol::{
    CategoryDto, CategoryVisibilityDto, DiaryDto, DiaryRequest, EventDto, Snapshot, TodoDto,
    decode_body, encode_body,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::backend::{Backend, BoxFuture};
use crate::error::{BackendError, BackendResult};

const NAME: &str = "file";

/// Backend backed by a JSON document on disk.
pub struct FileBackend {
    path: PathBuf,
    /// Serializes read-modify-write cycles.
    lock: Mutex<()>,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> BackendResult<Snapshot> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Snapshot file missing, starting empty");
                return Ok(Snapshot::default());
            }
            Err(e) => {
                return Err(BackendError::storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                ))
                .with_source(e));
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Snapshot::default());
        }
        Ok(decode_body(&bytes)?)
    }

    /// Writes the document to a sibling temp file and renames it over the
    /// original so readers never see a partial file.
    async fn store(&self, snapshot: &Snapshot) -> BackendResult<()> {
        let bytes = encode_body(snapshot)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.write_error(e))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| self.write_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.write_error(e))?;
        Ok(())
    }

    fn write_error(&self, e: std::io::Error) -> BackendError {
        BackendError::storage(format!("Failed to write {}: {}", self.path.display(), e))
            .with_source(e)
    }

    async fn read<T, F>(&self, f: F) -> BackendResult<T>
    where
        F: FnOnce(Snapshot) -> BackendResult<T>,
    {
        let _guard = self.lock.lock().await;
        let snapshot = self.load().await.map_err(|e| e.with_backend(NAME))?;
        f(snapshot).map_err(|e| e.with_backend(NAME))
    }

    async fn update<T, F>(&self, f: F) -> BackendResult<T>
    where
        F: FnOnce(&mut Snapshot) -> BackendResult<T>,
    {
        let _guard = self.lock.lock().await;
        let mut snapshot = self.load().await.map_err(|e| e.with_backend(NAME))?;
        let out = f(&mut snapshot).map_err(|e| e.with_backend(NAME))?;
        self.store(&snapshot)
            .await
            .map_err(|e| e.with_backend(NAME))?;
        Ok(out)
    }
}

/// Replaces an id-only category reference with the stored category. A
/// reference without an id is dropped.
fn resolve_category(snapshot: &Snapshot, category: &mut Option<CategoryDto>) -> BackendResult<()> {
    let Some(id) = category.as_ref().and_then(|c| c.id) else {
        *category = None;
        return Ok(());
    };
    let stored = snapshot
        .categories
        .iter()
        .find(|c| c.id == Some(id))
        .ok_or_else(|| BackendError::not_found(format!("Category not found: {id}")))?;
    *category = Some(stored.clone());
    Ok(())
}

/// Builds the stored diary for a request, embedding the related items.
fn diary_document(
    snapshot: &Snapshot,
    id: i64,
    request: DiaryRequest,
    now: NaiveDateTime,
) -> BackendResult<DiaryDto> {
    let related_events = request
        .related_events
        .iter()
        .map(|&event_id| {
            snapshot
                .events
                .iter()
                .find(|e| e.id == Some(event_id))
                .cloned()
                .ok_or_else(|| BackendError::not_found(format!("Event not found: {event_id}")))
        })
        .collect::<BackendResult<Vec<_>>>()?;
    let related_todos = request
        .related_todos
        .iter()
        .map(|&todo_id| {
            snapshot
                .todos
                .iter()
                .find(|t| t.id == Some(todo_id))
                .cloned()
                .ok_or_else(|| BackendError::not_found(format!("Todo not found: {todo_id}")))
        })
        .collect::<BackendResult<Vec<_>>>()?;
    Ok(DiaryDto {
        id: Some(id),
        title: request.title,
        content: request.content,
        date: Some(request.date.unwrap_or(now)),
        related_events,
        related_todos,
        created_at: Some(now),
        updated_at: Some(now),
    })
}

impl Backend for FileBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn fetch_events(&self) -> BoxFuture<'_, BackendResult<Vec<Event>>> {
        Box::pin(self.read(|s| {
            s.events
                .into_iter()
                .map(|e| e.into_event().map_err(BackendError::from))
                .collect()
        }))
    }

    fn fetch_todos(&self) -> BoxFuture<'_, BackendResult<Vec<Todo>>> {
        Box::pin(self.read(|s| {
            s.todos
                .into_iter()
                .map(|t| t.into_todo().map_err(BackendError::from))
                .collect()
        }))
    }

    fn fetch_categories(&self) -> BoxFuture<'_, BackendResult<Vec<Category>>> {
        Box::pin(self.read(|s| {
            s.categories
                .into_iter()
                .map(|c| c.into_category().map_err(BackendError::from))
                .collect()
        }))
    }

    fn fetch_visibility(&self) -> BoxFuture<'_, BackendResult<Vec<VisibilityRecord>>> {
        Box::pin(self.read(|s| Ok(s.visibility.into_iter().map(Into::into).collect())))
    }

    fn save_event(
        &self,
        id: Option<i64>,
        mut event: EventDto,
    ) -> BoxFuture<'_, BackendResult<Event>> {
        Box::pin(async move {
            let now = Local::now().naive_local();
            let saved = self
                .update(move |s| {
                    resolve_category(s, &mut event.category)?;
                    match id {
                        None => {
                            event.id = Some(s.next_event_id());
                            event.created_at = Some(now);
                            event.updated_at = Some(now);
                            s.events.push(event.clone());
                        }
                        Some(id) => {
                            let slot = s
                                .events
                                .iter_mut()
                                .find(|e| e.id == Some(id))
                                .ok_or_else(|| {
                                    BackendError::not_found(format!("Event not found: {id}"))
                                })?;
                            event.id = Some(id);
                            event.created_at = slot.created_at;
                            event.updated_at = Some(now);
                            *slot = event.clone();
                        }
                    }
                    Ok(event.into_event()?)
                })
                .await?;
            info!(id = saved.id, created = id.is_none(), "Saved event");
            Ok(saved)
        })
    }

    fn delete_event(&self, id: i64) -> BoxFuture<'_, BackendResult<()>> {
        Box::pin(async move {
            self.update(|s| {
                let before = s.events.len();
                s.events.retain(|e| e.id != Some(id));
                if s.events.len() == before {
                    return Err(BackendError::not_found(format!("Event not found: {id}")));
                }
                for diary in &mut s.diaries {
                    diary.related_events.retain(|e| e.id != Some(id));
                }
                Ok(())
            })
            .await?;
            info!(id, "Deleted event");
            Ok(())
        })
    }

    fn save_todo(&self, id: Option<i64>, mut todo: TodoDto) -> BoxFuture<'_, BackendResult<Todo>> {
        Box::pin(async move {
            let now = Local::now().naive_local();
            let saved = self
                .update(move |s| match id {
                    None => {
                        resolve_category(s, &mut todo.category)?;
                        todo.apply_progress(todo.progress.unwrap_or(0));
                        todo.id = Some(s.next_todo_id());
                        todo.created_at = Some(now);
                        todo.updated_at = Some(now);
                        s.todos.push(todo.clone());
                        Ok(todo.into_todo()?)
                    }
                    Some(id) => {
                        if todo.category.as_ref().is_some_and(|c| c.id.is_some()) {
                            resolve_category(s, &mut todo.category)?;
                        }
                        let slot = s
                            .todos
                            .iter_mut()
                            .find(|t| t.id == Some(id))
                            .ok_or_else(|| BackendError::not_found(format!("Todo not found: {id}")))?;
                        slot.merge(todo);
                        slot.updated_at = Some(now);
                        Ok(slot.clone().into_todo()?)
                    }
                })
                .await?;
            info!(id = saved.id, created = id.is_none(), "Saved todo");
            Ok(saved)
        })
    }

    fn delete_todo(&self, id: i64) -> BoxFuture<'_, BackendResult<()>> {
        Box::pin(async move {
            self.update(|s| {
                let before = s.todos.len();
                s.todos.retain(|t| t.id != Some(id));
                if s.todos.len() == before {
                    return Err(BackendError::not_found(format!("Todo not found: {id}")));
                }
                for diary in &mut s.diaries {
                    diary.related_todos.retain(|t| t.id != Some(id));
                }
                Ok(())
            })
            .await?;
            info!(id, "Deleted todo");
            Ok(())
        })
    }

    fn update_todo_progress(&self, id: i64, progress: i64) -> BoxFuture<'_, BackendResult<Todo>> {
        Box::pin(async move {
            let now = Local::now().naive_local();
            let todo = self
                .update(|s| {
                    let dto = s
                        .todos
                        .iter_mut()
                        .find(|t| t.id == Some(id))
                        .ok_or_else(|| BackendError::not_found(format!("Todo not found: {id}")))?;
                    dto.apply_progress(progress);
                    dto.updated_at = Some(now);
                    Ok(dto.clone().into_todo()?)
                })
                .await?;
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
            let record = self
                .update(|s| {
                    let category = s
                        .categories
                        .iter()
                        .find(|c| c.id == Some(category_id))
                        .ok_or_else(|| {
                            BackendError::not_found(format!("Category not found: {category_id}"))
                        })?;
                    let name = category.name.clone();
                    match s.visibility.iter_mut().find(|v| v.category_id == category_id) {
                        Some(existing) => existing.visible = Some(visible),
                        None => {
                            let next_id =
                                s.visibility.iter().filter_map(|v| v.id).max().unwrap_or(0) + 1;
                            let mut record = CategoryVisibilityDto::new(category_id, visible);
                            record.id = Some(next_id);
                            record.category_name = name;
                            s.visibility.push(record);
                        }
                    }
                    Ok(VisibilityRecord {
                        category_id,
                        visible,
                    })
                })
                .await?;
            info!(category_id, visible, "Updated category visibility");
            Ok(record)
        })
    }

    fn fetch_diaries(&self) -> BoxFuture<'_, BackendResult<Vec<Diary>>> {
        Box::pin(self.read(|s| {
            let mut diaries = s
                .diaries
                .into_iter()
                .map(|d| d.into_diary().map_err(BackendError::from))
                .collect::<BackendResult<Vec<_>>>()?;
            sort_diaries(&mut diaries);
            Ok(diaries)
        }))
    }

    fn save_diary(
        &self,
        id: Option<i64>,
        diary: DiaryRequest,
    ) -> BoxFuture<'_, BackendResult<Diary>> {
        Box::pin(async move {
            let now = Local::now().naive_local();
            let saved = self
                .update(move |s| match id {
                    None => {
                        let document = diary_document(s, s.next_diary_id(), diary, now)?;
                        s.diaries.push(document.clone());
                        Ok(document.into_diary()?)
                    }
                    Some(id) => {
                        let index = s
                            .diaries
                            .iter()
                            .position(|d| d.id == Some(id))
                            .ok_or_else(|| {
                                BackendError::not_found(format!("Diary not found: {id}"))
                            })?;
                        let mut document = diary_document(s, id, diary, now)?;
                        document.created_at = s.diaries[index].created_at;
                        s.diaries[index] = document.clone();
                        Ok(document.into_diary()?)
                    }
                })
                .await?;
            info!(id = saved.id, created = id.is_none(), "Saved diary");
            Ok(saved)
        })
    }

    fn delete_diary(&self, id: i64) -> BoxFuture<'_, BackendResult<()>> {
        Box::pin(async move {
            self.update(|s| {
                let before = s.diaries.len();
                s.diaries.retain(|d| d.id != Some(id));
                if s.diaries.len() == before {
                    return Err(BackendError::not_found(format!("Diary not found: {id}")));
                }
                Ok(())
            })
            .await?;
            info!(id, "Deleted diary");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendErrorCode;
    use chrono::{NaiveDate, NaiveDateTime};
    use daylog_core::{DayRange, EventDraft, Selection};
    use tempfile::TempDir;

    const SEED: &str = r##"{
        "events": [
            {"id": 1, "title": "Conference", "startTime": "2024-03-10T00:00:00",
             "endTime": "2024-03-12T23:59:59.999", "allDay": true,
             "category": {"id": 1, "name": "Work", "color": "#3174ad"}},
            {"id": 4, "title": "Standup", "startTime": "2024-03-11T09:00:00",
             "endTime": "2024-03-11T09:15:00", "allDay": false}
        ],
        "todos": [
            {"id": 10, "title": "Write report", "progress": 40, "completed": false,
             "showInCalendar": true, "dueDate": "2024-03-11T17:00:00"}
        ],
        "categories": [
            {"id": 1, "name": "Work", "color": "#3174ad"},
            {"id": 2, "name": "Home", "color": "#e67c73"}
        ],
        "visibility": [
            {"id": 1, "categoryId": 2, "categoryName": "Home", "visible": false}
        ],
        "diaries": [
            {"id": 3, "title": "Standup notes", "content": "Ran long",
             "date": "2024-03-11T10:00:00",
             "relatedEvents": [{"id": 4, "title": "Standup", "startTime": "2024-03-11T09:00:00",
                                "endTime": "2024-03-11T09:15:00", "allDay": false}],
             "relatedTodos": [{"id": 10, "title": "Write report"}]}
        ]
    }"##;

    fn seeded() -> (TempDir, FileBackend) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("daylog.json");
        std::fs::write(&path, SEED).unwrap();
        (dir, FileBackend::new(path))
    }

    fn dt(d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    mod reads {
        use super::*;

        #[tokio::test]
        async fn fetches_all_collections() {
            let (_dir, backend) = seeded();

            let events = backend.fetch_events().await.unwrap();
            assert_eq!(events.len(), 2);
            assert!(events[0].all_day);

            let todos = backend.fetch_todos().await.unwrap();
            assert_eq!(todos[0].progress.value(), 40);

            let categories = backend.fetch_categories().await.unwrap();
            assert_eq!(categories.len(), 2);
            assert!(categories.iter().all(|c| c.visible));

            let visibility = backend.fetch_visibility().await.unwrap();
            assert_eq!(
                visibility,
                vec![VisibilityRecord {
                    category_id: 2,
                    visible: false
                }]
            );
        }

        #[tokio::test]
        async fn missing_file_is_empty() {
            let dir = TempDir::new().unwrap();
            let backend = FileBackend::new(dir.path().join("nope.json"));
            assert!(backend.fetch_events().await.unwrap().is_empty());
            assert!(backend.fetch_categories().await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn corrupt_file_is_an_error() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("daylog.json");
            std::fs::write(&path, "{ not json").unwrap();
            let err = FileBackend::new(path).fetch_todos().await.unwrap_err();
            assert_eq!(err.code(), BackendErrorCode::InvalidResponse);
            assert_eq!(err.backend(), Some("file"));
        }
    }

    mod events {
        use super::*;

        #[tokio::test]
        async fn create_assigns_next_id_and_persists() {
            let (dir, backend) = seeded();
            let selection = Selection::Range {
                start: dt(20, 0, 0).date(),
                end_exclusive: dt(22, 0, 0).date(),
            };
            let dto = EventDto::from_draft(&EventDraft::from_selection(&selection), "Trip")
                .with_category_id(2);

            let saved = backend.save_event(None, dto).await.unwrap();
            assert_eq!(saved.id, 5);
            assert_eq!(
                saved.day_range(),
                DayRange::new(dt(20, 0, 0).date(), dt(21, 0, 0).date())
            );
            let category = saved.category.unwrap();
            assert_eq!(category.color.as_deref(), Some("#e67c73"));

            let reopened = FileBackend::new(dir.path().join("daylog.json"));
            assert_eq!(reopened.fetch_events().await.unwrap().len(), 3);
        }

        #[tokio::test]
        async fn update_replaces_in_place() {
            let (_dir, backend) = seeded();
            let mut dto = EventDto::from_event(&backend.fetch_events().await.unwrap()[1]);
            dto.title = "Daily standup".to_string();
            dto.end_time = dt(11, 9, 30);

            let saved = backend.save_event(Some(4), dto).await.unwrap();
            assert_eq!(saved.title, "Daily standup");

            let events = backend.fetch_events().await.unwrap();
            assert_eq!(events.len(), 2);
            assert_eq!(events[1].end_time, dt(11, 9, 30));
        }

        #[tokio::test]
        async fn update_unknown_id_is_not_found() {
            let (_dir, backend) = seeded();
            let dto = EventDto::from_draft(
                &EventDraft::from_selection(&Selection::Day {
                    date: dt(1, 0, 0).date(),
                }),
                "x",
            );
            let err = backend.save_event(Some(99), dto).await.unwrap_err();
            assert_eq!(err.code(), BackendErrorCode::NotFound);
        }

        #[tokio::test]
        async fn unknown_category_is_not_found() {
            let (_dir, backend) = seeded();
            let dto = EventDto::from_draft(
                &EventDraft::from_selection(&Selection::Day {
                    date: dt(1, 0, 0).date(),
                }),
                "x",
            )
            .with_category_id(42);
            let err = backend.save_event(None, dto).await.unwrap_err();
            assert_eq!(err.code(), BackendErrorCode::NotFound);
            assert!(err.message().contains("Category"));
        }

        #[tokio::test]
        async fn delete() {
            let (_dir, backend) = seeded();
            backend.delete_event(1).await.unwrap();
            assert_eq!(backend.fetch_events().await.unwrap().len(), 1);

            let err = backend.delete_event(1).await.unwrap_err();
            assert_eq!(err.code(), BackendErrorCode::NotFound);
        }

        #[tokio::test]
        async fn delete_unlinks_from_diaries() {
            let (_dir, backend) = seeded();
            backend.delete_event(4).await.unwrap();
            let diaries = backend.fetch_diaries().await.unwrap();
            assert!(diaries[0].related_events.is_empty());
            assert_eq!(diaries[0].related_todos, vec![10]);
        }
    }

    mod todos_and_visibility {
        use super::*;

        #[tokio::test]
        async fn create_todo_defaults_progress() {
            let (dir, backend) = seeded();
            let dto = TodoDto::new("Book flights")
                .with_due_date(dt(15, 12, 0))
                .with_show_in_calendar(true)
                .with_category_id(1);

            let saved = backend.save_todo(None, dto).await.unwrap();
            assert_eq!(saved.id, 11);
            assert_eq!(saved.progress.value(), 0);
            assert!(saved.occurs_on(dt(15, 0, 0).date()));
            assert_eq!(
                saved.category.unwrap().color.as_deref(),
                Some("#3174ad")
            );

            let reopened = FileBackend::new(dir.path().join("daylog.json"));
            assert_eq!(reopened.fetch_todos().await.unwrap().len(), 2);
        }

        #[tokio::test]
        async fn update_todo_merges_present_fields() {
            let (_dir, backend) = seeded();
            let mut update = TodoDto::new("").with_description("Section 2 first");
            update.progress = Some(120);

            let saved = backend.save_todo(Some(10), update).await.unwrap();
            assert_eq!(saved.title, "Write report");
            assert_eq!(saved.description.as_deref(), Some("Section 2 first"));
            assert!(saved.is_complete());
            assert_eq!(saved.due_date, Some(dt(11, 17, 0)));
        }

        #[tokio::test]
        async fn todo_unknown_ids_are_not_found() {
            let (_dir, backend) = seeded();
            let err = backend
                .save_todo(Some(99), TodoDto::new("x"))
                .await
                .unwrap_err();
            assert_eq!(err.code(), BackendErrorCode::NotFound);

            let err = backend
                .save_todo(None, TodoDto::new("x").with_category_id(42))
                .await
                .unwrap_err();
            assert!(err.message().contains("Category"));

            let err = backend.delete_todo(99).await.unwrap_err();
            assert_eq!(err.code(), BackendErrorCode::NotFound);
        }

        #[tokio::test]
        async fn delete_todo_unlinks_from_diaries() {
            let (_dir, backend) = seeded();
            backend.delete_todo(10).await.unwrap();
            assert!(backend.fetch_todos().await.unwrap().is_empty());
            let diaries = backend.fetch_diaries().await.unwrap();
            assert!(diaries[0].related_todos.is_empty());
        }

        #[tokio::test]
        async fn progress_is_clamped_and_completes() {
            let (_dir, backend) = seeded();
            let todo = backend.update_todo_progress(10, 150).await.unwrap();
            assert_eq!(todo.progress.value(), 100);
            assert!(todo.is_complete());

            let stored = backend.fetch_todos().await.unwrap();
            assert!(stored[0].is_complete());

            let err = backend.update_todo_progress(77, 10).await.unwrap_err();
            assert_eq!(err.code(), BackendErrorCode::NotFound);
        }

        #[tokio::test]
        async fn visibility_updates_and_inserts() {
            let (_dir, backend) = seeded();
            backend.set_category_visibility(2, true).await.unwrap();
            backend.set_category_visibility(1, false).await.unwrap();

            let mut records = backend.fetch_visibility().await.unwrap();
            records.sort_by_key(|r| r.category_id);
            assert_eq!(
                records,
                vec![
                    VisibilityRecord {
                        category_id: 1,
                        visible: false
                    },
                    VisibilityRecord {
                        category_id: 2,
                        visible: true
                    },
                ]
            );

            let err = backend.set_category_visibility(9, false).await.unwrap_err();
            assert_eq!(err.code(), BackendErrorCode::NotFound);
        }

        #[tokio::test]
        async fn first_mutation_creates_file() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("nested").join("daylog.json");
            let backend = FileBackend::new(&path);
            let dto = EventDto::from_draft(
                &EventDraft::from_selection(&Selection::Day {
                    date: dt(1, 0, 0).date(),
                }),
                "First",
            );
            let saved = backend.save_event(None, dto).await.unwrap();
            assert_eq!(saved.id, 1);
            assert!(path.exists());
        }
    }

    mod diaries {
        use super::*;

        #[tokio::test]
        async fn fetch_reads_related_ids() {
            let (_dir, backend) = seeded();
            let diaries = backend.fetch_diaries().await.unwrap();
            assert_eq!(diaries.len(), 1);
            assert_eq!(diaries[0].date, dt(11, 10, 0));
            assert_eq!(diaries[0].related_events, vec![4]);
            assert_eq!(diaries[0].related_todos, vec![10]);
        }

        #[tokio::test]
        async fn create_links_and_lists_newest_first() {
            let (_dir, backend) = seeded();
            let request = DiaryRequest {
                related_events: vec![1],
                ..DiaryRequest::new("Conference wrap-up").with_date(dt(12, 21, 0))
            };
            let saved = backend.save_diary(None, request).await.unwrap();
            assert_eq!(saved.id, 4);
            assert_eq!(saved.related_events, vec![1]);

            let ids: Vec<i64> = backend
                .fetch_diaries()
                .await
                .unwrap()
                .iter()
                .map(|d| d.id)
                .collect();
            assert_eq!(ids, vec![4, 3]);
        }

        #[tokio::test]
        async fn update_replaces_links_and_defaults_date() {
            let (_dir, backend) = seeded();
            let saved = backend
                .save_diary(Some(3), DiaryRequest::new("Standup notes"))
                .await
                .unwrap();
            assert!(saved.is_standalone());
            assert!(saved.date > dt(11, 10, 0));
        }

        #[tokio::test]
        async fn unknown_related_id_is_not_found() {
            let (_dir, backend) = seeded();
            let request = DiaryRequest {
                related_todos: vec![77],
                ..DiaryRequest::new("x")
            };
            let err = backend.save_diary(None, request).await.unwrap_err();
            assert_eq!(err.code(), BackendErrorCode::NotFound);
            assert!(err.message().contains("Todo"));
            assert_eq!(backend.fetch_diaries().await.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn delete() {
            let (_dir, backend) = seeded();
            backend.delete_diary(3).await.unwrap();
            assert!(backend.fetch_diaries().await.unwrap().is_empty());
            let err = backend.delete_diary(3).await.unwrap_err();
            assert_eq!(err.code(), BackendErrorCode::NotFound);
        }
    }
}
