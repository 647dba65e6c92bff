//! Shared snapshot state with change notifications.
//!
//! The store owns the latest [`Snapshot`] behind a `watch` channel so every
//! view reads the same data, and fans out [`Change`] notices on a
//! `broadcast` channel so a view that did not make an edit still learns
//! about it. A todo edited from the calendar, for instance, refreshes the
//! todo list.
//!
//! Fetches are ordered with [`FetchTicket`]s: a fetch that completes after
//! a newer one has already been applied is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{NaiveDate, Utc};
use daylog_backend::Backend;
use daylog_core::{
    Category, DayItem, Diary, Event, Todo, VisibilityRecord, merge_visibility, sort_diaries,
    sort_for_list,
};
use daylog_protocol::{DiaryRequest, EventDto, TodoDto};
use tokio::sync::{RwLock, broadcast, watch};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::snapshot::Snapshot;
use crate::sync::SyncState;

/// Capacity of the change channel. Slow subscribers see `Lagged` and
/// should re-read the snapshot.
const CHANGE_CAPACITY: usize = 64;

/// What part of the snapshot changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Events,
    Todos,
    Diaries,
    Categories,
    /// A full fetch replaced everything.
    Replaced,
}

/// Permission to apply one fetch result.
///
/// Tickets are numbered in the order fetches begin.
#[derive(Debug)]
#[must_use = "a fetch ticket does nothing unless completed"]
pub struct FetchTicket {
    generation: u64,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// The collections a fetch produces.
#[derive(Debug, Clone, Default)]
pub struct FetchData {
    pub events: Vec<Event>,
    pub todos: Vec<Todo>,
    pub diaries: Vec<Diary>,
    /// Categories with visibility already merged.
    pub categories: Vec<Category>,
}

struct Shared {
    snapshot: watch::Sender<Arc<Snapshot>>,
    changes: broadcast::Sender<Change>,
    issued: AtomicU64,
    sync: RwLock<SyncState>,
}

/// Cheaply cloneable handle to the shared snapshot.
#[derive(Clone)]
pub struct SnapshotStore {
    shared: Arc<Shared>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    /// Creates a store holding an empty snapshot.
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Snapshot::default()));
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                snapshot,
                changes,
                issued: AtomicU64::new(0),
                sync: RwLock::new(SyncState::default()),
            }),
        }
    }

    /// Returns the latest snapshot.
    pub fn current(&self) -> Arc<Snapshot> {
        self.shared.snapshot.borrow().clone()
    }

    /// Subscribes to snapshot replacements and edits.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.shared.snapshot.subscribe()
    }

    /// Subscribes to change notices.
    pub fn changes(&self) -> broadcast::Receiver<Change> {
        self.shared.changes.subscribe()
    }

    /// Items on `date` in the current snapshot.
    pub fn day(&self, date: NaiveDate) -> Vec<DayItem> {
        self.current().day(date)
    }

    pub async fn sync_state(&self) -> SyncState {
        self.shared.sync.read().await.clone()
    }

    /// Starts a fetch. Complete it with [`SnapshotStore::complete_fetch`].
    pub fn begin_fetch(&self) -> FetchTicket {
        let generation = self.shared.issued.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "Fetch started");
        FetchTicket { generation }
    }

    /// Applies a fetch result unless a newer fetch was already applied.
    ///
    /// Returns true when the snapshot was replaced.
    pub fn complete_fetch(&self, ticket: FetchTicket, data: FetchData) -> bool {
        let generation = ticket.generation;
        let mut applied_over = 0;
        let applied = self.shared.snapshot.send_if_modified(|current| {
            applied_over = current.generation;
            if generation <= current.generation {
                return false;
            }
            let mut todos = data.todos;
            sort_for_list(&mut todos);
            let mut diaries = data.diaries;
            sort_diaries(&mut diaries);
            *current = Arc::new(Snapshot {
                events: data.events,
                todos,
                diaries,
                categories: data.categories,
                fetched_at: Some(Utc::now()),
                generation,
            });
            true
        });

        if applied {
            info!(generation, "Snapshot replaced");
            self.notify(Change::Replaced);
        } else {
            warn!(
                generation,
                current = applied_over,
                "Dropping stale fetch result"
            );
        }
        applied
    }

    /// Replaces the todo list and tells every subscriber.
    pub fn replace_todos(&self, todos: Vec<Todo>) {
        self.modify_todos(|list| *list = todos);
    }

    /// Fetches every collection from `backend` and applies the result.
    ///
    /// Returns `Ok(false)` when a newer fetch won the race.
    ///
    /// # Errors
    ///
    /// Returns the first backend error. The snapshot is left unchanged.
    pub async fn refresh(&self, backend: &dyn Backend) -> StoreResult<bool> {
        let ticket = self.begin_fetch();
        let fetched = tokio::try_join!(
            backend.fetch_events(),
            backend.fetch_todos(),
            backend.fetch_categories(),
            backend.fetch_visibility(),
            backend.fetch_diaries(),
        );

        match fetched {
            Ok((events, todos, categories, visibility, diaries)) => {
                debug!(
                    backend = backend.name(),
                    events = events.len(),
                    todos = todos.len(),
                    diaries = diaries.len(),
                    categories = categories.len(),
                    "Fetched collections"
                );
                self.shared.sync.write().await.record_success();
                let data = FetchData {
                    events,
                    todos,
                    diaries,
                    categories: merge_visibility(categories, &visibility),
                };
                Ok(self.complete_fetch(ticket, data))
            }
            Err(e) => {
                warn!(backend = backend.name(), error = %e, "Refresh failed");
                self.shared.sync.write().await.record_failure(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Creates or updates an event through `backend` and applies the
    /// stored result.
    pub async fn save_event(
        &self,
        backend: &dyn Backend,
        id: Option<i64>,
        event: EventDto,
    ) -> StoreResult<Event> {
        let saved = backend.save_event(id, event).await?;
        let applied = saved.clone();
        self.modify(Change::Events, move |s| {
            match s.events.iter_mut().find(|e| e.id == applied.id) {
                Some(slot) => *slot = applied,
                None => s.events.push(applied),
            }
        });
        Ok(saved)
    }

    /// Deletes an event through `backend` and unlinks it from diaries.
    pub async fn delete_event(&self, backend: &dyn Backend, id: i64) -> StoreResult<()> {
        backend.delete_event(id).await?;
        self.modify(Change::Events, |s| {
            s.events.retain(|e| e.id != id);
            for diary in &mut s.diaries {
                diary.related_events.retain(|&e| e != id);
            }
        });
        Ok(())
    }

    /// Creates or updates a todo through `backend` and updates the todo
    /// list for every view.
    pub async fn save_todo(
        &self,
        backend: &dyn Backend,
        id: Option<i64>,
        todo: TodoDto,
    ) -> StoreResult<Todo> {
        let saved = backend.save_todo(id, todo).await?;
        self.upsert_todo(saved.clone());
        Ok(saved)
    }

    /// Deletes a todo through `backend` and unlinks it from diaries.
    pub async fn delete_todo(&self, backend: &dyn Backend, id: i64) -> StoreResult<()> {
        backend.delete_todo(id).await?;
        self.modify(Change::Todos, |s| {
            s.todos.retain(|t| t.id != id);
            for diary in &mut s.diaries {
                diary.related_todos.retain(|&t| t != id);
            }
        });
        Ok(())
    }

    /// Sets a todo's progress through `backend` and updates the todo list
    /// for every view.
    pub async fn update_todo_progress(
        &self,
        backend: &dyn Backend,
        id: i64,
        progress: i64,
    ) -> StoreResult<Todo> {
        let updated = backend.update_todo_progress(id, progress).await?;
        self.upsert_todo(updated.clone());
        Ok(updated)
    }

    /// Creates or updates a diary through `backend`.
    pub async fn save_diary(
        &self,
        backend: &dyn Backend,
        id: Option<i64>,
        diary: DiaryRequest,
    ) -> StoreResult<Diary> {
        let saved = backend.save_diary(id, diary).await?;
        let applied = saved.clone();
        self.modify(Change::Diaries, move |s| {
            match s.diaries.iter_mut().find(|d| d.id == applied.id) {
                Some(slot) => *slot = applied,
                None => s.diaries.push(applied),
            }
            sort_diaries(&mut s.diaries);
        });
        Ok(saved)
    }

    pub async fn delete_diary(&self, backend: &dyn Backend, id: i64) -> StoreResult<()> {
        backend.delete_diary(id).await?;
        self.modify(Change::Diaries, |s| s.diaries.retain(|d| d.id != id));
        Ok(())
    }

    /// Shows or hides a category through `backend`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the category is not in the current snapshot.
    pub async fn set_category_visibility(
        &self,
        backend: &dyn Backend,
        category_id: i64,
        visible: bool,
    ) -> StoreResult<VisibilityRecord> {
        if self.current().category(category_id).is_none() {
            return Err(StoreError::not_found("category", category_id));
        }
        let record = backend.set_category_visibility(category_id, visible).await?;
        self.modify(Change::Categories, |s| {
            if let Some(category) = s.categories.iter_mut().find(|c| c.id == record.category_id)
            {
                category.visible = record.visible;
            }
        });
        Ok(record)
    }

    /// Replaces or appends one todo in the current list.
    fn upsert_todo(&self, todo: Todo) {
        self.modify_todos(move |todos| match todos.iter_mut().find(|t| t.id == todo.id) {
            Some(slot) => *slot = todo,
            None => todos.push(todo),
        });
    }

    /// Edits the todo list in place and restores list order, under the
    /// snapshot's write lock.
    fn modify_todos(&self, f: impl FnOnce(&mut Vec<Todo>)) {
        self.modify(Change::Todos, |s| {
            f(&mut s.todos);
            sort_for_list(&mut s.todos);
        });
    }

    fn modify(&self, change: Change, f: impl FnOnce(&mut Snapshot)) {
        self.shared
            .snapshot
            .send_modify(|current| f(Arc::make_mut(current)));
        debug!(?change, "Snapshot edited");
        self.notify(change);
    }

    fn notify(&self, change: Change) {
        // No receivers is fine.
        let _ = self.shared.changes.send(change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use daylog_backend::{BackendError, ErrorBackend, FileBackend};
    use daylog_core::{DayRange, EventDraft, EventTimes, Selection};
    use tempfile::TempDir;

    const SEED: &str = r##"{
        "events": [
            {"id": 1, "title": "Trip", "startTime": "2024-03-10T00:00:00",
             "endTime": "2024-03-12T23:59:59.999", "allDay": true},
            {"id": 2, "title": "Dentist", "startTime": "2024-03-11T14:00:00",
             "endTime": "2024-03-11T15:00:00", "allDay": false,
             "category": {"id": 2, "name": "Health", "color": "#33b679"}}
        ],
        "todos": [
            {"id": 10, "title": "Undated", "progress": 0},
            {"id": 11, "title": "Pack", "progress": 20, "showInCalendar": true,
             "dueDate": "2024-03-11T08:00:00"},
            {"id": 12, "title": "Done", "progress": 100, "completed": true,
             "dueDate": "2024-03-09T08:00:00"}
        ],
        "categories": [
            {"id": 1, "name": "Work", "color": "#3174ad"},
            {"id": 2, "name": "Health", "color": "#33b679"}
        ],
        "visibility": [],
        "diaries": [
            {"id": 5, "title": "Packing list", "date": "2024-03-09T20:00:00",
             "relatedTodos": [{"id": 11, "title": "Pack"}]},
            {"id": 6, "title": "Trip day one", "date": "2024-03-10T21:00:00",
             "relatedEvents": [{"id": 1, "title": "Trip", "startTime": "2024-03-10T00:00:00",
                                "endTime": "2024-03-12T23:59:59.999", "allDay": true}]}
        ]
    }"##;

    fn seeded() -> (TempDir, FileBackend) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("daylog.json");
        std::fs::write(&path, SEED).unwrap();
        (dir, FileBackend::new(path))
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn dt(d: u32, h: u32) -> NaiveDateTime {
        date(d).and_hms_opt(h, 0, 0).unwrap()
    }

    fn todo_ids(store: &SnapshotStore) -> Vec<i64> {
        store.current().todos.iter().map(|t| t.id).collect()
    }

    mod tickets {
        use super::*;

        #[test]
        fn stale_fetch_is_dropped() {
            let store = SnapshotStore::new();
            let older = store.begin_fetch();
            let newer = store.begin_fetch();
            assert!(newer.generation() > older.generation());

            let fresh = FetchData {
                events: vec![Event::new(
                    1,
                    "fresh",
                    EventTimes::timed(dt(11, 9), dt(11, 10)),
                )],
                ..FetchData::default()
            };
            let stale = FetchData {
                events: vec![Event::new(
                    1,
                    "stale",
                    EventTimes::timed(dt(11, 9), dt(11, 10)),
                )],
                ..FetchData::default()
            };

            assert!(store.complete_fetch(newer, fresh));
            assert!(!store.complete_fetch(older, stale));
            assert_eq!(store.current().events[0].title, "fresh");
        }

        #[test]
        fn in_order_fetches_both_apply() {
            let store = SnapshotStore::new();
            let first = store.begin_fetch();
            assert!(store.complete_fetch(first, FetchData::default()));
            let second = store.begin_fetch();
            assert!(store.complete_fetch(second, FetchData::default()));
            assert_eq!(store.current().generation, 2);
            assert!(store.current().fetched_at.is_some());
        }
    }

    mod refresh {
        use super::*;

        #[tokio::test]
        async fn loads_and_sorts() {
            let (_dir, backend) = seeded();
            let store = SnapshotStore::new();
            assert!(store.current().is_empty_initial());

            assert!(store.refresh(&backend).await.unwrap());
            let snapshot = store.current();
            assert_eq!(snapshot.events.len(), 2);
            assert_eq!(todo_ids(&store), vec![11, 10, 12]);
            let diary_ids: Vec<i64> = snapshot.diaries.iter().map(|d| d.id).collect();
            assert_eq!(diary_ids, vec![6, 5]);
            assert!(snapshot.categories.iter().all(|c| c.visible));

            let ids: Vec<i64> = store.day(date(11)).iter().map(DayItem::id).collect();
            assert_eq!(ids, vec![1, 2, 11]);
            assert!(!store.sync_state().await.is_failing());
        }

        #[tokio::test]
        async fn failure_keeps_snapshot() {
            let (_dir, backend) = seeded();
            let store = SnapshotStore::new();
            store.refresh(&backend).await.unwrap();

            let broken = ErrorBackend::new("rest", BackendError::network("connection refused"));
            let err = store.refresh(&broken).await.unwrap_err();
            assert!(err.is_retryable());
            assert_eq!(store.current().events.len(), 2);

            let sync = store.sync_state().await;
            assert_eq!(sync.consecutive_failures, 1);
            assert!(sync.last_error.unwrap().contains("connection refused"));
        }

        #[tokio::test]
        async fn subscribers_see_replacement() {
            let (_dir, backend) = seeded();
            let store = SnapshotStore::new();
            let mut snapshots = store.subscribe();
            let mut changes = store.changes();

            store.refresh(&backend).await.unwrap();

            assert!(snapshots.has_changed().unwrap());
            assert_eq!(snapshots.borrow_and_update().events.len(), 2);
            assert_eq!(changes.recv().await.unwrap(), Change::Replaced);
        }
    }

    mod edits {
        use super::*;

        #[tokio::test]
        async fn progress_update_reaches_todo_subscribers() {
            let (_dir, backend) = seeded();
            let store = SnapshotStore::new();
            store.refresh(&backend).await.unwrap();
            let mut changes = store.changes();

            let todo = store.update_todo_progress(&backend, 11, 100).await.unwrap();
            assert!(todo.is_complete());
            assert_eq!(changes.recv().await.unwrap(), Change::Todos);
            // Completed todos sink below incomplete ones.
            assert_eq!(todo_ids(&store), vec![10, 12, 11]);
        }

        #[tokio::test]
        async fn hiding_a_category_filters_the_day() {
            let (_dir, backend) = seeded();
            let store = SnapshotStore::new();
            store.refresh(&backend).await.unwrap();

            store.set_category_visibility(&backend, 2, false).await.unwrap();
            let ids: Vec<i64> = store.day(date(11)).iter().map(DayItem::id).collect();
            assert_eq!(ids, vec![1, 11]);

            // Survives a refetch.
            store.refresh(&backend).await.unwrap();
            assert!(!store.current().category(2).unwrap().visible);

            let err = store
                .set_category_visibility(&backend, 7, false)
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::NotFound { id: 7, .. }));
        }

        #[tokio::test]
        async fn save_and_delete_event() {
            let (_dir, backend) = seeded();
            let store = SnapshotStore::new();
            store.refresh(&backend).await.unwrap();
            let mut changes = store.changes();

            let draft = EventDraft::from_selection(&Selection::Day { date: date(13) });
            let saved = store
                .save_event(&backend, None, EventDto::from_draft(&draft, "Review"))
                .await
                .unwrap();
            assert_eq!(saved.day_range(), DayRange::single(date(13)));
            assert_eq!(changes.recv().await.unwrap(), Change::Events);
            assert_eq!(store.day(date(13)).len(), 1);

            store.delete_event(&backend, saved.id).await.unwrap();
            assert!(store.day(date(13)).is_empty());
            assert_eq!(changes.recv().await.unwrap(), Change::Events);
        }

        #[tokio::test]
        async fn concurrent_progress_updates_both_land() {
            let (_dir, backend) = seeded();
            let store = SnapshotStore::new();
            store.refresh(&backend).await.unwrap();

            // Each update lands on the live list, not a copy taken before
            // the other one was applied.
            let (a, b) = tokio::join!(
                store.update_todo_progress(&backend, 10, 60),
                store.update_todo_progress(&backend, 11, 100),
            );
            a.unwrap();
            b.unwrap();

            let snapshot = store.current();
            assert_eq!(snapshot.todo(10).unwrap().progress.value(), 60);
            assert!(snapshot.todo(11).unwrap().is_complete());
            assert_eq!(todo_ids(&store), vec![10, 12, 11]);
        }

        #[tokio::test]
        async fn progress_update_keeps_concurrent_todo_edit() {
            let (_dir, backend) = seeded();
            let store = SnapshotStore::new();
            store.refresh(&backend).await.unwrap();

            // An edit applied between the backend call and the list update
            // survives.
            let snapshots = store.subscribe();
            let updated = backend.update_todo_progress(10, 30).await.unwrap();
            store.replace_todos(vec![Todo::new(99, "Added elsewhere")]);
            store.upsert_todo(updated);

            assert_eq!(todo_ids(&store), vec![99, 10]);
            assert_eq!(snapshots.borrow().todos.len(), 2);
        }

        #[tokio::test]
        async fn todo_create_edit_delete() {
            let (_dir, backend) = seeded();
            let store = SnapshotStore::new();
            store.refresh(&backend).await.unwrap();
            let mut changes = store.changes();

            let created = store
                .save_todo(
                    &backend,
                    None,
                    TodoDto::new("Buy adapter")
                        .with_due_date(dt(11, 7))
                        .with_show_in_calendar(true),
                )
                .await
                .unwrap();
            assert_eq!(created.id, 13);
            assert_eq!(changes.recv().await.unwrap(), Change::Todos);
            // Due earliest, so first.
            assert_eq!(todo_ids(&store), vec![13, 11, 10, 12]);

            let edited = store
                .save_todo(&backend, Some(13), TodoDto::new("Buy two adapters"))
                .await
                .unwrap();
            assert_eq!(edited.title, "Buy two adapters");
            assert_eq!(edited.due_date, Some(dt(11, 7)));
            assert_eq!(store.current().todos.len(), 4);

            store.delete_todo(&backend, 11).await.unwrap();
            assert_eq!(changes.recv().await.unwrap(), Change::Todos);
            assert!(store.current().todo(11).is_none());
            assert!(store.current().diary(5).unwrap().related_todos.is_empty());
        }

        #[tokio::test]
        async fn diary_create_and_delete() {
            let (_dir, backend) = seeded();
            let store = SnapshotStore::new();
            store.refresh(&backend).await.unwrap();
            let mut changes = store.changes();

            let request = DiaryRequest {
                related_events: vec![2],
                ..DiaryRequest::new("After the dentist").with_date(dt(11, 18))
            };
            let saved = store.save_diary(&backend, None, request).await.unwrap();
            assert_eq!(saved.id, 7);
            assert_eq!(changes.recv().await.unwrap(), Change::Diaries);

            let snapshot = store.current();
            assert_eq!(snapshot.diaries[0].id, 7);
            assert_eq!(snapshot.diaries_on(date(11)).len(), 1);

            store.delete_diary(&backend, 7).await.unwrap();
            assert!(store.current().diary(7).is_none());
            assert_eq!(changes.recv().await.unwrap(), Change::Diaries);
        }

        #[tokio::test]
        async fn deleting_an_event_unlinks_diaries() {
            let (_dir, backend) = seeded();
            let store = SnapshotStore::new();
            store.refresh(&backend).await.unwrap();

            store.delete_event(&backend, 1).await.unwrap();
            assert!(store.current().diary(6).unwrap().related_events.is_empty());
        }

        #[test]
        fn replace_todos_sorts() {
            let store = SnapshotStore::new();
            store.replace_todos(vec![
                Todo::new(1, "done").with_progress(100),
                Todo::new(2, "later").with_due(dt(20, 9), false),
                Todo::new(3, "sooner").with_due(dt(12, 9), false),
            ]);
            assert_eq!(todo_ids(&store), vec![3, 2, 1]);
        }
    }
}
