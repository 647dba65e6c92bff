//! `daylog diary` actions.

use chrono::{NaiveDate, NaiveDateTime};
use daylog_core::Diary;
use daylog_protocol::DiaryRequest;
use daylog_store::Snapshot;
use tracing::info;

use super::{Context, to_json};
use crate::error::{ClientError, ClientResult};

/// Arguments of `diary new`.
#[derive(Debug, Clone, Default)]
pub struct NewDiary {
    pub title: String,
    pub content: String,
    /// Defaults to now on the server.
    pub date: Option<NaiveDateTime>,
    pub events: Vec<i64>,
    pub todos: Vec<i64>,
}

/// Arguments of `diary edit`.
#[derive(Debug, Clone, Default)]
pub struct DiaryEdit {
    pub title: Option<String>,
    pub content: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub events: Vec<i64>,
    pub todos: Vec<i64>,
    /// Drop every link.
    pub unlink: bool,
}

impl DiaryEdit {
    /// The full request for `diary`. The backend replaces links and resets
    /// a missing date to now, so unchanged fields are sent back as stored.
    pub fn request(&self, diary: &Diary) -> DiaryRequest {
        let mut request = DiaryRequest::from_diary(diary);
        if let Some(ref title) = self.title {
            request.title = title.trim().to_string();
        }
        if let Some(ref content) = self.content {
            request.content = content.clone();
        }
        if let Some(date) = self.date {
            request.date = Some(date);
        }
        if self.unlink || !self.events.is_empty() || !self.todos.is_empty() {
            request.related_events = self.events.clone();
            request.related_todos = self.todos.clone();
        }
        request
    }
}

/// Lists entries newest first, optionally only those for `date`.
pub async fn list(ctx: &Context, date: Option<NaiveDate>) -> ClientResult<String> {
    let snapshot = ctx.load().await?;
    let diaries: Vec<&Diary> = match date {
        Some(date) => snapshot.diaries_on(date),
        None => snapshot.diaries.iter().collect(),
    };
    if ctx.is_json() {
        return to_json(&diaries);
    }
    if diaries.is_empty() {
        return Ok("No diary entries".to_string());
    }
    Ok(diaries
        .iter()
        .map(|d| diary_line(d))
        .collect::<Vec<_>>()
        .join("\n"))
}

pub async fn show(ctx: &Context, id: i64) -> ClientResult<String> {
    let snapshot = ctx.load().await?;
    let diary = snapshot
        .diary(id)
        .ok_or_else(|| ClientError::not_found("diary", id))?;
    if ctx.is_json() {
        return to_json(diary);
    }
    Ok(render_diary(diary, &snapshot))
}

/// Writes a new entry.
pub async fn create(ctx: &Context, args: &NewDiary) -> ClientResult<String> {
    let title = args.title.trim();
    if title.is_empty() {
        return Err(ClientError::InvalidArgument("title must not be empty".to_string()));
    }
    let snapshot = ctx.load().await?;
    check_links(&snapshot, &args.events, &args.todos)?;

    let request = DiaryRequest {
        content: args.content.clone(),
        date: args.date,
        related_events: args.events.clone(),
        related_todos: args.todos.clone(),
        ..DiaryRequest::new(title)
    };
    let saved = ctx
        .store
        .save_diary(ctx.backend.as_ref(), None, request)
        .await?;
    info!(id = saved.id, title = %saved.title, "Diary entry created");
    if ctx.is_json() {
        return to_json(&saved);
    }
    Ok(format!("Created\n{}", render_diary(&saved, &ctx.store.current())))
}

pub async fn edit(ctx: &Context, id: i64, args: &DiaryEdit) -> ClientResult<String> {
    if args.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ClientError::InvalidArgument("title must not be empty".to_string()));
    }
    let snapshot = ctx.load().await?;
    let diary = snapshot
        .diary(id)
        .ok_or_else(|| ClientError::not_found("diary", id))?;
    check_links(&snapshot, &args.events, &args.todos)?;

    let saved = ctx
        .store
        .save_diary(ctx.backend.as_ref(), Some(id), args.request(diary))
        .await?;
    info!(id, title = %saved.title, "Diary entry updated");
    if ctx.is_json() {
        return to_json(&saved);
    }
    Ok(format!("Updated\n{}", render_diary(&saved, &ctx.store.current())))
}

pub async fn delete(ctx: &Context, id: i64) -> ClientResult<String> {
    let snapshot = ctx.load().await?;
    let title = snapshot
        .diary(id)
        .map(|d| d.title.clone())
        .ok_or_else(|| ClientError::not_found("diary", id))?;
    ctx.store.delete_diary(ctx.backend.as_ref(), id).await?;
    info!(id, "Diary entry deleted");
    if ctx.is_json() {
        return to_json(&serde_json::json!({ "deleted": id }));
    }
    Ok(format!("Deleted #{} {}", id, title))
}

fn check_links(snapshot: &Snapshot, events: &[i64], todos: &[i64]) -> ClientResult<()> {
    if let Some(&id) = events.iter().find(|&&id| snapshot.event(id).is_none()) {
        return Err(ClientError::not_found("event", id));
    }
    if let Some(&id) = todos.iter().find(|&&id| snapshot.todo(id).is_none()) {
        return Err(ClientError::not_found("todo", id));
    }
    Ok(())
}

fn diary_line(diary: &Diary) -> String {
    format!(
        "#{} {}  {}",
        diary.id,
        diary.date.format("%Y-%m-%d %H:%M"),
        diary.title
    )
}

fn render_diary(diary: &Diary, snapshot: &Snapshot) -> String {
    let mut lines = vec![
        format!("#{} {}", diary.id, diary.title),
        format!("  date:     {}", diary.date.format("%Y-%m-%d %H:%M")),
    ];
    let events: Vec<String> = diary
        .related_events
        .iter()
        .map(|&id| match snapshot.event(id) {
            Some(e) => format!("#{} {}", id, e.title),
            None => format!("#{}", id),
        })
        .collect();
    if !events.is_empty() {
        lines.push(format!("  events:   {}", events.join(", ")));
    }
    let todos: Vec<String> = diary
        .related_todos
        .iter()
        .map(|&id| match snapshot.todo(id) {
            Some(t) => format!("#{} {}", id, t.title),
            None => format!("#{}", id),
        })
        .collect();
    if !todos.is_empty() {
        lines.push(format!("  todos:    {}", todos.join(", ")));
    }
    if !diary.content.is_empty() {
        lines.push(String::new());
        lines.extend(diary.content.lines().map(|l| format!("  {}", l)));
    }
    lines.join("\n")
}
