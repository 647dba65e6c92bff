//! `daylog todos` and the `daylog todo` actions.

use chrono::NaiveDateTime;
use daylog_core::Todo;
use daylog_protocol::TodoDto;
use tracing::info;

use super::{Context, to_json};
use crate::error::{ClientError, ClientResult};

/// Lists todos in list order: unfinished first, then by due date.
pub async fn list(ctx: &Context) -> ClientResult<String> {
    let snapshot = ctx.load().await?;
    if ctx.is_json() {
        return to_json(&snapshot.todos);
    }
    if snapshot.todos.is_empty() {
        return Ok("No todos".to_string());
    }
    Ok(snapshot
        .todos
        .iter()
        .map(todo_line)
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Sets a todo's progress. Out-of-range values are clamped.
pub async fn progress(ctx: &Context, id: i64, value: i64) -> ClientResult<String> {
    let snapshot = ctx.load().await?;
    if snapshot.todo(id).is_none() {
        return Err(ClientError::not_found("todo", id));
    }
    let todo = ctx
        .store
        .update_todo_progress(ctx.backend.as_ref(), id, value)
        .await?;
    info!(id, progress = todo.progress.value(), "Todo progress updated");
    if ctx.is_json() {
        return to_json(&todo);
    }
    Ok(todo_line(&todo))
}

/// Fields of `todo new` and `todo edit`. On edit `None` leaves a field
/// unchanged.
#[derive(Debug, Clone, Default)]
pub struct TodoFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due: Option<NaiveDateTime>,
    pub show_in_calendar: Option<bool>,
    pub category: Option<i64>,
    pub color: Option<String>,
}

impl TodoFields {
    fn payload(&self) -> TodoDto {
        let mut dto = TodoDto::new(self.title.as_deref().map(str::trim).unwrap_or_default());
        dto.description = self.description.clone();
        dto.due_date = self.due;
        dto.show_in_calendar = self.show_in_calendar;
        dto.color = self.color.clone();
        if let Some(id) = self.category {
            dto = dto.with_category_id(id);
        }
        dto
    }

    fn check(&self, category_exists: impl Fn(i64) -> bool) -> ClientResult<()> {
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(ClientError::InvalidArgument("title must not be empty".to_string()));
        }
        match self.category {
            Some(id) if !category_exists(id) => Err(ClientError::not_found("category", id)),
            _ => Ok(()),
        }
    }
}

/// Creates a todo with zero progress.
pub async fn create(ctx: &Context, fields: &TodoFields) -> ClientResult<String> {
    if fields.title.is_none() {
        return Err(ClientError::InvalidArgument("title must not be empty".to_string()));
    }
    let snapshot = ctx.load().await?;
    fields.check(|id| snapshot.category(id).is_some())?;

    let todo = ctx
        .store
        .save_todo(ctx.backend.as_ref(), None, fields.payload())
        .await?;
    info!(id = todo.id, title = %todo.title, "Todo created");
    if ctx.is_json() {
        return to_json(&todo);
    }
    Ok(format!("Created {}", todo_line(&todo)))
}

/// Updates the given fields of a todo. Progress is left alone; use
/// [`progress`] for that.
pub async fn edit(ctx: &Context, id: i64, fields: &TodoFields) -> ClientResult<String> {
    let snapshot = ctx.load().await?;
    if snapshot.todo(id).is_none() {
        return Err(ClientError::not_found("todo", id));
    }
    fields.check(|cid| snapshot.category(cid).is_some())?;

    let todo = ctx
        .store
        .save_todo(ctx.backend.as_ref(), Some(id), fields.payload())
        .await?;
    info!(id, title = %todo.title, "Todo updated");
    if ctx.is_json() {
        return to_json(&todo);
    }
    Ok(format!("Updated {}", todo_line(&todo)))
}

/// Deletes a todo.
pub async fn delete(ctx: &Context, id: i64) -> ClientResult<String> {
    let snapshot = ctx.load().await?;
    let title = snapshot
        .todo(id)
        .map(|t| t.title.clone())
        .ok_or_else(|| ClientError::not_found("todo", id))?;
    ctx.store.delete_todo(ctx.backend.as_ref(), id).await?;
    info!(id, "Todo deleted");
    if ctx.is_json() {
        return to_json(&serde_json::json!({ "deleted": id }));
    }
    Ok(format!("Deleted #{} {}", id, title))
}

fn todo_line(todo: &Todo) -> String {
    let mark = if todo.is_complete() { "x" } else { " " };
    let mut line = format!(
        "[{}] #{} {} ({}%",
        mark,
        todo.id,
        todo.title,
        todo.progress.value()
    );
    if let Some(due) = todo.due_date {
        line.push_str(&format!(", due {}", due.format("%Y-%m-%d %H:%M")));
    }
    line.push(')');
    line
}
