//! `daylog event new`, `daylog event edit` and `daylog event delete`.

use chrono::{Local, NaiveDate, NaiveDateTime};
use daylog_core::time::next_day;
use daylog_core::{Event, EventDraft, Selection, normalize};
use daylog_protocol::{CategoryDto, EventDto};
use tracing::info;

use super::day::render_event;
use super::{Context, to_json};
use crate::error::{ClientError, ClientResult};

/// Arguments of `event new`.
#[derive(Debug, Clone, Default)]
pub struct NewEvent {
    pub date: Option<NaiveDate>,
    pub from: Option<NaiveDate>,
    /// Inclusive.
    pub to: Option<NaiveDate>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<i64>,
    pub color: Option<String>,
}

impl NewEvent {
    /// The calendar selection these arguments describe. With nothing given
    /// the event covers `today`.
    pub fn selection(&self, today: NaiveDate) -> ClientResult<Selection> {
        match (self.date, self.from, self.to, self.start, self.end) {
            (Some(date), None, None, None, None) => Ok(Selection::Day { date }),
            (None, Some(from), Some(to), None, None) => {
                if to < from {
                    return Err(ClientError::InvalidArgument(format!(
                        "--to {to} is before --from {from}"
                    )));
                }
                Ok(Selection::Range {
                    start: from,
                    end_exclusive: next_day(to),
                })
            }
            (None, None, None, Some(start), Some(end)) => Ok(Selection::Explicit { start, end }),
            (None, None, None, None, None) => Ok(Selection::Day { date: today }),
            _ => Err(ClientError::InvalidArgument(
                "use one of --date, --from/--to or --start/--end".to_string(),
            )),
        }
    }

    fn payload(&self, draft: &EventDraft) -> EventDto {
        let mut dto = EventDto::from_draft(draft, self.title.trim());
        if let Some(ref description) = self.description {
            dto = dto.with_description(description.clone());
        }
        if let Some(id) = self.category {
            dto = dto.with_category_id(id);
        }
        if let Some(ref color) = self.color {
            dto = dto.with_color(color.clone());
        }
        dto
    }
}

/// Creates an event and renders what was stored.
pub async fn create(ctx: &Context, args: &NewEvent) -> ClientResult<String> {
    if args.title.trim().is_empty() {
        return Err(ClientError::InvalidArgument("title must not be empty".to_string()));
    }
    let selection = args.selection(Local::now().date_naive())?;
    let draft = EventDraft::from_selection(&selection);

    let snapshot = ctx.load().await?;
    if let Some(id) = args.category {
        if snapshot.category(id).is_none() {
            return Err(ClientError::not_found("category", id));
        }
    }

    let saved = ctx
        .store
        .save_event(ctx.backend.as_ref(), None, args.payload(&draft))
        .await?;
    info!(id = saved.id, title = %saved.title, "Event created");

    let display = normalize(&saved, &ctx.store.current().categories);
    if ctx.is_json() {
        return to_json(&display);
    }
    let category = args
        .category
        .and_then(|id| snapshot.category(id))
        .map(|c| c.name.as_str());
    Ok(format!("Created\n{}", render_event(&display, category)))
}

/// Arguments of `event edit`. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct EventEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    /// `Some(true)` for all-day, `Some(false)` for timed.
    pub all_day: Option<bool>,
    pub category: Option<i64>,
    pub color: Option<String>,
}

impl EventEdit {
    /// Applies the time changes to a draft of `event`: the all-day switch
    /// first, then the start, then the end.
    pub fn draft(&self, event: &Event, now: NaiveDateTime) -> EventDraft {
        let mut draft = EventDraft::from_event(event);
        if let Some(all_day) = self.all_day {
            draft.set_all_day(all_day, now);
        }
        if let Some(start) = self.start {
            draft.set_start(start);
        }
        if let Some(end) = self.end {
            draft.set_end(end);
        }
        draft
    }

    fn payload(&self, event: &Event, draft: &EventDraft) -> EventDto {
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .unwrap_or(event.title.as_str());
        let mut dto = EventDto {
            id: Some(event.id),
            ..EventDto::from_draft(draft, title)
        };
        let base = EventDto::from_event(event);
        dto.description = self.description.clone().or(base.description);
        dto.color = self.color.clone().or(base.color);
        dto.category = match self.category {
            Some(id) => Some(CategoryDto::reference(id)),
            None => base.category,
        };
        dto
    }
}

/// Edits an event and renders what was stored.
pub async fn edit(ctx: &Context, id: i64, args: &EventEdit) -> ClientResult<String> {
    if args.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ClientError::InvalidArgument("title must not be empty".to_string()));
    }
    let snapshot = ctx.load().await?;
    let event = snapshot
        .event(id)
        .ok_or_else(|| ClientError::not_found("event", id))?;
    if let Some(category_id) = args.category {
        if snapshot.category(category_id).is_none() {
            return Err(ClientError::not_found("category", category_id));
        }
    }

    let draft = args.draft(event, Local::now().naive_local());
    let saved = ctx
        .store
        .save_event(ctx.backend.as_ref(), Some(id), args.payload(event, &draft))
        .await?;
    info!(id, title = %saved.title, "Event updated");

    let display = normalize(&saved, &ctx.store.current().categories);
    if ctx.is_json() {
        return to_json(&display);
    }
    let category = saved
        .category
        .as_ref()
        .and_then(|c| snapshot.category(c.id))
        .map(|c| c.name.as_str());
    Ok(format!("Updated\n{}", render_event(&display, category)))
}

/// Deletes an event.
pub async fn delete(ctx: &Context, id: i64) -> ClientResult<String> {
    let snapshot = ctx.load().await?;
    let title = snapshot
        .event(id)
        .map(|e| e.title.clone())
        .ok_or_else(|| ClientError::not_found("event", id))?;
    ctx.store.delete_event(ctx.backend.as_ref(), id).await?;
    info!(id, "Event deleted");
    if ctx.is_json() {
        return to_json(&serde_json::json!({ "deleted": id }));
    }
    Ok(format!("Deleted #{} {}", id, title))
}
