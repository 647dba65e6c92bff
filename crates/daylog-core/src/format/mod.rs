//! Output formatting for day agendas.
//!
//! This module renders a day bucket in two output formats:
//! - **Text**: Human-readable terminal output, one line per item
//! - **JSON**: Machine-readable output
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use daylog_core::format::{AgendaFormatter, FormatOptions};
//!
//! let formatter = AgendaFormatter::new(FormatOptions::default());
//! let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
//! let text = formatter.format_text(date, &[]);
//! assert!(text.ends_with("Nothing planned"));
//! ```

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::bucket::DayItem;
use crate::diary::Diary;
use crate::event::DisplayEvent;
use crate::time;
use crate::todo::TodoView;

/// The output format for agenda display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable terminal output.
    #[default]
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Time format preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// 24-hour format (e.g., "14:30").
    #[default]
    H24,
    /// 12-hour format with AM/PM (e.g., "02:30 PM").
    H12,
}

/// Configuration options for agenda formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Maximum length for titles (truncated with ellipsis).
    pub max_title_length: Option<usize>,
    /// Time format preference.
    pub time_format: TimeFormat,
    /// Hour separator character (e.g., ":", "h").
    pub hour_separator: String,
    /// Text shown when the day has no items.
    pub empty_text: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            max_title_length: None,
            time_format: TimeFormat::H24,
            hour_separator: ":".to_string(),
            empty_text: "Nothing planned".to_string(),
        }
    }
}

/// JSON output for one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonAgenda {
    /// The day rendered.
    pub date: NaiveDate,
    /// Items in bucket order.
    pub items: Vec<JsonItem>,
    /// Number of items.
    pub count: usize,
    /// Diary entries written for the day.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diaries: Vec<JsonDiary>,
}

impl JsonAgenda {
    /// Attaches the day's diary entries.
    #[must_use]
    pub fn with_diaries(mut self, diaries: Vec<JsonDiary>) -> Self {
        self.diaries = diaries;
        self
    }
}

/// A diary entry in JSON format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonDiary {
    pub id: i64,
    pub title: String,
    pub time_display: String,
    pub related_events: Vec<i64>,
    pub related_todos: Vec<i64>,
}

/// A single agenda item in JSON format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonItem {
    /// `"event"` or `"todo"`.
    pub kind: String,
    pub id: i64,
    /// Title (may be truncated).
    pub title: String,
    /// Formatted time string for display.
    pub time_display: String,
    pub color: String,
    pub all_day: bool,
    /// Completion flag, todos only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,
}

/// Agenda formatter.
#[derive(Debug, Clone)]
pub struct AgendaFormatter {
    options: FormatOptions,
}

impl AgendaFormatter {
    /// Creates a new formatter with the given options.
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    /// Creates a new formatter with default options.
    pub fn with_defaults() -> Self {
        Self::new(FormatOptions::default())
    }

    /// Formats one line per item.
    pub fn format_lines(&self, items: &[DayItem]) -> Vec<String> {
        items.iter().map(|item| self.format_line(item)).collect()
    }

    /// Formats a day as text: a date header followed by the item lines, or
    /// the configured empty text.
    pub fn format_text(&self, date: NaiveDate, items: &[DayItem]) -> String {
        let header = date.format("%A, %B %-d %Y").to_string();
        if items.is_empty() {
            return format!("{}\n  {}", header, self.options.empty_text);
        }
        let mut out = header;
        for line in self.format_lines(items) {
            out.push_str("\n  ");
            out.push_str(&line);
        }
        out
    }

    /// Formats a day for JSON output.
    pub fn format_json(&self, date: NaiveDate, items: &[DayItem]) -> JsonAgenda {
        let items: Vec<JsonItem> = items
            .iter()
            .map(|item| match item {
                DayItem::Event(e) => JsonItem {
                    kind: "event".to_string(),
                    id: e.id,
                    title: self.title(&e.title).into_owned(),
                    time_display: self.event_time(e),
                    color: e.display_color.clone(),
                    all_day: e.all_day,
                    complete: None,
                },
                DayItem::Todo(t) => JsonItem {
                    kind: "todo".to_string(),
                    id: t.id,
                    title: self.title(&t.title).into_owned(),
                    time_display: self.clock(t.due_date),
                    color: t.display_color.clone(),
                    all_day: false,
                    complete: Some(t.complete),
                },
            })
            .collect();
        JsonAgenda {
            date,
            count: items.len(),
            items,
            diaries: Vec::new(),
        }
    }

    /// Formats one line per diary entry.
    pub fn format_diary_lines(&self, diaries: &[&Diary]) -> Vec<String> {
        diaries.iter().map(|d| self.diary_line(d)).collect()
    }

    /// Formats diary entries for JSON output.
    pub fn format_diaries_json(&self, diaries: &[&Diary]) -> Vec<JsonDiary> {
        diaries
            .iter()
            .map(|d| JsonDiary {
                id: d.id,
                title: self.title(&d.title).into_owned(),
                time_display: self.clock(d.date),
                related_events: d.related_events.clone(),
                related_todos: d.related_todos.clone(),
            })
            .collect()
    }

    fn diary_line(&self, diary: &Diary) -> String {
        let mut line = format!("{}  {}", self.clock(diary.date), self.title(&diary.title));
        let links = diary.related_events.len() + diary.related_todos.len();
        if links > 0 {
            line.push_str(&format!(" ({} linked)", links));
        }
        line
    }

    fn format_line(&self, item: &DayItem) -> String {
        match item {
            DayItem::Event(e) => format!("{}  {}", self.event_time(e), self.title(&e.title)),
            DayItem::Todo(t) => self.todo_line(t),
        }
    }

    fn todo_line(&self, todo: &TodoView) -> String {
        let title = self.title(&todo.title);
        if todo.complete {
            format!("[x] {} (due {})", title, self.clock(todo.due_date))
        } else {
            format!(
                "[ ] {} ({}%, due {})",
                title,
                todo.progress,
                self.clock(todo.due_date)
            )
        }
    }

    fn event_time(&self, event: &DisplayEvent) -> String {
        if event.all_day {
            let days = event.to_stored_times();
            let span = time::DayRange::new(days.start_time.date(), days.end_time.date());
            return if span.len_days() > 1 {
                format!(
                    "All day ({} - {})",
                    span.first.format("%b %-d"),
                    span.last.format("%b %-d")
                )
            } else {
                "All day".to_string()
            };
        }
        format!(
            "{}-{}",
            self.clock(event.display_start),
            self.clock(event.display_end)
        )
    }

    fn clock(&self, dt: NaiveDateTime) -> String {
        let sep = &self.options.hour_separator;
        match self.options.time_format {
            TimeFormat::H24 => dt.format(&format!("%H{}%M", sep)).to_string(),
            TimeFormat::H12 => dt.format(&format!("%I{}%M %p", sep)).to_string(),
        }
    }

    fn title<'a>(&self, title: &'a str) -> Cow<'a, str> {
        match self.options.max_title_length {
            Some(max) => ellipsis(title, max),
            None => Cow::Borrowed(title),
        }
    }
}

/// Truncates a string to a maximum character count, adding "..." if truncated.
pub fn ellipsis(s: &str, max_len: usize) -> Cow<'_, str> {
    if max_len == 0 {
        return Cow::Borrowed("");
    }

    if s.chars().count() <= max_len {
        return Cow::Borrowed(s);
    }

    let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
    Cow::Owned(format!("{}...", truncated))
}
