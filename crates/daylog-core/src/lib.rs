//! Core types: events, todos, diaries, categories, day buckets, formatting
//!
//! Everything in this crate is pure and synchronous. The three calendar
//! conversions are:
//! - [`normalize`]: stored event to display event (exclusive end)
//! - [`denormalize`]: calendar selection to stored times (inclusive end)
//! - [`bucket`]: events and todos active on one day

pub mod bucket;
pub mod category;
pub mod denormalize;
pub mod diary;
pub mod event;
pub mod format;
pub mod normalize;
pub mod time;
pub mod todo;
pub mod tracing;

pub use bucket::{DayItem, bucket};
pub use category::{
    Category, CategoryIndex, CategoryRef, DEFAULT_COLOR, VisibilityRecord, merge_visibility,
};
pub use denormalize::{EventDraft, Selection, clamp_end, denormalize, next_full_hour};
pub use diary::{Diary, diaries_on, sort_diaries};
pub use event::{DisplayEvent, Event, EventTimes};
pub use format::{
    AgendaFormatter, FormatOptions, JsonAgenda, JsonDiary, JsonItem, OutputFormat, TimeFormat,
};
pub use normalize::{normalize, normalize_with};
pub use time::DayRange;
pub use todo::{Progress, Todo, TodoView, sort_for_list};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
