//! Wire types for the daylog REST backend.
//!
//! The backend speaks JSON over HTTP with camelCase field names and
//! zone-less `LocalDateTime` strings. This crate holds:
//! - the DTOs for events, todos, diaries, categories and visibility records
//! - their conversions into `daylog-core` types
//! - endpoint [`paths`]
//! - the [`Snapshot`] document used by the file backend
//!
//! # Example
//!
//! ```rust
//! use daylog_protocol::{EventDto, decode_body};
//!
//! let body = br#"[{"id":1,"title":"Standup","startTime":"2024-03-11T09:00:00","endTime":"2024-03-11T09:15:00","allDay":false}]"#;
//! let events: Vec<EventDto> = decode_body(body).unwrap();
//! let event = events.into_iter().next().unwrap().into_event().unwrap();
//! assert_eq!(event.title, "Standup");
//! ```

mod codec;
pub mod datetime;
mod error;
pub mod paths;
mod types;

pub use codec::{decode_body, decode_error_body, encode_body};
pub use error::{ProtocolError, ProtocolResult};
pub use types::{
    ApiErrorResponse, CategoryDto, CategoryVisibilityDto, DiaryDto, DiaryRequest, EventDto,
    FieldError, ProgressUpdate, Snapshot, TodoDto, VisibilityUpdate,
};

/// Maximum body size accepted or produced (4 MB).
pub const MAX_BODY_SIZE: usize = 4 * 1024 * 1024;
