//! Backend trait and implementations.
//!
//! - [`Backend`] - where events, todos, diaries and categories are read and written
//! - [`rest::RestBackend`] - the daylog server over HTTP (feature `rest`)
//! - [`FileBackend`] - a local JSON document, for offline use and tests
//! - [`BackendError`] - structured errors with retry classification
//!
//! # Example
//!
//! ```ignore
//! use daylog_backend::{Backend, FileBackend};
//!
//! let backend = FileBackend::new("/tmp/daylog.json");
//! let todos = backend.fetch_todos().await?;
//! ```

pub mod backend;
pub mod error;
pub mod file;
#[cfg(feature = "rest")]
pub mod rest;

pub use backend::{Backend, BoxFuture, ErrorBackend};
pub use error::{BackendError, BackendErrorCode, BackendResult};
pub use file::FileBackend;
#[cfg(feature = "rest")]
pub use rest::{RestBackend, RestConfig};
