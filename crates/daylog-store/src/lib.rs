//! In-memory snapshot store for daylog views.
//!
//! This crate holds the client-side state shared by every view:
//! - [`Snapshot`]: events, todos, diaries and categories from one fetch
//! - [`SnapshotStore`]: the current snapshot behind a `watch` channel, with
//!   [`Change`] notices on a `broadcast` channel
//! - [`FetchTicket`]: orders concurrent fetches so stale results are dropped
//!
//! # Example
//!
//! ```rust,no_run
//! use daylog_backend::FileBackend;
//! use daylog_store::SnapshotStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = FileBackend::new("daylog.json");
//!     let store = SnapshotStore::new();
//!     store.refresh(&backend).await?;
//!
//!     let today = chrono::Local::now().date_naive();
//!     for item in store.day(today) {
//!         println!("{}", item.title());
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod snapshot;
mod store;
mod sync;

pub use error::{StoreError, StoreResult};
pub use snapshot::Snapshot;
pub use store::{Change, FetchData, FetchTicket, SnapshotStore};
pub use sync::SyncState;
