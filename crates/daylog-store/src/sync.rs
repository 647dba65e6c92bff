//! Bookkeeping for refresh attempts.

use chrono::{DateTime, Utc};

/// Outcome history of refreshes against the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    /// Number of consecutive failed refreshes.
    pub consecutive_failures: u32,
    pub last_sync: Option<DateTime<Utc>>,
    pub last_attempt: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl SyncState {
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.last_sync = Some(Utc::now());
        self.last_attempt = self.last_sync;
        self.last_error = None;
    }

    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.consecutive_failures += 1;
        self.last_attempt = Some(Utc::now());
        self.last_error = Some(error.into());
    }

    /// True when the most recent attempt failed.
    pub fn is_failing(&self) -> bool {
        self.consecutive_failures > 0
    }
}
