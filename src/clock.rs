// Clock abstraction for the session guard
// A security decision is never made without a time reading, so the seam
// is fallible: a backend that cannot produce the current time reports an
// error and the guard fails closed.

use chrono::{DateTime, Utc};

/// Source of the current time for session lifetime decisions
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> Result<DateTime<Utc>, String>;
}

/// System clock backed by `chrono::Utc`
#[derive(Debug, Default, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<DateTime<Utc>, String> {
        Ok(Utc::now())
    }
}
