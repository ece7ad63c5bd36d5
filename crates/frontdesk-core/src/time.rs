//! Half-open time windows for slot queries.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A half-open time range `[start, end)` used to query slot listings.
///
/// Backends return slots whose start instants lie inside the window; a
/// slot starting exactly at `end` is excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Inclusive lower bound.
    pub start: DateTime<Utc>,
    /// Exclusive upper bound.
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new window. `start` must precede `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        debug_assert!(start < end, "time window must be non-empty");
        Self { start, end }
    }

    /// Window covering `days` days starting at `start`.
    pub fn days_from(start: DateTime<Utc>, days: i64) -> Self {
        Self::new(start, start + Duration::days(days))
    }

    /// Returns `true` if `instant` lies within `[start, end)`.
    ///
    /// Comparison is by instant; the offset attached to `instant` does not
    /// affect the result.
    pub fn contains<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> bool {
        instant >= &self.start && instant < &self.end
    }

    /// Length of the window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}
