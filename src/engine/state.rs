//! Engine-owned state: the last accepted schedule snapshot.
//!
//! Exactly one writer (the engine runner) mutates this; consumers only ever
//! receive immutable snapshot clones through published events. State starts
//! empty and is rebuilt from the first fetch of each process run — nothing
//! is persisted across restarts.

use chrono::{DateTime, Utc};
use marquee_schedule::ScheduleEntry;

/// Outcome of the most recent pipeline cycle, for observability.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// When the cycle started.
    pub at: DateTime<Utc>,
    /// Whether the cycle replaced the accepted snapshot.
    pub ok: bool,
    /// Cycle summary on success, failure cause otherwise.
    pub message: String,
}

/// Process-wide engine state.
#[derive(Debug, Default)]
pub struct EngineState {
    /// Last successfully reconciled snapshot, in source display order.
    accepted: Vec<ScheduleEntry>,
    /// Outcome of the most recent cycle.
    last_fetch: Option<FetchOutcome>,
}

impl EngineState {
    /// Returns the accepted snapshot.
    pub fn accepted(&self) -> &[ScheduleEntry] {
        &self.accepted
    }

    /// Returns the outcome of the most recent cycle, if any ran.
    pub fn last_fetch(&self) -> Option<&FetchOutcome> {
        self.last_fetch.as_ref()
    }

    /// Replace the accepted snapshot wholesale after a successful cycle.
    pub(crate) fn record_success(
        &mut self,
        at: DateTime<Utc>,
        entries: Vec<ScheduleEntry>,
        summary: String,
    ) {
        self.accepted = entries;
        self.last_fetch = Some(FetchOutcome {
            at,
            ok: true,
            message: summary,
        });
    }

    /// Record a failed cycle. The accepted snapshot is left untouched:
    /// stale-but-valid data beats no data.
    pub(crate) fn record_failure(&mut self, at: DateTime<Utc>, message: String) {
        self.last_fetch = Some(FetchOutcome {
            at,
            ok: false,
            message,
        });
    }
}
