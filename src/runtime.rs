//! Runtime events emitted by the engine for UI and observability.
//!
//! This is the engine's only cross-context contract: publish an event,
//! then return. Consumers receive immutable snapshots — never a live
//! handle into engine state — so the read path needs no locking.

use crate::engine::reconcile::ChangeSet;
use chrono::{DateTime, Utc};
use marquee_schedule::ScheduleEntry;
use std::fmt;
use std::sync::Arc;

/// Pipeline stage identifiers used in logs and failure events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Fetching the raw document from the configured source.
    Fetching,
    /// Normalising raw content into canonical records.
    Parsing,
    /// Dropping stale and unparsable entries.
    Filtering,
    /// Diffing against the previously accepted snapshot.
    Reconciling,
    /// Handing the result to the consumer.
    Publishing,
}

impl PipelineStage {
    /// Returns the stage name as it appears in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Parsing => "parsing",
            Self::Filtering => "filtering",
            Self::Reconciling => "reconciling",
            Self::Publishing => "publishing",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A successfully reconciled schedule publication.
#[derive(Debug, Clone)]
pub struct ScheduleUpdate {
    /// The full accepted schedule, in source display order.
    pub snapshot: Arc<Vec<ScheduleEntry>>,
    /// What changed relative to the previous snapshot.
    pub changes: ChangeSet,
    /// When the producing fetch started.
    pub fetched_at: DateTime<Utc>,
}

/// Events that describe what the engine published "right now".
///
/// Raw errors never cross this channel; a failed cycle surfaces only as a
/// status flag so the UI can show a "last fetch failed at T" indicator
/// while continuing to render the previous snapshot.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A cycle completed and the accepted snapshot was replaced.
    Updated(ScheduleUpdate),
    /// A cycle failed; the previous snapshot remains in effect.
    FetchFailed {
        /// When the failing cycle started.
        at: DateTime<Utc>,
        /// The stage that failed.
        stage: PipelineStage,
        /// Human-readable cause.
        message: String,
    },
}
