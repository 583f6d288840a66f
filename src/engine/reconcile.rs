//! Keyed diff between the previously accepted schedule and a fresh fetch.
//!
//! Produces the minimal add/update/remove operations a consumer needs to
//! patch its view in place instead of rebuilding it every cycle. Pure and
//! clock-free: unit-testable with no fetch or network involved.

use marquee_schedule::ScheduleEntry;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One updated entry: identity plus the old and new record.
#[derive(Debug, Clone, Serialize)]
pub struct UpdatedEntry {
    /// Reconciliation key shared by both records.
    pub identity: String,
    /// The previously accepted record.
    pub old: ScheduleEntry,
    /// The record replacing it.
    pub new: ScheduleEntry,
}

/// Changes produced by one reconciliation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChangeSet {
    /// Entries whose identity was not previously accepted.
    pub added: Vec<ScheduleEntry>,
    /// Entries whose identity matched but whose content differs.
    pub updated: Vec<UpdatedEntry>,
    /// Identities present previously but absent from the new set.
    pub removed: Vec<String>,
    /// How many entries matched exactly. Diagnostics only.
    pub unchanged: usize,
}

impl ChangeSet {
    /// Returns `true` when nothing was added, updated, or removed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }

    /// One-line tally for the cycle log.
    pub fn summary(&self) -> String {
        format!(
            "{} added, {} updated, {} removed, {} unchanged",
            self.added.len(),
            self.updated.len(),
            self.removed.len(),
            self.unchanged
        )
    }
}

/// Diff `incoming` against `previous`, keyed by entry identity.
///
/// The returned state follows `incoming`'s order — the source defines
/// display order. Unchanged identities keep the *previous* record (with
/// its already-resolved start instant) so consumers holding derived state
/// against it see the same value object; updated identities take the new
/// record. Identities only in `previous` are reported removed and do not
/// appear in the new state.
///
/// Callers must hand in identity-unique inputs; the fetch layer
/// de-duplicates before entries get here.
pub fn reconcile(
    previous: &[ScheduleEntry],
    incoming: Vec<ScheduleEntry>,
) -> (Vec<ScheduleEntry>, ChangeSet) {
    let previous_by_identity: HashMap<&str, &ScheduleEntry> = previous
        .iter()
        .map(|entry| (entry.identity.as_str(), entry))
        .collect();
    let incoming_identities: HashSet<&str> = incoming
        .iter()
        .map(|entry| entry.identity.as_str())
        .collect();

    let mut changes = ChangeSet {
        removed: previous
            .iter()
            .filter(|entry| !incoming_identities.contains(entry.identity.as_str()))
            .map(|entry| entry.identity.clone())
            .collect(),
        ..ChangeSet::default()
    };

    let mut new_state = Vec::with_capacity(incoming.len());
    for entry in incoming {
        match previous_by_identity.get(entry.identity.as_str()) {
            Some(prev) if prev.same_content(&entry) => {
                changes.unchanged += 1;
                new_state.push((*prev).clone());
            }
            Some(prev) => {
                changes.updated.push(UpdatedEntry {
                    identity: entry.identity.clone(),
                    old: (*prev).clone(),
                    new: entry.clone(),
                });
                new_state.push(entry);
            }
            None => {
                changes.added.push(entry.clone());
                new_state.push(entry);
            }
        }
    }

    (new_state, changes)
}
