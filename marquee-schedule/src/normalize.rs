//! Identity derivation and de-duplication for parsed schedule items.
//!
//! Identity is the reconciliation key. The stream link is preferred because
//! it carries a stable slug; the display name is the fallback when the
//! source omits the link. Name-based identity is a known limitation of the
//! upstream page (two streams with the same channel name would collide), so
//! derivation is kept in one place should a better key become available.

use crate::types::{ScheduleEntry, UNKNOWN_FIELD};
use std::collections::HashSet;

/// Derive the reconciliation identity for one schedule item.
///
/// Prefers the stream link when present and meaningful, otherwise falls
/// back to the trimmed display name.
pub fn derive_identity(link: &str, display_name: &str) -> String {
    let link = link.trim();
    if !link.is_empty() && link != UNKNOWN_FIELD {
        return link.to_string();
    }
    display_name.trim().to_string()
}

/// Drop entries whose identity was already seen, keeping the first
/// occurrence. Later duplicates are counted and logged.
///
/// First-seen-wins is an explicit contract: the source defines display
/// order, and the earliest occurrence is the one the page showed first.
pub fn dedupe_by_identity(entries: Vec<ScheduleEntry>) -> Vec<ScheduleEntry> {
    let mut seen: HashSet<String> = HashSet::with_capacity(entries.len());
    let mut kept = Vec::with_capacity(entries.len());
    let mut dropped = 0usize;

    for entry in entries {
        if seen.insert(entry.identity.clone()) {
            kept.push(entry);
        } else {
            dropped += 1;
        }
    }

    if dropped > 0 {
        tracing::debug!(dropped, "duplicate schedule identities dropped");
    }
    kept
}
