//! Staleness filter and Tokyo-local start time resolution.
//!
//! Source timestamps are year-less `"MM.dd HH:mm"` strings in Japan
//! Standard Time. Resolution stamps them with the fetch instant's Tokyo
//! year — around New Year a date from the other side of the boundary
//! mis-resolves by a year; that matches the source format's own assumption
//! and is deliberately not corrected here.

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Asia::Tokyo;
use marquee_schedule::{LiveStatus, ScheduleEntry};
use tracing::{debug, warn};

/// Raw start format with the inferred year prepended.
const YEAR_STAMPED_FORMAT: &str = "%Y.%m.%d %H:%M";

/// Per-cycle filter tallies, for logs and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    /// Entries retained because they are currently airing.
    pub live: usize,
    /// Entries retained because they start inside the grace window or later.
    pub upcoming: usize,
    /// Entries dropped because their start time has passed.
    pub stale: usize,
    /// Entries dropped because their start time did not parse.
    pub invalid: usize,
}

impl FilterStats {
    /// Total entries retained.
    pub fn retained(&self) -> usize {
        self.live + self.upcoming
    }

    /// Total entries dropped.
    pub fn dropped(&self) -> usize {
        self.stale + self.invalid
    }
}

/// Resolve a raw source timestamp to a UTC instant.
///
/// Interprets `raw` as Tokyo-local time in the source's `"MM.dd HH:mm"`
/// format, with the year inferred from `now` converted to Tokyo. Returns
/// `None` when the string does not parse or names an impossible date.
pub fn resolve_start_utc(raw: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let year = now.with_timezone(&Tokyo).year();
    let stamped = format!("{year}.{}", raw.trim());
    let naive = NaiveDateTime::parse_from_str(&stamped, YEAR_STAMPED_FORMAT).ok()?;
    Tokyo
        .from_local_datetime(&naive)
        .single()
        .map(|t| t.with_timezone(&Utc))
}

/// Keep entries that are live or upcoming; drop the rest with tallies.
///
/// Retention rule: an entry survives iff it is currently airing, or its
/// start time resolves and lies at or after `now - grace`. Live entries are
/// never dropped, even with an unparsable start time. Resolved instants are
/// written back onto the retained entries.
pub fn filter_entries(
    entries: Vec<ScheduleEntry>,
    now: DateTime<Utc>,
    grace: Duration,
) -> (Vec<ScheduleEntry>, FilterStats) {
    let cutoff = now - grace;
    let mut kept = Vec::with_capacity(entries.len());
    let mut stats = FilterStats::default();

    for mut entry in entries {
        entry.parsed_start_utc = resolve_start_utc(&entry.raw_start, now);

        if entry.live_status == LiveStatus::Live {
            stats.live += 1;
            kept.push(entry);
            continue;
        }

        match entry.parsed_start_utc {
            Some(start) if start >= cutoff => {
                stats.upcoming += 1;
                kept.push(entry);
            }
            Some(start) => {
                stats.stale += 1;
                debug!(
                    name = %entry.display_name,
                    start = %start,
                    "stale entry dropped"
                );
            }
            None => {
                stats.invalid += 1;
                warn!(
                    name = %entry.display_name,
                    raw_start = %entry.raw_start,
                    "invalid start time format, entry dropped"
                );
            }
        }
    }

    (kept, stats)
}
