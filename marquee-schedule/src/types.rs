//! Canonical schedule record types shared by every source backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel stored when a source omits a field for one schedule item.
///
/// Individual missing fields never fail an item; they default to this value
/// so the item survives normalisation and the consumer can render a blank.
pub const UNKNOWN_FIELD: &str = "N/A";

/// Canonical wire format for [`ScheduleEntry::raw_start`]: Tokyo-local
/// month.day hour:minute, no year, exactly as printed on the schedule page.
/// Backends that receive richer timestamps (the API) normalise down to this
/// format so the downstream filter has a single parse path.
pub const RAW_START_FORMAT: &str = "%m.%d %H:%M";

/// Live state of one schedule item as reported by the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveStatus {
    /// Upcoming stream with a scheduled start time.
    Scheduled,
    /// Currently airing.
    Live,
    /// The source reported a status we do not recognise.
    Unknown,
}

impl LiveStatus {
    /// Returns the human-readable name of this status.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Live => "live",
            Self::Unknown => "unknown",
        }
    }

    /// Returns `true` for [`LiveStatus::Live`].
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}

impl fmt::Display for LiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which source format produced a raw document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// The original public schedule page layout.
    LegacyPage,
    /// The redesigned schedule page layout.
    RevisedPage,
    /// The structured schedule API.
    Api,
}

impl BackendKind {
    /// Returns the human-readable name of this backend.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LegacyPage => "legacy-page",
            Self::RevisedPage => "revised-page",
            Self::Api => "api",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An unparsed payload returned by a source backend.
///
/// The body is HTML for the scrape backends and JSON for the API backend;
/// [`crate::source::parse_document`] dispatches on `backend`.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Which backend fetched this document.
    pub backend: BackendKind,
    /// The unparsed response body.
    pub body: String,
}

/// One normalised schedule item, backend-agnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Reconciliation key. Derived from the stream link when the source
    /// exposes one, falling back to the display name (see
    /// [`crate::normalize::derive_identity`]).
    pub identity: String,
    /// Channel or talent name as displayed by the source.
    pub display_name: String,
    /// Stream title / description text.
    pub description: String,
    /// Link to the stream.
    pub link: String,
    /// Source-format start timestamp (see [`RAW_START_FORMAT`]). Not parsed
    /// here; instant resolution happens downstream so parse failures stay
    /// localised and countable.
    pub raw_start: String,
    /// Resolved start instant. Absent until the filter resolves `raw_start`,
    /// and permanently absent when `raw_start` does not parse.
    #[serde(default)]
    pub parsed_start_utc: Option<DateTime<Utc>>,
    /// Live state reported by the source.
    pub live_status: LiveStatus,
    /// Channel avatar image.
    pub profile_image_url: String,
    /// Stream thumbnail image.
    pub thumbnail_url: String,
}

impl ScheduleEntry {
    /// Structural equality over every field except `identity`.
    ///
    /// Reconciliation treats two records with the same identity as unchanged
    /// only when all of their content matches.
    pub fn same_content(&self, other: &Self) -> bool {
        self.display_name == other.display_name
            && self.description == other.description
            && self.link == other.link
            && self.raw_start == other.raw_start
            && self.parsed_start_utc == other.parsed_start_utc
            && self.live_status == other.live_status
            && self.profile_image_url == other.profile_image_url
            && self.thumbnail_url == other.thumbnail_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_entry(identity: &str, name: &str) -> ScheduleEntry {
        ScheduleEntry {
            identity: identity.to_string(),
            display_name: name.to_string(),
            description: "Morning stream".to_string(),
            link: "https://www.youtube.com/watch?v=abc123".to_string(),
            raw_start: "08.05 21:00".to_string(),
            parsed_start_utc: None,
            live_status: LiveStatus::Scheduled,
            profile_image_url: UNKNOWN_FIELD.to_string(),
            thumbnail_url: UNKNOWN_FIELD.to_string(),
        }
    }

    #[test]
    fn live_status_display() {
        assert_eq!(LiveStatus::Scheduled.to_string(), "scheduled");
        assert_eq!(LiveStatus::Live.to_string(), "live");
        assert_eq!(LiveStatus::Unknown.to_string(), "unknown");
    }

    #[test]
    fn live_status_is_live() {
        assert!(LiveStatus::Live.is_live());
        assert!(!LiveStatus::Scheduled.is_live());
        assert!(!LiveStatus::Unknown.is_live());
    }

    #[test]
    fn backend_kind_display() {
        assert_eq!(BackendKind::LegacyPage.to_string(), "legacy-page");
        assert_eq!(BackendKind::RevisedPage.to_string(), "revised-page");
        assert_eq!(BackendKind::Api.to_string(), "api");
    }

    #[test]
    fn same_content_ignores_identity() {
        let a = make_entry("id-a", "Tokino Sora");
        let mut b = make_entry("id-b", "Tokino Sora");
        assert!(a.same_content(&b));

        b.live_status = LiveStatus::Live;
        assert!(!a.same_content(&b));
    }

    #[test]
    fn same_content_detects_field_changes() {
        let a = make_entry("id", "Tokino Sora");
        let mut b = a.clone();
        assert!(a.same_content(&b));

        b.description = "Evening stream".to_string();
        assert!(!a.same_content(&b));

        let mut c = a.clone();
        c.raw_start = "08.05 22:00".to_string();
        assert!(!a.same_content(&c));
    }

    #[test]
    fn entry_serde_round_trip() {
        let entry = make_entry("id", "Tokino Sora");
        let json = serde_json::to_string(&entry).expect("serialize");
        let decoded: ScheduleEntry = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded, entry);
    }

    #[test]
    fn parsed_start_defaults_to_none_in_serde() {
        let json = r#"{
            "identity": "x",
            "display_name": "x",
            "description": "x",
            "link": "x",
            "raw_start": "08.05 21:00",
            "live_status": "scheduled",
            "profile_image_url": "N/A",
            "thumbnail_url": "N/A"
        }"#;
        let decoded: ScheduleEntry = serde_json::from_str(json).expect("deserialize");
        assert!(decoded.parsed_start_utc.is_none());
    }
}
