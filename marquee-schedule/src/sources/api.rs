//! Structured schedule API client.
//!
//! Queries the `/live` endpoint with an organization name and lookahead
//! window, and normalises the JSON response into canonical entries. API
//! timestamps are full ISO-8601 instants; they are converted down to the
//! canonical Tokyo-local raw format so every backend feeds the downstream
//! filter the same wire format.

use crate::config::{SourceBackend, SourceConfig};
use crate::error::FetchError;
use crate::http;
use crate::normalize::derive_identity;
use crate::source::ScheduleSource;
use crate::types::{BackendKind, LiveStatus, RawDocument, ScheduleEntry, RAW_START_FORMAT, UNKNOWN_FIELD};
use chrono::DateTime;
use chrono_tz::Asia::Tokyo;
use serde::Deserialize;

/// Structured schedule API source.
pub struct ApiSource;

impl ScheduleSource for ApiSource {
    async fn fetch_document(&self, config: &SourceConfig) -> Result<RawDocument, FetchError> {
        let SourceBackend::Api {
            base_url,
            organization,
            lookahead_hours,
        } = &config.backend
        else {
            return Err(FetchError::Config(
                "api source selected without api parameters".into(),
            ));
        };

        let endpoint = format!("{}/live", base_url.trim_end_matches('/'));
        let hours = lookahead_hours.to_string();
        tracing::trace!(endpoint = %endpoint, organization = %organization, hours = %hours, "querying schedule api");

        let client = http::build_client(config)?;
        let response = client
            .get(&endpoint)
            .query(&[("org", organization.as_str()), ("hours", hours.as_str())])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| http::request_error("api request failed", e))?
            .error_for_status()
            .map_err(|e| FetchError::Http(format!("api HTTP error: {e}")))?;

        let body = response
            .text()
            .await
            .map_err(|e| http::request_error("api response read failed", e))?;

        // The anchor for the API backend: the body must be a JSON array.
        if serde_json::from_str::<Vec<serde_json::Value>>(&body).is_err() {
            return Err(FetchError::MissingAnchor(
                "api: response body is not a JSON array".into(),
            ));
        }

        Ok(RawDocument {
            backend: BackendKind::Api,
            body,
        })
    }

    fn backend_kind(&self) -> BackendKind {
        BackendKind::Api
    }
}

/// One item as returned by the schedule API.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ApiScheduleItem {
    title: String,
    status: String,
    start_scheduled: Option<String>,
    link: Option<String>,
    thumbnail: Option<String>,
    channel: ApiChannel,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ApiChannel {
    name: String,
    photo: Option<String>,
}

impl ApiScheduleItem {
    fn into_entry(self) -> ScheduleEntry {
        let display_name = non_empty_or_unknown(self.channel.name);
        let description = non_empty_or_unknown(self.title);
        let link = self
            .link
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| UNKNOWN_FIELD.to_string());

        let raw_start = match self.start_scheduled {
            // Unconvertible instants are carried verbatim; the filter will
            // drop and log them with the offending value.
            Some(iso) => tokyo_raw_start(&iso).unwrap_or(iso),
            None => UNKNOWN_FIELD.to_string(),
        };

        let live_status = match self.status.as_str() {
            "live" => LiveStatus::Live,
            "upcoming" => LiveStatus::Scheduled,
            _ => LiveStatus::Unknown,
        };

        ScheduleEntry {
            identity: derive_identity(&link, &display_name),
            display_name,
            description,
            link,
            raw_start,
            parsed_start_utc: None,
            live_status,
            profile_image_url: self
                .channel
                .photo
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
            thumbnail_url: self
                .thumbnail
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
        }
    }
}

fn non_empty_or_unknown(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        UNKNOWN_FIELD.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Convert an ISO-8601 instant into the canonical Tokyo-local raw format.
fn tokyo_raw_start(iso: &str) -> Option<String> {
    let instant = DateTime::parse_from_rfc3339(iso.trim()).ok()?;
    Some(instant.with_timezone(&Tokyo).format(RAW_START_FORMAT).to_string())
}

/// Parse an API response body into canonical entries.
///
/// Each array element is deserialised independently so one malformed item
/// drops alone instead of discarding the whole response.
pub(crate) fn parse_api_json(body: &str) -> Vec<ScheduleEntry> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(body) {
        Ok(values) => values,
        Err(e) => {
            tracing::error!(error = %e, "api body is not a JSON array");
            return Vec::new();
        }
    };

    let mut entries = Vec::with_capacity(values.len());
    let mut dropped = 0usize;
    for value in values {
        match serde_json::from_value::<ApiScheduleItem>(value) {
            Ok(item) => entries.push(item.into_entry()),
            Err(e) => {
                dropped += 1;
                tracing::debug!(error = %e, "malformed api item dropped");
            }
        }
    }

    if dropped > 0 {
        tracing::debug!(dropped, "malformed api items dropped");
    }
    tracing::debug!(count = entries.len(), "api response parsed");
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MOCK_API_JSON: &str = r#"[
  {
    "title": "Karaoke Night",
    "status": "live",
    "start_scheduled": "2024-06-15T03:00:00Z",
    "link": "https://www.youtube.com/watch?v=kara001",
    "thumbnail": "https://img.example.com/kara_thumb.jpg",
    "channel": { "name": "Tokino Sora", "photo": "https://img.example.com/sora.png" }
  },
  {
    "title": "Morning Chat",
    "status": "upcoming",
    "start_scheduled": "2024-06-15T23:30:00+09:00",
    "link": "https://www.youtube.com/watch?v=chat002",
    "channel": { "name": "Yozora Mel" }
  },
  {
    "title": "Mystery Frame",
    "status": "missing",
    "channel": { "name": "AZKi" }
  },
  "not an object"
]"#;

    #[test]
    fn tokyo_raw_start_converts_utc_instant() {
        // 03:00 UTC is 12:00 in Tokyo (UTC+9).
        assert_eq!(
            tokyo_raw_start("2024-06-15T03:00:00Z").as_deref(),
            Some("06.15 12:00")
        );
    }

    #[test]
    fn tokyo_raw_start_keeps_offset_instants() {
        // Already Tokyo-local offset; conversion is the identity.
        assert_eq!(
            tokyo_raw_start("2024-06-15T23:30:00+09:00").as_deref(),
            Some("06.15 23:30")
        );
    }

    #[test]
    fn tokyo_raw_start_rejects_garbage() {
        assert!(tokyo_raw_start("yesterday-ish").is_none());
    }

    #[test]
    fn parse_mock_json_returns_entries() {
        let entries = parse_api_json(MOCK_API_JSON);
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].display_name, "Tokino Sora");
        assert_eq!(entries[0].description, "Karaoke Night");
        assert_eq!(entries[0].live_status, LiveStatus::Live);
        assert_eq!(entries[0].raw_start, "06.15 12:00");
        assert_eq!(entries[0].identity, "https://www.youtube.com/watch?v=kara001");

        assert_eq!(entries[1].raw_start, "06.15 23:30");
        assert_eq!(entries[1].live_status, LiveStatus::Scheduled);
        assert_eq!(entries[1].profile_image_url, UNKNOWN_FIELD);
    }

    #[test]
    fn unrecognised_status_maps_to_unknown() {
        let entries = parse_api_json(MOCK_API_JSON);
        let azki = entries
            .iter()
            .find(|e| e.display_name == "AZKi")
            .expect("AZKi entry");
        assert_eq!(azki.live_status, LiveStatus::Unknown);
        assert_eq!(azki.raw_start, UNKNOWN_FIELD);
        assert_eq!(azki.link, UNKNOWN_FIELD);
        // No link, so identity falls back to the display name.
        assert_eq!(azki.identity, "AZKi");
    }

    #[test]
    fn malformed_array_element_dropped_alone() {
        let entries = parse_api_json(MOCK_API_JSON);
        // The trailing string element is dropped; the three objects survive.
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn non_array_body_parses_to_empty() {
        assert!(parse_api_json(r#"{"error":"rate limited"}"#).is_empty());
        assert!(parse_api_json("not json").is_empty());
    }

    // ── Fixture-based parser tests ──────────────────────────────────────

    const FIXTURE_API_JSON: &str = include_str!("../../test-data/api.json");

    #[test]
    fn fixture_extracts_all_items() {
        let entries = parse_api_json(FIXTURE_API_JSON);
        assert_eq!(entries.len(), 4);
    }

    #[test]
    fn fixture_raw_starts_are_tokyo_local() {
        let entries = parse_api_json(FIXTURE_API_JSON);
        for entry in entries.iter().filter(|e| e.raw_start != UNKNOWN_FIELD) {
            assert!(
                entry.raw_start.len() == "MM.dd HH:mm".len(),
                "unexpected raw start: {}",
                entry.raw_start
            );
        }
    }

    // ── Fetch behaviour tests ───────────────────────────────────────────

    #[tokio::test]
    async fn fetch_sends_org_and_hours_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/live"))
            .and(query_param("org", "Hololive"))
            .and(query_param("hours", "48"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MOCK_API_JSON))
            .expect(1)
            .mount(&server)
            .await;

        let config = SourceConfig {
            backend: SourceBackend::Api {
                base_url: format!("{}/v2", server.uri()),
                organization: "Hololive".into(),
                lookahead_hours: 48,
            },
            timeout_seconds: 5,
            user_agent: Some("MarqueeTest/1.0".into()),
        };

        let doc = ApiSource
            .fetch_document(&config)
            .await
            .expect("fetch should succeed");
        assert_eq!(doc.backend, BackendKind::Api);
        assert_eq!(parse_api_json(&doc.body).len(), 3);
    }

    #[tokio::test]
    async fn fetch_fails_on_non_array_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"error":"maintenance"}"#),
            )
            .mount(&server)
            .await;

        let config = SourceConfig {
            backend: SourceBackend::Api {
                base_url: server.uri(),
                organization: "Hololive".into(),
                lookahead_hours: 24,
            },
            timeout_seconds: 5,
            user_agent: Some("MarqueeTest/1.0".into()),
        };

        let err = ApiSource.fetch_document(&config).await.unwrap_err();
        assert!(matches!(err, FetchError::MissingAnchor(_)));
    }
}
