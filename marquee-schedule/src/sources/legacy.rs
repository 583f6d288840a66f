//! Legacy schedule page scraper.
//!
//! The original public schedule page renders one `<li>` per stream under a
//! `<ul id="today">` container. Field extraction follows that structure:
//! start time, name, and title are `<p>` elements with well-known classes,
//! and a `now_on_air` class on the category element marks a stream that is
//! currently airing.

use crate::config::{SourceBackend, SourceConfig};
use crate::error::FetchError;
use crate::http;
use crate::normalize::derive_identity;
use crate::source::ScheduleSource;
use crate::sources::ensure_anchor;
use crate::types::{BackendKind, LiveStatus, RawDocument, ScheduleEntry, UNKNOWN_FIELD};
use scraper::{ElementRef, Html, Selector};

/// Content anchor that signals the schedule has rendered.
const ANCHOR: &str = "ul#today";

/// Legacy schedule page source.
pub struct LegacyPageSource;

impl ScheduleSource for LegacyPageSource {
    async fn fetch_document(&self, config: &SourceConfig) -> Result<RawDocument, FetchError> {
        let SourceBackend::LegacyPage { url } = &config.backend else {
            return Err(FetchError::Config(
                "legacy page source selected without a page url".into(),
            ));
        };

        tracing::trace!(url = %url, "fetching legacy schedule page");

        // Client is scoped to this fetch; dropped on every exit path.
        let client = http::build_client(config)?;
        let response = client
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| http::request_error("legacy page request failed", e))?
            .error_for_status()
            .map_err(|e| FetchError::Http(format!("legacy page HTTP error: {e}")))?;

        let body = response
            .text()
            .await
            .map_err(|e| http::request_error("legacy page read failed", e))?;

        tracing::trace!(bytes = body.len(), "legacy schedule page received");

        ensure_anchor(&body, ANCHOR, BackendKind::LegacyPage)?;
        Ok(RawDocument {
            backend: BackendKind::LegacyPage,
            body,
        })
    }

    fn backend_kind(&self) -> BackendKind {
        BackendKind::LegacyPage
    }
}

struct LegacySelectors {
    item: Selector,
    link: Selector,
    start: Selector,
    name: Selector,
    text: Selector,
    on_air: Selector,
    profile: Selector,
    thumbnail: Selector,
}

impl LegacySelectors {
    fn new() -> Option<Self> {
        Some(Self {
            item: Selector::parse("ul#today > li").ok()?,
            link: Selector::parse("a").ok()?,
            start: Selector::parse("p.start").ok()?,
            name: Selector::parse("p.name").ok()?,
            text: Selector::parse("p.txt").ok()?,
            on_air: Selector::parse("p.cat.now_on_air").ok()?,
            profile: Selector::parse("div.icon img").ok()?,
            thumbnail: Selector::parse("figure.left img").ok()?,
        })
    }
}

/// Parse a legacy schedule page into canonical entries.
///
/// Extracted as a separate function for testability with fixture HTML.
/// Missing fields default to the unknown sentinel; an item missing both its
/// name and link is dropped and counted.
pub(crate) fn parse_legacy_html(html: &str) -> Vec<ScheduleEntry> {
    let Some(sel) = LegacySelectors::new() else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let mut entries = Vec::new();
    let mut dropped = 0usize;

    for item in document.select(&sel.item) {
        let link = item
            .select(&sel.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .unwrap_or(UNKNOWN_FIELD)
            .trim()
            .to_string();
        let raw_start = text_or_unknown(&item, &sel.start);
        let display_name = text_or_unknown(&item, &sel.name);
        let description = text_or_unknown(&item, &sel.text);

        // A list item with neither name nor link is decoration, not a stream.
        if display_name == UNKNOWN_FIELD && link == UNKNOWN_FIELD {
            dropped += 1;
            continue;
        }

        let live_status = if item.select(&sel.on_air).next().is_some() {
            LiveStatus::Live
        } else {
            LiveStatus::Scheduled
        };

        let profile_image_url = attr_or_unknown(&item, &sel.profile, "src");
        let thumbnail_url = attr_or_unknown(&item, &sel.thumbnail, "src");

        entries.push(ScheduleEntry {
            identity: derive_identity(&link, &display_name),
            display_name,
            description,
            link,
            raw_start,
            parsed_start_utc: None,
            live_status,
            profile_image_url,
            thumbnail_url,
        });
    }

    if dropped > 0 {
        tracing::debug!(dropped, "malformed legacy schedule items dropped");
    }
    tracing::debug!(count = entries.len(), "legacy schedule page parsed");
    entries
}

fn text_or_unknown(item: &ElementRef<'_>, selector: &Selector) -> String {
    item.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_FIELD.to_string())
}

fn attr_or_unknown(item: &ElementRef<'_>, selector: &Selector, attr: &str) -> String {
    item.select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_FIELD.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MOCK_LEGACY_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<ul id="today">
  <li>
    <a href="https://www.youtube.com/watch?v=sora111">
      <p class="start">08.05 21:00</p>
      <p class="cat now_on_air">Hololive</p>
      <div class="icon clearfix"><img src="https://img.example.com/sora.png"></div>
      <p class="name">Tokino Sora</p>
      <p class="txt">Singing stream</p>
      <figure class="left"><img src="https://img.example.com/sora_thumb.jpg"></figure>
    </a>
  </li>
  <li>
    <a href="https://www.youtube.com/watch?v=mel222">
      <p class="start">08.05 22:30</p>
      <p class="cat">Hololive</p>
      <div class="icon clearfix"><img src="https://img.example.com/mel.png"></div>
      <p class="name">Yozora Mel</p>
      <p class="txt">Chatting</p>
      <figure class="left"><img src="https://img.example.com/mel_thumb.jpg"></figure>
    </a>
  </li>
  <li>
    <a href="https://www.youtube.com/watch?v=bare333">
      <p class="name">Bare Minimum</p>
    </a>
  </li>
  <li><p class="cat">decoration row</p></li>
</ul>
</body>
</html>"#;

    #[test]
    fn parse_mock_html_returns_entries() {
        let entries = parse_legacy_html(MOCK_LEGACY_HTML);
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].display_name, "Tokino Sora");
        assert_eq!(entries[0].raw_start, "08.05 21:00");
        assert_eq!(entries[0].description, "Singing stream");
        assert_eq!(entries[0].live_status, LiveStatus::Live);
        assert_eq!(entries[0].link, "https://www.youtube.com/watch?v=sora111");
        assert_eq!(entries[0].identity, "https://www.youtube.com/watch?v=sora111");
        assert_eq!(entries[0].profile_image_url, "https://img.example.com/sora.png");
        assert_eq!(entries[0].thumbnail_url, "https://img.example.com/sora_thumb.jpg");
        assert!(entries[0].parsed_start_utc.is_none());

        assert_eq!(entries[1].display_name, "Yozora Mel");
        assert_eq!(entries[1].live_status, LiveStatus::Scheduled);
    }

    #[test]
    fn missing_fields_default_to_sentinel() {
        let entries = parse_legacy_html(MOCK_LEGACY_HTML);
        let bare = &entries[2];
        assert_eq!(bare.display_name, "Bare Minimum");
        assert_eq!(bare.raw_start, UNKNOWN_FIELD);
        assert_eq!(bare.description, UNKNOWN_FIELD);
        assert_eq!(bare.profile_image_url, UNKNOWN_FIELD);
        assert_eq!(bare.thumbnail_url, UNKNOWN_FIELD);
        assert_eq!(bare.live_status, LiveStatus::Scheduled);
    }

    #[test]
    fn decoration_item_is_dropped() {
        let entries = parse_legacy_html(MOCK_LEGACY_HTML);
        assert!(entries.iter().all(|e| e.display_name != UNKNOWN_FIELD));
    }

    #[test]
    fn parse_empty_container_returns_empty() {
        let html = r#"<html><body><ul id="today"></ul></body></html>"#;
        assert!(parse_legacy_html(html).is_empty());
    }

    #[test]
    fn parse_ignores_items_outside_container() {
        let html = r#"<html><body>
            <ul id="today"></ul>
            <ul id="tomorrow"><li><p class="name">Not Today</p></li></ul>
        </body></html>"#;
        assert!(parse_legacy_html(html).is_empty());
    }

    // ── Fixture-based parser tests ──────────────────────────────────────

    const FIXTURE_LEGACY_HTML: &str = include_str!("../../test-data/legacy.html");

    #[test]
    fn fixture_extracts_all_items() {
        let entries = parse_legacy_html(FIXTURE_LEGACY_HTML);
        assert_eq!(entries.len(), 5);
    }

    #[test]
    fn fixture_marks_exactly_one_live() {
        let entries = parse_legacy_html(FIXTURE_LEGACY_HTML);
        let live: Vec<_> = entries.iter().filter(|e| e.live_status.is_live()).collect();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].display_name, "Hoshimachi Suisei");
    }

    #[test]
    fn fixture_entries_keep_source_order() {
        let entries = parse_legacy_html(FIXTURE_LEGACY_HTML);
        let starts: Vec<&str> = entries.iter().map(|e| e.raw_start.as_str()).collect();
        assert_eq!(
            starts,
            vec![
                "08.05 19:00",
                "08.05 21:00",
                "08.05 22:00",
                "not a time",
                "08.06 01:30"
            ]
        );
    }

    #[test]
    fn fixture_carries_unparsable_start_verbatim() {
        let entries = parse_legacy_html(FIXTURE_LEGACY_HTML);
        let odd = entries
            .iter()
            .find(|e| e.raw_start == "not a time")
            .expect("entry with odd start");
        // Carried through untouched; the downstream filter decides its fate.
        assert!(odd.parsed_start_utc.is_none());
    }

    // ── Fetch behaviour tests ───────────────────────────────────────────

    fn config_for(url: String) -> SourceConfig {
        SourceConfig {
            backend: SourceBackend::LegacyPage { url },
            timeout_seconds: 5,
            user_agent: Some("MarqueeTest/1.0".into()),
        }
    }

    #[tokio::test]
    async fn fetch_returns_document_when_anchor_present() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/en/schedule/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MOCK_LEGACY_HTML))
            .expect(1)
            .mount(&server)
            .await;

        let config = config_for(format!("{}/en/schedule/", server.uri()));
        let doc = LegacyPageSource
            .fetch_document(&config)
            .await
            .expect("fetch should succeed");
        assert_eq!(doc.backend, BackendKind::LegacyPage);
        assert_eq!(parse_legacy_html(&doc.body).len(), 3);
    }

    #[tokio::test]
    async fn fetch_fails_when_anchor_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body>under maintenance</body></html>"),
            )
            .mount(&server)
            .await;

        let config = config_for(format!("{}/en/schedule/", server.uri()));
        let err = LegacyPageSource.fetch_document(&config).await.unwrap_err();
        assert!(matches!(err, FetchError::MissingAnchor(_)));
    }

    #[tokio::test]
    async fn fetch_fails_on_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = config_for(format!("{}/en/schedule/", server.uri()));
        let err = LegacyPageSource.fetch_document(&config).await.unwrap_err();
        assert!(matches!(err, FetchError::Http(_)));
    }

    #[tokio::test]
    async fn fetch_rejects_mismatched_backend_config() {
        let config = SourceConfig {
            backend: SourceBackend::Api {
                base_url: "https://api.example.com/v2".into(),
                organization: "Hololive".into(),
                lookahead_hours: 24,
            },
            ..Default::default()
        };
        let err = LegacyPageSource.fetch_document(&config).await.unwrap_err();
        assert!(matches!(err, FetchError::Config(_)));
    }
}
