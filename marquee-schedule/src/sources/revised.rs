//! Revised schedule page scraper.
//!
//! The redesigned page replaces the `<ul>`/`<li>` list with card anchors
//! under a `#schedule-area` container. Cards carry BEM-style classes and an
//! explicit on-air badge element instead of a category class.

use crate::config::{SourceBackend, SourceConfig};
use crate::error::FetchError;
use crate::http;
use crate::normalize::derive_identity;
use crate::source::ScheduleSource;
use crate::sources::ensure_anchor;
use crate::types::{BackendKind, LiveStatus, RawDocument, ScheduleEntry, UNKNOWN_FIELD};
use scraper::{ElementRef, Html, Selector};

/// Content anchor that signals the schedule has rendered.
const ANCHOR: &str = "div#schedule-area";

/// Revised schedule page source.
pub struct RevisedPageSource;

impl ScheduleSource for RevisedPageSource {
    async fn fetch_document(&self, config: &SourceConfig) -> Result<RawDocument, FetchError> {
        let SourceBackend::RevisedPage { url } = &config.backend else {
            return Err(FetchError::Config(
                "revised page source selected without a page url".into(),
            ));
        };

        tracing::trace!(url = %url, "fetching revised schedule page");

        let client = http::build_client(config)?;
        let response = client
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| http::request_error("revised page request failed", e))?
            .error_for_status()
            .map_err(|e| FetchError::Http(format!("revised page HTTP error: {e}")))?;

        let body = response
            .text()
            .await
            .map_err(|e| http::request_error("revised page read failed", e))?;

        tracing::trace!(bytes = body.len(), "revised schedule page received");

        ensure_anchor(&body, ANCHOR, BackendKind::RevisedPage)?;
        Ok(RawDocument {
            backend: BackendKind::RevisedPage,
            body,
        })
    }

    fn backend_kind(&self) -> BackendKind {
        BackendKind::RevisedPage
    }
}

struct RevisedSelectors {
    card: Selector,
    name: Selector,
    start: Selector,
    title: Selector,
    on_air: Selector,
    icon: Selector,
    thumbnail: Selector,
}

impl RevisedSelectors {
    fn new() -> Option<Self> {
        Some(Self {
            card: Selector::parse("div#schedule-area a.schedule-card").ok()?,
            name: Selector::parse(".schedule-card__name").ok()?,
            start: Selector::parse(".schedule-card__start").ok()?,
            title: Selector::parse(".schedule-card__title").ok()?,
            on_air: Selector::parse(".schedule-card__badge--onair").ok()?,
            icon: Selector::parse("img.schedule-card__icon").ok()?,
            thumbnail: Selector::parse("img.schedule-card__thumb").ok()?,
        })
    }
}

/// Parse a revised schedule page into canonical entries.
pub(crate) fn parse_revised_html(html: &str) -> Vec<ScheduleEntry> {
    let Some(sel) = RevisedSelectors::new() else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let mut entries = Vec::new();
    let mut dropped = 0usize;

    for card in document.select(&sel.card) {
        let link = card
            .value()
            .attr("href")
            .unwrap_or(UNKNOWN_FIELD)
            .trim()
            .to_string();
        let display_name = text_or_unknown(&card, &sel.name);
        let raw_start = text_or_unknown(&card, &sel.start);
        let description = text_or_unknown(&card, &sel.title);

        if display_name == UNKNOWN_FIELD && link == UNKNOWN_FIELD {
            dropped += 1;
            continue;
        }

        let live_status = if card.select(&sel.on_air).next().is_some() {
            LiveStatus::Live
        } else {
            LiveStatus::Scheduled
        };

        let profile_image_url = attr_or_unknown(&card, &sel.icon, "src");
        let thumbnail_url = attr_or_unknown(&card, &sel.thumbnail, "src");

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
        tracing::debug!(dropped, "malformed revised schedule cards dropped");
    }
    tracing::debug!(count = entries.len(), "revised schedule page parsed");
    entries
}

fn text_or_unknown(card: &ElementRef<'_>, selector: &Selector) -> String {
    card.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_FIELD.to_string())
}

fn attr_or_unknown(card: &ElementRef<'_>, selector: &Selector, attr: &str) -> String {
    card.select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_FIELD.to_string())
}
