//! Schedule source backend implementations.
//!
//! Each module provides a struct implementing [`crate::source::ScheduleSource`]
//! that fetches one specific source format, plus a pure parser for that
//! format's raw documents.

pub mod api;
pub mod legacy;
pub mod revised;

pub use api::ApiSource;
pub use legacy::LegacyPageSource;
pub use revised::RevisedPageSource;

use crate::error::FetchError;
use crate::types::BackendKind;
use scraper::{Html, Selector};

/// Verify that a fetched page contains the content anchor that signals a
/// rendered schedule.
///
/// Scrape backends call this before handing the body downstream: a page
/// without its schedule container is a failed fetch, not an empty schedule.
pub(crate) fn ensure_anchor(
    html: &str,
    anchor: &str,
    backend: BackendKind,
) -> Result<(), FetchError> {
    let selector = Selector::parse(anchor).map_err(|e| {
        FetchError::MissingAnchor(format!("invalid anchor selector `{anchor}`: {e:?}"))
    })?;
    let document = Html::parse_document(html);
    if document.select(&selector).next().is_some() {
        Ok(())
    } else {
        Err(FetchError::MissingAnchor(format!(
            "{backend}: `{anchor}` not found in response"
        )))
    }
}
