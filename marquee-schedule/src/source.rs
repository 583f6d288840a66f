//! Trait definition for pluggable schedule source backends.
//!
//! Each backend (legacy page, revised page, structured API) implements
//! [`ScheduleSource`] to provide a uniform fetch interface. Parsing is a
//! separate, pure dispatch so that it can run against fixture documents
//! with no network involved.

use crate::config::{SourceBackend, SourceConfig};
use crate::error::FetchError;
use crate::sources::{ApiSource, LegacyPageSource, RevisedPageSource};
use crate::types::{BackendKind, RawDocument, ScheduleEntry};

/// A pluggable schedule source backend.
///
/// Implementors fetch one raw document per call. Each backend handles its
/// own URL construction, request headers, and content-anchor verification.
/// Network resources are scoped to the call: nothing is held between
/// fetches. All implementations must be `Send + Sync`.
pub trait ScheduleSource: Send + Sync {
    /// Fetch the raw schedule document.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the HTTP request fails, times out, or the
    /// response lacks the content anchor that signals a rendered schedule.
    /// Backends never retry; the caller's cycle cadence is the retry policy.
    fn fetch_document(
        &self,
        config: &SourceConfig,
    ) -> impl std::future::Future<Output = Result<RawDocument, FetchError>> + Send;

    /// Returns which [`BackendKind`] this implementation represents.
    fn backend_kind(&self) -> BackendKind;
}

/// Fetch the raw document for the configured backend.
pub(crate) async fn fetch_for(config: &SourceConfig) -> Result<RawDocument, FetchError> {
    match &config.backend {
        SourceBackend::LegacyPage { .. } => LegacyPageSource.fetch_document(config).await,
        SourceBackend::RevisedPage { .. } => RevisedPageSource.fetch_document(config).await,
        SourceBackend::Api { .. } => ApiSource.fetch_document(config).await,
    }
}

/// Parse a raw document into canonical entries (pure dispatch, no I/O).
///
/// Malformed individual items are dropped and counted inside the backend
/// parsers; this function never fails the pipeline.
pub(crate) fn parse_document(document: &RawDocument) -> Vec<ScheduleEntry> {
    match document.backend {
        BackendKind::LegacyPage => crate::sources::legacy::parse_legacy_html(&document.body),
        BackendKind::RevisedPage => crate::sources::revised::parse_revised_html(&document.body),
        BackendKind::Api => crate::sources::api::parse_api_json(&document.body),
    }
}
