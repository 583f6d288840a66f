//! # marquee-schedule
//!
//! Embedded livestream schedule fetching for Marquee.
//!
//! This crate turns one configured source — a legacy schedule page scrape,
//! a revised-layout page scrape, or a structured API query — into a
//! normalised list of [`ScheduleEntry`] records. It compiles into the shell
//! binary as a library dependency; there are no network listeners and no
//! persistent sessions.
//!
//! ## Design
//!
//! - Exactly one backend is active per configured source, selected by a
//!   tagged [`SourceBackend`](config::SourceBackend) variant at startup
//! - Every fetch builds its own HTTP client and drops it on return; no
//!   browser session, cookie jar, or connection pool outlives a cycle
//! - Scrape backends verify a content anchor before handing the body on,
//!   so a half-rendered page is a fetch failure rather than an empty
//!   schedule
//! - Parsing is pure and fixture-testable; malformed items drop one at a
//!   time with a diagnostic, never failing the whole fetch
//! - Duplicate identities are dropped first-seen-wins and counted

pub mod config;
pub mod error;
pub mod http;
pub mod normalize;
pub mod source;
pub mod sources;
pub mod types;

pub use config::{SourceBackend, SourceConfig};
pub use error::{FetchError, Result};
pub use source::ScheduleSource;
pub use types::{BackendKind, LiveStatus, RawDocument, ScheduleEntry};

/// Fetch and normalise the schedule from the configured source.
///
/// Runs the full fetch path: backend dispatch, content-anchor verification,
/// pure parsing, and identity de-duplication. The returned entries keep the
/// source's display order.
///
/// # Errors
///
/// Returns [`FetchError`] when the configuration is invalid or the fetch
/// itself fails (network, timeout, HTTP status, missing anchor). Parsing
/// never fails: malformed items are dropped and counted.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> marquee_schedule::Result<()> {
/// let config = marquee_schedule::SourceConfig::default();
/// let entries = marquee_schedule::fetch_schedule(&config).await?;
/// for entry in &entries {
///     println!("{} — {}", entry.raw_start, entry.display_name);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn fetch_schedule(config: &SourceConfig) -> Result<Vec<ScheduleEntry>> {
    config.validate()?;
    let document = source::fetch_for(config).await?;
    let parsed = source::parse_document(&document);
    let entries = normalize::dedupe_by_identity(parsed);
    tracing::debug!(
        backend = %document.backend,
        count = entries.len(),
        "schedule fetched"
    );
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_validates_config_zero_timeout() {
        let config = SourceConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let result = fetch_schedule(&config).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout_seconds"));
    }

    #[tokio::test]
    async fn fetch_validates_config_bad_url() {
        let config = SourceConfig {
            backend: SourceBackend::LegacyPage { url: String::new() },
            ..Default::default()
        };
        let result = fetch_schedule(&config).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("schedule page url"));
    }
}
