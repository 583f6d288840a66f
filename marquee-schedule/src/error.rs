//! Error types for the marquee-schedule crate.
//!
//! All fetch-side failures collapse into [`FetchError`]; none are retried
//! here. Retry policy belongs to the engine driving the fetch, which treats
//! any variant the same way: keep the last accepted schedule and wait for
//! the next cycle.

/// Errors that can occur while fetching a schedule document.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// An HTTP request failed (connection, status, navigation, body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The request exceeded the configured timeout.
    #[error("fetch timed out: {0}")]
    Timeout(String),

    /// The response arrived but the expected content anchor was missing —
    /// the page has not rendered the schedule container, or the API body
    /// is not the expected shape.
    #[error("missing content anchor: {0}")]
    MissingAnchor(String),

    /// Invalid source configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for marquee-schedule results.
pub type Result<T> = std::result::Result<T, FetchError>;
