//! Source configuration with sensible defaults.
//!
//! [`SourceConfig`] selects exactly one backend and controls request
//! behaviour. The backend is a tagged variant resolved once at startup,
//! never inferred from which optional parameter happens to be non-empty.

use crate::error::FetchError;
use crate::types::BackendKind;
use serde::{Deserialize, Serialize};
use url::Url;

/// Default lookahead window for the API backend, in hours.
fn default_lookahead_hours() -> u32 {
    24
}

/// Which backend to fetch the schedule from, with its parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceBackend {
    /// Scrape the original public schedule page layout.
    LegacyPage {
        /// Schedule page URL.
        url: String,
    },
    /// Scrape the redesigned schedule page layout.
    RevisedPage {
        /// Schedule page URL.
        url: String,
    },
    /// Query the structured schedule API.
    Api {
        /// API base URL, e.g. `https://api.example.com/v2`.
        base_url: String,
        /// Organization whose schedule to query.
        organization: String,
        /// How far ahead to ask the API for upcoming streams.
        #[serde(default = "default_lookahead_hours")]
        lookahead_hours: u32,
    },
}

impl SourceBackend {
    /// Returns which [`BackendKind`] this configuration selects.
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::LegacyPage { .. } => BackendKind::LegacyPage,
            Self::RevisedPage { .. } => BackendKind::RevisedPage,
            Self::Api { .. } => BackendKind::Api,
        }
    }
}

/// Configuration for schedule fetching.
///
/// Use [`Default::default()`] for the public legacy schedule page, or
/// construct with field overrides for custom behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Which backend to fetch from.
    pub backend: SourceBackend,
    /// HTTP request timeout in seconds. Must stay well under the refresh
    /// interval so a hung session cannot starve future cycles.
    pub timeout_seconds: u64,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            backend: SourceBackend::LegacyPage {
                url: "https://hololive.hololivepro.com/en/schedule/".to_string(),
            },
            timeout_seconds: 45,
            user_agent: None,
        }
    }
}

impl SourceConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `timeout_seconds` must be greater than 0
    /// - page URLs and the API base URL must be absolute http(s) URLs
    /// - the API organization must not be empty
    /// - the API lookahead window must be greater than 0
    pub fn validate(&self) -> Result<(), FetchError> {
        if self.timeout_seconds == 0 {
            return Err(FetchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        match &self.backend {
            SourceBackend::LegacyPage { url } | SourceBackend::RevisedPage { url } => {
                validate_http_url(url, "schedule page url")
            }
            SourceBackend::Api {
                base_url,
                organization,
                lookahead_hours,
            } => {
                validate_http_url(base_url, "api base_url")?;
                if organization.trim().is_empty() {
                    return Err(FetchError::Config("organization must not be empty".into()));
                }
                if *lookahead_hours == 0 {
                    return Err(FetchError::Config(
                        "lookahead_hours must be greater than 0".into(),
                    ));
                }
                Ok(())
            }
        }
    }
}

fn validate_http_url(raw: &str, field: &str) -> Result<(), FetchError> {
    let parsed =
        Url::parse(raw).map_err(|e| FetchError::Config(format!("{field} is invalid: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(FetchError::Config(format!(
            "{field} must be http(s), got `{other}`"
        ))),
    }
}
