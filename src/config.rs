//! Configuration types for the schedule shell.
//!
//! Loaded from a TOML file at startup; every section has defaults so a
//! missing file or empty table still yields a runnable configuration. The
//! source backend is resolved here, once, into its tagged variant — engine
//! code never re-negotiates the source mid-run.

use crate::error::{Result, ShellError};
use marquee_schedule::SourceConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for the schedule shell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Schedule source selection and request behaviour.
    pub source: SourceConfig,
    /// Engine cadence settings.
    pub engine: EngineConfig,
    /// Shell log file settings.
    pub log: LogConfig,
}

/// Engine cadence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seconds between pipeline cycles.
    pub refresh_interval_secs: u64,
    /// Look-back window in seconds applied to non-live entries before they
    /// are dropped as stale.
    pub grace_window_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 30 * 60,
            grace_window_secs: 15 * 60,
        }
    }
}

/// Shell log file configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Directory for the rolling shell log. `None` disables file logging;
    /// diagnostics still go to stderr.
    pub directory: Option<PathBuf>,
    /// Log file name prefix.
    pub file_prefix: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_prefix: "marquee".to_string(),
        }
    }
}

impl ShellConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// The fetch timeout must stay under the refresh interval so a hung
    /// session cannot overlap the next scheduled cycle.
    pub fn validate(&self) -> Result<()> {
        self.source
            .validate()
            .map_err(|e| ShellError::Config(e.to_string()))?;

        if self.engine.refresh_interval_secs == 0 {
            return Err(ShellError::Config(
                "refresh_interval_secs must be greater than 0".into(),
            ));
        }
        if self.source.timeout_seconds >= self.engine.refresh_interval_secs {
            return Err(ShellError::Config(format!(
                "fetch timeout ({}s) must stay under the refresh interval ({}s)",
                self.source.timeout_seconds, self.engine.refresh_interval_secs
            )));
        }
        Ok(())
    }

    /// Load configuration from `path`, or from the default location when
    /// `None`. A missing default file yields [`ShellConfig::default()`]; an
    /// explicitly given path must exist and parse.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => match Self::default_config_path() {
                Some(default_path) if default_path.exists() => {
                    Self::load_from_file(&default_path)
                }
                _ => Ok(Self::default()),
            },
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ShellError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        toml::from_str(&contents)
            .map_err(|e| ShellError::Config(format!("cannot parse {}: {e}", path.display())))
    }

    /// Returns the default config file path (`<config dir>/marquee/config.toml`).
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("marquee").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use marquee_schedule::SourceBackend;

    #[test]
    fn default_config_is_valid() {
        let config = ShellConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.refresh_interval_secs, 1800);
        assert_eq!(config.engine.grace_window_secs, 900);
        assert!(config.log.directory.is_none());
    }

    #[test]
    fn zero_refresh_interval_rejected() {
        let mut config = ShellConfig::default();
        config.engine.refresh_interval_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("refresh_interval_secs"));
    }

    #[test]
    fn timeout_at_or_over_interval_rejected() {
        let mut config = ShellConfig::default();
        config.source.timeout_seconds = 1800;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("refresh interval"));
    }

    #[test]
    fn invalid_source_surfaces_as_config_error() {
        let mut config = ShellConfig::default();
        config.source.backend = SourceBackend::LegacyPage { url: String::new() };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ShellError::Config(_)));
    }

    #[test]
    fn toml_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");

        let mut config = ShellConfig::default();
        config.engine.refresh_interval_secs = 600;
        config.source.backend = SourceBackend::Api {
            base_url: "https://api.example.com/v2".into(),
            organization: "Hololive".into(),
            lookahead_hours: 48,
        };

        let toml_text = toml::to_string_pretty(&config).expect("serialize");
        std::fs::write(&path, toml_text).expect("write");

        let loaded = ShellConfig::load(Some(&path)).expect("load");
        assert_eq!(loaded.engine.refresh_interval_secs, 600);
        match loaded.source.backend {
            SourceBackend::Api {
                ref organization,
                lookahead_hours,
                ..
            } => {
                assert_eq!(organization, "Hololive");
                assert_eq!(lookahead_hours, 48);
            }
            _ => panic!("expected Api backend"),
        }
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[engine]\nrefresh_interval_secs = 900\n").expect("write");

        let loaded = ShellConfig::load(Some(&path)).expect("load");
        assert_eq!(loaded.engine.refresh_interval_secs, 900);
        assert_eq!(loaded.engine.grace_window_secs, 900);
        assert_eq!(loaded.source.timeout_seconds, 45);
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let err = ShellConfig::load(Some(Path::new("/nonexistent/marquee.toml"))).unwrap_err();
        assert!(matches!(err, ShellError::Config(_)));
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").expect("write");

        let err = ShellConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ShellError::Config(_)));
    }
}
