//! Client configuration.
//!
//! Settings are read from `<config_dir>/pomodoro-client/config.json` when
//! present. Every field has a default, so a missing file or a partial file
//! is fine. Command-line flags are applied on top by the caller.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::{DEFAULT_BREAK_MINUTES, DEFAULT_WORK_MINUTES};

/// Directory name under the platform config directory.
const CONFIG_DIR_NAME: &str = "pomodoro-client";

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.json";

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_message_seconds() -> u64 {
    4
}

fn default_work_minutes() -> u32 {
    DEFAULT_WORK_MINUTES
}

fn default_break_minutes() -> u32 {
    DEFAULT_BREAK_MINUTES
}

/// Errors that can occur while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for this schema.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// File path
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Client configuration.
///
/// # Example
///
/// ```
/// use pomodoro_client::config::AppConfig;
///
/// let config = AppConfig::default();
/// assert_eq!(config.base_url, "http://localhost:8080");
/// assert_eq!(config.message_seconds, 4);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the session service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How long transient messages stay visible, in seconds.
    #[serde(default = "default_message_seconds")]
    pub message_seconds: u64,

    /// Initial work duration in minutes.
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,

    /// Initial break duration in minutes.
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,

    /// IANA time zone name overriding local detection.
    #[serde(default)]
    pub timezone: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            message_seconds: default_message_seconds(),
            work_minutes: default_work_minutes(),
            break_minutes: default_break_minutes(),
            timezone: None,
        }
    }
}

impl AppConfig {
    /// Returns the default config file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Loads the config from the default location, or defaults if absent.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Loads and validates the config at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Overrides the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if url::Url::parse(&self.base_url).is_err() {
            return Err(ConfigError::Invalid(format!(
                "base_url '{}' is not a valid URL",
                self.base_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.work_minutes == 0 || self.break_minutes == 0 {
            return Err(ConfigError::Invalid(
                "work_minutes and break_minutes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the configured time zone override, if it names a known zone.
    pub fn timezone_override(&self) -> Option<Tz> {
        let name = self.timezone.as_deref()?;
        match name.parse::<Tz>() {
            Ok(tz) => Some(tz),
            Err(_) => {
                tracing::warn!("unknown time zone '{}' in config, ignoring", name);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.message_seconds, 4);
        assert_eq!(config.work_minutes, 25);
        assert_eq!(config.break_minutes, 5);
        assert!(config.timezone.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let file = write_config(r#"{"base_url": "http://focus.test:9000", "break_minutes": 10}"#);
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.base_url, "http://focus.test:9000");
        assert_eq!(config.break_minutes, 10);
        assert_eq!(config.work_minutes, 25);
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load(Path::new("/nonexistent/pomodoro/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_malformed_file() {
        let file = write_config("{ not json");
        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = AppConfig::default().with_base_url("not a url");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_durations() {
        let config = AppConfig {
            work_minutes: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timezone_override() {
        let config = AppConfig {
            timezone: Some("Europe/Berlin".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(config.timezone_override(), Some(chrono_tz::Europe::Berlin));

        let config = AppConfig {
            timezone: Some("Mars/Olympus".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(config.timezone_override(), None);
    }
}
