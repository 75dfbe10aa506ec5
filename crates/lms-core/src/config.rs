//! Configuration management for the LMS dashboard
//!
//! Values come from an optional file and then from `LMS__`-prefixed
//! environment variables, with `__` separating nested keys
//! (`LMS__API__BASE_URL`, `LMS__FEED__LOCALE`).

use lms_protocol::TimeDisplay;
use lms_types::Locale;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use validator::Validate;

/// File consulted when no explicit path is given (any supported extension)
pub const DEFAULT_CONFIG_NAME: &str = "lms-dashboard";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "LMS";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Config {
    /// Backend API configuration
    #[serde(default)]
    #[validate(nested)]
    pub api: ApiConfig,

    /// Feed presentation configuration
    #[serde(default)]
    #[validate(nested)]
    pub feed: FeedConfig,

    /// Logging configuration
    #[serde(default)]
    #[validate(nested)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ApiConfig {
    /// Base URL of the LMS backend
    #[serde(default = "default_base_url")]
    #[validate(url)]
    pub base_url: String,

    /// Sent as `X-API-Key` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_timeout_seconds")]
    #[validate(range(min = 1, max = 300))]
    pub timeout_seconds: u64,

    /// Endpoint paths, relative to `base_url`
    #[serde(default)]
    #[validate(nested)]
    pub endpoints: EndpointsConfig,
}

/// List endpoint paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct EndpointsConfig {
    /// Audit/activity log endpoint
    #[serde(default = "default_logs_path")]
    #[validate(length(min = 1))]
    pub logs: String,

    /// Module enrollment endpoint
    #[serde(default = "default_enrollments_path")]
    #[validate(length(min = 1))]
    pub enrollments: String,

    /// Module completion endpoint
    #[serde(default = "default_completions_path")]
    #[validate(length(min = 1))]
    pub completions: String,
}

/// Feed presentation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct FeedConfig {
    /// Language of relative times and date buckets
    #[serde(default)]
    pub locale: Locale,

    /// Viewer's UTC offset, used for calendar-day bucketing
    #[serde(default = "default_utc_offset_minutes")]
    #[validate(range(min = -720, max = 840))]
    pub utc_offset_minutes: i32,

    /// Activities kept on the recent-activity page
    #[serde(default = "default_recent_limit")]
    #[validate(range(min = 1, max = 500))]
    pub recent_limit: usize,

    /// Seconds between polls in watch mode
    #[serde(default = "default_poll_interval_seconds")]
    #[validate(range(min = 1, max = 3600))]
    pub poll_interval_seconds: u64,

    /// `limit` query parameter sent to list endpoints
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 1000))]
    pub page_size: usize,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct LoggingConfig {
    /// Log level filter, e.g. `info` or `lms_dashboard=debug`
    #[serde(default = "default_log_level")]
    #[validate(length(min = 1))]
    pub level: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

const fn default_timeout_seconds() -> u64 {
    30
}

fn default_logs_path() -> String {
    "/api/activity-logs".to_string()
}

fn default_enrollments_path() -> String {
    "/api/enrollments".to_string()
}

fn default_completions_path() -> String {
    "/api/completions".to_string()
}

const fn default_utc_offset_minutes() -> i32 {
    // WIB
    7 * 60
}

const fn default_recent_limit() -> usize {
    10
}

const fn default_poll_interval_seconds() -> u64 {
    30
}

const fn default_page_size() -> usize {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a file and the environment
    ///
    /// With `path`, that file must exist. Without it, `lms-dashboard.*` in
    /// the working directory is used if present. Environment variables
    /// override file values either way.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Configuration`] if a source cannot be read or
    /// deserialized, and [`crate::Error::Validation`] if a value is out of range.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let config: Self = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        debug!(
            base_url = %config.api.base_url,
            locale = %config.feed.locale,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Time display policy derived from the feed section
    #[must_use]
    pub fn time_display(&self) -> TimeDisplay {
        TimeDisplay::from_offset_minutes(self.feed.locale, self.feed.utc_offset_minutes)
    }

    /// Poll interval as a [`Duration`]
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.feed.poll_interval_seconds)
    }
}

impl ApiConfig {
    /// Request timeout as a [`Duration`]
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
            endpoints: EndpointsConfig::default(),
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            logs: default_logs_path(),
            enrollments: default_enrollments_path(),
            completions: default_completions_path(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            utc_offset_minutes: default_utc_offset_minutes(),
            recent_limit: default_recent_limit(),
            poll_interval_seconds: default_poll_interval_seconds(),
            page_size: default_page_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}
