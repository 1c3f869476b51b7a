use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiSettings,
    pub analytics: AnalyticsSettings,
    pub polling: PollingSettings,
    pub logging: LoggingSettings,
}

impl Config {
    /// Rejects settings that would make the client unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api.base_url must not be empty".to_string(),
            ));
        }
        if self.analytics.window == 0 {
            return Err(ConfigError::ValidationError(
                "analytics.window must be at least 1".to_string(),
            ));
        }
        if !(self.analytics.down_threshold < self.analytics.up_threshold) {
            return Err(ConfigError::ValidationError(format!(
                "analytics.down_threshold ({}) must be below analytics.up_threshold ({})",
                self.analytics.down_threshold, self.analytics.up_threshold
            )));
        }
        if self.polling.interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "polling.interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where the market backend lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL including the API prefix, e.g. `http://localhost:8000/api/v1`.
    pub base_url: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/v1".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Parameters for the derived-analytics layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    /// Trailing window, in trading days, for volatility and summary statistics.
    pub window: usize,
    /// A daily return at or above this is a Bull day (0.002 = 0.2%).
    pub up_threshold: f64,
    /// A daily return at or below this is a Bear day.
    pub down_threshold: f64,
    /// Length of the offline sample history used when the backend is unreachable.
    pub fallback_days: usize,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            window: 21,
            up_threshold: 0.002,
            down_threshold: -0.002,
            fallback_days: 120,
        }
    }
}

/// How the admin console follows a running backend job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Polling stops once the newest log line contains this phrase.
    pub completion_marker: String,
    /// Optional upper bound on a single follow session.
    #[serde(with = "humantime_serde")]
    pub max_duration: Option<Duration>,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            completion_marker: "Training Complete".to_string(),
            max_duration: None,
        }
    }
}

/// Output format of the console log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output.
    Pretty,
    /// One line per event.
    #[default]
    Compact,
    /// Machine-readable JSON lines.
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
    /// When set, a daily-rotated log file is also written here.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            directory: None,
        }
    }
}
