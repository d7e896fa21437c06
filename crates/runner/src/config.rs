//! Application configuration
//!
//! One JSON document, loaded once at startup and never mutated:
//!
//! ```json
//! {
//!   "symbols": ["^GSPC"],
//!   "data_dir": "data",
//!   "mailing_list": ["ops@example.com"],
//!   "server": { "poll_interval_secs": 60, "trim_provisional": true },
//!   "source": { "base_url": "https://query1.finance.yahoo.com" },
//!   "analytics": {
//!     "sma": { "window": 200, "upper": 0.02, "lower": 0.01,
//!              "cooldowns": { "BUY": "1d", "SELL": "1d" } }
//!   }
//! }
//! ```

use crate::error::AppConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use vigil_clock::SystemClock;
use vigil_gateway::DEFAULT_BASE_URL;
use vigil_strategy::{AnalyticsConfig, AnalyticsRegistry};

/// Overrides `data_dir`
pub const DATA_DIR_ENV: &str = "VIGIL_DATA_DIR";

/// Root configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Symbols to track, one market server each
    #[serde(default)]
    pub symbols: Vec<String>,

    /// Root of the persisted series, ledgers and archives
    #[serde(default = "default_data_dir", alias = "datadir")]
    pub data_dir: PathBuf,

    /// Alert recipients
    #[serde(default)]
    pub mailing_list: Vec<String>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Polling loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Compute broadcast analytics without the in-progress bar while the
    /// session is open
    #[serde(default = "default_trim_provisional")]
    pub trim_provisional: bool,
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_trim_provisional() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            trim_provisional: default_trim_provisional(),
        }
    }
}

impl ServerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Market data source settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            data_dir: default_data_dir(),
            mailing_list: Vec::new(),
            server: ServerConfig::default(),
            source: SourceConfig::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AppConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| AppConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, AppConfigError> {
        serde_json::from_str(json).map_err(|e| AppConfigError::Parse(e.to_string()))
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|d| !d.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        self
    }

    /// Reject configurations the servers cannot run with. Builds every
    /// configured strategy, so bad cooldowns or windows fail here.
    pub fn validate(&self) -> Result<(), AppConfigError> {
        if self.symbols.is_empty() {
            return Err(AppConfigError::Invalid("no symbols configured".to_string()));
        }
        if self.symbols.iter().any(|s| s.trim().is_empty()) {
            return Err(AppConfigError::Invalid("empty symbol".to_string()));
        }
        if self.server.poll_interval_secs == 0 {
            return Err(AppConfigError::Invalid(
                "server.poll_interval_secs must be positive".to_string(),
            ));
        }
        AnalyticsRegistry::from_config(&self.analytics, Arc::new(SystemClock::new()))?;
        Ok(())
    }
}
