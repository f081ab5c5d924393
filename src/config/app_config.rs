use std::time::Duration;

use serde::Deserialize;

/// Environment variable that overrides `api.base_url` on its own
pub const API_URL_ENV: &str = "NMS_API_URL";

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout; none means the transport's own behaviour
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Interactive console behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    /// Maximum retained log entries; unbounded when unset
    #[serde(default)]
    pub log_capacity: Option<usize>,
    /// Refuse a second trigger of an action that is still running
    #[serde(default)]
    pub reject_concurrent: bool,
    /// Log lines shown after each command
    #[serde(default = "default_log_lines")]
    pub log_lines: usize,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_level() -> String {
    "warn".to_string()
}

fn default_log_lines() -> usize {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            log_capacity: None,
            reject_concurrent: false,
            log_lines: default_log_lines(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("NMS_CONSOLE")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Ok(url) = std::env::var(API_URL_ENV) {
            builder = builder.set_override("api.base_url", url)?;
        }

        builder.build()?.try_deserialize()
    }
}
