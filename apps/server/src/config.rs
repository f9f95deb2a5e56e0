//! # Server Configuration
//!
//! Configuration for the HTTP server, the ledger database, the daily
//! summary and its notification channel.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     GUSTANTO_PORT=8080                                                  │
//! │     GUSTANTO_SUMMARY_AT=22:30                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     --config <path>, or GUSTANTO_CONFIG, or                             │
//! │     ~/.config/pos/server.toml (Linux)                                   │
//! │     ~/Library/Application Support/com.gustanto.pos/server.toml (macOS) │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! │     0.0.0.0:5000, ./gustanto_pos.db, summary at 23:59                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 5000
//!
//! [database]
//! path = "gustanto_pos.db"
//! max_connections = 5
//!
//! [summary]
//! send_at = "23:59"
//! tick_interval_secs = 60
//! arm_on_startup = false
//! store_name = "Gustanto"
//! currency_symbol = "₹"
//!
//! [notify]
//! channel = "whatsapp_link"  # whatsapp_link | webhook
//! recipient = "+918008646239"
//! link_base = "https://api.whatsapp.com/send"
//! webhook_url = ""
//! timeout_secs = 10
//! max_retry_secs = 30
//! ```

use gustanto_core::{DigestFormat, SendTime};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

// =============================================================================
// Config Error
// =============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file exists but could not be read.
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    /// Config file is not valid TOML or has a bad value.
    ///
    /// ## When This Occurs
    /// - `send_at = "11pm"`
    /// - `channel = "sms"`
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parse but don't make sense together.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// HTTP Server Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Bind address (default: 0.0.0.0 for all interfaces).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for HttpSettings {
    fn default() -> Self {
        HttpSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

impl HttpSettings {
    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

// =============================================================================
// Database Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Created on first start.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("gustanto_pos.db")
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

// =============================================================================
// Summary Settings
// =============================================================================

/// When and how the end-of-day summary is produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarySettings {
    /// Local time of day to send, `HH:MM`.
    #[serde(default)]
    pub send_at: SendTime,

    /// How often the scheduler checks whether it is due (seconds).
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,

    /// Arm the scheduler at boot instead of waiting for a client request.
    #[serde(default)]
    pub arm_on_startup: bool,

    #[serde(default = "default_store_name")]
    pub store_name: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_tick_interval() -> u64 {
    60
}

fn default_store_name() -> String {
    "Gustanto".to_string()
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

impl Default for SummarySettings {
    fn default() -> Self {
        SummarySettings {
            send_at: SendTime::default(),
            tick_interval_secs: default_tick_interval(),
            arm_on_startup: false,
            store_name: default_store_name(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl SummarySettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    pub fn digest_format(&self) -> DigestFormat {
        DigestFormat::new(&self.store_name, &self.currency_symbol)
    }
}

// =============================================================================
// Notify Settings
// =============================================================================

/// Where the daily summary goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyChannel {
    /// Build a WhatsApp click-to-chat link and log it.
    #[default]
    WhatsappLink,

    /// POST the message to an HTTP endpoint.
    Webhook,
}

impl std::fmt::Display for NotifyChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifyChannel::WhatsappLink => write!(f, "whatsapp_link"),
            NotifyChannel::Webhook => write!(f, "webhook"),
        }
    }
}

impl std::str::FromStr for NotifyChannel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "whatsapp_link" | "whatsapp" | "link" => Ok(NotifyChannel::WhatsappLink),
            "webhook" => Ok(NotifyChannel::Webhook),
            other => Err(ConfigError::Invalid(format!(
                "Unknown notify channel: '{}'. Valid options: whatsapp_link, webhook",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifySettings {
    #[serde(default)]
    pub channel: NotifyChannel,

    /// The one fixed recipient, in international format.
    #[serde(default = "default_recipient")]
    pub recipient: String,

    #[serde(default = "default_link_base")]
    pub link_base: String,

    /// Required when `channel = "webhook"`.
    #[serde(default)]
    pub webhook_url: String,

    /// Per-attempt timeout (seconds).
    #[serde(default = "default_notify_timeout")]
    pub timeout_secs: u64,

    /// Upper bound on time spent retrying a webhook (seconds).
    #[serde(default = "default_max_retry")]
    pub max_retry_secs: u64,
}

fn default_recipient() -> String {
    "+918008646239".to_string()
}

fn default_link_base() -> String {
    "https://api.whatsapp.com/send".to_string()
}

fn default_notify_timeout() -> u64 {
    10
}

fn default_max_retry() -> u64 {
    30
}

impl Default for NotifySettings {
    fn default() -> Self {
        NotifySettings {
            channel: NotifyChannel::default(),
            recipient: default_recipient(),
            link_base: default_link_base(),
            webhook_url: String::new(),
            timeout_secs: default_notify_timeout(),
            max_retry_secs: default_max_retry(),
        }
    }
}

impl NotifySettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn max_retry(&self) -> Duration {
        Duration::from_secs(self.max_retry_secs)
    }

    /// Overall bound on one delivery, retries included.
    pub fn deadline(&self) -> Duration {
        self.timeout() + self.max_retry()
    }
}

// =============================================================================
// Main Server Configuration
// =============================================================================

/// Complete server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub summary: SummarySettings,

    #[serde(default)]
    pub notify: NotifySettings,
}

impl ServerConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (server.toml), if it exists
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| std::env::var_os("GUSTANTO_CONFIG").map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading server config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses one TOML file. Missing sections and keys take their defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.summary.tick_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "summary.tick_interval_secs must be greater than 0".into(),
            ));
        }

        if self.notify.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "notify.timeout_secs must be greater than 0".into(),
            ));
        }

        if self.notify.recipient.trim().is_empty() {
            return Err(ConfigError::Invalid("notify.recipient is required".into()));
        }

        if self.notify.channel == NotifyChannel::Webhook {
            let url = &self.notify.webhook_url;
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Invalid(format!(
                    "Webhook URL must start with http:// or https://, got: '{}'",
                    url
                )));
            }
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("GUSTANTO_BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        if let Ok(port) = std::env::var("GUSTANTO_PORT") {
            match port.parse::<u16>() {
                Ok(p) => {
                    debug!(port = p, "Overriding port from environment");
                    self.server.port = p;
                }
                Err(_) => warn!(port = %port, "Ignoring invalid GUSTANTO_PORT"),
            }
        }

        if let Ok(path) = std::env::var("GUSTANTO_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(at) = std::env::var("GUSTANTO_SUMMARY_AT") {
            match at.parse::<SendTime>() {
                Ok(t) => self.summary.send_at = t,
                Err(e) => warn!(value = %at, error = %e, "Ignoring invalid GUSTANTO_SUMMARY_AT"),
            }
        }

        if let Ok(arm) = std::env::var("GUSTANTO_ARM_ON_STARTUP") {
            match arm.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.summary.arm_on_startup = true,
                "0" | "false" | "no" | "off" => self.summary.arm_on_startup = false,
                _ => warn!(value = %arm, "Ignoring invalid GUSTANTO_ARM_ON_STARTUP"),
            }
        }

        if let Ok(channel) = std::env::var("GUSTANTO_NOTIFY_CHANNEL") {
            match channel.parse() {
                Ok(parsed) => self.notify.channel = parsed,
                Err(e) => warn!(error = %e, "Ignoring GUSTANTO_NOTIFY_CHANNEL"),
            }
        }

        if let Ok(recipient) = std::env::var("GUSTANTO_NOTIFY_RECIPIENT") {
            self.notify.recipient = recipient;
        }

        if let Ok(url) = std::env::var("GUSTANTO_WEBHOOK_URL") {
            debug!(url = %url, "Overriding webhook URL from environment");
            self.notify.webhook_url = url;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "gustanto", "pos")
            .map(|dirs| dirs.config_dir().join("server.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.server.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.database.path, PathBuf::from("gustanto_pos.db"));
        assert_eq!(config.summary.send_at.to_string(), "23:59");
        assert_eq!(config.summary.tick_interval(), Duration::from_secs(60));
        assert!(!config.summary.arm_on_startup);
        assert_eq!(config.notify.channel, NotifyChannel::WhatsappLink);
        assert_eq!(config.notify.recipient, "+918008646239");
        assert_eq!(config.notify.deadline(), Duration::from_secs(40));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [server]
            port = 8080

            [summary]
            send_at = "22:30"
            store_name = "Corner Cafe"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind_addr, "0.0.0.0");
        assert_eq!(config.summary.send_at, SendTime::new(22, 30).unwrap());
        assert_eq!(config.summary.currency_symbol, "₹");
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_bad_values_fail_parsing() {
        assert!(toml::from_str::<ServerConfig>("[summary]\nsend_at = \"11pm\"").is_err());
        assert!(toml::from_str::<ServerConfig>("[notify]\nchannel = \"sms\"").is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ServerConfig::default();

        config.summary.tick_interval_secs = 0;
        assert!(config.validate().is_err());
        config.summary.tick_interval_secs = 60;

        config.notify.channel = NotifyChannel::Webhook;
        assert!(config.validate().is_err());

        config.notify.webhook_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.notify.webhook_url = "https://hooks.example.com/summary".to_string();
        assert!(config.validate().is_ok());

        config.notify.recipient = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_channel_parsing() {
        assert_eq!("webhook".parse::<NotifyChannel>().unwrap(), NotifyChannel::Webhook);
        assert_eq!(
            "WhatsApp_Link".parse::<NotifyChannel>().unwrap(),
            NotifyChannel::WhatsappLink
        );
        assert!("sms".parse::<NotifyChannel>().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        std::fs::write(&path, "[database]\npath = \"/var/lib/gustanto/pos.db\"\n").unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.database.path, PathBuf::from("/var/lib/gustanto/pos.db"));

        assert!(matches!(
            ServerConfig::from_file(&dir.path().join("missing.toml")),
            Err(ConfigError::Read(_))
        ));
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&ServerConfig::default()).unwrap();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[summary]"));
        assert!(toml_str.contains("send_at = \"23:59\""));
    }
}
