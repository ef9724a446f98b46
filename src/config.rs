//! Application configuration.
//!
//! Configuration is stored as YAML in the platform config directory (or the
//! file named by `DISCOVERY_CONFIG`) and includes:
//! - The discovery service base URL and the acting user identity
//! - Default page size and request timeout
//! - Poll, badge and scan timings used by the view controller

use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DiscoveryError, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "DISCOVERY_CONFIG";
/// Environment variable overriding `api_url`
pub const API_URL_ENV: &str = "DISCOVERY_API_URL";
/// Environment variable overriding `user`
pub const USER_ENV: &str = "DISCOVERY_USER";

/// Keys accepted by `config set`
pub const VALID_KEYS: &[&str] = &[
    "api_url",
    "user",
    "reject_reason",
    "page_size",
    "request_timeout",
    "timings.poll_interval",
    "timings.new_badge",
    "timings.scan_settle",
    "timings.scan_followup",
    "timings.notification",
];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the discovery service (without the `/api/discovery` path)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Identity recorded as approver/rejecter
    #[serde(default = "default_user")]
    pub user: String,

    /// Reason sent with rejections made from the console
    #[serde(default = "default_reject_reason")]
    pub reject_reason: String,

    /// Records per page (default: 50)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// HTTP request timeout in seconds (default: 30, 0 = no timeout)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Controller timings
    #[serde(default, skip_serializing_if = "Timings::is_default")]
    pub timings: Timings,
}

fn default_api_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_user() -> String {
    "user@example.com".to_string()
}

fn default_reject_reason() -> String {
    "Rejected by user".to_string()
}

fn default_page_size() -> u32 {
    50
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            user: default_user(),
            reject_reason: default_reject_reason(),
            page_size: default_page_size(),
            request_timeout: default_request_timeout(),
            timings: Timings::default(),
        }
    }
}

/// Controller timings, all in seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timings {
    /// Period of the background refresh (default: 30)
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    /// How long the "N new" badge stays up (default: 5)
    #[serde(default = "default_new_badge")]
    pub new_badge: u64,

    /// Pause between a scan trigger and the first refresh (default: 2)
    #[serde(default = "default_scan_settle")]
    pub scan_settle: u64,

    /// Pause before the follow-up refresh after a scan (default: 5)
    #[serde(default = "default_scan_followup")]
    pub scan_followup: u64,

    /// How long a notification stays visible (default: 6)
    #[serde(default = "default_notification")]
    pub notification: u64,
}

fn default_poll_interval() -> u64 {
    30
}

fn default_new_badge() -> u64 {
    5
}

fn default_scan_settle() -> u64 {
    2
}

fn default_scan_followup() -> u64 {
    5
}

fn default_notification() -> u64 {
    6
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            new_badge: default_new_badge(),
            scan_settle: default_scan_settle(),
            scan_followup: default_scan_followup(),
            notification: default_notification(),
        }
    }
}

impl Timings {
    /// Check if these timings are the defaults (for serialization skip)
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    pub fn new_badge(&self) -> Duration {
        Duration::from_secs(self.new_badge)
    }

    pub fn scan_settle(&self) -> Duration {
        Duration::from_secs(self.scan_settle)
    }

    pub fn scan_followup(&self) -> Duration {
        Duration::from_secs(self.scan_followup)
    }

    pub fn notification(&self) -> Duration {
        Duration::from_secs(self.notification)
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_PATH_ENV)
            && !path.is_empty()
        {
            return PathBuf::from(path);
        }

        match directories::ProjectDirs::from("com", "discovery", "discovery-console") {
            Some(dirs) => dirs.config_dir().join("config.yaml"),
            None => PathBuf::from(".discovery").join("config.yaml"),
        }
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            DiscoveryError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Reject values the controller cannot work with
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.api_url)
            .map_err(|e| DiscoveryError::InvalidUrl(self.api_url.clone(), e.to_string()))?;
        if self.page_size == 0 {
            return Err(DiscoveryError::Config(
                "page_size must be a positive integer".to_string(),
            ));
        }
        if self.timings.poll_interval == 0 {
            return Err(DiscoveryError::Config(
                "timings.poll_interval must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    /// Service base URL from environment variable or config
    pub fn api_url(&self) -> String {
        env_or(env::var(API_URL_ENV).ok(), &self.api_url)
    }

    /// Acting user identity from environment variable or config
    pub fn user(&self) -> String {
        env_or(env::var(USER_ENV).ok(), &self.user)
    }

    /// Get the HTTP request timeout, `None` when disabled
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout > 0).then(|| Duration::from_secs(self.request_timeout))
    }

    /// Read a value by its dotted key
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "api_url" => self.api_url.clone(),
            "user" => self.user.clone(),
            "reject_reason" => self.reject_reason.clone(),
            "page_size" => self.page_size.to_string(),
            "request_timeout" => self.request_timeout.to_string(),
            "timings.poll_interval" => self.timings.poll_interval.to_string(),
            "timings.new_badge" => self.timings.new_badge.to_string(),
            "timings.scan_settle" => self.timings.scan_settle.to_string(),
            "timings.scan_followup" => self.timings.scan_followup.to_string(),
            "timings.notification" => self.timings.notification.to_string(),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set a value by its dotted key, validating the result
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();
        match key {
            "api_url" => updated.api_url = value.trim_end_matches('/').to_string(),
            "user" => {
                if value.trim().is_empty() {
                    return Err(DiscoveryError::Config("user cannot be empty".to_string()));
                }
                updated.user = value.to_string();
            }
            "reject_reason" => updated.reject_reason = value.to_string(),
            "page_size" => updated.page_size = parse_number(key, value)?,
            "request_timeout" => updated.request_timeout = parse_number(key, value)?,
            "timings.poll_interval" => updated.timings.poll_interval = parse_number(key, value)?,
            "timings.new_badge" => updated.timings.new_badge = parse_number(key, value)?,
            "timings.scan_settle" => updated.timings.scan_settle = parse_number(key, value)?,
            "timings.scan_followup" => updated.timings.scan_followup = parse_number(key, value)?,
            "timings.notification" => updated.timings.notification = parse_number(key, value)?,
            _ => return Err(unknown_key(key)),
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

fn env_or(env_value: Option<String>, fallback: &str) -> String {
    match env_value {
        Some(value) if !value.is_empty() => value,
        _ => fallback.to_string(),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        DiscoveryError::Config(format!("'{value}' is not a valid number for {key}"))
    })
}

fn unknown_key(key: &str) -> DiscoveryError {
    DiscoveryError::Config(format!(
        "unknown config key '{key}'. Valid keys: {}",
        VALID_KEYS.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(config.user, "user@example.com");
        assert_eq!(config.reject_reason, "Rejected by user");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.timings.poll_interval, 30);
        assert_eq!(config.timings.new_badge, 5);
        assert_eq!(config.timings.scan_settle, 2);
        assert_eq!(config.timings.scan_followup, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
api_url: http://discovery.internal:8080
timings:
  poll_interval: 10
"#;
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.api_url, "http://discovery.internal:8080");
        assert_eq!(config.timings.poll_interval, 10);
        assert_eq!(config.timings.scan_followup, 5);
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn test_default_timings_are_not_serialized() {
        let yaml = serde_yaml_ng::to_string(&Config::default()).unwrap();
        assert!(!yaml.contains("timings"));

        let mut config = Config::default();
        config.set("timings.new_badge", "9").unwrap();
        let yaml = serde_yaml_ng::to_string(&config).unwrap();
        let parsed: Config = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(parsed.timings.new_badge, 9);
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut config = Config::default();
        assert!(config.set("page_size", "0").is_err());
        assert!(config.set("page_size", "many").is_err());
        assert!(config.set("api_url", "not a url").is_err());
        assert!(config.set("timings.poll_interval", "0").is_err());
        assert!(config.set("user", "  ").is_err());
        assert!(config.set("colour", "red").is_err());
        // failed sets leave the config untouched
        assert_eq!(config.page_size, 50);
        assert_eq!(config.api_url, "http://localhost:5000");
    }

    #[test]
    fn test_set_and_get_roundtrip() {
        let mut config = Config::default();
        config.set("api_url", "https://discovery.example.com/").unwrap();
        config.set("page_size", "25").unwrap();
        assert_eq!(config.get("api_url").unwrap(), "https://discovery.example.com");
        assert_eq!(config.get("page_size").unwrap(), "25");
        assert!(config.get("nope").is_err());
    }

    #[test]
    fn test_env_or_prefers_non_empty_env() {
        assert_eq!(env_or(Some("http://env".into()), "http://file"), "http://env");
        assert_eq!(env_or(Some(String::new()), "http://file"), "http://file");
        assert_eq!(env_or(None, "http://file"), "http://file");
    }

    #[test]
    fn test_request_timeout_zero_disables() {
        let mut config = Config::default();
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        config.request_timeout = 0;
        assert_eq!(config.request_timeout(), None);
    }
}
