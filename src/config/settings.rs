//! Configuration management
//!
//! Settings load from defaults, an optional TOML file, and environment
//! variable overrides, in that precedence order.

use crate::cache::CacheTrigger;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Default browser-identifying user agent, matching what the target sites
/// expect from an interactive client.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:68.0) Gecko/20100101 Firefox/68.0";

/// Default cache staleness timeout: one hour.
pub const DEFAULT_CACHE_TIMEOUT_SECS: u64 = 60 * 60;

// Helper functions for serde defaults
fn default_cache_timeout() -> u64 {
    DEFAULT_CACHE_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration settings for a persistent session
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheSettings,
    /// Network configuration
    #[serde(default)]
    pub network: NetworkSettings,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Session cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Cache file path. When absent, a temp-directory path derived from the
    /// target host is used.
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    /// Cache staleness timeout in seconds. A cache file at least this old
    /// is ignored on restore (the boundary is exclusive: age must be
    /// strictly below the timeout to load).
    #[serde(default = "default_cache_timeout")]
    pub timeout_secs: u64,
    /// When completed operations persist the session snapshot
    #[serde(default)]
    pub trigger: CacheTrigger,
}

/// Network and proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// Proxy map, scheme ("http", "https" or "all") to proxy URL.
    /// Passed through opaquely to the HTTP client.
    #[serde(default)]
    pub proxies: HashMap<String, String>,
    /// User agent string applied to every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable verbose logging
    #[serde(default)]
    pub verbose: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            file_path: None,
            timeout_secs: default_cache_timeout(),
            trigger: CacheTrigger::default(),
        }
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            proxies: HashMap::new(),
            user_agent: default_user_agent(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            verbose: false,
        }
    }
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut settings = Self::default();

        if let Ok(path) = std::env::var("RELOGIN_CACHE_PATH") {
            settings.cache.file_path = Some(PathBuf::from(path));
        }

        if let Ok(timeout) = std::env::var("RELOGIN_CACHE_TIMEOUT") {
            settings.cache.timeout_secs = timeout.parse().map_err(|e| {
                crate::Error::config("RELOGIN_CACHE_TIMEOUT", format!("invalid timeout: {e}"))
            })?;
        }

        if let Ok(trigger) = std::env::var("RELOGIN_CACHE_TRIGGER") {
            settings.cache.trigger = trigger.parse()?;
        }

        if let Ok(user_agent) = std::env::var("RELOGIN_USER_AGENT") {
            settings.network.user_agent = user_agent;
        }

        // Standard proxy environment variables
        if let Ok(proxy) = std::env::var("HTTPS_PROXY") {
            settings.network.proxies.insert("https".to_string(), proxy);
        }
        if let Ok(proxy) = std::env::var("HTTP_PROXY") {
            settings.network.proxies.insert("http".to_string(), proxy);
        }
        if let Ok(proxy) = std::env::var("ALL_PROXY") {
            settings.network.proxies.insert("all".to_string(), proxy);
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            settings.logging.level = level;
        }

        if let Ok(verbose) = std::env::var("VERBOSE") {
            settings.logging.verbose = verbose.parse().unwrap_or(false);
        }

        Ok(settings)
    }

    /// Load settings from a TOML configuration file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config("file", format!("failed to read config file: {e}"))
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| {
            crate::Error::config("file", format!("failed to parse config file: {e}"))
        })?;

        Ok(settings)
    }

    /// Merge settings with environment variable overrides
    pub fn merge_with_env(mut self) -> crate::Result<Self> {
        let env_settings = Self::from_env()?;
        let defaults = Self::default();

        if env_settings.cache.file_path.is_some() {
            self.cache.file_path = env_settings.cache.file_path;
        }
        if env_settings.cache.timeout_secs != defaults.cache.timeout_secs {
            self.cache.timeout_secs = env_settings.cache.timeout_secs;
        }
        if env_settings.cache.trigger != defaults.cache.trigger {
            self.cache.trigger = env_settings.cache.trigger;
        }
        if env_settings.network.user_agent != defaults.network.user_agent {
            self.network.user_agent = env_settings.network.user_agent;
        }

        // Proxy entries from the environment always override
        for (scheme, proxy) in env_settings.network.proxies {
            self.network.proxies.insert(scheme, proxy);
        }

        if env_settings.logging.level != defaults.logging.level {
            self.logging.level = env_settings.logging.level;
        }
        if env_settings.logging.verbose {
            self.logging.verbose = true;
        }

        Ok(self)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> crate::Result<()> {
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(crate::Error::config(
                    "logging.level",
                    format!("invalid log level: {other}"),
                ));
            }
        }

        for (scheme, proxy_url) in &self.network.proxies {
            if let Err(e) = url::Url::parse(proxy_url) {
                return Err(crate::Error::config(
                    format!("network.proxies.{scheme}"),
                    format!("invalid proxy URL '{proxy_url}': {e}"),
                ));
            }
        }

        Ok(())
    }
}
