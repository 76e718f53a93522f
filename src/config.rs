//! # Configuration Module
//!
//! Runtime settings read from the environment (and from a `.env` file when
//! present). Every setting has a default so the CLI works out of the box;
//! only remote backup needs the gist id and token.

use log::warn;
use std::fmt;
use std::path::PathBuf;

use crate::basket::RefreshPolicy;

// Environment variable names
pub const ENV_DATA_FILE: &str = "COOKBOOK_DATA_FILE";
pub const ENV_LANGUAGE: &str = "COOKBOOK_LANGUAGE";
pub const ENV_KEEP_MANUAL_ITEMS: &str = "COOKBOOK_KEEP_MANUAL_ITEMS";
pub const ENV_GIST_ID: &str = "COOKBOOK_GIST_ID";
pub const ENV_GITHUB_TOKEN: &str = "COOKBOOK_GITHUB_TOKEN";
pub const ENV_GIST_API: &str = "COOKBOOK_GIST_API";
pub const ENV_GIST_FILENAME: &str = "COOKBOOK_GIST_FILENAME";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "COOKBOOK_HTTP_TIMEOUT_SECS";

// Defaults
pub const DEFAULT_DATA_FILE: &str = "cookbook.json";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_GIST_API: &str = "https://api.github.com";
pub const DEFAULT_GIST_FILENAME: &str = "cookbook-data.json";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_RETRY_DELAY_MS: u64 = 500;
pub const DEFAULT_MAX_RETRY_DELAY_MS: u64 = 5000;

/// Settings for the remote gist backup
#[derive(Clone)]
pub struct RemoteConfig {
    /// Gist holding the backup; backup is disabled without it
    pub gist_id: Option<String>,
    /// Token with gist scope
    pub token: Option<String>,
    /// Base URL of the GitHub REST API
    pub api_base: String,
    /// Name of the file inside the gist
    pub filename: String,
    /// Timeout for each request in seconds
    pub timeout_secs: u64,
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay between retries in milliseconds
    pub base_retry_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_retry_delay_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            gist_id: None,
            token: None,
            api_base: DEFAULT_GIST_API.to_string(),
            filename: DEFAULT_GIST_FILENAME.to_string(),
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            base_retry_delay_ms: DEFAULT_BASE_RETRY_DELAY_MS,
            max_retry_delay_ms: DEFAULT_MAX_RETRY_DELAY_MS,
        }
    }
}

impl RemoteConfig {
    /// Backup needs both a gist id and a token
    pub fn is_configured(&self) -> bool {
        self.gist_id.is_some() && self.token.is_some()
    }
}

// The token never ends up in logs
impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("gist_id", &self.gist_id)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("filename", &self.filename)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// JSON file holding the cookbook
    pub data_file: PathBuf,
    /// Language of user-facing messages ("en", "fr")
    pub language: String,
    /// Keep hand-added basket items when the basket is rebuilt
    pub keep_manual_items: bool,
    pub remote: RemoteConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            language: DEFAULT_LANGUAGE.to_string(),
            keep_manual_items: false,
            remote: RemoteConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Self {
        // Load environment variables from .env file
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let timeout_secs = match value(ENV_HTTP_TIMEOUT_SECS) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Ignoring invalid {}={}, using {}", ENV_HTTP_TIMEOUT_SECS, raw, DEFAULT_HTTP_TIMEOUT_SECS);
                DEFAULT_HTTP_TIMEOUT_SECS
            }),
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Self {
            data_file: value(ENV_DATA_FILE).map(PathBuf::from).unwrap_or(defaults.data_file),
            language: value(ENV_LANGUAGE).unwrap_or(defaults.language),
            keep_manual_items: value(ENV_KEEP_MANUAL_ITEMS)
                .map(|raw| parse_flag(&raw))
                .unwrap_or(defaults.keep_manual_items),
            remote: RemoteConfig {
                gist_id: value(ENV_GIST_ID),
                token: value(ENV_GITHUB_TOKEN),
                api_base: value(ENV_GIST_API)
                    .map(|base| base.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.remote.api_base),
                filename: value(ENV_GIST_FILENAME).unwrap_or(defaults.remote.filename),
                timeout_secs,
                ..defaults.remote
            },
        }
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, data_file: Option<PathBuf>, language: Option<String>) -> Self {
        if let Some(data_file) = data_file {
            self.data_file = data_file;
        }
        if let Some(language) = language {
            self.language = language;
        }
        self
    }

    /// How a basket rebuild treats hand-added items
    pub fn refresh_policy(&self) -> RefreshPolicy {
        if self.keep_manual_items {
            RefreshPolicy::KeepManual
        } else {
            RefreshPolicy::Replace
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.data_file, PathBuf::from(DEFAULT_DATA_FILE));
        assert_eq!(config.language, "en");
        assert!(!config.keep_manual_items);
        assert_eq!(config.refresh_policy(), RefreshPolicy::Replace);
        assert!(!config.remote.is_configured());
        assert_eq!(config.remote.api_base, DEFAULT_GIST_API);
        assert_eq!(config.remote.timeout_secs, DEFAULT_HTTP_TIMEOUT_SECS);
    }

    #[test]
    fn test_environment_values() {
        let config = config_from(&[
            (ENV_DATA_FILE, "/tmp/book.json"),
            (ENV_LANGUAGE, "fr"),
            (ENV_KEEP_MANUAL_ITEMS, "Yes"),
            (ENV_GIST_ID, "abc123"),
            (ENV_GITHUB_TOKEN, "secret"),
            (ENV_GIST_API, "http://localhost:8080/"),
            (ENV_HTTP_TIMEOUT_SECS, "5"),
        ]);

        assert_eq!(config.data_file, PathBuf::from("/tmp/book.json"));
        assert_eq!(config.language, "fr");
        assert_eq!(config.refresh_policy(), RefreshPolicy::KeepManual);
        assert!(config.remote.is_configured());
        assert_eq!(config.remote.api_base, "http://localhost:8080");
        assert_eq!(config.remote.timeout_secs, 5);
    }

    #[test]
    fn test_blank_and_invalid_values_fall_back() {
        let config = config_from(&[
            (ENV_GIST_ID, "   "),
            (ENV_HTTP_TIMEOUT_SECS, "soon"),
            (ENV_KEEP_MANUAL_ITEMS, "maybe"),
        ]);
        assert!(config.remote.gist_id.is_none());
        assert_eq!(config.remote.timeout_secs, DEFAULT_HTTP_TIMEOUT_SECS);
        assert!(!config.keep_manual_items);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::default()
            .with_overrides(Some(PathBuf::from("other.json")), Some("fr".to_string()));
        assert_eq!(config.data_file, PathBuf::from("other.json"));
        assert_eq!(config.language, "fr");
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = config_from(&[(ENV_GITHUB_TOKEN, "secret")]);
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }
}
