// src/config.rs

//! Application configuration.
//!
//! Settings come from an optional TOML file overlaid by environment
//! variables (`APP_IDS`, `PUSH_METHOD`, `BARK_KEY`, `TELEGRAM_BOT_TOKEN`,
//! `TELEGRAM_CHAT_ID`). Every field has a default, so a bare environment
//! with just `APP_IDS` and a push credential is a complete setup.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Tracked App Store track ids
    #[serde(default)]
    pub app_ids: Vec<String>,

    /// Path of the persisted version cache
    #[serde(default = "defaults::cache_file")]
    pub cache_file: PathBuf,

    /// Rewrite cache entries even when versions are unchanged
    #[serde(default)]
    pub force_refresh: bool,

    /// Lookup service settings
    #[serde(default)]
    pub lookup: LookupConfig,

    /// Push delivery settings
    #[serde(default)]
    pub push: PushConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Overlay environment variables on top of file values.
    ///
    /// A set variable replaces the file value entirely.
    pub fn overlay_env(&mut self) {
        if let Ok(raw) = env::var("APP_IDS") {
            self.app_ids = split_ids(&raw);
            log::info!("Using {} app id(s) from APP_IDS", self.app_ids.len());
        }
        if let Ok(raw) = env::var("PUSH_METHOD") {
            match PushMethod::parse(&raw) {
                Some(method) => self.push.method = method,
                None => log::warn!("Unknown PUSH_METHOD {:?}, keeping {:?}", raw, self.push.method),
            }
        }
        if let Ok(key) = env::var("BARK_KEY") {
            self.push.bark_key = key;
        }
        if let Ok(token) = env::var("TELEGRAM_BOT_TOKEN") {
            self.push.telegram_bot_token = token;
        }
        if let Ok(chat_id) = env::var("TELEGRAM_CHAT_ID") {
            self.push.telegram_chat_id = chat_id;
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.app_ids.is_empty() {
            return Err(AppError::validation(
                "no app ids configured (set app_ids or APP_IDS)",
            ));
        }
        if self.app_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(AppError::validation("app_ids contains a blank entry"));
        }
        self.lookup.validate()?;
        self.push.validate()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_ids: Vec::new(),
            cache_file: defaults::cache_file(),
            force_refresh: false,
            lookup: LookupConfig::default(),
            push: PushConfig::default(),
        }
    }
}

/// Parse a comma-separated id list, dropping blanks.
fn split_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

/// Lookup service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Lookup API endpoint
    #[serde(default = "defaults::lookup_endpoint")]
    pub endpoint: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::lookup_timeout")]
    pub timeout_secs: u64,

    /// How many regions to try per app before giving up
    #[serde(default = "defaults::probe_limit")]
    pub probe_limit: usize,

    /// Region codes in probe priority order
    #[serde(default = "defaults::regions")]
    pub regions: Vec<String>,
}

impl LookupConfig {
    /// Regions to probe, capped to the configured prefix.
    pub fn probe_regions(&self) -> &[String] {
        let cap = self.probe_limit.min(self.regions.len());
        &self.regions[..cap]
    }

    fn validate(&self) -> Result<()> {
        if Url::parse(&self.endpoint).is_err() {
            return Err(AppError::validation("lookup.endpoint is not a valid URL"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(AppError::validation("lookup.user_agent is empty"));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::validation("lookup.timeout_secs must be > 0"));
        }
        if self.probe_limit == 0 {
            return Err(AppError::validation("lookup.probe_limit must be > 0"));
        }
        if self.regions.is_empty() {
            return Err(AppError::validation("lookup.regions is empty"));
        }
        Ok(())
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::lookup_endpoint(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::lookup_timeout(),
            probe_limit: defaults::probe_limit(),
            regions: defaults::regions(),
        }
    }
}

/// Push delivery channel selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushMethod {
    Bark,
    Telegram,
}

impl PushMethod {
    /// Parse a method name, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "bark" => Some(Self::Bark),
            "telegram" => Some(Self::Telegram),
            _ => None,
        }
    }
}

/// Push delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Which sender delivers notifications
    #[serde(default = "defaults::push_method")]
    pub method: PushMethod,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::push_timeout")]
    pub timeout_secs: u64,

    /// Bark server endpoint
    #[serde(default = "defaults::bark_endpoint")]
    pub bark_endpoint: String,

    /// Bark device key
    #[serde(default)]
    pub bark_key: String,

    /// Telegram Bot API base (bot token is appended)
    #[serde(default = "defaults::telegram_api")]
    pub telegram_api: String,

    /// Telegram bot token
    #[serde(default)]
    pub telegram_bot_token: String,

    /// Telegram chat id to post to
    #[serde(default)]
    pub telegram_chat_id: String,
}

impl PushConfig {
    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(AppError::validation("push.timeout_secs must be > 0"));
        }
        if Url::parse(&self.bark_endpoint).is_err() {
            return Err(AppError::validation("push.bark_endpoint is not a valid URL"));
        }
        if Url::parse(&self.telegram_api).is_err() {
            return Err(AppError::validation("push.telegram_api is not a valid URL"));
        }
        Ok(())
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            method: defaults::push_method(),
            timeout_secs: defaults::push_timeout(),
            bark_endpoint: defaults::bark_endpoint(),
            bark_key: String::new(),
            telegram_api: defaults::telegram_api(),
            telegram_bot_token: String::new(),
            telegram_chat_id: String::new(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    use super::PushMethod;
    use crate::models::region;

    pub fn cache_file() -> PathBuf {
        PathBuf::from("version_cache.json")
    }

    // Lookup defaults
    pub fn lookup_endpoint() -> String {
        "https://itunes.apple.com/lookup".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; appwatch/0.1)".into()
    }
    pub fn lookup_timeout() -> u64 {
        8
    }
    pub fn probe_limit() -> usize {
        6
    }
    pub fn regions() -> Vec<String> {
        region::REGIONS.iter().map(|s| s.to_string()).collect()
    }

    // Push defaults
    pub fn push_method() -> PushMethod {
        PushMethod::Bark
    }
    pub fn push_timeout() -> u64 {
        10
    }
    pub fn bark_endpoint() -> String {
        "https://api.day.app".into()
    }
    pub fn telegram_api() -> String {
        "https://api.telegram.org/bot".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.app_ids = vec!["414478124".to_string()];
        config
    }

    #[test]
    fn validate_accepts_config_with_ids() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_id_list() {
        assert!(Config::default().validate().is_err());
    }

    #[test]
    fn validate_rejects_blank_id() {
        let mut config = valid_config();
        config.app_ids.push("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_probe_limit() {
        let mut config = valid_config();
        config.lookup.probe_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_endpoint() {
        let mut config = valid_config();
        config.lookup.endpoint = "not a url".to_string();
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn probe_regions_caps_to_limit() {
        let lookup = LookupConfig::default();
        assert_eq!(lookup.probe_regions().len(), 6);
        assert_eq!(lookup.probe_regions()[0], "cn");
    }

    #[test]
    fn probe_regions_handles_short_lists() {
        let mut lookup = LookupConfig::default();
        lookup.regions = vec!["us".to_string()];
        assert_eq!(lookup.probe_regions(), ["us".to_string()]);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            app_ids = ["310633997"]

            [push]
            method = "telegram"
            telegram_bot_token = "123:abc"
            telegram_chat_id = "-100200300"
            "#,
        )
        .unwrap();

        assert_eq!(config.app_ids, ["310633997"]);
        assert_eq!(config.push.method, PushMethod::Telegram);
        assert_eq!(config.lookup.probe_limit, 6);
        assert_eq!(config.cache_file, PathBuf::from("version_cache.json"));
    }

    #[test]
    fn push_method_parse_is_case_insensitive() {
        assert_eq!(PushMethod::parse("Bark"), Some(PushMethod::Bark));
        assert_eq!(PushMethod::parse(" TELEGRAM "), Some(PushMethod::Telegram));
        assert_eq!(PushMethod::parse("email"), None);
    }

    #[test]
    fn split_ids_drops_blanks() {
        assert_eq!(split_ids("1, 2,,3 "), ["1", "2", "3"]);
        assert!(split_ids(" , ").is_empty());
    }
}
