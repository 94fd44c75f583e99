use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};

use crate::locale::Locale;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_USER_ID: &str = "user_001";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REVEAL_DELAY_MS: u64 = 2;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub user_id: Option<String>,
    pub locale: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub reveal_delay_ms: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            api_base_url: Some(DEFAULT_API_URL.to_string()),
            user_id: Some(DEFAULT_USER_ID.to_string()),
            locale: Some(Locale::default().as_str().to_string()),
            request_timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            reveal_delay_ms: Some(DEFAULT_REVEAL_DELAY_MS),
        }
    }

    /// Load the user's config file, then apply `TELLER_*` environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::get_config_path()?)?;
        config.apply_env();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| anyhow!("Invalid config file {:?}: {}", path, e))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Remember the interface language in the user's config file.
    pub fn save_locale(locale: Locale) -> Result<()> {
        Self::save_locale_to(&Self::get_config_path()?, locale)
    }

    /// Only the locale changes; other saved fields are kept. An unreadable
    /// file is replaced with defaults.
    pub fn save_locale_to(path: &Path, locale: Locale) -> Result<()> {
        let mut config = Self::load_from(path).unwrap_or_else(|_| Self::new());
        config.locale = Some(locale.as_str().to_string());
        config.save_to(path)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("TELLER_API_URL") {
            self.api_base_url = Some(url);
        }
        if let Ok(user) = std::env::var("TELLER_USER_ID") {
            self.user_id = Some(user);
        }
        if let Ok(locale) = std::env::var("TELLER_LOCALE") {
            self.locale = Some(locale);
        }
    }

    pub fn api_base_url(&self) -> String {
        self.api_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn user_id(&self) -> String {
        self.user_id
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_ID.to_string())
    }

    /// Unknown locale names fall back to the default
    pub fn locale(&self) -> Locale {
        self.locale
            .as_deref()
            .and_then(Locale::from_str)
            .unwrap_or_default()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS).max(1))
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms.unwrap_or(DEFAULT_REVEAL_DELAY_MS))
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("teller").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.locale(), Locale::Vietnamese);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::new();
        config.api_base_url = Some("https://bank.example".to_string());
        config.locale = Some("en".to_string());
        config.reveal_delay_ms = Some(15);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_base_url(), "https://bank.example");
        assert_eq!(loaded.locale(), Locale::English);
        assert_eq!(loaded.reveal_delay(), Duration::from_millis(15));
    }

    #[test]
    fn test_partial_file_uses_fallbacks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "user_id": "  ", "locale": "klingon" }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.user_id(), DEFAULT_USER_ID);
        assert_eq!(config.locale(), Locale::Vietnamese);
        assert_eq!(config.api_base_url(), DEFAULT_API_URL);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_save_locale_keeps_other_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::new();
        config.user_id = Some("user_042".to_string());
        config.save_to(&path).unwrap();

        Config::save_locale_to(&path, Locale::English).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.locale(), Locale::English);
        assert_eq!(loaded.user_id(), "user_042");

        // Creates the file when there is none yet
        let fresh = dir.path().join("fresh").join("config.json");
        Config::save_locale_to(&fresh, Locale::Vietnamese).unwrap();
        assert_eq!(Config::load_from(&fresh).unwrap().locale(), Locale::Vietnamese);
    }
}
