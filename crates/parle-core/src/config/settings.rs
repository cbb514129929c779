use crate::Result;
use chrono::Locale;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub locale: LocaleConfig,

    #[serde(default)]
    pub engine: EngineConfig,
}

impl Config {
    /// Load config from file. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        super::validation::warn_unknown_fields(&content, "config.json");
        let config: Self = serde_json::from_str(&content)?;
        if Locale::try_from(config.locale.time_locale.as_str()).is_err() {
            warn!(
                "Unknown timeLocale {:?} in config.json, dates use POSIX names",
                config.locale.time_locale
            );
        }
        Ok(config)
    }

    /// Save config to file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    /// Prefix the form-encoded search terms are appended to
    #[serde(default = "default_engine_url")]
    pub engine_base_url: String,
}

fn default_engine_url() -> String {
    "https://www.google.com/search?channel=fs&client=linux&q=".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            engine_base_url: default_engine_url(),
        }
    }
}

/// User-facing strings produced by the engine itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleConfig {
    #[serde(default = "default_not_understood")]
    pub not_understood: String,

    #[serde(default = "default_search_web_label")]
    pub search_web_label: String,

    /// `?prop` expansion when propositions are on
    #[serde(default = "default_enabled")]
    pub enabled: String,

    /// `?prop` expansion when propositions are off
    #[serde(default = "default_disabled")]
    pub disabled: String,

    /// Locale name (`fr_FR`, `en_US`...) for weekday and month names
    #[serde(default = "default_time_locale")]
    pub time_locale: String,
}

impl LocaleConfig {
    /// Locale for `?date` and `?dt`. Unknown names give POSIX names.
    #[must_use]
    pub fn time_locale(&self) -> Locale {
        Locale::try_from(self.time_locale.as_str()).unwrap_or(Locale::POSIX)
    }
}

fn default_not_understood() -> String {
    "Désolé, je ne comprends pas ! :(".to_string()
}
fn default_search_web_label() -> String {
    "Chercher sur le web".to_string()
}
fn default_enabled() -> String {
    "activées".to_string()
}
fn default_disabled() -> String {
    "désactivées".to_string()
}
fn default_time_locale() -> String {
    "fr_FR".to_string()
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            not_understood: default_not_understood(),
            search_web_label: default_search_web_label(),
            enabled: default_enabled(),
            disabled: default_disabled(),
            time_locale: default_time_locale(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Fixed seed for reply selection; OS entropy when absent
    #[serde(default)]
    pub rng_seed: Option<u64>,
}
