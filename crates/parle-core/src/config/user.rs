//! Persisted user settings read and written by `settings` actions.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default = "default_user_name")]
    pub user_name: String,

    #[serde(default = "default_true")]
    pub propositions_enabled: bool,

    #[serde(default = "default_true")]
    pub sound_enabled: bool,
}

fn default_user_name() -> String {
    "Inconnue".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            user_name: default_user_name(),
            propositions_enabled: true,
            sound_enabled: true,
        }
    }
}

/// Storage for [`UserSettings`].
pub trait SettingsStore {
    fn settings(&self) -> &UserSettings;

    fn set_user_name(&mut self, name: &str);

    fn set_propositions_enabled(&mut self, enabled: bool);
}

/// Settings kept in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    settings: UserSettings,
}

impl MemorySettings {
    #[must_use]
    pub fn new(settings: UserSettings) -> Self {
        Self { settings }
    }
}

impl SettingsStore for MemorySettings {
    fn settings(&self) -> &UserSettings {
        &self.settings
    }

    fn set_user_name(&mut self, name: &str) {
        self.settings.user_name = name.to_string();
    }

    fn set_propositions_enabled(&mut self, enabled: bool) {
        self.settings.propositions_enabled = enabled;
    }
}

/// Settings backed by a JSON file, rewritten after every change.
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
    settings: UserSettings,
}

impl FileSettings {
    /// Open the settings file, falling back to defaults when it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: &Path) -> Result<Self> {
        let settings = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            debug!("No settings file at {}, using defaults", path.display());
            UserSettings::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            settings,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current settings to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written.
    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.settings)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            warn!("Failed to save settings to {}: {e}", self.path.display());
        }
    }
}

impl SettingsStore for FileSettings {
    fn settings(&self) -> &UserSettings {
        &self.settings
    }

    fn set_user_name(&mut self, name: &str) {
        self.settings.user_name = name.to_string();
        self.persist();
    }

    fn set_propositions_enabled(&mut self, enabled: bool) {
        self.settings.propositions_enabled = enabled;
        self.persist();
    }
}
