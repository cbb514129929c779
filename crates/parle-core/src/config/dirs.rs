use crate::{Error, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Application directories following XDG spec
#[derive(Debug, Clone)]
pub struct Directories {
    /// Config directory (~/.config/parle)
    pub config: PathBuf,

    /// Data directory (~/.local/share/parle)
    pub data: PathBuf,

    /// Config file path
    pub config_file: PathBuf,

    /// Persisted user settings
    pub settings_file: PathBuf,
}

impl Directories {
    /// Create a new `Directories` instance with standard XDG paths.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if no home directory can be determined.
    pub fn new() -> Result<Self> {
        let project = ProjectDirs::from("", "", "parle")
            .ok_or_else(|| Error::Config("Failed to determine project directories".to_string()))?;

        let config = project.config_dir().to_path_buf();
        let data = project.data_dir().to_path_buf();

        Ok(Self {
            config_file: config.join("config.json"),
            settings_file: data.join("settings.json"),
            config,
            data,
        })
    }

    #[must_use]
    pub fn with_base(base: PathBuf) -> Self {
        Self {
            config_file: base.join("config.json"),
            settings_file: base.join("settings.json"),
            config: base.clone(),
            data: base,
        }
    }

    /// Ensure all directories exist.
    ///
    /// # Errors
    ///
    /// Returns an error if any directory cannot be created.
    pub fn ensure_exists(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config)?;
        std::fs::create_dir_all(&self.data)?;
        Ok(())
    }
}
