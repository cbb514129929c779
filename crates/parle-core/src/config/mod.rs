mod dirs;
mod settings;
mod user;
mod validation;

pub use dirs::Directories;
pub use settings::{Config, EngineConfig, LocaleConfig, SearchConfig};
pub use user::{FileSettings, MemorySettings, SettingsStore, UserSettings};
pub use validation::warn_unknown_fields;
