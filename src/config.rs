//! Configuration loading and management
//!
//! Handles parsing of `config.toml` in the application directory. Every
//! field is optional.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::storage::{CONFIG_FILE, TASKS_FILE};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// File name of the backing store inside the application directory
    #[serde(default = "default_tasks_file")]
    pub tasks_file: String,

    /// Cleanup configuration
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tasks_file: default_tasks_file(),
            cleanup: CleanupConfig::default(),
        }
    }
}

fn default_tasks_file() -> String {
    TASKS_FILE.to_string()
}

/// Cleanup of old completed tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupConfig {
    /// Age in days after which completed, non-repeating tasks are evicted
    #[serde(default = "default_cleanup_days")]
    pub days: u32,

    /// Run cleanup every time the CLI opens the repository
    #[serde(default)]
    pub on_startup: bool,
}

fn default_cleanup_days() -> u32 {
    30
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            days: default_cleanup_days(),
            on_startup: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `config.toml` from the application directory, or return defaults
    pub fn load_from_dir(app_dir: &Path) -> Self {
        let config_path = app_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(
                    path = %config_path.display(),
                    error = %err,
                    "ignoring invalid config; using defaults"
                );
                Self::default()
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> crate::error::Result<()> {
        let name = self.tasks_file.trim();
        if name.is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "tasks_file cannot be empty".to_string(),
            ));
        }
        if name != self.tasks_file {
            return Err(crate::error::Error::InvalidConfig(
                "tasks_file cannot start or end with whitespace".to_string(),
            ));
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(crate::error::Error::InvalidConfig(format!(
                "tasks_file must be a plain file name, got '{name}'"
            )));
        }
        if name == CONFIG_FILE {
            return Err(crate::error::Error::InvalidConfig(
                "tasks_file cannot be the config file".to_string(),
            ));
        }
        Ok(())
    }
}
