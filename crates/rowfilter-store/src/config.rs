//! Store configuration.
//!
//! The config file is located at `~/.config/rowfilter/config.toml`, or at
//! `$XDG_CONFIG_HOME/rowfilter/config.toml` when that variable is set. The
//! `ROWFILTER_CONFIG` variable overrides the full path.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::store::{Result, StoreError};

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 1;

/// Environment variable that overrides the config file path.
pub const CONFIG_ENV_VAR: &str = "ROWFILTER_CONFIG";

/// Config directory name under the XDG config home.
const CONFIG_DIRNAME: &str = "rowfilter";

/// Config file name.
const CONFIG_FILENAME: &str = "config.toml";

/// Default config file contents.
pub const DEFAULT_CONFIG: &str = r#"# rowfilter configuration

# Config schema version (do not modify)
version = 1

# Saved filter layouts
[layouts]
# dir = "/path/to/layouts"   # Defaults to the platform data directory
# pretty = true              # Pretty-print layout files
"#;

/// Configuration file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Config schema version for migrations.
    /// Defaults to current version when not present in file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Layout settings.
    #[serde(default)]
    pub layouts: LayoutsConfig,
}

/// Returns the current config version (used by serde default).
fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            layouts: LayoutsConfig::default(),
        }
    }
}

/// Layout configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutsConfig {
    /// Layout directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Pretty-print layout files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,
}

impl StoreConfig {
    /// Gets the config file path.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if no override is set and the home
    /// directory cannot be determined.
    pub fn path() -> Result<PathBuf> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Ok(PathBuf::from(path));
        }

        if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
            return Ok(PathBuf::from(xdg_config)
                .join(CONFIG_DIRNAME)
                .join(CONFIG_FILENAME));
        }

        BaseDirs::new()
            .map(|dirs| {
                dirs.home_dir()
                    .join(".config")
                    .join(CONFIG_DIRNAME)
                    .join(CONFIG_FILENAME)
            })
            .ok_or_else(|| StoreError::Config("could not determine config directory".to_string()))
    }

    /// Loads the configuration from the default path.
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if the file cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Loads the configuration from `path`.
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("failed to read config: {}", e)))?;

        let config: StoreConfig = toml::from_str(&content)
            .map_err(|e| StoreError::Config(format!("failed to parse config: {}", e)))?;

        Ok(config.migrate())
    }

    /// Saves the configuration to `path`, creating its directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::Config(format!("failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| StoreError::Config(format!("failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| StoreError::Config(format!("failed to write config: {}", e)))?;

        Ok(())
    }

    /// Returns the configured layout directory, if any.
    pub fn layouts_dir(&self) -> Option<&Path> {
        self.layouts.dir.as_deref()
    }

    /// Returns whether layout files are pretty-printed. Defaults to true.
    pub fn pretty(&self) -> bool {
        self.layouts.pretty.unwrap_or(true)
    }

    /// Migrates config to current version if needed.
    fn migrate(mut self) -> Self {
        // version 1 is the only schema so far
        self.version = CONFIG_VERSION;
        self
    }
}
