//! Where CineVault keeps its settings
//!
//! The file lives in the per-user config directory (`~/.config/cinevault/`
//! on Linux) unless the caller names another directory.

use crate::settings_file::{SettingsFile, FILE_NAME};
use crate::{Config, ConfigError, ConfigResult, Overrides};
use directories::ProjectDirs;
use log::{debug, info, warn};
use std::path::Path;

const APP_NAME: &str = "cinevault";

/// Owns `config.toml` for one config directory
pub struct ConfigManager {
    file: SettingsFile,
}

impl ConfigManager {
    /// Uses the platform config directory
    pub fn new() -> ConfigResult<Self> {
        let dirs = ProjectDirs::from("", "", APP_NAME).ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::with_directory(dirs.config_dir()))
    }

    pub fn with_directory(dir: impl AsRef<Path>) -> Self {
        Self {
            file: SettingsFile::new(dir.as_ref().join(FILE_NAME)),
        }
    }

    pub fn config_path(&self) -> &Path {
        self.file.path()
    }

    /// Writes default settings on first run; `Ok(true)` if a file was created
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.file.exists() {
            return Ok(false);
        }
        self.file.write(&Config::default())?;
        info!("Wrote default settings to {}", self.config_path().display());
        Ok(true)
    }

    /// Settings as stored; defaults while there is no file
    ///
    /// Out-of-range values are logged but kept so `config show` can display them.
    pub fn load(&self) -> ConfigResult<Config> {
        let config = match self.file.read()? {
            Some(config) => config,
            None => {
                debug!("No settings at {}, using defaults", self.config_path().display());
                Config::default()
            }
        };
        warn_if_invalid(&config);
        Ok(config)
    }

    /// Validates and writes `config`; nothing is written if a value is out of range
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        config.validate().map_err(ConfigError::Invalid)?;
        self.file.write(config)
    }

    /// Stored settings with `overrides` applied for this run only
    pub fn load_effective(&self, overrides: &Overrides) -> ConfigResult<Config> {
        let mut config = self.load()?;
        if !overrides.is_empty() {
            debug!("Applying overrides {:?}", overrides);
            overrides.apply(&mut config);
            warn_if_invalid(&config);
        }
        Ok(config)
    }
}

fn warn_if_invalid(config: &Config) {
    if let Err(errors) = config.validate() {
        warn!("{}", ConfigError::Invalid(errors));
    }
}
