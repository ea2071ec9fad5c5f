//! CineVault settings
//!
//! Settings live in `config.toml` under the platform config directory or a
//! directory supplied by the caller. Each `[table]` is a section type that
//! implements [`ConfigSection`]. The effective config of a run is the file
//! with [`Overrides`] from the environment and command line on top.
//!
//! Library code never touches the file directly; it goes through the
//! [`SettingsStore`] port.
//!
//! # Example
//!
//! ```rust,no_run
//! use cinevault_config::{ConfigManager, Overrides};
//!
//! let manager = ConfigManager::new()?;
//! manager.initialize()?;
//! let config = manager.load_effective(&Overrides::from_env())?;
//!
//! println!("Vault: {}", config.library.vault_dir.display());
//! # Ok::<(), cinevault_config::ConfigError>(())
//! ```

mod error;
mod manager;
mod migration;
mod overrides;
mod settings;
mod settings_file;
mod validation;

// Config sections
pub mod app_config;
mod display_config;
mod library_config;
mod omdb_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::ConfigManager;
pub use overrides::{Overrides, ENV_API_KEY, ENV_LOG_LEVEL, ENV_VAULT_DIR, ENV_VIEW_MODE};
pub use settings::{MemorySettings, SettingsStore};
pub use validation::{ConfigSection, Validator};

pub use app_config::{AppConfig, LogLevel};
pub use display_config::{DisplayConfig, ViewMode};
pub use library_config::LibraryConfig;
pub use omdb_config::OmdbConfig;

use serde::{Deserialize, Serialize};

/// Current config file format version for migrations
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Application-level settings
    pub app: AppConfig,

    /// Metadata provider credentials and retry bounds
    pub omdb: OmdbConfig,

    /// Vault location and the linked library file
    pub library: LibraryConfig,

    /// Presentation preferences
    pub display: DisplayConfig,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates every section, collecting all errors
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        collect(&self.app, &mut errors);
        collect(&self.omdb, &mut errors);
        collect(&self.library, &mut errors);
        collect(&self.display, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn collect(section: &impl ConfigSection, errors: &mut Vec<ValidationError>) {
    if let Err(mut found) = section.validate() {
        errors.append(&mut found);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            omdb: OmdbConfig::default(),
            library: LibraryConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}
