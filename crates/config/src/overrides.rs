//! Per-run values layered over the settings file
//!
//! Precedence, lowest first: `config.toml`, `CINEVAULT_*` environment
//! variables, command-line flags. Overrides only shape the effective config
//! of one run and are never written back.

use crate::{Config, LogLevel, ValidationError, ViewMode};
use log::warn;
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_API_KEY: &str = "CINEVAULT_OMDB_API_KEY";
pub const ENV_VAULT_DIR: &str = "CINEVAULT_LIBRARY_VAULT_DIR";
pub const ENV_LOG_LEVEL: &str = "CINEVAULT_APP_LOG_LEVEL";
pub const ENV_VIEW_MODE: &str = "CINEVAULT_DISPLAY_VIEW_MODE";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub vault_dir: Option<PathBuf>,
    pub log_level: Option<LogLevel>,
    pub view_mode: Option<ViewMode>,
}

impl Overrides {
    /// Reads the `CINEVAULT_*` variables of this process
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads variables through `lookup`
    ///
    /// Blank values are treated as unset; unparsable ones are logged and skipped.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            api_key: value(ENV_API_KEY).map(|key| key.trim().to_string()),
            vault_dir: value(ENV_VAULT_DIR).map(PathBuf::from),
            log_level: value(ENV_LOG_LEVEL).and_then(|raw| parse_or_warn(ENV_LOG_LEVEL, &raw)),
            view_mode: value(ENV_VIEW_MODE).and_then(|raw| parse_or_warn(ENV_VIEW_MODE, &raw)),
        }
    }

    /// Overrides with only the vault set
    pub fn vault(dir: impl Into<PathBuf>) -> Self {
        Self {
            vault_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// Stacks `top` over `self`; every value set in `top` wins
    pub fn overlay(self, top: Overrides) -> Self {
        Self {
            api_key: top.api_key.or(self.api_key),
            vault_dir: top.vault_dir.or(self.vault_dir),
            log_level: top.log_level.or(self.log_level),
            view_mode: top.view_mode.or(self.view_mode),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, config: &mut Config) {
        if let Some(key) = &self.api_key {
            config.omdb.api_key = key.clone();
        }
        if let Some(dir) = &self.vault_dir {
            config.library.vault_dir = dir.clone();
        }
        if let Some(level) = self.log_level {
            config.app.log_level = level;
        }
        if let Some(mode) = self.view_mode {
            config.display.view_mode = mode;
        }
    }
}

fn parse_or_warn<T>(name: &str, raw: &str) -> Option<T>
where
    T: FromStr<Err = ValidationError>,
{
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring {}: {}", name, e);
            None
        }
    }
}
