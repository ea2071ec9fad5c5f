//! Settings persistence port

use crate::{Config, ConfigManager, ConfigResult};
use std::cell::{Cell, RefCell};

/// Loads and stores the settings record
///
/// Library code depends on this trait instead of a concrete file so tests and
/// embedders can supply their own storage.
pub trait SettingsStore {
    fn load_settings(&self) -> ConfigResult<Config>;

    fn save_settings(&self, config: &Config) -> ConfigResult<()>;

    /// Loads, applies `update_fn`, and saves
    fn update_settings(&self, update_fn: &mut dyn FnMut(&mut Config)) -> ConfigResult<()> {
        let mut config = self.load_settings()?;
        update_fn(&mut config);
        self.save_settings(&config)
    }
}

impl SettingsStore for ConfigManager {
    fn load_settings(&self) -> ConfigResult<Config> {
        self.load()
    }

    fn save_settings(&self, config: &Config) -> ConfigResult<()> {
        self.save(config)
    }
}

/// In-memory settings, for tests and one-shot runs
#[derive(Debug, Default)]
pub struct MemorySettings {
    config: RefCell<Config>,
    saves: Cell<usize>,
}

impl MemorySettings {
    pub fn new(config: Config) -> Self {
        Self {
            config: RefCell::new(config),
            saves: Cell::new(0),
        }
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    pub fn snapshot(&self) -> Config {
        self.config.borrow().clone()
    }
}

impl SettingsStore for MemorySettings {
    fn load_settings(&self) -> ConfigResult<Config> {
        Ok(self.config.borrow().clone())
    }

    fn save_settings(&self, config: &Config) -> ConfigResult<()> {
        *self.config.borrow_mut() = config.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
