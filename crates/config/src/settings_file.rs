//! The `config.toml` file itself
//!
//! Writes go to a temp file next to the target that is then renamed over it;
//! the file being replaced is first copied to `config.toml.backup`.

use crate::migration;
use crate::{Config, ConfigError, ConfigResult};
use log::{debug, info};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub(crate) const FILE_NAME: &str = "config.toml";
const BACKUP_EXTENSION: &str = "toml.backup";

pub(crate) struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Parses the file, upgrading it on disk if it was written by an older version
    ///
    /// Returns `None` when there is no file yet. A blank file is an error,
    /// not an empty config.
    pub(crate) fn read(&self) -> ConfigResult<Option<Config>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if text.trim().is_empty() {
            return Err(ConfigError::Empty {
                path: self.path.clone(),
            });
        }

        let mut table: toml::Table = text.parse().map_err(|e| self.malformed(e))?;
        let upgraded = migration::upgrade(&mut table)?;
        let config: Config = toml::Value::Table(table)
            .try_into()
            .map_err(|e| self.malformed(e))?;

        if upgraded {
            info!("Rewriting upgraded settings {}", self.path.display());
            self.write(&config)?;
        }
        Ok(Some(config))
    }

    /// Replaces the file atomically, creating its directory if needed
    pub(crate) fn write(&self, config: &Config) -> ConfigResult<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        let body = toml::to_string_pretty(config)?;

        if self.exists() {
            let backup = self.path.with_extension(BACKUP_EXTENSION);
            fs::copy(&self.path, &backup).map_err(|source| ConfigError::Write {
                path: backup.clone(),
                source,
            })?;
        }

        let mut temp = NamedTempFile::new_in(dir).map_err(|source| ConfigError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
        temp.write_all(body.as_bytes())
            .and_then(|_| temp.flush())
            .map_err(|source| ConfigError::Write {
                path: temp.path().to_path_buf(),
                source,
            })?;
        temp.persist(&self.path)
            .map_err(|e| ConfigError::Write {
                path: self.path.clone(),
                source: e.error,
            })?;

        debug!("Saved settings to {}", self.path.display());
        Ok(())
    }

    fn malformed(&self, source: toml::de::Error) -> ConfigError {
        ConfigError::Malformed {
            path: self.path.clone(),
            source,
        }
    }
}
