//! Library location configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where library files live and which one is linked
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LibraryConfig {
    /// Root directory that holds the `cinevault-json/` folder and exports
    pub vault_dir: PathBuf,

    /// Library file restored on startup; relative paths are taken from the vault
    pub linked_path: Option<PathBuf>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            vault_dir: PathBuf::from("."),
            linked_path: None,
        }
    }
}

impl ConfigSection for LibraryConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        // Existence is not checked: the vault is created on first use
        let mut results = vec![Validator::non_empty_path(&self.vault_dir, "library.vault_dir")];

        if let Some(ref linked) = self.linked_path {
            results.push(Validator::non_empty_path(linked, "library.linked_path"));
        }

        Validator::collect_errors(results)
    }
}
