// FILE: crates/config/src/migration.rs
//! Upgrades older settings files before they are deserialized
//!
//! Steps work on the raw TOML table so renamed or moved keys can be carried
//! over. Add a step to [`step_to`] whenever `CONFIG_VERSION` goes up.

use crate::{ConfigResult, CONFIG_VERSION};
use log::{debug, info, warn};
use toml::Table;

/// One upgrade step
pub trait Migration {
    /// Version the table is at after this step
    fn target_version(&self) -> u32;

    fn migrate(&self, table: &mut Table) -> ConfigResult<()>;
}

/// Version recorded in the file; a missing key means current
pub fn file_version(table: &Table) -> u32 {
    table
        .get("version")
        .and_then(toml::Value::as_integer)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(CONFIG_VERSION)
}

/// Brings `table` up to `CONFIG_VERSION`; returns `true` when it changed
///
/// Newer files are left alone and read as-is; unknown keys are ignored.
pub fn upgrade(table: &mut Table) -> ConfigResult<bool> {
    let from = file_version(table);
    if from > CONFIG_VERSION {
        warn!(
            "Settings version {} is newer than {}; reading it as-is",
            from, CONFIG_VERSION
        );
        return Ok(false);
    }
    if from == CONFIG_VERSION {
        return Ok(false);
    }

    info!("Upgrading settings from version {} to {}", from, CONFIG_VERSION);
    for version in (from + 1)..=CONFIG_VERSION {
        if let Some(step) = step_to(version) {
            step.migrate(table)?;
            debug!("Applied settings step to version {}", step.target_version());
        }
    }

    table.insert(
        "version".to_string(),
        toml::Value::Integer(i64::from(CONFIG_VERSION)),
    );
    Ok(true)
}

// Version 1 is the first layout
fn step_to(_version: u32) -> Option<Box<dyn Migration>> {
    None
}
