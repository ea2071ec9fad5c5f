//! Error types for the configuration system

use cinevault_core::{Classify, ErrorCategory};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform has no per-user config directory
    #[error("No per-user config directory on this system")]
    NoConfigDir,

    #[error("Cannot read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write settings {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but holds only whitespace
    #[error("Settings file {path} is empty")]
    Empty { path: PathBuf },

    #[error("Settings file {path} is not valid TOML: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Cannot encode settings: {0}")]
    Encode(#[from] toml::ser::Error),

    /// One or more values are out of range; nothing was written
    #[error("Invalid settings: {}", join(.0))]
    Invalid(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Classify for ConfigError {
    fn category(&self) -> ErrorCategory {
        match self {
            ConfigError::Empty { .. } | ConfigError::Malformed { .. } | ConfigError::Encode(_) => {
                ErrorCategory::FormatError
            }
            ConfigError::Invalid(_) => ErrorCategory::InvalidInput,
            ConfigError::NoConfigDir | ConfigError::Read { .. } | ConfigError::Write { .. } => {
                ErrorCategory::IoFailure
            }
        }
    }

    fn user_message(&self) -> String {
        match self {
            ConfigError::NoConfigDir => {
                "Could not find a settings directory; pass --config-dir.".to_string()
            }
            ConfigError::Empty { path } | ConfigError::Malformed { path, .. } => format!(
                "Settings file {} is not valid TOML; fix or delete it.",
                path.display()
            ),
            ConfigError::Invalid(errors) => format!("Invalid setting: {}", join(errors)),
            other => format!("Could not access settings: {}", other),
        }
    }
}

/// One out-of-range or unparsable setting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted key, e.g. `omdb.max_attempts`
    pub field: String,
    pub problem: String,
    pub got: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            problem: problem.into(),
            got: None,
        }
    }

    /// Records the rejected value
    pub fn got(mut self, value: impl fmt::Display) -> Self {
        self.got = Some(value.to_string());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.problem)?;
        match &self.got {
            Some(value) => write!(f, " (got {})", value),
            None => Ok(()),
        }
    }
}

impl std::error::Error for ValidationError {}
