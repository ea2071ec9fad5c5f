// FILE: crates/library/src/error.rs

use cinevault_config::ConfigError;
use cinevault_content_sources::SourceError;
use cinevault_core::{AppError, Classify, ErrorCategory};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Invalid library file {path}: {reason}")]
    Format { path: PathBuf, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No library linked")]
    NotLinked,

    #[error("Details unavailable for {external_id}")]
    DetailsUnavailable { external_id: String },

    #[error(transparent)]
    Model(#[from] AppError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Settings error: {0}")]
    Settings(#[from] ConfigError),

    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl LibraryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LibraryError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        LibraryError::Format {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl Classify for LibraryError {
    fn category(&self) -> ErrorCategory {
        match self {
            LibraryError::Format { .. } => ErrorCategory::FormatError,
            LibraryError::Io { .. } | LibraryError::Serialize(_) => ErrorCategory::IoFailure,
            LibraryError::NotLinked => ErrorCategory::ConfigurationGap,
            LibraryError::DetailsUnavailable { .. } => ErrorCategory::ProviderRejection,
            LibraryError::Model(e) => e.category(),
            LibraryError::Source(e) => e.category(),
            LibraryError::Settings(e) => e.category(),
        }
    }

    fn user_message(&self) -> String {
        match self {
            LibraryError::Format { .. } => "Unable to read the JSON file.".to_string(),
            LibraryError::Io { path, .. } => {
                format!("Unable to access {}.", path.display())
            }
            LibraryError::NotLinked => {
                "No library linked. Create one with `init` or pick one with `link`.".to_string()
            }
            LibraryError::DetailsUnavailable { .. } => "Unable to load movie details.".to_string(),
            LibraryError::Model(e) => e.user_message(),
            LibraryError::Source(e) => e.user_message(),
            LibraryError::Settings(e) => e.user_message(),
            LibraryError::Serialize(_) => "Unable to write the library file.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
pub type LibraryResult<T> = std::result::Result<T, LibraryError>;
