//! Error taxonomy and recovery strategies for CineVault
//!
//! Every failure in the workspace falls into one of a small set of categories.
//! Each crate keeps its own error enum, but all of them implement [`Classify`]
//! so the presentation layer can turn any failure into a user notice plus a
//! diagnostic log entry without knowing where it came from.
//!
//! - **ConfigurationGap**: expected first-run state (no API key yet), stays silent
//! - **TransportFailure**: network trouble, retried where a retry policy applies
//! - **ProviderRejection**: the provider answered "not found" or similar, terminal
//! - **FormatError**: a library file failed structural validation
//! - **IoFailure**: folder or file operations failed
//! - **InvalidInput**: the caller supplied an argument outside the model's range

use std::fmt;
use thiserror::Error;

/// Category of a failure, independent of the crate that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A required setting (API key, linked library) is missing
    ConfigurationGap,
    /// Network error while talking to the metadata provider
    TransportFailure,
    /// Well-formed provider reply that reports failure
    ProviderRejection,
    /// Persisted library file failed structural validation
    FormatError,
    /// Folder or file creation/read/write failed
    IoFailure,
    /// Argument rejected by the record model
    InvalidInput,
}

impl ErrorCategory {
    /// Returns the severity of failures in this category
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ConfigurationGap => ErrorSeverity::Silent,
            Self::TransportFailure => ErrorSeverity::Recoverable,
            Self::ProviderRejection | Self::InvalidInput => ErrorSeverity::Degraded,
            Self::FormatError | Self::IoFailure => ErrorSeverity::Fatal,
        }
    }

    /// Returns the recommended recovery action for this category
    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            Self::ConfigurationGap => RecoveryAction::ConfigureSettings,
            Self::TransportFailure => RecoveryAction::RetryImmediate,
            Self::ProviderRejection | Self::InvalidInput => RecoveryAction::Abandon,
            Self::FormatError | Self::IoFailure => RecoveryAction::UserIntervention,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigurationGap => write!(f, "configuration gap"),
            Self::TransportFailure => write!(f, "transport failure"),
            Self::ProviderRejection => write!(f, "provider rejection"),
            Self::FormatError => write!(f, "format error"),
            Self::IoFailure => write!(f, "I/O failure"),
            Self::InvalidInput => write!(f, "invalid input"),
        }
    }
}

/// Recovery actions that can be taken when an error occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Retry the operation immediately, within the configured attempt bound
    RetryImmediate,
    /// Point the user at the settings that are missing
    ConfigureSettings,
    /// Drop the operation; nothing was committed
    Abandon,
    /// No automatic recovery - user intervention required
    UserIntervention,
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetryImmediate => write!(f, "Retrying immediately"),
            Self::ConfigureSettings => write!(f, "Settings need attention"),
            Self::Abandon => write!(f, "Operation abandoned"),
            Self::UserIntervention => write!(f, "User intervention required"),
        }
    }
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Expected state; no notice is shown
    Silent,
    /// Error can be automatically recovered from
    Recoverable,
    /// Operation failed but the library is intact
    Degraded,
    /// The requested library could not be opened or written
    Fatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Silent => write!(f, "Silent"),
            Self::Recoverable => write!(f, "Recoverable"),
            Self::Degraded => write!(f, "Degraded"),
            Self::Fatal => write!(f, "Fatal"),
        }
    }
}

/// Implemented by every error enum in the workspace
pub trait Classify: std::error::Error {
    /// Returns the taxonomy category of this error
    fn category(&self) -> ErrorCategory;

    /// Returns a user-friendly message suitable for a notice
    fn user_message(&self) -> String;

    /// Returns the severity level of this error
    fn severity(&self) -> ErrorSeverity {
        self.category().severity()
    }

    /// Returns the recommended recovery action for this error
    fn recovery_action(&self) -> RecoveryAction {
        self.category().recovery_action()
    }

    /// Returns true if a notice should be shown for this error
    fn should_notify(&self) -> bool {
        self.severity() > ErrorSeverity::Silent
    }
}

/// Errors raised by the record model itself
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Star rating outside 0..=5
    #[error("Invalid star rating {value}: must be between 0 and 5")]
    InvalidStarRating { value: i64 },

    /// Identifier prefix matched more than one record
    #[error("Ambiguous movie id prefix '{prefix}' matches {matches} records")]
    AmbiguousId { prefix: String, matches: usize },

    /// Identifier did not match any record
    #[error("Movie not found: {id}")]
    MovieNotFound { id: String },

    /// Search hit without an IMDb id
    #[error("Search result has no IMDb id")]
    MissingExternalId,
}

impl Classify for AppError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::InvalidInput
    }

    fn user_message(&self) -> String {
        match self {
            Self::InvalidStarRating { .. } => "Ratings go from 0 to 5 stars.".to_string(),
            Self::AmbiguousId { prefix, .. } => {
                format!("More than one title starts with '{}'. Use a longer id.", prefix)
            }
            Self::MovieNotFound { .. } => "That title is not in your library.".to_string(),
            Self::MissingExternalId => {
                "That result has no IMDb id and cannot be imported.".to_string()
            }
        }
    }
}

/// Convenience type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;
