// FILE: crates/content-sources/src/lib.rs

mod omdb;
mod traits;
mod transport;

use cinevault_core::{Classify, ErrorCategory};
pub use omdb::{OmdbOptions, OmdbSource};
use std::fmt;
pub use traits::{MetadataProvider, SourceMetadata};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};

/// Result type for content source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors from content sources
#[derive(Debug, Clone, PartialEq)]
pub enum SourceError {
    /// No API key configured
    MissingApiKey,
    /// Network error
    NetworkError(String),
    /// Response body could not be read
    ParseError(String),
    /// Provider answered with an explicit failure, e.g. "Movie not found!"
    Rejected(String),
    /// Invalid query
    InvalidQuery(String),
    /// Transport kept failing until the attempt bound
    RetriesExhausted { attempts: usize, last_error: String },
}

impl SourceError {
    /// Returns true for failures worth another attempt
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::NetworkError(_) | SourceError::ParseError(_))
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::MissingApiKey => write!(f, "No API key configured"),
            SourceError::NetworkError(e) => write!(f, "Network error: {}", e),
            SourceError::ParseError(e) => write!(f, "Parse error: {}", e),
            SourceError::Rejected(e) => write!(f, "Provider rejected request: {}", e),
            SourceError::InvalidQuery(e) => write!(f, "Invalid query: {}", e),
            SourceError::RetriesExhausted {
                attempts,
                last_error,
            } => write!(
                f,
                "Gave up after {} attempts: {}",
                attempts, last_error
            ),
        }
    }
}

impl std::error::Error for SourceError {}

impl Classify for SourceError {
    fn category(&self) -> ErrorCategory {
        match self {
            SourceError::MissingApiKey => ErrorCategory::ConfigurationGap,
            SourceError::NetworkError(_)
            | SourceError::ParseError(_)
            | SourceError::RetriesExhausted { .. } => ErrorCategory::TransportFailure,
            SourceError::Rejected(_) => ErrorCategory::ProviderRejection,
            SourceError::InvalidQuery(_) => ErrorCategory::InvalidInput,
        }
    }

    fn user_message(&self) -> String {
        match self {
            SourceError::MissingApiKey => {
                "Set your OMDb API key first (free at omdbapi.com).".to_string()
            }
            SourceError::NetworkError(_)
            | SourceError::ParseError(_)
            | SourceError::RetriesExhausted { .. } => {
                "Cannot reach OMDb. Please check your connection.".to_string()
            }
            SourceError::Rejected(reason) => format!("OMDb: {}", reason),
            SourceError::InvalidQuery(_) => "Type at least a couple of letters.".to_string(),
        }
    }
}
