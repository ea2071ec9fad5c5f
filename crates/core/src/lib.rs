//! CineVault core: the record model and the shared error taxonomy

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Classify, ErrorCategory, ErrorSeverity, RecoveryAction, Result};
pub use types::{
    LibraryDocument, MovieDetails, MovieId, MovieRecord, Rating, SearchHit, Timestamp, Validator,
    DEFAULT_LIBRARY_NAME, MAX_STAR_RATING, SCHEMA_VERSION,
};
