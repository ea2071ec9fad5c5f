// crates/resilience/src/error.rs
//! Error types for resilience operations

use thiserror::Error;

/// Result type for resilience operations
pub type ResilienceResult<T> = Result<T, ResilienceError>;

/// Errors that can occur in resilience operations
#[derive(Debug, Error)]
pub enum ResilienceError {
    /// All retry attempts exhausted
    #[error("All {attempts} retry attempts exhausted: {last_error}")]
    RetriesExhausted { attempts: usize, last_error: String },

    /// A failure the policy does not retry
    #[error("Gave up after {attempts} attempt(s) on a non-retryable error: {error}")]
    Aborted { attempts: usize, error: String },
}

/// Failure of a retried operation, keeping the operation's own error type
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error
    #[error("All {attempts} retry attempts exhausted: {last_error}")]
    Exhausted { attempts: usize, last_error: E },

    /// An attempt failed with an error the predicate declined to retry
    #[error("Gave up after {attempts} attempt(s) on a non-retryable error: {error}")]
    Aborted { attempts: usize, error: E },
}

impl<E> RetryError<E> {
    /// Number of attempts made before giving up
    pub fn attempts(&self) -> usize {
        match self {
            Self::Exhausted { attempts, .. } | Self::Aborted { attempts, .. } => *attempts,
        }
    }

    /// Returns true if the attempt bound was reached
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// Returns the error from the final attempt
    pub fn into_inner(self) -> E {
        match self {
            Self::Exhausted { last_error, .. } => last_error,
            Self::Aborted { error, .. } => error,
        }
    }
}

impl<E: std::fmt::Display> From<RetryError<E>> for ResilienceError {
    fn from(err: RetryError<E>) -> Self {
        match err {
            RetryError::Exhausted {
                attempts,
                last_error,
            } => ResilienceError::RetriesExhausted {
                attempts,
                last_error: last_error.to_string(),
            },
            RetryError::Aborted { attempts, error } => ResilienceError::Aborted {
                attempts,
                error: error.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_exhausted_error() {
        let err = ResilienceError::RetriesExhausted {
            attempts: 3,
            last_error: "connection failed".to_string(),
        };
        assert!(err.to_string().contains("3"));
        assert!(err.to_string().contains("connection failed"));
    }

    #[test]
    fn test_retry_error_accessors() {
        let err: RetryError<&str> = RetryError::Aborted {
            attempts: 1,
            error: "Movie not found!",
        };
        assert_eq!(err.attempts(), 1);
        assert!(!err.is_exhausted());
        assert_eq!(err.into_inner(), "Movie not found!");
    }

    #[test]
    fn test_retry_error_converts_to_resilience_error() {
        let err: RetryError<String> = RetryError::Exhausted {
            attempts: 3,
            last_error: "timeout".to_string(),
        };
        let converted: ResilienceError = err.into();
        assert!(matches!(
            converted,
            ResilienceError::RetriesExhausted { attempts: 3, .. }
        ));
    }
}
