// crates/resilience/src/lib.rs
//! Resilience patterns for fault-tolerant operations
//!
//! Bounded retry for calls to the metadata provider. Failures are split into
//! retryable (transport) and terminal (everything else) by a predicate, so a
//! provider that answers "not found" is asked exactly once.
//!
//! # Example
//!
//! ```rust
//! use cinevault_resilience::{with_retry_when, RetryPolicy};
//!
//! // Three attempts, no delay between them
//! let policy = RetryPolicy::immediate(3);
//! let result = with_retry_when(&policy, || Ok::<_, String>(42), |_| true);
//! assert_eq!(result.ok(), Some(42));
//! ```

mod error;
mod retry;

pub use error::{ResilienceError, ResilienceResult, RetryError};
pub use retry::{with_retry, with_retry_when, RetryPolicy};
