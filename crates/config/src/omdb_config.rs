//! Metadata provider configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OMDb credentials, endpoint and retry bounds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OmdbConfig {
    /// API key; empty means lookups are skipped
    pub api_key: String,

    /// Endpoint for both search and details requests
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Attempts per details lookup, including the first
    pub max_attempts: usize,

    /// Delay before the first retry in milliseconds (0 = immediate)
    pub retry_delay_ms: u64,
}

impl OmdbConfig {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://www.omdbapi.com/".to_string(),
            timeout_secs: 30,
            max_attempts: 3,
            retry_delay_ms: 0,
        }
    }
}

impl ConfigSection for OmdbConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let results = vec![
            Validator::not_empty(&self.base_url, "omdb.base_url"),
            Validator::in_range(self.timeout_secs, 1, 300, "omdb.timeout_secs"),
            Validator::in_range(self.max_attempts, 1, 10, "omdb.max_attempts"),
            Validator::in_range(self.retry_delay_ms, 0, 60_000, "omdb.retry_delay_ms"),
        ];

        Validator::collect_errors(results)
    }
}
