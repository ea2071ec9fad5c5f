// FILE: crates/content-sources/src/transport.rs

use crate::{SourceError, SourceResult};
use std::time::Duration;

/// Raw reply from an HTTP GET
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs HTTP GET requests
///
/// Only failures to get any reply at all are errors here; status codes are
/// left to the caller.
pub trait HttpTransport: Send + Sync {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> SourceResult<HttpResponse>;
}

/// Blocking reqwest-backed transport
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Create a transport whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> SourceResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION"),
            ))
            .build()
            .map_err(|e| SourceError::NetworkError(format!("HTTP client unavailable: {}", e)))?;

        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> SourceResult<HttpResponse> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| SourceError::NetworkError(format!("Request failed: {}", e.without_url())))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| SourceError::NetworkError(format!("Failed to read body: {}", e.without_url())))?;

        Ok(HttpResponse { status, body })
    }
}
