// FILE: crates/content-sources/src/omdb.rs

use crate::{
    HttpResponse, HttpTransport, MetadataProvider, ReqwestTransport, SourceError, SourceMetadata,
    SourceResult,
};
use cinevault_core::{MovieDetails, Rating, SearchHit};
use cinevault_resilience::{with_retry_when, RetryError, RetryPolicy};
use serde_json::{Map, Value};
use std::time::Duration;

/// Placeholder OMDb uses for missing values
const NOT_AVAILABLE: &str = "N/A";

/// Connection settings for [`OmdbSource`]
#[derive(Debug, Clone, PartialEq)]
pub struct OmdbOptions {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    /// Applies to details lookups only; searches are never retried
    pub retry: RetryPolicy,
}

impl OmdbOptions {
    pub const API_BASE: &'static str = "https://www.omdbapi.com/";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for OmdbOptions {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Self::API_BASE.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::immediate(3),
        }
    }
}

/// OMDb (Open Movie Database) metadata source
pub struct OmdbSource {
    options: OmdbOptions,
    transport: Box<dyn HttpTransport>,
}

impl OmdbSource {
    /// Create a source backed by a blocking HTTP client
    pub fn new(options: OmdbOptions) -> SourceResult<Self> {
        let transport = ReqwestTransport::new(options.timeout)?;
        Ok(Self::with_transport(options, Box::new(transport)))
    }

    /// Create a source over any transport
    pub fn with_transport(options: OmdbOptions, transport: Box<dyn HttpTransport>) -> Self {
        Self { options, transport }
    }

    pub fn options(&self) -> &OmdbOptions {
        &self.options
    }

    fn api_key(&self) -> SourceResult<&str> {
        let key = self.options.api_key.trim();
        if key.is_empty() {
            return Err(SourceError::MissingApiKey);
        }
        Ok(key)
    }

    /// Search OMDb by title; one request, no retry
    pub fn try_search(&self, query: &str) -> SourceResult<Vec<SearchHit>> {
        let api_key = self.api_key()?;
        let query = query.trim();
        if query.is_empty() {
            return Err(SourceError::InvalidQuery("Empty query".to_string()));
        }

        let response = self
            .transport
            .get(&self.options.base_url, &[("apikey", api_key), ("s", query)])?;
        let body = parse_reply(&response)?;

        if field(&body, "Response") == "False" {
            return Err(SourceError::Rejected(rejection_reason(&body)));
        }

        let hits = body
            .get("Search")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(|item| SearchHit {
                        external_id: field(item, "imdbID"),
                        title: field(item, "Title"),
                        year: field(item, "Year"),
                        kind: field(item, "Type"),
                        poster: poster(item),
                        plot: String::new(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(hits)
    }

    /// Fetch full details for a provider id, retrying transport failures
    pub fn try_fetch_details(&self, external_id: &str) -> SourceResult<MovieDetails> {
        let api_key = self.api_key()?;
        let external_id = external_id.trim();
        if external_id.is_empty() {
            return Err(SourceError::InvalidQuery("Empty id".to_string()));
        }

        let result = with_retry_when(
            &self.options.retry,
            || self.request_details(api_key, external_id),
            SourceError::is_transient,
        );

        match result {
            Ok(details) => Ok(details),
            Err(RetryError::Exhausted {
                attempts,
                last_error,
            }) => Err(SourceError::RetriesExhausted {
                attempts,
                last_error: last_error.to_string(),
            }),
            Err(RetryError::Aborted { error, .. }) => Err(error),
        }
    }

    fn request_details(&self, api_key: &str, external_id: &str) -> SourceResult<MovieDetails> {
        let response = self.transport.get(
            &self.options.base_url,
            &[
                ("apikey", api_key),
                ("i", external_id),
                ("plot", "full"),
                ("tomatoes", "true"),
            ],
        )?;
        let body = parse_reply(&response)?;

        if field(&body, "Response") != "True" {
            return Err(SourceError::Rejected(rejection_reason(&body)));
        }

        Ok(MovieDetails {
            external_id: field(&body, "imdbID"),
            title: field(&body, "Title"),
            year: field(&body, "Year"),
            rated: field(&body, "Rated"),
            released: field(&body, "Released"),
            runtime: field(&body, "Runtime"),
            genre: field(&body, "Genre"),
            director: field(&body, "Director"),
            writer: field(&body, "Writer"),
            actors: field(&body, "Actors"),
            plot: field(&body, "Plot"),
            language: field(&body, "Language"),
            country: field(&body, "Country"),
            awards: field(&body, "Awards"),
            poster: poster(&body),
            ratings: ratings(&body),
            metascore: field(&body, "Metascore"),
            imdb_rating: field(&body, "imdbRating"),
            imdb_votes: field(&body, "imdbVotes"),
            kind: field(&body, "Type"),
            dvd: field(&body, "DVD"),
            box_office: field(&body, "BoxOffice"),
            production: field(&body, "Production"),
            website: field(&body, "Website"),
            total_seasons: field(&body, "totalSeasons"),
            tomato_url: field(&body, "tomatoURL"),
            tomato_meter: field(&body, "tomatoMeter"),
            tomato_image: field(&body, "tomatoImage"),
            tomato_rating: field(&body, "tomatoRating"),
            tomato_reviews: field(&body, "tomatoReviews"),
            tomato_fresh: field(&body, "tomatoFresh"),
            tomato_rotten: field(&body, "tomatoRotten"),
            tomato_consensus: field(&body, "tomatoConsensus"),
            tomato_user_meter: field(&body, "tomatoUserMeter"),
            tomato_user_rating: field(&body, "tomatoUserRating"),
            tomato_user_reviews: field(&body, "tomatoUserReviews"),
        })
    }
}

impl MetadataProvider for OmdbSource {
    fn search(&self, query: &str) -> Vec<SearchHit> {
        match self.try_search(query) {
            Ok(hits) => {
                log::debug!("OMDb search '{}' returned {} hits", query, hits.len());
                hits
            }
            Err(SourceError::MissingApiKey) => {
                log::debug!("Skipping OMDb search: no API key configured");
                Vec::new()
            }
            Err(e @ (SourceError::InvalidQuery(_) | SourceError::Rejected(_))) => {
                log::debug!("OMDb search '{}' returned nothing: {}", query, e);
                Vec::new()
            }
            Err(e) => {
                log::warn!("Error searching OMDb: {}", e);
                Vec::new()
            }
        }
    }

    fn fetch_details(&self, external_id: &str) -> Option<MovieDetails> {
        match self.try_fetch_details(external_id) {
            Ok(details) => Some(details),
            Err(SourceError::MissingApiKey) => {
                log::debug!("Skipping OMDb details lookup: no API key configured");
                None
            }
            Err(SourceError::RetriesExhausted { attempts, last_error }) => {
                log::error!(
                    "Failed to fetch details for {} after {} attempts: {}",
                    external_id,
                    attempts,
                    last_error
                );
                None
            }
            Err(e) => {
                log::error!("OMDb returned error response for {}: {}", external_id, e);
                None
            }
        }
    }

    fn metadata(&self) -> SourceMetadata {
        SourceMetadata {
            name: "OMDb".to_string(),
            description: "The Open Movie Database: movie and TV series metadata".to_string(),
            base_url: self.options.base_url.clone(),
            requires_auth: true,
        }
    }

    fn is_available(&self) -> bool {
        self.api_key().is_ok()
    }
}

/// Decodes a reply body into a JSON object
///
/// OMDb reports some failures (bad key) as JSON with a 4xx status, so a JSON
/// object is accepted whatever the status.
fn parse_reply(response: &HttpResponse) -> SourceResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(&response.body) {
        Ok(Value::Object(obj)) => Ok(obj),
        Ok(_) if response.is_success() => Err(SourceError::ParseError(
            "Expected a JSON object".to_string(),
        )),
        Err(e) if response.is_success() => {
            Err(SourceError::ParseError(format!("JSON parse error: {}", e)))
        }
        _ => Err(SourceError::NetworkError(format!("HTTP {}", response.status))),
    }
}

/// Reads a field as a string, tolerating numbers, booleans and absence
fn field(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn poster(obj: &Map<String, Value>) -> String {
    let poster = field(obj, "Poster");
    if poster == NOT_AVAILABLE {
        String::new()
    } else {
        poster
    }
}

fn ratings(obj: &Map<String, Value>) -> Vec<Rating> {
    obj.get("Ratings")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .map(|r| Rating::new(field(r, "Source"), field(r, "Value")))
                .collect()
        })
        .unwrap_or_default()
}

fn rejection_reason(obj: &Map<String, Value>) -> String {
    let reason = field(obj, "Error");
    if reason.is_empty() {
        "Unknown error".to_string()
    } else {
        reason
    }
}
