//! Movie record domain model

use crate::types::Validator;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Highest star rating a user can give
pub const MAX_STAR_RATING: u8 = 5;

/// Unique identifier for a library entry
///
/// New records get a random UUID. Records loaded from older files may carry
/// any string, so the id is kept opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(String);

impl MovieId {
    /// Creates a new random MovieId
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an existing identifier string
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MovieId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Third-party score snapshot, mirrored verbatim from the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Rating {
    pub source: String,
    pub value: String,
}

impl Rating {
    pub fn new(source: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            value: value.into(),
        }
    }
}

/// One library entry (a movie or a show)
///
/// Descriptive fields are plain strings; an empty string means "unknown".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MovieRecord {
    pub id: MovieId,
    /// Provider identifier, used to spot titles already in the library
    #[serde(rename = "imdbId")]
    pub external_id: String,
    pub title: String,
    pub year: String,
    pub rated: String,
    pub released: String,
    pub runtime: String,
    pub genre: String,
    pub director: String,
    pub writer: String,
    pub actors: String,
    pub plot: String,
    pub language: String,
    pub country: String,
    pub awards: String,
    pub poster: String,
    pub poster_local: String,
    pub ratings: Vec<Rating>,
    pub metascore: String,
    pub imdb_rating: String,
    pub imdb_votes: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub dvd: String,
    pub box_office: String,
    pub production: String,
    pub website: String,
    pub total_seasons: String,
    #[serde(rename = "tomatoURL")]
    pub tomato_url: String,
    pub tomato_meter: String,
    pub tomato_image: String,
    pub tomato_rating: String,
    pub tomato_reviews: String,
    pub tomato_fresh: String,
    pub tomato_rotten: String,
    pub tomato_consensus: String,
    pub tomato_user_meter: String,
    pub tomato_user_rating: String,
    pub tomato_user_reviews: String,
    /// Personal rating, 0 (unrated) to 5
    pub star_rating: u8,
    pub watched: bool,
    pub notes: String,
    /// Keys this version does not know about, kept so saving never drops them
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MovieRecord {
    /// Creates a record with a fresh id and every other field at its zero value
    ///
    /// Every new record starts here; callers overwrite only what they know.
    pub fn empty() -> Self {
        Self {
            id: MovieId::new(),
            external_id: String::new(),
            title: String::new(),
            year: String::new(),
            rated: String::new(),
            released: String::new(),
            runtime: String::new(),
            genre: String::new(),
            director: String::new(),
            writer: String::new(),
            actors: String::new(),
            plot: String::new(),
            language: String::new(),
            country: String::new(),
            awards: String::new(),
            poster: String::new(),
            poster_local: String::new(),
            ratings: Vec::new(),
            metascore: String::new(),
            imdb_rating: String::new(),
            imdb_votes: String::new(),
            kind: String::new(),
            dvd: String::new(),
            box_office: String::new(),
            production: String::new(),
            website: String::new(),
            total_seasons: String::new(),
            tomato_url: String::new(),
            tomato_meter: String::new(),
            tomato_image: String::new(),
            tomato_rating: String::new(),
            tomato_reviews: String::new(),
            tomato_fresh: String::new(),
            tomato_rotten: String::new(),
            tomato_consensus: String::new(),
            tomato_user_meter: String::new(),
            tomato_user_rating: String::new(),
            tomato_user_reviews: String::new(),
            star_rating: 0,
            watched: false,
            notes: String::new(),
            extra: Map::new(),
        }
    }

    /// Returns true if the user has rated this title
    pub fn is_rated(&self) -> bool {
        self.star_rating > 0
    }

    /// Caption shown under a poster: year and capitalised type, e.g. `2010 - Movie`
    pub fn details_line(&self) -> String {
        let mut parts = Vec::with_capacity(2);
        if !self.year.is_empty() {
            parts.push(self.year.clone());
        }
        let mut chars = self.kind.chars();
        if let Some(first) = chars.next() {
            parts.push(first.to_uppercase().chain(chars).collect());
        }
        parts.join(" - ")
    }
}

impl Default for MovieRecord {
    fn default() -> Self {
        Self::empty()
    }
}

impl Validator for MovieRecord {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.id.as_str().trim().is_empty() {
            errors.push("Id cannot be empty".to_string());
        }

        if self.star_rating > MAX_STAR_RATING {
            errors.push(format!(
                "Star rating must be between 0 and {}",
                MAX_STAR_RATING
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
