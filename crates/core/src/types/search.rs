//! Provider-neutral search and detail types

use crate::types::Rating;
use serde::{Deserialize, Serialize};

/// A lightweight search result, before detail enrichment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub external_id: String,
    pub title: String,
    pub year: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Poster URL, empty when the provider has none
    pub poster: String,
    /// Always empty from a search; details carry the plot
    pub plot: String,
}

impl SearchHit {
    /// Creates a hit that only knows its provider id
    ///
    /// Used when the user already has an id and skips the search step.
    pub fn from_external_id(external_id: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            ..Self::default()
        }
    }
}

/// Full descriptive field set returned by a successful details lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetails {
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
}
