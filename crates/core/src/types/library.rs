//! Library document: header plus the ordered record sequence

use crate::error::AppError;
use crate::types::{MovieId, MovieRecord, Timestamp, Validator};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Current library file schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Default library name written into new documents
pub const DEFAULT_LIBRARY_NAME: &str = "CineVault";

/// The full persisted library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LibraryDocument {
    pub schema_version: u32,
    /// ISO-8601 creation time
    pub created_at: String,
    /// ISO-8601 time of the last mutation
    pub updated_at: String,
    pub library_name: String,
    pub owner: String,
    pub source: String,
    /// Records in insertion order
    pub movies: Vec<MovieRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LibraryDocument {
    /// Creates an empty library stamped with the current time
    pub fn empty() -> Self {
        let now = Timestamp::now().to_iso8601();
        Self {
            schema_version: SCHEMA_VERSION,
            created_at: now.clone(),
            updated_at: now,
            library_name: DEFAULT_LIBRARY_NAME.to_string(),
            owner: String::new(),
            source: DEFAULT_LIBRARY_NAME.to_string(),
            movies: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Refreshes `updated_at`; called after every mutation
    pub fn touch(&mut self) {
        self.updated_at = Timestamp::now().to_iso8601();
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.movies.len()
    }

    /// Returns true if the library holds no records
    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Finds a record by its library id
    pub fn find(&self, id: &MovieId) -> Option<&MovieRecord> {
        self.movies.iter().find(|m| &m.id == id)
    }

    /// Finds a record by its library id, mutably
    pub fn find_mut(&mut self, id: &MovieId) -> Option<&mut MovieRecord> {
        self.movies.iter_mut().find(|m| &m.id == id)
    }

    /// Finds the first record imported from the given provider id
    pub fn find_by_external_id(&self, external_id: &str) -> Option<&MovieRecord> {
        self.movies.iter().find(|m| m.external_id == external_id)
    }

    /// Finds the first record imported from the given provider id, mutably
    pub fn find_by_external_id_mut(&mut self, external_id: &str) -> Option<&mut MovieRecord> {
        self.movies.iter_mut().find(|m| m.external_id == external_id)
    }

    /// Resolves a unique id prefix to a full id
    ///
    /// An exact match always wins over prefix matches.
    pub fn resolve_id_prefix(&self, prefix: &str) -> Result<MovieId, AppError> {
        if let Some(exact) = self.movies.iter().find(|m| m.id.as_str() == prefix) {
            return Ok(exact.id.clone());
        }

        let matches: Vec<&MovieRecord> = self
            .movies
            .iter()
            .filter(|m| !prefix.is_empty() && m.id.as_str().starts_with(prefix))
            .collect();

        match matches.as_slice() {
            [single] => Ok(single.id.clone()),
            [] => Err(AppError::MovieNotFound {
                id: prefix.to_string(),
            }),
            many => Err(AppError::AmbiguousId {
                prefix: prefix.to_string(),
                matches: many.len(),
            }),
        }
    }

    /// Records already watched, in insertion order
    pub fn watched(&self) -> impl Iterator<Item = &MovieRecord> {
        self.movies.iter().filter(|m| m.watched)
    }

    /// Records still to watch, in insertion order
    pub fn to_watch(&self) -> impl Iterator<Item = &MovieRecord> {
        self.movies.iter().filter(|m| !m.watched)
    }
}

impl Default for LibraryDocument {
    fn default() -> Self {
        Self::empty()
    }
}

impl Validator for LibraryDocument {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.schema_version != SCHEMA_VERSION {
            errors.push(format!(
                "Schema version {} is not supported (expected {})",
                self.schema_version, SCHEMA_VERSION
            ));
        }

        let mut ids = HashSet::new();
        let mut external_ids = HashSet::new();
        for movie in &self.movies {
            if let Err(mut e) = movie.validate() {
                errors.append(&mut e);
            }
            if !ids.insert(movie.id.as_str()) {
                errors.push(format!("Duplicate id: {}", movie.id));
            }
            if !movie.external_id.is_empty() && !external_ids.insert(movie.external_id.as_str()) {
                errors.push(format!("Duplicate provider id: {}", movie.external_id));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, external_id: &str, watched: bool) -> MovieRecord {
        let mut m = MovieRecord::empty();
        m.id = MovieId::from_string(id);
        m.external_id = external_id.to_string();
        m.watched = watched;
        m
    }

    #[test]
    fn test_empty_document() {
        let doc = LibraryDocument::empty();
        assert_eq!(doc.schema_version, SCHEMA_VERSION);
        assert_eq!(doc.created_at, doc.updated_at);
        assert_eq!(doc.library_name, "CineVault");
        assert_eq!(doc.source, "CineVault");
        assert!(doc.owner.is_empty());
        assert!(doc.is_empty());
        assert!(doc.is_valid());
    }

    #[test]
    fn test_serialized_header_keys() {
        let value = serde_json::to_value(LibraryDocument::empty()).expect("serialize");
        let obj = value.as_object().expect("object");
        for key in ["schemaVersion", "createdAt", "updatedAt", "libraryName", "owner", "source", "movies"] {
            assert!(obj.contains_key(key), "missing {}", key);
        }
    }

    #[test]
    fn test_lookup_helpers() {
        let mut doc = LibraryDocument::empty();
        doc.movies.push(record("1", "tt1", false));
        doc.movies.push(record("2", "tt2", true));

        assert_eq!(doc.find(&MovieId::from_string("2")).map(|m| m.external_id.as_str()), Some("tt2"));
        assert!(doc.find(&MovieId::from_string("3")).is_none());
        assert_eq!(doc.find_by_external_id("tt1").map(|m| m.id.as_str()), Some("1"));
        assert_eq!(doc.watched().count(), 1);
        assert_eq!(doc.to_watch().count(), 1);
    }

    #[test]
    fn test_resolve_id_prefix() {
        let mut doc = LibraryDocument::empty();
        doc.movies.push(record("abc123", "tt1", false));
        doc.movies.push(record("abd456", "tt2", false));
        doc.movies.push(record("ab", "tt3", false));

        assert_eq!(doc.resolve_id_prefix("abc").map(|id| id.to_string()), Ok("abc123".to_string()));
        assert_eq!(doc.resolve_id_prefix("ab").map(|id| id.to_string()), Ok("ab".to_string()));
        assert!(matches!(
            doc.resolve_id_prefix("a"),
            Err(AppError::AmbiguousId { matches: 3, .. })
        ));
        assert!(matches!(
            doc.resolve_id_prefix("zzz"),
            Err(AppError::MovieNotFound { .. })
        ));
        assert!(doc.resolve_id_prefix("").is_err());
    }

    #[test]
    fn test_duplicate_external_ids_reported() {
        let mut doc = LibraryDocument::empty();
        doc.movies.push(record("1", "tt1", false));
        doc.movies.push(record("2", "tt1", false));
        let errors = doc.validate().expect_err("duplicates should be reported");
        assert!(errors.iter().any(|e| e.contains("tt1")));
    }

    #[test]
    fn test_touch_keeps_created_at() {
        let mut doc = LibraryDocument::empty();
        doc.created_at = "2020-01-01T00:00:00.000Z".to_string();
        doc.updated_at = doc.created_at.clone();
        doc.touch();
        assert_eq!(doc.created_at, "2020-01-01T00:00:00.000Z");
        assert_ne!(doc.updated_at, doc.created_at);
    }
}
