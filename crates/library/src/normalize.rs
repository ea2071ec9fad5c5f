// FILE: crates/library/src/normalize.rs
//! Lenient decoding of library files
//!
//! Files may come from older versions or be edited by hand. Every missing
//! field is back-filled from the empty instance, scalars are coerced to the
//! field's type, and keys this version does not know are kept as they are.
//! Normalizing an already-normalized document is a no-op.

use cinevault_core::{
    LibraryDocument, MovieId, MovieRecord, Timestamp, DEFAULT_LIBRARY_NAME, MAX_STAR_RATING,
    SCHEMA_VERSION,
};
use serde_json::{Map, Value};

/// Record keys whose value is a plain string
const STRING_FIELDS: &[&str] = &[
    "imdbId",
    "title",
    "year",
    "rated",
    "released",
    "runtime",
    "genre",
    "director",
    "writer",
    "actors",
    "plot",
    "language",
    "country",
    "awards",
    "poster",
    "posterLocal",
    "metascore",
    "imdbRating",
    "imdbVotes",
    "type",
    "dvd",
    "boxOffice",
    "production",
    "website",
    "totalSeasons",
    "tomatoURL",
    "tomatoMeter",
    "tomatoImage",
    "tomatoRating",
    "tomatoReviews",
    "tomatoFresh",
    "tomatoRotten",
    "tomatoConsensus",
    "tomatoUserMeter",
    "tomatoUserRating",
    "tomatoUserReviews",
    "notes",
];

/// Older spellings of the provider id key
const EXTERNAL_ID_ALIASES: &[&str] = &["externalId", "imdbID"];

/// Why a document could not be normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    NotAnObject,
    MissingMovies,
}

impl std::fmt::Display for ShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeError::NotAnObject => write!(f, "expected a JSON object"),
            ShapeError::MissingMovies => write!(f, "missing \"movies\" array"),
        }
    }
}

/// Normalizes a parsed library file
///
/// Fails only when the value is not an object or has no `movies` array.
/// Entries of `movies` that are not objects are dropped with a warning.
pub fn normalize_document(value: Value) -> Result<LibraryDocument, ShapeError> {
    let Value::Object(mut obj) = value else {
        return Err(ShapeError::NotAnObject);
    };

    let movies = match obj.remove("movies") {
        Some(Value::Array(items)) => items,
        _ => return Err(ShapeError::MissingMovies),
    };

    let movies = movies
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match item {
            Value::Object(record) => Some(normalize_record(record)),
            other => {
                log::warn!("Dropping movies[{}]: expected an object, got {}", index, other);
                None
            }
        })
        .collect();

    let schema_version = obj
        .remove("schemaVersion")
        .and_then(|v| as_u64(&v))
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(SCHEMA_VERSION);
    if schema_version != SCHEMA_VERSION {
        log::warn!(
            "Library schema version {} differs from supported version {}",
            schema_version,
            SCHEMA_VERSION
        );
    }

    let now = Timestamp::now().to_iso8601();
    let created_at = take_string(&mut obj, "createdAt").unwrap_or_else(|| now.clone());
    let updated_at = take_string(&mut obj, "updatedAt").unwrap_or(now);

    Ok(LibraryDocument {
        schema_version,
        created_at,
        updated_at,
        library_name: take_string(&mut obj, "libraryName")
            .unwrap_or_else(|| DEFAULT_LIBRARY_NAME.to_string()),
        owner: take_string(&mut obj, "owner").unwrap_or_default(),
        source: take_string(&mut obj, "source").unwrap_or_else(|| DEFAULT_LIBRARY_NAME.to_string()),
        movies,
        extra: obj,
    })
}

/// Normalizes one record object
pub fn normalize_record(mut obj: Map<String, Value>) -> MovieRecord {
    let mut record = MovieRecord::empty();

    match obj.remove("id").as_ref().and_then(scalar_string) {
        Some(id) if !id.is_empty() => record.id = MovieId::from_string(id),
        _ => log::debug!("Record without id, assigned {}", record.id),
    }

    if !obj.contains_key("imdbId") {
        if let Some(alias) = EXTERNAL_ID_ALIASES.iter().find_map(|k| obj.remove(*k)) {
            obj.insert("imdbId".to_string(), alias);
        }
    }

    let mut strings = Map::new();
    for key in STRING_FIELDS {
        if let Some(value) = obj.remove(*key) {
            strings.insert(key.to_string(), Value::String(coerce_string(key, &value)));
        }
    }

    if let Some(value) = obj.remove("starRating") {
        record.star_rating = coerce_star_rating(&value);
    }

    if let Some(value) = obj.remove("watched") {
        record.watched = coerce_bool(&value);
    }

    if let Some(value) = obj.remove("ratings") {
        strings.insert("ratings".to_string(), coerce_ratings(value));
    }

    // Every remaining value now has the type its field expects
    match serde_json::from_value::<MovieRecord>(Value::Object(strings)) {
        Ok(fields) => {
            record = MovieRecord {
                id: record.id,
                star_rating: record.star_rating,
                watched: record.watched,
                extra: Map::new(),
                ..fields
            };
        }
        Err(e) => log::warn!("Could not read fields of record {}: {}", record.id, e),
    }

    record.extra = obj;
    record
}

/// Falsy values (null, false, 0, "") become ""
fn coerce_string(key: &str, value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.as_f64() == Some(0.0) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) | Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => {
            log::debug!("Discarding structured value for \"{}\"", key);
            String::new()
        }
    }
}

/// Numbers are truncated and clamped to 0..=5; anything else is 0
fn coerce_star_rating(value: &Value) -> u8 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match raw {
        Some(v) if v.is_finite() => v.trunc().clamp(0.0, f64::from(MAX_STAR_RATING)) as u8,
        _ => 0,
    }
}

fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Keeps `{Source, Value}` entries, stringifying their parts
fn coerce_ratings(value: Value) -> Value {
    let Value::Array(items) = value else {
        return Value::Array(Vec::new());
    };

    let ratings = items
        .iter()
        .filter_map(Value::as_object)
        .map(|r| {
            let mut rating = Map::new();
            for key in ["Source", "Value"] {
                let text = r.get(key).and_then(scalar_string).unwrap_or_default();
                rating.insert(key.to_string(), Value::String(text));
            }
            Value::Object(rating)
        })
        .collect();

    Value::Array(ratings)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn take_string(obj: &mut Map<String, Value>, key: &str) -> Option<String> {
    obj.remove(key).as_ref().and_then(scalar_string)
}
