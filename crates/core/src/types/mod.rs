//! Domain types for CineVault
//!
//! - `movie`: library entries and their third-party ratings
//! - `library`: the persisted document (header plus records)
//! - `search`: provider-neutral search hits and detail payloads
//! - `common`: timestamps and the validation trait

mod common;
mod library;
mod movie;
mod search;

pub use common::{Timestamp, Validator};
pub use library::{LibraryDocument, DEFAULT_LIBRARY_NAME, SCHEMA_VERSION};
pub use movie::{MovieId, MovieRecord, Rating, MAX_STAR_RATING};
pub use search::{MovieDetails, SearchHit};
