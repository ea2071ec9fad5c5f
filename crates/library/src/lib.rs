//! CineVault Library Management
//!
//! Orchestration layer over the record model, the metadata provider and the
//! settings port: reads and writes library files, imports titles and applies
//! user edits.

pub mod controller;
pub mod error;
pub mod normalize;
pub mod store;
pub mod view;

pub use controller::{ImportOutcome, LibraryController, MIN_QUERY_CHARS};
pub use error::{LibraryError, LibraryResult};
pub use normalize::{normalize_document, normalize_record, ShapeError};
pub use store::{LibraryHandle, LibraryStore, DEFAULT_FILE_NAME, LIBRARY_FOLDER};
pub use view::{toggled_star_rating, LibraryView, Tab, ViewMode};
