// FILE: src/traits.rs
// ============================================================================

use cinevault_core::{MovieDetails, SearchHit};

/// Metadata provider trait
///
/// Both lookups swallow their failures: callers get an empty list or `None`
/// and the reason goes to the log.
pub trait MetadataProvider: Send + Sync {
    /// Search titles matching a free-text query
    fn search(&self, query: &str) -> Vec<SearchHit>;

    /// Fetch the full record for one provider id
    fn fetch_details(&self, external_id: &str) -> Option<MovieDetails>;

    /// Get metadata about the source
    fn metadata(&self) -> SourceMetadata;

    /// Check if the source is usable (configured with credentials)
    fn is_available(&self) -> bool;
}

/// Source metadata
#[derive(Debug, Clone)]
pub struct SourceMetadata {
    pub name: String,
    pub description: String,
    pub base_url: String,
    pub requires_auth: bool,
}
