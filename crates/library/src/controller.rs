// FILE: crates/library/src/controller.rs

use crate::error::{LibraryError, Result};
use crate::store::{LibraryHandle, LibraryStore};
use cinevault_config::SettingsStore;
use cinevault_content_sources::{MetadataProvider, SourceError};
use cinevault_core::{
    AppError, LibraryDocument, MovieDetails, MovieId, MovieRecord, SearchHit, MAX_STAR_RATING,
};
use log::{debug, info, warn};
use std::fs;
use std::path::Path;

/// Queries shorter than this are not sent to the provider
pub const MIN_QUERY_CHARS: usize = 2;

const NOT_AVAILABLE: &str = "N/A";

/// Result of [`LibraryController::import_or_update`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// A new record was fetched and appended
    Added(MovieId),
    /// The title was already present; only its watched flag changed
    Updated(MovieId),
}

impl ImportOutcome {
    pub fn id(&self) -> &MovieId {
        match self {
            ImportOutcome::Added(id) | ImportOutcome::Updated(id) => id,
        }
    }
}

struct LinkedLibrary {
    handle: LibraryHandle,
    document: LibraryDocument,
}

/// Owns the linked library and applies every mutation to it
///
/// Each mutation is applied to a copy, saved, and only then made current, so
/// a failed save leaves both the file and the in-memory library unchanged.
pub struct LibraryController {
    store: LibraryStore,
    provider: Box<dyn MetadataProvider>,
    settings: Box<dyn SettingsStore>,
    linked: Option<LinkedLibrary>,
}

impl LibraryController {
    pub fn new(
        store: LibraryStore,
        provider: Box<dyn MetadataProvider>,
        settings: Box<dyn SettingsStore>,
    ) -> Self {
        Self {
            store,
            provider,
            settings,
            linked: None,
        }
    }

    pub fn store(&self) -> &LibraryStore {
        &self.store
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    pub fn provider_available(&self) -> bool {
        self.provider.is_available()
    }

    pub fn document(&self) -> Option<&LibraryDocument> {
        self.linked.as_ref().map(|l| &l.document)
    }

    pub fn handle(&self) -> Option<&LibraryHandle> {
        self.linked.as_ref().map(|l| &l.handle)
    }

    /// Re-opens the library remembered in settings
    ///
    /// Returns `Ok(false)` when nothing is remembered or the file is gone.
    pub fn restore(&mut self) -> Result<bool> {
        let settings = self.settings.load_settings()?;
        let Some(path) = settings.library.linked_path else {
            debug!("No linked library to restore");
            return Ok(false);
        };

        let handle = self.store.handle_for(&path);
        if !handle.exists() {
            warn!("Linked library {} no longer exists", handle);
            return Ok(false);
        }

        let document = self.store.load(&handle)?;
        info!("Restored library {} ({} records)", handle, document.len());
        self.linked = Some(LinkedLibrary { handle, document });
        Ok(true)
    }

    /// Creates a fresh library file and links it
    ///
    /// The new file is removed again if it cannot be linked.
    pub fn create_library(&mut self) -> Result<LibraryHandle> {
        let handle = self.store.create_file()?;
        if let Err(e) = self.link_handle(handle.clone()) {
            if let Err(cleanup) = fs::remove_file(handle.path()) {
                warn!("Could not remove unlinked library {}: {}", handle, cleanup);
            }
            return Err(e);
        }
        Ok(handle)
    }

    /// Loads `path` and makes it the current library
    ///
    /// Relative paths are taken from the vault. On failure the previously
    /// linked library stays current.
    pub fn link(&mut self, path: impl AsRef<Path>) -> Result<&LibraryDocument> {
        let handle = self.store.handle_for(path);
        self.link_handle(handle)
    }

    fn link_handle(&mut self, handle: LibraryHandle) -> Result<&LibraryDocument> {
        let document = self.store.load(&handle)?;

        let linked_path = self.store.stored_path(&handle);
        self.settings
            .update_settings(&mut |c| c.library.linked_path = Some(linked_path.clone()))?;

        info!("Linked library {} ({} records)", handle, document.len());
        let linked = self.linked.insert(LinkedLibrary { handle, document });
        Ok(&linked.document)
    }

    /// Forgets the current library; the file itself is kept
    pub fn unlink(&mut self) -> Result<()> {
        self.settings
            .update_settings(&mut |c| c.library.linked_path = None)?;
        if let Some(previous) = self.linked.take() {
            info!("Unlinked library {}", previous.handle);
        }
        Ok(())
    }

    /// Searches the provider; short queries return nothing
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Vec::new();
        }
        self.provider.search(query)
    }

    /// Adds a search hit to the library, or updates the watched flag if present
    pub fn import_or_update(&mut self, hit: &SearchHit, mark_watched: bool) -> Result<ImportOutcome> {
        let document = self.current()?;
        if hit.external_id.trim().is_empty() {
            return Err(AppError::MissingExternalId.into());
        }

        if let Some(existing) = document.find_by_external_id(&hit.external_id) {
            let id = existing.id.clone();
            self.mutate(|doc| {
                if let Some(movie) = doc.find_mut(&id) {
                    movie.watched = mark_watched;
                }
                Ok(())
            })?;
            info!("Updated watched flag of {} ({})", hit.title, hit.external_id);
            return Ok(ImportOutcome::Updated(id));
        }

        if !self.provider.is_available() {
            return Err(SourceError::MissingApiKey.into());
        }

        let details = self.provider.fetch_details(&hit.external_id).ok_or_else(|| {
            LibraryError::DetailsUnavailable {
                external_id: hit.external_id.clone(),
            }
        })?;

        let mut movie = record_from(hit, &details);
        movie.watched = mark_watched;
        let id = movie.id.clone();

        self.mutate(move |doc| {
            doc.movies.push(movie);
            Ok(())
        })?;

        info!("Added {} ({}) to the library", hit.title, hit.external_id);
        Ok(ImportOutcome::Added(id))
    }

    /// Sets the personal rating; 0 clears it
    pub fn set_star_rating(&mut self, id: &MovieId, value: i64) -> Result<()> {
        let stars = u8::try_from(value)
            .ok()
            .filter(|v| *v <= MAX_STAR_RATING)
            .ok_or(AppError::InvalidStarRating { value })?;

        self.mutate(|doc| {
            find_mut(doc, id)?.star_rating = stars;
            Ok(())
        })
    }

    /// Flips the watched flag and returns the new value
    pub fn toggle_watched(&mut self, id: &MovieId) -> Result<bool> {
        self.mutate(|doc| {
            let movie = find_mut(doc, id)?;
            movie.watched = !movie.watched;
            Ok(movie.watched)
        })
    }

    /// Removes a record; returns `false` (and writes nothing) if it was not there
    pub fn remove(&mut self, id: &MovieId) -> Result<bool> {
        if self.current()?.find(id).is_none() {
            debug!("Remove of unknown id {} ignored", id);
            return Ok(false);
        }

        self.mutate(|doc| {
            doc.movies.retain(|m| &m.id != id);
            Ok(())
        })?;
        Ok(true)
    }

    /// Copies the linked library into the vault root
    pub fn export(&self) -> Result<std::path::PathBuf> {
        let handle = self.handle().ok_or(LibraryError::NotLinked)?;
        self.store.export(handle)
    }

    /// Resolves a full id or unique id prefix in the current library
    pub fn resolve_id(&self, prefix: &str) -> Result<MovieId> {
        Ok(self.current()?.resolve_id_prefix(prefix)?)
    }

    fn current(&self) -> Result<&LibraryDocument> {
        self.document().ok_or(LibraryError::NotLinked)
    }

    fn mutate<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut LibraryDocument) -> Result<T>,
    {
        let linked = self.linked.as_mut().ok_or(LibraryError::NotLinked)?;

        let mut draft = linked.document.clone();
        let out = f(&mut draft)?;
        draft.touch();

        self.store.save(&linked.handle, &draft)?;
        linked.document = draft;
        Ok(out)
    }
}

fn find_mut<'a>(doc: &'a mut LibraryDocument, id: &MovieId) -> Result<&'a mut MovieRecord> {
    doc.find_mut(id).ok_or_else(|| {
        AppError::MovieNotFound {
            id: id.to_string(),
        }
        .into()
    })
}

/// Provider value if non-empty, else `fallback`
fn pick(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Builds a new record from details, falling back to the search hit
fn record_from(hit: &SearchHit, details: &MovieDetails) -> MovieRecord {
    let poster = if details.poster.is_empty() || details.poster == NOT_AVAILABLE {
        hit.poster.clone()
    } else {
        details.poster.clone()
    };

    MovieRecord {
        external_id: pick(&details.external_id, &hit.external_id),
        title: pick(&details.title, &hit.title),
        year: pick(&details.year, &hit.year),
        rated: details.rated.clone(),
        released: details.released.clone(),
        runtime: details.runtime.clone(),
        genre: details.genre.clone(),
        director: details.director.clone(),
        writer: details.writer.clone(),
        actors: details.actors.clone(),
        plot: pick(&details.plot, &hit.plot),
        language: details.language.clone(),
        country: details.country.clone(),
        awards: details.awards.clone(),
        poster,
        ratings: details.ratings.clone(),
        metascore: details.metascore.clone(),
        imdb_rating: details.imdb_rating.clone(),
        imdb_votes: details.imdb_votes.clone(),
        kind: pick(&details.kind, &hit.kind),
        dvd: details.dvd.clone(),
        box_office: details.box_office.clone(),
        production: details.production.clone(),
        website: details.website.clone(),
        total_seasons: details.total_seasons.clone(),
        tomato_url: details.tomato_url.clone(),
        tomato_meter: details.tomato_meter.clone(),
        tomato_image: details.tomato_image.clone(),
        tomato_rating: details.tomato_rating.clone(),
        tomato_reviews: details.tomato_reviews.clone(),
        tomato_fresh: details.tomato_fresh.clone(),
        tomato_rotten: details.tomato_rotten.clone(),
        tomato_consensus: details.tomato_consensus.clone(),
        tomato_user_meter: details.tomato_user_meter.clone(),
        tomato_user_rating: details.tomato_user_rating.clone(),
        tomato_user_reviews: details.tomato_user_reviews.clone(),
        ..MovieRecord::empty()
    }
}
