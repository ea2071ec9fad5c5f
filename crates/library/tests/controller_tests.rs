// FILE: crates/library/tests/controller_tests.rs
//! Integration tests for LibraryController over a scripted OMDb transport

use cinevault_config::{Config, ConfigResult, MemorySettings, SettingsStore};
use cinevault_content_sources::{
    HttpResponse, HttpTransport, OmdbOptions, OmdbSource, SourceError, SourceResult,
};
use cinevault_core::{AppError, Classify, ErrorCategory, MovieId, MovieRecord, SearchHit};
use cinevault_library::{ImportOutcome, LibraryController, LibraryError, LibraryStore};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::{Builder, TempDir};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const DETAIL_BODY: &str = r#"{
    "Title": "Stalker", "Year": "1979", "Rated": "Not Rated", "Released": "17 Apr 1980",
    "Runtime": "162 min", "Genre": "Drama, Sci-Fi", "Director": "Andrei Tarkovsky",
    "Plot": "A guide leads two men through the Zone.", "Poster": "N/A",
    "Ratings": [{"Source": "Internet Movie Database", "Value": "8.0/10"}],
    "imdbRating": "8.0", "imdbID": "tt0079944", "Type": "movie", "Response": "True"
}"#;

const SOLARIS_BODY: &str = r#"{
    "Title": "Solaris", "Year": "1972", "Director": "Andrei Tarkovsky",
    "imdbID": "tt0069293", "Type": "movie", "Response": "True"
}"#;

#[derive(Clone, Default)]
struct ScriptedTransport {
    replies: Arc<Mutex<VecDeque<SourceResult<HttpResponse>>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    fn with_replies(replies: Vec<SourceResult<HttpResponse>>) -> Self {
        let transport = Self::default();
        if let Ok(mut queue) = transport.replies.lock() {
            queue.extend(replies);
        }
        transport
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HttpTransport for ScriptedTransport {
    fn get(&self, _url: &str, _query: &[(&str, &str)]) -> SourceResult<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or_else(|| Err(SourceError::NetworkError("no scripted reply".into())))
    }
}

/// Settings shared between controllers so a restart can be simulated
#[derive(Clone, Default)]
struct SharedSettings(Rc<RefCell<Config>>);

impl SettingsStore for SharedSettings {
    fn load_settings(&self) -> ConfigResult<Config> {
        Ok(self.0.borrow().clone())
    }

    fn save_settings(&self, config: &Config) -> ConfigResult<()> {
        *self.0.borrow_mut() = config.clone();
        Ok(())
    }
}

fn ok(body: &str) -> SourceResult<HttpResponse> {
    Ok(HttpResponse::new(200, body))
}

fn down() -> SourceResult<HttpResponse> {
    Err(SourceError::NetworkError("connection reset".into()))
}

fn controller(
    vault: &TempDir,
    api_key: &str,
    transport: &ScriptedTransport,
    settings: Box<dyn SettingsStore>,
) -> LibraryController {
    controller_at(vault.path(), api_key, transport, settings)
}

fn controller_at(
    vault: &Path,
    api_key: &str,
    transport: &ScriptedTransport,
    settings: Box<dyn SettingsStore>,
) -> LibraryController {
    let source = OmdbSource::with_transport(OmdbOptions::new(api_key), Box::new(transport.clone()));
    LibraryController::new(LibraryStore::new(vault), Box::new(source), settings)
}

fn solaris() -> SearchHit {
    SearchHit {
        external_id: "tt0069293".to_string(),
        title: "Solaris".to_string(),
        year: "1972".to_string(),
        kind: "movie".to_string(),
        poster: String::new(),
        plot: String::new(),
    }
}

fn titles(ctl: &LibraryController) -> Result<Vec<String>> {
    let doc = ctl.document().ok_or("not linked")?;
    Ok(doc.movies.iter().map(|m| m.title.clone()).collect())
}

fn linked(transport: &ScriptedTransport) -> Result<(TempDir, LibraryController)> {
    let vault = TempDir::new()?;
    let mut ctl = controller(
        &vault,
        "test-key",
        transport,
        Box::new(MemorySettings::new(Config::default())),
    );
    ctl.create_library()?;
    Ok((vault, ctl))
}

fn stalker() -> SearchHit {
    SearchHit {
        external_id: "tt0079944".to_string(),
        title: "Stalker".to_string(),
        year: "1979".to_string(),
        kind: "movie".to_string(),
        poster: "https://img/stalker.jpg".to_string(),
        plot: String::new(),
    }
}

fn file_contents(ctl: &LibraryController) -> Result<String> {
    let handle = ctl.handle().ok_or("not linked")?;
    Ok(fs::read_to_string(handle.path())?)
}

#[test]
fn test_short_query_makes_no_request() -> Result<()> {
    let transport = ScriptedTransport::default();
    let (_vault, ctl) = linked(&transport)?;

    assert!(ctl.search("").is_empty());
    assert!(ctl.search(" a ").is_empty());
    assert_eq!(transport.calls(), 0);

    Ok(())
}

#[test]
fn test_search_without_key_makes_no_request() -> Result<()> {
    let transport = ScriptedTransport::default();
    let vault = TempDir::new()?;
    let ctl = controller(
        &vault,
        "",
        &transport,
        Box::new(MemorySettings::new(Config::default())),
    );

    assert!(!ctl.provider_available());
    assert!(ctl.search("stalker").is_empty());
    assert_eq!(transport.calls(), 0);

    Ok(())
}

#[test]
fn test_search_returns_hits() -> Result<()> {
    let transport = ScriptedTransport::with_replies(vec![ok(r#"{
        "Search": [{"Title": "Stalker", "Year": "1979", "imdbID": "tt0079944",
                    "Type": "movie", "Poster": "N/A"}],
        "Response": "True"
    }"#)]);
    let (_vault, ctl) = linked(&transport)?;

    let hits = ctl.search("stalker");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].external_id, "tt0079944");
    assert_eq!(transport.calls(), 1);

    Ok(())
}

#[test]
fn test_import_retries_then_adds() -> Result<()> {
    let transport = ScriptedTransport::with_replies(vec![down(), down(), ok(DETAIL_BODY)]);
    let (_vault, mut ctl) = linked(&transport)?;

    let outcome = ctl.import_or_update(&stalker(), false)?;

    assert!(matches!(outcome, ImportOutcome::Added(_)));
    assert_eq!(transport.calls(), 3);

    let doc = ctl.document().ok_or("not linked")?;
    assert_eq!(doc.len(), 1);
    let movie = &doc.movies[0];
    assert_eq!(&movie.id, outcome.id());
    assert_eq!(movie.director, "Andrei Tarkovsky");
    assert_eq!(movie.poster, "https://img/stalker.jpg");
    assert_eq!(movie.star_rating, 0);
    assert!(!movie.watched);

    let reloaded = ctl.store().load(ctl.handle().ok_or("not linked")?)?;
    assert_eq!(reloaded.movies, doc.movies);

    Ok(())
}

#[test]
fn test_import_marks_watched() -> Result<()> {
    let transport = ScriptedTransport::with_replies(vec![ok(DETAIL_BODY)]);
    let (_vault, mut ctl) = linked(&transport)?;

    ctl.import_or_update(&stalker(), true)?;

    let doc = ctl.document().ok_or("not linked")?;
    assert!(doc.movies[0].watched);

    Ok(())
}

#[test]
fn test_import_gives_up_after_three_failures() -> Result<()> {
    let transport = ScriptedTransport::with_replies(vec![down(), down(), down()]);
    let (_vault, mut ctl) = linked(&transport)?;
    let before = file_contents(&ctl)?;

    let err = ctl.import_or_update(&stalker(), false).err();

    match err {
        Some(e @ LibraryError::DetailsUnavailable { .. }) => {
            assert_eq!(e.category(), ErrorCategory::ProviderRejection)
        }
        other => panic!("expected details unavailable, got {:?}", other),
    }
    assert_eq!(transport.calls(), 3);
    assert!(ctl.document().ok_or("not linked")?.is_empty());
    assert_eq!(file_contents(&ctl)?, before);

    Ok(())
}

#[test]
fn test_rejection_is_not_retried() -> Result<()> {
    let transport = ScriptedTransport::with_replies(vec![ok(
        r#"{"Response": "False", "Error": "Incorrect IMDb ID."}"#,
    )]);
    let (_vault, mut ctl) = linked(&transport)?;

    let result = ctl.import_or_update(&SearchHit::from_external_id("tt-bogus"), false);

    assert!(matches!(
        result,
        Err(LibraryError::DetailsUnavailable { .. })
    ));
    assert_eq!(transport.calls(), 1);

    Ok(())
}

#[test]
fn test_import_without_key_is_configuration_gap() -> Result<()> {
    let transport = ScriptedTransport::default();
    let vault = TempDir::new()?;
    let mut ctl = controller(
        &vault,
        "  ",
        &transport,
        Box::new(MemorySettings::new(Config::default())),
    );
    ctl.create_library()?;

    let err = ctl.import_or_update(&stalker(), false).err();

    match err {
        Some(e @ LibraryError::Source(SourceError::MissingApiKey)) => {
            assert_eq!(e.category(), ErrorCategory::ConfigurationGap)
        }
        other => panic!("expected missing key, got {:?}", other),
    }
    assert_eq!(transport.calls(), 0);

    Ok(())
}

#[test]
fn test_reimport_only_updates_watched() -> Result<()> {
    let transport = ScriptedTransport::with_replies(vec![ok(DETAIL_BODY)]);
    let (_vault, mut ctl) = linked(&transport)?;

    let added = ctl.import_or_update(&stalker(), false)?;
    ctl.set_star_rating(added.id(), 4)?;

    let again = ctl.import_or_update(&stalker(), true)?;

    assert_eq!(again, ImportOutcome::Updated(added.id().clone()));
    assert_eq!(transport.calls(), 1);

    let doc = ctl.document().ok_or("not linked")?;
    assert_eq!(doc.len(), 1);
    assert!(doc.movies[0].watched);
    assert_eq!(doc.movies[0].star_rating, 4);

    Ok(())
}

#[test]
fn test_star_rating_bounds() -> Result<()> {
    let transport = ScriptedTransport::with_replies(vec![ok(DETAIL_BODY)]);
    let (_vault, mut ctl) = linked(&transport)?;
    let id = ctl.import_or_update(&stalker(), false)?.id().clone();

    for bad in [-1, 6, 100] {
        let err = ctl.set_star_rating(&id, bad).err();
        assert!(matches!(
            err,
            Some(LibraryError::Model(AppError::InvalidStarRating { .. }))
        ));
    }

    ctl.set_star_rating(&id, 5)?;
    ctl.set_star_rating(&id, 0)?;
    let movie = &ctl.document().ok_or("not linked")?.movies[0];
    assert_eq!(movie.star_rating, 0);
    assert!(!movie.is_rated());

    let missing = ctl.set_star_rating(&MovieId::from_string("nope"), 3).err();
    assert!(matches!(
        missing,
        Some(LibraryError::Model(AppError::MovieNotFound { .. }))
    ));

    Ok(())
}

#[test]
fn test_toggle_watched_persists() -> Result<()> {
    let transport = ScriptedTransport::with_replies(vec![ok(DETAIL_BODY)]);
    let (_vault, mut ctl) = linked(&transport)?;
    let id = ctl.import_or_update(&stalker(), false)?.id().clone();

    assert!(ctl.toggle_watched(&id)?);
    let on_disk = ctl.store().load(ctl.handle().ok_or("not linked")?)?;
    assert!(on_disk.movies[0].watched);

    assert!(!ctl.toggle_watched(&id)?);

    Ok(())
}

#[test]
fn test_remove() -> Result<()> {
    let transport = ScriptedTransport::with_replies(vec![ok(DETAIL_BODY)]);
    let (_vault, mut ctl) = linked(&transport)?;
    let id = ctl.import_or_update(&stalker(), false)?.id().clone();

    let before_unknown = file_contents(&ctl)?;
    assert!(!ctl.remove(&MovieId::from_string("unknown"))?);
    assert_eq!(file_contents(&ctl)?, before_unknown);

    assert!(ctl.remove(&id)?);
    assert!(ctl.document().ok_or("not linked")?.is_empty());
    let on_disk = ctl.store().load(ctl.handle().ok_or("not linked")?)?;
    assert!(on_disk.is_empty());

    Ok(())
}

#[test]
fn test_remove_keeps_other_records_in_order() -> Result<()> {
    let transport = ScriptedTransport::with_replies(vec![ok(DETAIL_BODY), ok(SOLARIS_BODY)]);
    let (_vault, mut ctl) = linked(&transport)?;
    let stalker_id = ctl.import_or_update(&stalker(), false)?.id().clone();
    let solaris_id = ctl.import_or_update(&solaris(), true)?.id().clone();
    assert_eq!(titles(&ctl)?, ["Stalker", "Solaris"]);

    assert!(ctl.remove(&stalker_id)?);

    assert_eq!(titles(&ctl)?, ["Solaris"]);
    let on_disk = ctl.store().load(ctl.handle().ok_or("not linked")?)?;
    assert_eq!(on_disk.movies.len(), 1);
    assert_eq!(on_disk.movies[0].id, solaris_id);
    assert!(on_disk.movies[0].watched);
    assert!(!file_contents(&ctl)?.contains("tt0079944"));

    Ok(())
}

#[test]
fn test_failed_save_changes_nothing() -> Result<()> {
    let transport = ScriptedTransport::with_replies(vec![ok(DETAIL_BODY)]);
    let (_vault, mut ctl) = linked(&transport)?;
    let id = ctl.import_or_update(&stalker(), false)?.id().clone();

    let before_doc = ctl.document().cloned().ok_or("not linked")?;
    let before_file = file_contents(&ctl)?;
    let folder = ctl
        .handle()
        .and_then(|h| h.path().parent())
        .map(Path::to_path_buf)
        .ok_or("no library folder")?;

    // Swap the folder for a plain file so the temp file cannot be created
    let parked = folder.with_extension("parked");
    fs::rename(&folder, &parked)?;
    fs::write(&folder, "not a directory")?;

    let toggled = ctl.toggle_watched(&id).err();
    let rated = ctl.set_star_rating(&id, 4).err();
    let removed = ctl.remove(&id).err();

    fs::remove_file(&folder)?;
    fs::rename(&parked, &folder)?;

    for err in [toggled, rated, removed] {
        match err {
            Some(e @ LibraryError::Io { .. }) => {
                assert_eq!(e.category(), ErrorCategory::IoFailure)
            }
            other => panic!("expected I/O failure, got {:?}", other),
        }
    }
    assert_eq!(ctl.document(), Some(&before_doc));
    assert_eq!(file_contents(&ctl)?, before_file);

    Ok(())
}

#[test]
fn test_hit_without_external_id_is_rejected() -> Result<()> {
    let transport = ScriptedTransport::default();
    let vault = TempDir::new()?;
    let store = LibraryStore::new(vault.path());
    let handle = store.create_file()?;
    let mut doc = store.load(&handle)?;
    doc.movies.push(MovieRecord {
        title: "Home movie".to_string(),
        ..MovieRecord::empty()
    });
    store.save(&handle, &doc)?;

    let mut ctl = controller(
        &vault,
        "k",
        &transport,
        Box::new(MemorySettings::new(Config::default())),
    );
    ctl.link(handle.path())?;
    let before = file_contents(&ctl)?;

    for id in ["", "   "] {
        let hit = SearchHit {
            title: "Ghost".to_string(),
            ..SearchHit::from_external_id(id)
        };
        let err = ctl.import_or_update(&hit, true).err();
        match err {
            Some(e @ LibraryError::Model(AppError::MissingExternalId)) => {
                assert_eq!(e.category(), ErrorCategory::InvalidInput)
            }
            other => panic!("expected missing id, got {:?}", other),
        }
    }

    let movies = &ctl.document().ok_or("not linked")?.movies;
    assert_eq!(movies.len(), 1);
    assert!(!movies[0].watched);
    assert_eq!(file_contents(&ctl)?, before);
    assert_eq!(transport.calls(), 0);

    Ok(())
}

#[test]
fn test_resolve_id_prefix() -> Result<()> {
    let transport = ScriptedTransport::with_replies(vec![ok(DETAIL_BODY)]);
    let (_vault, mut ctl) = linked(&transport)?;
    let id = ctl.import_or_update(&stalker(), false)?.id().clone();

    let prefix: String = id.as_str().chars().take(6).collect();
    assert_eq!(ctl.resolve_id(&prefix)?, id);

    Ok(())
}

#[test]
fn test_failed_link_keeps_previous_library() -> Result<()> {
    let transport = ScriptedTransport::default();
    let vault = TempDir::new()?;
    let settings = SharedSettings::default();
    let mut ctl = controller(&vault, "k", &transport, Box::new(settings.clone()));

    let handle = ctl.create_library()?;
    fs::write(vault.path().join("broken.json"), r#"{"foo": 1}"#)?;

    let err = ctl.link("broken.json").err();

    match err {
        Some(e @ LibraryError::Format { .. }) => {
            assert_eq!(e.category(), ErrorCategory::FormatError)
        }
        other => panic!("expected format error, got {:?}", other),
    }
    assert_eq!(ctl.handle(), Some(&handle));
    assert!(ctl.document().is_some());
    assert_eq!(
        settings.load_settings()?.library.linked_path,
        Some(PathBuf::from("cinevault-json/cinevault.json"))
    );

    Ok(())
}

#[test]
fn test_create_library_persists_and_restores() -> Result<()> {
    let transport = ScriptedTransport::default();
    let vault = TempDir::new()?;
    let settings = SharedSettings::default();

    let handle = {
        let mut ctl = controller(&vault, "k", &transport, Box::new(settings.clone()));
        assert!(!ctl.restore()?);
        ctl.create_library()?
    };
    assert_eq!(
        settings.load_settings()?.library.linked_path,
        Some(PathBuf::from("cinevault-json/cinevault.json"))
    );

    let mut restarted = controller(&vault, "k", &transport, Box::new(settings.clone()));
    assert!(restarted.restore()?);
    assert_eq!(restarted.handle(), Some(&handle));

    Ok(())
}

#[test]
fn test_relative_vault_create_link_restore() -> Result<()> {
    let transport = ScriptedTransport::default();
    let cwd = std::env::current_dir()?;
    let dir = Builder::new().prefix("rel-vault-").tempdir_in(&cwd)?;
    let vault = dir.path().strip_prefix(&cwd)?.to_path_buf();
    assert!(vault.is_relative());
    let settings = SharedSettings::default();

    let handle = {
        let mut ctl = controller_at(&vault, "k", &transport, Box::new(settings.clone()));
        let handle = ctl.create_library()?;
        assert!(handle.exists());
        assert_eq!(handle.path(), vault.join("cinevault-json/cinevault.json"));
        handle
    };
    assert_eq!(
        settings.load_settings()?.library.linked_path,
        Some(PathBuf::from("cinevault-json/cinevault.json"))
    );

    let mut restarted = controller_at(&vault, "k", &transport, Box::new(settings.clone()));
    assert!(restarted.restore()?);
    assert_eq!(restarted.handle(), Some(&handle));

    restarted.unlink()?;
    restarted.link("cinevault-json/cinevault.json")?;
    assert_eq!(restarted.handle(), Some(&handle));
    assert_eq!(restarted.store().list_json_files()?.len(), 1);

    Ok(())
}

#[test]
fn test_link_outside_vault_stores_absolute_path() -> Result<()> {
    let transport = ScriptedTransport::default();
    let vault = TempDir::new()?;
    let elsewhere = TempDir::new()?;
    let outside = LibraryStore::new(elsewhere.path()).create_file()?;
    let settings = SharedSettings::default();

    let mut ctl = controller(&vault, "k", &transport, Box::new(settings.clone()));
    ctl.link(outside.path())?;

    assert_eq!(
        settings.load_settings()?.library.linked_path,
        Some(outside.path().to_path_buf())
    );
    let mut restarted = controller(&vault, "k", &transport, Box::new(settings));
    assert!(restarted.restore()?);
    assert_eq!(restarted.handle(), Some(&outside));

    Ok(())
}

#[test]
fn test_restore_with_missing_file() -> Result<()> {
    let transport = ScriptedTransport::default();
    let vault = TempDir::new()?;
    let settings = SharedSettings::default();
    settings.update_settings(&mut |c| {
        c.library.linked_path = Some(vault.path().join("gone.json"))
    })?;

    let mut ctl = controller(&vault, "k", &transport, Box::new(settings));

    assert!(!ctl.restore()?);
    assert!(ctl.document().is_none());

    Ok(())
}

#[test]
fn test_unlink_clears_setting() -> Result<()> {
    let transport = ScriptedTransport::default();
    let (_vault, mut ctl) = linked(&transport)?;

    ctl.unlink()?;

    assert!(ctl.document().is_none());
    assert_eq!(ctl.settings().load_settings()?.library.linked_path, None);

    Ok(())
}

#[test]
fn test_operations_require_linked_library() -> Result<()> {
    let transport = ScriptedTransport::default();
    let vault = TempDir::new()?;
    let mut ctl = controller(
        &vault,
        "k",
        &transport,
        Box::new(MemorySettings::new(Config::default())),
    );
    let id = MovieId::from_string("x");

    assert!(matches!(
        ctl.import_or_update(&stalker(), false),
        Err(LibraryError::NotLinked)
    ));
    assert!(matches!(ctl.set_star_rating(&id, 3), Err(LibraryError::NotLinked)));
    assert!(matches!(ctl.toggle_watched(&id), Err(LibraryError::NotLinked)));
    assert!(matches!(ctl.remove(&id), Err(LibraryError::NotLinked)));
    assert!(matches!(ctl.export(), Err(LibraryError::NotLinked)));
    assert_eq!(transport.calls(), 0);

    let err = LibraryError::NotLinked;
    assert_eq!(err.category(), ErrorCategory::ConfigurationGap);

    Ok(())
}

#[test]
fn test_export_copies_linked_file() -> Result<()> {
    let transport = ScriptedTransport::with_replies(vec![ok(DETAIL_BODY)]);
    let (vault, mut ctl) = linked(&transport)?;
    ctl.import_or_update(&stalker(), false)?;

    let exported = ctl.export()?;

    assert_eq!(exported.parent(), Some(vault.path()));
    assert_eq!(fs::read_to_string(&exported)?, file_contents(&ctl)?);

    Ok(())
}
