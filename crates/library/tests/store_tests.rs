// FILE: crates/library/tests/store_tests.rs
//! Integration tests for LibraryStore

use cinevault_core::{Classify, ErrorCategory, LibraryDocument, MovieRecord};
use cinevault_library::{LibraryError, LibraryStore, DEFAULT_FILE_NAME, LIBRARY_FOLDER};
use std::fs;
use tempfile::TempDir;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn setup() -> Result<(TempDir, LibraryStore)> {
    let temp_dir = TempDir::new()?;
    let store = LibraryStore::new(temp_dir.path());
    Ok((temp_dir, store))
}

#[test]
fn test_create_file_never_overwrites() -> Result<()> {
    let (_dir, store) = setup()?;

    let first = store.create_file()?;
    let mut doc = store.load(&first)?;
    doc.movies.push(MovieRecord {
        title: "Keep me".to_string(),
        ..MovieRecord::empty()
    });
    store.save(&first, &doc)?;

    let second = store.create_file()?;
    let third = store.create_file()?;

    assert_ne!(first, second);
    assert_ne!(second, third);
    assert_eq!(store.load(&first)?.movies[0].title, "Keep me");

    let name = second
        .path()
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    assert!(name.starts_with("cinevault-") && name.ends_with(".json"));
    assert_ne!(name, DEFAULT_FILE_NAME);

    Ok(())
}

#[test]
fn test_create_file_makes_folder() -> Result<()> {
    let (dir, store) = setup()?;
    assert!(!dir.path().join(LIBRARY_FOLDER).exists());

    store.create_file()?;
    assert!(dir.path().join(LIBRARY_FOLDER).is_dir());

    Ok(())
}

#[test]
fn test_created_file_is_pretty_printed() -> Result<()> {
    let (_dir, store) = setup()?;
    let handle = store.create_file()?;

    let raw = fs::read_to_string(handle.path())?;
    assert!(raw.contains("\n  \"schemaVersion\": 1"));
    assert!(raw.contains("\"movies\": []"));

    Ok(())
}

#[test]
fn test_load_back_fills_old_records() -> Result<()> {
    let (dir, store) = setup()?;
    let path = dir.path().join("old.json");
    fs::write(
        &path,
        r#"{"movies": [{"id": "m1", "imdbId": "tt1", "title": "Old", "year": 1985, "starRating": "4"}],
            "theme": "dark"}"#,
    )?;

    let handle = store.handle_for("old.json");
    let doc = store.load(&handle)?;

    let movie = &doc.movies[0];
    assert_eq!(movie.year, "1985");
    assert_eq!(movie.star_rating, 4);
    assert_eq!(movie.plot, "");
    assert!(!movie.watched);
    assert_eq!(doc.extra.get("theme"), Some(&serde_json::json!("dark")));

    Ok(())
}

#[test]
fn test_save_then_load_preserves_document() -> Result<()> {
    let (_dir, store) = setup()?;
    let handle = store.create_file()?;

    let mut doc = store.load(&handle)?;
    doc.owner = "me".to_string();
    doc.extra
        .insert("customKey".to_string(), serde_json::json!({"nested": [1, 2]}));
    let mut movie = MovieRecord::empty();
    movie.title = "Solaris".to_string();
    movie.star_rating = 5;
    movie
        .extra
        .insert("seenWith".to_string(), serde_json::json!("friends"));
    doc.movies.push(movie);

    store.save(&handle, &doc)?;
    assert_eq!(store.load(&handle)?, doc);

    Ok(())
}

#[test]
fn test_non_object_is_format_error() -> Result<()> {
    let (dir, store) = setup()?;
    for (name, content) in [
        ("a.json", r#"{"foo": 1}"#),
        ("b.json", "[1, 2, 3]"),
        ("c.json", "not json at all"),
        ("d.json", r#"{"movies": "none"}"#),
    ] {
        fs::write(dir.path().join(name), content)?;
        let err = store.load(&store.handle_for(name)).err();
        match err {
            Some(e @ LibraryError::Format { .. }) => {
                assert_eq!(e.category(), ErrorCategory::FormatError)
            }
            other => panic!("{}: expected format error, got {:?}", name, other),
        }
    }

    Ok(())
}

#[test]
fn test_invalid_utf8_is_format_error() -> Result<()> {
    let (dir, store) = setup()?;
    fs::write(dir.path().join("latin1.json"), [b'{', 0xff, 0xfe, b'}'])?;

    let err = store.load(&store.handle_for("latin1.json")).err();

    match err {
        Some(e @ LibraryError::Format { .. }) => {
            assert_eq!(e.category(), ErrorCategory::FormatError);
            assert!(e.to_string().contains("UTF-8"));
        }
        other => panic!("expected format error, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_missing_file_is_io_failure() -> Result<()> {
    let (_dir, store) = setup()?;
    let err = store.load(&store.handle_for("nope.json")).err();
    assert!(matches!(err, Some(LibraryError::Io { .. })));
    Ok(())
}

#[test]
fn test_save_into_missing_directory_fails_cleanly() -> Result<()> {
    let (dir, store) = setup()?;
    let handle = store.handle_for("gone/lib.json");

    assert!(store.save(&handle, &LibraryDocument::empty()).is_err());
    assert!(!dir.path().join("gone").exists());

    Ok(())
}

#[test]
fn test_export_copies_and_names_files() -> Result<()> {
    let (dir, store) = setup()?;
    let handle = store.create_file()?;
    let original = fs::read_to_string(handle.path())?;

    let first = store.export(&handle)?;
    let second = store.export(&handle)?;

    assert_eq!(first.parent(), Some(dir.path()));
    assert_ne!(first, second);
    assert_eq!(fs::read_to_string(&first)?, original);

    let name = first
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    assert!(name.starts_with("cinevault-export-"));
    assert!(name.ends_with(".json"));
    // cinevault-export-YYYY-MM-DDTHH-MM-SS.json
    assert_eq!(name.len(), "cinevault-export-".len() + 19 + ".json".len());
    assert!(!name.contains(':'));

    Ok(())
}

#[test]
fn test_list_json_files() -> Result<()> {
    let (dir, store) = setup()?;
    store.create_file()?;
    fs::create_dir_all(dir.path().join("notes"))?;
    fs::write(dir.path().join("notes").join("other.json"), "{}")?;
    fs::write(dir.path().join("notes").join("readme.md"), "# hi")?;

    let files = store.list_json_files()?;

    assert_eq!(files.len(), 2);
    assert!(files.contains(&store.default_path()));
    assert!(files.contains(&dir.path().join("notes").join("other.json")));

    Ok(())
}

#[test]
fn test_list_json_files_missing_vault() {
    let store = LibraryStore::new("/definitely/not/a/vault");
    assert!(store.list_json_files().is_err());
}
