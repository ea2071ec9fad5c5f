// FILE: crates/library/src/store.rs

use crate::error::{LibraryError, Result};
use crate::normalize::normalize_document;
use cinevault_core::{LibraryDocument, Timestamp};
use log::{debug, info, warn};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Folder, relative to the vault, that holds library files
pub const LIBRARY_FOLDER: &str = "cinevault-json";
/// File name used for the first library
pub const DEFAULT_FILE_NAME: &str = "cinevault.json";

const EXPORT_PREFIX: &str = "cinevault-export-";
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Identifies one library file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryHandle(PathBuf);

impl LibraryHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn exists(&self) -> bool {
        self.0.is_file()
    }
}

impl fmt::Display for LibraryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Reads and writes library files under a vault directory
#[derive(Debug, Clone)]
pub struct LibraryStore {
    vault: PathBuf,
}

impl LibraryStore {
    pub fn new(vault: impl Into<PathBuf>) -> Self {
        Self {
            vault: vault.into(),
        }
    }

    pub fn vault(&self) -> &Path {
        &self.vault
    }

    /// `<vault>/cinevault-json`
    pub fn folder(&self) -> PathBuf {
        self.vault.join(LIBRARY_FOLDER)
    }

    /// `<vault>/cinevault-json/cinevault.json`
    pub fn default_path(&self) -> PathBuf {
        self.folder().join(DEFAULT_FILE_NAME)
    }

    /// Resolves a user-supplied path; relative paths are taken from the vault
    pub fn handle_for(&self, path: impl AsRef<Path>) -> LibraryHandle {
        let path = path.as_ref();
        if path.is_absolute() {
            LibraryHandle::new(path)
        } else {
            LibraryHandle::new(self.vault.join(path))
        }
    }

    /// Inverse of [`handle_for`](Self::handle_for): vault-relative when the
    /// handle lies under the vault, else the handle's own path
    pub fn stored_path(&self, handle: &LibraryHandle) -> PathBuf {
        handle
            .path()
            .strip_prefix(&self.vault)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| handle.path().to_path_buf())
    }

    /// Creates a new, empty library file
    ///
    /// Uses `cinevault.json` unless it exists, then `cinevault-<millis>.json`.
    /// Never overwrites an existing file.
    pub fn create_file(&self) -> Result<LibraryHandle> {
        let folder = self.folder();
        fs::create_dir_all(&folder).map_err(|e| LibraryError::io(&folder, e))?;

        let content = serde_json::to_string_pretty(&LibraryDocument::empty())?;
        let stamp = Timestamp::now().as_millis();

        let candidates = std::iter::once(DEFAULT_FILE_NAME.to_string())
            .chain(std::iter::once(format!("cinevault-{}.json", stamp)))
            .chain((1..MAX_NAME_ATTEMPTS).map(|n| format!("cinevault-{}-{}.json", stamp, n)));

        let path = create_new_file(&folder, candidates, content.as_bytes())?;
        info!("Created library file {}", path.display());
        Ok(LibraryHandle::new(path))
    }

    /// Reads and normalizes a library file
    pub fn load(&self, handle: &LibraryHandle) -> Result<LibraryDocument> {
        let path = handle.path();
        let bytes = fs::read(path).map_err(|e| LibraryError::io(path, e))?;
        let raw = String::from_utf8(bytes)
            .map_err(|e| LibraryError::format(path, format!("not valid UTF-8: {}", e)))?;

        let value: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| LibraryError::format(path, format!("not valid JSON: {}", e)))?;

        let document =
            normalize_document(value).map_err(|e| LibraryError::format(path, e.to_string()))?;

        debug!("Loaded {} records from {}", document.len(), path.display());
        Ok(document)
    }

    /// Rewrites the whole file atomically
    ///
    /// Content goes to a temp file in the same directory that is then renamed
    /// over the target, so a failed write leaves the previous file in place.
    pub fn save(&self, handle: &LibraryHandle, document: &LibraryDocument) -> Result<()> {
        let path = handle.path();
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let content = serde_json::to_string_pretty(document)?;

        let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| LibraryError::io(dir, e))?;
        temp_file
            .write_all(content.as_bytes())
            .and_then(|_| temp_file.flush())
            .map_err(|e| LibraryError::io(temp_file.path(), e))?;
        temp_file
            .persist(path)
            .map_err(|e| LibraryError::io(path, e.error))?;

        debug!("Saved {} records to {}", document.len(), path.display());
        Ok(())
    }

    /// Copies a library file to `cinevault-export-<timestamp>.json` in the vault root
    pub fn export(&self, handle: &LibraryHandle) -> Result<PathBuf> {
        let source = handle.path();
        let content = fs::read(source).map_err(|e| LibraryError::io(source, e))?;

        let stamp = Timestamp::now().to_file_stamp();
        let candidates = std::iter::once(format!("{}{}.json", EXPORT_PREFIX, stamp)).chain(
            (1..MAX_NAME_ATTEMPTS).map(|n| format!("{}{}-{}.json", EXPORT_PREFIX, stamp, n)),
        );

        fs::create_dir_all(&self.vault).map_err(|e| LibraryError::io(&self.vault, e))?;
        let path = create_new_file(&self.vault, candidates, &content)?;
        info!("Exported {} to {}", source.display(), path.display());
        Ok(path)
    }

    /// Lists every `.json` file under the vault, sorted by path
    pub fn list_json_files(&self) -> Result<Vec<PathBuf>> {
        if !self.vault.is_dir() {
            return Err(LibraryError::io(
                &self.vault,
                std::io::Error::new(ErrorKind::NotFound, "vault directory does not exist"),
            ));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.vault).follow_links(false) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Error walking directory: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_file() && is_json(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Writes `content` to the first candidate name that does not exist yet
fn create_new_file(
    dir: &Path,
    candidates: impl IntoIterator<Item = String>,
    content: &[u8],
) -> Result<PathBuf> {
    for name in candidates {
        let path = dir.join(&name);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("{} exists, trying next name", path.display());
                continue;
            }
            Err(e) => return Err(LibraryError::io(&path, e)),
        };

        if let Err(e) = file.write_all(content).and_then(|_| file.flush()) {
            let _ = fs::remove_file(&path);
            return Err(LibraryError::io(&path, e));
        }
        return Ok(path);
    }

    Err(LibraryError::io(
        dir,
        std::io::Error::new(ErrorKind::AlreadyExists, "no free file name"),
    ))
}
