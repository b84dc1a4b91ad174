//! Content file store rooted at the notes directory.
//!
//! # Responsibility
//! - Own the `id -> path` mapping for note content files.
//! - Read/write/delete whole-file UTF-8 text blobs.
//!
//! # Invariants
//! - `path_for` is pure; the same id always maps to the same path.
//! - Writes replace atomically: temp file in the same directory, then rename.
//! - Deleting a missing file succeeds.

use crate::model::note::NoteId;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const CONTENT_EXTENSION: &str = "md";

pub type StoreResult<T> = Result<T, StoreError>;

/// File I/O error carrying the path it occurred on.
#[derive(Debug)]
pub struct StoreError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "content file operation failed at `{}`: {}",
            self.path.display(),
            self.source
        )
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

impl StoreError {
    fn at(path: &Path, source: std::io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Maps note ids to content files under one root directory.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    /// Creates the store, creating the root directory when absent.
    pub fn new(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|err| StoreError::at(&root, err))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic content path for a note id. No I/O.
    pub fn path_for(&self, id: NoteId) -> PathBuf {
        self.root.join(format!("{id}.{CONTENT_EXTENSION}"))
    }

    /// Atomically replaces the file at `path` with `content`.
    ///
    /// The new content is fully written to a sibling temp file before the
    /// rename, so readers never observe a partial write.
    pub fn write(&self, path: &Path, content: &str) -> StoreResult<()> {
        let tmp = path.with_extension(format!("{CONTENT_EXTENSION}.tmp"));
        fs::write(&tmp, content).map_err(|err| StoreError::at(&tmp, err))?;
        fs::rename(&tmp, path).map_err(|err| StoreError::at(path, err))
    }

    /// Reads the whole file; `Ok(None)` when it does not exist.
    pub fn read(&self, path: &Path) -> StoreResult<Option<String>> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::at(path, err)),
        }
    }

    /// Removes the file; missing files are treated as already deleted.
    pub fn delete(&self, path: &Path) -> StoreResult<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::at(path, err)),
        }
    }

    /// Lists all files currently in the content directory.
    ///
    /// Used by the orphan-cleanup pass.
    pub fn list_files(&self) -> StoreResult<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.root).map_err(|err| StoreError::at(&self.root, err))?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| StoreError::at(&self.root, err))?;
            let path = entry.path();
            if path.is_file() {
                files.push(path);
            }
        }
        Ok(files)
    }

    /// File size in bytes; `Ok(None)` when the file does not exist.
    pub fn file_size(&self, path: &Path) -> StoreResult<Option<u64>> {
        match fs::metadata(path) {
            Ok(metadata) => Ok(Some(metadata.len())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::at(path, err)),
        }
    }
}
