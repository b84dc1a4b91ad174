//! Note directory: in-memory cache and façade over both stores.
//!
//! # Responsibility
//! - Keep the record store, content store and in-memory list consistent.
//! - Expose search, date grouping, orphan cleanup and storage statistics.
//! - Notify subscribers after every successful mutation.
//!
//! # Invariants
//! - The in-memory list is always sorted by start time, descending.
//! - A note's file path is assigned once, on first save, and never changes.
//! - Cross-store writes are not transactional: a failed record write after a
//!   successful file write triggers a best-effort delete of the new file, and
//!   a failed file delete after a record delete is logged and ignored.

use crate::content::store::{ContentStore, StoreError};
use crate::content::summary::summarize;
use crate::model::note::{Note, NoteContent, NoteDraft, NoteRecord};
use crate::repo::note_repo::{NoteRepository, RepoError};
use log::{info, warn};
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Façade error combining both storage layers.
#[derive(Debug)]
pub enum DirectoryError {
    /// Record-store failure.
    Repo(RepoError),
    /// Content-file failure.
    Store(StoreError),
    /// Write succeeded but the read-back did not find the row.
    Inconsistent(&'static str),
}

impl Display for DirectoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Inconsistent(details) => write!(f, "inconsistent directory state: {details}"),
        }
    }
}

impl Error for DirectoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Inconsistent(_) => None,
        }
    }
}

impl From<RepoError> for DirectoryError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<StoreError> for DirectoryError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// One calendar day of notes, newest note first.
#[derive(Debug, Clone, PartialEq)]
pub struct DateGroup {
    /// UTC day key, `YYYY-MM-DD`.
    pub day: String,
    pub notes: Vec<Note>,
}

/// Aggregate storage counters for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageStats {
    pub note_count: usize,
    pub total_file_size: u64,
}

/// Callback invoked with the new version after each successful mutation.
pub type ChangeListener = Box<dyn FnMut(u64) + Send>;

/// The single mutable collection presentation layers observe.
///
/// Constructed once at process start and passed by reference; there is no
/// global instance. Not internally synchronized: the owner decides thread
/// placement.
pub struct NoteDirectory<R: NoteRepository> {
    repo: R,
    files: ContentStore,
    notes: Vec<Note>,
    version: u64,
    listeners: Vec<ChangeListener>,
}

impl<R: NoteRepository> NoteDirectory<R> {
    pub fn new(repo: R, files: ContentStore) -> Self {
        Self {
            repo,
            files,
            notes: Vec::new(),
            version: 0,
            listeners: Vec::new(),
        }
    }

    /// Current snapshot of the in-memory list, newest first.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn files(&self) -> &ContentStore {
        &self.files
    }

    /// Monotonic change counter; bumped after every successful mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Registers a change listener. Listeners observe every version bump.
    pub fn subscribe(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }

    /// Replaces the whole in-memory list from the record store.
    ///
    /// Content stays unloaded; safe to call repeatedly.
    pub fn load_all(&mut self) -> DirectoryResult<()> {
        let records = self.repo.get_all()?;
        self.notes = records.into_iter().map(Note::from_record).collect();
        sort_newest_first(&mut self.notes);
        info!(
            "event=notes_load module=directory status=ok count={}",
            self.notes.len()
        );
        self.notify_changed();
        Ok(())
    }

    /// Persists a new note: content file first, then the record.
    ///
    /// When the record write fails the just-written file is deleted so no
    /// orphaned blob is left behind. This compensating cleanup is best-effort
    /// only; there is no transactional guarantee across the two stores.
    pub fn save(&mut self, draft: NoteDraft, content: &str) -> DirectoryResult<Note> {
        let id = Uuid::new_v4();
        let path = self.files.path_for(id);
        self.files.write(&path, content)?;

        let record = NoteRecord {
            id,
            emoji: draft.emoji,
            title: draft.title,
            summary: summarize(content),
            file_path: path.to_string_lossy().into_owned(),
            start_time: draft.start_time,
            end_time: draft.end_time,
            created_at: 0.0,
            updated_at: 0.0,
        };

        if let Err(err) = self.repo.insert(&record) {
            warn!(
                "event=note_save module=directory status=error id={id} error={err} rollback=delete_file"
            );
            if let Err(cleanup_err) = self.files.delete(&path) {
                warn!(
                    "event=note_save_rollback module=directory status=error id={id} error={cleanup_err}"
                );
            }
            return Err(err.into());
        }

        let record = self
            .repo
            .get_one(id)?
            .ok_or(DirectoryError::Inconsistent("saved note not found in read-back"))?;
        let note = Note {
            record,
            content: NoteContent::Loaded(content.to_string()),
        };

        self.notes.push(note.clone());
        sort_newest_first(&mut self.notes);
        info!("event=note_save module=directory status=ok id={id}");
        self.notify_changed();
        Ok(note)
    }

    /// Updates an existing note, optionally rewriting its content file.
    pub fn update(&mut self, note: &Note, new_content: Option<&str>) -> DirectoryResult<Note> {
        let mut record = note.record.clone();
        let mut content = note.content.clone();

        if let Some(text) = new_content {
            self.files.write(Path::new(&record.file_path), text)?;
            record.summary = summarize(text);
            content = NoteContent::Loaded(text.to_string());
        }

        self.repo.update(&record)?;
        let record = self
            .repo
            .get_one(record.id)?
            .ok_or(DirectoryError::Inconsistent("updated note not found in read-back"))?;
        let updated = Note { record, content };

        if let Some(slot) = self.notes.iter_mut().find(|n| n.id() == updated.id()) {
            *slot = updated.clone();
        }
        sort_newest_first(&mut self.notes);
        info!(
            "event=note_update module=directory status=ok id={}",
            updated.id()
        );
        self.notify_changed();
        Ok(updated)
    }

    /// Deletes the record, then best-effort deletes the content file.
    ///
    /// A failed file delete does not roll back the record deletion; the file
    /// becomes an orphan picked up by [`NoteDirectory::cleanup_orphans`].
    pub fn delete(&mut self, note: &Note) -> DirectoryResult<()> {
        let id = note.id();
        self.repo.delete(id)?;

        if let Err(err) = self.files.delete(Path::new(&note.record.file_path)) {
            warn!("event=note_delete module=directory status=file_error id={id} error={err}");
        }

        self.notes.retain(|n| n.id() != id);
        info!("event=note_delete module=directory status=ok id={id}");
        self.notify_changed();
        Ok(())
    }

    /// Returns a detached copy with content loaded from its file.
    ///
    /// `Ok(None)` when the content file is missing (an orphaned record).
    pub fn load_content(&self, note: &Note) -> DirectoryResult<Option<Note>> {
        if note.content.is_loaded() {
            return Ok(Some(note.clone()));
        }

        let Some(text) = self.files.read(Path::new(&note.record.file_path))? else {
            return Ok(None);
        };

        Ok(Some(Note {
            record: note.record.clone(),
            content: NoteContent::Loaded(text),
        }))
    }

    /// Case-insensitive substring search over title, summary and emoji of the
    /// in-memory list. Not a storage-level query.
    pub fn search(&self, query: &str) -> Vec<Note> {
        let needle = query.to_lowercase();
        self.notes
            .iter()
            .filter(|note| {
                note.record.title.to_lowercase().contains(&needle)
                    || note.record.summary.to_lowercase().contains(&needle)
                    || note.record.emoji.contains(query)
            })
            .cloned()
            .collect()
    }

    /// Partitions the in-memory list by UTC calendar day of the start time.
    ///
    /// Groups are ordered newest-day-first; notes within a group are sorted
    /// by start time descending.
    pub fn group_by_date(&self) -> Vec<DateGroup> {
        let mut grouped: BTreeMap<String, Vec<Note>> = BTreeMap::new();
        for note in &self.notes {
            grouped.entry(note.date_key()).or_default().push(note.clone());
        }

        grouped
            .into_iter()
            .rev()
            .map(|(day, mut notes)| {
                sort_newest_first(&mut notes);
                DateGroup { day, notes }
            })
            .collect()
    }

    /// Deletes content files not referenced by any current record.
    ///
    /// The reference set is read from the record store, not the in-memory
    /// list. Returns the deleted paths. No coordination against concurrent
    /// writes is attempted.
    pub fn cleanup_orphans(&self) -> DirectoryResult<Vec<PathBuf>> {
        let referenced: HashSet<String> = self
            .repo
            .get_all()?
            .into_iter()
            .map(|record| record.file_path)
            .collect();

        let mut deleted = Vec::new();
        for path in self.files.list_files()? {
            let path_text = path.to_string_lossy().into_owned();
            if referenced.contains(&path_text) {
                continue;
            }
            self.files.delete(&path)?;
            info!("event=orphan_cleanup module=directory status=deleted path={path_text}");
            deleted.push(path);
        }
        Ok(deleted)
    }

    /// Note count plus total content file size for the listed notes.
    pub fn storage_stats(&self) -> DirectoryResult<StorageStats> {
        let mut total_file_size = 0u64;
        for note in &self.notes {
            if let Some(size) = self.files.file_size(Path::new(&note.record.file_path))? {
                total_file_size += size;
            }
        }
        Ok(StorageStats {
            note_count: self.notes.len(),
            total_file_size,
        })
    }

    fn notify_changed(&mut self) {
        self.version += 1;
        for listener in &mut self.listeners {
            listener(self.version);
        }
    }
}

fn sort_newest_first(notes: &mut [Note]) {
    notes.sort_by(|a, b| b.timestamp().total_cmp(&a.timestamp()));
}
