//! Storage core for the InkFlow journal.
//!
//! One relational table for note metadata, one markdown file per note body,
//! and an in-memory directory façade that keeps both consistent for
//! presentation layers.

pub mod bootstrap;
pub mod content;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use bootstrap::{initialize, BootstrapError, InitFlags, CURRENT_DATA_VERSION};
pub use content::store::{ContentStore, StoreError};
pub use content::summary::{summarize, EMPTY_NOTE_SUMMARY};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{Note, NoteContent, NoteDraft, NoteId, NoteRecord};
pub use repo::note_repo::{NoteRepository, RepoError, RepoResult, SqliteNoteRepository};
pub use service::note_directory::{
    ChangeListener, DateGroup, DirectoryError, DirectoryResult, NoteDirectory, StorageStats,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
